//! Stateless geometry helpers shared by the world and the systems.

use std::time::{SystemTime, UNIX_EPOCH};

use glam::Vec2;
use rand::{distributions::Alphanumeric, Rng};

const ID_SUFFIX_LENGTH: usize = 8;

/// Euclidean distance between two points.
#[must_use]
pub fn distance(from: Vec2, to: Vec2) -> f32 {
    from.distance(to)
}

/// Squared Euclidean distance, for range comparisons that avoid a square root.
#[must_use]
pub fn distance_squared(from: Vec2, to: Vec2) -> f32 {
    from.distance_squared(to)
}

/// Linearly interpolates between two points. `t` is not clamped.
#[must_use]
pub fn lerp(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from + (to - from) * t
}

/// Unit vector pointing from `from` toward `to`.
///
/// Coincident points yield [`Vec2::ZERO`] instead of dividing by zero.
#[must_use]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Generates an opaque identifier of the form `prefix-millis-suffix`.
///
/// The suffix is random alphanumeric text, so collisions within a single
/// session are negligible.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LENGTH)
        .map(char::from)
        .collect();
    format!("{prefix}-{millis}-{suffix}")
}
