//! Arc-length lookup along the level's waypoint polyline.

use glam::Vec2;
use path_defence_core::geometry;

/// Waypoint polyline with precomputed cumulative segment lengths.
#[derive(Clone, Debug, Default)]
pub(crate) struct PathGeometry {
    points: Vec<Vec2>,
    cumulative: Vec<f32>,
    total: f32,
}

impl PathGeometry {
    pub(crate) fn new(points: Vec<Vec2>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (index, point) in points.iter().enumerate() {
            if index > 0 {
                total += geometry::distance(points[index - 1], *point);
            }
            cumulative.push(total);
        }

        Self {
            points,
            cumulative,
            total,
        }
    }

    pub(crate) fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub(crate) fn total_length(&self) -> f32 {
        self.total
    }

    /// Enemies only advance along paths with at least one non-empty segment.
    pub(crate) fn is_traversable(&self) -> bool {
        self.points.len() >= 2 && self.total > 0.0
    }

    pub(crate) fn start(&self) -> Vec2 {
        self.points.first().copied().unwrap_or(Vec2::ZERO)
    }

    /// Resolves the point lying `progress` units along the path.
    pub(crate) fn position_at(&self, progress: f32) -> Vec2 {
        if !self.is_traversable() || progress <= 0.0 {
            return self.start();
        }

        for index in 1..self.points.len() {
            let segment_end = self.cumulative[index];
            if progress > segment_end {
                continue;
            }

            let segment_start = self.cumulative[index - 1];
            let length = segment_end - segment_start;
            if length <= 0.0 {
                continue;
            }

            let t = (progress - segment_start) / length;
            return geometry::lerp(self.points[index - 1], self.points[index], t);
        }

        self.points.last().copied().unwrap_or(Vec2::ZERO)
    }
}
