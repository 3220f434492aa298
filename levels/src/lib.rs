#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Read-only catalog of level definitions.
//!
//! The catalog ships with a bundled JSON data file and can also load external
//! catalogs. Lookups never fail loudly: unknown identifiers produce `None` so
//! callers can fall back to a default level.

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use glam::Vec2;
use path_defence_core::{CellCoord, Difficulty, EnemyKind, LevelDefinition, WaveGroup};
use serde::Deserialize;
use thiserror::Error;

const BUNDLED_CATALOG: &str = include_str!("../data/levels.json");

/// Errors raised while loading a level catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("could not read level catalog {path}: {source}")]
    Io {
        /// Location of the catalog file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The catalog was not valid JSON or did not match the level schema.
    #[error("could not parse level catalog: {0}")]
    Parse(#[from] serde_json::Error),
    /// The catalog contained no levels.
    #[error("level catalog contains no levels")]
    Empty,
    /// Two levels shared the same identifier.
    #[error("level id '{0}' appears more than once")]
    DuplicateId(String),
    /// A level defined no waves.
    #[error("level '{0}' defines no waves")]
    NoWaves(String),
    /// A level path had fewer than two waypoints.
    #[error("level '{0}' needs at least two waypoints")]
    ShortPath(String),
}

/// Ordered, immutable collection of levels with a "current level" cursor.
#[derive(Clone, Debug, Default)]
pub struct LevelCatalog {
    levels: Vec<LevelDefinition>,
    current: Option<String>,
}

impl LevelCatalog {
    /// Builds a catalog from already validated definitions.
    #[must_use]
    pub fn new(levels: Vec<LevelDefinition>) -> Self {
        Self {
            levels,
            current: None,
        }
    }

    /// Loads the catalog bundled with the crate.
    ///
    /// The bundled data is covered by tests; should it ever fail to parse the
    /// failure is logged and an empty catalog is returned.
    #[must_use]
    pub fn bundled() -> Self {
        match Self::from_json_str(BUNDLED_CATALOG) {
            Ok(catalog) => catalog,
            Err(error) => {
                log::error!("bundled level catalog is invalid: {error}");
                Self::default()
            }
        }
    }

    /// Parses a catalog from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawLevel> = serde_json::from_str(json)?;
        if raw.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        let mut levels = Vec::with_capacity(raw.len());
        for level in raw {
            if !seen.insert(level.id.clone()) {
                return Err(CatalogError::DuplicateId(level.id));
            }
            levels.push(level.into_definition()?);
        }

        log::debug!("loaded {} level definitions", levels.len());
        Ok(Self::new(levels))
    }

    /// Reads and parses a catalog stored on disk.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Looks up the level with the provided identifier.
    #[must_use]
    pub fn get_level_by_id(&self, id: &str) -> Option<&LevelDefinition> {
        self.levels.iter().find(|level| level.id == id)
    }

    /// Every level in catalog order, for selection screens.
    #[must_use]
    pub fn get_all_levels(&self) -> &[LevelDefinition] {
        &self.levels
    }

    /// Level following the current one, or the first level when none is current.
    ///
    /// Returns `None` after the final level or when the current identifier is
    /// no longer part of the catalog.
    #[must_use]
    pub fn get_next_level(&self) -> Option<&LevelDefinition> {
        match &self.current {
            None => self.levels.first(),
            Some(current) => {
                let index = self.levels.iter().position(|level| &level.id == current)?;
                self.levels.get(index + 1)
            }
        }
    }

    /// Level currently selected, if any.
    #[must_use]
    pub fn current(&self) -> Option<&LevelDefinition> {
        self.current
            .as_deref()
            .and_then(|id| self.get_level_by_id(id))
    }

    /// Stores the current level. Unknown identifiers leave the cursor unchanged.
    pub fn set_current(&mut self, id: &str) -> bool {
        if self.get_level_by_id(id).is_none() {
            return false;
        }
        self.current = Some(id.to_owned());
        true
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLevel {
    id: String,
    name: String,
    difficulty: Difficulty,
    initial_gold: u32,
    initial_lives: i32,
    waypoint_path: Vec<RawPoint>,
    waves: Vec<Vec<RawWaveGroup>>,
    #[serde(default)]
    blocked: Vec<CellCoord>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct RawPoint {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct RawWaveGroup {
    archetype: EnemyKind,
    count: u32,
    interval: u64,
    #[serde(default)]
    delay: u64,
}

impl RawLevel {
    fn into_definition(self) -> Result<LevelDefinition, CatalogError> {
        if self.waves.is_empty() {
            return Err(CatalogError::NoWaves(self.id));
        }
        if self.waypoint_path.len() < 2 {
            return Err(CatalogError::ShortPath(self.id));
        }

        let path = self
            .waypoint_path
            .iter()
            .map(|point| Vec2::new(point.x, point.y))
            .collect();
        let waves = self
            .waves
            .iter()
            .map(|wave| wave.iter().map(|group| group.to_group()).collect())
            .collect();

        Ok(LevelDefinition {
            id: self.id,
            name: self.name,
            difficulty: self.difficulty,
            initial_gold: self.initial_gold,
            initial_lives: self.initial_lives,
            path,
            waves,
            blocked: self.blocked,
        })
    }
}

impl RawWaveGroup {
    fn to_group(self) -> WaveGroup {
        WaveGroup {
            kind: self.archetype,
            count: self.count,
            interval: Duration::from_millis(self.interval),
            delay: Duration::from_millis(self.delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LEVELS: &str = r#"[
        {
            "id": "first",
            "name": "First",
            "difficulty": "easy",
            "initialGold": 100,
            "initialLives": 5,
            "waypointPath": [{ "x": 0, "y": 0 }, { "x": 100, "y": 0 }],
            "waves": [[{ "archetype": "grunt", "count": 2, "interval": 500 }]]
        },
        {
            "id": "second",
            "name": "Second",
            "difficulty": "hard",
            "initialGold": 50,
            "initialLives": 1,
            "waypointPath": [{ "x": 0, "y": 0 }, { "x": 0, "y": 100 }],
            "waves": [[{ "archetype": "tank", "count": 1, "interval": 0, "delay": 1500 }]],
            "blocked": [{ "column": 3, "row": 4 }]
        }
    ]"#;

    #[test]
    fn bundled_catalog_parses() {
        let catalog = LevelCatalog::from_json_str(BUNDLED_CATALOG).expect("bundled catalog");
        assert_eq!(catalog.get_all_levels().len(), 3);
        assert!(LevelCatalog::bundled().get_level_by_id("meadow").is_some());
    }

    #[test]
    fn wave_groups_convert_milliseconds_and_default_delay() {
        let catalog = LevelCatalog::from_json_str(TWO_LEVELS).expect("catalog");
        let first = catalog.get_level_by_id("first").expect("first level");
        let group = first.wave(0).expect("wave")[0];
        assert_eq!(group.kind, EnemyKind::Grunt);
        assert_eq!(group.interval, Duration::from_millis(500));
        assert_eq!(group.delay, Duration::ZERO);

        let second = catalog.get_level_by_id("second").expect("second level");
        assert_eq!(second.wave(0).expect("wave")[0].delay, Duration::from_millis(1500));
        assert_eq!(second.blocked, vec![CellCoord::new(3, 4)]);
        assert_eq!(second.path[1], Vec2::new(0.0, 100.0));
    }

    #[test]
    fn unknown_level_is_absent() {
        let catalog = LevelCatalog::from_json_str(TWO_LEVELS).expect("catalog");
        assert!(catalog.get_level_by_id("missing").is_none());
    }

    #[test]
    fn next_level_follows_current_cursor() {
        let mut catalog = LevelCatalog::from_json_str(TWO_LEVELS).expect("catalog");
        assert_eq!(catalog.get_next_level().map(|l| l.id.as_str()), Some("first"));

        assert!(catalog.set_current("first"));
        assert_eq!(catalog.get_next_level().map(|l| l.id.as_str()), Some("second"));

        assert!(catalog.set_current("second"));
        assert!(catalog.get_next_level().is_none());

        assert!(!catalog.set_current("missing"));
        assert_eq!(catalog.current().map(|l| l.id.as_str()), Some("second"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = TWO_LEVELS.replace("\"second\"", "\"first\"");
        let error = LevelCatalog::from_json_str(&json).expect_err("duplicate ids");
        assert!(matches!(error, CatalogError::DuplicateId(id) if id == "first"));
    }

    #[test]
    fn short_paths_and_empty_waves_are_rejected() {
        let short = r#"[{ "id": "a", "name": "A", "difficulty": "easy", "initialGold": 1,
            "initialLives": 1, "waypointPath": [{ "x": 0, "y": 0 }],
            "waves": [[{ "archetype": "grunt", "count": 1, "interval": 0 }]] }]"#;
        assert!(matches!(
            LevelCatalog::from_json_str(short),
            Err(CatalogError::ShortPath(_))
        ));

        let no_waves = r#"[{ "id": "b", "name": "B", "difficulty": "easy", "initialGold": 1,
            "initialLives": 1, "waypointPath": [{ "x": 0, "y": 0 }, { "x": 1, "y": 0 }],
            "waves": [] }]"#;
        assert!(matches!(
            LevelCatalog::from_json_str(no_waves),
            Err(CatalogError::NoWaves(_))
        ));

        assert!(matches!(
            LevelCatalog::from_json_str("[]"),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        assert!(matches!(
            LevelCatalog::from_json_str("{ not json"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let error = LevelCatalog::from_path(Path::new("/definitely/not/here.json"))
            .expect_err("missing file");
        assert!(matches!(error, CatalogError::Io { .. }));
    }
}
