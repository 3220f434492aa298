#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Path Defence adapters.
//!
//! A [`Scene`] is a declarative description of one frame built from the
//! runtime's [`Frame`] snapshot. Backends implement [`RenderingBackend`] to
//! present scenes; [`AsciiBackend`] paints them as text.

use std::{fmt::Write as _, io::Write, time::Duration};

use anyhow::Result as AnyResult;
use glam::Vec2;
use path_defence_core::{
    CellCoord, CellKind, EnemyId, EnemyKind, RunStatus, TowerId, TowerKind,
};
use path_defence_runtime::Frame;

/// Describes the square cell grid the scene is laid out on.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_size: f32,
    /// Classification of every cell in row-major order.
    pub cells: Vec<CellKind>,
}

impl TileGridPresentation {
    /// Calculates the total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_size
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// Classification of the provided cell, or `None` when out of bounds.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.cells.get(index).copied()
    }

    /// Snaps a world-space position to the cell containing it.
    ///
    /// Returns `None` when the position lies outside the grid or the grid has no area.
    #[must_use]
    pub fn snap_world_to_cell(&self, position: Vec2) -> Option<CellCoord> {
        if self.columns == 0 || self.rows == 0 || self.cell_size <= f32::EPSILON {
            return None;
        }
        if position.x < 0.0
            || position.y < 0.0
            || position.x >= self.width()
            || position.y >= self.height()
        {
            return None;
        }

        let column = (position.x / self.cell_size).floor() as u32;
        let row = (position.y / self.cell_size).floor() as u32;
        Some(CellCoord::new(
            column.min(self.columns - 1),
            row.min(self.rows - 1),
        ))
    }
}

/// Enemy visible within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Identifier allocated to the enemy by the world.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// World-space position of the enemy.
    pub position: Vec2,
    /// Remaining health as a fraction of the maximum, in `0.0..=1.0`.
    pub health_fraction: f32,
    /// Whether the enemy currently moves slowed.
    pub slowed: bool,
}

/// Tower placed within the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneTower {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower placed in the cell.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Upgrade level of the tower.
    pub level: u32,
}

/// Heads-up counters drawn next to the play area.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    /// Lifecycle status of the run.
    pub status: RunStatus,
    /// One-based number of the current wave, zero before a run starts.
    pub wave: usize,
    /// Number of waves in the level.
    pub wave_count: usize,
    /// Gold held by the player.
    pub gold: u32,
    /// Lives remaining.
    pub lives: i32,
    /// Score accumulated in the run.
    pub score: u32,
    /// Speed multiplier in effect.
    pub speed: f32,
    /// Simulation clock.
    pub clock: Duration,
}

/// Scene description combining the grid, its inhabitants and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid that composes the play area.
    pub tile_grid: TileGridPresentation,
    /// Enemies currently on the path.
    pub enemies: Vec<EnemyPresentation>,
    /// Towers built by the player.
    pub towers: Vec<SceneTower>,
    /// World-space positions of the projectiles in flight.
    pub projectiles: Vec<Vec2>,
    /// Cell under the pointer, if any.
    pub hovered_cell: Option<CellCoord>,
    /// Tower highlighted by the inspector, if any.
    pub selected_tower: Option<TowerId>,
    /// Run counters.
    pub hud: Hud,
}

impl Scene {
    /// Builds the scene describing `frame`.
    #[must_use]
    pub fn from_frame(frame: &Frame) -> Self {
        let grid = &frame.grid;
        let tile_grid = TileGridPresentation {
            columns: grid.columns(),
            rows: grid.rows(),
            cell_size: grid.cell_size(),
            cells: grid.iter().map(|(_, kind)| kind).collect(),
        };

        let enemies = frame
            .enemies
            .iter()
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| EnemyPresentation {
                id: enemy.id,
                kind: enemy.kind,
                position: enemy.position,
                health_fraction: if enemy.max_health > 0.0 {
                    (enemy.health / enemy.max_health).clamp(0.0, 1.0)
                } else {
                    0.0
                },
                slowed: enemy.slow > 0.0,
            })
            .collect();

        let towers = frame
            .towers
            .iter()
            .map(|tower| SceneTower {
                id: tower.id,
                kind: tower.kind,
                cell: tower.cell,
                level: tower.level,
            })
            .collect();

        let hud = Hud {
            status: frame.status,
            wave: if frame.wave_count == 0 {
                0
            } else {
                frame.wave + 1
            },
            wave_count: frame.wave_count,
            gold: frame.gold,
            lives: frame.lives,
            score: frame.score,
            speed: frame.speed,
            clock: frame.clock,
        };

        Self {
            tile_grid,
            enemies,
            towers,
            projectiles: frame
                .projectiles
                .iter()
                .map(|projectile| projectile.position)
                .collect(),
            hovered_cell: frame.hovered_cell,
            selected_tower: frame.selected_tower,
            hud,
        }
    }
}

/// Rendering backend capable of presenting Path Defence scenes.
pub trait RenderingBackend {
    /// Presents one scene.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Backend painting scenes as text, one character per cell.
///
/// Enemies are drawn above projectiles, projectiles above towers and towers
/// above the terrain. A status line follows every grid.
#[derive(Debug)]
pub struct AsciiBackend<W: Write> {
    writer: W,
    frames: u64,
}

impl<W: Write> AsciiBackend<W> {
    /// Creates a backend writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    /// Number of scenes presented so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderingBackend for AsciiBackend<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        let text = compose(scene);
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()?;
        self.frames += 1;
        Ok(())
    }
}

fn compose(scene: &Scene) -> String {
    let grid = &scene.tile_grid;
    let width = grid.columns as usize;
    let mut canvas: Vec<char> = grid.cells.iter().map(|kind| cell_glyph(*kind)).collect();
    let mut paint = |cell: CellCoord, glyph: char| {
        let index = cell.row() as usize * width + cell.column() as usize;
        if let Some(slot) = canvas.get_mut(index) {
            *slot = glyph;
        }
    };

    if let Some(cell) = scene.hovered_cell.filter(|cell| grid.kind(*cell).is_some()) {
        paint(cell, '+');
    }
    for tower in &scene.towers {
        if grid.kind(tower.cell).is_none() {
            continue;
        }
        let glyph = tower_glyph(tower.kind);
        if scene.selected_tower == Some(tower.id) {
            paint(tower.cell, glyph.to_ascii_lowercase());
        } else {
            paint(tower.cell, glyph);
        }
    }
    for position in &scene.projectiles {
        if let Some(cell) = grid.snap_world_to_cell(*position) {
            paint(cell, '*');
        }
    }
    for enemy in &scene.enemies {
        if let Some(cell) = grid.snap_world_to_cell(enemy.position) {
            paint(cell, enemy_glyph(enemy.kind));
        }
    }

    let mut text = String::with_capacity(canvas.len() + grid.rows as usize + 96);
    if width > 0 {
        for row in canvas.chunks(width) {
            text.extend(row.iter());
            text.push('\n');
        }
    }
    let hud = &scene.hud;
    let _ = writeln!(
        text,
        "{:?} | wave {}/{} | gold {} | lives {} | score {} | x{} | {:.1}s",
        hud.status,
        hud.wave,
        hud.wave_count,
        hud.gold,
        hud.lives,
        hud.score,
        hud.speed,
        hud.clock.as_secs_f32(),
    );
    text
}

fn cell_glyph(kind: CellKind) -> char {
    match kind {
        CellKind::Path => '.',
        CellKind::Buildable => ' ',
        CellKind::Spawn => 'S',
        CellKind::Exit => 'E',
        CellKind::Blocked => '#',
    }
}

fn tower_glyph(kind: TowerKind) -> char {
    match kind {
        TowerKind::Arrow => 'A',
        TowerKind::Cannon => 'C',
        TowerKind::Frost => 'F',
        TowerKind::Sniper => 'N',
    }
}

fn enemy_glyph(kind: EnemyKind) -> char {
    match kind {
        EnemyKind::Grunt => 'g',
        EnemyKind::Runner => 'r',
        EnemyKind::Tank => 't',
        EnemyKind::Boss => 'b',
    }
}
