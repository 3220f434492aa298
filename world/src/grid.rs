//! Occupancy grid projected from a level's waypoint polyline.

use glam::Vec2;
use path_defence_core::{geometry, CellCoord, CellKind};

/// Dense cell classification used to validate tower placement.
///
/// Cells are stored in row-major order. Projection walks every path segment
/// in fixed interpolation steps instead of testing points against the path
/// geometry, so placement checks reduce to a cell lookup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cell_size: f32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Projects the provided path onto a grid of the given dimensions.
    ///
    /// Every in-bounds cell touched by one of the `steps + 1` interpolated
    /// points of each segment becomes [`CellKind::Path`]; the first and last
    /// path cells become [`CellKind::Spawn`] and [`CellKind::Exit`]. Blocked
    /// cells that the path does not cross become [`CellKind::Blocked`], and
    /// every other cell is [`CellKind::Buildable`].
    #[must_use]
    pub fn project(
        path: &[Vec2],
        columns: u32,
        rows: u32,
        cell_size: f32,
        steps: u32,
        blocked: &[CellCoord],
    ) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut grid = Self {
            columns,
            rows,
            cell_size,
            cells: vec![CellKind::Buildable; capacity],
        };

        for &cell in blocked {
            grid.set(cell, CellKind::Blocked);
        }

        let steps = steps.max(1);
        let mut first_cell = None;
        let mut last_cell = None;
        for segment in path.windows(2) {
            let (from, to) = (segment[0], segment[1]);
            for step in 0..=steps {
                let t = step as f32 / steps as f32;
                let Some(cell) = grid.cell_at(geometry::lerp(from, to, t)) else {
                    continue;
                };
                grid.set(cell, CellKind::Path);
                if first_cell.is_none() {
                    first_cell = Some(cell);
                }
                last_cell = Some(cell);
            }
        }

        if let Some(cell) = first_cell {
            grid.set(cell, CellKind::Spawn);
        }
        if let Some(cell) = last_cell {
            grid.set(cell, CellKind::Exit);
        }

        grid
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a square cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Classification of the provided cell, or `None` when out of bounds.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether a tower may be built on the cell, ignoring occupancy.
    #[must_use]
    pub fn is_buildable(&self, cell: CellCoord) -> bool {
        self.kind(cell) == Some(CellKind::Buildable)
    }

    /// Cell containing the provided world-space point, if it lies inside the grid.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> Option<CellCoord> {
        if self.cell_size <= 0.0 || point.x < 0.0 || point.y < 0.0 {
            return None;
        }

        let column = (point.x / self.cell_size).floor();
        let row = (point.y / self.cell_size).floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }

        Some(CellCoord::new(column as u32, row as u32))
    }

    /// Iterates over every cell and its classification in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, kind)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *kind)
        })
    }

    fn set(&mut self, cell: CellCoord, kind: CellKind) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = kind;
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path() -> Vec<Vec2> {
        vec![Vec2::new(5.0, 15.0), Vec2::new(95.0, 15.0)]
    }

    #[test]
    fn straight_path_marks_a_single_row() {
        let grid = Grid::project(&straight_path(), 10, 4, 10.0, 100, &[]);

        assert_eq!(grid.kind(CellCoord::new(0, 1)), Some(CellKind::Spawn));
        assert_eq!(grid.kind(CellCoord::new(9, 1)), Some(CellKind::Exit));
        for column in 1..9 {
            assert_eq!(grid.kind(CellCoord::new(column, 1)), Some(CellKind::Path));
        }
        for column in 0..10 {
            assert!(grid.is_buildable(CellCoord::new(column, 0)));
            assert!(grid.is_buildable(CellCoord::new(column, 2)));
        }
    }

    #[test]
    fn corner_segments_leave_no_gaps() {
        let path = vec![
            Vec2::new(5.0, 5.0),
            Vec2::new(45.0, 5.0),
            Vec2::new(45.0, 45.0),
        ];
        let grid = Grid::project(&path, 5, 5, 10.0, 100, &[]);

        let path_cells = grid
            .iter()
            .filter(|(_, kind)| *kind != CellKind::Buildable)
            .count();
        assert_eq!(path_cells, 9, "expected an unbroken L of nine cells");
        assert_eq!(grid.kind(CellCoord::new(4, 4)), Some(CellKind::Exit));
    }

    #[test]
    fn blocked_cells_reject_construction_but_path_wins() {
        let blocked = [CellCoord::new(3, 3), CellCoord::new(4, 1)];
        let grid = Grid::project(&straight_path(), 10, 4, 10.0, 100, &blocked);

        assert_eq!(grid.kind(CellCoord::new(3, 3)), Some(CellKind::Blocked));
        assert_eq!(grid.kind(CellCoord::new(4, 1)), Some(CellKind::Path));
        assert!(!grid.is_buildable(CellCoord::new(3, 3)));
    }

    #[test]
    fn points_outside_the_grid_are_ignored() {
        let path = vec![Vec2::new(-50.0, 15.0), Vec2::new(25.0, 15.0)];
        let grid = Grid::project(&path, 3, 3, 10.0, 100, &[]);

        assert_eq!(grid.kind(CellCoord::new(0, 1)), Some(CellKind::Spawn));
        assert_eq!(grid.kind(CellCoord::new(2, 1)), Some(CellKind::Exit));
        assert_eq!(grid.kind(CellCoord::new(3, 1)), None);
        assert_eq!(grid.cell_at(Vec2::new(-1.0, 0.0)), None);
        assert_eq!(grid.cell_at(Vec2::new(30.0, 0.0)), None);
    }

    #[test]
    fn empty_path_leaves_everything_buildable() {
        let grid = Grid::project(&[], 4, 4, 10.0, 100, &[]);
        assert!(grid.iter().all(|(_, kind)| kind == CellKind::Buildable));
        assert_eq!(grid.iter().count(), 16);
    }
}
