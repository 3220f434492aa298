use std::{fmt, str::FromStr};

use path_defence_core::{CellCoord, TowerKind};
use thiserror::Error;

/// Separates the tower kind from its cell.
const KIND_DELIMITER: char = '@';
/// Separates the column from the row.
const CELL_DELIMITER: char = ',';

/// Tower requested on the command line as `KIND@COLUMN,ROW`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TowerPlacement {
    pub(crate) kind: TowerKind,
    pub(crate) cell: CellCoord,
}

/// Errors raised while parsing a tower placement.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LayoutError {
    #[error("expected KIND@COLUMN,ROW but got '{0}'")]
    MissingDelimiter(String),
    #[error("unknown tower kind '{0}' (expected arrow, cannon, frost or sniper)")]
    UnknownKind(String),
    #[error("invalid {axis} '{value}'")]
    InvalidCoordinate { axis: &'static str, value: String },
}

impl FromStr for TowerPlacement {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (kind, cell) = trimmed
            .split_once(KIND_DELIMITER)
            .ok_or_else(|| LayoutError::MissingDelimiter(trimmed.to_owned()))?;
        let (column, row) = cell
            .split_once(CELL_DELIMITER)
            .ok_or_else(|| LayoutError::MissingDelimiter(trimmed.to_owned()))?;

        Ok(Self {
            kind: parse_kind(kind)?,
            cell: CellCoord::new(parse_axis("column", column)?, parse_axis("row", row)?),
        })
    }
}

impl fmt::Display for TowerPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KIND_DELIMITER}{}{CELL_DELIMITER}{}",
            kind_name(self.kind),
            self.cell.column(),
            self.cell.row()
        )
    }
}

fn parse_kind(value: &str) -> Result<TowerKind, LayoutError> {
    TowerKind::ALL
        .into_iter()
        .find(|kind| kind_name(*kind).eq_ignore_ascii_case(value.trim()))
        .ok_or_else(|| LayoutError::UnknownKind(value.trim().to_owned()))
}

fn parse_axis(axis: &'static str, value: &str) -> Result<u32, LayoutError> {
    value
        .trim()
        .parse()
        .map_err(|_| LayoutError::InvalidCoordinate {
            axis,
            value: value.trim().to_owned(),
        })
}

const fn kind_name(kind: TowerKind) -> &'static str {
    match kind {
        TowerKind::Arrow => "arrow",
        TowerKind::Cannon => "cannon",
        TowerKind::Frost => "frost",
        TowerKind::Sniper => "sniper",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placements_parse_case_insensitively() {
        let placement: TowerPlacement = " Cannon@4, 7 ".parse().expect("valid placement");
        assert_eq!(
            placement,
            TowerPlacement {
                kind: TowerKind::Cannon,
                cell: CellCoord::new(4, 7),
            }
        );
        assert_eq!(placement.to_string(), "cannon@4,7");
    }

    #[test]
    fn malformed_placements_are_rejected() {
        assert_eq!(
            "arrow".parse::<TowerPlacement>(),
            Err(LayoutError::MissingDelimiter("arrow".to_owned()))
        );
        assert_eq!(
            "arrow@3".parse::<TowerPlacement>(),
            Err(LayoutError::MissingDelimiter("arrow@3".to_owned()))
        );
        assert_eq!(
            "laser@1,1".parse::<TowerPlacement>(),
            Err(LayoutError::UnknownKind("laser".to_owned()))
        );
        assert_eq!(
            "frost@-1,2".parse::<TowerPlacement>(),
            Err(LayoutError::InvalidCoordinate {
                axis: "column",
                value: "-1".to_owned(),
            })
        );
    }
}
