//! Grid world: layout, actions and rewards

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Layout of the robo-finder demo. `S` start, `.` empty, `F` hazard, `Z` goal.
pub const DEFAULT_LAYOUT: &str = "S..../.FFF./...F./.F.../.F.Z.";

/// What occupies a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Start,
    Hazard,
    Goal,
}

impl CellKind {
    /// Goal and hazard cells end an episode on entry.
    pub fn is_terminal(self) -> bool {
        matches!(self, CellKind::Hazard | CellKind::Goal)
    }

    pub fn glyph(self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::Start => 'S',
            CellKind::Hazard => 'F',
            CellKind::Goal => 'Z',
        }
    }

    /// Accepts the canonical glyphs plus a few aliases (`0`, `H`, `G`).
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph.to_ascii_uppercase() {
            '.' | '0' => Some(CellKind::Empty),
            'S' => Some(CellKind::Start),
            'F' | 'H' => Some(CellKind::Hazard),
            'Z' | 'G' => Some(CellKind::Goal),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CellKind::Empty => "empty",
            CellKind::Start => "start",
            CellKind::Hazard => "hazard",
            CellKind::Goal => "goal",
        }
    }
}

/// A `(row, col)` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

pub const NUM_ACTIONS: usize = 4;

/// Moves available to the agent, in Q-table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    pub const ALL: [Action; NUM_ACTIONS] = [Action::Up, Action::Down, Action::Left, Action::Right];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn arrow(self) -> char {
        match self {
            Action::Up => '↑',
            Action::Down => '↓',
            Action::Left => '←',
            Action::Right => '→',
        }
    }
}

/// Immutable rectangular grid with one start cell and at least one goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridWorld {
    width: usize,
    height: usize,
    cells: Vec<CellKind>,
    start: Cell,
}

impl GridWorld {
    /// Parse a layout. Rows are separated by newlines or `/`; blank rows and
    /// surrounding whitespace are ignored.
    pub fn parse(layout: &str) -> Result<Self> {
        let rows: Vec<&str> = layout
            .split(['\n', '/'])
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .collect();

        let height = rows.len();
        if height == 0 {
            return Err(Error::InvalidGrid {
                message: "layout has no rows".to_string(),
            });
        }
        let width = rows[0].chars().count();

        let mut cells = Vec::with_capacity(width * height);
        let mut start = None;
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(Error::InvalidGrid {
                    message: format!(
                        "row {row} has {} cells, expected {width}",
                        line.chars().count()
                    ),
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let kind = CellKind::from_glyph(glyph)
                    .ok_or(Error::InvalidGridGlyph { glyph, row, col })?;
                if kind == CellKind::Start {
                    if start.is_some() {
                        return Err(Error::InvalidGrid {
                            message: "layout has more than one start cell".to_string(),
                        });
                    }
                    start = Some(Cell::new(row, col));
                }
                cells.push(kind);
            }
        }

        let start = start.ok_or_else(|| Error::InvalidGrid {
            message: "layout has no start cell".to_string(),
        })?;
        if !cells.contains(&CellKind::Goal) {
            return Err(Error::InvalidGrid {
                message: "layout has no goal cell".to_string(),
            });
        }

        Ok(Self {
            width,
            height,
            cells,
            start,
        })
    }

    /// Move the start to another cell. A terminal cell is allowed and keeps its
    /// kind; every episode from it is then a single step.
    pub fn with_start(mut self, start: Cell) -> Result<Self> {
        self.ensure_contains(start)?;
        let old = self.index_unchecked(self.start);
        if self.cells[old] == CellKind::Start {
            self.cells[old] = CellKind::Empty;
        }
        let new = self.index_unchecked(start);
        if !self.cells[new].is_terminal() {
            self.cells[new] = CellKind::Start;
        }
        self.start = start;
        Ok(self)
    }

    /// Structural check for grids that did not come through [`GridWorld::parse`].
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.cells.len() != self.width * self.height {
            return Err(Error::InvalidGrid {
                message: format!(
                    "{} cells do not fill a {}x{} grid",
                    self.cells.len(),
                    self.height,
                    self.width
                ),
            });
        }
        self.ensure_contains(self.start)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_states(&self) -> usize {
        self.width * self.height
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    fn ensure_contains(&self, cell: Cell) -> Result<()> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(Error::CellOutOfBounds {
                row: cell.row,
                col: cell.col,
                width: self.width,
                height: self.height,
            })
        }
    }

    fn index_unchecked(&self, cell: Cell) -> usize {
        cell.row * self.width + cell.col
    }

    /// Flat state index `row * width + col`.
    pub fn state_index(&self, cell: Cell) -> Result<usize> {
        self.ensure_contains(cell)?;
        Ok(self.index_unchecked(cell))
    }

    pub fn cell_at(&self, index: usize) -> Option<Cell> {
        (index < self.num_states()).then(|| Cell::new(index / self.width, index % self.width))
    }

    pub fn kind(&self, cell: Cell) -> Option<CellKind> {
        self.contains(cell)
            .then(|| self.cells[self.index_unchecked(cell)])
    }

    /// Neighbouring cell in the direction of `action`. Moves off the edge leave
    /// the agent where it is.
    pub fn step(&self, cell: Cell, action: Action) -> Cell {
        let Cell { row, col } = cell;
        match action {
            Action::Up if row > 0 => Cell::new(row - 1, col),
            Action::Down if row + 1 < self.height => Cell::new(row + 1, col),
            Action::Left if col > 0 => Cell::new(row, col - 1),
            Action::Right if col + 1 < self.width => Cell::new(row, col + 1),
            _ => cell,
        }
    }

    /// All cells in row-major order with their kinds.
    pub fn cells(&self) -> impl Iterator<Item = (Cell, CellKind)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, &kind)| (Cell::new(index / self.width, index % self.width), kind))
    }

    /// Render back to the `/`-separated layout format accepted by [`GridWorld::parse`].
    ///
    /// A start placed on a terminal cell is not representable and is dropped.
    pub fn to_layout(&self) -> String {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|kind| kind.glyph()).collect::<String>())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Default for GridWorld {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            cells: DEFAULT_LAYOUT
                .split('/')
                .flat_map(str::chars)
                .filter_map(CellKind::from_glyph)
                .collect(),
            start: Cell::new(0, 0),
        }
    }
}

impl fmt::Display for GridWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            let line: String = row.iter().map(|kind| kind.glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Rewards for stepping, falling into a hazard and reaching the goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rewards {
    pub step: f64,
    pub hazard: f64,
    pub goal: f64,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            step: -1.0,
            hazard: -100.0,
            goal: 100.0,
        }
    }
}

impl Rewards {
    pub fn new(step: f64, hazard: f64, goal: f64) -> Self {
        Self { step, hazard, goal }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("step", self.step), ("hazard", self.hazard), ("goal", self.goal)] {
            if !value.is_finite() {
                return Err(Error::InvalidReward {
                    name: name.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Reward for entering a cell and whether the episode ends there.
    pub fn for_entering(&self, kind: CellKind) -> (f64, bool) {
        match kind {
            CellKind::Goal => (self.goal, true),
            CellKind::Hazard => (self.hazard, true),
            CellKind::Empty | CellKind::Start => (self.step, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_parsed_layout() {
        let parsed = GridWorld::parse(DEFAULT_LAYOUT).unwrap();
        assert_eq!(parsed, GridWorld::default());
        assert_eq!(parsed.kind(Cell::new(4, 3)), Some(CellKind::Goal));
        assert_eq!(parsed.kind(Cell::new(1, 2)), Some(CellKind::Hazard));
        assert_eq!(parsed.start(), Cell::new(0, 0));
    }

    #[test]
    fn parse_accepts_multiline_layout() {
        let grid = GridWorld::parse("S.\n.G\n").unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.kind(Cell::new(1, 1)), Some(CellKind::Goal));
    }

    #[test]
    fn parse_rejects_malformed_layouts() {
        assert!(matches!(
            GridWorld::parse("...../..Z..").unwrap_err(),
            Error::InvalidGrid { .. }
        ));
        assert!(matches!(
            GridWorld::parse("S..../.....").unwrap_err(),
            Error::InvalidGrid { .. }
        ));
        assert!(matches!(
            GridWorld::parse("S.Z/..").unwrap_err(),
            Error::InvalidGrid { .. }
        ));
        assert!(matches!(
            GridWorld::parse("S.Z/.S.").unwrap_err(),
            Error::InvalidGrid { .. }
        ));
        assert!(matches!(
            GridWorld::parse("S?Z").unwrap_err(),
            Error::InvalidGridGlyph { glyph: '?', row: 0, col: 1 }
        ));
        assert!(GridWorld::parse("").is_err());
    }

    #[test]
    fn state_index_is_row_major() {
        let grid = GridWorld::default();
        assert_eq!(grid.state_index(Cell::new(0, 0)).unwrap(), 0);
        assert_eq!(grid.state_index(Cell::new(2, 3)).unwrap(), 13);
        assert_eq!(grid.cell_at(13), Some(Cell::new(2, 3)));
        assert!(grid.state_index(Cell::new(5, 0)).is_err());
        assert_eq!(grid.cell_at(25), None);
    }

    #[test]
    fn moves_off_the_edge_are_no_ops() {
        let grid = GridWorld::default();
        let corner = Cell::new(0, 0);
        assert_eq!(grid.step(corner, Action::Up), corner);
        assert_eq!(grid.step(corner, Action::Left), corner);
        assert_eq!(grid.step(corner, Action::Right), Cell::new(0, 1));
        assert_eq!(grid.step(corner, Action::Down), Cell::new(1, 0));
        let far = Cell::new(4, 4);
        assert_eq!(grid.step(far, Action::Down), far);
        assert_eq!(grid.step(far, Action::Right), far);
    }

    #[test]
    fn relocating_start_onto_goal_keeps_goal() {
        let grid = GridWorld::default().with_start(Cell::new(4, 3)).unwrap();
        assert_eq!(grid.start(), Cell::new(4, 3));
        assert_eq!(grid.kind(Cell::new(4, 3)), Some(CellKind::Goal));
        assert_eq!(grid.kind(Cell::new(0, 0)), Some(CellKind::Empty));
        assert!(GridWorld::default().with_start(Cell::new(9, 9)).is_err());
    }

    #[test]
    fn layout_round_trips_through_text() {
        let grid = GridWorld::default();
        assert_eq!(grid.to_layout(), DEFAULT_LAYOUT);
    }

    #[test]
    fn rewards_reject_non_finite_values() {
        assert!(Rewards::default().validate().is_ok());
        assert!(Rewards::new(f64::NAN, -1.0, 1.0).validate().is_err());
        assert!(Rewards::new(0.0, f64::NEG_INFINITY, 1.0).validate().is_err());
    }

    #[test]
    fn entering_terminal_cells_ends_episode() {
        let rewards = Rewards::default();
        assert_eq!(rewards.for_entering(CellKind::Goal), (100.0, true));
        assert_eq!(rewards.for_entering(CellKind::Hazard), (-100.0, true));
        assert_eq!(rewards.for_entering(CellKind::Empty), (-1.0, false));
        assert_eq!(rewards.for_entering(CellKind::Start), (-1.0, false));
    }
}
