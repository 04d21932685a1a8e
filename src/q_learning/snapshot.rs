//! Read-only views of a learned Q-table: greedy path and value heatmap

use serde::{Deserialize, Serialize};

use super::{
    grid::{Action, Cell, CellKind, GridWorld, Rewards},
    q_table::QTable,
};

/// How a greedy walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathOutcome {
    ReachedGoal,
    EnteredHazard,
    /// Ran out of steps without reaching a terminal cell
    StepLimit,
}

/// Cells visited by the greedy policy, start first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreedyPath {
    pub cells: Vec<Cell>,
    pub actions: Vec<Action>,
    pub outcome: PathOutcome,
}

impl GreedyPath {
    /// Walk `argmax_a Q(s, a)` from the start cell.
    ///
    /// The table must have one row per grid cell.
    pub fn follow(grid: &GridWorld, q_table: &QTable, max_steps: usize) -> Self {
        let mut cell = grid.start();
        let mut cells = vec![cell];
        let mut actions = Vec::new();

        let outcome = match grid.kind(cell) {
            Some(CellKind::Goal) => Some(PathOutcome::ReachedGoal),
            Some(CellKind::Hazard) => Some(PathOutcome::EnteredHazard),
            _ => None,
        };
        if let Some(outcome) = outcome {
            return Self {
                cells,
                actions,
                outcome,
            };
        }

        for _ in 0..max_steps {
            let state = cell.row * grid.width() + cell.col;
            let action = q_table.greedy_action(state);
            cell = grid.step(cell, action);
            cells.push(cell);
            actions.push(action);

            match grid.kind(cell) {
                Some(CellKind::Goal) => {
                    return Self {
                        cells,
                        actions,
                        outcome: PathOutcome::ReachedGoal,
                    };
                }
                Some(CellKind::Hazard) => {
                    return Self {
                        cells,
                        actions,
                        outcome: PathOutcome::EnteredHazard,
                    };
                }
                _ => {}
            }
        }

        Self {
            cells,
            actions,
            outcome: PathOutcome::StepLimit,
        }
    }

    pub fn reaches_goal(&self) -> bool {
        self.outcome == PathOutcome::ReachedGoal
    }

    /// Number of moves taken
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Colour family used when drawing a heatmap cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shade {
    Goal,
    Hazard,
    Positive,
    Negative,
}

/// One heatmap cell: raw value plus display shading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatCell {
    pub cell: Cell,
    pub kind: CellKind,
    pub value: f64,
    pub shade: Shade,
    /// 0.0 (transparent) to 0.9
    pub opacity: f64,
}

/// Per-cell state values.
///
/// Goal and hazard cells carry their configured reward; every other cell
/// carries `max_a Q(s, a)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSnapshot {
    width: usize,
    height: usize,
    kinds: Vec<CellKind>,
    values: Vec<f64>,
}

impl ValueSnapshot {
    /// The table must have one row per grid cell.
    pub fn capture(grid: &GridWorld, q_table: &QTable, rewards: &Rewards) -> Self {
        let (kinds, values) = grid
            .cells()
            .enumerate()
            .map(|(state, (_, kind))| {
                let value = match kind {
                    CellKind::Goal => rewards.goal,
                    CellKind::Hazard => rewards.hazard,
                    CellKind::Empty | CellKind::Start => q_table.max_q(state),
                };
                (kind, value)
            })
            .unzip();

        Self {
            width: grid.width(),
            height: grid.height(),
            kinds,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, cell: Cell) -> Option<f64> {
        (cell.row < self.height && cell.col < self.width)
            .then(|| self.values[cell.row * self.width + cell.col])
    }

    /// Values in row-major order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(cell, kind, value)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Cell, CellKind, f64)> + '_ {
        self.kinds
            .iter()
            .zip(&self.values)
            .enumerate()
            .map(|(index, (&kind, &value))| {
                (Cell::new(index / self.width, index % self.width), kind, value)
            })
    }

    /// Shade every cell for display.
    ///
    /// Opacity of ordinary cells is scaled by the largest (positive shade) or
    /// smallest (negative shade) value among empty cells, floored at 0.1.
    pub fn heatmap(&self) -> Vec<HeatCell> {
        let empty_values = || {
            self.kinds
                .iter()
                .zip(&self.values)
                .filter(|(kind, _)| **kind == CellKind::Empty)
                .map(|(_, &value)| value)
        };
        let min = empty_values().fold(f64::INFINITY, f64::min);
        let mut max = empty_values().fold(f64::NEG_INFINITY, f64::max);
        if max <= min {
            max = min + 1.0;
        }

        self.iter()
            .map(|(cell, kind, value)| {
                let (shade, opacity) = match kind {
                    CellKind::Goal => (Shade::Goal, 0.9),
                    CellKind::Hazard => (Shade::Hazard, 0.0),
                    _ if value > 0.0 => (Shade::Positive, (value / max * 0.8).max(0.1)),
                    _ => (Shade::Negative, (value / min * 0.8).max(0.1)),
                };
                HeatCell {
                    cell,
                    kind,
                    value,
                    shade,
                    opacity: if opacity.is_finite() { opacity } else { 0.1 },
                }
            })
            .collect()
    }
}
