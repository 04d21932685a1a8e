//! Dense Q-table for grid-world learning

use serde::{Deserialize, Serialize};

use super::grid::{Action, NUM_ACTIONS};

/// Q-table mapping (state index, action) pairs to Q-values
///
/// One row per grid cell, one column per [`Action`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    /// Q-values indexed by state, then action
    values: Vec<[f64; NUM_ACTIONS]>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl QTable {
    /// Create an all-zero Q-table
    pub fn new(num_states: usize, learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            values: vec![[0.0; NUM_ACTIONS]; num_states],
            learning_rate,
            discount_factor,
        }
    }

    pub fn num_states(&self) -> usize {
        self.values.len()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: usize, action: Action) -> f64 {
        self.values[state][action.index()]
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: usize, action: Action, value: f64) {
        self.values[state][action.index()] = value;
    }

    /// All action-values of a state, in [`Action::ALL`] order
    pub fn action_values(&self, state: usize) -> &[f64; NUM_ACTIONS] {
        &self.values[state]
    }

    /// Maximum Q-value over all actions in a state
    pub fn max_q(&self, state: usize) -> f64 {
        self.values[state]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Action with the highest Q-value; ties go to the lowest action index
    pub fn greedy_action(&self, state: usize) -> Action {
        let row = &self.values[state];
        let mut best = 0;
        for (index, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = index;
            }
        }
        Action::ALL[best]
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// The bootstrap term is dropped when the transition ended the episode.
    /// Returns the TD error.
    pub fn q_learning_update(
        &mut self,
        state: usize,
        action: Action,
        reward: f64,
        next_state: usize,
        done: bool,
    ) -> f64 {
        let current_q = self.get(state, action);
        let max_next_q = if done { 0.0 } else { self.max_q(next_state) };
        let td_target = reward + self.discount_factor * max_next_q;
        let td_error = td_target - current_q;
        self.set(state, action, current_q + self.learning_rate * td_error);
        td_error
    }

    /// Reset all Q-values to zero
    pub fn reset(&mut self) {
        self.values.fill([0.0; NUM_ACTIONS]);
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().flatten().all(|value| value.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qtable_initialization() {
        let qtable = QTable::new(4, 0.1, 0.9);
        assert_eq!(qtable.num_states(), 4);
        assert_eq!(qtable.get(2, Action::Left), 0.0);
        assert_eq!(qtable.max_q(3), 0.0);
    }

    #[test]
    fn test_greedy_action_prefers_lowest_index_on_ties() {
        let mut qtable = QTable::new(1, 0.1, 0.9);
        assert_eq!(qtable.greedy_action(0), Action::Up);
        qtable.set(0, Action::Left, 2.0);
        qtable.set(0, Action::Right, 2.0);
        assert_eq!(qtable.greedy_action(0), Action::Left);
    }

    #[test]
    fn test_greedy_action_with_negative_values() {
        let mut qtable = QTable::new(1, 0.1, 0.9);
        qtable.set(0, Action::Up, -3.0);
        qtable.set(0, Action::Down, -1.0);
        qtable.set(0, Action::Left, -2.0);
        qtable.set(0, Action::Right, -5.0);
        assert_eq!(qtable.greedy_action(0), Action::Down);
        assert_eq!(qtable.max_q(0), -1.0);
    }

    #[test]
    fn test_q_learning_update() {
        let mut qtable = QTable::new(2, 0.5, 0.9);
        qtable.set(1, Action::Up, 1.0);
        qtable.set(1, Action::Right, 2.0);

        let td_error = qtable.q_learning_update(0, Action::Right, -1.0, 1, false);

        // Q(0,→) = 0 + 0.5 * (-1 + 0.9 * 2.0 - 0) = 0.4
        assert!((qtable.get(0, Action::Right) - 0.4).abs() < 1e-12);
        assert!((td_error - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_terminal_update_ignores_next_state() {
        let mut qtable = QTable::new(2, 0.1, 0.9);
        qtable.set(1, Action::Up, 50.0);
        qtable.q_learning_update(0, Action::Down, 10.0, 1, true);
        assert!((qtable.get(0, Action::Down) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut qtable = QTable::new(3, 0.1, 0.9);
        qtable.set(2, Action::Down, 4.0);
        qtable.reset();
        assert_eq!(qtable, QTable::new(3, 0.1, 0.9));
    }
}
