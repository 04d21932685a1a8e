//! Grid-world Q-learning end to end: training, policies, observers, persistence

use std::fs;

use learnlab::{
    Error,
    pipeline::{
        EarlyStopObserver, EpisodeRecord, JsonlObserver, SharedMetricsObserver, TrainingPipeline,
    },
    q_learning::{
        Action, Cell, CellKind, DEFAULT_LAYOUT, GridWorld, QLearningAgent, QLearningConfig,
        QTable, Rewards, SavedAgent, greedy_path, train_agent, value_snapshot,
    },
};
use tempfile::tempdir;

mod common;

#[test]
fn open_grid_agent_finds_the_goal() {
    let agent = common::trained_agent(common::OPEN_LAYOUT, Rewards::default(), 3000, 42);
    let path = agent.greedy_path(25);
    assert!(path.reaches_goal(), "path: {:?}", path.cells);
    assert_eq!(path.cells.first(), Some(&Cell::new(0, 0)));
    assert_eq!(path.cells.last(), Some(&Cell::new(4, 4)));
    assert!(path.len() >= 8, "the goal is 8 moves away");
}

#[test]
fn start_action_avoids_adjacent_hazard() {
    let rewards = Rewards::new(-1.0, -100.0, 100.0);
    let agent = common::trained_agent(common::CLIFF_LAYOUT, rewards, 3000, 7);
    let start = agent.grid().state_index(agent.grid().start()).unwrap();

    let best = agent.q_table().greedy_action(start);
    assert_ne!(best, Action::Down, "moving down enters the hazard");
    assert!(agent.q_table().get(start, Action::Down) < agent.q_table().max_q(start));
}

#[test]
fn q_values_stay_finite_on_the_demo_grid() {
    let agent = common::trained_agent(DEFAULT_LAYOUT, Rewards::default(), 2000, 3);
    assert!(agent.q_table().is_finite());
}

#[test]
fn zero_rewards_leave_an_all_zero_table() {
    let grid = GridWorld::default();
    let table = train_agent(&grid, Rewards::new(0.0, 0.0, 0.0), 100, Some(1)).unwrap();
    for state in 0..table.num_states() {
        assert_eq!(table.action_values(state), &[0.0; 4]);
    }
}

#[test]
fn training_is_reproducible_with_a_seed() {
    let grid = GridWorld::default();
    let a = train_agent(&grid, Rewards::default(), 300, Some(11)).unwrap();
    let b = train_agent(&grid, Rewards::default(), 300, Some(11)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn value_snapshot_is_idempotent_and_uses_rewards_for_terminals() {
    let grid = GridWorld::default();
    let rewards = Rewards::default();
    let table = train_agent(&grid, rewards, 500, Some(5)).unwrap();

    let first = value_snapshot(&grid, &table, &rewards).unwrap();
    let second = value_snapshot(&grid, &table, &rewards).unwrap();
    assert_eq!(first, second);

    for (cell, kind, value) in first.iter() {
        let state = grid.state_index(cell).unwrap();
        match kind {
            CellKind::Goal => assert_eq!(value, rewards.goal),
            CellKind::Hazard => assert_eq!(value, rewards.hazard),
            _ => assert_eq!(value, table.max_q(state)),
        }
    }
}

#[test]
fn mismatched_table_is_rejected() {
    let grid = GridWorld::default();
    let table = QTable::new(4, 0.1, 0.9);
    assert!(matches!(
        greedy_path(&grid, &table, 25),
        Err(Error::QTableShapeMismatch { expected: 25, got: 4 })
    ));
    assert!(matches!(
        value_snapshot(&grid, &table, &Rewards::default()),
        Err(Error::QTableShapeMismatch { .. })
    ));
}

#[test]
fn greedy_path_never_exceeds_the_step_limit() {
    let grid = GridWorld::default();
    let untrained = QTable::new(grid.num_states(), 0.1, 0.9);
    let path = greedy_path(&grid, &untrained, 25).unwrap();
    assert!(path.len() <= 25);
    assert_eq!(path.cells.len(), path.len() + 1);
}

#[test]
fn early_stop_cancels_between_episodes() {
    let config = QLearningConfig::default().with_episodes(100).with_seed(2);
    let mut agent = QLearningAgent::new(GridWorld::default(), Rewards::default(), config).unwrap();

    let mut pipeline =
        TrainingPipeline::new().with_observer(Box::new(EarlyStopObserver::after_episodes(10)));
    let summary = pipeline.run(&mut agent).unwrap();

    assert!(summary.stopped_early);
    assert_eq!(summary.episodes, 10);
    assert_eq!(agent.episodes_trained(), 10);
}

#[test]
fn metrics_and_jsonl_observers_see_every_episode() {
    let dir = tempdir().unwrap();
    let trace = dir.path().join("episodes.jsonl");

    let config = QLearningConfig::default().with_episodes(40).with_seed(9);
    let mut agent = QLearningAgent::new(GridWorld::default(), Rewards::default(), config).unwrap();

    let metrics = SharedMetricsObserver::new();
    let mut pipeline = TrainingPipeline::new()
        .with_observer(Box::new(metrics.clone()))
        .with_observer(Box::new(JsonlObserver::new(&trace).unwrap()));
    let summary = pipeline.run(&mut agent).unwrap();

    let collected = metrics.summary();
    assert_eq!(collected.episodes, 40);
    assert_eq!(collected.goals, summary.goal_episodes);
    assert_eq!(collected.hazards, summary.hazard_episodes);
    assert!((collected.avg_episode_length - summary.mean_episode_length()).abs() < 1e-9);

    let contents = fs::read_to_string(&trace).unwrap();
    let records: Vec<EpisodeRecord> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 40);
    for (index, record) in records.iter().enumerate() {
        assert_eq!(record.episode, index);
        assert!(record.steps >= 1);
    }
    assert!((records.last().unwrap().epsilon - summary.final_epsilon).abs() < 1e-12);
}

#[test]
fn saved_agent_reproduces_the_policy() {
    let agent = common::trained_agent(DEFAULT_LAYOUT, Rewards::default(), 500, 21);
    let dir = tempdir().unwrap();
    let path = dir.path().join("agent.msgpack");

    SavedAgent::from_agent(&agent, None).save_to_file(&path).unwrap();
    let restored = SavedAgent::load_from_file(&path).unwrap().to_agent().unwrap();

    assert_eq!(restored.q_table(), agent.q_table());
    assert_eq!(restored.grid(), agent.grid());
    assert_eq!(restored.greedy_path(25), agent.greedy_path(25));
    assert_eq!(restored.value_snapshot(), agent.value_snapshot());
}
