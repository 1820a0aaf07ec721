//! Saving and restoring learned knowledge through the repository adapters

use std::fs;

use tempfile::TempDir;
use ttt_qlearn::{
    AgentConfig, BoardState, Error, Preset, QLearningAgent, StateKey,
    adapters::{InMemoryRepository, MsgPackRepository},
    pipeline::{RandomAgent, StopAfterIterations, Trainer},
    ports::KnowledgeRepository,
    q_learning::{LoadOutcome, TableKind},
};

fn trained_agent(preset: Preset, episodes: usize) -> QLearningAgent {
    let mut agent = QLearningAgent::new(preset.agent_config().with_seed(11)).unwrap();
    let mut opponent = RandomAgent::with_seed("random", 12);
    let config = preset
        .training_config()
        .with_decay(ttt_qlearn::config::DecaySchedule::Linear, episodes)
        .with_progress_interval(0)
        .with_seed(13);
    Trainer::new(config)
        .train(&mut agent, &mut opponent, &mut StopAfterIterations::new(episodes))
        .unwrap();
    agent
}

fn assert_same_values(a: &QLearningAgent, b: &QLearningAgent) {
    for value in 0..StateKey::COUNT as u32 {
        let key = StateKey::new(value).unwrap();
        assert_eq!(a.table().row(key), b.table().row(key), "state {key:?}");
    }
}

#[test]
fn saved_dense_knowledge_reproduces_greedy_play() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dense.msgpack");
    let repository = MsgPackRepository::new();

    let mut trained = trained_agent(Preset::RandomTd, 500);
    trained.save_knowledge(&repository, &path).unwrap();

    let mut restored = QLearningAgent::new(Preset::RandomTd.agent_config()).unwrap();
    assert!(restored.load_knowledge(&repository, &path).is_restored());
    assert_same_values(&trained, &restored);
    assert_eq!(restored.epsilon(), trained.epsilon());

    for board in [
        BoardState::new(),
        BoardState::from_string("X...O....").unwrap(),
        BoardState::from_string("XO..X....").unwrap(),
    ] {
        assert_eq!(
            trained.best_action(&board).unwrap(),
            restored.best_action(&board).unwrap()
        );
    }
}

#[test]
fn sparse_table_keeps_its_layout_across_a_dense_configuration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sparse.msgpack");
    let repository = MsgPackRepository::new();

    let trained = trained_agent(Preset::MonteCarlo, 300);
    trained.save_knowledge(&repository, &path).unwrap();

    let mut restored =
        QLearningAgent::new(AgentConfig::new().with_table(TableKind::Dense)).unwrap();
    restored.load_knowledge(&repository, &path);
    assert_eq!(restored.table().kind(), TableKind::Sparse);
    assert_same_values(&trained, &restored);
}

#[test]
fn missing_file_starts_from_zero_table() {
    let dir = TempDir::new().unwrap();
    let mut agent = QLearningAgent::new(AgentConfig::new()).unwrap();

    let outcome = agent.load_knowledge(&MsgPackRepository::new(), &dir.path().join("none"));

    assert!(matches!(outcome, LoadOutcome::Fresh { .. }));
    assert!(agent.table().is_blank());
}

#[test]
fn corrupt_file_is_reported_and_ignored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.msgpack");
    fs::write(&path, b"definitely not a q-table").unwrap();
    let repository = MsgPackRepository::new();

    assert!(matches!(
        repository.load(&path),
        Err(Error::KnowledgeCorrupt { .. })
    ));

    let mut agent = QLearningAgent::new(AgentConfig::new()).unwrap();
    assert!(!agent.load_knowledge(&repository, &path).is_restored());
    assert!(agent.table().is_blank());
}

#[test]
fn save_into_missing_directory_fails_without_losing_the_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no").join("such").join("dir.msgpack");
    let agent = trained_agent(Preset::RandomTd, 50);
    let visited = agent.table().visited_states();

    let result = agent.save_knowledge(&MsgPackRepository::new(), &path);

    assert!(matches!(result, Err(Error::KnowledgeSaveFailed { .. })));
    assert_eq!(agent.table().visited_states(), visited);
}

#[test]
fn in_memory_repository_behaves_like_the_file_adapter() {
    let repository = InMemoryRepository::new();
    let path = std::path::Path::new("memory/agent");
    let trained = trained_agent(Preset::RandomTd, 100);

    trained.save_knowledge(&repository, path).unwrap();
    assert!(repository.contains(path));

    let mut restored = QLearningAgent::new(AgentConfig::new()).unwrap();
    assert!(restored.load_knowledge(&repository, path).is_restored());
    assert_same_values(&trained, &restored);
}
