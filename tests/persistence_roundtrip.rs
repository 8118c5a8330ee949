//! Disk round-trips: the learning table, character files and the roster
//! all survive a save, a process restart and a reload.

use std::fs;
use std::sync::Mutex;

use chess_persona_engine::{
    Character, CharacterRoster, GameExperience, GameOutcome, LearningAgent, MoveQuality,
    PersonaEngine, Personality,
};
use tempfile::tempdir;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[test]
fn test_agent_roundtrip_preserves_state() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("knowledge.bin");

    let mut agent = LearningAgent::with_parameters(0.05, 0.9);
    let mut experience = GameExperience::new(GameOutcome::Win);
    experience.record(START_FEN, "e2e4");
    experience.record("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1", "e7e5");
    agent.learn_from_game(&experience);
    agent.save(&path).expect("save");

    let loaded = LearningAgent::load(&path).expect("load");
    assert_eq!(loaded.learning_rate(), 0.05);
    assert_eq!(loaded.discount(), 0.9);
    assert_eq!(loaded.games_learned(), 1);
    assert_eq!(loaded.positions_known(), 2);
    assert_eq!(
        loaded.value_of(START_FEN, "e2e4"),
        agent.value_of(START_FEN, "e2e4")
    );
    assert_eq!(loaded.stats_for("e2e4").map(|stats| stats.plays), Some(1));
}

#[test]
fn test_missing_and_corrupt_knowledge_files_fall_back() {
    let dir = tempdir().expect("tempdir");

    let missing = dir.path().join("missing.bin");
    assert!(LearningAgent::load(&missing).is_err());
    let fresh = LearningAgent::load_or_default(&missing);
    assert_eq!(fresh.games_learned(), 0);
    assert_eq!(fresh.positions_known(), 0);

    let corrupt = dir.path().join("corrupt.bin");
    fs::write(&corrupt, b"this is not a knowledge file").expect("write");
    assert!(LearningAgent::load(&corrupt).is_err());
    let recovered = LearningAgent::load_or_default(&corrupt);
    assert_eq!(recovered.positions_known(), 0);
}

#[test]
fn test_character_file_roundtrip() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("Kira.json");

    let mut character = Character::new("Kira")
        .with_rating(1340)
        .with_personality(Personality {
            aggression: 0.8,
            ..Personality::neutral()
        });
    character.update_rating(1340, GameOutcome::Win);
    character.observe_move("g1f3", MoveQuality::Brilliant);
    character.record_opening("King's Knight", true);
    character.record_accuracy(91.0);
    character.save(&path).expect("save");

    let loaded = Character::load(&path).expect("load");
    assert_eq!(loaded.name, "Kira");
    assert_eq!(loaded.rating, character.rating);
    assert_eq!(loaded.personality.aggression, 0.8);
    assert_eq!(loaded.metrics, character.metrics);
    assert_eq!(loaded.move_patterns.get("g1f3"), Some(&1));
    assert_eq!(loaded.favorite_openings, character.favorite_openings);
    assert_eq!(
        loaded.opening_preferences.get("King's Knight"),
        character.opening_preferences.get("King's Knight")
    );
}

#[test]
fn test_roster_reopen_keeps_progress() {
    let dir = tempdir().expect("tempdir");

    {
        let mut roster = CharacterRoster::open(dir.path()).expect("open");
        assert_eq!(roster.len(), 5);
        let mut rookie = roster.get("Rookie").expect("seeded").clone();
        assert_eq!(rookie.rating, 800);
        rookie.update_rating(800, GameOutcome::Win);
        roster.update(rookie).expect("update");
    }

    let reopened = CharacterRoster::open(dir.path()).expect("reopen");
    assert_eq!(reopened.len(), 5);
    assert_eq!(reopened.get("Rookie").expect("still there").rating, 816);
    assert_eq!(reopened.get("Master").expect("still there").rating, 2400);
}

#[test]
fn test_unreadable_character_files_are_skipped() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("broken.json"), "{ not json").expect("write");

    let roster = CharacterRoster::open(dir.path()).expect("open");
    assert_eq!(roster.len(), 5);
    assert!(roster.get("broken").is_none());
}

#[test]
fn test_engine_knowledge_roundtrip() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("persona_knowledge.bin");

    let mut trainer = PersonaEngine::with_seed(5);
    let experience = trainer
        .experience_from_tokens(&["d2d4".to_string()], GameOutcome::Win)
        .expect("legal line");
    trainer.learn_from_game(&experience);
    trainer.save_knowledge(&path).expect("save");

    let mut student = PersonaEngine::with_seed(5);
    student.load_knowledge(&path);
    assert_eq!(student.agent().games_learned(), 1);
    let recalled = student
        .choose_learned_move(START_FEN, 0.0)
        .expect("start parses")
        .expect("moves exist");
    assert_eq!(recalled, "d2d4");

    // Pointing at a path that never existed resets to an empty table
    student.load_knowledge(dir.path().join("nothing.bin"));
    assert_eq!(student.agent().positions_known(), 0);
}

struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

impl log::Log for RecordingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.lines
            .lock()
            .expect("log sink")
            .push(record.args().to_string());
    }

    fn flush(&self) {}
}

static RECORDED: RecordingLogger = RecordingLogger {
    lines: Mutex::new(Vec::new()),
};

#[test]
fn test_fallback_loads_warn_about_the_lost_file() {
    log::set_logger(&RECORDED).expect("first logger in this binary");
    log::set_max_level(log::LevelFilter::Warn);

    // A mistyped path must not silently discard the learned state it was
    // supposed to pick up
    let dir = tempdir().expect("tempdir");
    let mislaid = dir.path().join("mislaid.bin");
    let agent = LearningAgent::load_or_default(&mislaid);
    assert_eq!(agent.positions_known(), 0);

    let garbled = dir.path().join("garbled.bin");
    fs::write(&garbled, b"???").expect("write");
    LearningAgent::load_or_default(&garbled);

    let lines = RECORDED.lines.lock().expect("log sink");
    assert!(lines.iter().any(|line| line.contains("mislaid.bin")));
    assert!(lines.iter().any(|line| line.contains("garbled.bin")));
}
