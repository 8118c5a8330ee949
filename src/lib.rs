//! # Chess Persona Engine
//!
//! A **personality-driven chess move engine** that scores candidate moves through a
//! tunable trait vector, grades played moves against the best available alternative,
//! and learns position/move values from finished games.
//!
//! ## Features
//!
//! - **Personality-weighted scoring**: material, positional, tactical, aggression and
//!   king-safety terms, each scaled by a trait in `[0, 1]`
//! - **Risk-driven selection**: one `risk_taking` trait switches between greedy,
//!   risk-seeking and risk-averse move policies
//! - **Move grading**: Brilliant-to-Blunder tiers from the score gap to the best
//!   alternative, with human-readable comments
//! - **Game learning**: a TD(0) value table with backward reward propagation and
//!   epsilon-greedy recall
//! - **Rated characters**: Elo updates, per-game trait drift, opening preferences and
//!   a persistent roster on disk
//!
//! ## Quick Start
//!
//! ```rust
//! use chess_persona_engine::{PersonaEngine, Personality};
//!
//! // Seeded engine, so move choice is reproducible
//! let mut engine = PersonaEngine::with_seed(7);
//!
//! let personality = Personality {
//!     aggression: 0.9,
//!     risk_taking: 0.8,
//!     ..Personality::neutral()
//! };
//!
//! let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
//! let chosen = engine.select_move(start, &personality).unwrap();
//! assert!(chosen.is_some());
//!
//! // Grade a played move against the best alternative
//! let report = engine.classify_move(start, "e2e4").unwrap();
//! println!("e2e4 was {}: {}", report.quality, report.comment);
//! ```

// Core modules
pub mod errors;
pub mod rng;

// Re-export commonly used types
pub use errors::{PersonaEngineError, Result};

pub mod character;
pub mod character_roster;
pub mod evaluation;
pub mod game_review;
pub mod learning;
pub mod personality;
pub mod protocol;
pub mod quality;
pub mod scoring;
pub mod selection;

pub use character::{Character, PerformanceMetrics, DEFAULT_RATING};
pub use character_roster::CharacterRoster;
pub use evaluation::{PieceValues, PositionEvaluator, MATE_SCORE};
pub use game_review::{GameReview, GameReviewer, QualityTally, ReviewedMove};
pub use learning::{
    position_key, GameExperience, GameOutcome, LearningAgent, LearningSummary, MoveStats,
    DEFAULT_DISCOUNT, DEFAULT_LEARNING_RATE,
};
pub use personality::{Personality, PlayingStyle};
pub use protocol::ProtocolEngine;
pub use quality::{MoveAssessment, MoveQuality, QualityClassifier};
pub use rng::{RandomSource, SeededRandom, ThreadRandom};
pub use scoring::{MoveScorer, ScoreBreakdown, ScoredMove, DEFAULT_JITTER};
pub use selection::MoveSelector;

use std::path::Path;
use std::str::FromStr;

use chess::{Board, ChessMove, MoveGen};

/// Fullmove number carried in a FEN record (sixth field), defaulting to 1
/// when the field is absent or unreadable.
pub fn fullmove_from_fen(fen: &str) -> u32 {
    fen.split_whitespace()
        .nth(5)
        .and_then(|field| field.parse().ok())
        .unwrap_or(1)
}

fn parse_fen(fen: &str) -> Result<Board> {
    Board::from_str(fen).map_err(|e| invalid_position!("unreadable FEN {:?}: {}", fen, e))
}

fn parse_token(token: &str) -> Result<ChessMove> {
    ChessMove::from_str(token).map_err(|e| invalid_move!("unreadable move token {:?}: {}", token, e))
}

fn parse_tokens(tokens: &[String]) -> Result<Vec<ChessMove>> {
    tokens.iter().map(|token| parse_token(token)).collect()
}

/// **Persona Engine** - scoring, selection, grading and learning behind one handle
///
/// Bundles a [`MoveScorer`], [`MoveSelector`], [`QualityClassifier`],
/// [`GameReviewer`] and [`LearningAgent`] around a single random source, and
/// exposes them as plain in-process calls on FEN strings and move tokens. The
/// caller owns the board state; every operation here takes a position, returns
/// a value, and leaves nothing mutated but the engine's own learning state.
///
/// ## Examples
///
/// ```rust
/// use chess_persona_engine::{GameOutcome, PersonaEngine};
///
/// let mut engine = PersonaEngine::with_seed(42);
///
/// // Teach the engine a one-move game and ask it to recall the move
/// let experience = engine
///     .experience_from_tokens(&["e2e4".to_string()], GameOutcome::Win)
///     .unwrap();
/// engine.learn_from_game(&experience);
///
/// let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
/// let recalled = engine.choose_learned_move(start, 0.0).unwrap();
/// assert_eq!(recalled.as_deref(), Some("e2e4"));
/// ```
pub struct PersonaEngine {
    evaluator: PositionEvaluator,
    scorer: MoveScorer,
    selector: MoveSelector,
    classifier: QualityClassifier,
    reviewer: GameReviewer,
    agent: LearningAgent,
    rng: Box<dyn RandomSource>,
}

impl PersonaEngine {
    /// Create an engine drawing jitter and policy randomness from the thread RNG.
    pub fn new() -> Self {
        Self::with_rng(Box::new(ThreadRandom::new()))
    }

    /// Create an engine whose every random draw is reproducible from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Box::new(SeededRandom::new(seed)))
    }

    /// Create an engine around a caller-supplied random source.
    pub fn with_rng(rng: Box<dyn RandomSource>) -> Self {
        Self {
            evaluator: PositionEvaluator::new(),
            scorer: MoveScorer::new(),
            selector: MoveSelector::new(),
            classifier: QualityClassifier::new(),
            reviewer: GameReviewer::new(),
            agent: LearningAgent::new(),
            rng,
        }
    }

    /// Personality-independent evaluation of a position, from the side to move.
    pub fn evaluate(&self, board: &Board) -> f32 {
        self.evaluator.evaluate(board)
    }

    /// [`Self::evaluate`] on a FEN record.
    pub fn evaluate_fen(&self, fen: &str) -> Result<f32> {
        Ok(self.evaluator.evaluate(&parse_fen(fen)?))
    }

    /// Score one move token under a personality, jitter included.
    pub fn score_move(
        &mut self,
        fen: &str,
        token: &str,
        personality: &Personality,
    ) -> Result<ScoredMove> {
        let board = parse_fen(fen)?;
        let mv = parse_token(token)?;
        let score = self.scorer.score(
            &board,
            mv,
            fullmove_from_fen(fen),
            personality,
            self.rng.as_mut(),
        )?;
        Ok(ScoredMove { mv, score })
    }

    /// Pick a move for the position under a personality.
    ///
    /// Returns `Ok(None)` when the position is terminal; that is an expected
    /// state, not an error.
    pub fn select_move(&mut self, fen: &str, personality: &Personality) -> Result<Option<String>> {
        let board = parse_fen(fen)?;
        let chosen = self.selector.select(
            &board,
            fullmove_from_fen(fen),
            personality,
            self.rng.as_mut(),
        );
        Ok(chosen.map(|scored| scored.mv.to_string()))
    }

    /// Grade a played move against the best alternative in the same position.
    pub fn classify_move(&self, fen: &str, token: &str) -> Result<MoveAssessment> {
        let board = parse_fen(fen)?;
        let mv = parse_token(token)?;
        self.classifier.classify(&board, mv, fullmove_from_fen(fen))
    }

    /// Replay and grade a whole game given as move tokens.
    ///
    /// With no `start_fen` the game is replayed from the standard starting
    /// position.
    pub fn review_game(&self, start_fen: Option<&str>, tokens: &[String]) -> Result<GameReview> {
        let moves = parse_tokens(tokens)?;
        match start_fen {
            Some(fen) => {
                let board = parse_fen(fen)?;
                self.reviewer.review(&board, fullmove_from_fen(fen), &moves)
            }
            None => self.reviewer.review_game(&moves),
        }
    }

    /// Epsilon-greedy recall from the learned value table.
    pub fn choose_learned_move(&mut self, fen: &str, exploration: f32) -> Result<Option<String>> {
        let board = parse_fen(fen)?;
        let legal: Vec<ChessMove> = MoveGen::new_legal(&board).collect();
        let chosen =
            self.agent
                .select_move(&position_key(&board), &legal, exploration, self.rng.as_mut());
        Ok(chosen.map(|mv| mv.to_string()))
    }

    /// Best-known responses for a position, strongest first.
    pub fn top_responses(&self, fen: &str, limit: usize) -> Result<Vec<(String, f32)>> {
        let board = parse_fen(fen)?;
        Ok(self.agent.top_responses(&position_key(&board), limit))
    }

    /// Build a learnable experience by replaying `tokens` from the standard
    /// starting position. Every token must be legal where it is played.
    pub fn experience_from_tokens(
        &self,
        tokens: &[String],
        outcome: GameOutcome,
    ) -> Result<GameExperience> {
        let mut board = Board::default();
        let mut experience = GameExperience::new(outcome);
        for (ply, token) in tokens.iter().enumerate() {
            let mv = parse_token(token)?;
            if !board.legal(mv) {
                return Err(invalid_move!("{} is not legal at ply {}", mv, ply));
            }
            experience.record(&position_key(&board), &mv.to_string());
            board = board.make_move_new(mv);
        }
        Ok(experience)
    }

    /// Fold a finished game into the value table.
    pub fn learn_from_game(&mut self, experience: &GameExperience) {
        self.agent.learn_from_game(experience);
    }

    /// Full post-game update for a character: value-table learning, the Elo
    /// rating step against `opponent_rating`, per-move trait nudges from the
    /// graded moves, and the accuracy running average.
    pub fn update_from_game(
        &mut self,
        character: &mut Character,
        experience: &GameExperience,
        opponent_rating: i32,
    ) -> Result<()> {
        // Grade everything first so a malformed record leaves the character
        // untouched.
        let mut graded = Vec::with_capacity(experience.len());
        for (key, token) in &experience.moves {
            let board = parse_fen(key)?;
            let mv = parse_token(token)?;
            let assessment = self.classifier.classify(&board, mv, fullmove_from_fen(key))?;
            graded.push((token.as_str(), assessment));
        }

        self.agent.learn_from_game(experience);
        character.update_rating(opponent_rating, experience.outcome);

        let mut sound = 0u32;
        for (token, assessment) in &graded {
            if matches!(
                assessment.quality,
                MoveQuality::Brilliant | MoveQuality::Good | MoveQuality::Normal
            ) {
                sound += 1;
            }
            character.observe_move(token, assessment.quality);
        }
        if !graded.is_empty() {
            character.record_accuracy(sound as f32 / graded.len() as f32 * 100.0);
        }
        Ok(())
    }

    /// Score a move on an already-parsed board.
    pub fn score_on_board(
        &mut self,
        board: &Board,
        mv: ChessMove,
        fullmove: u32,
        personality: &Personality,
    ) -> Result<f32> {
        self.scorer
            .score(board, mv, fullmove, personality, self.rng.as_mut())
    }

    /// Pick a move on an already-parsed board. `None` at terminal positions.
    pub fn select_on_board(
        &mut self,
        board: &Board,
        fullmove: u32,
        personality: &Personality,
    ) -> Option<ScoredMove> {
        self.selector
            .select(board, fullmove, personality, self.rng.as_mut())
    }

    /// Grade a move on an already-parsed board.
    pub fn classify_on_board(
        &self,
        board: &Board,
        mv: ChessMove,
        fullmove: u32,
    ) -> Result<MoveAssessment> {
        self.classifier.classify(board, mv, fullmove)
    }

    pub fn agent(&self) -> &LearningAgent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut LearningAgent {
        &mut self.agent
    }

    /// Swap in a previously trained agent.
    pub fn set_agent(&mut self, agent: LearningAgent) {
        self.agent = agent;
    }

    /// Load learned state from disk, falling back to a fresh table when the
    /// file is missing or unreadable.
    pub fn load_knowledge<P: AsRef<Path>>(&mut self, path: P) {
        self.agent = LearningAgent::load_or_default(path);
    }

    /// Persist the learned state to disk.
    pub fn save_knowledge<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.agent.save(path)
    }
}

impl Default for PersonaEngine {
    fn default() -> Self {
        Self::new()
    }
}
