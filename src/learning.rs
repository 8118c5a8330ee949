//! Reinforcement learning over finished games.
//!
//! The agent keeps a value table keyed by position, then by move token.
//! After every game the terminal reward is propagated backward through the
//! played sequence with exponential discounting, and each visited entry takes
//! a single TD(0) step toward its propagated reward. Values for unseen
//! entries default to 0.0 and are never materialized by reads.

use std::collections::HashMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chess::{Board, ChessMove};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::rng::RandomSource;

pub const DEFAULT_LEARNING_RATE: f32 = 0.01;
pub const DEFAULT_DISCOUNT: f32 = 0.95;

const MOST_PLAYED_LIMIT: usize = 10;

/// Canonical key for a position, stable across process restarts.
///
/// The board's FEN rendering normalizes the clock fields, so transpositions
/// into the same position share one table entry regardless of move number.
pub fn position_key(board: &Board) -> String {
    board.to_string()
}

/// Result of a finished game, from the learner's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Win,
    Draw,
    Loss,
}

impl GameOutcome {
    /// Terminal learning reward.
    pub fn reward(self) -> f32 {
        match self {
            GameOutcome::Win => 1.0,
            GameOutcome::Draw => 0.0,
            GameOutcome::Loss => -1.0,
        }
    }

    /// Actual score for rating updates.
    pub fn score(self) -> f32 {
        match self {
            GameOutcome::Win => 1.0,
            GameOutcome::Draw => 0.5,
            GameOutcome::Loss => 0.0,
        }
    }
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GameOutcome::Win => "win",
            GameOutcome::Draw => "draw",
            GameOutcome::Loss => "loss",
        };
        write!(f, "{}", label)
    }
}

/// One side's moves from a finished game, in played order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameExperience {
    pub moves: Vec<(String, String)>,
    pub outcome: GameOutcome,
}

impl GameExperience {
    pub fn new(outcome: GameOutcome) -> Self {
        Self {
            moves: Vec::new(),
            outcome,
        }
    }

    /// Append a (position key, move token) pair.
    pub fn record(&mut self, position_key: &str, move_token: &str) {
        self.moves
            .push((position_key.to_string(), move_token.to_string()));
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Lifetime play statistics for a move token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStats {
    pub plays: u32,
    pub successes: u32,
}

impl MoveStats {
    /// Fraction of plays that fed back a positive reward, 0.0 before any play.
    pub fn success_rate(&self) -> f32 {
        if self.plays == 0 {
            0.0
        } else {
            self.successes as f32 / self.plays as f32
        }
    }
}

/// Aggregate view of the value table, for reports and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningSummary {
    pub positions_learned: usize,
    pub moves_tracked: usize,
    pub average_success_rate: f32,
    pub most_played: Vec<(String, u32)>,
}

/// TD(0) learner over (position, move) values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningAgent {
    values: HashMap<String, HashMap<String, f32>>,
    move_stats: HashMap<String, MoveStats>,
    learning_rate: f32,
    discount: f32,
    games_learned: u32,
}

impl Default for LearningAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl LearningAgent {
    pub fn new() -> Self {
        Self::with_parameters(DEFAULT_LEARNING_RATE, DEFAULT_DISCOUNT)
    }

    pub fn with_parameters(learning_rate: f32, discount: f32) -> Self {
        Self {
            values: HashMap::new(),
            move_stats: HashMap::new(),
            learning_rate,
            discount,
            games_learned: 0,
        }
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn discount(&self) -> f32 {
        self.discount
    }

    pub fn games_learned(&self) -> u32 {
        self.games_learned
    }

    pub fn positions_known(&self) -> usize {
        self.values.len()
    }

    /// Stored value of a move in a position, 0.0 when never updated.
    pub fn value_of(&self, position_key: &str, move_token: &str) -> f32 {
        self.values
            .get(position_key)
            .and_then(|entries| entries.get(move_token))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn stats_for(&self, move_token: &str) -> Option<&MoveStats> {
        self.move_stats.get(move_token)
    }

    /// One TD(0) step of the stored value toward `reward`.
    pub fn update(&mut self, position_key: &str, move_token: &str, reward: f32) {
        let value = self
            .values
            .entry(position_key.to_string())
            .or_default()
            .entry(move_token.to_string())
            .or_insert(0.0);
        *value += self.learning_rate * (reward - *value);
    }

    /// Fold a finished game into the table. The final move receives the full
    /// terminal reward; each step back toward the opening is discounted once
    /// more.
    pub fn learn_from_game(&mut self, experience: &GameExperience) {
        let mut reward = experience.outcome.reward();

        for (position_key, move_token) in experience.moves.iter().rev() {
            self.update(position_key, move_token, reward);

            let stats = self.move_stats.entry(move_token.clone()).or_default();
            stats.plays += 1;
            if reward > 0.0 {
                stats.successes += 1;
            }

            reward *= self.discount;
        }

        self.games_learned += 1;
    }

    /// Epsilon-greedy choice among `legal`: explore uniformly with
    /// probability `exploration`, otherwise take the highest-valued move.
    /// Ties keep the earliest candidate.
    pub fn select_move(
        &self,
        position_key: &str,
        legal: &[ChessMove],
        exploration: f32,
        rng: &mut dyn RandomSource,
    ) -> Option<ChessMove> {
        if legal.is_empty() {
            return None;
        }
        if rng.chance(exploration) {
            return Some(legal[rng.pick_index(legal.len())]);
        }

        let known = self.values.get(position_key);
        let mut best = legal[0];
        let mut best_value = f32::NEG_INFINITY;
        for &mv in legal {
            let value = known
                .and_then(|entries| entries.get(&mv.to_string()))
                .copied()
                .unwrap_or(0.0);
            if value > best_value {
                best = mv;
                best_value = value;
            }
        }
        Some(best)
    }

    /// The best-valued moves seen in a position, up to `limit`. Empty when
    /// the position was never updated.
    pub fn top_responses(&self, position_key: &str, limit: usize) -> Vec<(String, f32)> {
        let entries = match self.values.get(position_key) {
            Some(entries) => entries,
            None => return Vec::new(),
        };

        let mut ranked: Vec<(String, f32)> = entries
            .iter()
            .map(|(token, &value)| (token.clone(), value))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Aggregate statistics over everything learned so far. The success-rate
    /// average weighs each tracked move equally, not each play.
    pub fn summary(&self) -> LearningSummary {
        let rates: Vec<f32> = self
            .move_stats
            .values()
            .filter(|stats| stats.plays > 0)
            .map(MoveStats::success_rate)
            .collect();
        let average_success_rate = if rates.is_empty() {
            0.0
        } else {
            rates.iter().sum::<f32>() / rates.len() as f32
        };

        let mut most_played: Vec<(String, u32)> = self
            .move_stats
            .iter()
            .map(|(token, stats)| (token.clone(), stats.plays))
            .collect();
        most_played.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        most_played.truncate(MOST_PLAYED_LIMIT);

        LearningSummary {
            positions_learned: self.values.len(),
            moves_tracked: self.move_stats.len(),
            average_success_rate,
            most_played,
        }
    }

    /// Write the agent to disk with a timestamp header.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = KnowledgeFile {
            saved_at: unix_timestamp(),
            agent: self.clone(),
        };
        let encoded = bincode::serialize(&file)?;
        std::fs::write(path, encoded)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file: KnowledgeFile = bincode::deserialize(&bytes)?;
        Ok(file.agent)
    }

    /// Load a saved agent, falling back to a fresh one when the file is
    /// missing or unreadable. Either fallback is reported, so a mistyped
    /// path never silently discards learned state.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("no knowledge file at {}, starting fresh", path.display());
            return Self::new();
        }
        match Self::load(path) {
            Ok(agent) => agent,
            Err(err) => {
                log::warn!(
                    "discarding unreadable knowledge file {}: {}",
                    path.display(),
                    err
                );
                Self::new()
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct KnowledgeFile {
    saved_at: u64,
    agent: LearningAgent,
}

pub(crate) fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
