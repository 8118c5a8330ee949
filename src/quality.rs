//! Move-quality grading against the best available alternative.
//!
//! Grading is personality-free: every legal move is re-scored with a neutral
//! personality and no jitter, and the played move is judged by how far its
//! score falls below the best one. The thresholds are deliberately coarse;
//! they grade one-ply score gaps, not engine-depth analysis.

use chess::{Board, BoardStatus, ChessMove};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::invalid_move;
use crate::personality::Personality;
use crate::rng::ThreadRandom;
use crate::scoring::{is_capture, MoveScorer};

const BRILLIANT_GAP: f32 = 10.0;
const NORMAL_GAP: f32 = 50.0;
const INACCURACY_GAP: f32 = 100.0;
const MISTAKE_GAP: f32 = 200.0;

/// Quality tiers, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveQuality {
    Brilliant,
    Good,
    Normal,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl std::fmt::Display for MoveQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MoveQuality::Brilliant => "brilliant",
            MoveQuality::Good => "good",
            MoveQuality::Normal => "normal",
            MoveQuality::Inaccuracy => "inaccuracy",
            MoveQuality::Mistake => "mistake",
            MoveQuality::Blunder => "blunder",
        };
        write!(f, "{}", label)
    }
}

/// The classifier's verdict on one played move.
#[derive(Debug, Clone, Serialize)]
pub struct MoveAssessment {
    pub quality: MoveQuality,
    /// Neutral-personality score of the played move.
    pub score: f32,
    /// Neutral-personality score of the best legal move.
    pub best_score: f32,
    /// `best_score - score`; smaller is better.
    pub gap: f32,
    pub comment: String,
}

/// Grades played moves by score gap to the best alternative.
#[derive(Debug, Clone)]
pub struct QualityClassifier {
    scorer: MoveScorer,
}

impl Default for QualityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityClassifier {
    pub fn new() -> Self {
        Self {
            scorer: MoveScorer::deterministic(),
        }
    }

    /// Grade a move about to be played on `board`.
    pub fn classify(
        &self,
        board: &Board,
        played: ChessMove,
        fullmove: u32,
    ) -> Result<MoveAssessment> {
        if !board.legal(played) {
            return Err(invalid_move!("{} is not legal in this position", played));
        }

        // The scorer carries no jitter, so the random source is never drawn.
        let mut rng = ThreadRandom::new();
        let neutral = Personality::neutral();
        let scored = self.scorer.score_all(board, fullmove, &neutral, &mut rng);

        let single_reply = scored.len() == 1;
        let best_score = scored
            .iter()
            .map(|entry| entry.score)
            .fold(f32::NEG_INFINITY, f32::max);
        let score = match scored.iter().find(|entry| entry.mv == played) {
            Some(entry) => entry.score,
            None => self.scorer.score(board, played, fullmove, &neutral, &mut rng)?,
        };
        let gap = best_score - score;

        let capture = is_capture(board, played);
        let after = board.make_move_new(played);
        let checkmate = after.status() == BoardStatus::Checkmate;
        let check = after.checkers().popcnt() > 0;

        let quality = if checkmate {
            MoveQuality::Brilliant
        } else if single_reply {
            MoveQuality::Normal
        } else if gap <= BRILLIANT_GAP {
            if capture || check {
                MoveQuality::Brilliant
            } else {
                MoveQuality::Good
            }
        } else if gap <= NORMAL_GAP {
            MoveQuality::Normal
        } else if gap <= INACCURACY_GAP {
            MoveQuality::Inaccuracy
        } else if gap <= MISTAKE_GAP {
            MoveQuality::Mistake
        } else {
            MoveQuality::Blunder
        };

        Ok(MoveAssessment {
            quality,
            score,
            best_score,
            gap,
            comment: comment_for(quality, capture, check, checkmate),
        })
    }
}

fn comment_for(quality: MoveQuality, capture: bool, check: bool, checkmate: bool) -> String {
    let base = match quality {
        MoveQuality::Brilliant => "Excellent move!",
        MoveQuality::Good => "Good move",
        MoveQuality::Normal => "Decent move",
        MoveQuality::Inaccuracy => "Slightly inaccurate",
        MoveQuality::Mistake => "This is a mistake",
        MoveQuality::Blunder => "This is a blunder!",
    };

    // Suffixes stack: a capturing check carries both. Mate replaces the
    // plain check suffix.
    let mut comment = String::from(base);
    if capture {
        comment.push_str(" (Capture)");
    }
    if checkmate {
        comment.push_str(" (Checkmate!)");
    } else if check {
        comment.push_str(" (Check)");
    }
    comment
}
