//! Personality-weighted move scoring.
//!
//! Every candidate move is priced as a sum of additive terms. Trait-weighted
//! terms scale with the matching [`Personality`] trait, so a trait of 0.0
//! silences its term entirely. A bounded random jitter is added last to keep
//! play from being deterministic move-for-move.

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square};

use crate::errors::Result;
use crate::evaluation::{attackers_of, PositionEvaluator, CENTER_SQUARES};
use crate::invalid_move;
use crate::personality::Personality;
use crate::rng::RandomSource;

/// Default half-width of the uniform jitter term.
pub const DEFAULT_JITTER: f32 = 5.0;

const PAWN_UNIT: f32 = 100.0;
const CHECKMATE_BONUS: f32 = 10000.0;
const CHECK_BONUS: f32 = 30.0;
const ATTACKED_VALUE_SCALE: f32 = 200.0;
const CAPTURE_BONUS: f32 = 50.0;
const CENTER_DEST_BONUS: f32 = 20.0;
const DEVELOPMENT_BONUS: f32 = 15.0;
const DEVELOPMENT_MOVE_LIMIT: u32 = 10;

// Home squares of the minor pieces, for the development bonus
const DEVELOPMENT_SQUARES: [Square; 8] = [
    Square::B1,
    Square::G1,
    Square::C1,
    Square::F1,
    Square::B8,
    Square::G8,
    Square::C8,
    Square::F8,
];

/// A legal move paired with its personality-weighted score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMove {
    pub mv: ChessMove,
    pub score: f32,
}

/// The additive terms behind a move's score, before jitter. Trait-weighted
/// terms are stored already multiplied by their trait.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub material: f32,
    pub positional: f32,
    pub tactical: f32,
    pub aggression: f32,
    pub king_safety: f32,
    pub center_control: f32,
    pub development: f32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f32 {
        self.material
            + self.positional
            + self.tactical
            + self.aggression
            + self.king_safety
            + self.center_control
            + self.development
    }
}

/// Scores single moves and whole legal-move lists for a given personality.
#[derive(Debug, Clone)]
pub struct MoveScorer {
    evaluator: PositionEvaluator,
    jitter: f32,
}

impl Default for MoveScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveScorer {
    pub fn new() -> Self {
        Self::with_jitter(DEFAULT_JITTER)
    }

    /// A scorer with a custom jitter half-width. Zero disables jitter.
    pub fn with_jitter(jitter: f32) -> Self {
        Self {
            evaluator: PositionEvaluator::new(),
            jitter: jitter.max(0.0),
        }
    }

    /// A jitter-free scorer, for comparisons that must be repeatable.
    pub fn deterministic() -> Self {
        Self::with_jitter(0.0)
    }

    /// Score one move for the side to move. `fullmove` is the game's
    /// fullmove number before the move is played.
    pub fn score(
        &self,
        board: &Board,
        mv: ChessMove,
        fullmove: u32,
        personality: &Personality,
        rng: &mut dyn RandomSource,
    ) -> Result<f32> {
        if !board.legal(mv) {
            return Err(invalid_move!("{} is not legal in this position", mv));
        }

        let mut score = self.breakdown(board, mv, fullmove, personality).total();
        if self.jitter > 0.0 {
            score += rng.next_in(-self.jitter, self.jitter);
        }
        Ok(score)
    }

    /// Score every legal move, in move-generation order.
    pub fn score_all(
        &self,
        board: &Board,
        fullmove: u32,
        personality: &Personality,
        rng: &mut dyn RandomSource,
    ) -> Vec<ScoredMove> {
        MoveGen::new_legal(board)
            .map(|mv| {
                let mut score = self.breakdown(board, mv, fullmove, personality).total();
                if self.jitter > 0.0 {
                    score += rng.next_in(-self.jitter, self.jitter);
                }
                ScoredMove { mv, score }
            })
            .collect()
    }

    /// The jitter-free term decomposition of a move's score.
    pub fn explain(
        &self,
        board: &Board,
        mv: ChessMove,
        fullmove: u32,
        personality: &Personality,
    ) -> Result<ScoreBreakdown> {
        if !board.legal(mv) {
            return Err(invalid_move!("{} is not legal in this position", mv));
        }
        Ok(self.breakdown(board, mv, fullmove, personality))
    }

    fn breakdown(
        &self,
        board: &Board,
        mv: ChessMove,
        fullmove: u32,
        personality: &Personality,
    ) -> ScoreBreakdown {
        let mover = board.side_to_move();
        let sign = if mover == Color::White { 1.0 } else { -1.0 };
        let capture = is_capture(board, mv);
        let material_before = self.evaluator.material(board);

        let after = board.make_move_new(mv);
        let delivers_check = after.checkers().popcnt() > 0;

        let mut breakdown = ScoreBreakdown::default();

        // Material swing caused by the move, in pawn units for the mover
        let material_delta = self.evaluator.material(&after) - material_before;
        breakdown.material = sign * material_delta as f32 / PAWN_UNIT;

        breakdown.positional =
            sign * self.evaluator.piece_squares(&after) as f32 / PAWN_UNIT * personality.positional;

        let mut tactical = 0.0;
        if after.status() == BoardStatus::Checkmate {
            tactical += CHECKMATE_BONUS;
        } else if delivers_check {
            tactical += CHECK_BONUS;
        }
        // Every enemy piece left under attack adds a slice of its value.
        // Checks are priced above, so the enemy king is skipped here.
        let values = self.evaluator.piece_values();
        for square in *after.color_combined(!mover) {
            if let Some(piece) = after.piece_on(square) {
                if piece == Piece::King {
                    continue;
                }
                if attackers_of(&after, mover, square) > 0 {
                    tactical += values.value_of(piece) as f32 / ATTACKED_VALUE_SCALE;
                }
            }
        }
        breakdown.tactical = tactical * personality.tactical;

        let mut aggression = 0.0;
        if capture {
            aggression += CAPTURE_BONUS;
        }
        if delivers_check {
            aggression += CHECK_BONUS;
        }
        breakdown.aggression = aggression * personality.aggression;

        breakdown.king_safety =
            sign * self.evaluator.castling_rights(&after) as f32 * personality.defensiveness;

        if CENTER_SQUARES.contains(&mv.get_dest()) {
            breakdown.center_control = CENTER_DEST_BONUS;
        }

        if fullmove <= DEVELOPMENT_MOVE_LIMIT && DEVELOPMENT_SQUARES.contains(&mv.get_source()) {
            breakdown.development = DEVELOPMENT_BONUS;
        }

        breakdown
    }
}

/// True when the move takes an enemy piece, including en passant.
pub fn is_capture(board: &Board, mv: ChessMove) -> bool {
    if board.piece_on(mv.get_dest()).is_some() {
        return true;
    }
    // A pawn leaving its file onto an empty square is an en passant capture
    board.piece_on(mv.get_source()) == Some(Piece::Pawn)
        && mv.get_source().get_file() != mv.get_dest().get_file()
}

/// True when the move leaves the opponent in check. The move must be legal.
pub fn gives_check(board: &Board, mv: ChessMove) -> bool {
    board.make_move_new(mv).checkers().popcnt() > 0
}
