//! Whole-game review: replay a move list and grade every move.

use chess::{Board, ChessMove, Color};

use crate::errors::Result;
use crate::invalid_move;
use crate::quality::{MoveAssessment, MoveQuality, QualityClassifier};

/// One graded move of a reviewed game.
#[derive(Debug, Clone)]
pub struct ReviewedMove {
    /// Fullmove number the move was played on.
    pub number: u32,
    pub side: Color,
    pub token: String,
    pub assessment: MoveAssessment,
}

/// Count of moves per quality tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityTally {
    pub brilliant: u32,
    pub good: u32,
    pub normal: u32,
    pub inaccuracies: u32,
    pub mistakes: u32,
    pub blunders: u32,
}

impl QualityTally {
    fn count(&mut self, quality: MoveQuality) {
        match quality {
            MoveQuality::Brilliant => self.brilliant += 1,
            MoveQuality::Good => self.good += 1,
            MoveQuality::Normal => self.normal += 1,
            MoveQuality::Inaccuracy => self.inaccuracies += 1,
            MoveQuality::Mistake => self.mistakes += 1,
            MoveQuality::Blunder => self.blunders += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.brilliant + self.good + self.normal + self.inaccuracies + self.mistakes + self.blunders
    }
}

/// The graded moves of one game with summary numbers.
#[derive(Debug, Clone)]
pub struct GameReview {
    pub moves: Vec<ReviewedMove>,
    pub tally: QualityTally,
    /// Percentage of moves graded normal or better.
    pub accuracy: f32,
}

impl GameReview {
    pub fn best(&self) -> Option<&ReviewedMove> {
        self.moves
            .iter()
            .min_by_key(|reviewed| reviewed.assessment.quality)
    }

    pub fn worst(&self) -> Option<&ReviewedMove> {
        self.moves
            .iter()
            .max_by_key(|reviewed| reviewed.assessment.quality)
    }
}

/// Replays move lists through the quality classifier.
#[derive(Debug, Clone, Default)]
pub struct GameReviewer {
    classifier: QualityClassifier,
}

impl GameReviewer {
    pub fn new() -> Self {
        Self {
            classifier: QualityClassifier::new(),
        }
    }

    /// Review a game played out from the standard starting position.
    pub fn review_game(&self, moves: &[ChessMove]) -> Result<GameReview> {
        self.review(&Board::default(), 1, moves)
    }

    /// Review a move list starting from an arbitrary position.
    pub fn review(
        &self,
        start: &Board,
        start_fullmove: u32,
        moves: &[ChessMove],
    ) -> Result<GameReview> {
        let mut board = *start;
        let mut fullmove = start_fullmove;
        let mut reviewed = Vec::with_capacity(moves.len());
        let mut tally = QualityTally::default();

        for &mv in moves {
            if !board.legal(mv) {
                return Err(invalid_move!(
                    "{} is not legal after {} plies",
                    mv,
                    reviewed.len()
                ));
            }

            let side = board.side_to_move();
            let assessment = self.classifier.classify(&board, mv, fullmove)?;
            tally.count(assessment.quality);
            reviewed.push(ReviewedMove {
                number: fullmove,
                side,
                token: mv.to_string(),
                assessment,
            });

            board = board.make_move_new(mv);
            if side == Color::Black {
                fullmove += 1;
            }
        }

        let accuracy = if reviewed.is_empty() {
            100.0
        } else {
            let sound = tally.brilliant + tally.good + tally.normal;
            sound as f32 / reviewed.len() as f32 * 100.0
        };

        Ok(GameReview {
            moves: reviewed,
            tally,
            accuracy,
        })
    }
}
