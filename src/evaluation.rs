//! Personality-independent position scoring.
//!
//! `evaluate` returns a single score meaning "goodness for the side to move".
//! The component sums (material, piece squares, castling rights, center
//! control) are white-relative and exposed individually so the move scorer
//! can re-sign them for the moving side.

use chess::{BitBoard, Board, BoardStatus, Color, MoveGen, Piece, Square};

/// Mate score magnitude. Terminal positions saturate the evaluation scale.
pub const MATE_SCORE: f32 = 20000.0;

const MOBILITY_WEIGHT: f32 = 10.0;
const KINGSIDE_CASTLE_BONUS: i32 = 30;
const QUEENSIDE_CASTLE_BONUS: i32 = 20;
const CENTER_OCCUPANCY_BONUS: i32 = 20;
const CENTER_ATTACKER_BONUS: i32 = 5;

/// The four classical center squares.
pub const CENTER_SQUARES: [Square; 4] = [Square::D4, Square::D5, Square::E4, Square::E5];

const LIGHT_SQUARES: BitBoard = BitBoard(0x55AA_55AA_55AA_55AA);
const DARK_SQUARES: BitBoard = BitBoard(0xAA55_AA55_AA55_AA55);

// Pawn table - reward center pawns and advancement
const PAWN_TABLE: [i32; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 50, 50, 50, 50, 50, 50, 50, 50, 10, 10, 20, 30, 30, 20, 10, 10, 5, 5,
    10, 25, 25, 10, 5, 5, 0, 0, 0, 20, 20, 0, 0, 0, 5, -5, -10, 0, 0, -10, -5, 5, 5, 10, 10, -20,
    -20, 10, 10, 5, 0, 0, 0, 0, 0, 0, 0, 0,
];

// Knight table - centralization matters, the rim is penalized
const KNIGHT_TABLE: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50, -40, -20, 0, 0, 0, 0, -20, -40, -30, 0, 10, 15, 15, 10,
    0, -30, -30, 5, 15, 20, 20, 15, 5, -30, -30, 0, 15, 20, 20, 15, 0, -30, -30, 5, 10, 15, 15, 10,
    5, -30, -40, -20, 0, 5, 5, 0, -20, -40, -50, -40, -30, -30, -30, -30, -40, -50,
];

// Bishop table - long diagonals are where bishops belong
const BISHOP_TABLE: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20, -10, 0, 0, 0, 0, 0, 0, -10, -10, 0, 5, 10, 10, 5, 0,
    -10, -10, 5, 5, 10, 10, 5, 5, -10, -10, 0, 10, 10, 10, 10, 0, -10, -10, 10, 10, 10, 10, 10, 10,
    -10, -10, 5, 0, 0, 0, 0, 5, -10, -20, -10, -10, -10, -10, -10, -10, -20,
];

/// Standard centipawn values for chess pieces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceValues {
    pub pawn: i32,
    pub knight: i32,
    pub bishop: i32,
    pub rook: i32,
    pub queen: i32,
    /// Nominal value, used only when pricing attacked pieces — the king never
    /// enters the material balance.
    pub king: i32,
}

impl Default for PieceValues {
    fn default() -> Self {
        Self {
            pawn: 100,
            knight: 320,
            bishop: 330,
            rook: 500,
            queen: 900,
            king: 20000,
        }
    }
}

impl PieceValues {
    pub fn value_of(&self, piece: Piece) -> i32 {
        match piece {
            Piece::Pawn => self.pawn,
            Piece::Knight => self.knight,
            Piece::Bishop => self.bishop,
            Piece::Rook => self.rook,
            Piece::Queen => self.queen,
            Piece::King => self.king,
        }
    }
}

/// Pure function of the position: material, piece-square tables, mobility,
/// king safety via castling rights, and center control.
#[derive(Debug, Clone)]
pub struct PositionEvaluator {
    piece_values: PieceValues,
}

impl Default for PositionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionEvaluator {
    pub fn new() -> Self {
        Self {
            piece_values: PieceValues::default(),
        }
    }

    pub fn piece_values(&self) -> &PieceValues {
        &self.piece_values
    }

    /// Score the position for the side to move.
    ///
    /// Checkmate is −[`MATE_SCORE`] (the side to move is the mated side);
    /// stalemate and dead material are 0. Otherwise the weighted component
    /// sum, sign-flipped when black is to move.
    pub fn evaluate(&self, board: &Board) -> f32 {
        match board.status() {
            BoardStatus::Checkmate => return -MATE_SCORE,
            BoardStatus::Stalemate => return 0.0,
            BoardStatus::Ongoing => {}
        }
        if insufficient_material(board) {
            return 0.0;
        }

        let mut score = self.material(board) as f32;
        score += self.piece_squares(board) as f32;
        score += self.mobility(board) as f32 * MOBILITY_WEIGHT;
        score += self.castling_rights(board) as f32;
        score += self.center_control(board) as f32;

        if board.side_to_move() == Color::White {
            score
        } else {
            -score
        }
    }

    /// Material balance in centipawns, white minus black, kings excluded.
    pub fn material(&self, board: &Board) -> i32 {
        let mut balance = 0;

        for (piece, value) in [
            (Piece::Pawn, self.piece_values.pawn),
            (Piece::Knight, self.piece_values.knight),
            (Piece::Bishop, self.piece_values.bishop),
            (Piece::Rook, self.piece_values.rook),
            (Piece::Queen, self.piece_values.queen),
        ] {
            let white = (board.pieces(piece) & board.color_combined(Color::White)).popcnt() as i32;
            let black = (board.pieces(piece) & board.color_combined(Color::Black)).popcnt() as i32;
            balance += (white - black) * value;
        }

        balance
    }

    /// Piece-square contribution, white minus black. Black pieces index the
    /// vertically mirrored square.
    pub fn piece_squares(&self, board: &Board) -> i32 {
        let mut score = 0;

        for color in [Color::White, Color::Black] {
            let sign = if color == Color::White { 1 } else { -1 };

            for (piece, table) in [
                (Piece::Pawn, &PAWN_TABLE),
                (Piece::Knight, &KNIGHT_TABLE),
                (Piece::Bishop, &BISHOP_TABLE),
            ] {
                let pieces = board.pieces(piece) & board.color_combined(color);
                for square in pieces {
                    let idx = if color == Color::White {
                        square.to_index()
                    } else {
                        square.to_index() ^ 56
                    };
                    score += sign * table[idx];
                }
            }
        }

        score
    }

    /// Legal-move count of the side to move minus the opponent's count after
    /// a null move. The opponent counts as 0 when the null move is
    /// unavailable (side to move in check).
    pub fn mobility(&self, board: &Board) -> i32 {
        let own = MoveGen::new_legal(board).count() as i32;
        let opponent = match board.null_move() {
            Some(flipped) => MoveGen::new_legal(&flipped).count() as i32,
            None => 0,
        };
        own - opponent
    }

    /// Castling-rights king safety term, white minus black.
    pub fn castling_rights(&self, board: &Board) -> i32 {
        let mut score = 0;

        let white = board.castle_rights(Color::White);
        if white.has_kingside() {
            score += KINGSIDE_CASTLE_BONUS;
        }
        if white.has_queenside() {
            score += QUEENSIDE_CASTLE_BONUS;
        }

        let black = board.castle_rights(Color::Black);
        if black.has_kingside() {
            score -= KINGSIDE_CASTLE_BONUS;
        }
        if black.has_queenside() {
            score -= QUEENSIDE_CASTLE_BONUS;
        }

        score
    }

    /// Center occupancy and attack pressure on d4/d5/e4/e5, white minus black.
    pub fn center_control(&self, board: &Board) -> i32 {
        let mut score = 0;

        for square in CENTER_SQUARES {
            if let Some(color) = board.color_on(square) {
                score += if color == Color::White {
                    CENTER_OCCUPANCY_BONUS
                } else {
                    -CENTER_OCCUPANCY_BONUS
                };
            }

            let white_attackers = attackers_of(board, Color::White, square) as i32;
            let black_attackers = attackers_of(board, Color::Black, square) as i32;
            score += (white_attackers - black_attackers) * CENTER_ATTACKER_BONUS;
        }

        score
    }
}

/// Count how many pieces of a given color attack a square.
pub fn attackers_of(board: &Board, side: Color, square: Square) -> u32 {
    let mut count = 0;

    // Pawn attacks: a pawn of `side` attacks `square` iff an opposite-color
    // pawn on `square` would attack the pawn's own square.
    let pawn_attacks = chess::get_pawn_attacks(square, !side, !chess::EMPTY);
    let pawns = board.pieces(Piece::Pawn) & board.color_combined(side);
    count += (pawn_attacks & pawns).popcnt();

    // Knight attacks
    let knight_attacks = chess::get_knight_moves(square);
    let knights = board.pieces(Piece::Knight) & board.color_combined(side);
    count += (knight_attacks & knights).popcnt();

    // King attacks
    let king_attacks = chess::get_king_moves(square);
    let kings = board.pieces(Piece::King) & board.color_combined(side);
    count += (king_attacks & kings).popcnt();

    // Sliding piece attacks respect the current occupancy
    let all_pieces = *board.combined();

    let bishop_attacks = chess::get_bishop_moves(square, all_pieces);
    let bishops_queens = (board.pieces(Piece::Bishop) | board.pieces(Piece::Queen))
        & board.color_combined(side);
    count += (bishop_attacks & bishops_queens).popcnt();

    let rook_attacks = chess::get_rook_moves(square, all_pieces);
    let rooks_queens =
        (board.pieces(Piece::Rook) | board.pieces(Piece::Queen)) & board.color_combined(side);
    count += (rook_attacks & rooks_queens).popcnt();

    count
}

/// True when neither side retains mating material: any pawn, rook or queen is
/// enough; otherwise a lone minor piece or bishops confined to one color
/// complex cannot force mate.
pub fn insufficient_material(board: &Board) -> bool {
    let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    if heavy.popcnt() > 0 {
        return false;
    }

    let knights = board.pieces(Piece::Knight).popcnt();
    let bishops = *board.pieces(Piece::Bishop);

    if knights == 0 {
        (bishops & LIGHT_SQUARES) == chess::EMPTY || (bishops & DARK_SQUARES) == chess::EMPTY
    } else {
        knights == 1 && bishops == chess::EMPTY
    }
}
