//! Material values and piece-square tables, kept as separate middlegame and endgame scores
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::ops;
use super::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A pair of scores, one for the middlegame and one for the endgame, which are blended according
/// to the game phase.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Tapered {
    /// Middlegame score
    pub mg: i32,
    /// Endgame score
    pub eg: i32,
}

impl Tapered {
    /// Creates a tapered score
    pub const fn new(mg: i32, eg: i32) -> Tapered {
        Tapered { mg, eg }
    }

    /// Blends the two scores. `phase` runs from 0 (all pieces on the board) to 256 (only kings
    /// and pawns).
    pub fn blend(self, phase: i32) -> i32 {
        (self.mg * (256 - phase) + self.eg * phase) / 256
    }
}

impl ops::Add for Tapered {
    type Output = Tapered;

    fn add(self, rhs: Tapered) -> Tapered {
        Tapered::new(self.mg + rhs.mg, self.eg + rhs.eg)
    }
}

impl ops::AddAssign for Tapered {
    fn add_assign(&mut self, rhs: Tapered) {
        *self = *self + rhs;
    }
}

impl ops::Sub for Tapered {
    type Output = Tapered;

    fn sub(self, rhs: Tapered) -> Tapered {
        Tapered::new(self.mg - rhs.mg, self.eg - rhs.eg)
    }
}

impl ops::SubAssign for Tapered {
    fn sub_assign(&mut self, rhs: Tapered) {
        *self = *self - rhs;
    }
}

impl ops::Neg for Tapered {
    type Output = Tapered;

    fn neg(self) -> Tapered {
        Tapered::new(-self.mg, -self.eg)
    }
}

impl ops::Mul<i32> for Tapered {
    type Output = Tapered;

    fn mul(self, rhs: i32) -> Tapered {
        Tapered::new(self.mg * rhs, self.eg * rhs)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Material value of each piece type. The king has no material value.
pub const PIECE_VALUES: [Tapered; Piece::COUNT] = [
    Tapered::new(82, 94),
    Tapered::new(337, 281),
    Tapered::new(365, 297),
    Tapered::new(477, 512),
    Tapered::new(1025, 936),
    Tapered::new(0, 0),
];

/// Contribution of each piece type to the game phase
pub const PHASE_WEIGHTS: [i32; Piece::COUNT] = [0, 1, 1, 2, 4, 0];

/// Sum of `PHASE_WEIGHTS` over the starting material
pub const TOTAL_PHASE: i32 = 24;

/// Returns the material value of `piece`
#[inline]
pub fn material(piece: Piece) -> Tapered {
    PIECE_VALUES[piece as usize]
}

/// Returns the piece-square bonus for a `piece` of `color` standing on `sq`
pub fn psqt(color: Color, piece: Piece, sq: Square) -> Tapered {
    // tables are laid out as printed, rank 8 first; white reads them upside down
    let rank = match color {
        Color::White => 7 - sq.rank() as usize,
        Color::Black => sq.rank() as usize,
    };
    let index = rank * 8 + sq.file() as usize;

    Tapered::new(MG_TABLES[piece as usize][index] as i32, EG_TABLES[piece as usize][index] as i32)
}

const MG_TABLES: [[i16; Square::COUNT]; Piece::COUNT] = [
    // pawn
    [
          0,    0,    0,    0,    0,    0,    0,    0,
         92,  132,   66,  108,   92,  126,   12,  -31,
        -11,  -12,   21,   20,   61,   74,   15,  -18,
        -24,   -7,   -4,   15,   15,   12,    1,  -27,
        -35,  -24,  -13,    5,    9,    3,   -9,  -33,
        -35,  -30,  -20,  -22,  -10,  -10,    6,  -25,
        -43,  -25,  -33,  -34,  -31,    9,   11,  -33,
          0,    0,    0,    0,    0,    0,    0,    0,
    ],
    // knight
    [
       -208,  -82,  -49,  -46,   55, -122,  -24, -138,
        -79,  -39,   81,   38,   30,   75,    1,  -11,
        -36,   72,   47,   65,   94,  138,   69,   55,
         10,   34,   25,   56,   26,   76,   18,   34,
         11,   34,   36,   26,   44,   27,   37,   11,
          1,   15,   30,   37,   49,   36,   48,   11,
         -2,  -19,   16,   26,   25,   41,   21,   17,
        -97,    9,  -26,   -9,   21,    7,   14,    7,
    ],
    // bishop
    [
        -24,   26,  -83,  -45,  -21,  -36,   11,   14,
          6,   50,   14,    0,   54,   76,   43,  -24,
         23,   68,   82,   66,   59,   78,   51,   27,
         34,   41,   41,   71,   59,   53,   35,   24,
         38,   54,   49,   60,   69,   49,   48,   40,
         35,   58,   56,   53,   59,   77,   58,   45,
         46,   66,   60,   48,   58,   66,   84,   48,
          7,   39,   38,   30,   40,   36,    3,   19,
    ],
    // rook
    [
         -3,   13,  -21,   22,   21,  -19,    0,   -9,
          0,   -2,   31,   32,   57,   58,   -7,   19,
        -38,  -10,   -7,   -8,  -31,   22,   41,  -20,
        -46,  -33,  -16,   -2,  -17,   12,  -19,  -40,
        -53,  -46,  -29,  -27,  -13,  -27,   -1,  -39,
        -53,  -35,  -32,  -32,  -19,   -8,  -15,  -33,
        -49,  -27,  -34,  -24,  -16,    5,  -14,  -73,
        -20,  -20,  -13,   -2,   -1,   -2,  -38,  -17,
    ],
    // queen
    [
        -63,  -31,  -15,  -21,   37,   35,   30,   11,
        -33,  -62,  -24,  -27,  -69,   26,   -7,   18,
        -18,  -23,  -15,  -44,   -9,   25,    0,   18,
        -37,  -36,  -38,  -48,  -32,  -22,  -35,  -27,
         -8,  -39,  -23,  -24,  -23,  -18,  -17,  -13,
        -25,    9,   -9,   -1,   -4,    1,    7,   -1,
        -24,   -1,   20,   12,   18,   26,    7,   18,
         16,   -3,   10,   25,    0,   -7,  -10,  -27,
    ],
    // king
    [
        -50,   97,   97,   51,  -47,  -13,   42,   47,
        101,   32,   25,   64,   21,   13,  -21,  -63,
         37,   43,   55,    9,   26,   62,   59,  -15,
        -20,   -5,   10,  -23,  -18,  -20,  -24,  -57,
        -46,   11,  -35,  -72,  -73,  -51,  -61,  -79,
         -5,  -16,  -27,  -58,  -59,  -46,  -21,  -37,
         15,   18,  -10,  -58,  -38,  -15,   10,   18,
         -9,   36,   14,  -64,   -9,  -35,   28,   26,
    ],
];

const EG_TABLES: [[i16; Square::COUNT]; Piece::COUNT] = [
    // pawn
    [
          0,    0,    0,    0,    0,    0,    0,    0,
        168,  148,  132,  101,  115,  103,  154,  191,
         85,   81,   59,   31,   16,   22,   58,   71,
         22,    4,   -9,  -28,  -19,  -13,    0,    9,
         21,    9,   -1,   -9,   -9,   -8,   -2,    5,
          5,    0,   -9,   -5,   -4,   -8,  -16,  -11,
         16,   -2,    5,    2,   10,   -9,  -15,   -9,
          0,    0,    0,    0,    0,    0,    0,    0,
    ],
    // knight
    [
        -46,  -50,  -16,  -39,  -44,  -34,  -73,  -98,
        -31,  -14,  -48,  -18,  -28,  -52,  -34,  -62,
        -36,  -40,  -13,  -13,  -30,  -39,  -38,  -61,
        -24,  -10,    6,    7,   13,   -8,   -2,  -28,
        -29,  -24,   -1,   13,    2,    4,   -5,  -25,
        -33,  -14,  -18,    0,   -8,  -18,  -32,  -33,
        -44,  -28,  -19,  -15,  -12,  -30,  -30,  -53,
        -22,  -56,  -29,  -15,  -28,  -28,  -58,  -74,
    ],
    // bishop
    [
         -9,  -26,   -5,   -9,   -5,   -9,  -15,  -28,
        -11,  -17,   -4,  -16,  -16,  -24,  -16,  -15,
         -4,  -19,  -18,  -19,  -16,  -16,   -9,   -3,
         -7,    0,    2,   -5,   -1,   -4,   -8,    0,
        -14,   -9,    1,    4,  -11,   -2,  -15,  -11,
        -12,  -10,    0,   -1,    3,  -13,  -10,  -15,
        -16,  -24,  -13,   -5,   -3,  -17,  -21,  -32,
        -18,   -8,  -18,   -3,   -9,  -13,   -3,  -11,
    ],
    // rook
    [
          7,    1,   13,    2,    4,   12,    6,    7,
          8,   11,    0,    1,  -17,   -7,   12,    2,
         11,    8,    2,    3,    3,   -8,   -9,    1,
         13,    8,   14,    2,    4,    6,    2,   14,
         16,   19,   16,   12,    4,    8,   -2,    5,
         12,   12,    8,   12,    4,   -1,    5,   -2,
          9,    4,   13,   12,    1,   -4,   -4,   16,
          5,   11,    9,    0,   -2,   -3,   10,  -14,
    ],
    // queen
    [
         31,   57,   52,   52,   40,   36,   26,   58,
          5,   47,   49,   63,   91,   42,   55,   39,
         -1,   22,   18,   85,   67,   49,   53,   37,
         44,   43,   44,   69,   77,   59,   92,   68,
          0,   58,   43,   68,   53,   55,   72,   53,
         28,  -22,   32,   20,   31,   38,   47,   43,
         -3,   -7,  -19,    0,    5,    0,  -14,   -9,
        -19,  -16,   -5,  -29,   21,  -12,    2,  -26,
    ],
    // king
    [
        -72,  -51,  -33,  -29,   -4,   17,   -3,  -14,
        -32,    0,    1,   -3,    4,   28,   15,   21,
          2,    3,    4,    4,    4,   27,   26,   14,
         -7,   11,   14,   22,   18,   26,   21,   10,
        -14,  -15,   19,   27,   29,   22,    9,    0,
        -19,   -8,    8,   22,   24,   17,    3,   -3,
        -28,  -19,    5,   11,   12,    4,  -11,  -20,
        -53,  -47,  -23,    3,  -26,   -4,  -37,  -55,
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_reads_mirrored_squares() {
        for &piece in Piece::ALL.iter() {
            for sq in Square::iter() {
                assert_eq!(psqt(Color::White, piece, sq), psqt(Color::Black, piece, sq.flip()));
            }
        }
    }

    #[test]
    fn tables_are_oriented_from_whites_side() {
        // the knight on a1 is a bad square from either side
        assert_eq!(psqt(Color::White, Piece::Pawn, Square::E2), Tapered::new(-31, 10));
        assert_eq!(psqt(Color::White, Piece::Knight, Square::A1), Tapered::new(-97, -22));
        assert_eq!(psqt(Color::Black, Piece::Knight, Square::A8), Tapered::new(-97, -22));
    }

    #[test]
    fn tapered_blend() {
        let score = Tapered::new(100, 300);
        assert_eq!(score.blend(0), 100);
        assert_eq!(score.blend(256), 300);
        assert_eq!(score.blend(128), 200);
        assert_eq!(score * 2 - score, score);
        assert_eq!(-score + score, Tapered::default());
    }
}
