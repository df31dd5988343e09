//! Provides data and functions used to compute attacks
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use lazy_static::lazy_static;
use super::*;

const KNIGHT_OFFSETS: [(i8, i8); 8] =
    [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];

const KING_OFFSETS: [(i8, i8); 8] =
    [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)];

/// A direction a sliding piece can move in
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Direction {
    North, NorthEast, East, SouthEast, South, SouthWest, West, NorthWest,
}

impl Direction {
    const ORTHOGONAL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];
    const DIAGONAL: [Direction; 4] =
        [Direction::NorthEast, Direction::SouthEast, Direction::SouthWest, Direction::NorthWest];

    fn step(self) -> (i8, i8) {
        KING_OFFSETS[self as usize]
    }

    /// Steps one square from `sq` in this direction
    pub fn next(self, sq: Square) -> Option<Square> {
        let (df, dr) = self.step();
        sq.offset(df, dr)
    }

    // squares in these directions have increasing indices, so the nearest blocker is the lowest
    fn is_ascending(self) -> bool {
        match self {
            Direction::North | Direction::NorthEast | Direction::East | Direction::SouthEast => true,
            _ => false,
        }
    }
}

fn leaper_table(offsets: &[(i8, i8)]) -> [Bitboard; Square::COUNT] {
    let mut table = [Bitboard::EMPTY; Square::COUNT];

    for sq in Square::iter() {
        table[sq as usize] = offsets.iter().filter_map(|&(df, dr)| sq.offset(df, dr)).collect();
    }

    table
}

lazy_static! {
    static ref KNIGHT_ATTACKS: [Bitboard; Square::COUNT] = leaper_table(&KNIGHT_OFFSETS);

    static ref KING_ATTACKS: [Bitboard; Square::COUNT] = leaper_table(&KING_OFFSETS);

    static ref RAYS: [[Bitboard; Square::COUNT]; 8] = {
        let mut rays = [[Bitboard::EMPTY; Square::COUNT]; 8];

        for (dir, ray) in rays.iter_mut().enumerate() {
            let (df, dr) = KING_OFFSETS[dir];
            for sq in Square::iter() {
                let mut next = sq.offset(df, dr);
                while let Some(to) = next {
                    ray[sq as usize].insert(to);
                    next = to.offset(df, dr);
                }
            }
        }

        rays
    };

    static ref OUTER_RING: [Bitboard; Square::COUNT] = {
        let mut rings = [Bitboard::EMPTY; Square::COUNT];

        for sq in Square::iter() {
            for df in -2..=2 {
                for dr in -2..=2 {
                    if i8::max(i8::abs(df), i8::abs(dr)) == 2 {
                        if let Some(to) = sq.offset(df, dr) {
                            rings[sq as usize].insert(to);
                        }
                    }
                }
            }
        }

        rings
    };

    static ref FORWARD_SPAN: [[Bitboard; Square::COUNT]; Color::COUNT] = {
        let mut spans = [[Bitboard::EMPTY; Square::COUNT]; Color::COUNT];

        for &color in Color::ALL.iter() {
            for sq in Square::iter() {
                let mut next = sq.offset(0, color.forward());
                while let Some(to) = next {
                    spans[color as usize][sq as usize].insert(to);
                    next = to.offset(0, color.forward());
                }
            }
        }

        spans
    };
}

/// Computes the squares a knight on `sq` attacks
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq as usize]
}

/// Computes the squares a king on `sq` attacks
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq as usize]
}

/// Computes the squares attacked by a pawn of `color` on `sq`
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    [-1, 1].iter().filter_map(|&df| sq.offset(df, color.forward())).collect()
}

/// Returns every square from `sq` to the edge of the board in direction `dir`, not including `sq`
#[inline]
pub fn ray(dir: Direction, sq: Square) -> Bitboard {
    RAYS[dir as usize][sq as usize]
}

/// Casts a ray from `sq` in direction `dir`, stopping at (and including) the first occupied
/// square
pub fn ray_attacks(dir: Direction, sq: Square, occ: Bitboard) -> Bitboard {
    let ray = ray(dir, sq);
    let blockers = ray & occ;

    let nearest = if dir.is_ascending() { blockers.peek() } else { blockers.peek_last() };
    match nearest {
        Some(blocker) => ray ^ RAYS[dir as usize][blocker as usize],
        None => ray,
    }
}

/// Computes bishop-like attacks to or from `sq` based on the occupied squares
/// given by `occ`
pub fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    Direction::DIAGONAL.iter().fold(Bitboard::EMPTY, |att, &dir| att | ray_attacks(dir, sq, occ))
}

/// Computes rook-like attacks to or from `sq` based on the occupied squares
/// given by `occ`
pub fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    Direction::ORTHOGONAL.iter().fold(Bitboard::EMPTY, |att, &dir| att | ray_attacks(dir, sq, occ))
}

/// Computes queen-like attacks to or from square based on the occupied squares
/// given by `occ`
#[inline]
pub fn queen_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    rook_attacks(sq, occ) | bishop_attacks(sq, occ)
}

/// Computes the attacks of `piece` standing on `sq`. Pawns are not handled here since their
/// attacks depend on color; use [`pawn_attacks`] instead.
pub fn piece_attacks(piece: Piece, sq: Square, occ: Bitboard) -> Bitboard {
    match piece {
        Piece::Pawn => Bitboard::EMPTY,
        Piece::Knight => knight_attacks(sq),
        Piece::Bishop => bishop_attacks(sq, occ),
        Piece::Rook => rook_attacks(sq, occ),
        Piece::Queen => queen_attacks(sq, occ),
        Piece::King => king_attacks(sq),
    }
}

/// Returns the squares strictly between `a` and `b` when they share a rank, file or diagonal
pub fn between(a: Square, b: Square) -> Bitboard {
    let df = (b.file() as i8 - a.file() as i8).signum();
    let dr = (b.rank() as i8 - a.rank() as i8).signum();
    let aligned = b.file() == a.file() || b.rank() == a.rank()
        || i8::abs(b.file() as i8 - a.file() as i8) == i8::abs(b.rank() as i8 - a.rank() as i8);

    let mut squares = Bitboard::EMPTY;
    if aligned && a != b {
        let mut next = a.offset(df, dr);
        while let Some(sq) = next {
            if sq == b {
                break;
            }
            squares.insert(sq);
            next = sq.offset(df, dr);
        }
    }

    squares
}

/// The king's inner ring: the king square and every square adjacent to it
#[inline]
pub fn inner_ring(king: Square) -> Bitboard {
    KING_ATTACKS[king as usize] | king.into()
}

/// The king's outer ring: the squares exactly two steps from the king
#[inline]
pub fn outer_ring(king: Square) -> Bitboard {
    OUTER_RING[king as usize]
}

/// The squares in front of `sq` on its own file, from `color`'s point of view
#[inline]
pub fn forward_span(color: Color, sq: Square) -> Bitboard {
    FORWARD_SPAN[color as usize][sq as usize]
}

/// The files on either side of `file`
pub fn adjacent_files(file: File) -> Bitboard {
    Bitboard::from(file).shift_x(1) | Bitboard::from(file).shift_x(-1)
}

/// The squares that must be free of enemy pawns for a pawn of `color` on `sq` to be passed
pub fn passed_span(color: Color, sq: Square) -> Bitboard {
    let span = forward_span(color, sq);
    span | span.shift_x(1) | span.shift_x(-1)
}
