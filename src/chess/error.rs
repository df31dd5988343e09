//! Errors returned by notation parsing, position setup and move input
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Reasons a chess value could not be built.
///
/// The first two variants come from notation that is malformed. The setup variants come from a
/// FEN record that is well-formed but describes a position that cannot arise in a game.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// A FEN record, square, piece, color or move string is malformed
    ParseError,
    /// An index is outside the range of the target type
    TryFromIntError,

    /// A side has no king, or more than one
    InvalidKingCount,
    /// A pawn stands on its first or eighth rank
    InvalidPawnRank,
    /// The side not on move is in check
    KingCapturable,
    /// A castling right has no king or rook on its home square
    InvalidCastlingFlags,
    /// The en passant target has no pawn that just made a double step past it
    MissingEnPassantPawn,
    /// The en passant target, or the square the pawn came from, is occupied
    EnPassantSquareOccupied,

    /// A coordinate move does not match any legal move
    IllegalMove,
}

impl Error {
    /// Returns `true` for errors raised by a well-formed FEN record whose position is impossible
    pub fn is_invalid_setup(self) -> bool {
        use Error::*;

        match self {
            InvalidKingCount | InvalidPawnRank | KingCapturable | InvalidCastlingFlags
                | MissingEnPassantPawn | EnPassantSquareOccupied => true,
            ParseError | TryFromIntError | IllegalMove => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;

        match self {
            ParseError => "malformed notation",
            TryFromIntError => "index out of range",
            InvalidKingCount => "each side needs exactly one king",
            InvalidPawnRank => "pawn on its first or eighth rank",
            KingCapturable => "side not on move is in check",
            InvalidCastlingFlags => "castling right without king and rook at home",
            MissingEnPassantPawn => "no pawn to capture en passant",
            EnPassantSquareOccupied => "en passant squares are not empty",
            IllegalMove => "move is not legal here",
        }.fmt(f)
    }
}

impl std::error::Error for Error { }

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Result type used by the `chess` module
pub type Result<T> = std::result::Result<T, Error>;
