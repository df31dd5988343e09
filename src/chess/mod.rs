//! The `chess` module holds the board model: colors, pieces, squares, bitboards, positions and
//! moves.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::ops;
use std::fmt;
use std::mem;
use std::str::FromStr;
use std::convert::TryFrom;

pub mod error;
pub mod bitboard;
pub mod psqt;
pub mod moves;
pub mod position;
pub mod variations;

pub use error::{Error, Result};
pub use bitboard::Bitboard;
pub use moves::{Move, MoveFlags, MoveKind};
pub use position::{Position, Undo};
pub use position::zobrist::Zobrist;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Which side a piece or player is on, based on the color of the pieces for that side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The number of colors
    pub const COUNT: usize = 2;

    /// Both colors, white first
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    /// Direction pawns of this color move along a file: `1` for white, `-1` for black
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// The rank the king and rooks of this color start on
    pub fn home_rank(self) -> Rank {
        match self {
            Color::White => Rank::R1,
            Color::Black => Rank::R8,
        }
    }
}

impl ops::Not for Color {
    type Output = Color;

    /// Returns the opposite color
    ///
    /// # Example
    /// ```
    /// use kestrel::chess::Color;
    /// assert_eq!(!Color::White, Color::Black);
    /// assert_eq!(!Color::Black, Color::White);
    /// ```
    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => 'w'.fmt(f),
            Color::Black => 'b'.fmt(f),
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "w" => Ok(Color::White),
            "b" => Ok(Color::Black),
            _   => Err(Error::ParseError),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::White
    }
}

impl TryFrom<usize> for Color {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, Color>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

impl From<Color> for usize {
    fn from(value: Color) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The type of a chess piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    /// The number of piece types
    pub const COUNT: usize = Piece::King as usize + 1;

    /// Every piece type, from least to most valuable
    pub const ALL: [Piece; 6] =
        [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King];

    /// The pieces a pawn may promote to, most valuable first
    pub const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

    /// Returns the letter used for this piece in FEN, uppercase for white and lowercase for
    /// black
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            Piece::Pawn => 'P',
            Piece::Knight => 'N',
            Piece::Bishop => 'B',
            Piece::Rook => 'R',
            Piece::Queen => 'Q',
            Piece::King => 'K',
        };

        match color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    /// Parses a FEN piece letter into its color and piece type
    pub fn from_char(c: char) -> Option<(Color, Piece)> {
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        let piece = match c.to_ascii_uppercase() {
            'P' => Piece::Pawn,
            'N' => Piece::Knight,
            'B' => Piece::Bishop,
            'R' => Piece::Rook,
            'Q' => Piece::Queen,
            'K' => Piece::King,
            _ => return None,
        };

        Some((color, piece))
    }

    /// Returns `true` for bishops, rooks and queens
    pub fn is_slider(self) -> bool {
        match self {
            Piece::Bishop | Piece::Rook | Piece::Queen => true,
            _ => false,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_char(Color::White).fmt(f)
    }
}

impl FromStr for Piece {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();

        match (chars.next().and_then(Piece::from_char), chars.next()) {
            (Some((_, piece)), None) => Ok(piece),
            _ => Err(Error::ParseError),
        }
    }
}

impl Default for Piece {
    fn default() -> Self {
        Piece::Pawn
    }
}

impl TryFrom<usize> for Piece {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, Piece>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

impl From<Piece> for usize {
    fn from(value: Piece) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Vertical column of the board, labeled from left to right from `White`'s perspective as
/// `A` through `H`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum File {
    // discriminants are spelled out so nothing can go wrong when we use transmute later
    A = 0, B = 1, C = 2, D = 3, E = 4, F = 5, G = 6, H = 7,
}

impl File {
    /// The number of files
    pub const COUNT: usize = File::H as usize + 1;

    /// All files from `A` to `H`
    pub const ALL: [File; 8] =
        [File::A, File::B, File::C, File::D, File::E, File::F, File::G, File::H];
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        char::from(b'a' + *self as u8).fmt(f)
    }
}

impl FromStr for File {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.as_bytes() {
            [c @ b'a'..=b'h'] => File::try_from((c - b'a') as usize),
            [c @ b'A'..=b'H'] => File::try_from((c - b'A') as usize),
            _ => Err(Error::ParseError),
        }
    }
}

impl Default for File {
    fn default() -> Self {
        File::A
    }
}

impl TryFrom<usize> for File {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, File>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

impl From<File> for usize {
    fn from(value: File) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Horizontal row of the board, labeled from nearest to farthest from `White`'s perspective
/// as `R1` through `R8`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Rank {
    // discriminants are spelled out so nothing can go wrong when we use transmute later
    R1 = 0, R2 = 1, R3 = 2, R4 = 3, R5 = 4, R6 = 5, R7 = 6, R8 = 7,
}

impl Rank {
    /// The number of ranks
    pub const COUNT: usize = Rank::R8 as usize + 1;

    /// Returns the rank as seen from `color`'s side of the board, so `R2` for black is `R7`
    pub fn relative_to(self, color: Color) -> Rank {
        match color {
            Color::White => self,
            Color::Black => Rank::try_from(7 - self as usize).expect("INFALLIBLE"),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        char::from(b'1' + *self as u8).fmt(f)
    }
}

impl FromStr for Rank {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.as_bytes() {
            [c @ b'1'..=b'8'] => Rank::try_from((c - b'1') as usize),
            _ => Err(Error::ParseError),
        }
    }
}

impl Default for Rank {
    fn default() -> Self {
        Rank::R1
    }
}

impl TryFrom<usize> for Rank {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, Rank>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

impl From<Rank> for usize {
    fn from(value: Rank) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A specific square on the board, labeled using the `File` and `Rank` as coordinates.
///
/// Squares are numbered file by file, so moving one rank up adds one and moving one file to the
/// right adds eight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Square {
    // discriminants are spelled out so nothing can go wrong when we use transmute later
    A1 = 0o00, A2 = 0o01, A3 = 0o02, A4 = 0o03, A5 = 0o04, A6 = 0o05, A7 = 0o06, A8 = 0o07,
    B1 = 0o10, B2 = 0o11, B3 = 0o12, B4 = 0o13, B5 = 0o14, B6 = 0o15, B7 = 0o16, B8 = 0o17,
    C1 = 0o20, C2 = 0o21, C3 = 0o22, C4 = 0o23, C5 = 0o24, C6 = 0o25, C7 = 0o26, C8 = 0o27,
    D1 = 0o30, D2 = 0o31, D3 = 0o32, D4 = 0o33, D5 = 0o34, D6 = 0o35, D7 = 0o36, D8 = 0o37,
    E1 = 0o40, E2 = 0o41, E3 = 0o42, E4 = 0o43, E5 = 0o44, E6 = 0o45, E7 = 0o46, E8 = 0o47,
    F1 = 0o50, F2 = 0o51, F3 = 0o52, F4 = 0o53, F5 = 0o54, F6 = 0o55, F7 = 0o56, F8 = 0o57,
    G1 = 0o60, G2 = 0o61, G3 = 0o62, G4 = 0o63, G5 = 0o64, G6 = 0o65, G7 = 0o66, G8 = 0o67,
    H1 = 0o70, H2 = 0o71, H3 = 0o72, H4 = 0o73, H5 = 0o74, H6 = 0o75, H7 = 0o76, H8 = 0o77,
}

impl Square {
    /// The number of squares
    pub const COUNT: usize = Square::H8 as usize + 1;

    /// Returns a square from its file and rank
    pub fn from_coord(file: File, rank: Rank) -> Square {
        Square::try_from(((file as usize) << 3) + rank as usize).expect("INFALLIBLE")
    }

    /// Returns the square's file
    pub fn file(self) -> File {
        File::try_from((self as usize) >> 3).expect("INFALLIBLE")
    }

    /// Returns the square's rank
    pub fn rank(self) -> Rank {
        Rank::try_from((self as usize) & 7).expect("INFALLIBLE")
    }

    /// Returns the square's rank from `color`'s point of view
    pub fn relative_rank(self, color: Color) -> Rank {
        self.rank().relative_to(color)
    }

    /// Returns the square on the same file with the rank mirrored, so `E2` becomes `E7`
    pub fn flip(self) -> Square {
        Square::try_from(self as usize ^ 0o07).expect("INFALLIBLE")
    }

    /// Returns the square `df` files and `dr` ranks away, or `None` if that is off the board
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = (self as i8 >> 3) + df;
        let rank = (self as i8 & 7) + dr;

        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Square::try_from(((file << 3) + rank) as usize).ok()
        } else {
            None
        }
    }

    /// Iterates over all 64 squares in index order
    pub fn iter() -> impl Iterator<Item = Square> {
        (0..Square::COUNT).map(|i| Square::try_from(i).expect("INFALLIBLE"))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl FromStr for Square {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() == 2 && s.is_char_boundary(1) {
            Ok(Square::from_coord(s[..1].parse()?, s[1..].parse()?))
        } else {
            Err(Error::ParseError)
        }
    }
}

impl Default for Square {
    fn default() -> Self {
        Square::A1
    }
}

impl TryFrom<usize> for Square {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, Square>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

impl From<Square> for usize {
    fn from(value: Square) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_round_trips_through_text() {
        for &color in Color::ALL.iter() {
            assert_eq!(color.to_string().parse::<Color>(), Ok(color));
        }
        assert_eq!("x".parse::<Color>(), Err(Error::ParseError));
        assert_eq!(Color::try_from(2), Err(Error::TryFromIntError));
    }

    #[test]
    fn piece_letters() {
        assert_eq!(Piece::Knight.to_char(Color::White), 'N');
        assert_eq!(Piece::Queen.to_char(Color::Black), 'q');
        assert_eq!(Piece::from_char('k'), Some((Color::Black, Piece::King)));
        assert_eq!(Piece::from_char('P'), Some((Color::White, Piece::Pawn)));
        assert_eq!(Piece::from_char('x'), None);
        assert_eq!("r".parse::<Piece>(), Ok(Piece::Rook));
        assert!("rr".parse::<Piece>().is_err());
    }

    #[test]
    fn square_coordinates() {
        assert_eq!(Square::from_coord(File::E, Rank::R4), Square::E4);
        assert_eq!(Square::G7.file(), File::G);
        assert_eq!(Square::G7.rank(), Rank::R7);
        assert_eq!("h8".parse::<Square>(), Ok(Square::H8));
        assert_eq!(Square::C6.to_string(), "c6");
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
        assert_eq!(Square::iter().count(), 64);
    }

    #[test]
    fn square_geometry() {
        assert_eq!(Square::E2.flip(), Square::E7);
        assert_eq!(Square::A8.flip(), Square::A1);
        assert_eq!(Square::B2.relative_rank(Color::Black), Rank::R7);
        assert_eq!(Square::B2.relative_rank(Color::White), Rank::R2);
        assert_eq!(Square::G1.offset(1, 2), Some(Square::H3));
        assert_eq!(Square::G1.offset(2, 1), None);
        assert_eq!(Square::A1.offset(0, -1), None);
        assert_eq!(Square::D4.offset(-3, 4), Some(Square::A8));
    }
}
