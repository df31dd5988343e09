//! Provides a representation of the pieces on the board
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryInto;
use std::iter::FusedIterator;
use std::iter::{FromIterator, Extend};
use std::ops;
use std::fmt;
use super::*;

mod attacks;
pub use attacks::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A set of squares with each bit representing one square
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(u64);

impl Bitboard {
    /// The empty set
    pub const EMPTY: Bitboard = Bitboard(0);

    /// Every square on the board
    pub const FULL: Bitboard = Bitboard(!0);

    /// Creates a new, empty bitboard
    pub fn new() -> Bitboard {
        Default::default()
    }

    /// Returns the number of squares in the bitboard
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if the bitboard is empty
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the bitboard contains `sq`
    pub fn contains(self, sq: Square) -> bool {
        !(self & sq.into()).is_empty()
    }

    /// Returns `true` if `self` intersects `other`
    pub fn intersects(self, other: Bitboard) -> bool {
        !(self & other).is_empty()
    }

    /// Returns `true` if `self` does not intersect `other`
    pub fn is_disjoint(self, other: Bitboard) -> bool {
        (self & other).is_empty()
    }

    /// Adds a square to the bitboard if it is not already present
    pub fn insert(&mut self, sq: Square) {
        *self |= sq.into();
    }

    /// Removes a square from the bitboard if it is present
    pub fn remove(&mut self, sq: Square) {
        *self &= !Bitboard::from(sq);
    }

    /// Removes the lowest square from the bitboard and returns it
    pub fn pop(&mut self) -> Option<Square> {
        let sq = self.peek()?;
        // clear the least significant bit
        self.0 &= self.0 - 1;
        Some(sq)
    }

    /// Returns the square that would be removed by a pop command
    pub fn peek(self) -> Option<Square> {
        if self.0 > 0 {
            // get the least significant bit
            Some((self.0.trailing_zeros() as usize).try_into().expect("INFALLIBLE"))
        } else {
            None
        }
    }

    /// Returns the highest square in the bitboard
    pub fn peek_last(self) -> Option<Square> {
        if self.0 > 0 {
            Some((63 - self.0.leading_zeros() as usize).try_into().expect("INFALLIBLE"))
        } else {
            None
        }
    }

    /// Toggles a square in the bitboard
    pub fn toggle(&mut self, sq: Square) {
        *self ^= sq.into();
    }

    /// Returns a bitboard with all squares shifted by `x` files
    pub fn shift_x(self, x: i8) -> Bitboard {
        Bitboard::shift_bits(self.0, x << 3)
    }

    /// Returns a bitboard with all squares shifted by `y` ranks
    ///
    /// Rank overflow wraps to the next or previous file.
    pub fn shift_y(self, y: i8) -> Bitboard {
        Bitboard::shift_bits(self.0, y)
    }

    /// Returns a bitboard with all squares shifted by `x` files and `y` ranks.
    ///
    /// Rank overflow wraps to the next or previous file.
    pub fn shift_xy(self, x: i8, y: i8) -> Bitboard {
        Bitboard::shift_bits(self.0, (x << 3) + y)
    }

    fn shift_bits(bits: u64, n: i8) -> Bitboard {
        if n >= 0 {
            Bitboard(bits << n)
        } else {
            Bitboard(bits >> -n)
        }
    }

    /// Returns the set of files that hold at least one square of `self`, expanded to full files
    pub fn file_fill(self) -> Bitboard {
        let mut files = Bitboard::EMPTY;

        for &file in File::ALL.iter() {
            if self.intersects(file.into()) {
                files |= file.into();
            }
        }

        files
    }
}

impl ops::Not for Bitboard {
    type Output = Self;

    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

impl ops::BitAnd for Bitboard {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 & rhs.0)
    }
}

impl ops::BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0
    }
}

impl ops::BitOr for Bitboard {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl ops::BitXor for Bitboard {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl ops::BitXorAssign for Bitboard {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for Bitboard {
    fn from(val: u64) -> Bitboard {
        Bitboard(val)
    }
}

impl From<Bitboard> for u64 {
    fn from(bb: Bitboard) -> u64 {
        bb.0
    }
}

impl From<Square> for Bitboard {
    fn from(sq: Square) -> Bitboard {
        Bitboard(1 << sq as u64)
    }
}

impl From<File> for Bitboard {
    fn from(f: File) -> Bitboard {
        Bitboard(0x0000_0000_0000_00ff << (8 * f as u64))
    }
}

impl From<Rank> for Bitboard {
    fn from(r: Rank) -> Bitboard {
        Bitboard(0x0101_0101_0101_0101 << r as u64)
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item=Square>>(iter: I) -> Self {
        let mut bd = Bitboard::new();
        bd.extend(iter);
        bd
    }
}

impl Extend<Square> for Bitboard {
    fn extend<I: IntoIterator<Item=Square>>(&mut self, iter: I) {
        for sq in iter {
            self.insert(sq);
        }
    }
}

/// Iterator over the squares of a `Bitboard`, lowest square first
#[derive(Debug, Copy, Clone)]
pub struct IntoIter(Bitboard);

impl Iterator for IntoIter {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl ExactSizeIterator for IntoIter { }

impl FusedIterator for IntoIter { }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_operations() {
        assert_eq!(Bitboard::new(), Bitboard::EMPTY);
        assert_eq!(Bitboard::FULL.len(), 64);
        assert!(Bitboard::from(Square::A1).contains(Square::A1));
        assert!(!Bitboard::from(Square::A1).contains(Square::H8));

        let mut bb = Bitboard::new();
        bb.insert(Square::C3);
        bb.insert(Square::F6);
        assert_eq!(bb.len(), 2);
        assert!(bb.intersects(Square::F6.into()));
        assert!(bb.is_disjoint(Square::F7.into()));
        bb.toggle(Square::C3);
        assert_eq!(bb, Bitboard::from(Square::F6));
        bb.remove(Square::F6);
        assert!(bb.is_empty());
    }

    #[test]
    fn pop_and_peek_order() {
        let mut bb: Bitboard = [Square::H8, Square::A2, Square::D5].iter().cloned().collect();
        assert_eq!(bb.peek(), Some(Square::A2));
        assert_eq!(bb.peek_last(), Some(Square::H8));
        assert_eq!(bb.pop(), Some(Square::A2));
        assert_eq!(bb.pop(), Some(Square::D5));
        assert_eq!(bb.pop(), Some(Square::H8));
        assert_eq!(bb.pop(), None);
        assert_eq!(bb.peek_last(), None);
    }

    #[test]
    fn shifts_follow_board_geometry() {
        let d4 = Bitboard::from(Square::D4);
        assert_eq!(d4.shift_y(1), Bitboard::from(Square::D5));
        assert_eq!(d4.shift_y(-1), Bitboard::from(Square::D3));
        assert_eq!(d4.shift_x(1), Bitboard::from(Square::E4));
        assert_eq!(d4.shift_x(-2), Bitboard::from(Square::B4));
        assert_eq!(d4.shift_xy(1, 1), Bitboard::from(Square::E5));
        assert_eq!(d4.shift_xy(-1, -1), Bitboard::from(Square::C3));
    }

    #[test]
    fn file_and_rank_masks() {
        let e_file = Bitboard::from(File::E);
        assert_eq!(e_file.len(), 8);
        assert!(e_file.contains(Square::E1) && e_file.contains(Square::E8));
        let third = Bitboard::from(Rank::R3);
        assert!(third.contains(Square::A3) && third.contains(Square::H3));
        assert_eq!((e_file & third), Bitboard::from(Square::E3));

        let bb: Bitboard = [Square::B3, Square::G7].iter().cloned().collect();
        assert_eq!(bb.file_fill(), Bitboard::from(File::B) | File::G.into());
    }

    #[test]
    fn formatting() {
        assert_eq!(format!("{}", Bitboard::from(0x0123456789abcdef)), "123456789abcdef");
        assert_eq!(format!("{:016x}", Bitboard::from(0x0123456789abcdef)), "0123456789abcdef");
    }
}
