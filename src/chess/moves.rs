//! Contains the structures used to represent moves
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
use Piece::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The set of flags describing a move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct MoveFlags(u8);

impl MoveFlags {
    /// No flags
    pub const EMPTY: MoveFlags = MoveFlags(0);
    /// The move captures a piece
    pub const CAPTURE: MoveFlags = MoveFlags(0x01);
    /// The move is an en passant capture
    pub const EN_PASSANT: MoveFlags = MoveFlags(0x02);
    /// The move is king-side castling
    pub const KING_CASTLE: MoveFlags = MoveFlags(0x04);
    /// The move is queen-side castling
    pub const QUEEN_CASTLE: MoveFlags = MoveFlags(0x08);
    /// The move gives check
    pub const CHECK: MoveFlags = MoveFlags(0x10);
    /// The move promotes a pawn
    pub const PROMOTION: MoveFlags = MoveFlags(0x20);

    /// Returns `true` if every flag in `other` is also set in `self`
    pub fn contains(self, other: MoveFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no flags are set
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl ops::BitOr for MoveFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        MoveFlags(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for MoveFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The kind of move, from which its flags are derived
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveKind {
    /// Any move which is not castling, an en passant capture, or a pawn promotion
    Standard,
    /// An en passant capture
    EnPassant,
    /// A castling move, given as the king's move
    Castle,
    /// A pawn promotion to the given piece type
    Promotion(Piece),
}

impl Default for MoveKind {
    fn default() -> Self {
        MoveKind::Standard
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A move from one square to another, along with everything needed to apply and reverse it.
///
/// Moves are only checked for consistency when built; whether a move is legal in a given position
/// is decided by move generation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    piece: Piece,
    orig: Square,
    dest: Square,
    capt_pc: Option<Piece>,
    prom_pc: Option<Piece>,
    flags: MoveFlags,
}

impl Move {
    /// Builds a move, deriving its flags from `kind` and `capt_pc`.
    ///
    /// An en passant capture always captures a pawn, so `capt_pc` is ignored for
    /// `MoveKind::EnPassant`.
    pub fn new(
        piece: Piece,
        orig: Square,
        dest: Square,
        capt_pc: Option<Piece>,
        kind: MoveKind,
    ) -> Move {
        let mut flags = MoveFlags::EMPTY;
        let mut capt_pc = capt_pc;
        let mut prom_pc = None;

        match kind {
            MoveKind::Standard => { },
            MoveKind::EnPassant => {
                debug_assert_eq!(piece, Pawn);
                debug_assert_ne!(orig.file(), dest.file());
                capt_pc = Some(Pawn);
                flags |= MoveFlags::EN_PASSANT;
            },
            MoveKind::Castle => {
                debug_assert_eq!(piece, King);
                debug_assert_eq!(orig.file(), File::E);
                debug_assert_eq!(orig.rank(), dest.rank());
                debug_assert!(capt_pc.is_none());
                flags |= match dest.file() {
                    File::G => MoveFlags::KING_CASTLE,
                    _ => MoveFlags::QUEEN_CASTLE,
                };
            },
            MoveKind::Promotion(prom) => {
                debug_assert_eq!(piece, Pawn);
                debug_assert!(dest.rank() == Rank::R1 || dest.rank() == Rank::R8);
                debug_assert!(Piece::PROMOTIONS.contains(&prom));
                prom_pc = Some(prom);
                flags |= MoveFlags::PROMOTION;
            },
        }

        if capt_pc.is_some() {
            debug_assert_ne!(capt_pc, Some(King));
            flags |= MoveFlags::CAPTURE;
        }

        Move { piece, orig, dest, capt_pc, prom_pc, flags }
    }

    /// Returns a copy of the move marked as giving check
    pub fn with_check(self) -> Move {
        Move { flags: self.flags | MoveFlags::CHECK, ..self }
    }

    /// Returns the piece to be moved
    pub fn piece(self) -> Piece {
        self.piece
    }

    /// Returns the origin of the moved piece
    pub fn origin(self) -> Square {
        self.orig
    }

    /// Returns the destination of the moved piece
    pub fn destination(self) -> Square {
        self.dest
    }

    /// Returns the captured piece, if any
    pub fn captured_piece(self) -> Option<Piece> {
        self.capt_pc
    }

    /// Returns the piece a pawn is promoted to, if any
    pub fn promotion(self) -> Option<Piece> {
        self.prom_pc
    }

    /// Returns the move's flags
    pub fn flags(self) -> MoveFlags {
        self.flags
    }

    /// Returns the kind of move
    pub fn kind(self) -> MoveKind {
        if let Some(prom) = self.prom_pc {
            MoveKind::Promotion(prom)
        } else if self.is_en_passant() {
            MoveKind::EnPassant
        } else if self.is_castle() {
            MoveKind::Castle
        } else {
            MoveKind::Standard
        }
    }

    /// Returns `true` if the move is a capture
    pub fn is_capture(self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE)
    }

    /// Returns `true` if the move is an en passant capture
    pub fn is_en_passant(self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    /// Returns `true` if the move is castling on either side
    pub fn is_castle(self) -> bool {
        self.flags.contains(MoveFlags::KING_CASTLE) || self.flags.contains(MoveFlags::QUEEN_CASTLE)
    }

    /// Returns `true` if the move is a promotion
    pub fn is_promotion(self) -> bool {
        self.flags.contains(MoveFlags::PROMOTION)
    }

    /// Returns `true` if the move is known to give check
    pub fn gives_check(self) -> bool {
        self.flags.contains(MoveFlags::CHECK)
    }

    /// Returns `true` for moves that neither capture nor promote
    pub fn is_quiet(self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    /// Returns `true` if `self` and `other` move the same piece between the same squares with
    /// the same promotion, ignoring the CHECK flag
    pub fn same_as(self, other: Move) -> bool {
        self.orig == other.orig && self.dest == other.dest && self.prom_pc == other.prom_pc
    }
}

impl fmt::Display for Move {
    /// Writes the move in coordinate notation (eg g1f3, e7e8q, or e1g1)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = format!("{}{}", self.orig, self.dest);

        if let Some(prom) = self.prom_pc {
            s.push(prom.to_char(Color::Black));
        }

        s.fmt(f)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_follow_move_kind() {
        let quiet = Move::new(Knight, Square::G1, Square::F3, None, MoveKind::Standard);
        assert!(quiet.flags().is_empty());
        assert!(quiet.is_quiet());
        assert_eq!(quiet.kind(), MoveKind::Standard);

        let capture = Move::new(Bishop, Square::C1, Square::H6, Some(Knight), MoveKind::Standard);
        assert_eq!(capture.flags(), MoveFlags::CAPTURE);
        assert!(!capture.is_quiet());

        let ep = Move::new(Pawn, Square::E5, Square::D6, None, MoveKind::EnPassant);
        assert!(ep.flags().contains(MoveFlags::CAPTURE | MoveFlags::EN_PASSANT));
        assert_eq!(ep.captured_piece(), Some(Pawn));
        assert_eq!(ep.kind(), MoveKind::EnPassant);

        let short = Move::new(King, Square::E1, Square::G1, None, MoveKind::Castle);
        assert_eq!(short.flags(), MoveFlags::KING_CASTLE);
        let long = Move::new(King, Square::E8, Square::C8, None, MoveKind::Castle);
        assert_eq!(long.flags(), MoveFlags::QUEEN_CASTLE);
        assert!(long.is_castle());

        let prom = Move::new(Pawn, Square::B7, Square::A8, Some(Rook), MoveKind::Promotion(Queen));
        assert!(prom.flags().contains(MoveFlags::PROMOTION | MoveFlags::CAPTURE));
        assert_eq!(prom.promotion(), Some(Queen));
        assert_eq!(prom.kind(), MoveKind::Promotion(Queen));
    }

    #[test]
    fn check_flag_is_added_only_by_with_check() {
        let mv = Move::new(Queen, Square::D1, Square::H5, None, MoveKind::Standard);
        assert!(!mv.gives_check());
        let checking = mv.with_check();
        assert!(checking.gives_check());
        assert!(checking.is_quiet());
        assert_ne!(mv, checking);
        assert!(mv.same_as(checking));
    }

    #[test]
    fn coordinate_notation() {
        assert_eq!(Move::new(Pawn, Square::E2, Square::E4, None, MoveKind::Standard).to_string(),
            "e2e4");
        assert_eq!(Move::new(Pawn, Square::E7, Square::E8, None, MoveKind::Promotion(Queen))
            .to_string(), "e7e8q");
        assert_eq!(Move::new(Pawn, Square::B2, Square::A1, Some(Rook), MoveKind::Promotion(Knight))
            .to_string(), "b2a1n");
        assert_eq!(Move::new(King, Square::E1, Square::G1, None, MoveKind::Castle).to_string(),
            "e1g1");
    }
}
