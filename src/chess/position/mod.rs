//! Contains structures related to the `Position`
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryInto;
use std::fmt;
use lazy_static::lazy_static;
use regex::Regex;
use super::*;
use super::psqt::{self, Tapered};

use bitboard::*;

use Color::*;
use Piece::*;

pub mod zobrist;
mod move_gen;

/// FEN of the standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const CASTLE_KING_SIDE: u8 = 0x1;
const CASTLE_QUEEN_SIDE: u8 = 0x2;
const CASTLE_BOTH_SIDES: u8 = CASTLE_KING_SIDE | CASTLE_QUEEN_SIDE;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A representation of the arrangement of pieces on the board at a given point in the game, as well
/// as castling availability and en passant legality.
///
/// The position is updated in place by `make_move` and restored by `unmake_move`.
#[allow(missing_copy_implementations,)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    zobrist: Zobrist,
    pawn_key: Zobrist,
    occ_squares: Bitboard,
    occ_by_color: [Bitboard; Color::COUNT],
    occ_by_piece: [[Bitboard; Piece::COUNT]; Color::COUNT],
    board: [Option<(Color, Piece)>; Square::COUNT],
    turn: Color,

    checkers: Bitboard,
    ep_square: Option<Square>,
    castling_rights: [u8; Color::COUNT],

    draw_plies: usize,
    move_num: usize,

    material: [Tapered; Color::COUNT],
    psqt: [Tapered; Color::COUNT],
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The state needed to take back a move or a null move
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Undo {
    capt_pc: Option<Piece>,
    ep_square: Option<Square>,
    castling_rights: [u8; Color::COUNT],
    draw_plies: usize,
    move_num: usize,
    checkers: Bitboard,
    zobrist: Zobrist,
    pawn_key: Zobrist,
}

impl Undo {
    /// Returns the piece captured by the move, if any
    pub fn captured_piece(&self) -> Option<Piece> {
        self.capt_pc
    }
}

impl Position {
    /// Returns the standard starting Position
    pub fn new() -> Position {
        const BACK_RANK: [Piece; File::COUNT] =
            [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut pos = Position::empty_board();

        for (f, &piece) in BACK_RANK.iter().enumerate() {
            let file: File = f.try_into().expect("INFALLIBLE");
            for &color in Color::ALL.iter() {
                pos.put_piece(color, piece, Square::from_coord(file, color.home_rank()));
                pos.put_piece(color, Pawn, Square::from_coord(file, Rank::R2.relative_to(color)));
            }
        }
        pos.castling_rights = [CASTLE_BOTH_SIDES, CASTLE_BOTH_SIDES];
        pos.calc_zobrist();

        pos
    }

    /// Returns a position with an empty board
    fn empty_board() -> Position {
        Position {
            zobrist: Zobrist::new(),
            pawn_key: Zobrist::new(),
            occ_squares: Bitboard::new(),
            occ_by_color: [Bitboard::new(); Color::COUNT],
            occ_by_piece: [[Bitboard::new(); Piece::COUNT]; Color::COUNT],
            board: [None; Square::COUNT],
            turn: White,
            checkers: Bitboard::new(),
            ep_square: None,
            castling_rights: [0, 0],
            draw_plies: 0,
            move_num: 1,
            material: [Tapered::default(); Color::COUNT],
            psqt: [Tapered::default(); Color::COUNT],
        }
    }

    /// Parse a position from a FEN string
    pub fn from_fen_str(s: &str) -> Result<Position> {
        let mut pos = Position::empty_board();
        let mut fields = s.trim().split_whitespace();

        // parse the board
        let board = fields.next().ok_or(Error::ParseError)?;
        let mut r = Rank::COUNT - 1;
        let mut f = 0;
        for c in board.chars() {
            match c {
                '1' ..= '8' => {
                    f += c.to_digit(10).expect("INFALLIBLE") as usize;
                    if f > File::COUNT {
                        return Err(Error::ParseError);
                    }
                },
                '/' => {
                    if f == File::COUNT && r > 0 {
                        r -= 1;
                        f = 0;
                    } else {
                        return Err(Error::ParseError);
                    }
                },
                _ => {
                    let sq = match (f.try_into(), r.try_into()) {
                        (Ok(f), Ok(r)) => Square::from_coord(f, r),
                        _ => return Err(Error::ParseError),
                    };
                    let (color, piece) = Piece::from_char(c).ok_or(Error::ParseError)?;
                    pos.put_piece(color, piece, sq);

                    f += 1;
                },
            }
        }
        if r > 0 || f < File::COUNT {
            return Err(Error::ParseError);
        }

        // parse the turn
        pos.turn = fields.next().ok_or(Error::ParseError)?.parse()?;

        // parse the castling flags
        match fields.next() {
            Some("-") => {},
            Some(castling_flags) => {
                for c in castling_flags.chars() {
                    match c {
                        'K' => pos.castling_rights[White as usize] |= CASTLE_KING_SIDE,
                        'Q' => pos.castling_rights[White as usize] |= CASTLE_QUEEN_SIDE,
                        'k' => pos.castling_rights[Black as usize] |= CASTLE_KING_SIDE,
                        'q' => pos.castling_rights[Black as usize] |= CASTLE_QUEEN_SIDE,
                        _ => return Err(Error::ParseError),
                    }
                }
            },
            None => return Err(Error::ParseError),
        }

        // parse en passant square
        match fields.next() {
            Some("-") => {},
            Some(ep_square) => pos.ep_square = Some(ep_square.parse()?),
            None => return Err(Error::ParseError),
        }

        // parse half move clock, if present
        if let Some(plies) = fields.next() {
            pos.draw_plies = plies.parse().map_err(|_| Error::ParseError)?;
        }

        // parse move number, if present
        if let Some(move_num) = fields.next() {
            pos.move_num = move_num.parse().map_err(|_| Error::ParseError)?;
        }

        if fields.next().is_some() {
            return Err(Error::ParseError);
        }

        // validate position legality
        for c in 0..Color::COUNT {
            // Step 1: verify exactly one king per side
            if pos.occ_by_piece[c][King as usize].len() != 1 {
                return Err(Error::InvalidKingCount);
            }
            // Step 2: no pawns on ranks 1 and 8
            if pos.occ_by_piece[c][Pawn as usize]
                .intersects(Bitboard::from(Rank::R1) | Rank::R8.into()) {
                return Err(Error::InvalidPawnRank);
            }
        }
        // Step 3: opponent's king is not attacked
        if pos.square_attacked_by(pos.king_location(!pos.turn), pos.turn) {
            return Err(Error::KingCapturable);
        }
        // Step 4: if there is an EP square, it must be empty and there must be a pawn to capture
        if let Some(ep_square) = pos.ep_square {
            if pos.piece_at(ep_square).is_some() {
                return Err(Error::EnPassantSquareOccupied);
            }
            if ep_square.relative_rank(pos.turn) != Rank::R6
                || !pos.occ_by_piece[!pos.turn as usize][Pawn as usize]
                    .shift_y(pos.turn.forward()).contains(ep_square) {
                return Err(Error::MissingEnPassantPawn);
            }
        }
        // Step 5: if castling rights exist, king and rook must be in the correct squares
        for &c in Color::ALL.iter() {
            let rights = pos.castling_rights[c as usize];
            if rights != 0 {
                let r = c.home_rank();

                if pos.piece_at(Square::from_coord(File::E, r)) != Some((c, King)) {
                    return Err(Error::InvalidCastlingFlags);
                }
                if rights & CASTLE_QUEEN_SIDE != 0
                    && pos.piece_at(Square::from_coord(File::A, r)) != Some((c, Rook)) {
                    return Err(Error::InvalidCastlingFlags);
                }
                if rights & CASTLE_KING_SIDE != 0
                    && pos.piece_at(Square::from_coord(File::H, r)) != Some((c, Rook)) {
                    return Err(Error::InvalidCastlingFlags);
                }
            }
        }

        pos.checkers = pos.attackers_to(pos.king_location(pos.turn), pos.occ_squares)
            & pos.occ_by_color[!pos.turn as usize];
        pos.calc_zobrist();

        Ok(pos)
    }

    /// Converts the position to a FEN string
    pub fn to_fen_str(&self) -> String {
        // the board
        let mut board = String::new();

        for r in (0..Rank::COUNT).rev() {
            let rank: Rank = r.try_into().expect("INFALLIBLE");
            let mut count = 0;
            for &file in File::ALL.iter() {
                if let Some((c, p)) = self.piece_at(Square::from_coord(file, rank)) {
                    if count > 0 {
                        board += &count.to_string();
                        count = 0;
                    }
                    board.push(p.to_char(c));
                } else {
                    count += 1;
                }
            }
            if count > 0 {
                board += &count.to_string();
            }
            if r > 0 {
                board += "/";
            }
        }

        // castling rights
        let mut castling = String::new();
        castling += match self.castling_rights[White as usize] {
            CASTLE_KING_SIDE => "K",
            CASTLE_QUEEN_SIDE => "Q",
            CASTLE_BOTH_SIDES => "KQ",
            _ => "",
        };
        castling += match self.castling_rights[Black as usize] {
            CASTLE_KING_SIDE => "k",
            CASTLE_QUEEN_SIDE => "q",
            CASTLE_BOTH_SIDES => "kq",
            _ => "",
        };
        if castling.is_empty() {
            castling += "-";
        }

        // en passant square
        let ep_square = match self.ep_square {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!("{} {} {} {} {} {}", board, self.turn, castling, ep_square,
                                     self.draw_plies, self.move_num)
    }

    /// Returns the color whose turn it is
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Returns `true` if the color to move is in check.
    pub fn in_check(&self) -> bool {
        !self.checkers.is_empty()
    }

    /// Returns the pieces giving check to the side to move
    pub fn checkers(&self) -> Bitboard {
        self.checkers
    }

    /// Returns `true` if a draw by the fifty move rule can be claimed (assuming the game isn't
    /// already over)
    pub fn fifty_moves(&self) -> bool {
        self.draw_plies >= 100
    }

    /// Returns the number of plies which count toward the fifty move rule
    pub fn draw_plies(&self) -> usize {
        self.draw_plies
    }

    /// Returns the full move number
    pub fn move_number(&self) -> usize {
        self.move_num
    }

    /// Returns the en passant target square, if any
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// Returns `true` if `c` may still castle on at least one side
    pub fn has_castling_rights(&self, c: Color) -> bool {
        self.castling_rights[c as usize] != 0
    }

    /// Returns the square where the king of the given color is located
    pub fn king_location(&self, c: Color) -> Square {
        self.occ_by_piece[c as usize][King as usize].peek().expect("INFALLIBLE")
    }

    /// Returns the color and type of piece, if any, at the given location
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        self.board[sq as usize]
    }

    /// Returns all occupied squares
    pub fn occupied(&self) -> Bitboard {
        self.occ_squares
    }

    /// Returns the squares occupied by pieces of color `c`
    pub fn occupied_by(&self, c: Color) -> Bitboard {
        self.occ_by_color[c as usize]
    }

    /// Returns the squares occupied by pieces of color `c` and type `p`
    pub fn occupied_by_piece(&self, c: Color, p: Piece) -> Bitboard {
        self.occ_by_piece[c as usize][p as usize]
    }

    /// Return the position's Zobrist key
    pub fn hash(&self) -> Zobrist {
        self.zobrist
    }

    /// Returns a Zobrist key computed from the pawns alone
    pub fn pawn_hash(&self) -> Zobrist {
        self.pawn_key
    }

    /// Returns the material of color `c`
    pub fn material(&self, c: Color) -> Tapered {
        self.material[c as usize]
    }

    /// Returns the summed piece-square values of color `c`
    pub fn psqt(&self, c: Color) -> Tapered {
        self.psqt[c as usize]
    }

    /// Returns the game phase, from 0 when all the pieces are on the board to 256 when only
    /// kings and pawns remain
    pub fn phase(&self) -> i32 {
        let mut weight = 0;

        for &c in Color::ALL.iter() {
            for &p in [Knight, Bishop, Rook, Queen].iter() {
                weight += self.occupied_by_piece(c, p).len() as i32 * psqt::PHASE_WEIGHTS[p as usize];
            }
        }

        let missing = psqt::TOTAL_PHASE - weight.min(psqt::TOTAL_PHASE);
        (missing * 256 + psqt::TOTAL_PHASE / 2) / psqt::TOTAL_PHASE
    }

    /// Returns `true` if color `c` has a piece other than its king and pawns
    pub fn has_non_pawn_material(&self, c: Color) -> bool {
        self.occ_by_color[c as usize] != self.occupied_by_piece(c, Pawn) | self.occupied_by_piece(c, King)
    }

    /// Returns `true` if neither side has enough material left to checkmate.
    ///
    /// That is the case when there are no pawns, rooks or queens, and each side has at most one
    /// minor piece.
    pub fn insufficient_material(&self) -> bool {
        for &c in Color::ALL.iter() {
            if !(self.occupied_by_piece(c, Pawn)
                | self.occupied_by_piece(c, Rook)
                | self.occupied_by_piece(c, Queen)).is_empty() {
                return false;
            }
            if (self.occupied_by_piece(c, Knight) | self.occupied_by_piece(c, Bishop)).len() > 1 {
                return false;
            }
        }

        true
    }

    /// Applies a legal move to the position and returns what is needed to take it back.
    ///
    /// The move must be legal in this position; this is only checked in debug builds.
    pub fn make_move(&mut self, mv: Move) -> Undo {
        let us = self.turn;
        let them = !us;
        let orig = mv.origin();
        let dest = mv.destination();

        debug_assert_eq!(self.piece_at(orig), Some((us, mv.piece())));
        debug_assert!(mv.is_en_passant() || self.piece_at(dest).map(|(_, p)| p) == mv.captured_piece());

        let undo = self.undo_record(mv.captured_piece());

        if let Some(ep_square) = self.ep_square.take() {
            self.zobrist.toggle_ep_square(ep_square);
        }

        // remove the captured piece
        if mv.is_en_passant() {
            self.remove_piece(them, Pawn, Square::from_coord(dest.file(), orig.rank()));
        } else if let Some(capt_pc) = mv.captured_piece() {
            self.remove_piece(them, capt_pc, dest);
        }

        // move the piece, promoting it if needed
        self.remove_piece(us, mv.piece(), orig);
        self.put_piece(us, mv.promotion().unwrap_or_else(|| mv.piece()), dest);

        // castling relocates the rook as well
        if mv.is_castle() {
            let (rook_orig, rook_dest) = castling_rook_squares(us, mv.flags());
            self.remove_piece(us, Rook, rook_orig);
            self.put_piece(us, Rook, rook_dest);
        }

        // update castling rights
        let mut rights = self.castling_rights;
        if mv.piece() == King {
            rights[us as usize] = 0;
        }
        for &sq in [orig, dest].iter() {
            if let Some((c, flag)) = rook_corner(sq) {
                rights[c as usize] &= !flag;
            }
        }
        self.set_castling_rights(rights);

        // a double pawn push always leaves an en passant square behind it
        if mv.piece() == Pawn && (dest.rank() as i8 - orig.rank() as i8).abs() == 2 {
            let ep_square: Square = ((orig as usize + dest as usize) / 2).try_into()
                .expect("INFALLIBLE");
            self.ep_square = Some(ep_square);
            self.zobrist.toggle_ep_square(ep_square);
        }

        if mv.piece() == Pawn || mv.is_capture() {
            self.draw_plies = 0;
        } else {
            self.draw_plies += 1;
        }
        if us == Black {
            self.move_num += 1;
        }

        self.turn = them;
        self.zobrist.toggle_turn();
        self.checkers = self.attackers_to(self.king_location(them), self.occ_squares)
            & self.occ_by_color[us as usize];

        undo
    }

    /// Takes back `mv`, which must be the last move made, using the `Undo` returned when it was
    /// made
    pub fn unmake_move(&mut self, mv: Move, undo: Undo) {
        self.turn = !self.turn;
        let us = self.turn;
        let them = !us;
        let orig = mv.origin();
        let dest = mv.destination();

        if mv.is_castle() {
            let (rook_orig, rook_dest) = castling_rook_squares(us, mv.flags());
            self.remove_piece(us, Rook, rook_dest);
            self.put_piece(us, Rook, rook_orig);
        }

        self.remove_piece(us, mv.promotion().unwrap_or_else(|| mv.piece()), dest);
        self.put_piece(us, mv.piece(), orig);

        if mv.is_en_passant() {
            self.put_piece(them, Pawn, Square::from_coord(dest.file(), orig.rank()));
        } else if let Some(capt_pc) = undo.capt_pc {
            self.put_piece(them, capt_pc, dest);
        }

        self.restore(undo);
    }

    /// Passes the turn to the opponent without moving a piece
    ///
    /// Must not be used while in check.
    pub fn make_null_move(&mut self) -> Undo {
        debug_assert!(!self.in_check());

        let undo = self.undo_record(None);

        if let Some(ep_square) = self.ep_square.take() {
            self.zobrist.toggle_ep_square(ep_square);
        }
        self.draw_plies += 1;
        self.turn = !self.turn;
        self.zobrist.toggle_turn();
        self.checkers = Bitboard::EMPTY;

        undo
    }

    /// Takes back a null move
    pub fn unmake_null_move(&mut self, undo: Undo) {
        self.turn = !self.turn;
        self.restore(undo);
    }

    /// Resolves a move in coordinate notation (eg e2e4 or a7a8q) against the legal moves of
    /// the position
    pub fn parse_move(&self, s: &str) -> Result<Move> {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"^([a-h][1-8])([a-h][1-8])([nbrqNBRQ])?$")
                .expect("INFALLIBLE");
        }

        let caps = RE.captures(s.trim()).ok_or(Error::ParseError)?;
        let orig: Square = caps[1].parse()?;
        let dest: Square = caps[2].parse()?;
        let prom = match caps.get(3) {
            Some(m) => Some(m.as_str().parse::<Piece>()?),
            None => None,
        };

        self.legal_moves().into_iter()
            .find(|mv| mv.origin() == orig && mv.destination() == dest && mv.promotion() == prom)
            .ok_or(Error::IllegalMove)
    }

    /// Returns `true` if `sq` is attacked by a piece of color `c`.
    pub fn square_attacked_by(&self, sq: Square, c: Color) -> bool {
        self.attackers_to(sq, self.occ_squares).intersects(self.occ_by_color[c as usize])
    }

    /// Returns the pieces of both colors attacking `sq`, with sliding attacks computed as if the
    /// occupied squares were `occ`
    pub fn attackers_to(&self, sq: Square, occ: Bitboard) -> Bitboard {
        let bishops = self.pieces_of_type(Bishop) | self.pieces_of_type(Queen);
        let rooks = self.pieces_of_type(Rook) | self.pieces_of_type(Queen);

        (pawn_attacks(White, sq) & self.occupied_by_piece(Black, Pawn))
            | (pawn_attacks(Black, sq) & self.occupied_by_piece(White, Pawn))
            | (knight_attacks(sq) & self.pieces_of_type(Knight))
            | (king_attacks(sq) & self.pieces_of_type(King))
            | (bishop_attacks(sq, occ) & bishops)
            | (rook_attacks(sq, occ) & rooks)
    }

    /// Returns a bitboard containing all squares attacked by pawns of color `c`
    pub fn pawn_attacks(&self, c: Color) -> Bitboard {
        let pawns = self.occupied_by_piece(c, Pawn);
        pawns.shift_xy(-1, c.forward()) | pawns.shift_xy(1, c.forward())
    }

    /// Returns the pieces of type `p` of both colors
    pub fn pieces_of_type(&self, p: Piece) -> Bitboard {
        self.occupied_by_piece(White, p) | self.occupied_by_piece(Black, p)
    }

    /// Recomputes everything that is kept up to date incrementally and compares it with the
    /// stored values
    pub fn is_consistent(&self) -> bool {
        let mut fresh = Position::empty_board();

        for sq in Square::iter() {
            if let Some((c, p)) = self.board[sq as usize] {
                fresh.put_piece(c, p, sq);
            }
        }
        fresh.turn = self.turn;
        fresh.ep_square = self.ep_square;
        fresh.castling_rights = self.castling_rights;
        fresh.calc_zobrist();

        let checkers = self.attackers_to(self.king_location(self.turn), self.occ_squares)
            & self.occ_by_color[!self.turn as usize];

        fresh.occ_squares == self.occ_squares
            && fresh.occ_by_color == self.occ_by_color
            && fresh.occ_by_piece == self.occ_by_piece
            && self.occ_by_color[0].is_disjoint(self.occ_by_color[1])
            && fresh.zobrist == self.zobrist
            && fresh.pawn_key == self.pawn_key
            && fresh.material == self.material
            && fresh.psqt == self.psqt
            && checkers == self.checkers
    }

    fn put_piece(&mut self, c: Color, p: Piece, sq: Square) {
        debug_assert!(self.board[sq as usize].is_none());

        let bb = Bitboard::from(sq);
        self.occ_squares |= bb;
        self.occ_by_color[c as usize] |= bb;
        self.occ_by_piece[c as usize][p as usize] |= bb;
        self.board[sq as usize] = Some((c, p));

        self.zobrist.toggle_piece_placement(c, p, sq);
        if p == Pawn {
            self.pawn_key.toggle_piece_placement(c, p, sq);
        }
        self.material[c as usize] += psqt::material(p);
        self.psqt[c as usize] += psqt::psqt(c, p, sq);
    }

    fn remove_piece(&mut self, c: Color, p: Piece, sq: Square) {
        debug_assert_eq!(self.board[sq as usize], Some((c, p)));

        let bb = !Bitboard::from(sq);
        self.occ_squares &= bb;
        self.occ_by_color[c as usize] &= bb;
        self.occ_by_piece[c as usize][p as usize] &= bb;
        self.board[sq as usize] = None;

        self.zobrist.toggle_piece_placement(c, p, sq);
        if p == Pawn {
            self.pawn_key.toggle_piece_placement(c, p, sq);
        }
        self.material[c as usize] -= psqt::material(p);
        self.psqt[c as usize] -= psqt::psqt(c, p, sq);
    }

    fn set_castling_rights(&mut self, rights: [u8; Color::COUNT]) {
        for &c in Color::ALL.iter() {
            if rights[c as usize] != self.castling_rights[c as usize] {
                self.zobrist.toggle_castling_rights(c, self.castling_rights[c as usize]);
                self.zobrist.toggle_castling_rights(c, rights[c as usize]);
            }
        }
        self.castling_rights = rights;
    }

    fn undo_record(&self, capt_pc: Option<Piece>) -> Undo {
        Undo {
            capt_pc,
            ep_square: self.ep_square,
            castling_rights: self.castling_rights,
            draw_plies: self.draw_plies,
            move_num: self.move_num,
            checkers: self.checkers,
            zobrist: self.zobrist,
            pawn_key: self.pawn_key,
        }
    }

    fn restore(&mut self, undo: Undo) {
        self.ep_square = undo.ep_square;
        self.castling_rights = undo.castling_rights;
        self.draw_plies = undo.draw_plies;
        self.move_num = undo.move_num;
        self.checkers = undo.checkers;
        self.zobrist = undo.zobrist;
        self.pawn_key = undo.pawn_key;
    }

    /// Calculate the positions's Zobrist keys from scratch
    fn calc_zobrist(&mut self) {
        self.zobrist = Zobrist::new();
        self.pawn_key = Zobrist::new();

        if self.turn == Black {
            self.zobrist.toggle_turn();
        }

        if let Some(ep_square) = self.ep_square {
            self.zobrist.toggle_ep_square(ep_square);
        }

        self.zobrist.toggle_castling_rights(White, self.castling_rights[White as usize]);
        self.zobrist.toggle_castling_rights(Black, self.castling_rights[Black as usize]);

        for sq in self.occ_squares {
            if let Some((c, p)) = self.board[sq as usize] {
                self.zobrist.toggle_piece_placement(c, p, sq);
                if p == Pawn {
                    self.pawn_key.toggle_piece_placement(c, p, sq);
                }
            }
        }
    }
}

/// The squares the rook moves between when `c` castles on the side given by `flags`
fn castling_rook_squares(c: Color, flags: MoveFlags) -> (Square, Square) {
    let r = c.home_rank();

    if flags.contains(MoveFlags::KING_CASTLE) {
        (Square::from_coord(File::H, r), Square::from_coord(File::F, r))
    } else {
        (Square::from_coord(File::A, r), Square::from_coord(File::D, r))
    }
}

/// The castling right that is lost when anything moves from or to a rook's starting square
fn rook_corner(sq: Square) -> Option<(Color, u8)> {
    match sq {
        Square::A1 => Some((White, CASTLE_QUEEN_SIDE)),
        Square::H1 => Some((White, CASTLE_KING_SIDE)),
        Square::A8 => Some((Black, CASTLE_QUEEN_SIDE)),
        Square::H8 => Some((Black, CASTLE_KING_SIDE)),
        _ => None,
    }
}

impl Default for Position {
    /// Returns the standard starting Position
    fn default() -> Self {
        Position::new()
    }
}

impl fmt::Display for Position {
    /// Writes out the position using FEN
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_fen_str().fmt(f)
    }
}

impl FromStr for Position {
    type Err = Error;

    /// Parse a position from a FEN string
    fn from_str(s: &str) -> Result<Self> {
        Position::from_fen_str(s)
    }
}
