//! Generates the moves available in a position
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use super::*;

/// Which moves to generate
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Gen {
    All,
    Noisy,
}

impl Position {
    /// Returns every legal move in the position. Moves which give check carry the CHECK flag.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.filtered_moves(Gen::All)
    }

    /// Returns the legal captures and promotions in the position
    pub fn noisy_moves(&self) -> Vec<Move> {
        self.filtered_moves(Gen::Noisy)
    }

    /// Returns `true` if the pseudo-legal move `mv` does not leave the mover's king attacked
    pub fn is_legal(&self, mv: Move) -> bool {
        let us = self.turn;
        let orig = mv.origin();
        let dest = mv.destination();

        let mut occ = self.occ_squares;
        let mut removed = Bitboard::from(dest);
        occ.remove(orig);
        occ.insert(dest);

        if mv.is_en_passant() {
            let capt_sq = Square::from_coord(dest.file(), orig.rank());
            occ.remove(capt_sq);
            removed.insert(capt_sq);
        }

        let king = if mv.piece() == King { dest } else { self.king_location(us) };
        let enemies = self.occ_by_color[!us as usize] & !removed;

        (self.attackers_to(king, occ) & enemies).is_empty()
    }

    /// Returns `true` if the pseudo-legal move `mv` attacks the opponent's king, directly or by
    /// uncovering a sliding piece
    pub fn gives_check(&self, mv: Move) -> bool {
        let us = self.turn;
        let orig = mv.origin();
        let dest = mv.destination();
        let king = self.king_location(!us);
        let piece = mv.promotion().unwrap_or_else(|| mv.piece());

        let mut occ = self.occ_squares;
        occ.remove(orig);
        occ.insert(dest);
        if mv.is_en_passant() {
            occ.remove(Square::from_coord(dest.file(), orig.rank()));
        }

        let mut diagonal = self.occupied_by_piece(us, Bishop) | self.occupied_by_piece(us, Queen);
        let mut orthogonal = self.occupied_by_piece(us, Rook) | self.occupied_by_piece(us, Queen);
        diagonal.remove(orig);
        orthogonal.remove(orig);

        match piece {
            Pawn => if pawn_attacks(us, dest).contains(king) {
                return true;
            },
            Knight => if knight_attacks(dest).contains(king) {
                return true;
            },
            Bishop => diagonal.insert(dest),
            Rook => orthogonal.insert(dest),
            Queen => {
                diagonal.insert(dest);
                orthogonal.insert(dest);
            },
            King => { },
        }

        if mv.is_castle() {
            let (rook_orig, rook_dest) = castling_rook_squares(us, mv.flags());
            occ.remove(rook_orig);
            occ.insert(rook_dest);
            orthogonal.remove(rook_orig);
            orthogonal.insert(rook_dest);
        }

        bishop_attacks(king, occ).intersects(diagonal)
            || rook_attacks(king, occ).intersects(orthogonal)
    }

    fn filtered_moves(&self, gen: Gen) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.generate(gen, &mut moves);

        moves.retain(|&mv| self.is_legal(mv));
        for mv in moves.iter_mut() {
            if self.gives_check(*mv) {
                *mv = mv.with_check();
            }
        }

        moves
    }

    fn generate(&self, gen: Gen, moves: &mut Vec<Move>) {
        let us = self.turn;
        let enemies = self.occ_by_color[!us as usize];
        let targets = match gen {
            Gen::All => !self.occ_by_color[us as usize],
            Gen::Noisy => enemies,
        };

        let king = self.king_location(us);
        for dest in king_attacks(king) & targets {
            moves.push(Move::new(King, king, dest, self.captured_at(dest), MoveKind::Standard));
        }

        // only the king can escape a double check
        if self.checkers.len() > 1 {
            return;
        }

        if gen == Gen::All && !self.in_check() {
            self.castling_moves(moves);
        }

        self.pawn_moves(gen, moves);

        for &piece in [Knight, Bishop, Rook, Queen].iter() {
            for orig in self.occupied_by_piece(us, piece) {
                for dest in piece_attacks(piece, orig, self.occ_squares) & targets {
                    moves.push(Move::new(piece, orig, dest, self.captured_at(dest),
                        MoveKind::Standard));
                }
            }
        }
    }

    fn castling_moves(&self, moves: &mut Vec<Move>) {
        let us = self.turn;
        let rights = self.castling_rights[us as usize];
        let r = us.home_rank();
        let king = Square::from_coord(File::E, r);

        let sides = [
            (CASTLE_KING_SIDE, File::H, [File::F, File::G]),
            (CASTLE_QUEEN_SIDE, File::A, [File::D, File::C]),
        ];

        for &(flag, rook_file, king_path) in sides.iter() {
            if rights & flag == 0 {
                continue;
            }

            let rook = Square::from_coord(rook_file, r);
            if between(king, rook).intersects(self.occ_squares) {
                continue;
            }

            // the king may not start on, pass through or land on an attacked square
            let taboo = king_path.iter().any(|&f| self.square_attacked_by(Square::from_coord(f, r), !us));
            if !taboo {
                let dest = Square::from_coord(king_path[1], r);
                moves.push(Move::new(King, king, dest, None, MoveKind::Castle));
            }
        }
    }

    fn pawn_moves(&self, gen: Gen, moves: &mut Vec<Move>) {
        let us = self.turn;
        let forward = us.forward();
        let pawns = self.occupied_by_piece(us, Pawn);
        let empty = !self.occ_squares;
        let last_rank = Bitboard::from(Rank::R8.relative_to(us));

        // advancement
        let single = pawns.shift_y(forward) & empty;
        let double = (single & Rank::R3.relative_to(us).into()).shift_y(forward) & empty;

        let single = match gen {
            Gen::All => single,
            Gen::Noisy => single & last_rank,
        };
        for dest in single {
            let orig = dest.offset(0, -forward).expect("INFALLIBLE");
            self.push_pawn_move(orig, dest, None, moves);
        }
        if gen == Gen::All {
            for dest in double {
                let orig = dest.offset(0, -2 * forward).expect("INFALLIBLE");
                moves.push(Move::new(Pawn, orig, dest, None, MoveKind::Standard));
            }
        }

        // captures
        let enemies = self.occ_by_color[!us as usize];
        for orig in pawns {
            let attacks = pawn_attacks(us, orig);

            for dest in attacks & enemies {
                self.push_pawn_move(orig, dest, self.captured_at(dest), moves);
            }

            if let Some(ep_square) = self.ep_square {
                if attacks.contains(ep_square) {
                    moves.push(Move::new(Pawn, orig, ep_square, None, MoveKind::EnPassant));
                }
            }
        }
    }

    fn push_pawn_move(&self, orig: Square, dest: Square, capt_pc: Option<Piece>,
        moves: &mut Vec<Move>)
    {
        if dest.relative_rank(self.turn) == Rank::R8 {
            for &prom in Piece::PROMOTIONS.iter() {
                moves.push(Move::new(Pawn, orig, dest, capt_pc, MoveKind::Promotion(prom)));
            }
        } else {
            moves.push(Move::new(Pawn, orig, dest, capt_pc, MoveKind::Standard));
        }
    }

    fn captured_at(&self, sq: Square) -> Option<Piece> {
        self.piece_at(sq).map(|(_, p)| p)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    fn move_strings(moves: &[Move]) -> Vec<String> {
        let mut strings: Vec<String> = moves.iter().map(|mv| mv.to_string()).collect();
        strings.sort();
        strings
    }

    #[test]
    fn twenty_moves_from_the_start() {
        let pos = Position::new();
        assert_eq!(pos.legal_moves().len(), 20);
        assert!(pos.noisy_moves().is_empty());
    }

    #[test]
    fn promotions_come_in_fours() {
        let pos = Position::from_fen_str("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").expect("valid fen");
        let noisy = move_strings(&pos.noisy_moves());
        assert_eq!(noisy, ["a7a8b", "a7a8n", "a7a8q", "a7a8r",
                           "a7b8b", "a7b8n", "a7b8q", "a7b8r"]);
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        let pos = Position::from_fen_str("5Q2/8/1q5P/8/6k1/5R2/6P1/2r3K1 w - - 0 1")
            .expect("valid fen");
        assert!(pos.in_check());
        assert_eq!(pos.checkers().len(), 2);
        assert_eq!(move_strings(&pos.legal_moves()), ["g1h2"]);
    }

    #[test]
    fn castling_through_attacked_square_is_not_generated() {
        // the bishop on a6 covers f1
        let pos = Position::from_fen_str("4k3/8/b7/8/8/8/8/R3K2R w KQ - 0 1").expect("valid fen");
        let moves = move_strings(&pos.legal_moves());
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));

        // a rook attacked on b1 does not stop queen side castling
        let pos = Position::from_fen_str("1r2k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").expect("valid fen");
        let moves = move_strings(&pos.legal_moves());
        assert!(moves.contains(&"e1c1".to_string()));
        assert!(moves.contains(&"e1g1".to_string()));
    }

    #[test]
    fn pinned_piece_cannot_leave_the_pin() {
        let pos = Position::from_fen_str("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1").expect("valid fen");
        assert!(pos.legal_moves().iter().all(|mv| mv.piece() != Knight));
    }

    #[test]
    fn en_passant_discovering_check_on_the_rank_is_illegal() {
        let pos = Position::from_fen_str("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1").expect("valid fen");
        assert!(!move_strings(&pos.legal_moves()).contains(&"e5d6".to_string()));
    }

    #[test]
    fn check_flags_include_discovered_checks() {
        let pos = Position::from_fen_str("4k3/8/8/8/4N3/8/8/4RK2 w - - 0 1").expect("valid fen");
        for mv in pos.legal_moves() {
            assert_eq!(mv.gives_check(), mv.piece() == Knight, "{}", mv);
        }

        let pos = Position::from_fen_str("5k2/8/8/8/8/8/8/4K2R w K - 0 1").expect("valid fen");
        let castle = pos.parse_move("e1g1").expect("legal move");
        assert!(castle.gives_check());
    }
}
