//! Tests the move generator (chess module)
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////

mod move_gen {
    use kestrel::chess::variations;

    mod start {
        use super::count;

        #[test]
        fn depth_4() {
            assert_eq!(count("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 4), 197281);
        }

        #[test]
        #[ignore]
        fn depth_6() {
            assert_eq!(
                count("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 6),
                119060324
            );
        }
    }

    mod kiwipete {
        use super::count;

        #[test]
        fn depth_3() {
            assert_eq!(
                count("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", 3),
                97862
            );
        }

        #[test]
        #[ignore]
        fn depth_5() {
            assert_eq!(
                count("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", 5),
                193690690
            );
        }
    }

    #[test]
    fn position_3() { assert_eq!(count("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 5), 674624); }

    #[test]
    fn position_4() {
        assert_eq!(count("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1", 3), 9467);
    }

    #[test]
    fn position_5() {
        assert_eq!(count("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8", 3), 62379);
    }

    #[test]
    fn king_side_castling() { assert_eq!(count("4k3/8/8/8/8/8/8/4K2R w K - 0 1", 6), 764643); }

    #[test]
    fn queen_side_castling() { assert_eq!(count("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1", 6), 846648); }

    #[test]
    fn black_king_side_castling() { assert_eq!(count("4k2r/8/8/8/8/8/8/4K3 b k - 0 1", 6), 764643); }

    #[test]
    fn black_queen_side_castling() { assert_eq!(count("r3k3/8/8/8/8/8/8/4K3 b q - 0 1", 6), 846648); }

    #[test]
    fn castling_next_to_the_king() { assert_eq!(count("8/8/8/8/8/8/6k1/4K2R w K - 0 1", 6), 185867); }

    #[test]
    fn pawn_endings() {
        assert_eq!(count("8/2k1p3/3pP3/3P2K1/8/8/8/8 w - - 0 1", 6), 34834);
        assert_eq!(count("8/8/3k4/3p4/3P4/3K4/8/8 w - - 0 1", 6), 53138);
        assert_eq!(count("k7/8/3p4/8/3P4/8/8/7K w - - 0 1", 6), 20960);
    }

    #[test]
    #[ignore]
    fn promotions() {
        assert_eq!(count("n1n5/PPPk4/8/8/8/8/4Kppp/5N1N w - - 0 1", 6), 71179139);
        assert_eq!(count("8/Pk6/8/8/8/8/6Kp/8 b - - 0 1", 6), 1030499);
    }

    #[test]
    #[ignore]
    fn castling_rights_after_rook_moves() {
        assert_eq!(count("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", 6), 179862938);
        assert_eq!(count("r3k2r/8/8/8/8/8/8/1R2K2R b Kkq - 0 1", 6), 198328929);
    }

    fn count(fen: &str, depth: usize) -> usize {
        println!("\n{}", fen);
        let pos = fen.parse().unwrap();

        let count = variations::print(&pos, depth);
        println!("Depth {} total:\t{:12}", depth, count);

        count
    }
}

mod legal_moves {
    use std::collections::HashSet;
    use kestrel::chess::{Move, MoveFlags, MoveKind, Piece, Position};
    use kestrel::chess::Piece::*;
    use kestrel::chess::Square::{self, *};

    fn legal(fen: &str) -> HashSet<Move> {
        let pos: Position = fen.parse().unwrap();
        let moves = pos.legal_moves();
        let set: HashSet<Move> = moves.iter().copied().collect();

        assert_eq!(set.len(), moves.len(), "duplicate moves in {}", fen);
        set
    }

    fn quiet(piece: Piece, orig: Square, dest: Square) -> Move {
        Move::new(piece, orig, dest, None, MoveKind::Standard)
    }

    fn castle(dest: Square) -> Move {
        let orig = if dest.rank() == Square::A1.rank() { E1 } else { E8 };
        Move::new(King, orig, dest, None, MoveKind::Castle)
    }

    #[test]
    fn opening_position() {
        let mut expected = HashSet::new();
        for &(orig, single, double) in [
            (A2, A3, A4), (B2, B3, B4), (C2, C3, C4), (D2, D3, D4),
            (E2, E3, E4), (F2, F3, F4), (G2, G3, G4), (H2, H3, H4),
        ].iter() {
            expected.insert(quiet(Pawn, orig, single));
            expected.insert(quiet(Pawn, orig, double));
        }
        for &(orig, dest) in [(B1, A3), (B1, C3), (G1, F3), (G1, H3)].iter() {
            expected.insert(quiet(Knight, orig, dest));
        }

        assert_eq!(legal("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"), expected);
    }

    #[test]
    fn castling_with_a_pinned_bishop() {
        let expected: HashSet<Move> = [
            quiet(Rook, A1, A2), quiet(Rook, A1, A3), quiet(Rook, A1, A4), quiet(Rook, A1, A5),
            quiet(Rook, A1, A6), quiet(Rook, A1, A7), quiet(Rook, A1, A8),
            quiet(Rook, A1, B1), quiet(Rook, A1, C1), quiet(Rook, A1, D1),
            quiet(King, E1, D1), quiet(King, E1, D2), quiet(King, E1, F1), quiet(King, E1, F2),
            castle(C1), castle(G1),
            quiet(Rook, H1, F1), quiet(Rook, H1, G1).with_check(),
            quiet(Rook, H1, H2), quiet(Rook, H1, H3), quiet(Rook, H1, H4), quiet(Rook, H1, H5),
            quiet(Rook, H1, H6), quiet(Rook, H1, H7), quiet(Rook, H1, H8).with_check(),
        ].iter().copied().collect();

        let moves = legal("4r1k1/8/8/8/8/8/4B3/R3K2R w KQ - 0 1");
        assert_eq!(moves, expected);
        assert!(moves.contains(&castle(G1)) && castle(G1).flags().contains(MoveFlags::KING_CASTLE));
        assert!(castle(C1).flags().contains(MoveFlags::QUEEN_CASTLE));
    }

    #[test]
    fn en_passant_for_black() {
        let ep = Move::new(Pawn, D4, E3, None, MoveKind::EnPassant);
        let expected: HashSet<Move> = [
            quiet(Pawn, D4, D3), ep,
            quiet(King, E8, D7), quiet(King, E8, D8), quiet(King, E8, E7),
            quiet(King, E8, F7), quiet(King, E8, F8),
        ].iter().copied().collect();

        assert_eq!(legal("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1"), expected);
        assert_eq!(ep.captured_piece(), Some(Pawn));
        assert!(ep.flags().contains(MoveFlags::EN_PASSANT | MoveFlags::CAPTURE));
    }

    #[test]
    fn king_in_check_on_the_file() {
        let expected: HashSet<Move> = [
            quiet(King, E8, D7), quiet(King, E8, D8), quiet(King, E8, F7), quiet(King, E8, F8),
        ].iter().copied().collect();

        assert_eq!(legal("4k3/8/8/8/8/8/8/4RK2 b - - 0 1"), expected);
    }

    #[test]
    fn castling_and_discovered_checks() {
        let moves = legal("rnbq1bn1/pPp1pppp/4P3/3pP3/3p4/4B1N1/PP1rBPPP/k3K2R w K - 0 1");

        // the rook lands on f1 and checks along the first rank
        let castling = castle(G1).with_check();
        assert!(moves.contains(&castling));
        assert!(castling.flags().contains(MoveFlags::KING_CASTLE));

        // taking the rook uncovers the rook on h1
        let capture = Move::new(King, E1, D2, Some(Rook), MoveKind::Standard).with_check();
        assert!(moves.contains(&capture));
        assert!(capture.flags().contains(MoveFlags::CAPTURE));

        assert!(!moves.iter().any(|mv| mv.destination() == D1));
    }

    #[test]
    fn pawn_attacked_castling_squares() {
        // g2 covers f1
        let moves = legal("4k3/8/8/8/8/8/6p1/R3K2R w KQ - 0 1");
        assert!(!moves.contains(&castle(G1)));
        assert!(moves.contains(&castle(C1)));

        // b2 covers c1
        let moves = legal("4k3/8/8/8/8/8/1p6/R3K2R w KQ - 0 1");
        assert!(!moves.contains(&castle(C1)));
        assert!(moves.contains(&castle(G1)));

        // a2 only covers b1, which the king never crosses
        let moves = legal("4k3/8/8/8/8/8/p7/R3K2R w KQ - 0 1");
        assert!(moves.contains(&castle(C1)));
    }

    #[test]
    fn make_and_unmake_restore_the_position() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1",
        ];

        for fen in fens.iter() {
            let mut pos: Position = fen.parse().unwrap();
            let original = pos.clone();

            for mv in original.legal_moves() {
                let undo = pos.make_move(mv);
                assert!(pos.is_consistent(), "{} {}", fen, mv);
                pos.unmake_move(mv, undo);
                assert_eq!(pos, original, "{} {}", fen, mv);
                assert_eq!(pos.hash(), original.hash());
                assert_eq!(pos.to_string(), *fen);
            }

            let undo = pos.make_null_move();
            assert_ne!(pos.hash(), original.hash());
            pos.unmake_null_move(undo);
            assert_eq!(pos, original);
        }
    }
}
