//! Contains structure and data for Zobrist hash keys
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use super::*;

const KEY_SEED: u64 = 0x6b65_7374_7265_6c21;

struct Keys {
    piece_placement: [[[u64; Square::COUNT]; Piece::COUNT]; Color::COUNT],
    ep_file: [u64; File::COUNT],
    castling_rights: [[u64; 4]; Color::COUNT],
    black_move: u64,
}

lazy_static! {
    // a fixed seed keeps hashes reproducible from run to run
    static ref KEYS: Keys = {
        let mut rng = StdRng::seed_from_u64(KEY_SEED);
        let mut keys = Keys {
            piece_placement: [[[0; Square::COUNT]; Piece::COUNT]; Color::COUNT],
            ep_file: [0; File::COUNT],
            castling_rights: [[0; 4]; Color::COUNT],
            black_move: 0,
        };

        for key in keys.piece_placement.iter_mut().flatten().flatten() {
            *key = rng.gen();
        }
        for key in keys.ep_file.iter_mut() {
            *key = rng.gen();
        }
        for color in keys.castling_rights.iter_mut() {
            // no rights hashes to zero so a position without rights needs no toggling
            for key in color.iter_mut().skip(1) {
                *key = rng.gen();
            }
        }
        keys.black_move = rng.gen();

        keys
    };
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A 64-bit hash key generated from a position
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Zobrist(u64);

impl Zobrist {
    /// Creates a new zobrist key
    pub fn new() -> Zobrist {
        Zobrist(0)
    }

    /// Toggles piece placement
    pub fn toggle_piece_placement(&mut self, c: Color, p: Piece, sq: Square) {
        self.0 ^= KEYS.piece_placement[c as usize][p as usize][sq as usize];
    }

    /// Toggles an en passant square
    pub fn toggle_ep_square(&mut self, sq: Square) {
        self.0 ^= KEYS.ep_file[sq.file() as usize];
    }

    /// Toggles castling flags
    pub fn toggle_castling_rights(&mut self, c: Color, flags: u8) {
        self.0 ^= KEYS.castling_rights[c as usize][flags as usize & 3];
    }

    /// Toggles whose turn it is
    pub fn toggle_turn(&mut self) {
        self.0 ^= KEYS.black_move;
    }
}

impl fmt::Display for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for Zobrist {
    fn from(key: u64) -> Self {
        Zobrist(key)
    }
}

impl From<Zobrist> for u64 {
    /// Allows using the key to get a hash table index
    fn from(key: Zobrist) -> Self {
        key.0
    }
}
