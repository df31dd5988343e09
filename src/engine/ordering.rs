//! Move ordering: hash move first, then winning captures, killers, quiet moves by history, and
//! losing captures last
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::cmp::{max, Reverse};
use crate::chess::{Color, Piece, Square, Move, Position};
use crate::engine::eval::piece_val;
use crate::engine::hash::HashMove;

const HASH_MOVE: i32 = 1_000_000;
const GOOD_NOISY: i32 = 500_000;
const FIRST_KILLER: i32 = 400_000;
const SECOND_KILLER: i32 = 390_000;
const BAD_NOISY: i32 = -500_000;

/// History scores are halved once any of them reaches this value
const HISTORY_LIMIT: i32 = 200_000;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A move paired with its ordering score
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScoredMove {
    /// The move
    pub mv: Move,
    /// Higher scores are searched first
    pub score: i32,
    /// Static exchange score, only computed for captures
    pub see: Option<i32>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Scores quiet moves by how often they caused a beta cutoff, indexed by side, origin and
/// destination
#[derive(Debug, Clone)]
pub struct History {
    table: Vec<i32>,
}

impl History {
    /// Creates an empty history table
    pub fn new() -> History {
        History { table: vec![0; Color::COUNT * Square::COUNT * Square::COUNT] }
    }

    fn index(c: Color, mv: Move) -> usize {
        (c as usize * Square::COUNT + mv.origin() as usize) * Square::COUNT + mv.destination() as usize
    }

    /// Returns the history score of `mv` played by `c`
    pub fn get(&self, c: Color, mv: Move) -> i32 {
        self.table[History::index(c, mv)]
    }

    /// Rewards a quiet move that caused a cutoff at `depth`
    pub fn reward(&mut self, c: Color, mv: Move, depth: i32) {
        let index = History::index(c, mv);
        self.table[index] += depth * depth;

        if self.table[index] >= HISTORY_LIMIT {
            for val in self.table.iter_mut() {
                *val /= 2;
            }
        }
    }

    /// Forgets everything
    pub fn clear(&mut self) {
        for val in self.table.iter_mut() {
            *val = 0;
        }
    }
}

impl Default for History {
    fn default() -> Self {
        History::new()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Two quiet moves per height which recently caused a beta cutoff
#[derive(Debug, Clone)]
pub struct Killers {
    moves: Vec<[Option<Move>; 2]>,
}

impl Killers {
    /// Creates a killer table for `max_height` plies
    pub fn new(max_height: usize) -> Killers {
        Killers { moves: vec![[None; 2]; max_height + 1] }
    }

    /// Returns the killer moves stored at `height`
    pub fn get(&self, height: usize) -> [Option<Move>; 2] {
        self.moves[height]
    }

    /// Records `mv` as the newest killer move at `height`
    pub fn insert(&mut self, height: usize, mv: Move) {
        let killers = &mut self.moves[height];

        if !killers[0].map_or(false, |k| k.same_as(mv)) {
            killers[1] = killers[0];
            killers[0] = Some(mv);
        }
    }

    /// Forgets everything
    pub fn clear(&mut self) {
        for killers in self.moves.iter_mut() {
            *killers = [None; 2];
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Most valuable victim, least valuable attacker
pub fn mvv_lva(mv: Move) -> i32 {
    let victim = mv.captured_piece().map_or(0, |p| piece_val(p) as i32)
        + mv.promotion().map_or(0, |p| piece_val(p) as i32);

    victim * 8 - mv.piece() as i32
}

/// Static exchange evaluation: the material balance of the capture sequence on the destination
/// square of `mv`, where each side may stop capturing when it is ahead.
pub fn see(pos: &Position, mv: Move) -> i32 {
    let dest = mv.destination();
    let mut occ = pos.occupied();
    let mut gain = [0; 32];
    let mut depth = 0;
    let mut side = pos.turn();

    // the piece now standing on the destination square
    let mut on_dest = mv.promotion().unwrap_or_else(|| mv.piece());
    gain[0] = mv.captured_piece().map_or(0, |p| piece_val(p) as i32)
        + mv.promotion().map_or(0, |p| (piece_val(p) - piece_val(Piece::Pawn)) as i32);

    occ.remove(mv.origin());
    if mv.is_en_passant() {
        occ.remove(Square::from_coord(dest.file(), mv.origin().rank()));
    }

    loop {
        side = !side;
        // removed pieces drop out of the attack set and uncover the sliders behind them
        let attackers = pos.attackers_to(dest, occ) & occ;
        let ours = attackers & pos.occupied_by(side);

        let next = Piece::ALL.iter()
            .find_map(|&p| (ours & pos.occupied_by_piece(side, p)).peek().map(|sq| (p, sq)));
        let (piece, sq) = match next {
            Some(next) => next,
            None => break,
        };

        if piece == Piece::King && attackers.intersects(pos.occupied_by(!side)) {
            break;
        }

        depth += 1;
        gain[depth] = piece_val(on_dest) as i32 - gain[depth - 1];
        if max(-gain[depth - 1], gain[depth]) < 0 || depth == gain.len() - 1 {
            break;
        }

        occ.remove(sq);
        on_dest = piece;
    }

    while depth > 0 {
        gain[depth - 1] = -max(-gain[depth - 1], gain[depth]);
        depth -= 1;
    }

    gain[0]
}

/// Scores `moves` for searching in `pos` and writes them, best first, to `out`
pub fn order_moves(
    pos: &Position,
    moves: &[Move],
    hash_move: Option<HashMove>,
    killers: [Option<Move>; 2],
    history: &History,
    out: &mut Vec<ScoredMove>,
) {
    out.clear();

    for &mv in moves {
        let mut see_score = None;
        let score = if hash_move.map_or(false, |h| h.matches(mv)) {
            HASH_MOVE
        } else if !mv.is_quiet() {
            let exchange = see(pos, mv);
            see_score = Some(exchange);
            if exchange >= 0 { GOOD_NOISY + mvv_lva(mv) } else { BAD_NOISY + mvv_lva(mv) }
        } else if killers[0].map_or(false, |k| k.same_as(mv)) {
            FIRST_KILLER
        } else if killers[1].map_or(false, |k| k.same_as(mv)) {
            SECOND_KILLER
        } else {
            history.get(pos.turn(), mv)
        };

        out.push(ScoredMove { mv, score, see: see_score });
    }

    out.sort_by_key(|scored| Reverse(scored.score));
}
