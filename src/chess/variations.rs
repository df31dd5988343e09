//! Module for counting and printing the number of variations from a given position
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::chess::*;

/// Print the number of variations of the given `depth` for each legal move from `pos`
pub fn print(pos: &Position, depth: usize) -> usize {
    if depth < 1 {
        return 1;
    }

    let mut pos = pos.clone();
    let mut total = 0;

    for mv in pos.legal_moves() {
        let undo = pos.make_move(mv);
        let count = count_in_place(&mut pos, depth - 1);
        total += count;
        println!("\t{:7}\t{:12}\t{}", mv, count, pos);
        pos.unmake_move(mv, undo);
    }

    total
}

/// Count the number of variations of the given `depth` from `pos`
pub fn count(pos: &Position, depth: usize) -> usize {
    count_in_place(&mut pos.clone(), depth)
}

fn count_in_place(pos: &mut Position, depth: usize) -> usize {
    if depth < 1 {
        return 1;
    }

    let moves = pos.legal_moves();
    if depth == 1 {
        return moves.len();
    }

    let mut total = 0;
    for mv in moves {
        let undo = pos.make_move(mv);
        total += count_in_place(pos, depth - 1);
        pos.unmake_move(mv, undo);
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_counts_from_the_start() {
        let pos = Position::new();
        assert_eq!(count(&pos, 0), 1);
        assert_eq!(count(&pos, 1), 20);
        assert_eq!(count(&pos, 2), 400);
        assert_eq!(count(&pos, 3), 8902);
    }
}
