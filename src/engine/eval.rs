//! Function to evaluate a position.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::ops;
use crate::chess::{Color, Piece, File, Rank, Square, Position, Bitboard, Zobrist};
use crate::chess::bitboard::*;
use crate::chess::psqt::{self, Tapered};
use Color::*;
use Piece::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Score, in centipawns, from the point of view of the side to move
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Score(i16);

impl Score {
    /// The score for delivering checkmate at the root. Mates further away score less.
    pub const CHECKMATE: i16 = 30_000;
    /// The largest score the static evaluation can return
    pub const MAX_EVAL: i16 = 25_000;

    /// Returns the greatest possible score
    pub fn infinity() -> Self {
        Score(32_000)
    }
    /// Returns the score for a draw
    pub fn draw() -> Self {
        Score(0)
    }
    /// Returns the score for checkmating the opponent at `height` plies from the root
    pub fn mates_in(height: usize) -> Self {
        Score(Score::CHECKMATE - height as i16)
    }
    /// Returns the score for being checkmated at `height` plies from the root
    pub fn mated_in(height: usize) -> Self {
        -Score::mates_in(height)
    }
    /// Returns `true` if the score announces a forced mate for either side
    pub fn is_mate(self) -> bool {
        self.0.abs() > Score::MAX_EVAL && self.0.abs() <= Score::CHECKMATE
    }
    /// Returns the number of moves until mate, negative if the side to move is getting mated
    pub fn mate_moves(self) -> Option<i16> {
        if !self.is_mate() {
            None
        } else if self.0 > 0 {
            Some((Score::CHECKMATE - self.0 + 1) / 2)
        } else {
            Some(-(Score::CHECKMATE + self.0) / 2)
        }
    }
}

impl ops::Neg for Score {
    type Output = Score;

    fn neg(self) -> Self {
        Score(-self.0)
    }
}

impl ops::Add<i16> for Score {
    type Output = Score;

    fn add(self, rhs: i16) -> Self {
        Score(self.0 + rhs)
    }
}

impl ops::Sub<i16> for Score {
    type Output = Score;

    fn sub(self, rhs: i16) -> Self {
        Score(self.0 - rhs)
    }
}

impl From<i16> for Score {
    fn from(val: i16) -> Self {
        Score(val)
    }
}

impl From<Score> for i16 {
    fn from(val: Score) -> Self {
        val.0
    }
}

impl From<Score> for i32 {
    fn from(val: Score) -> Self {
        val.0 as i32
    }
}

impl fmt::Display for Score {
    /// Writes the score as `cp <centipawns>` or `mate <moves>`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mate_moves() {
            Some(moves) => write!(f, "mate {}", moves),
            None => write!(f, "cp {}", self.0),
        }
    }
}

/// Returns the value of a piece, as used for exchanges and pruning margins
pub fn piece_val(piece: Piece) -> i16 {
    psqt::material(piece).mg as i16
}

////////////////////////////////////////////////////////////////////////////////////////////////////
const TEMPO: i32 = 5;

const BACKWARD_PAWN: Tapered = Tapered::new(-10, -3);
const ISOLATED_PAWN: Tapered = Tapered::new(-10, -4);
const DOUBLED_PAWN: Tapered = Tapered::new(-2, -27);
const PASSED_PAWN: Tapered = Tapered::new(2, 12);
const ADVANCED_PASSED_PAWN: Tapered = Tapered::new(12, 64);
const CANDIDATE_PASSED_PAWN: Tapered = Tapered::new(32, 50);
const PAWN_ISLAND: Tapered = Tapered::new(-3, -7);

const ROOK_OPEN_FILE: Tapered = Tapered::new(46, 0);
const ROOK_SEMI_OPEN_FILE: Tapered = Tapered::new(15, 19);
const VERTICAL_DOUBLE_ROOK: Tapered = Tapered::new(10, 10);
const HORIZONTAL_DOUBLE_ROOK: Tapered = Tapered::new(25, 12);

const MOBILITY: Tapered = Tapered::new(6, 3);
const AGGRESSIVITY: Tapered = Tapered::new(1, 6);

// indexed by attacker class (pawn, minor, major), then inner or outer ring
const KING_ZONE_ATTACK: [[Tapered; 2]; 3] = [
    [Tapered::new(0, 0), Tapered::new(4, 0)],
    [Tapered::new(18, 0), Tapered::new(11, 1)],
    [Tapered::new(17, 0), Tapered::new(8, 5)],
];

const PAWN_SHIELD: Tapered = Tapered::new(-10, -9);
const NOT_CASTLING: Tapered = Tapered::new(-26, -5);
const KING_ZONE_OPEN_FILE: Tapered = Tapered::new(-36, 0);
const KING_ZONE_MISSING_PAWN: Tapered = Tapered::new(-15, 0);

/// Returns the estimated static score for the position, from the side to move's point of view.
///
/// Pawn structure terms are looked up in, and stored to, `pawn_cache` when one is given. The
/// result is the same either way.
pub fn evaluate(pos: &Position, pawn_cache: Option<&mut PawnCache>) -> Score {
    let pawns = match pawn_cache {
        Some(cache) => cache.probe(pos),
        None => [pawn_structure(pos, White), pawn_structure(pos, Black)],
    };
    let mobility = mobility(pos);

    let mut total = [Tapered::default(); Color::COUNT];
    for &c in Color::ALL.iter() {
        total[c as usize] = pos.material(c)
            + pos.psqt(c)
            + rook_files(pos, c)
            + doubled_rooks(pos, c)
            + king_safety(pos, c)
            + pawns[c as usize]
            + mobility[c as usize];
    }

    let us = pos.turn();
    let val = (total[us as usize] - total[!us as usize]).blend(pos.phase()) + TEMPO;
    let max = Score::MAX_EVAL as i32;

    Score(val.max(-max).min(max) as i16)
}

fn rook_files(pos: &Position, c: Color) -> Tapered {
    let rooks = pos.occupied_by_piece(c, Rook);
    let own_files = pos.occupied_by_piece(c, Pawn).file_fill();
    let pawn_files = pos.pieces_of_type(Pawn).file_fill();

    let open = rooks & !pawn_files;
    let semi_open = rooks & !open & !own_files;

    ROOK_OPEN_FILE * open.len() as i32 + ROOK_SEMI_OPEN_FILE * semi_open.len() as i32
}

fn doubled_rooks(pos: &Position, c: Color) -> Tapered {
    let mut rooks = pos.occupied_by_piece(c, Rook);
    let occ = pos.occupied();

    let first = match rooks.pop() {
        Some(sq) => sq,
        None => return Tapered::default(),
    };
    let connected = |other: Square| between(first, other).is_disjoint(occ);

    if rooks.into_iter().any(|sq| sq.file() == first.file() && connected(sq)) {
        VERTICAL_DOUBLE_ROOK
    } else if rooks.into_iter().any(|sq| sq.rank() == first.rank() && connected(sq)) {
        HORIZONTAL_DOUBLE_ROOK
    } else {
        Tapered::default()
    }
}

fn king_safety(pos: &Position, c: Color) -> Tapered {
    let king = pos.king_location(c);
    let own_pawns = pos.occupied_by_piece(c, Pawn);
    let all_pawns = pos.pieces_of_type(Pawn);

    let back_ranks = Bitboard::from(Rank::R1.relative_to(c)) | Rank::R2.relative_to(c).into();
    let shield_ranks = Bitboard::from(Rank::R2.relative_to(c)) | Rank::R3.relative_to(c).into();

    let flank = [[File::F, File::G, File::H], [File::A, File::B, File::C]].iter()
        .find(|files| {
            let zone = files.iter().fold(Bitboard::EMPTY, |bb, &f| bb | f.into());
            (zone & back_ranks).contains(king)
        });

    match flank {
        Some(files) => files.iter().fold(Tapered::default(), |score, &f| {
            let file = Bitboard::from(f);
            if all_pawns.is_disjoint(file) {
                score + KING_ZONE_OPEN_FILE
            } else if own_pawns.is_disjoint(file) {
                score + KING_ZONE_MISSING_PAWN
            } else if own_pawns.is_disjoint(file & shield_ranks) {
                score + PAWN_SHIELD
            } else {
                score
            }
        }),
        None if !pos.has_castling_rights(c) => NOT_CASTLING,
        None => Tapered::default(),
    }
}

/// Squares attacked by each attacker class: pawns, minor pieces, and the rest
fn attacks_by_class(pos: &Position, c: Color) -> [Bitboard; 3] {
    let occ = pos.occupied();
    let mut attacks = [pos.pawn_attacks(c), Bitboard::EMPTY, Bitboard::EMPTY];

    for &piece in [Knight, Bishop, Rook, Queen, King].iter() {
        let class = if piece == Knight || piece == Bishop { 1 } else { 2 };
        for sq in pos.occupied_by_piece(c, piece) {
            attacks[class] |= piece_attacks(piece, sq, occ);
        }
    }

    attacks
}

fn mobility(pos: &Position) -> [Tapered; Color::COUNT] {
    let mut scores = [Tapered::default(); Color::COUNT];
    let white_half = [Rank::R1, Rank::R2, Rank::R3, Rank::R4].iter()
        .fold(Bitboard::EMPTY, |bb, &r| bb | r.into());

    for &c in Color::ALL.iter() {
        let attacks = attacks_by_class(pos, c);
        let enemy_king = pos.king_location(!c);
        let rings = [inner_ring(enemy_king), outer_ring(enemy_king)];
        let own_half = if c == White { white_half } else { !white_half };

        let quiet = (attacks[0] | attacks[1] | attacks[2]) & !(rings[0] | rings[1]);
        let score = &mut scores[c as usize];
        *score += MOBILITY * (quiet & own_half).len() as i32;
        *score += AGGRESSIVITY * (quiet & !own_half).len() as i32;

        for (class, &att) in attacks.iter().enumerate() {
            for (ring, &zone) in rings.iter().enumerate() {
                *score += KING_ZONE_ATTACK[class][ring] * (att & zone).len() as i32;
            }
        }
    }

    scores
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Counts of each pawn structure feature for one side
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct PawnCounts {
    /// Pawns with no enemy pawn ahead of them on their own or an adjacent file
    pub passed: usize,
    /// Passed pawns on the sixth or seventh rank
    pub advanced: usize,
    /// Pawns on a half-open file with at least as many helpers as sentries
    pub candidate: usize,
    /// Pawns behind their neighbours whose stop square is guarded by an enemy pawn
    pub backward: usize,
    /// Pawns with no friendly pawn on an adjacent file
    pub isolated: usize,
    /// Pawns beyond the first on each file
    pub doubled: usize,
    /// Groups of adjacent files holding friendly pawns
    pub islands: usize,
}

impl PawnCounts {
    /// Counts the pawn structure features of color `c`
    pub fn new(pos: &Position, c: Color) -> PawnCounts {
        let own = pos.occupied_by_piece(c, Pawn);
        let enemy = pos.occupied_by_piece(!c, Pawn);
        let enemy_attacks = pos.pawn_attacks(!c);
        let mut counts = PawnCounts::default();

        for sq in own {
            let ahead = passed_span(c, sq);
            let neighbours = own & adjacent_files(sq.file());
            let helpers = neighbours & !ahead;

            if neighbours.is_empty() {
                counts.isolated += 1;
            }

            if ahead.is_disjoint(enemy) {
                counts.passed += 1;
                if sq.relative_rank(c) >= Rank::R6 {
                    counts.advanced += 1;
                }
            } else if forward_span(c, sq).is_disjoint(own | enemy)
                && helpers.len() >= (ahead & enemy).len() {
                counts.candidate += 1;
            }

            let stop = sq.offset(0, c.forward());
            if !neighbours.is_empty() && helpers.is_empty()
                && stop.map_or(false, |stop| enemy_attacks.contains(stop)) {
                counts.backward += 1;
            }
        }

        let mut prev_file_has_pawn = false;
        for &f in File::ALL.iter() {
            let on_file = (own & f.into()).len();
            if on_file > 1 {
                counts.doubled += on_file - 1;
            }
            if on_file > 0 && !prev_file_has_pawn {
                counts.islands += 1;
            }
            prev_file_has_pawn = on_file > 0;
        }

        counts
    }

    /// Returns the score of the counted features
    pub fn score(&self) -> Tapered {
        PASSED_PAWN * self.passed as i32
            + ADVANCED_PASSED_PAWN * self.advanced as i32
            + CANDIDATE_PASSED_PAWN * self.candidate as i32
            + BACKWARD_PAWN * self.backward as i32
            + ISOLATED_PAWN * self.isolated as i32
            + DOUBLED_PAWN * self.doubled as i32
            + PAWN_ISLAND * self.islands as i32
    }
}

fn pawn_structure(pos: &Position, c: Color) -> Tapered {
    PawnCounts::new(pos, c).score()
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A cache of pawn structure scores, keyed by the pawn hash of the position
#[derive(Debug, Clone)]
pub struct PawnCache {
    entries: Vec<Option<(Zobrist, [Tapered; Color::COUNT])>>,
    hits: u64,
}

impl PawnCache {
    /// Creates a cache with at least `entries` slots
    pub fn new(entries: usize) -> PawnCache {
        PawnCache {
            entries: vec![None; entries.max(1).next_power_of_two()],
            hits: 0,
        }
    }

    /// Returns the pawn structure scores of both colors, computing and storing them on a miss
    pub fn probe(&mut self, pos: &Position) -> [Tapered; Color::COUNT] {
        let key = pos.pawn_hash();
        let index = u64::from(key) as usize & (self.entries.len() - 1);

        match self.entries[index] {
            Some((stored, scores)) if stored == key => {
                self.hits += 1;
                scores
            },
            _ => {
                let scores = [pawn_structure(pos, White), pawn_structure(pos, Black)];
                self.entries[index] = Some((key, scores));
                scores
            },
        }
    }

    /// Returns the number of lookups served from the cache
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = None;
        }
        self.hits = 0;
    }
}

impl Default for PawnCache {
    fn default() -> Self {
        PawnCache::new(1 << 14)
    }
}

#[cfg(test)]
mod eval_test {
    use std::str::FromStr;
    use crate::chess::{Color, Position};
    use super::{Score, PawnCache, PawnCounts, evaluate};

    fn eval(fen: &str) -> Score {
        evaluate(&Position::from_str(fen).unwrap(), None)
    }

    #[test]
    fn eval_positions() {
        // symmetric positions are worth the tempo bonus alone
        assert_eq!(evaluate(&Position::new(), None), Score::from(5));
        assert_eq!(eval("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1"), Score::from(5));

        assert!(eval("kq6/8/8/8/8/8/8/K7 w - - 0 1") < Score::from(-800));
        assert!(eval("k7/8/8/8/8/8/8/KQ6 w - - 0 1") > Score::from(800));
        assert_eq!(
            i16::from(eval("k7/8/8/8/8/8/8/KQ6 w - - 0 1"))
                + i16::from(eval("k7/8/8/8/8/8/8/KQ6 b - - 0 1")),
            10
        );
        assert_eq!(
            eval("k7/3p4/8/8/8/8/8/K7 b - - 0 1"),
            eval("k7/8/8/8/8/8/3P4/K7 w - - 0 1"),
        );
    }

    #[test]
    fn pawn_cache_gives_the_same_result() {
        let mut cache = PawnCache::new(64);
        let fens = [
            "r1bqkb1r/pp3ppp/2n1pn2/2pp4/3P4/2PBPN2/PP3PPP/RNBQK2R w KQkq - 0 6",
            "8/5pk1/6p1/1P6/P7/6P1/5PK1/8 b - - 0 40",
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
        ];

        for fen in fens.iter() {
            let pos = Position::from_str(fen).unwrap();
            let uncached = evaluate(&pos, None);
            assert_eq!(evaluate(&pos, Some(&mut cache)), uncached);
            assert_eq!(evaluate(&pos, Some(&mut cache)), uncached);
        }
        assert_eq!(cache.hits(), 3);
    }

    #[test]
    fn evaluation_follows_make_and_unmake() {
        let mut pos = Position::from_str(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
        let before = evaluate(&pos, None);

        for mv in pos.legal_moves() {
            let undo = pos.make_move(mv);
            let rebuilt = Position::from_str(&pos.to_fen_str()).unwrap();
            assert_eq!(evaluate(&pos, None), evaluate(&rebuilt, None), "{}", mv);
            pos.unmake_move(mv, undo);
            assert_eq!(evaluate(&pos, None), before, "{}", mv);
        }
    }

    #[test]
    fn pawn_structure_counts() {
        // every white pawn is isolated and passed, the c-pawns are doubled, h6 is advanced
        let pos = Position::from_str("4k3/8/7P/8/4P3/2P5/P1P5/4K3 w - - 0 1").unwrap();
        let white = PawnCounts::new(&pos, Color::White);
        assert_eq!(white.isolated, 5);
        assert_eq!(white.doubled, 1);
        assert_eq!(white.passed, 5);
        assert_eq!(white.advanced, 1);
        assert_eq!(white.islands, 4);
        assert_eq!(PawnCounts::new(&pos, Color::Black), PawnCounts::default());

        // the c4 pawn has one helper on b2 facing one sentry on b5
        let pos = Position::from_str("4k3/8/8/1p6/2P5/8/1P6/4K3 w - - 0 1").unwrap();
        let white = PawnCounts::new(&pos, Color::White);
        assert_eq!(white.candidate, 1);
        assert_eq!(white.passed, 0);

        // d2 lags behind e3 and its stop square is covered by the c4 pawn
        let pos = Position::from_str("4k3/8/8/8/2p5/4P3/3P4/4K3 w - - 0 1").unwrap();
        let white = PawnCounts::new(&pos, Color::White);
        assert_eq!(white.backward, 1);
        assert_eq!(white.isolated, 0);
    }

    #[test]
    fn scores_display() {
        assert_eq!(Score::from(-37).to_string(), "cp -37");
        assert_eq!(Score::mates_in(1).to_string(), "mate 1");
        assert_eq!(Score::mates_in(3).to_string(), "mate 2");
        assert_eq!(Score::mated_in(2).to_string(), "mate -1");
        assert!(!Score::from(Score::MAX_EVAL).is_mate());
        assert!(Score::mated_in(100).is_mate());
    }
}
