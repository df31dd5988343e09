//! Iterative deepening alpha-beta search
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use lazy_static::lazy_static;
use log::{debug, info, trace, warn};
use crate::chess::{Move, Piece, Position, Rank, Zobrist};
use crate::engine::{Book, NoBook, TimeManager, Infinite, Report, Reporter};
use crate::engine::eval::{self, piece_val, PawnCache, Score};
use crate::engine::hash::{Cache, HashMove, NodeType};
use crate::engine::ordering::{self, History, Killers, ScoredMove};

/// The deepest iteration the search will start
pub const MAX_DEPTH: usize = 64;
/// The greatest distance from the root, in plies, that the search will reach
pub const MAX_HEIGHT: usize = 128;

/// The time manager is consulted once every this many nodes
const TIME_CHECK_INTERVAL: u64 = 1024;
const ASPIRATION_WINDOW: i32 = 25;
const ASPIRATION_MIN_DEPTH: usize = 4;
const MAX_ASPIRATION_FAILURES: usize = 3;

const REVERSE_FUTILITY_DEPTH: i32 = 6;
const REVERSE_FUTILITY_MARGIN: i32 = 90;
const RAZOR_DEPTH: i32 = 3;
const NULL_MOVE_MIN_DEPTH: i32 = 2;
const IID_MIN_DEPTH: i32 = 6;
const PRUNING_DEPTH: i32 = 3;
const LMR_MIN_DEPTH: i32 = 3;

static NO_BOOK: NoBook = NoBook;
static INFINITE: Infinite = Infinite;

lazy_static! {
    static ref LMR: [[i32; 64]; 64] = {
        let mut table = [[0; 64]; 64];
        for (depth, row) in table.iter_mut().enumerate().skip(1) {
            for (index, val) in row.iter_mut().enumerate().skip(1) {
                *val = (0.75 + (depth as f64).ln() * (index as f64).ln() / 2.0) as i32;
            }
        }
        table
    };
}

fn late_move_reduction(depth: i32, index: usize) -> i32 {
    LMR[(depth as usize).min(63)][index.min(63)]
}

fn clamp_window(score: i32) -> Score {
    let inf = i32::from(Score::infinity());
    Score::from(score.max(-inf).min(inf) as i16)
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[derive(Debug, Clone, Default)]
struct Frame {
    pv: Vec<Move>,
    static_eval: Score,
    moves: Vec<ScoredMove>,
}

/// A search of a single root position.
///
/// Any number of searches may share one `Cache` from different threads; everything else is owned
/// by the search.
pub struct Search<'a> {
    pos: Position,
    cache: &'a Cache,
    book: &'a dyn Book,
    time: &'a dyn TimeManager,
    stop: Arc<AtomicBool>,
    aborted: bool,
    pondering: bool,
    check_extended: bool,
    max_depth: usize,
    age: u8,
    frames: Vec<Frame>,
    history: History,
    killers: Killers,
    repetitions: Vec<Zobrist>,
    pawn_cache: Option<PawnCache>,
    nodes: u64,
    null_searches: u64,
    iid_searches: u64,
    start: Instant,
}

impl<'a> fmt::Debug for Search<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Search")
            .field("pos", &self.pos)
            .field("max_depth", &self.max_depth)
            .field("age", &self.age)
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl<'a> Search<'a> {
    /// Prepares a search of `pos` using `cache`, with no book and no time limit. Cache entries
    /// are aged by the full move number of `pos`.
    pub fn new(pos: Position, cache: &'a Cache) -> Search<'a> {
        let age = (pos.move_number() & 0x3f) as u8;

        Search {
            pos,
            cache,
            book: &NO_BOOK,
            time: &INFINITE,
            stop: Arc::new(AtomicBool::new(false)),
            aborted: false,
            pondering: false,
            check_extended: false,
            max_depth: MAX_DEPTH,
            age,
            frames: vec![Frame::default(); MAX_HEIGHT + 1],
            history: History::new(),
            killers: Killers::new(MAX_HEIGHT),
            repetitions: Vec::new(),
            pawn_cache: Some(PawnCache::default()),
            nodes: 0,
            null_searches: 0,
            iid_searches: 0,
            start: Instant::now(),
        }
    }

    /// Consults `book` before searching
    pub fn with_book(mut self, book: &'a dyn Book) -> Self {
        self.book = book;
        self
    }

    /// Lets `time` decide when to stop
    pub fn with_time_manager(mut self, time: &'a dyn TimeManager) -> Self {
        self.time = time;
        self
    }

    /// Stops after completing `depth`, which is limited to `MAX_DEPTH`
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1).min(MAX_DEPTH);
        self
    }

    /// Hashes of the positions played before the root, oldest first, for detecting repetitions
    pub fn with_game_history(mut self, hashes: Vec<Zobrist>) -> Self {
        self.repetitions = hashes;
        self
    }

    /// Marks entries stored by this search with `age` instead of the full move number
    pub fn with_age(mut self, age: u8) -> Self {
        self.age = age;
        self
    }

    /// Enables or disables the pawn structure cache
    pub fn with_pawn_cache(mut self, enabled: bool) -> Self {
        self.pawn_cache = if enabled { Some(PawnCache::default()) } else { None };
        self
    }

    /// Shares `stop` as the flag which cancels the search
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Searches without regard for time while `pondering` is set
    pub fn pondering(mut self, pondering: bool) -> Self {
        self.pondering = pondering;
        self
    }

    /// Returns the flag which cancels the search when set
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Returns the root position
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Returns the number of nodes searched
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Searches until the depth limit, the time manager or the stop flag ends it. Sends a report
    /// after every completed depth and a final one, which is also returned.
    pub fn run(&mut self, reporter: &mut dyn Reporter) -> Report {
        self.start = Instant::now();
        self.nodes = 0;
        self.aborted = false;
        self.check_extended = self.pos.in_check();
        self.history.clear();
        self.killers.clear();

        let root_moves = self.pos.legal_moves();
        let mut last = Report {
            depth: 0,
            score: if self.pos.in_check() { Score::mated_in(0) } else { Score::draw() },
            nodes: 0,
            pv: Vec::new(),
            best_move: None,
            elapsed: self.start.elapsed(),
        };

        if root_moves.is_empty() {
            debug!("no legal moves in {}", self.pos);
            reporter.report(&last);
            return last;
        }

        if let Some(book_move) = self.book.lookup(&self.pos) {
            if let Some(&mv) = root_moves.iter().find(|mv| mv.same_as(book_move)) {
                debug!("book move {}", mv);
                last.best_move = Some(mv);
                last.pv = vec![mv];
                last.score = Score::draw();
                reporter.report(&last);
                return last;
            }
            debug!("ignoring illegal book move {}", book_move);
        }

        let mut completed = false;
        for depth in 1..=self.max_depth {
            self.null_searches = 0;
            self.iid_searches = 0;

            let result = if depth >= ASPIRATION_MIN_DEPTH {
                self.aspiration(depth, last.score)
            } else {
                self.alpha_beta(depth as i32, 0, -Score::infinity(), Score::infinity(), None)
            };

            let score = match result {
                Some(score) => score,
                None => {
                    debug!("search stopped during depth {}", depth);
                    break;
                },
            };

            completed = true;
            last = Report {
                depth,
                score,
                nodes: self.nodes,
                pv: self.frames[0].pv.clone(),
                best_move: self.frames[0].pv.first().copied(),
                elapsed: self.start.elapsed(),
            };
            info!("{}", last);
            trace!("depth {}: {} null move searches, {} iid searches, hashfull {}",
                depth, self.null_searches, self.iid_searches, self.cache.consumed());
            reporter.report(&last);

            if let Some(moves) = score.mate_moves() {
                if depth as i32 > 2 * i32::from(moves.abs()) {
                    break;
                }
            }
            if self.stop.load(Ordering::Relaxed)
                || self.time.should_stop(self.pondering, self.check_extended)
            {
                break;
            }
        }

        if !completed || last.best_move.is_none() {
            warn!("no completed search, playing the first legal move");
            last.best_move = Some(root_moves[0]);
            last.pv = vec![root_moves[0]];
        }

        last.nodes = self.nodes;
        last.elapsed = self.start.elapsed();
        reporter.report(&last);
        last
    }

    fn aspiration(&mut self, depth: usize, previous: Score) -> Option<Score> {
        let mut below = ASPIRATION_WINDOW;
        let mut above = ASPIRATION_WINDOW;
        let mut failures = 0;

        loop {
            let (alpha, beta) = if failures >= MAX_ASPIRATION_FAILURES {
                (-Score::infinity(), Score::infinity())
            } else {
                (clamp_window(i32::from(previous) - below), clamp_window(i32::from(previous) + above))
            };

            let score = self.alpha_beta(depth as i32, 0, alpha, beta, None)?;

            if score <= alpha && alpha > -Score::infinity() {
                debug!("depth {} failed low at {}", depth, score);
                below *= 4;
                failures += 1;
            } else if score >= beta && beta < Score::infinity() {
                debug!("depth {} failed high at {}", depth, score);
                above *= 4;
                failures += 1;
            } else {
                return Some(score);
            }
        }
    }

    fn time_to_stop(&mut self) -> bool {
        self.nodes += 1;

        if !self.aborted {
            if self.stop.load(Ordering::Relaxed) {
                self.aborted = true;
            } else if self.nodes % TIME_CHECK_INTERVAL == 0 {
                self.aborted = self.time.should_stop(self.pondering, self.check_extended);
            }
        }

        self.aborted
    }

    fn evaluate(&mut self) -> Score {
        eval::evaluate(&self.pos, self.pawn_cache.as_mut())
    }

    fn is_repetition(&self) -> bool {
        let hash = self.pos.hash();

        self.repetitions.iter().rev()
            .take(self.pos.draw_plies())
            .skip(1)
            .step_by(2)
            .any(|&h| h == hash)
    }

    fn is_draw(&self) -> bool {
        self.pos.fifty_moves() || self.pos.insufficient_material() || self.is_repetition()
    }

    fn update_pv(&mut self, height: usize, mv: Move) {
        let (parent, child) = self.frames.split_at_mut(height + 1);
        let pv = &mut parent[height].pv;

        pv.clear();
        pv.push(mv);
        pv.extend_from_slice(&child[0].pv);
    }

    fn alpha_beta(
        &mut self,
        mut depth: i32,
        height: usize,
        alpha: Score,
        beta: Score,
        preceding: Option<Move>,
    ) -> Option<Score> {
        if self.time_to_stop() {
            return None;
        }

        self.frames[height].pv.clear();
        let is_pv = i32::from(beta) - i32::from(alpha) > 1;

        if height > 0 && self.is_draw() {
            return Some(Score::draw());
        }
        if height >= MAX_HEIGHT - 1 {
            return Some(self.evaluate());
        }

        let in_check = self.pos.in_check();
        if in_check {
            depth += 1;
        }
        if depth <= 0 {
            return self.quiescence(height, alpha, beta);
        }

        let hash = self.pos.hash();
        let entry = self.cache.get(hash, height);
        let mut hash_move = entry.and_then(|e| e.best_move());

        if let Some(entry) = entry {
            if !is_pv && i32::from(entry.depth()) >= depth {
                let score = entry.score();
                match entry.node_type() {
                    NodeType::Exact => return Some(score),
                    NodeType::LowerBound if score >= beta => return Some(score),
                    NodeType::UpperBound if score <= alpha => return Some(score),
                    _ => { },
                }
            }
        }

        let static_eval = match entry {
            Some(entry) => entry.static_eval(),
            None => self.evaluate(),
        };
        self.frames[height].static_eval = static_eval;

        if !is_pv && !in_check {
            let static_eval = i32::from(static_eval);

            if depth <= REVERSE_FUTILITY_DEPTH
                && static_eval - REVERSE_FUTILITY_MARGIN * depth >= i32::from(beta)
            {
                return Some(self.frames[height].static_eval);
            }

            if depth <= RAZOR_DEPTH && static_eval + 300 + 200 * depth < i32::from(alpha) {
                let score = self.quiescence(height, alpha, beta)?;
                if score < alpha {
                    return Some(score);
                }
            }

            if depth >= NULL_MOVE_MIN_DEPTH
                && preceding.is_some()
                && static_eval >= i32::from(beta)
                && self.pos.has_non_pawn_material(self.pos.turn())
            {
                let reduction = 3 + depth / 6;
                self.null_searches += 1;

                self.repetitions.push(hash);
                let undo = self.pos.make_null_move();
                let result = self.alpha_beta(depth - 1 - reduction, height + 1, -beta, -beta + 1, None);
                self.pos.unmake_null_move(undo);
                self.repetitions.pop();

                let score = -(result?);
                if score >= beta {
                    return Some(if score.is_mate() { beta } else { score });
                }
            }
        }

        if hash_move.is_none() && depth >= IID_MIN_DEPTH && is_pv {
            self.iid_searches += 1;
            // the nested call adds its own check extension
            let iid_depth = if in_check { depth - 3 } else { depth - 2 };
            self.alpha_beta(iid_depth, height, alpha, beta, preceding)?;
            hash_move = self.cache.get(hash, height).and_then(|e| e.best_move());
            self.frames[height].static_eval = static_eval;
            self.frames[height].pv.clear();
        }

        let moves = self.pos.legal_moves();
        if moves.is_empty() {
            return Some(if in_check { Score::mated_in(height) } else { Score::draw() });
        }

        let mut ordered = mem::take(&mut self.frames[height].moves);
        ordering::order_moves(&self.pos, &moves, hash_move, self.killers.get(height), &self.history,
            &mut ordered);
        let result = self.search_moves(&ordered, depth, height, alpha, beta, hash);
        self.frames[height].moves = ordered;

        result
    }

    fn search_moves(
        &mut self,
        moves: &[ScoredMove],
        depth: i32,
        height: usize,
        mut alpha: Score,
        beta: Score,
        hash: Zobrist,
    ) -> Option<Score> {
        let is_pv = i32::from(beta) - i32::from(alpha) > 1;
        let in_check = self.pos.in_check();
        let can_prune = !is_pv && !in_check;
        let static_eval = i32::from(self.frames[height].static_eval);
        let original_alpha = alpha;
        let us = self.pos.turn();

        let mut best_score = -Score::infinity();
        let mut best_move = None;

        for (index, scored) in moves.iter().enumerate() {
            let mv = scored.mv;
            let quiet = mv.is_quiet() && !mv.gives_check();

            if can_prune && quiet && depth <= PRUNING_DEPTH {
                if index as i32 >= 3 + depth * depth {
                    continue;
                }
                if static_eval + 100 * depth + 100 <= i32::from(alpha) {
                    continue;
                }
            }

            self.repetitions.push(hash);
            let undo = self.pos.make_move(mv);
            let result = self.search_move(mv, index, depth, height, alpha, beta, in_check, quiet);
            self.pos.unmake_move(mv, undo);
            self.repetitions.pop();
            let score = result?;

            if score > best_score {
                best_score = score;
                best_move = Some(mv);

                if score > alpha {
                    alpha = score;
                    self.update_pv(height, mv);

                    if score >= beta {
                        self.store(hash, Some(mv), score, depth, NodeType::LowerBound, height);
                        if mv.is_quiet() {
                            self.history.reward(us, mv, depth);
                            self.killers.insert(height, mv);
                        }
                        return Some(score);
                    }
                }
            }
        }

        // every move was pruned
        if best_move.is_none() {
            best_score = alpha;
        }

        let node_type = if alpha > original_alpha { NodeType::Exact } else { NodeType::UpperBound };
        self.store(hash, best_move, best_score, depth, node_type, height);
        Some(best_score)
    }

    #[allow(clippy::too_many_arguments)]
    fn search_move(
        &mut self,
        mv: Move,
        index: usize,
        depth: i32,
        height: usize,
        alpha: Score,
        beta: Score,
        in_check: bool,
        quiet: bool,
    ) -> Option<Score> {
        let is_pv = i32::from(beta) - i32::from(alpha) > 1;
        let new_depth = depth - 1;

        if index == 0 {
            return Some(-self.alpha_beta(new_depth, height + 1, -beta, -alpha, Some(mv))?);
        }

        let mut reduction = 0;
        if depth >= LMR_MIN_DEPTH && index >= if is_pv { 4 } else { 3 } && quiet && !in_check {
            reduction = late_move_reduction(depth, index).min(new_depth - 1).max(0);
        }

        let scout = -alpha - 1;
        let mut score = -self.alpha_beta(new_depth - reduction, height + 1, scout, -alpha, Some(mv))?;

        if reduction > 0 && score > alpha {
            score = -self.alpha_beta(new_depth, height + 1, scout, -alpha, Some(mv))?;
        }
        if score > alpha && score < beta {
            score = -self.alpha_beta(new_depth, height + 1, -beta, -alpha, Some(mv))?;
        }

        Some(score)
    }

    fn store(
        &self,
        hash: Zobrist,
        best_move: Option<Move>,
        score: Score,
        depth: i32,
        node_type: NodeType,
        height: usize,
    ) {
        let static_eval = self.frames[height].static_eval;
        let depth = depth.min(i32::from(i8::MAX)) as i8;

        self.cache.set(hash, best_move.map(HashMove::from), score, static_eval, depth, node_type,
            self.age, height);
    }

    fn quiescence(&mut self, height: usize, mut alpha: Score, beta: Score) -> Option<Score> {
        if self.time_to_stop() {
            return None;
        }

        self.frames[height].pv.clear();

        if height > 0 && self.is_draw() {
            return Some(Score::draw());
        }

        let in_check = self.pos.in_check();
        let stand_pat = self.evaluate();
        self.frames[height].static_eval = stand_pat;

        if height >= MAX_HEIGHT - 1 {
            return Some(stand_pat);
        }

        if !in_check {
            if stand_pat >= beta {
                return Some(beta);
            }
            if i32::from(stand_pat) + self.delta_margin() < i32::from(alpha) {
                return Some(alpha);
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
        }

        let moves = if in_check { self.pos.legal_moves() } else { self.pos.noisy_moves() };
        if in_check && moves.is_empty() {
            return Some(Score::mated_in(height));
        }

        let mut ordered = mem::take(&mut self.frames[height].moves);
        ordering::order_moves(&self.pos, &moves, None, [None, None], &self.history, &mut ordered);
        let result = self.quiescence_moves(&ordered, height, alpha, beta, in_check);
        self.frames[height].moves = ordered;

        result
    }

    fn quiescence_moves(
        &mut self,
        moves: &[ScoredMove],
        height: usize,
        mut alpha: Score,
        beta: Score,
        in_check: bool,
    ) -> Option<Score> {
        let stand_pat = i32::from(self.frames[height].static_eval);
        let hash = self.pos.hash();
        let mut best_score = if in_check { -Score::infinity() } else { alpha };

        for scored in moves {
            let mv = scored.mv;

            if !in_check {
                if scored.see.map_or(false, |see| see < 0) {
                    continue;
                }
                if !mv.is_promotion() {
                    let gain = piece_val(Piece::Pawn) + mv.captured_piece().map_or(0, piece_val);
                    if stand_pat + i32::from(gain) <= i32::from(alpha) {
                        continue;
                    }
                }
            }

            self.repetitions.push(hash);
            let undo = self.pos.make_move(mv);
            let result = self.quiescence(height + 1, -beta, -alpha);
            self.pos.unmake_move(mv, undo);
            self.repetitions.pop();
            let score = -(result?);

            if score > best_score {
                best_score = score;

                if score > alpha {
                    alpha = score;
                    self.update_pv(height, mv);

                    if score >= beta {
                        break;
                    }
                }
            }
        }

        Some(best_score)
    }

    /// The most a capture sequence could plausibly gain in the current position
    fn delta_margin(&self) -> i32 {
        let us = self.pos.turn();
        let them = !us;

        let seventh = self.pos.occupied_by_piece(us, Piece::Pawn).into_iter()
            .any(|sq| sq.relative_rank(us) == Rank::R7);
        let mut margin = piece_val(if seventh { Piece::Queen } else { Piece::Pawn });

        let best_piece = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight].iter()
            .copied()
            .find(|&p| !self.pos.occupied_by_piece(them, p).is_empty())
            .unwrap_or(Piece::Pawn);
        margin += piece_val(best_piece);

        i32::from(margin)
    }
}
