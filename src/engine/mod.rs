//! The engine
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::time::{Duration, Instant};
use crate::chess::{Move, Position};

pub mod config;
pub mod eval;
pub mod hash;
pub mod ordering;
pub mod search;

pub use config::Config;
pub use eval::{evaluate, PawnCache, Score};
pub use hash::{Cache, CacheEntry, HashMove, NodeType};
pub use search::{Search, MAX_DEPTH, MAX_HEIGHT};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Supplies prepared moves for known positions
pub trait Book {
    /// Returns the book move for `position`, if there is one
    fn lookup(&self, position: &Position) -> Option<Move>;
}

/// A book without any moves
#[derive(Debug, Copy, Clone, Default)]
pub struct NoBook;

impl Book for NoBook {
    fn lookup(&self, _position: &Position) -> Option<Move> {
        None
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Decides when a running search has used up its time
pub trait TimeManager {
    /// Returns `true` if the search should stop now. `check_extended` is set when the root
    /// position is in check.
    fn should_stop(&self, pondering: bool, check_extended: bool) -> bool;
}

impl<F> TimeManager for F where F: Fn(bool, bool) -> bool {
    fn should_stop(&self, pondering: bool, check_extended: bool) -> bool {
        self(pondering, check_extended)
    }
}

/// Never stops the search; it ends at the depth limit or when stopped from outside
#[derive(Debug, Copy, Clone, Default)]
pub struct Infinite;

impl TimeManager for Infinite {
    fn should_stop(&self, _pondering: bool, _check_extended: bool) -> bool {
        false
    }
}

/// Stops the search once a fixed amount of time has passed. The budget grows by half when the
/// root position is in check. Pondering never stops.
#[derive(Debug, Copy, Clone)]
pub struct MoveTime {
    start: Instant,
    budget: Duration,
}

impl MoveTime {
    /// Starts the clock now with the given budget
    pub fn new(budget: Duration) -> MoveTime {
        MoveTime { start: Instant::now(), budget }
    }
}

impl TimeManager for MoveTime {
    fn should_stop(&self, pondering: bool, check_extended: bool) -> bool {
        if pondering {
            return false;
        }

        let budget = if check_extended { self.budget + self.budget / 2 } else { self.budget };
        self.start.elapsed() >= budget
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Thinking output, sent after each completed depth and at the end of the search
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// The depth reached
    pub depth: usize,
    /// The score of the principal variation
    pub score: Score,
    /// The number of nodes searched so far
    pub nodes: u64,
    /// The principal variation
    pub pv: Vec<Move>,
    /// The move to play, if there is a legal one
    pub best_move: Option<Move>,
    /// The time used so far
    pub elapsed: Duration,
}

impl Report {
    /// Returns the average number of nodes searched per second
    pub fn nps(&self) -> u64 {
        let micros = self.elapsed.as_micros().max(1) as u64;
        self.nodes * 1_000_000 / micros
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "depth {} score {} nodes {} nps {} time {}",
            self.depth, self.score, self.nodes, self.nps(), self.elapsed.as_millis())?;

        if !self.pv.is_empty() {
            write!(f, " pv")?;
            for mv in self.pv.iter() {
                write!(f, " {}", mv)?;
            }
        }

        Ok(())
    }
}

/// Receives the reports of a search
pub trait Reporter {
    /// Called with each report
    fn report(&mut self, report: &Report);
}

impl<F> Reporter for F where F: FnMut(&Report) {
    fn report(&mut self, report: &Report) {
        self(report)
    }
}

/// Discards every report
#[derive(Debug, Copy, Clone, Default)]
pub struct NoReport;

impl Reporter for NoReport {
    fn report(&mut self, _report: &Report) { }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An engine error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested cache is larger than the maximum
    CacheTooLarge,
    /// The requested cache has no room for any entries
    CacheTooSmall,
    /// The configuration could not be read or holds invalid values
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;

        match self {
            CacheTooLarge => write!(f, "cache size is above {} MB", hash::MAX_CACHE_MB),
            CacheTooSmall => write!(f, "cache size must be at least 1 MB"),
            Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error { }

/// Result type used by the `engine` module
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_time_extends_when_in_check() {
        let tm = MoveTime::new(Duration::from_millis(0));
        assert!(tm.should_stop(false, false));
        assert!(tm.should_stop(false, true));
        assert!(!tm.should_stop(true, false));

        let tm = MoveTime::new(Duration::from_secs(3600));
        assert!(!tm.should_stop(false, true));
        assert!(!Infinite.should_stop(false, false));
        assert!((|pondering: bool, _check: bool| !pondering).should_stop(false, false));
    }

    #[test]
    fn report_display() {
        let pos = Position::new();
        let mv = pos.parse_move("e2e4").unwrap();
        let report = Report {
            depth: 3,
            score: Score::from(25),
            nodes: 1000,
            pv: vec![mv],
            best_move: Some(mv),
            elapsed: Duration::from_millis(500),
        };

        assert_eq!(report.nps(), 2000);
        assert_eq!(report.to_string(), "depth 3 score cp 25 nodes 1000 nps 2000 time 500 pv e2e4");
    }

    #[test]
    fn error_messages() {
        assert_eq!(Error::CacheTooLarge.to_string(), "cache size is above 8000 MB");
        assert_eq!(Error::Config("bad".into()).to_string(), "configuration error: bad");
    }
}
