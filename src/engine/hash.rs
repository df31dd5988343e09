//! The Transposition Table
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::num::NonZeroU16;
use std::convert::TryFrom;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use log::debug;
use crate::chess::{Square, Piece, Move, Zobrist};
use crate::engine::{Score, Error, Result, MAX_HEIGHT};

/// The largest cache that can be allocated, in megabytes
pub const MAX_CACHE_MB: usize = 8000;

/// Number of searches after which an entry is considered stale
const OLD_AGE: u8 = 5;

const SLOT_BYTES: usize = 16;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A representation of a move that fits in 16 bits.
///
/// `Option<HashMove>` is also guaranteed to be only 16 bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HashMove(NonZeroU16);

impl HashMove {
    /// Returns the origin of the moved piece
    pub fn origin(self) -> Square {
        Square::try_from(((self.0.get() >> 9) & 0o77) as usize).expect("INFALLIBLE")
    }
    /// Returns the destination of the moved piece
    pub fn destination(self) -> Square {
        Square::try_from(((self.0.get() >> 3) & 0o77) as usize).expect("INFALLIBLE")
    }
    /// Returns the promotion piece, if any
    pub fn promotion(self) -> Option<Piece> {
        match self.0.get() & 0o7 {
            1 => Some(Piece::Knight),
            2 => Some(Piece::Bishop),
            3 => Some(Piece::Rook),
            4 => Some(Piece::Queen),
            _ => None,
        }
    }

    /// Returns `true` if `mv` moves between the same squares with the same promotion
    pub fn matches(self, mv: Move) -> bool {
        mv.origin() == self.origin()
            && mv.destination() == self.destination()
            && mv.promotion() == self.promotion()
    }

    fn from_bits(bits: u16) -> Option<HashMove> {
        NonZeroU16::new(bits).map(HashMove)
    }

    fn bits(mv: Option<HashMove>) -> u16 {
        mv.map_or(0, |mv| mv.0.get())
    }
}

impl From<Move> for HashMove {
    fn from(mv: Move) -> HashMove {
        // origin and destination always differ, so the value is never zero
        HashMove(NonZeroU16::new(
            ((mv.origin() as u16) << 9)
            + ((mv.destination() as u16) << 3)
            + match mv.promotion() {
                Some(Piece::Knight) => 1,
                Some(Piece::Bishop) => 2,
                Some(Piece::Rook) => 3,
                Some(Piece::Queen) => 4,
                _ => 0,
            }
        ).expect("INFALLIBLE"))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Indicates the kind of bound a cached score is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// The score is exact
    Exact,
    /// The score is at most the stored value
    UpperBound,
    /// The score is at least the stored value
    LowerBound,
}

impl NodeType {
    fn bits(self) -> u64 {
        match self {
            NodeType::Exact => 1,
            NodeType::UpperBound => 2,
            NodeType::LowerBound => 3,
        }
    }

    fn from_bits(bits: u64) -> Option<NodeType> {
        match bits {
            1 => Some(NodeType::Exact),
            2 => Some(NodeType::UpperBound),
            3 => Some(NodeType::LowerBound),
            _ => None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An entry in the transposition table, as returned by [`Cache::get`].
///
/// Packed, it is exactly 64 bits: move (16), score (16), static evaluation (16), depth (8),
/// node type (2) and age (6).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    best_move: Option<HashMove>,
    score: Score,
    static_eval: Score,
    depth: i8,
    node_type: NodeType,
    age: u8,
}

impl CacheEntry {
    /// Returns the best or refuting move found at this position, if any
    pub fn best_move(&self) -> Option<HashMove> {
        self.best_move
    }

    /// Returns the score of the search
    pub fn score(&self) -> Score {
        self.score
    }

    /// Returns the static evaluation of the position
    pub fn static_eval(&self) -> Score {
        self.static_eval
    }

    /// Returns the remaining depth the position was searched to
    pub fn depth(&self) -> i8 {
        self.depth
    }

    /// Returns the kind of bound the score is
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Returns the age of the search that stored this entry
    pub fn age(&self) -> u8 {
        self.age
    }

    fn pack(&self) -> u64 {
        HashMove::bits(self.best_move) as u64
            | (i16::from(self.score) as u16 as u64) << 16
            | (i16::from(self.static_eval) as u16 as u64) << 32
            | (self.depth as u8 as u64) << 48
            | self.node_type.bits() << 56
            | ((self.age & 0x3f) as u64) << 58
    }

    fn unpack(data: u64) -> Option<CacheEntry> {
        Some(CacheEntry {
            best_move: HashMove::from_bits(data as u16),
            score: Score::from((data >> 16) as u16 as i16),
            static_eval: Score::from((data >> 32) as u16 as i16),
            depth: (data >> 48) as u8 as i8,
            node_type: NodeType::from_bits((data >> 56) & 0x3)?,
            age: ((data >> 58) & 0x3f) as u8,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The transposition table, shared by every search thread.
///
/// Each slot is two words, `tag ^ data` and `data`. A read whose words come from different writes
/// fails the tag check and is treated as a miss.
#[derive(Debug)]
pub struct Cache {
    slots: Vec<[AtomicU64; 2]>,
    consumed: AtomicUsize,
    megabytes: usize,
}

impl Cache {
    /// Creates a table using at most `megabytes` of memory
    pub fn new(megabytes: usize) -> Result<Cache> {
        if megabytes > MAX_CACHE_MB {
            return Err(Error::CacheTooLarge);
        } else if megabytes == 0 {
            return Err(Error::CacheTooSmall);
        }

        let count = megabytes * 1024 * 1024 / SLOT_BYTES;
        let count = if count.is_power_of_two() { count } else { count.next_power_of_two() / 2 };

        debug!("allocating {} cache slots ({} MB)", count, megabytes);
        Ok(Cache {
            slots: (0..count).map(|_| [AtomicU64::new(0), AtomicU64::new(0)]).collect(),
            consumed: AtomicUsize::new(0),
            megabytes,
        })
    }

    /// Returns the size of the table in megabytes, as requested when it was created
    pub fn megabytes(&self) -> usize {
        self.megabytes
    }

    /// Returns the number of slots in the table
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing has been stored since the table was created or cleared
    pub fn is_empty(&self) -> bool {
        self.consumed.load(Ordering::Relaxed) == 0
    }

    fn index_and_tag(&self, hash: Zobrist) -> (usize, u64) {
        let hash = u64::from(hash);
        ((hash >> 32) as usize & (self.slots.len() - 1), hash & 0xffff_ffff)
    }

    /// Looks up the entry for `hash`, with mate scores adjusted to be relative to the root for a
    /// node at `height`
    pub fn get(&self, hash: Zobrist, height: usize) -> Option<CacheEntry> {
        let (index, tag) = self.index_and_tag(hash);
        let slot = &self.slots[index];

        let data = slot[1].load(Ordering::Relaxed);
        if data == 0 || slot[0].load(Ordering::Relaxed) ^ data != tag {
            return None;
        }

        let mut entry = CacheEntry::unpack(data)?;
        entry.score = from_cached(entry.score, height);
        Some(entry)
    }

    /// Stores the result of searching the position with the given `hash`, unless the slot holds
    /// something more valuable.
    ///
    /// Mate scores are given relative to the root and stored relative to the node at `height`.
    #[allow(clippy::too_many_arguments)]
    pub fn set(
        &self,
        hash: Zobrist,
        best_move: Option<HashMove>,
        score: Score,
        static_eval: Score,
        depth: i8,
        node_type: NodeType,
        age: u8,
        height: usize,
    ) {
        let (index, tag) = self.index_and_tag(hash);
        let slot = &self.slots[index];
        let age = age & 0x3f;

        let old_data = slot[1].load(Ordering::Relaxed);
        let old_tag = slot[0].load(Ordering::Relaxed) ^ old_data;

        match CacheEntry::unpack(old_data) {
            None => {
                self.consumed.fetch_add(1, Ordering::Relaxed);
            },
            Some(_) if old_tag == tag => { },
            Some(old) if age.wrapping_sub(old.age) & 0x3f >= OLD_AGE => { },
            Some(old) if old.depth > depth => return,
            Some(old) if old.node_type == NodeType::Exact && node_type != NodeType::Exact => return,
            Some(_) => { },
        }

        let entry = CacheEntry {
            best_move,
            score: to_cached(score, height),
            static_eval,
            depth,
            node_type,
            age,
        };
        let data = entry.pack();

        slot[0].store(tag ^ data, Ordering::Relaxed);
        slot[1].store(data, Ordering::Relaxed);
    }

    /// Removes every entry
    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot[0].store(0, Ordering::Relaxed);
            slot[1].store(0, Ordering::Relaxed);
        }
        self.consumed.store(0, Ordering::Relaxed);
    }

    /// Replaces the table with an empty one of `megabytes`
    pub fn resize(&mut self, megabytes: usize) -> Result<()> {
        *self = Cache::new(megabytes)?;
        Ok(())
    }

    /// Returns the fraction of slots in use, in thousandths
    pub fn consumed(&self) -> usize {
        self.consumed.load(Ordering::Relaxed).min(self.slots.len()) * 1000 / self.slots.len()
    }
}

fn is_mate_score(score: Score) -> bool {
    i16::from(score).abs() >= i16::from(Score::mates_in(MAX_HEIGHT))
}

fn to_cached(score: Score, height: usize) -> Score {
    if !is_mate_score(score) {
        score
    } else if score > Score::draw() {
        score + height as i16
    } else {
        score - height as i16
    }
}

fn from_cached(score: Score, height: usize) -> Score {
    if !is_mate_score(score) {
        score
    } else if score > Score::draw() {
        score - height as i16
    } else {
        score + height as i16
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod test {
    use super::*;
    use crate::chess::{Position, MoveKind};

    fn key(hash: u64) -> Zobrist {
        Zobrist::from(hash)
    }

    fn entry(cache: &Cache, hash: Zobrist) -> CacheEntry {
        cache.get(hash, 0).expect("entry should be present")
    }

    #[test]
    fn hash_move_size() {
        use std::mem::size_of;
        assert_eq!(size_of::<Option<HashMove>>(), 2);
    }

    #[test]
    fn hash_move_round_trip() {
        let mv = Move::new(Piece::Pawn, Square::B7, Square::A8, Some(Piece::Rook),
            MoveKind::Promotion(Piece::Knight));
        let hash_move = HashMove::from(mv);
        assert_eq!(hash_move.origin(), Square::B7);
        assert_eq!(hash_move.destination(), Square::A8);
        assert_eq!(hash_move.promotion(), Some(Piece::Knight));
        assert!(hash_move.matches(mv));
        assert!(hash_move.matches(mv.with_check()));
    }

    #[test]
    fn sizes() {
        assert_eq!(Cache::new(0).unwrap_err(), Error::CacheTooSmall);
        assert_eq!(Cache::new(MAX_CACHE_MB + 1).unwrap_err(), Error::CacheTooLarge);
        assert_eq!(Cache::new(1).unwrap().len(), 1 << 16);
        assert_eq!(Cache::new(3).unwrap().len(), 1 << 17);
    }

    #[test]
    fn round_trip_and_miss() {
        let cache = Cache::new(1).unwrap();
        let pos = Position::new();
        let mv = pos.parse_move("g1f3").unwrap();

        assert!(cache.get(pos.hash(), 0).is_none());
        cache.set(pos.hash(), Some(mv.into()), Score::from(31), Score::from(12), 7,
            NodeType::Exact, 1, 0);

        let e = entry(&cache, pos.hash());
        assert!(e.best_move().expect("hash move").matches(mv));
        assert_eq!(e.score(), Score::from(31));
        assert_eq!(e.static_eval(), Score::from(12));
        assert_eq!(e.depth(), 7);
        assert_eq!(e.node_type(), NodeType::Exact);
        assert_eq!(e.age(), 1);

        // same slot, different tag
        assert!(cache.get(key(u64::from(pos.hash()) ^ 1), 0).is_none());
        // different slot
        assert!(cache.get(key(u64::from(pos.hash()) ^ (1 << 32)), 0).is_none());
    }

    #[test]
    fn negative_values_survive_packing() {
        let cache = Cache::new(1).unwrap();
        let hash = key(0x1234_5678_9abc_def0);
        cache.set(hash, None, Score::from(-2500), Score::from(-7), -1, NodeType::UpperBound, 63, 0);

        let e = entry(&cache, hash);
        assert_eq!(e.best_move(), None);
        assert_eq!(e.score(), Score::from(-2500));
        assert_eq!(e.static_eval(), Score::from(-7));
        assert_eq!(e.depth(), -1);
        assert_eq!(e.node_type(), NodeType::UpperBound);
        assert_eq!(e.age(), 63);
    }

    #[test]
    fn replacement() {
        let cache = Cache::new(1).unwrap();
        let first = key(0x0000_0001_0000_0001);
        // same index, different tag
        let other = key(0x0000_0001_0000_0002);
        let (index, _) = cache.index_and_tag(first);
        assert_eq!(cache.index_and_tag(other).0, index);

        // 1. empty slot
        cache.set(first, None, Score::from(10), Score::from(0), 5, NodeType::Exact, 0, 0);
        assert_eq!(entry(&cache, first).score(), Score::from(10));

        // 2. same tag overwrites, even with less depth
        cache.set(first, None, Score::from(20), Score::from(0), 1, NodeType::UpperBound, 0, 0);
        assert_eq!(entry(&cache, first).score(), Score::from(20));
        assert_eq!(entry(&cache, first).depth(), 1);

        // 4. deeper entries are kept
        cache.set(first, None, Score::from(30), Score::from(0), 6, NodeType::Exact, 0, 0);
        cache.set(other, None, Score::from(40), Score::from(0), 5, NodeType::Exact, 0, 0);
        assert!(cache.get(other, 0).is_none());
        assert_eq!(entry(&cache, first).score(), Score::from(30));

        // 5. exact entries are kept over bounds of the same depth
        cache.set(other, None, Score::from(40), Score::from(0), 6, NodeType::LowerBound, 0, 0);
        assert!(cache.get(other, 0).is_none());

        // 6. otherwise the new entry wins
        cache.set(other, None, Score::from(50), Score::from(0), 6, NodeType::Exact, 0, 0);
        assert_eq!(entry(&cache, other).score(), Score::from(50));
        assert!(cache.get(first, 0).is_none());

        // 3. stale entries are replaced whatever their depth
        cache.set(first, None, Score::from(60), Score::from(0), 1, NodeType::UpperBound, 5, 0);
        assert_eq!(entry(&cache, first).score(), Score::from(60));

        assert_eq!(cache.consumed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn mate_scores_are_relative_to_the_node() {
        let cache = Cache::new(1).unwrap();
        let hash = key(42);

        // mate found 7 plies from the root, stored at a node 3 plies deep
        cache.set(hash, None, Score::mates_in(7), Score::draw(), 4, NodeType::Exact, 0, 3);
        // reached again 5 plies deep, the same mate is 9 plies from the root
        assert_eq!(cache.get(hash, 5).unwrap().score(), Score::mates_in(9));

        cache.set(hash, None, Score::mated_in(7), Score::draw(), 4, NodeType::Exact, 0, 3);
        assert_eq!(cache.get(hash, 1).unwrap().score(), Score::mated_in(5));
    }

    #[test]
    fn consumed_and_clear() {
        let mut cache = Cache::new(1).unwrap();
        assert_eq!(cache.consumed(), 0);

        for i in 0..(cache.len() / 4) as u64 {
            cache.set(key(i << 32), None, Score::draw(), Score::draw(), 1, NodeType::Exact, 0, 0);
        }
        assert_eq!(cache.consumed(), 250);

        cache.clear();
        assert_eq!(cache.consumed(), 0);
        assert!(cache.is_empty());

        cache.resize(2).unwrap();
        assert_eq!(cache.len(), 1 << 17);
        assert_eq!(cache.megabytes(), 2);
    }
}
