//! Tests the search (engine module)
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use kestrel::chess::Position;
use kestrel::engine::{Cache, NoReport, Report, Score, Search};

fn position(fen: &str) -> Position {
    fen.parse().unwrap()
}

#[test]
fn start_position_depth_4() {
    let cache = Cache::new(4).unwrap();
    let pos = Position::new();
    let mut reports = Vec::new();

    let report = Search::new(pos.clone(), &cache)
        .with_max_depth(4)
        .run(&mut |report: &Report| reports.push(report.clone()));

    let best = report.best_move.unwrap();
    assert!(pos.legal_moves().contains(&best));
    assert_eq!(report.pv[0], best);
    assert_eq!(report.depth, 4);
    assert!(!report.score.is_mate());

    // one report per depth and a final one
    assert_eq!(reports.len(), 5);
    assert!(reports.windows(2).all(|w| w[0].nodes <= w[1].nodes));
    assert!(!cache.is_empty());
}

#[test]
fn mate_in_one() {
    let cache = Cache::new(1).unwrap();
    let mut pos = position("k7/8/1K6/8/8/8/8/7Q w - - 0 1");

    let report = Search::new(pos.clone(), &cache).with_max_depth(4).run(&mut NoReport);
    assert_eq!(report.score, Score::mates_in(1));
    assert_eq!(report.score.to_string(), "mate 1");

    let mv = report.best_move.unwrap();
    pos.make_move(mv);
    assert!(pos.in_check());
    assert!(pos.legal_moves().is_empty());
}

#[test]
fn getting_mated() {
    let cache = Cache::new(1).unwrap();
    // the only move is Kg8, and Ra8 mates
    let pos = position("7k/8/6K1/8/8/8/8/R7 b - - 0 1");

    let report = Search::new(pos, &cache).with_max_depth(3).run(&mut NoReport);
    assert_eq!(report.score, Score::mated_in(2));
    assert_eq!(report.score.mate_moves(), Some(-1));
}

#[test]
fn terminal_positions() {
    let cache = Cache::new(1).unwrap();

    let report = Search::new(position("k7/1Q6/1K6/8/8/8/8/8 b - - 0 1"), &cache).run(&mut NoReport);
    assert_eq!(report.best_move, None);
    assert_eq!(report.score, Score::mated_in(0));

    let report = Search::new(position("k7/8/1Q6/8/8/8/8/7K b - - 0 1"), &cache).run(&mut NoReport);
    assert_eq!(report.best_move, None);
    assert_eq!(report.score, Score::draw());
}

#[test]
fn wins_a_hanging_queen() {
    let cache = Cache::new(1).unwrap();
    let pos = position("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1");

    let report = Search::new(pos, &cache).with_max_depth(3).run(&mut NoReport);
    assert_eq!(report.best_move.unwrap().to_string(), "d1d5");
    assert!(i16::from(report.score) > 300);
}

#[test]
fn stopped_search_leaves_the_position_unchanged() {
    let cache = Cache::new(1).unwrap();
    let pos = position("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    let mut search = Search::new(pos.clone(), &cache);
    let stop = search.stop_flag();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        stop.store(true, Ordering::Relaxed);
    });
    let report = search.run(&mut NoReport);
    stopper.join().unwrap();

    assert!(pos.legal_moves().contains(&report.best_move.unwrap()));
    assert_eq!(search.position(), &pos);
}

#[test]
fn time_manager_stops_the_search() {
    let cache = Cache::new(1).unwrap();
    let pos = Position::new();
    let stop_now = |_pondering: bool, _check_extended: bool| true;

    let report = Search::new(pos.clone(), &cache)
        .with_time_manager(&stop_now)
        .run(&mut NoReport);

    assert!(report.depth < 3);
    assert!(pos.legal_moves().contains(&report.best_move.unwrap()));
}

#[test]
fn workers_share_a_cache() {
    let cache = Arc::new(Cache::new(2).unwrap());
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    let workers: Vec<_> = (0..2).map(|_| {
        let cache = cache.clone();
        thread::spawn(move || {
            let pos = position(fen);
            let report = Search::new(pos.clone(), &cache).with_max_depth(4).run(&mut NoReport);
            assert!(pos.legal_moves().contains(&report.best_move.unwrap()));
        })
    }).collect();

    for worker in workers {
        worker.join().unwrap();
    }
    assert!(cache.consumed() > 0);
}
