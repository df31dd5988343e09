//! The kestrel chess engine.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
#![warn(missing_docs, missing_debug_implementations, unused_extern_crates)]
#![warn(clippy::unimplemented, clippy::todo)]
#![warn(clippy::option_unwrap_used, clippy::result_unwrap_used)]

use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use clap::{App, Arg, ArgMatches, SubCommand, crate_version};
use log::info;
use simplelog::{WriteLogger, LevelFilter};
use kestrel::chess::{self, variations, Position};
use kestrel::chess::position::START_FEN;
use kestrel::engine::{self, Cache, Config, Infinite, MoveTime, Report, Search, TimeManager};

fn main() -> Result<(), Error> {
    let fen_arg = Arg::with_name("fen")
        .value_name("FEN_STRING")
        .default_value(START_FEN)
        .hide_default_value(true)
        .help("Position in Forsyth-Edwards Notation (FEN)");

    let matches =
        App::new("Kestrel")
            .version(crate_version!())
            .author("Mike Leany")
            .arg(Arg::with_name("log")
                .long("log")
                .short("l")
                .global(true)
                .help("Turns on logging"))
            .arg(Arg::with_name("log-file")
                .long("log-file")
                .global(true)
                .value_name("LOG_FILE")
                .takes_value(true)
                .default_value("kestrel.log")
                .help("Sets the log file if logging is turned on"))
            .arg(Arg::with_name("log-level")
                .long("log-level")
                .global(true)
                .value_name("LEVEL")
                .takes_value(true)
                .help("Sets the log level if logging is turned on [default: info]"))
            .arg(Arg::with_name("config")
                .long("config")
                .short("c")
                .global(true)
                .value_name("PATH")
                .takes_value(true)
                .help("Reads settings from PATH instead of ~/.kestrel/config.yaml"))
            .subcommand(SubCommand::with_name("counts")
                .about("Counts the number of variations from a given starting position \
                        to a specified\ndepth. Defaults to the standard starting position.")
                .arg(Arg::with_name("depth")
                    .long("depth")
                    .short("d")
                    .value_name("DEPTH")
                    .takes_value(true)
                    .required(true)
                    .help("Depth to search the position"))
                .arg(fen_arg.clone().multiple(true)))
            .subcommand(SubCommand::with_name("search")
                .about("Searches a position and prints the best move. Defaults to the \
                        standard starting position.")
                .arg(Arg::with_name("depth")
                    .long("depth")
                    .short("d")
                    .value_name("DEPTH")
                    .takes_value(true)
                    .help("Stops after completing DEPTH"))
                .arg(Arg::with_name("movetime")
                    .long("movetime")
                    .short("t")
                    .value_name("MILLISECONDS")
                    .takes_value(true)
                    .help("Stops after the given number of milliseconds"))
                .arg(Arg::with_name("hash")
                    .long("hash")
                    .value_name("MB")
                    .takes_value(true)
                    .help("Size of the transposition cache in megabytes"))
                .arg(Arg::with_name("ponder")
                    .long("ponder")
                    .help("Searches as if pondering, so the move time is ignored"))
                .arg(fen_arg.clone()))
            .subcommand(SubCommand::with_name("eval")
                .about("Prints the static evaluation of one or more positions")
                .arg(fen_arg.multiple(true)))
            .get_matches();

    let config = match matches.value_of_os("config") {
        Some(path) => Config::load(&PathBuf::from(path))?,
        None => Config::load_default()?,
    };

    let log_file = PathBuf::from(matches.value_of_os("log-file").expect("INFALLIBLE"));
    let log_level = matches.value_of("log-level")
        .or_else(|| config.log_level.as_deref())
        .unwrap_or("info");
    let log_level = match log_level {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        level => return Err(Error(format!("{}: invalid log level", level))),
    };

    let _logger = if matches.is_present("log") {
        WriteLogger::init(
            log_level,
            simplelog::Config::default(),
            File::create(&log_file).map_err(|err| {
                Error(format!("{}: {}", log_file.display(), err))
            })?)
    } else {
        WriteLogger::init(LevelFilter::Off, simplelog::Config::default(), std::io::sink())
    };
    info!("{:?}", config);

    match matches.subcommand() {
        ("counts", Some(matches)) => {
            let depth = parse_number(matches, "depth")?.expect("INFALLIBLE");

            println!();
            for fen in matches.values_of("fen").expect("INFALLIBLE") {
                let pos = parse_position(fen)?;
                println!("{}", fen);
                let count = variations::print(&pos, depth);
                println!("Depth {} total:\t{:12}\n", depth, count);
            }
        },
        ("search", Some(matches)) => search(matches, config)?,
        ("eval", Some(matches)) => {
            for fen in matches.values_of("fen").expect("INFALLIBLE") {
                let pos = parse_position(fen)?;
                println!("{}\t{}", engine::evaluate(&pos, None), fen);
            }
        },
        _ => {
            println!("{}", matches.usage());
        },
    }

    Ok(())
}

fn search(matches: &ArgMatches, mut config: Config) -> Result<(), Error> {
    if let Some(depth) = parse_number(matches, "depth")? {
        config.max_depth = depth;
    }
    if let Some(hash_mb) = parse_number(matches, "hash")? {
        config.hash_mb = hash_mb;
    }
    config.validate()?;

    let pos = parse_position(matches.value_of("fen").expect("INFALLIBLE"))?;
    let cache = Cache::new(config.hash_mb)?;
    let time: Box<dyn TimeManager> = match parse_number(matches, "movetime")? {
        Some(ms) => Box::new(MoveTime::new(Duration::from_millis(ms as u64))),
        None => Box::new(Infinite),
    };

    let mut search = Search::new(pos, &cache)
        .with_max_depth(config.max_depth)
        .with_pawn_cache(config.pawn_cache)
        .with_time_manager(time.as_ref())
        .pondering(matches.is_present("ponder"));

    let mut completed = 0;
    let report = search.run(&mut |report: &Report| {
        if report.depth > completed {
            completed = report.depth;
            println!("{}", report);
        }
    });

    match report.best_move {
        Some(mv) => println!("bestmove {}", mv),
        None => println!("no legal moves ({})", report.score),
    }

    Ok(())
}

fn parse_position(fen: &str) -> Result<Position, Error> {
    fen.parse().map_err(|err: chess::Error| {
        let what = if err.is_invalid_setup() { "impossible position" } else { "invalid FEN" };
        Error(format!("{}: {}: {}", fen, what, err))
    })
}

fn parse_number(matches: &ArgMatches, name: &str) -> Result<Option<usize>, Error> {
    match matches.value_of(name) {
        Some(val) => val.parse()
            .map(Some)
            .map_err(|_| Error(format!("{} must be numeric", name))),
        None => Ok(None),
    }
}

struct Error(String);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Error { }

impl From<engine::Error> for Error {
    fn from(err: engine::Error) -> Self {
        Error(err.to_string())
    }
}
