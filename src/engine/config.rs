//! Engine settings read from a YAML file
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fs::read_to_string;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use log::info;
use serde::{Deserialize, Serialize};
use crate::engine::{Error, Result, MAX_DEPTH};
use crate::engine::hash::MAX_CACHE_MB;

/// Engine settings. Fields missing from the file keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Size of the transposition cache in megabytes
    pub hash_mb: usize,
    /// The deepest iteration to search
    pub max_depth: usize,
    /// Whether pawn structure scores are cached
    pub pawn_cache: bool,
    /// Log level used when logging is turned on without a level on the command line
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hash_mb: 16,
            max_depth: MAX_DEPTH,
            pawn_cache: true,
            log_level: None,
        }
    }
}

impl Config {
    /// Returns the location of the default configuration file, `~/.kestrel/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".kestrel").join("config.yaml"))
    }

    /// Parses and validates a configuration in YAML
    pub fn from_yaml(s: &str) -> Result<Config> {
        let config: Config = serde_yaml::from_str(s).map_err(|err| Error::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration at `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Config> {
        match read_to_string(path) {
            Ok(s) => {
                info!("reading configuration from {}", path.display());
                Config::from_yaml(&s)
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(Error::Config(format!("{}: {}", path.display(), err))),
        }
    }

    /// Reads the configuration from the default location
    pub fn load_default() -> Result<Config> {
        match Config::default_path() {
            Some(path) => Config::load(&path),
            None => Ok(Config::default()),
        }
    }

    /// Checks that every value is within range
    pub fn validate(&self) -> Result<()> {
        if self.hash_mb == 0 || self.hash_mb > MAX_CACHE_MB {
            return Err(Error::Config(format!("hash_mb must be from 1 to {}", MAX_CACHE_MB)));
        }
        if self.max_depth == 0 || self.max_depth > MAX_DEPTH {
            return Err(Error::Config(format!("max_depth must be from 1 to {}", MAX_DEPTH)));
        }
        if let Some(level) = &self.log_level {
            match level.as_str() {
                "off" | "error" | "warn" | "info" | "debug" | "trace" => { },
                _ => return Err(Error::Config(format!("{}: invalid log level", level))),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.hash_mb, 16);
        assert_eq!(config.max_depth, 64);
        assert!(config.pawn_cache);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn partial_yaml() {
        let config = Config::from_yaml("hash_mb: 64\nlog_level: debug\n").unwrap();
        assert_eq!(config.hash_mb, 64);
        assert_eq!(config.max_depth, MAX_DEPTH);
        assert_eq!(config.log_level.as_deref(), Some("debug"));

        let config = Config::from_yaml("pawn_cache: false").unwrap();
        assert!(!config.pawn_cache);
    }

    #[test]
    fn out_of_range() {
        assert!(matches!(Config::from_yaml("hash_mb: 0"), Err(Error::Config(_))));
        assert!(matches!(Config::from_yaml("hash_mb: 8001"), Err(Error::Config(_))));
        assert!(matches!(Config::from_yaml("max_depth: 65"), Err(Error::Config(_))));
        assert!(matches!(Config::from_yaml("log_level: loud"), Err(Error::Config(_))));
        assert!(matches!(Config::from_yaml("hash_mb: [1, 2]"), Err(Error::Config(_))));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = Path::new("this/file/does/not/exist.yaml");
        assert_eq!(Config::load(path), Ok(Config::default()));
    }
}
