//! Disallowed-server blacklist.

use std::fs;
use std::path::Path;

use regex::RegexSet;

/// A set of hostname patterns a server must not match to be proxied.
#[derive(Debug, Clone)]
pub struct Blacklist {
    patterns: RegexSet,
}

impl Blacklist {
    /// An empty blacklist: every server is allowed.
    pub fn empty() -> Self {
        Blacklist {
            patterns: RegexSet::empty(),
        }
    }

    /// Builds a blacklist from an iterator of regex patterns.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Blacklist {
            patterns: RegexSet::new(patterns)?,
        })
    }

    /// Loads a blacklist file: UTF-8 text, one anchored regex per line,
    /// `#` comments and blank lines ignored.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let patterns: Vec<&str> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        Self::from_patterns(patterns)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// True iff `host` matches none of the configured patterns.
    pub fn server_is_allowed(&self, host: &str) -> bool {
        !self.patterns.is_match(host)
    }
}
