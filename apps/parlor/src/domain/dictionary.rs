//! Word list used to validate Rush boards and answer `word` lookups.
//!
//! Loaded once at start-up and shared read-only.

use std::collections::HashSet;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use lazy_regex::regex_is_match;
use tracing::{info, warn};

#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read one word per line. Entries with digits, punctuation or spaces are
    /// skipped; everything else is stored upper-cased.
    pub fn from_reader(reader: impl BufRead) -> io::Result<Self> {
        let mut words = HashSet::new();
        for line in reader.lines() {
            let line = line?;
            let word = line.trim();
            if regex_is_match!(r"^\p{Alphabetic}+$", word) {
                words.insert(word.to_uppercase());
            }
        }
        Ok(Self { words })
    }

    /// Load from a word file. A missing or unreadable file yields an empty
    /// dictionary, in which every multi-letter Rush word is invalid.
    pub fn load(path: &Path) -> Self {
        let loaded = std::fs::File::open(path).and_then(|f| Self::from_reader(BufReader::new(f)));
        match loaded {
            Ok(dictionary) => {
                info!(path = %path.display(), words = dictionary.len(), "[DICTIONARY] loaded");
                dictionary
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "[DICTIONARY] unavailable; using empty word list");
                Self::empty()
            }
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Dictionary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter
                .into_iter()
                .map(|w| w.as_ref().to_uppercase())
                .collect(),
        }
    }
}
