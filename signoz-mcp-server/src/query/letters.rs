//! Sub-query identifiers

use std::fmt;

/// Round-robin `A`..=`Z` allocator
///
/// Wraps back to `A` after `Z`, so names repeat once more than 26
/// sub-queries share one allocator. Letters passed to
/// [`QueryLetters::skipping`] are never handed out.
#[derive(Debug, Clone)]
pub struct QueryLetters {
    next: u8,
    reserved: Vec<u8>,
}

impl QueryLetters {
    pub fn new() -> Self {
        Self {
            next: b'A',
            reserved: Vec::new(),
        }
    }

    /// Allocator that never yields any of `reserved`
    pub fn skipping(reserved: &[char]) -> Self {
        let mut reserved: Vec<u8> = reserved
            .iter()
            .filter(|c| c.is_ascii_uppercase())
            .map(|c| *c as u8)
            .collect();
        reserved.sort_unstable();
        reserved.dedup();
        if reserved.len() >= 26 {
            reserved.clear();
        }
        Self {
            next: b'A',
            reserved,
        }
    }

    fn advance(&mut self) -> u8 {
        let letter = self.next;
        self.next = if letter >= b'Z' { b'A' } else { letter + 1 };
        letter
    }

    pub fn next_letter(&mut self) -> char {
        loop {
            let letter = self.advance();
            if !self.reserved.contains(&letter) {
                return letter as char;
            }
        }
    }
}

impl Default for QueryLetters {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a sub-query's name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryId {
    /// Handed out by a [`QueryLetters`] allocator
    Allocated(char),
    /// Hard-wired by a template (`C`, `D`, `C/D`)
    Fixed(&'static str),
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocated(letter) => write!(f, "{letter}"),
            Self::Fixed(name) => f.write_str(name),
        }
    }
}
