//! Node identifiers.
//!
//! An identifier is a letter family followed by a number, such as `a0` or `ab12`. Top-level
//! entries each start a new family (`a0`, `b0`, `c0`, ...), and an entry derived from exactly one
//! other entry continues that entry's family (`a0` -> `a1` -> `a2`).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// The identifier of a node in the history tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates an identifier from its string form, without checking its shape.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the leading run of letters of the identifier.
    pub fn family(&self) -> &str {
        let end = self.0
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Returns true if `name` has the shape of a node identifier: one or more ASCII letters followed
/// by one or more ASCII digits.
pub fn is_id_shaped(name: &str) -> bool {
    let letters = name.bytes().take_while(u8::is_ascii_alphabetic).count();
    let digits = &name.as_bytes()[letters..];
    letters > 0 && !digits.is_empty() && digits.iter().all(u8::is_ascii_digit)
}

/// Converts a number into a series of lowercase letters, using bijective base-26 numbering.
///
/// ```
/// use calc_history::id::letter_series;
///
/// assert_eq!(letter_series(0), "a");
/// assert_eq!(letter_series(25), "z");
/// assert_eq!(letter_series(26), "aa");
/// assert_eq!(letter_series(702), "aaa");
/// ```
pub fn letter_series(mut n: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'a' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.reverse();
    letters.into_iter().map(char::from).collect()
}

/// Generates unique node identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdGenerator {
    /// The index of the next fresh letter family.
    letter: usize,

    /// The next number of each family that has been used.
    numbers: BTreeMap<String, u32>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a generator from its saved counters.
    pub fn restore(letter: usize, numbers: BTreeMap<String, u32>) -> Self {
        Self { letter, numbers }
    }

    /// Returns the counters of the generator, for saving.
    pub fn parts(&self) -> (usize, &BTreeMap<String, u32>) {
        (self.letter, &self.numbers)
    }

    /// Advances the counter of the identifier's family past the identifier, so that it is never
    /// generated again.
    pub fn reserve(&mut self, id: &NodeId) {
        let family = id.family();
        let Ok(number) = id.as_str()[family.len()..].parse::<u32>() else {
            return;
        };
        let next = self.numbers.entry(family.to_string()).or_insert(0);
        *next = (*next).max(number.saturating_add(1));
    }

    /// Generates the next identifier.
    ///
    /// With a family, the identifier continues that family and the fresh family counter is left
    /// alone. Without one, the next fresh family is used.
    pub fn next(&mut self, family: Option<&str>) -> NodeId {
        let family = match family {
            Some(family) => family.to_string(),
            None => loop {
                let candidate = letter_series(self.letter);
                self.letter += 1;

                // a family may already be in use if the counters were restored out of step
                if !self.numbers.contains_key(&candidate) {
                    break candidate;
                }
            },
        };

        let number = self.numbers.entry(family.clone()).or_insert(0);
        let id = NodeId(format!("{}{}", family, number));
        *number += 1;
        id
    }
}
