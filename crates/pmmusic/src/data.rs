//! Names and insertion-ordered name maps

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    /// `[_a-zA-Z][_a-zA-Z0-9]*`
    pub fn is_valid_name(s: &str) -> bool {
        let mut iter = s.bytes();

        // first character
        match iter.next() {
            // Empty name
            None => return false,
            Some(b) => match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'_' => {}
                _ => return false,
            },
        };

        iter.all(|b| matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_'))
    }

    pub fn try_new(s: String) -> Option<Self> {
        if Self::is_valid_name(&s) {
            Some(Self(s))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name of the pattern that ends (or loops) a BGM
    pub fn end_of_bgm_name(&self) -> Name {
        Self(format!("{}_ENDBGM", self.0))
    }
}

impl FromStr for Name {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(s.to_owned()).ok_or(())
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A map of unique names that remembers insertion order.
///
/// Replacing an existing item keeps its original position.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedList<T> {
    list: Vec<(Name, T)>,
    map: HashMap<Name, usize>,
}

impl<T> Default for NamedList<T> {
    fn default() -> Self {
        Self {
            list: Vec::new(),
            map: HashMap::new(),
        }
    }
}

impl<T> NamedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.map.get(name).map(|&i| &self.list[i].1)
    }

    pub fn get_with_name(&self, name: &str) -> Option<(&Name, &T)> {
        self.map.get(name).map(|&i| {
            let (n, item) = &self.list[i];
            (n, item)
        })
    }

    pub fn insert(&mut self, name: Name, item: T) {
        match self.map.get(&name) {
            Some(&i) => self.list[i].1 = item,
            None => {
                self.map.insert(name.clone(), self.list.len());
                self.list.push((name, item));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &T)> {
        self.list.iter().map(|(n, item)| (n, item))
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.list.iter().map(|(n, _)| n)
    }
}
