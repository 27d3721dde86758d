//! Cookie jar for deep-link bootstrap values.
//!
//! A [`CookieJar`] is parsed from a `Cookie` header (`"a=1; b=2"`) and keeps
//! pairs in insertion order. Setting an existing name replaces its value in
//! place.

use std::fmt;
use std::str::FromStr;

use tracing::trace;

/// Ordered `name=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    pairs: Vec<(String, String)>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `Cookie` header. Segments without `=` and empty names are
    /// skipped; a repeated name keeps its first value.
    pub fn parse(header: &str) -> Self {
        let mut jar = Self::new();
        for segment in header.split(';') {
            let Some((name, value)) = segment.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() || jar.get(name).is_some() {
                continue;
            }
            jar.pairs.push((name.to_owned(), value.trim().to_owned()));
        }
        jar
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        trace!(%name, "cookie set");
        match self.pairs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((name, value)),
        }
    }

    /// Remove `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.pairs.iter().position(|(n, _)| n == name)?;
        Some(self.pairs.remove(pos).1)
    }

    /// Read a value once: get it and remove it.
    pub fn pop(&mut self, name: &str) -> Option<String> {
        self.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromStr for CookieJar {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Formats back into header form.
impl fmt::Display for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_skips_garbage() {
        let jar = CookieJar::parse(" roomId = 42 ;junk; =x; roomName=General; roomId=7");
        assert_eq!(jar.get("roomId"), Some("42"));
        assert_eq!(jar.get("roomName"), Some("General"));
        assert_eq!(jar.len(), 2);
        assert_eq!(jar.get("junk"), None);
    }

    #[test]
    fn empty_value_is_present() {
        let jar = CookieJar::parse("username=");
        assert_eq!(jar.get("username"), Some(""));
        assert!(CookieJar::parse("").is_empty());
    }

    #[test]
    fn set_replaces_in_place() {
        let mut jar: CookieJar = "a=1; b=2".parse().unwrap();
        jar.set("a", "3");
        jar.set("c", "4");
        assert_eq!(jar.to_string(), "a=3; b=2; c=4");
    }

    #[test]
    fn pop_reads_once() {
        let mut jar = CookieJar::parse("roomId=42; roomName=General");
        assert_eq!(jar.pop("roomId").as_deref(), Some("42"));
        assert_eq!(jar.pop("roomId"), None);
        assert!(!jar.contains("roomId"));
        assert_eq!(jar.remove("roomName").as_deref(), Some("General"));
        assert!(jar.is_empty());
    }
}
