//! Custom response headers keyed by URL pattern.
//!
//! The header override document maps regular expressions to header sets:
//!
//! ```json
//! {
//!   "\\.js$": { "Cache-Control": "no-store" },
//!   "^/api": { "Access-Control-Allow-Origin": "*" }
//! }
//! ```
//!
//! Every pattern matching a URL contributes its headers, in document order, with
//! later entries winning on conflicting names.

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

/// Header name → value, in insertion order.
pub type HeaderSet = IndexMap<String, String>;

/// One compiled override rule.
#[derive(Debug, Clone)]
pub struct HeaderRule {
    pub pattern: Regex,
    pub headers: HeaderSet,
}

/// Ordered header override rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "IndexMap<String, HeaderSet>")]
pub struct HeaderTable {
    rules: Vec<HeaderRule>,
}

impl HeaderTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile rules from `(pattern, headers)` pairs, keeping their order.
    pub fn from_pairs<I, P>(pairs: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = (P, HeaderSet)>,
        P: AsRef<str>,
    {
        let rules = pairs
            .into_iter()
            .map(|(pattern, headers)| {
                Ok(HeaderRule {
                    pattern: Regex::new(pattern.as_ref())?,
                    headers,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[HeaderRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TryFrom<IndexMap<String, HeaderSet>> for HeaderTable {
    type Error = regex::Error;

    fn try_from(document: IndexMap<String, HeaderSet>) -> Result<Self, Self::Error> {
        Self::from_pairs(document)
    }
}

/// Merge every rule matching `url` onto `defaults`.
pub fn headers_for(url: &str, table: &HeaderTable, defaults: &HeaderSet) -> HeaderSet {
    let mut merged = defaults.clone();
    for rule in table.rules.iter().filter(|rule| rule.pattern.is_match(url)) {
        for (name, value) in &rule.headers {
            merged.insert(name.clone(), value.clone());
        }
    }
    merged
}
