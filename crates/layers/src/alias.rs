//! Mapping between boundary-document names (scheme A) and rainfall-dataset
//! names (scheme B).

use std::collections::HashMap;

use serde_json::Value;

use crate::names::normalize;

/// Built-in spellings for Indian states vs. meteorological subdivisions.
const INDIA_SUBDIVISIONS: &[(&str, &str)] = &[
    ("andaman & nicobar island", "andaman & nicobar islands"),
    ("andaman and nicobar islands", "andaman & nicobar islands"),
    ("assam", "assam & meghalaya"),
    ("meghalaya", "assam & meghalaya"),
    ("nagaland", "naga mani mizo tripura"),
    ("manipur", "naga mani mizo tripura"),
    ("mizoram", "naga mani mizo tripura"),
    ("tripura", "naga mani mizo tripura"),
    ("sikkim", "sub himalayan west bengal & sikkim"),
    ("west bengal", "gangetic west bengal"),
    ("odisha", "orissa"),
    ("uttar pradesh", "east uttar pradesh"),
    ("uttaranchal", "uttarakhand"),
    ("haryana", "haryana delhi & chandigarh"),
    ("nct of delhi", "haryana delhi & chandigarh"),
    ("delhi", "haryana delhi & chandigarh"),
    ("chandigarh", "haryana delhi & chandigarh"),
    ("rajasthan", "west rajasthan"),
    ("madhya pradesh", "west madhya pradesh"),
    ("gujarat", "gujarat region"),
    ("goa", "konkan & goa"),
    ("maharashtra", "madhya maharashtra"),
    ("andhra pradesh", "coastal andhra pradesh"),
    ("karnataka", "south interior karnataka"),
    ("jammu and kashmir", "jammu & kashmir"),
    ("jammu & kashmir", "jammu & kashmir"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum AliasError {
    InvalidJson(String),
    NotAnObject,
    NonStringTarget(String),
}

impl std::fmt::Display for AliasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AliasError::InvalidJson(e) => write!(f, "alias table JSON error: {e}"),
            AliasError::NotAnObject => write!(f, "alias table must be a JSON object"),
            AliasError::NonStringTarget(k) => write!(f, "alias for {k:?} must be a string"),
        }
    }
}

impl std::error::Error for AliasError {}

/// Forward table A → B with a reverse index derived on insertion.
///
/// When several A keys map to one B key, `reverse` returns the last one
/// registered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasTable {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn india_subdivisions() -> Self {
        let mut table = Self::new();
        for (a, b) in INDIA_SUBDIVISIONS {
            table.insert(a, b);
        }
        table
    }

    /// Loads `{ "<scheme A name>": "<scheme B name>", ... }`.
    pub fn from_json_str(payload: &str) -> Result<Self, AliasError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| AliasError::InvalidJson(e.to_string()))?;
        let obj = value.as_object().ok_or(AliasError::NotAnObject)?;
        let mut table = Self::new();
        for (a, b) in obj {
            let b = b
                .as_str()
                .ok_or_else(|| AliasError::NonStringTarget(a.clone()))?;
            table.insert(a, b);
        }
        Ok(table)
    }

    /// Registers `a → b`. Both names are normalized.
    pub fn insert(&mut self, a: &str, b: &str) {
        let a = normalize(a);
        let b = normalize(b);
        if a.is_empty() || b.is_empty() {
            return;
        }
        self.reverse.insert(b.clone(), a.clone());
        self.forward.insert(a, b);
    }

    /// Scheme-B key for a scheme-A key, or the input unchanged.
    pub fn forward<'a>(&'a self, key: &'a str) -> &'a str {
        self.forward.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Scheme-A key for a scheme-B key, or the input unchanged.
    pub fn reverse<'a>(&'a self, key: &'a str) -> &'a str {
        self.reverse.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }
}
