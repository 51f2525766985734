//! Region-name canonicalization.

use serde_json::{Map, Value};

/// Canonical key for cross-dataset matching.
///
/// Lower-cases, keeps word characters, `&` and single spaces, and trims.
/// Whitespace of any kind separates words; other punctuation is dropped
/// without separating them. Total and idempotent; empty input gives `""`.
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c.is_alphanumeric() || c == '_' || c == '&' {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

/// Ordered property keys that may carry a region's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFields {
    candidates: Vec<String>,
}

impl Default for NameFields {
    fn default() -> Self {
        Self::new([
            "st_nm",
            "ST_NM",
            "NAME_1",
            "name",
            "NAME",
            "state",
            "STATE",
            "st_name",
            "SUBDIVISION",
        ])
    }
}

impl NameFields {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// First non-empty candidate value, in priority order.
    pub fn display_name(&self, properties: &Map<String, Value>) -> Option<String> {
        self.candidates.iter().find_map(|key| {
            let text = match properties.get(key)? {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            (!text.is_empty()).then_some(text)
        })
    }
}
