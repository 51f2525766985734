use std::collections::BTreeMap;

/// Per-region miss counters.
///
/// Name and value misses are never fatal; they are counted here and logged in
/// aggregate. Sorted maps keep the display order stable.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    counters: BTreeMap<String, u64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.counters.clear();
    }

    pub fn count(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn add(&mut self, name: impl Into<String>, by: u64) {
        if by == 0 {
            return;
        }
        *self.counters.entry(name.into()).or_insert(0) += by;
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (k, v) in &self.counters {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Tally;

    #[test]
    fn counters_accumulate() {
        let mut t = Tally::new();
        t.add("missing_anchor", 1);
        t.add("missing_anchor", 2);
        assert_eq!(t.count("missing_anchor"), 3);
        assert_eq!(t.count("missing"), 0);
    }

    #[test]
    fn zero_adds_leave_no_entry() {
        let mut t = Tally::new();
        t.add("unnamed_feature", 0);
        assert!(t.is_empty());
    }

    #[test]
    fn display_is_sorted() {
        let mut t = Tally::new();
        t.add("b", 1);
        t.add("a", 4);
        assert_eq!(t.to_string(), "a=4, b=1");
    }
}
