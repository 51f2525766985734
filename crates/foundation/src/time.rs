/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Time(pub f64); // seconds

/// Calendar month of an observation. Discriminants are 0-based indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Month {
    Jan = 0,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Month for `index`, wrapping modulo twelve.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Upper-case column label as used in tabular headers ("JAN".."DEC").
    pub fn label(self) -> &'static str {
        match self {
            Month::Jan => "JAN",
            Month::Feb => "FEB",
            Month::Mar => "MAR",
            Month::Apr => "APR",
            Month::May => "MAY",
            Month::Jun => "JUN",
            Month::Jul => "JUL",
            Month::Aug => "AUG",
            Month::Sep => "SEP",
            Month::Oct => "OCT",
            Month::Nov => "NOV",
            Month::Dec => "DEC",
        }
    }

    /// Case-insensitive parse of a three-letter label.
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(s))
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::Month;

    #[test]
    fn next_wraps_after_december() {
        assert_eq!(Month::Nov.next(), Month::Dec);
        assert_eq!(Month::Dec.next(), Month::Jan);
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(Month::from_label("jan"), Some(Month::Jan));
        assert_eq!(Month::from_label(" Sep "), Some(Month::Sep));
        assert_eq!(Month::from_label("ANNUAL"), None);
    }

    #[test]
    fn from_index_wraps() {
        assert_eq!(Month::from_index(12), Month::Jan);
        assert_eq!(Month::from_index(25), Month::Feb);
    }
}
