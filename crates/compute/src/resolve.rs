use formats::rainfall::{RainfallRecord, RainfallTable};
use foundation::time::Month;

/// Picks the value shown for a (region, year, month) cursor.
///
/// Years outside a region's data clamp to its first or last record. Unknown
/// regions and missing month fields resolve to NaN.
pub struct ValueResolver;

impl ValueResolver {
    /// Exact year (the last one read, if repeated), else the latest year not
    /// after `year`, else the first record.
    pub fn record(records: &[RainfallRecord], year: i32) -> Option<&RainfallRecord> {
        if let Some(exact) = records.iter().rev().find(|r| r.year == Some(year)) {
            return Some(exact);
        }
        records
            .iter()
            .rev()
            .find(|r| matches!(r.year, Some(y) if y <= year))
            .or_else(|| records.first())
    }

    pub fn value(table: &RainfallTable, region: &str, year: i32, month: Month) -> f64 {
        Self::record(table.records(region), year)
            .and_then(|r| r.value(month))
            .unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::ValueResolver;
    use formats::rainfall::{RainfallSchema, RainfallTable};
    use foundation::time::Month;

    const HEADER: &str = "SUBDIVISION,YEAR,JAN,FEB,MAR,APR,MAY,JUN,JUL,AUG,SEP,OCT,NOV,DEC";

    fn table() -> RainfallTable {
        let payload = format!(
            "{HEADER}\n\
             KERALA,1985,85,0,0,0,0,0,0,0,0,0,0,0\n\
             KERALA,1980,80,0,0,0,0,0,0,0,0,0,0,0\n\
             KERALA,1990,90,0,0,0,0,0,0,0,0,0,0,NA\n\
             GOA,bad,7,0,0,0,0,0,0,0,0,0,0,0"
        );
        RainfallTable::from_str(&payload, &RainfallSchema::default()).expect("table")
    }

    #[test]
    fn exact_year_match() {
        assert_eq!(ValueResolver::value(&table(), "KERALA", 1985, Month::Jan), 85.0);
    }

    #[test]
    fn clamps_before_first_year() {
        assert_eq!(ValueResolver::value(&table(), "KERALA", 1975, Month::Jan), 80.0);
    }

    #[test]
    fn clamps_after_last_year() {
        assert_eq!(ValueResolver::value(&table(), "KERALA", 2025, Month::Jan), 90.0);
    }

    #[test]
    fn gap_year_uses_previous_record() {
        assert_eq!(ValueResolver::value(&table(), "KERALA", 1987, Month::Jan), 85.0);
    }

    #[test]
    fn unknown_region_is_nan() {
        assert!(ValueResolver::value(&table(), "TAMIL NADU", 2000, Month::Jan).is_nan());
        assert!(ValueResolver::record(&[], 2000).is_none());
    }

    #[test]
    fn missing_month_is_nan() {
        assert!(ValueResolver::value(&table(), "KERALA", 1990, Month::Dec).is_nan());
    }

    #[test]
    fn undated_rows_fall_back_to_first_record() {
        assert_eq!(ValueResolver::value(&table(), "GOA", 2000, Month::Jan), 7.0);
    }

    #[test]
    fn repeated_year_uses_the_last_row_read() {
        let payload = format!(
            "{HEADER}\n\
             KERALA,2000,1,0,0,0,0,0,0,0,0,0,0,0\n\
             KERALA,2000,2,0,0,0,0,0,0,0,0,0,0,0"
        );
        let t = RainfallTable::from_str(&payload, &RainfallSchema::default()).expect("table");
        assert_eq!(t.records("KERALA").len(), 2);
        assert_eq!(ValueResolver::value(&t, "KERALA", 2000, Month::Jan), 2.0);
    }
}
