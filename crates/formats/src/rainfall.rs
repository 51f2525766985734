//! Monthly rainfall table ingestion.
//!
//! The input is a plain delimited file: one header row, then one row per
//! (region, year) with twelve month columns. Quoting is not supported. Rows
//! whose field count differs from the header, or whose kept columns are not
//! valid UTF-8, are dropped and counted.

use std::collections::{BTreeSet, HashMap};
use std::io::Read;

use foundation::time::Month;
use tracing::{debug, info};

/// Column naming for a rainfall file.
#[derive(Debug, Clone, PartialEq)]
pub struct RainfallSchema {
    pub delimiter: u8,
    /// Region column candidates, tried in order (exact match).
    pub region_fields: Vec<String>,
    /// Year column name (case-insensitive).
    pub year_field: String,
}

impl Default for RainfallSchema {
    fn default() -> Self {
        Self {
            delimiter: b',',
            region_fields: ["SUBDIVISION", "subdivision", "STATE", "state", "REGION", "region"]
                .into_iter()
                .map(String::from)
                .collect(),
            year_field: "YEAR".to_string(),
        }
    }
}

/// One region-year row.
#[derive(Debug, Clone, PartialEq)]
pub struct RainfallRecord {
    pub region: String,
    /// Year field as written in the file.
    pub year_raw: String,
    /// `None` when the year field is not a whole number.
    pub year: Option<i32>,
    /// `None` for fields that do not parse as finite numbers.
    pub months: [Option<f64>; 12],
}

impl RainfallRecord {
    pub fn value(&self, month: Month) -> Option<f64> {
        self.months[month.index()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RainfallError {
    MissingColumn(String),
    Csv(String),
}

impl std::fmt::Display for RainfallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RainfallError::MissingColumn(name) => write!(f, "header has no {name} column"),
            RainfallError::Csv(e) => write!(f, "delimited text error: {e}"),
        }
    }
}

impl std::error::Error for RainfallError {}

impl From<csv::Error> for RainfallError {
    fn from(e: csv::Error) -> Self {
        RainfallError::Csv(e.to_string())
    }
}

/// Records grouped by literal region name, each group ordered by year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RainfallTable {
    by_region: HashMap<String, Vec<RainfallRecord>>,
    regions: Vec<String>,
    years: Vec<i32>,
    discarded_rows: usize,
}

struct ColumnMap {
    region: usize,
    year: usize,
    months: [usize; 12],
}

impl ColumnMap {
    fn from_headers(
        headers: &csv::StringRecord,
        schema: &RainfallSchema,
    ) -> Result<Self, RainfallError> {
        let names: Vec<&str> = headers.iter().map(str::trim).collect();

        let region = schema
            .region_fields
            .iter()
            .find_map(|cand| names.iter().position(|h| *h == cand.as_str()))
            .ok_or_else(|| RainfallError::MissingColumn(schema.region_fields.join("/")))?;
        let year = names
            .iter()
            .position(|h| h.eq_ignore_ascii_case(&schema.year_field))
            .ok_or_else(|| RainfallError::MissingColumn(schema.year_field.clone()))?;

        let mut months = [0usize; 12];
        for month in Month::ALL {
            months[month.index()] = names
                .iter()
                .position(|h| h.eq_ignore_ascii_case(month.label()))
                .ok_or_else(|| RainfallError::MissingColumn(month.label().to_string()))?;
        }

        Ok(Self {
            region,
            year,
            months,
        })
    }

    /// `None` when any column the table keeps is not valid UTF-8.
    fn decode(&self, row: &csv::ByteRecord) -> Option<RainfallRecord> {
        let field = |i: usize| std::str::from_utf8(row.get(i)?).ok();
        let region = field(self.region)?.to_string();
        let year_raw = field(self.year)?.to_string();
        let mut months = [None; 12];
        for month in Month::ALL {
            months[month.index()] = parse_value(field(self.months[month.index()])?);
        }
        Some(RainfallRecord {
            region,
            year: parse_year(&year_raw),
            year_raw,
            months,
        })
    }
}

impl RainfallTable {
    pub fn from_str(payload: &str, schema: &RainfallSchema) -> Result<Self, RainfallError> {
        Self::from_reader(payload.as_bytes(), schema)
    }

    pub fn from_reader<R: Read>(reader: R, schema: &RainfallSchema) -> Result<Self, RainfallError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(schema.delimiter)
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns = ColumnMap::from_headers(&headers, schema)?;

        let mut by_region: HashMap<String, Vec<RainfallRecord>> = HashMap::new();
        let mut discarded_rows = 0usize;
        let mut kept_rows = 0usize;
        for (index, row) in rdr.byte_records().enumerate() {
            let row = row?;
            if row.len() != headers.len() {
                discarded_rows += 1;
                continue;
            }
            let Some(record) = columns.decode(&row) else {
                debug!(row = index + 1, "discarding row with undecodable text");
                discarded_rows += 1;
                continue;
            };
            by_region
                .entry(record.region.clone())
                .or_default()
                .push(record);
            kept_rows += 1;
        }

        let mut years = BTreeSet::new();
        for records in by_region.values_mut() {
            sort_by_year_in_place(records);
            years.extend(records.iter().filter_map(|r| r.year));
        }
        let mut regions: Vec<String> = by_region.keys().cloned().collect();
        regions.sort();

        let table = Self {
            by_region,
            regions,
            years: years.into_iter().collect(),
            discarded_rows,
        };
        info!(
            rows = kept_rows,
            discarded = discarded_rows,
            regions = table.regions.len(),
            first_year = table.years.first().copied(),
            last_year = table.years.last().copied(),
            "rainfall table ingested"
        );
        Ok(table)
    }

    /// Records for `region` (exact, literal name), ordered by year.
    pub fn records(&self, region: &str) -> &[RainfallRecord] {
        self.by_region
            .get(region)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Distinct region names, lexicographic.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Distinct valid years across all regions, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn discarded_rows(&self) -> usize {
        self.discarded_rows
    }

    pub fn is_empty(&self) -> bool {
        self.by_region.is_empty()
    }
}

/// Stable sort of the rows that carry a numeric year. Rows with an
/// unparsable year stay in the slot they were read into.
fn sort_by_year_in_place(records: &mut [RainfallRecord]) {
    let slots: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.year.is_some())
        .map(|(i, _)| i)
        .collect();
    if slots.len() < 2 {
        return;
    }
    let mut dated: Vec<RainfallRecord> = slots.iter().map(|&i| records[i].clone()).collect();
    dated.sort_by_key(|r| r.year);
    for (slot, record) in slots.into_iter().zip(dated) {
        records[slot] = record;
    }
    debug!(rows = records.len(), "sorted region rows by year");
}

fn parse_year(raw: &str) -> Option<i32> {
    let v: f64 = raw.trim().parse().ok()?;
    if !v.is_finite() || v.fract() != 0.0 || v.abs() > i32::MAX as f64 {
        return None;
    }
    Some(v as i32)
}

fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::{RainfallError, RainfallSchema, RainfallTable};
    use foundation::time::Month;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "SUBDIVISION,YEAR,JAN,FEB,MAR,APR,MAY,JUN,JUL,AUG,SEP,OCT,NOV,DEC,ANNUAL";

    fn table(rows: &[&str]) -> RainfallTable {
        let mut payload = String::from(HEADER);
        for row in rows {
            payload.push('\n');
            payload.push_str(row);
        }
        RainfallTable::from_str(&payload, &RainfallSchema::default()).expect("parse table")
    }

    #[test]
    fn groups_sorts_and_indexes() {
        let t = table(&[
            "KERALA,2002,3,4,5,6,7,8,9,10,11,12,13,14,100",
            "KERALA,2000,1,2,3,4,5,6,7,8,9,10,11,12,78",
            "ANDAMAN & NICOBAR ISLANDS,2001,9,9,9,9,9,9,9,9,9,9,9,9,108",
            "KERALA,2001,2,3,4,5,6,7,8,9,10,11,12,13,90",
        ]);
        assert_eq!(
            t.regions(),
            &["ANDAMAN & NICOBAR ISLANDS".to_string(), "KERALA".to_string()]
        );
        assert_eq!(t.years(), &[2000, 2001, 2002]);
        let years: Vec<Option<i32>> = t.records("KERALA").iter().map(|r| r.year).collect();
        assert_eq!(years, vec![Some(2000), Some(2001), Some(2002)]);
        assert_eq!(t.records("KERALA")[0].value(Month::Feb), Some(2.0));
    }

    #[test]
    fn discards_rows_with_wrong_field_count() {
        let t = table(&[
            "KERALA,2000,1,2,3,4,5,6,7,8,9,10,11,12,78",
            "KERALA,2001,1,2,3",
            "\"TAMIL NADU, SOUTH\",2000,1,2,3,4,5,6,7,8,9,10,11,12,78",
        ]);
        assert_eq!(t.records("KERALA").len(), 1);
        assert_eq!(t.discarded_rows(), 2);
    }

    #[test]
    fn undecodable_row_is_discarded_alone() {
        let mut payload =
            format!("{HEADER}\nKERALA,2000,1,2,3,4,5,6,7,8,9,10,11,12,78\n").into_bytes();
        payload.extend_from_slice(b"GO\xE0,2000,1,2,3,4,5,6,7,8,9,10,11,12,78\n");
        payload.extend_from_slice(b"GOA,2000,1,2,3,4,5,6,7,8,9,10,11,12,\xFF\n");

        let t = RainfallTable::from_reader(payload.as_slice(), &RainfallSchema::default())
            .expect("bad bytes in one row should not fail the table");
        assert_eq!(t.regions(), &["GOA".to_string(), "KERALA".to_string()]);
        assert_eq!(t.records("KERALA")[0].value(Month::Jan), Some(1.0));
        assert_eq!(t.discarded_rows(), 1);
    }

    #[test]
    fn grouping_uses_literal_names() {
        let t = table(&[
            "Kerala,2000,1,2,3,4,5,6,7,8,9,10,11,12,78",
            "KERALA,2000,1,2,3,4,5,6,7,8,9,10,11,12,78",
        ]);
        assert_eq!(t.regions().len(), 2);
        assert!(t.records("kerala").is_empty());
    }

    #[test]
    fn non_numeric_values_are_undefined() {
        let t = table(&["KERALA,2000,NA,2,,4,5,6,7,8,9,10,11,12,78"]);
        let r = &t.records("KERALA")[0];
        assert_eq!(r.value(Month::Jan), None);
        assert_eq!(r.value(Month::Mar), None);
        assert_eq!(r.value(Month::Feb), Some(2.0));
    }

    #[test]
    fn unparsable_year_keeps_its_slot() {
        let t = table(&[
            "KERALA,2003,1,2,3,4,5,6,7,8,9,10,11,12,78",
            "KERALA,n/a,1,2,3,4,5,6,7,8,9,10,11,12,78",
            "KERALA,2001,1,2,3,4,5,6,7,8,9,10,11,12,78",
        ]);
        let raw: Vec<&str> = t
            .records("KERALA")
            .iter()
            .map(|r| r.year_raw.as_str())
            .collect();
        assert_eq!(raw, vec!["2001", "n/a", "2003"]);
        assert_eq!(t.years(), &[2001, 2003]);
    }

    #[test]
    fn missing_month_column_is_an_error() {
        let err = RainfallTable::from_str(
            "SUBDIVISION,YEAR,JAN\nX,2000,1",
            &RainfallSchema::default(),
        )
        .expect_err("should fail");
        assert_eq!(err, RainfallError::MissingColumn("FEB".to_string()));
    }

    #[test]
    fn lower_case_headers_and_other_delimiters() {
        let schema = RainfallSchema {
            delimiter: b';',
            ..RainfallSchema::default()
        };
        let payload = "state;year;jan;feb;mar;apr;may;jun;jul;aug;sep;oct;nov;dec\n\
                       Goa;1999;1;2;3;4;5;6;7;8;9;10;11;12";
        let t = RainfallTable::from_str(payload, &schema).expect("parse");
        assert_eq!(t.records("Goa")[0].value(Month::Dec), Some(12.0));
    }
}
