//! Fetching input documents from URLs or local paths.

use std::path::Path;

use tracing::{debug, info};

use crate::boundary::BoundaryCollection;
use crate::rainfall::{RainfallSchema, RainfallTable};

/// Fetch or decode failure for one input document.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    Fetch { location: String, reason: String },
    Status { location: String, status: u16 },
    Decode { location: String, reason: String },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Fetch { location, reason } => {
                write!(f, "failed to fetch {location}: {reason}")
            }
            LoadError::Status { location, status } => {
                write!(f, "failed to fetch {location}: HTTP {status}")
            }
            LoadError::Decode { location, reason } => {
                write!(f, "failed to decode {location}: {reason}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Where a document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location<'a> {
    Url(&'a str),
    Path(&'a Path),
}

impl<'a> Location<'a> {
    pub fn parse(s: &'a str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Location::Url(s)
        } else {
            Location::Path(Path::new(s.strip_prefix("file://").unwrap_or(s)))
        }
    }
}

pub async fn fetch_bytes(client: &reqwest::Client, location: &str) -> Result<Vec<u8>, LoadError> {
    let fetch_err = |reason: String| LoadError::Fetch {
        location: location.to_string(),
        reason,
    };
    let bytes = match Location::parse(location) {
        Location::Url(url) => {
            let resp = client
                .get(url)
                .send()
                .await
                .map_err(|e| fetch_err(e.to_string()))?;
            let status = resp.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    location: location.to_string(),
                    status: status.as_u16(),
                });
            }
            resp.bytes()
                .await
                .map_err(|e| fetch_err(e.to_string()))?
                .to_vec()
        }
        Location::Path(path) => tokio::fs::read(path)
            .await
            .map_err(|e| fetch_err(e.to_string()))?,
    };
    debug!(%location, bytes = bytes.len(), "fetched document");
    Ok(bytes)
}

pub async fn load_boundaries(
    client: &reqwest::Client,
    location: &str,
) -> Result<BoundaryCollection, LoadError> {
    let bytes = fetch_bytes(client, location).await?;
    let collection =
        BoundaryCollection::from_json_slice(&bytes).map_err(|e| LoadError::Decode {
            location: location.to_string(),
            reason: e.to_string(),
        })?;
    info!(
        %location,
        features = collection.len(),
        skipped = collection.skipped,
        "boundaries loaded"
    );
    Ok(collection)
}

pub async fn load_rainfall(
    client: &reqwest::Client,
    location: &str,
    schema: &RainfallSchema,
) -> Result<RainfallTable, LoadError> {
    let bytes = fetch_bytes(client, location).await?;
    RainfallTable::from_reader(bytes.as_slice(), schema).map_err(|e| LoadError::Decode {
        location: location.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{LoadError, Location, load_boundaries, load_rainfall};
    use crate::rainfall::RainfallSchema;
    use std::io::Write;
    use std::path::Path;

    #[test]
    fn parses_locations() {
        assert_eq!(
            Location::parse("https://example.org/india.json"),
            Location::Url("https://example.org/india.json")
        );
        assert_eq!(
            Location::parse("file:///data/india.json"),
            Location::Path(Path::new("/data/india.json"))
        );
        assert_eq!(
            Location::parse("assets/rain.csv"),
            Location::Path(Path::new("assets/rain.csv"))
        );
    }

    #[tokio::test]
    async fn loads_boundaries_from_path() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"{{"type":"FeatureCollection","features":[{{"type":"Feature","properties":{{"st_nm":"Goa"}},"geometry":{{"type":"Polygon","coordinates":[[[73,15],[74,15],[74,16],[73,15]]]}}}}]}}"#
        )
        .expect("write");
        let client = reqwest::Client::new();
        let location = file.path().to_string_lossy().to_string();
        let c = load_boundaries(&client, &location).await.expect("load");
        assert_eq!(c.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let location = dir.path().join("absent.json").to_string_lossy().to_string();
        let err = load_boundaries(&reqwest::Client::new(), &location)
            .await
            .expect_err("should fail");
        assert!(matches!(err, LoadError::Fetch { .. }));
    }

    #[tokio::test]
    async fn unknown_discriminant_is_a_decode_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{"type":"Feature"}}"#).expect("write");
        let location = file.path().to_string_lossy().to_string();
        let err = load_boundaries(&reqwest::Client::new(), &location)
            .await
            .expect_err("should fail");
        assert!(matches!(err, LoadError::Decode { .. }));
        assert!(err.to_string().contains("Feature"));
    }

    #[tokio::test]
    async fn loads_rainfall_from_path() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "SUBDIVISION,YEAR,JAN,FEB,MAR,APR,MAY,JUN,JUL,AUG,SEP,OCT,NOV,DEC")
            .expect("write");
        writeln!(file, "KERALA,2000,1,2,3,4,5,6,7,8,9,10,11,12").expect("write");
        let location = file.path().to_string_lossy().to_string();
        let t = load_rainfall(&reqwest::Client::new(), &location, &RainfallSchema::default())
            .await
            .expect("load");
        assert_eq!(t.years(), &[2000]);
    }
}
