use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use formats::rainfall::RainfallSchema;
use layers::alias::AliasTable;
use layers::labels::LabelStyle;
use layers::names::NameFields;
use layers::overrides::OverrideTable;
use scene::{ControllerConfig, FernConfig, MapConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Monthly rainfall drawn as fractal ferns over region boundaries"
)]
pub struct Args {
    /// Boundary document (TopoJSON or GeoJSON): URL or path
    #[arg(long, env = "RAINFERN_BOUNDARIES", default_value = "demos/regions.geojson")]
    pub boundaries: String,

    /// Monthly rainfall table: URL or path
    #[arg(long, env = "RAINFERN_RAINFALL", default_value = "demos/rainfall.csv")]
    pub rainfall: String,

    /// Manual anchor overrides (JSON)
    #[arg(long, env = "RAINFERN_OVERRIDES")]
    pub overrides: Option<PathBuf>,

    /// Alias table (JSON) replacing the built-in one
    #[arg(long, env = "RAINFERN_ALIASES")]
    pub aliases: Option<PathBuf>,

    /// Property keys tried for region names, in order
    #[arg(long, env = "RAINFERN_NAME_FIELDS", value_delimiter = ',')]
    pub name_fields: Vec<String>,

    /// Field delimiter of the rainfall table
    #[arg(long, env = "RAINFERN_DELIMITER", default_value_t = ',')]
    pub delimiter: char,

    #[arg(long, env = "RAINFERN_WIDTH", default_value_t = 960.0)]
    pub width: f64,

    #[arg(long, env = "RAINFERN_HEIGHT", default_value_t = 720.0)]
    pub height: f64,

    /// Space kept free around the map (px)
    #[arg(long, env = "RAINFERN_PADDING", default_value_t = 24.0)]
    pub padding: f64,

    /// Seconds per month step
    #[arg(long, env = "RAINFERN_STEP_INTERVAL", default_value_t = 1.5)]
    pub step_interval: f64,

    /// Fern height at display scale 1.0 (px)
    #[arg(long, env = "RAINFERN_FERN_HEIGHT", default_value_t = 36.0)]
    pub fern_height: f64,

    /// Seed for fern point scatter
    #[arg(long, env = "RAINFERN_SEED", default_value_t = 0)]
    pub seed: u64,

    /// Do not draw region names
    #[arg(long)]
    pub no_labels: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Animate, writing an SVG frame whenever the scene changes
    Run {
        /// Output directory for frame-NNNNN.svg files
        #[arg(long, env = "RAINFERN_OUT_DIR", default_value = "frames")]
        out_dir: PathBuf,

        #[arg(long, default_value_t = 30.0)]
        fps: f64,

        /// Stop after this many frames (0 = until `quit`)
        #[arg(long, default_value_t = 0)]
        max_frames: u64,
    },

    /// Wait for both inputs and write a single SVG
    Snapshot {
        #[arg(long, default_value = "rainfern.svg")]
        out: PathBuf,

        /// Year to show (default: most recent)
        #[arg(long)]
        year: Option<i32>,

        /// Month to show, JAN..DEC
        #[arg(long)]
        month: Option<String>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Run {
            out_dir: PathBuf::from("frames"),
            fps: 30.0,
            max_frames: 0,
        }
    }
}

impl Args {
    pub fn rainfall_schema(&self) -> Result<RainfallSchema> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        Ok(RainfallSchema {
            delimiter: self.delimiter as u8,
            ..RainfallSchema::default()
        })
    }

    pub async fn controller_config(&self) -> Result<ControllerConfig> {
        let alias = match &self.aliases {
            Some(path) => {
                let text = read_text(path).await?;
                AliasTable::from_json_str(&text)
                    .with_context(|| format!("parsing alias table {}", path.display()))?
            }
            None => AliasTable::india_subdivisions(),
        };
        let overrides = match &self.overrides {
            Some(path) => {
                let text = read_text(path).await?;
                OverrideTable::from_json_str(&text)
                    .with_context(|| format!("parsing overrides {}", path.display()))?
            }
            None => OverrideTable::new(),
        };
        let names = if self.name_fields.is_empty() {
            NameFields::default()
        } else {
            NameFields::new(self.name_fields.iter().map(|s| s.trim().to_string()))
        };
        info!(
            aliases = alias.len(),
            overrides = overrides.len(),
            name_fields = names.candidates().len(),
            "configuration loaded"
        );

        Ok(ControllerConfig {
            map: MapConfig {
                names,
                alias,
                overrides,
                padding_px: self.padding.max(0.0),
                label_style: LabelStyle::default(),
                show_labels: !self.no_labels,
            },
            ferns: FernConfig {
                height_px: self.fern_height,
            },
            step_interval_s: self.step_interval,
            seed: self.seed,
        })
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}
