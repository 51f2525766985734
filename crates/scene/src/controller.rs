//! The single owner of all mutable viewer state.
//!
//! Load results, resizes and control commands arrive here in any order; each
//! one rebuilds whatever depends on it. The render loop only reads.

use compute::statistics::SliceStats;
use formats::boundary::BoundaryCollection;
use formats::rainfall::RainfallTable;
use formats::source::LoadError;
use foundation::math::Viewport;
use foundation::time::Month;
use rand::SeedableRng;
use rand::rngs::StdRng;
use runtime::frame::Frame;
use runtime::status::StatusLog;
use runtime::stepper::{MonthStepper, TimeCursor};
use runtime::tally::Tally;
use tracing::{debug, error, info, warn};

use crate::ferns::{FernConfig, FernField, FernInputs};
use crate::map::{MapConfig, MapState};

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub map: MapConfig,
    pub ferns: FernConfig,
    pub step_interval_s: f64,
    pub seed: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            ferns: FernConfig::default(),
            step_interval_s: 1.5,
            seed: 0,
        }
    }
}

pub struct Controller {
    config: ControllerConfig,
    viewport: Viewport,
    boundaries: Option<BoundaryCollection>,
    rainfall: Option<RainfallTable>,
    map: Option<MapState>,
    ferns: FernField,
    cursor: TimeCursor,
    stepper: MonthStepper,
    status: StatusLog,
    tally: Tally,
    rng: StdRng,
    frame: Frame,
    revision: u64,
}

impl Controller {
    pub fn new(config: ControllerConfig, viewport: Viewport) -> Self {
        let stepper = MonthStepper::new(config.step_interval_s);
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            viewport,
            boundaries: None,
            rainfall: None,
            map: None,
            ferns: FernField::default(),
            cursor: TimeCursor::default(),
            stepper,
            status: StatusLog::new(),
            tally: Tally::new(),
            rng,
            frame: Frame::new(0, 0.0),
            revision: 0,
        }
    }

    /// Boundary load landed. A failure is terminal for the map but leaves
    /// the rainfall path untouched.
    pub fn on_boundaries(&mut self, result: Result<BoundaryCollection, LoadError>) {
        match result {
            Ok(collection) => {
                self.status.info(
                    self.frame,
                    "boundaries",
                    format!("{} regions loaded", collection.len()),
                );
                self.boundaries = Some(collection);
                self.rebuild_map();
                self.rebuild_ferns();
            }
            Err(e) => {
                error!(error = %e, "boundary load failed");
                self.status.error(self.frame, "boundaries", e.to_string());
                self.revision += 1;
            }
        }
    }

    /// Rainfall load landed. The cursor starts at the most recent year.
    pub fn on_rainfall(&mut self, result: Result<RainfallTable, LoadError>) {
        match result {
            Ok(table) => {
                let years = table.years().len();
                self.cursor.select_year(years.saturating_sub(1));
                self.rainfall = Some(table);
                self.rebuild_ferns();
            }
            Err(e) => {
                error!(error = %e, "rainfall load failed");
            }
        }
    }

    /// Recomputes projection, anchors and fern placement. A repeated size is
    /// a no-op.
    pub fn resize(&mut self, width: f64, height: f64) {
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return;
        }
        debug!(width = viewport.width, height = viewport.height, "resize");
        self.viewport = viewport;
        self.rebuild_map();
        self.rebuild_ferns();
    }

    /// Selects one of the table's years. Returns `false` (and raises a status
    /// message) when the year is not available.
    pub fn select_year(&mut self, year: i32) -> bool {
        let Some(table) = &self.rainfall else {
            self.status
                .error(self.frame, "controls", "no rainfall data loaded");
            self.revision += 1;
            return false;
        };
        match table.years().binary_search(&year) {
            Ok(index) => {
                self.cursor.select_year(index);
                self.rebuild_ferns();
                true
            }
            Err(_) => {
                warn!(year, "year not in data");
                self.status
                    .error(self.frame, "controls", format!("year {year} is not in the data"));
                self.revision += 1;
                false
            }
        }
    }

    pub fn jump_to_month(&mut self, month: Month) {
        self.cursor.jump_to_month(month);
        self.stepper.reset();
        self.rebuild_ferns();
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.stepper.is_paused() == paused {
            return;
        }
        self.stepper.set_paused(paused);
        info!(paused, "month stepper");
    }

    /// Advances the animation by one frame. Returns `true` when the month
    /// changed.
    pub fn tick(&mut self, frame: Frame) -> bool {
        self.frame = frame;
        if self.rainfall.is_none() {
            return false;
        }
        if !self.stepper.tick(frame, &mut self.cursor) {
            return false;
        }
        self.rebuild_ferns();
        true
    }

    fn rebuild_map(&mut self) {
        self.map = self
            .boundaries
            .as_ref()
            .map(|c| MapState::build(c, self.viewport, &self.config.map));
        self.revision += 1;
    }

    fn rebuild_ferns(&mut self) {
        self.revision += 1;
        self.tally.clear();
        let Some(table) = &self.rainfall else {
            self.ferns = FernField::default();
            return;
        };

        if let Some(map) = &self.map {
            self.tally.add("unnamed_feature", map.anchors.unnamed as u64);
            self.tally.add("no_centroid", map.anchors.no_centroid as u64);
            self.tally.add("duplicate_anchor", map.anchors.duplicates as u64);
        }
        let year = table.years().get(self.cursor.year_index()).copied();
        let inputs = FernInputs {
            map: self.map.as_ref(),
            table,
            alias: &self.config.map.alias,
            year,
            month: self.cursor.month(),
        };
        self.ferns = FernField::build(&inputs, self.config.ferns, &mut self.rng, &mut self.tally);

        match SliceStats::from_values(&self.ferns.values()) {
            Some(s) => debug!(
                year,
                month = %self.cursor.month(),
                regions = s.count,
                undefined = s.undefined,
                mean = s.mean,
                min = s.min,
                max = s.max,
                "slice"
            ),
            None => debug!(year, month = %self.cursor.month(), "slice has no values"),
        }
        if !self.tally.is_empty() {
            info!(misses = %self.tally, "fern entities rebuilt");
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn map(&self) -> Option<&MapState> {
        self.map.as_ref()
    }

    pub fn ferns(&self) -> &FernField {
        &self.ferns
    }

    pub fn rainfall(&self) -> Option<&RainfallTable> {
        self.rainfall.as_ref()
    }

    pub fn cursor(&self) -> TimeCursor {
        self.cursor
    }

    /// Year under the cursor, once rainfall data is loaded.
    pub fn year(&self) -> Option<i32> {
        self.rainfall
            .as_ref()
            .and_then(|t| t.years().get(self.cursor.year_index()).copied())
    }

    pub fn years(&self) -> &[i32] {
        self.rainfall.as_ref().map(|t| t.years()).unwrap_or_default()
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Bumped on every change to what is displayed.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::{Controller, ControllerConfig};
    use formats::boundary::BoundaryCollection;
    use formats::rainfall::{RainfallSchema, RainfallTable};
    use formats::source::LoadError;
    use foundation::math::{Vec2, Viewport};
    use foundation::time::Month;
    use layers::symbology::style_for;
    use pretty_assertions::assert_eq;
    use runtime::frame::Frame;
    use runtime::status::StatusLevel;

    const BOUNDARIES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"st_nm": "Kerala"},
         "geometry": {"type": "Polygon", "coordinates": [[[74.8,8.2],[77.4,8.2],[77.4,12.8],[74.8,12.8],[74.8,8.2]]]}},
        {"type": "Feature", "properties": {"st_nm": "Tamil Nadu"},
         "geometry": {"type": "Polygon", "coordinates": [[[77.4,8.0],[80.3,8.0],[80.3,13.5],[77.4,13.5],[77.4,8.0]]]}}
    ]}"#;

    const RAINFALL: &str = "SUBDIVISION,YEAR,JAN,FEB,MAR,APR,MAY,JUN,JUL,AUG,SEP,OCT,NOV,DEC\n\
        KERALA,2000,42,30,40,120,250,600,700,400,250,300,150,40\n\
        KERALA,2001,8,12,35,110,230,650,690,380,240,310,160,45\n\
        KERALA,2002,17,20,30,100,220,640,710,390,260,320,140,50";

    fn boundaries() -> BoundaryCollection {
        BoundaryCollection::from_json_str(BOUNDARIES).expect("boundaries")
    }

    fn rainfall() -> RainfallTable {
        RainfallTable::from_str(RAINFALL, &RainfallSchema::default()).expect("rainfall")
    }

    fn controller() -> Controller {
        Controller::new(ControllerConfig::default(), Viewport::new(800.0, 600.0))
    }

    #[test]
    fn two_regions_end_to_end() {
        let mut c = controller();
        c.on_boundaries(Ok(boundaries()));
        c.on_rainfall(Ok(rainfall()));
        assert_eq!(c.year(), Some(2002));
        assert!(c.select_year(2000));
        c.jump_to_month(Month::Jan);

        let ferns = c.ferns();
        assert_eq!(ferns.len(), 2);

        let map = c.map().expect("map");
        let kerala = ferns.get("kerala").expect("kerala");
        assert_eq!(kerala.position, map.anchors.get("kerala").expect("anchor").position);
        assert_eq!(kerala.value, 42.0);
        assert_eq!(kerala.style, style_for(42.0));

        let tamil_nadu = ferns.get("tamil nadu").expect("tamil nadu");
        assert!(tamil_nadu.anchored);
        assert!(tamil_nadu.style.is_unknown());
        assert_eq!(c.tally().count("no_observation"), 1);
    }

    #[test]
    fn map_arriving_late_backfills_positions() {
        let mut c = controller();
        c.on_rainfall(Ok(rainfall()));
        assert_eq!(c.ferns().get("kerala").map(|e| e.position), Some(Vec2::ZERO));

        c.on_boundaries(Ok(boundaries()));
        let kerala = c.ferns().get("kerala").expect("kerala");
        assert!(kerala.anchored);
        assert_ne!(kerala.position, Vec2::ZERO);
    }

    #[test]
    fn boundary_failure_reaches_status_and_keeps_ferns() {
        let mut c = controller();
        c.on_rainfall(Ok(rainfall()));
        c.on_boundaries(Err(LoadError::Status {
            location: "https://example.org/india.json".into(),
            status: 404,
        }));
        let head = c.status().headline().expect("status");
        assert_eq!(head.level, StatusLevel::Error);
        assert_eq!(head.source, "boundaries");
        assert!(c.map().is_none());
        assert_eq!(c.ferns().len(), 1);
    }

    #[test]
    fn rainfall_failure_means_no_ferns() {
        let mut c = controller();
        c.on_boundaries(Ok(boundaries()));
        c.on_rainfall(Err(LoadError::Decode {
            location: "rain.csv".into(),
            reason: "header has no YEAR column".into(),
        }));
        assert!(c.ferns().is_empty());
        assert!(c.map().is_some());
        assert_eq!(c.status().headline().map(|m| m.level), Some(StatusLevel::Info));
    }

    #[test]
    fn unknown_year_is_rejected() {
        let mut c = controller();
        c.on_rainfall(Ok(rainfall()));
        assert!(!c.select_year(1999));
        assert_eq!(c.year(), Some(2002));
        assert_eq!(c.status().headline().map(|m| m.source), Some("controls"));
    }

    #[test]
    fn stepper_advances_month_only() {
        let mut c = controller();
        c.on_rainfall(Ok(rainfall()));
        let mut frame = Frame::new(0, 0.5);
        let mut advanced = 0;
        for _ in 0..36 {
            frame = frame.next();
            if c.tick(frame) {
                advanced += 1;
            }
        }
        // 18 s at a 1.5 s cadence.
        assert_eq!(advanced, 12);
        assert_eq!(c.cursor().month(), Month::Jan);
        assert_eq!(c.year(), Some(2002));
    }

    #[test]
    fn pause_holds_the_month() {
        let mut c = controller();
        c.on_rainfall(Ok(rainfall()));
        c.set_paused(true);
        c.set_paused(true);
        let mut frame = Frame::new(0, 0.5);
        for _ in 0..12 {
            frame = frame.next();
            assert!(!c.tick(frame));
        }
        assert_eq!(c.cursor().month(), Month::Jan);

        c.set_paused(false);
        let mut advanced = false;
        for _ in 0..3 {
            frame = frame.next();
            advanced |= c.tick(frame);
        }
        assert!(advanced);
        assert_eq!(c.cursor().month(), Month::Feb);
    }

    #[test]
    fn resize_rebuilds_and_repeats_are_noops() {
        let mut c = controller();
        c.on_boundaries(Ok(boundaries()));
        c.on_rainfall(Ok(rainfall()));
        let before = c.map().expect("map").anchors.clone();

        c.resize(400.0, 300.0);
        let after = c.map().expect("map").anchors.clone();
        assert_ne!(before, after);
        let kerala = c.ferns().get("kerala").expect("kerala").position;
        assert_eq!(kerala, after.get("kerala").expect("anchor").position);

        let revision = c.revision();
        c.resize(400.0, 300.0);
        assert_eq!(c.revision(), revision);
        assert_eq!(c.map().expect("map").anchors, after);
    }
}
