use foundation::time::Month;

use crate::frame::Frame;

/// Which slice of the observation table is on screen.
///
/// The year index only changes through [`TimeCursor::select_year`]; the
/// automatic stepper can reach nothing but the month.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimeCursor {
    year_index: usize,
    month: Month,
}

impl TimeCursor {
    pub fn new(year_index: usize, month: Month) -> Self {
        Self { year_index, month }
    }

    pub fn year_index(&self) -> usize {
        self.year_index
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// Explicit year selection (user control).
    pub fn select_year(&mut self, year_index: usize) {
        self.year_index = year_index;
    }

    /// Explicit month selection (timeline click).
    pub fn jump_to_month(&mut self, month: Month) {
        self.month = month;
    }

    fn advance_month(&mut self) {
        self.month = self.month.next();
    }
}

impl Default for TimeCursor {
    fn default() -> Self {
        Self::new(0, Month::Jan)
    }
}

/// Fixed-cadence month animation driven by frame time.
///
/// Fires at most once per frame. If a frame is late the backlog is dropped
/// rather than replayed.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthStepper {
    interval_s: f64,
    elapsed_s: f64,
    paused: bool,
}

impl MonthStepper {
    pub fn new(interval_s: f64) -> Self {
        Self {
            interval_s: interval_s.max(1e-3),
            elapsed_s: 0.0,
            paused: false,
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Accumulates the frame's delta and advances the cursor's month when an
    /// interval has elapsed. Returns `true` if the month changed.
    pub fn tick(&mut self, frame: Frame, cursor: &mut TimeCursor) -> bool {
        if self.paused {
            return false;
        }
        self.elapsed_s += frame.dt_s.max(0.0);
        if self.elapsed_s < self.interval_s {
            return false;
        }
        let rest = self.elapsed_s - self.interval_s;
        self.elapsed_s = if rest >= self.interval_s { 0.0 } else { rest };
        self.step(cursor);
        true
    }

    /// One automatic advance, independent of elapsed time.
    pub fn step(&self, cursor: &mut TimeCursor) {
        cursor.advance_month();
    }

    /// Restart the interval, e.g. after a manual month jump.
    pub fn reset(&mut self) {
        self.elapsed_s = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::{MonthStepper, TimeCursor};
    use crate::frame::Frame;
    use foundation::time::Month;

    #[test]
    fn twelve_steps_restore_month_and_keep_year() {
        let stepper = MonthStepper::new(1.0);
        let mut cursor = TimeCursor::new(3, Month::Apr);
        for n in 1..=36 {
            stepper.step(&mut cursor);
            if n % 12 == 0 {
                assert_eq!(cursor.month(), Month::Apr);
            }
            assert_eq!(cursor.year_index(), 3);
        }
    }

    #[test]
    fn december_wraps_without_touching_year() {
        let stepper = MonthStepper::new(1.0);
        let mut cursor = TimeCursor::new(7, Month::Dec);
        stepper.step(&mut cursor);
        assert_eq!(cursor.month(), Month::Jan);
        assert_eq!(cursor.year_index(), 7);
    }

    #[test]
    fn tick_fires_on_interval() {
        let mut stepper = MonthStepper::new(1.0);
        let mut cursor = TimeCursor::default();
        let mut frame = Frame::first_at_fps(4.0);
        let mut fired = 0;
        for _ in 0..8 {
            if stepper.tick(frame, &mut cursor) {
                fired += 1;
            }
            frame = frame.next();
        }
        assert_eq!(fired, 2);
        assert_eq!(cursor.month(), Month::Mar);
    }

    #[test]
    fn late_frame_fires_once() {
        let mut stepper = MonthStepper::new(1.0);
        let mut cursor = TimeCursor::default();
        // A single 5s frame advances one month, not five.
        assert!(stepper.tick(Frame::new(1, 5.0), &mut cursor));
        assert_eq!(cursor.month(), Month::Feb);
        assert!(!stepper.tick(Frame::new(2, 0.01), &mut cursor));
        assert_eq!(cursor.month(), Month::Feb);
    }

    #[test]
    fn paused_stepper_holds_month() {
        let mut stepper = MonthStepper::new(0.5);
        stepper.set_paused(true);
        let mut cursor = TimeCursor::default();
        assert!(!stepper.tick(Frame::new(0, 2.0), &mut cursor));
        assert_eq!(cursor.month(), Month::Jan);
    }

    #[test]
    fn explicit_selection_moves_year_only() {
        let mut cursor = TimeCursor::new(0, Month::Jun);
        cursor.select_year(2);
        assert_eq!(cursor.year_index(), 2);
        assert_eq!(cursor.month(), Month::Jun);
        cursor.jump_to_month(Month::Oct);
        assert_eq!(cursor.month(), Month::Oct);
    }
}
