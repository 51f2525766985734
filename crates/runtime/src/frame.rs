use foundation::time::Time;

/// Frame metadata for the render loop.
///
/// Frames advance on a fixed delta so the month cadence is independent of how
/// long drawing a frame actually took.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta time (seconds).
    pub dt_s: f64,
    /// Session time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// First frame of a loop running at `fps` frames per second.
    pub fn first_at_fps(fps: f64) -> Self {
        Self::new(0, 1.0 / fps.max(1e-3))
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use foundation::time::Time;

    #[test]
    fn frame_time_follows_index() {
        let f = Frame::new(30, 0.5);
        assert_eq!(f.time, Time(15.0));
    }

    #[test]
    fn next_keeps_delta() {
        let f0 = Frame::first_at_fps(4.0);
        let f1 = f0.next();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.dt_s, 0.25);
        assert_eq!(f1.time, Time(0.25));
    }
}
