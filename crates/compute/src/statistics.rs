/// Summary of the values currently on screen.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SliceStats {
    pub count: usize,
    pub undefined: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl SliceStats {
    /// Non-finite values are counted as undefined and excluded from mean/min/max.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let first = *finite.first()?;
        let mut min = first;
        let mut max = first;
        let mut sum = 0.0;
        for &v in &finite {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        Some(Self {
            count: finite.len(),
            undefined: values.len() - finite.len(),
            mean: sum / finite.len() as f64,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SliceStats;

    #[test]
    fn skips_undefined_values() {
        let s = SliceStats::from_values(&[1.0, f64::NAN, 3.0, 2.0]).expect("stats");
        assert_eq!(s.count, 3);
        assert_eq!(s.undefined, 1);
        assert!((s.mean - 2.0).abs() < 1e-9);
        assert_eq!((s.min, s.max), (1.0, 3.0));
    }

    #[test]
    fn all_undefined_is_none() {
        assert!(SliceStats::from_values(&[f64::NAN]).is_none());
        assert!(SliceStats::from_values(&[]).is_none());
    }
}
