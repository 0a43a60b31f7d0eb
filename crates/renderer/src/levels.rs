//! Threshold (contour level) generation.

/// Step multipliers tried within one order of magnitude.
const NICE_STEPS: [f64; 4] = [1.0, 2.0, 5.0, 10.0];

/// Human-readable thresholds covering `[min, max)`.
///
/// The raw step `(max - min) / count` is snapped up to the nearest
/// `{1, 2, 5, 10} × 10^k`; thresholds are the multiples of that step from the
/// first one `>= min`, stopping before `max` or after `count` values.
///
/// - `count == 0` yields an empty list.
/// - `min >= max` (or a non-finite bound) yields `[min]`.
/// - If no multiple fits, the midpoint of the range is returned.
pub fn nice_thresholds(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return vec![];
    }
    if !(min < max) || !min.is_finite() || !max.is_finite() {
        return vec![min];
    }

    let step = nice_step((max - min) / count as f64);
    let mut thresholds = Vec::with_capacity(count.min(64));

    let start = (min / step).ceil();
    // Beyond 2^53 consecutive multiples are no longer distinct
    if step.is_finite() && step > 0.0 && start.abs() < 9.0e15 {
        for i in 0..count + 2 {
            // + 0.0 folds -0.0 into 0.0
            let value = (start + i as f64) * step + 0.0;
            if value < min {
                // ceil() landed one ulp short
                continue;
            }
            if value >= max || thresholds.len() == count {
                break;
            }
            thresholds.push(value);
        }
    }

    if thresholds.is_empty() {
        thresholds.push(min + (max - min) / 2.0);
    }
    thresholds
}

/// Snap a positive step up to `{1, 2, 5, 10} × 10^k`.
pub fn nice_step(raw: f64) -> f64 {
    if !(raw > 0.0) || !raw.is_finite() {
        return raw;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    NICE_STEPS
        .iter()
        .map(|m| m * magnitude)
        // Tolerate log10 rounding, e.g. raw = 0.3 giving 2.9999999999999996 × 0.1
        .find(|&s| s >= raw * (1.0 - 1e-12))
        .unwrap_or(10.0 * magnitude)
}

/// Upper bound on fixed-interval levels.
const MAX_INTERVAL_LEVELS: usize = 10_000;

/// Fixed-interval levels from the first multiple of `interval` at or above
/// `min_value` up to and including `max_value`.
pub fn generate_contour_levels(min_value: f64, max_value: f64, interval: f64) -> Vec<f64> {
    if !(interval > 0.0) || !(max_value > min_value) {
        return vec![];
    }

    let start = (min_value / interval).ceil();
    let mut levels = Vec::new();

    let mut k = start;
    loop {
        let level = k * interval;
        if level > max_value || levels.len() == MAX_INTERVAL_LEVELS {
            break;
        }
        levels.push(level);
        k += 1.0;
    }

    levels
}

/// Thresholds for a field spanning `[min, max]`.
///
/// Explicit levels win, then a fixed `interval`, then `count` nice
/// thresholds. Explicit levels are sorted and deduplicated, and non-finite
/// entries are dropped. An interval with no multiple inside the range falls
/// back to nice thresholds.
pub fn resolve_levels(
    explicit: &[f64],
    interval: Option<f64>,
    min: f64,
    max: f64,
    count: usize,
) -> Vec<f64> {
    if explicit.is_empty() {
        let fixed = interval
            .map(|step| generate_contour_levels(min, max, step))
            .unwrap_or_default();
        if fixed.is_empty() {
            return nice_thresholds(min, max, count);
        }
        return fixed;
    }
    let mut levels: Vec<f64> = explicit.iter().copied().filter(|v| v.is_finite()).collect();
    levels.sort_by(|a, b| a.total_cmp(b));
    levels.dedup();
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_step() {
        assert_eq!(nice_step(33.3), 50.0);
        assert_eq!(nice_step(10.0), 10.0);
        assert_eq!(nice_step(1.1), 2.0);
        assert!((nice_step(0.07) - 0.1).abs() < 1e-15);
        assert_eq!(nice_step(6.0), 10.0);
    }

    #[test]
    fn test_nice_thresholds_basic() {
        assert_eq!(nice_thresholds(0.0, 100.0, 10), vec![
            0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0
        ]);
        assert_eq!(nice_thresholds(0.0, 100.0, 3), vec![0.0, 50.0]);
    }

    #[test]
    fn test_nice_thresholds_degenerate() {
        assert!(nice_thresholds(0.0, 100.0, 0).is_empty());
        assert_eq!(nice_thresholds(5.0, 5.0, 4), vec![5.0]);
        assert_eq!(nice_thresholds(9.0, 2.0, 4), vec![9.0]);
    }

    #[test]
    fn test_generate_contour_levels() {
        let levels = generate_contour_levels(0.0, 20.0, 5.0);
        assert_eq!(levels, vec![0.0, 5.0, 10.0, 15.0, 20.0]);

        let levels = generate_contour_levels(2.0, 18.0, 5.0);
        assert_eq!(levels, vec![5.0, 10.0, 15.0]);

        assert!(generate_contour_levels(0.0, 10.0, 0.0).is_empty());
    }

    #[test]
    fn test_resolve_levels_prefers_explicit() {
        let levels = resolve_levels(&[30.0, f64::NAN, 10.0, 30.0], Some(25.0), 0.0, 100.0, 5);
        assert_eq!(levels, vec![10.0, 30.0]);
        assert_eq!(resolve_levels(&[], None, 0.0, 100.0, 3), vec![0.0, 50.0]);
    }

    #[test]
    fn test_resolve_levels_interval() {
        assert_eq!(
            resolve_levels(&[], Some(25.0), 0.0, 100.0, 3),
            vec![0.0, 25.0, 50.0, 75.0, 100.0]
        );
        // No multiple of 5 in [2, 3]
        assert_eq!(resolve_levels(&[], Some(5.0), 2.0, 3.0, 2), nice_thresholds(2.0, 3.0, 2));
    }
}
