//! Scroll progress reporting for the main page.

/// Converts a scroll position into a 0–100 progress percentage.
///
/// `scroll_height` is the full content height and `client_height` the
/// viewport; when the content does not overflow the viewport there is
/// nothing to scroll and progress is 0. Overscroll (rubber-banding)
/// clamps to the range.
#[must_use]
pub fn scroll_progress(scroll_top: f64, scroll_height: f64, client_height: f64) -> f64 {
    let total = scroll_height - client_height;
    if total <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    ((scroll_top / total) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_endpoints() {
        assert!((scroll_progress(0.0, 3000.0, 800.0)).abs() < f64::EPSILON);
        assert!((scroll_progress(2200.0, 3000.0, 800.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_midpoint() {
        let p = scroll_progress(1100.0, 3000.0, 800.0);
        assert!((p - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_overflow_is_zero() {
        assert!(scroll_progress(0.0, 800.0, 800.0).abs() < f64::EPSILON);
        assert!(scroll_progress(50.0, 600.0, 800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overscroll_clamps() {
        assert!((scroll_progress(-120.0, 3000.0, 800.0)).abs() < f64::EPSILON);
        assert!((scroll_progress(9999.0, 3000.0, 800.0) - 100.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn prop_progress_in_range(
            top in -1e6_f64..1e6,
            height in 0.0_f64..1e6,
            client in 0.0_f64..1e6,
        ) {
            let p = scroll_progress(top, height, client);
            prop_assert!((0.0..=100.0).contains(&p));
        }

        #[test]
        fn prop_monotonic_in_scroll_top(
            a in 0.0_f64..1e5,
            delta in 0.0_f64..1e5,
        ) {
            let lo = scroll_progress(a, 200_000.0, 1000.0);
            let hi = scroll_progress(a + delta, 200_000.0, 1000.0);
            prop_assert!(hi >= lo);
        }
    }
}
