//! Pure calculation functions for variant dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Halving stops before a variant would be this narrow or narrower.
pub const MIN_VARIANT_WIDTH: u32 = 100;

/// One planned rendition of a source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedVariant {
    /// Filename suffix: empty for the original, then `_2`, `_4`, `_8`, …
    pub suffix: String,
    pub width: u32,
    pub height: u32,
}

/// Plan the renditions for a source of the given dimensions.
///
/// The first entry is always the original (empty suffix). Each following
/// entry halves both dimensions of the previous one, and halving continues
/// only while the halved width stays above [`MIN_VARIANT_WIDTH`]. Heights
/// never drop below 1 px, so very wide panoramas stay encodable. The plan
/// depends on nothing but the source dimensions.
///
/// ```text
/// 500x400  → 500x400, 250x200 (_2), 125x100 (_4)
/// 1600x900 → 1600x900, 800x450 (_2), 400x225 (_4), 200x112 (_8)
/// ```
pub fn plan_variants(width: u32, height: u32) -> Vec<PlannedVariant> {
    let mut plan = vec![PlannedVariant {
        suffix: String::new(),
        width,
        height,
    }];

    let (mut w, mut h, mut factor) = (width, height, 1u32);
    while w / 2 > MIN_VARIANT_WIDTH {
        w /= 2;
        h = (h / 2).max(1);
        factor *= 2;
        plan.push(PlannedVariant {
            suffix: format!("_{factor}"),
            width: w,
            height: h,
        });
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths(plan: &[PlannedVariant]) -> Vec<u32> {
        plan.iter().map(|v| v.width).collect()
    }

    #[test]
    fn width_500_yields_three_variants() {
        let plan = plan_variants(500, 400);
        assert_eq!(widths(&plan), vec![500, 250, 125]);
        assert_eq!(plan[1].height, 200);
        assert_eq!(plan[2].height, 100);
    }

    #[test]
    fn suffixes_double() {
        let plan = plan_variants(1600, 900);
        let suffixes: Vec<&str> = plan.iter().map(|v| v.suffix.as_str()).collect();
        assert_eq!(suffixes, vec!["", "_2", "_4", "_8"]);
        assert_eq!(widths(&plan), vec![1600, 800, 400, 200]);
    }

    #[test]
    fn original_always_first() {
        let plan = plan_variants(80, 60);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].suffix, "");
        assert_eq!((plan[0].width, plan[0].height), (80, 60));
    }

    #[test]
    fn stops_when_half_would_reach_threshold() {
        // 202 / 2 = 101 > 100 → one variant; 101 / 2 = 50 → stop
        assert_eq!(widths(&plan_variants(202, 100)), vec![202, 101]);
        // 200 / 2 = 100, not above the threshold
        assert_eq!(widths(&plan_variants(200, 100)), vec![200]);
    }

    #[test]
    fn wide_panorama_keeps_nonzero_height() {
        let plan = plan_variants(1600, 6);
        assert_eq!(widths(&plan), vec![1600, 800, 400, 200]);
        let heights: Vec<u32> = plan.iter().map(|v| v.height).collect();
        assert_eq!(heights, vec![6, 3, 1, 1]);
    }

    #[test]
    fn strictly_decreasing() {
        let plan = plan_variants(6000, 4000);
        for pair in plan.windows(2) {
            assert!(pair[1].width < pair[0].width);
        }
        assert!(plan.last().unwrap().width > MIN_VARIANT_WIDTH);
    }
}
