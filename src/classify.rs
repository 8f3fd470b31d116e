//! Heuristic classification of metric names into engine categories
//!
//! Metric sets describe their contents only through symbolic names like
//! `RenderBusy` or `VideoUtilization`, so engine utilization metrics are
//! recognized by substring: the name must mention an engine category and a
//! busy/utilization qualifier. This is a heuristic, not a grammar; a name
//! mentioning several engines is attributed to the first category in
//! [`EngineKind::ALL`] order.

use crate::types::EngineKind;

/// Category tokens, checked in order; first match wins
const CATEGORY_TOKENS: [(&str, EngineKind); 4] = [
    ("render", EngineKind::Render),
    ("blitter", EngineKind::Blitter),
    ("video", EngineKind::Video),
    ("enhance", EngineKind::Enhance),
];

/// Qualifier tokens marking a utilization metric
const QUALIFIER_TOKENS: [&str; 2] = ["busy", "util"];

/// Classify a metric name into an engine kind, if it looks like an engine
/// utilization metric
///
/// Matching is case-insensitive. Returns `None` for names that lack either
/// a category token or a qualifier token, including the empty string.
pub fn classify_engine_metric(name: &str) -> Option<EngineKind> {
    let lower = name.to_ascii_lowercase();

    if !QUALIFIER_TOKENS.iter().any(|token| lower.contains(token)) {
        return None;
    }

    CATEGORY_TOKENS
        .iter()
        .find(|(token, _)| lower.contains(token))
        .map(|&(_, engine)| engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_render_case_combinations() {
        for name in ["RenderBusy", "RENDER_BUSY", "renderbusy", "GpuRenderUtil"] {
            assert_eq!(classify_engine_metric(name), Some(EngineKind::Render), "{name}");
        }
    }

    #[test]
    fn test_classify_all_engines() {
        assert_eq!(
            classify_engine_metric("BlitterBusy"),
            Some(EngineKind::Blitter)
        );
        assert_eq!(classify_engine_metric("VideoUtil"), Some(EngineKind::Video));
        assert_eq!(
            classify_engine_metric("EnhanceBusy"),
            Some(EngineKind::Enhance)
        );
    }

    #[test]
    fn test_category_without_qualifier_is_none() {
        assert_eq!(classify_engine_metric("RenderFrequency"), None);
        assert_eq!(classify_engine_metric("VideoMemoryReads"), None);
    }

    #[test]
    fn test_qualifier_without_category_is_none() {
        assert_eq!(classify_engine_metric("GpuBusy"), None);
        assert_eq!(classify_engine_metric("EuUtilization"), None);
    }

    #[test]
    fn test_empty_name_is_none() {
        assert_eq!(classify_engine_metric(""), None);
    }

    #[test]
    fn test_multiple_categories_first_order_wins() {
        // Render is checked before Video
        assert_eq!(
            classify_engine_metric("VideoRenderBusy"),
            Some(EngineKind::Render)
        );
        // Blitter is checked before Enhance
        assert_eq!(
            classify_engine_metric("EnhanceBlitterUtil"),
            Some(EngineKind::Blitter)
        );
    }
}
