//! # Undo Baseline
//!
//! Remembers what each platform looked like right after it was loaded, so
//! the global undo shortcut cannot walk past the loaded document.
//!
//! Design:
//! - One slot per platform: uncaptured, capture pending, or captured
//! - A capture is scheduled after each load and lands at most once
//! - While a capture is pending the session counts as "at initial state"

use std::collections::BTreeSet;

use serde_json::Value;

use crate::{BaselineComparison, DeferredHandle, Platform};

#[derive(Debug, Clone, PartialEq)]
enum BaselineSlot {
    Uncaptured,
    Pending(DeferredHandle),
    Captured(String),
}

#[derive(Debug)]
pub struct BaselineGuard {
    desktop: BaselineSlot,
    mobile: BaselineSlot,
    comparison: BaselineComparison,
}

impl BaselineGuard {
    pub fn new(comparison: BaselineComparison) -> Self {
        Self {
            desktop: BaselineSlot::Uncaptured,
            mobile: BaselineSlot::Uncaptured,
            comparison,
        }
    }

    fn slot(&self, platform: Platform) -> &BaselineSlot {
        match platform {
            Platform::Desktop => &self.desktop,
            Platform::Mobile => &self.mobile,
        }
    }

    fn slot_mut(&mut self, platform: Platform) -> &mut BaselineSlot {
        match platform {
            Platform::Desktop => &mut self.desktop,
            Platform::Mobile => &mut self.mobile,
        }
    }

    /// True when a load of `platform` should schedule a capture
    pub fn needs_capture(&self, platform: Platform) -> bool {
        matches!(self.slot(platform), BaselineSlot::Uncaptured)
    }

    pub fn mark_pending(&mut self, platform: Platform, handle: DeferredHandle) {
        *self.slot_mut(platform) = BaselineSlot::Pending(handle);
    }

    pub fn is_pending(&self, platform: Platform) -> bool {
        matches!(self.slot(platform), BaselineSlot::Pending(_))
    }

    /// Store the baseline. Ignored if one is already captured.
    pub fn capture(&mut self, platform: Platform, snapshot: String) -> bool {
        let slot = self.slot_mut(platform);
        if matches!(slot, BaselineSlot::Captured(_)) {
            return false;
        }
        *slot = BaselineSlot::Captured(snapshot);
        tracing::debug!(%platform, "undo baseline captured");
        true
    }

    /// Forget the baseline, returning a pending capture to cancel
    pub fn reset(&mut self, platform: Platform) -> Option<DeferredHandle> {
        match std::mem::replace(self.slot_mut(platform), BaselineSlot::Uncaptured) {
            BaselineSlot::Pending(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn baseline(&self, platform: Platform) -> Option<&str> {
        match self.slot(platform) {
            BaselineSlot::Captured(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn is_at_initial_state(&self, platform: Platform, live: &str) -> bool {
        match self.slot(platform) {
            BaselineSlot::Uncaptured => false,
            BaselineSlot::Pending(_) => true,
            BaselineSlot::Captured(baseline) => {
                if baseline == live {
                    return true;
                }

                let (Ok(baseline), Ok(live)) = (
                    serde_json::from_str::<Value>(baseline),
                    serde_json::from_str::<Value>(live),
                ) else {
                    return false;
                };

                match self.comparison {
                    BaselineComparison::Strict => baseline == live,
                    BaselineComparison::Tolerant => {
                        baseline == live || top_level_keys(&baseline) == top_level_keys(&live)
                    }
                }
            }
        }
    }
}

fn top_level_keys(value: &Value) -> Option<BTreeSet<&str>> {
    value
        .as_object()
        .map(|map| map.keys().map(String::as_str).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeferredAction, DeferredQueue};
    use std::time::Duration;

    const LOADED: &str = r#"{"ROOT":{"id":"ROOT","type":"Container","children":["a"]},"a":{"id":"a","type":"Text","props":{"text":"hi"}}}"#;
    const EDITED: &str = r#"{"ROOT":{"id":"ROOT","type":"Container","children":["a"]},"a":{"id":"a","type":"Text","props":{"text":"bye"}}}"#;
    const GROWN: &str = r#"{"ROOT":{"id":"ROOT","type":"Container","children":["a","b"]},"a":{"id":"a","type":"Text"},"b":{"id":"b","type":"Text"}}"#;

    fn pending_handle() -> DeferredHandle {
        DeferredQueue::new().schedule(
            DeferredAction::CaptureBaseline(Platform::Desktop),
            Duration::from_millis(100),
        )
    }

    #[test]
    fn test_uncaptured_is_never_initial() {
        let guard = BaselineGuard::new(BaselineComparison::Strict);
        assert!(!guard.is_at_initial_state(Platform::Desktop, LOADED));
        assert!(guard.needs_capture(Platform::Desktop));
    }

    #[test]
    fn test_pending_capture_counts_as_initial() {
        let mut guard = BaselineGuard::new(BaselineComparison::Strict);
        guard.mark_pending(Platform::Desktop, pending_handle());
        assert!(guard.is_at_initial_state(Platform::Desktop, EDITED));
        assert!(!guard.needs_capture(Platform::Desktop));
    }

    #[test]
    fn test_captured_compares_structurally() {
        let mut guard = BaselineGuard::new(BaselineComparison::Strict);
        assert!(guard.capture(Platform::Desktop, LOADED.to_string()));

        let reformatted = serde_json::to_string_pretty(
            &serde_json::from_str::<Value>(LOADED).unwrap(),
        )
        .unwrap();
        assert!(guard.is_at_initial_state(Platform::Desktop, LOADED));
        assert!(guard.is_at_initial_state(Platform::Desktop, &reformatted));
        assert!(!guard.is_at_initial_state(Platform::Desktop, EDITED));
    }

    #[test]
    fn test_capture_happens_once() {
        let mut guard = BaselineGuard::new(BaselineComparison::Strict);
        assert!(guard.capture(Platform::Mobile, LOADED.to_string()));
        assert!(!guard.capture(Platform::Mobile, EDITED.to_string()));
        assert_eq!(guard.baseline(Platform::Mobile), Some(LOADED));
        assert_eq!(guard.baseline(Platform::Desktop), None);
    }

    #[test]
    fn test_tolerant_accepts_matching_node_ids() {
        let mut guard = BaselineGuard::new(BaselineComparison::Tolerant);
        guard.capture(Platform::Desktop, LOADED.to_string());

        assert!(guard.is_at_initial_state(Platform::Desktop, EDITED));
        assert!(!guard.is_at_initial_state(Platform::Desktop, GROWN));
    }

    #[test]
    fn test_reset_returns_pending_handle() {
        let mut guard = BaselineGuard::new(BaselineComparison::Strict);
        let handle = pending_handle();
        guard.mark_pending(Platform::Desktop, handle);

        assert_eq!(guard.reset(Platform::Desktop), Some(handle));
        assert!(guard.needs_capture(Platform::Desktop));

        guard.capture(Platform::Desktop, LOADED.to_string());
        assert_eq!(guard.reset(Platform::Desktop), None);
        assert_eq!(guard.baseline(Platform::Desktop), None);
    }
}
