//! Front-end state that does not depend on any rendering mechanism.
//!
//! These types model what a front-end tracks between events. The CLI has no
//! use for them; the web client keeps its drop-area highlight in the browser
//! and follows the same [`DropTarget`] transitions there.

use crate::pipeline::PipelineKind;

/// Longest file name shown without truncation.
const MAX_DISPLAY_NAME: usize = 15;

/// Characters kept when a name is truncated.
const TRUNCATED_PREFIX: usize = 12;

/// Active tab of the page; each tab shows one pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabState {
    active: PipelineKind,
}

impl TabState {
    pub const fn new() -> Self {
        Self {
            active: PipelineKind::Images,
        }
    }

    pub const fn active(&self) -> PipelineKind {
        self.active
    }

    /// Activate `tab`. Returns true if the active tab changed.
    pub fn select(&mut self, tab: PipelineKind) -> bool {
        let changed = self.active != tab;
        self.active = tab;
        changed
    }
}

/// Drag events reported by a drop area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
    Drop,
}

/// Whether a drop area is highlighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropTarget {
    highlighted: bool,
}

impl DropTarget {
    pub const fn on(self, event: DragEvent) -> Self {
        Self {
            highlighted: matches!(event, DragEvent::Enter | DragEvent::Over),
        }
    }

    pub const fn is_highlighted(self) -> bool {
        self.highlighted
    }
}

/// File name as shown in a file list: names over 15 characters are cut to
/// 12 followed by `...`.
pub fn display_name(name: &str) -> String {
    if name.chars().count() > MAX_DISPLAY_NAME {
        let prefix: String = name.chars().take(TRUNCATED_PREFIX).collect();
        format!("{prefix}...")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_select() {
        let mut tabs = TabState::default();
        assert_eq!(tabs.active(), PipelineKind::Images);
        assert!(tabs.select(PipelineKind::Merge));
        assert!(!tabs.select(PipelineKind::Merge));
        assert_eq!(tabs.active(), PipelineKind::Merge);
    }

    #[test]
    fn test_drop_target_transitions() {
        let target = DropTarget::default();
        assert!(!target.is_highlighted());

        let target = target.on(DragEvent::Enter);
        assert!(target.is_highlighted());
        let target = target.on(DragEvent::Over);
        assert!(target.is_highlighted());
        assert!(!target.on(DragEvent::Leave).is_highlighted());
        assert!(!target.on(DragEvent::Drop).is_highlighted());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("short.pdf"), "short.pdf");
        assert_eq!(display_name("exactly_15_char"), "exactly_15_char");
        assert_eq!(display_name("a_much_longer_name.png"), "a_much_longe...");
    }
}
