//! Structural window matcher
//!
//! No real window identity survives a browser restart, so a live window "is"
//! a saved one when its tab URLs line up. The comparison is deliberately
//! optimistic: the live window may have extra tabs beyond the saved prefix,
//! since users often add tabs after reopening a window.

use crate::data::SavedWindow;
use crate::host::types::LiveWindow;

/// Whether a live window is a plausible re-opening of a saved one.
///
/// Short-circuits in order: private windows never match; an empty snapshot
/// never matches (it would claim every freshly opened blank window); a live
/// window with fewer tabs than the snapshot never matches; otherwise every
/// snapshot tab's URL must equal the live tab at the same index. Pinned
/// state, titles, and live tabs beyond the snapshot's length are ignored.
pub fn windows_are_equal(window: &LiveWindow, saved: &SavedWindow) -> bool {
    if window.incognito {
        return false;
    }
    if window.tabs.is_empty() || saved.tabs.is_empty() {
        return false;
    }
    if window.tabs.len() < saved.tabs.len() {
        return false;
    }
    saved
        .tabs
        .iter()
        .zip(window.tabs.iter())
        .all(|(saved_tab, live_tab)| saved_tab.url == live_tab.url)
}
