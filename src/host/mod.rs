//! Host abstraction layer
//!
//! Everything the engine knows about the hosting browser lives behind the
//! seams in this module: the live window/tab types, the lifecycle event
//! enum, the [`BrowserHost`] and [`IndicatorSink`] traits, a mock host for
//! tests, and a JSONL stdio bridge for a real peer.

pub mod browser;
pub mod error;
pub mod events;
pub mod mock;
pub mod stdio;
pub mod types;

pub use browser::{is_placeholder_tab, BrowserHost, IndicatorSink, PLACEHOLDER_URLS};
pub use error::HostError;
pub use events::HostEvent;
pub use mock::{IndicatorUpdate, MockHost};
pub use stdio::{Inbound, StdioHost};
pub use types::{LiveTab, LiveWindow, TabId, WindowId};
