pub mod config;
pub mod core;
pub mod data;
pub mod host;
pub mod util;

pub use config::Config;
pub use crate::core::{
    windows_are_equal, Engine, EngineError, Request, Response, DEFAULT_WINDOW_NAME,
};
pub use data::{
    JsonFileStore, MemoryStore, PersistedState, Registry, SavedTab, SavedWindow, StateStore,
};
pub use host::{
    BrowserHost, HostError, HostEvent, IndicatorSink, LiveTab, LiveWindow, MockHost, TabId,
    WindowId,
};
