//! Request surface consumed from the UI
//!
//! The UI collaborator (a popup, a panel, anything) talks to the engine in
//! discrete request/response pairs. The transport is somebody else's
//! problem; these enums are the contract, and
//! [`Engine::handle_request`] is the single dispatch point.

use serde::{Deserialize, Serialize};

use crate::core::engine::Engine;
use crate::data::{PersistedState, SavedWindow};
use crate::host::types::LiveWindow;

/// Name pre-filled in the save form for an unsaved window.
pub const DEFAULT_WINDOW_NAME: &str = "Window";

/// A request from the UI.
///
/// Message types are camelCase on the wire (`getState`, `saveWindow`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    /// Fetch the full registry snapshot plus the default-name constant.
    GetState,

    /// Save a window under a name. The UI usually passes the window it is
    /// looking at; if it passes nothing usable the engine falls back to the
    /// currently focused window.
    SaveWindow {
        #[serde(default)]
        window: Option<LiveWindow>,
        name: String,
    },

    /// Delete a saved window (idempotent).
    DeleteSavedWindow { name: String },

    /// Reverse a delete from earlier in this session.
    UndoSavedWindow { name: String },

    /// Reopen a saved window.
    OpenWindow { name: String },
}

/// A response to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    /// Registry snapshot plus the default-name constant.
    State {
        default_name: String,
        #[serde(flatten)]
        state: PersistedState,
    },

    /// Result of a save: the stored snapshot, or nothing when the name was
    /// rejected.
    Saved {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        saved: Option<SavedWindow>,
    },

    /// Result of a delete.
    Deleted { ok: bool },

    /// Result of an undo.
    Undone { ok: bool },

    /// Result of an open: the snapshot and the window now embodying it.
    Opened {
        saved: SavedWindow,
        window: LiveWindow,
    },

    /// The request failed.
    Error { error: String },
}

impl Engine {
    /// Handle a single UI request against the registry, flushing before the
    /// response is produced.
    pub async fn handle_request(&mut self, request: Request) -> Response {
        match request {
            Request::GetState => Response::State {
                default_name: self.default_name().to_string(),
                state: self.registry().to_persisted(),
            },
            Request::SaveWindow { window, name } => {
                let window = match window.filter(|w| !w.tabs.is_empty()) {
                    Some(window) => window,
                    None => {
                        let fetched = self.host().current_window().await;
                        match fetched {
                            Ok(window) => window,
                            Err(e) => {
                                return Response::Error {
                                    error: e.to_string(),
                                }
                            }
                        }
                    }
                };
                match self.save_window(&window, &name).await {
                    Ok(saved) => Response::Saved { saved },
                    Err(e) => Response::Error {
                        error: e.to_string(),
                    },
                }
            }
            Request::DeleteSavedWindow { name } => match self.delete_saved_window(&name).await {
                Ok(ok) => Response::Deleted { ok },
                Err(e) => Response::Error {
                    error: e.to_string(),
                },
            },
            Request::UndoSavedWindow { name } => match self.undo_delete_saved_window(&name).await {
                Ok(()) => Response::Undone { ok: true },
                Err(e) => Response::Error {
                    error: e.to_string(),
                },
            },
            Request::OpenWindow { name } => match self.open_window(&name).await {
                Ok((saved, window)) => Response::Opened { saved, window },
                Err(e) => Response::Error {
                    error: e.to_string(),
                },
            },
        }
    }
}
