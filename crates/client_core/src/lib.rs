//! Client core for the webmail views: the `/emails` store client, the view
//! controller that decides what is on screen, and the renderer seam it drives.

pub mod config;
pub mod controller;
pub mod error;
pub mod store;
pub mod view;

pub use config::{load_settings, Settings, SettingsError};
pub use controller::{ControllerSettings, Outcome, ViewController};
pub use error::{ControllerError, MailStoreError};
pub use store::{HttpMailStore, MailStore};
pub use view::{
    archive_action, ArchiveAction, ComposeDraft, DetailActions, Diagnostic, DiagnosticContext,
    DiagnosticKind, ListRow, Renderer, RowStyle, ViewState,
};
