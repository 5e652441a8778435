//! Decides on page load whether the visual editor should take over the page
//! instead of passive tracking.

pub mod bootstrap;
pub mod errors;
pub mod hash;
pub mod params;
pub mod ports;

pub use bootstrap::{
    BootstrapState, CredentialSource, EditorBootstrap, EditorSettings, EDITOR_ACTION,
    EDITOR_ENTRY_POINT, EDITOR_PARAMS_KEY, TRANSIENT_HASH_KEY,
};
pub use errors::{EditorError, EditorResult};
pub use params::EditorParams;
pub use ports::{
    EditorHost, LocationPort, MemoryLocation, MemorySessionStorage, RecordingEditorHost,
    SessionStorage,
};
