//! Automatic interaction instrumentation for a host document.
//!
//! [`Autotrack`] wires the capture pipeline, the backoff and rollout gates
//! and the editor bootstrap to host-provided ports.

pub mod autotrack;
pub mod boundary;
pub mod config;
pub mod decide;
pub mod errors;
pub mod fixture;
pub mod listeners;
pub mod logging;
pub mod readiness;

pub use autotrack::{Autotrack, AutotrackPorts, InitOutcome};
pub use config::{load_config, AutotrackConfig, ConfigError};
pub use decide::{DecideClient, DecideReply, DecideRequest, DecideResponse, StaticDecideClient};
pub use errors::{AutotrackError, AutotrackResult};
pub use fixture::{replay, PageFixture, ReplayReport};
pub use listeners::{ListenerPhase, ListenerRegistry, RecordingListenerRegistry};
pub use logging::init_logging;

pub use autotrack_capture as capture;
pub use autotrack_core_types as core_types;
pub use autotrack_dom as dom;
pub use autotrack_editor as editor;
pub use autotrack_event_sink as event_sink;
pub use autotrack_gate as gate;
pub use autotrack_privacy as privacy;
