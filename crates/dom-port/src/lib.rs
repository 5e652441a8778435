//! Read-only view of a host document.
//!
//! The instrumentation never touches a live DOM directly: every component is
//! handed a [`DocumentPort`]. [`MemoryDocument`] is an arena-backed
//! implementation used by tests and the replay tool.

pub mod element;
pub mod errors;
pub mod interactive;
pub mod memory;
pub mod ports;
pub mod selector;

pub use element::{class_list, descendants, has_class, tag_lower, ElementKind, InputType};
pub use errors::{DomError, DomResult};
pub use interactive::{InteractiveResolver, TagInteractiveResolver};
pub use memory::{MemoryDocument, NodeSpec};
pub use ports::{DocumentPort, NodeId, NodeType, PageInfo};
pub use selector::SelectorList;
