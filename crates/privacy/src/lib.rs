pub mod patterns;
pub mod sanitize;
pub mod value;

pub use sanitize::{
    sanitize, FieldDescriptor, ALWAYS_STRIP_CLASS, NEVER_STRIP_CLASS, STRIPPED,
};
pub use value::FieldValue;
