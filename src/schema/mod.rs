//! Dart class inference and emission
//!
//! - [`build`] walks a sample and resolves one class per composite field
//! - [`render_class`] renders a class block with its metadata comment
//! - [`naming`] holds the identifier rules shared with the decoder

mod builder;
mod emitter;
pub mod naming;

pub use builder::{build, ClassTreeBuilder};
pub use emitter::{classify, render_class, ClassSpec, FieldKind, DYNAMIC_TAG, TOOL_NAME};
pub use naming::{check_identifier, field_name, file_stem, is_valid_identifier, upper_camel};

#[cfg(test)]
mod tests;
