//! Output module
//!
//! Handles everything after class emission: the provenance comment,
//! the external formatter and writing the Dart file.

mod format;
mod writer;

pub use format::format_code;
pub use writer::{dart_file_name, provenance_line, with_provenance, write_code};
