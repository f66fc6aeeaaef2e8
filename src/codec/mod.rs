//! Metadata decoder
//!
//! Reads back the `{@tool json2dart ...}` comment blocks written by the
//! emitter and reconstructs the sample data, the disambiguation map and
//! the provenance of the generating command.
//!
//! # Overview
//!
//! - [`LineSplitter`] - push-based splitter on raw LF bytes
//! - [`Decoder`] - line-at-a-time state machine over class records
//! - [`decode`], [`decode_reader`], [`decode_file`] - one-shot entry points
//!
//! Field literals are matched by an ordered rule list (see
//! [`parse_literal`]); the rules mirror the emitter's renderings exactly.

mod decoder;
mod lines;
mod rules;
mod types;

pub use decoder::{decode, decode_file, decode_reader, Decoder};
pub use lines::LineSplitter;
pub use rules::parse_literal;
pub use types::{ClassRecord, FieldValue, Restored};
