//! Question/answer capability used by the class tree builder
//!
//! # Overview
//!
//! - [`Prompter`] - one blocking request/response per question, with a
//!   default-answer fast path (`assume_yes`)
//! - [`BlockPrompter`] - line-buffered terminal prompter; pasted
//!   multi-line input is grouped into one answer by a quiet period
//! - [`ScriptedPrompter`] - canned answers plus a transcript, for
//!   non-interactive rebuilds and tests

mod block;
mod scripted;
mod types;

pub use block::{BlockOptions, BlockPrompter};
pub use scripted::ScriptedPrompter;
pub use types::{ask_until, ask_when_empty, Prompter};
