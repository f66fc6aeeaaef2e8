//! Structural merge of JSON trees
//!
//! Two policies over a pair of trees, `dst` (existing, lower priority) and
//! `src` (incoming):
//!
//! - **Config merge**: objects recurse, arrays are replaced wholesale
//!   (an array of options is a list, not sample data).
//! - **Data merge**: objects recurse, arrays merge positionally so that
//!   observed instances widen the inferred schema.
//!
//! Inputs are JSON, so no cycle detection is needed.

mod engine;

pub use engine::{is_equal, merge_array, merge_config, merge_config_all, merge_data, merge_data_all, MergePolicy};
