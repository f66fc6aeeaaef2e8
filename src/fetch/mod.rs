//! Input JSON fetching
//!
//! `--from` accepts an `http(s)` URL or a file path. Fetch options
//! (`fromOption`) currently carry request headers.

mod client;

pub use client::{is_url, FetchConfig, Fetched, Fetcher};

#[cfg(test)]
mod tests;
