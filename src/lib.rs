//! Rhetoric analyzer: detects populist and manipulative rhetoric in text.
//!
//! The analysis itself is delegated to a Gemini model. This crate builds the
//! prompt, performs the single request, recovers the JSON object from the
//! model's reply and renders it as a terminal report.
//!
//! See `DESIGN.md` for architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod logging;
pub mod providers;

pub mod extract;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod session;
pub mod types;
