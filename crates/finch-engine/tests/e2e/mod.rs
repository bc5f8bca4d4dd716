//! End-to-end tests for the Finch engine
//!
//! These tests run Finch source in a VM and check what it printed, what it
//! reported, and what the embedding API reads back.

mod classes;
mod embedding;
mod errors;
mod language;
mod modules;
