//! End-to-end tests for the Finch runtime
//!
//! These tests write a script into a temporary resource directory,
//! bootstrap a host from it and drive the host directly or through a run
//! loop.

mod harness;
mod bootstrap;
mod dispatch;
mod run_loop;
