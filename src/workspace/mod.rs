//! Generation lifecycle orchestration.
//!
//! This module owns the workspace controller (the product being composed and
//! its lifecycle operations) and the status watch loop that observes an
//! in-flight generation job. The CLI layer calls into this module to keep
//! responsibilities separated.

mod controller;
mod poller;

pub use controller::{Workspace, WorkspaceError};
