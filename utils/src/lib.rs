//! Shared utilities for the Linkmark project.
//!
//! This crate holds the build/version information surfaced by the
//! services crate in health-check headers and the startup banner.

pub mod version_info;
