//! # SlipScan Testkit
//!
//! Test utilities for SlipScan.
//!
//! This crate provides:
//! - Sample pixel buffers, payment results and scripted engines
//! - Temporary workspaces for config and image files
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use slipscan_testkit::prelude::*;
//!
//! #[test]
//! fn finds_the_slip() {
//!     let engine = scenarios::pdf417_slip();
//!     let image = TestImage::blank(64, 32);
//!     // ... run a session over image.frame()
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
