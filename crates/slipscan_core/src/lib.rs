//! # SlipScan Core
//!
//! Ordered lifecycle management for payment-barcode recognition.
//!
//! A recognition pass acquires engine objects in a fixed order and must
//! release them in the reverse of their dependencies. This crate wraps
//! each object in a guard so that the order holds on every path, including
//! early returns.
//!
//! ## Quick Start
//!
//! ```rust
//! use slipscan_core::{Config, Session};
//! use slipscan_engine::{Amount, Frame, License, MemoryEngine, PaymentResult, RecognizerKind};
//!
//! let engine = MemoryEngine::new().with_detection(
//!     RecognizerKind::Pdf417Payment,
//!     PaymentResult::valid("HR1210010051863000160", Amount::from_minor(10_000)),
//! );
//! let pixels = vec![0u8; 16 * 16 * 3];
//! let frame = Frame::packed_rgb(&pixels, 16, 16).unwrap();
//!
//! let report = Session::new(&engine, Config::default())
//!     .recognize(&License::new("key").with_licensee("demo"), frame)
//!     .unwrap();
//!
//! assert!(report.is_success());
//! assert!(engine.violations().is_empty());
//! ```
//!
//! ## Guards
//!
//! - [`EngineSession`] - Unlocked engine, shut down last
//! - [`ImageGuard`] - Image over caller pixels
//! - [`RecognizerSet`] - Recognizers in priority order
//! - [`RunnerGuard`] - Runner borrowing the recognizer set

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod guard;
mod session;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use guard::{EngineSession, ImageGuard, RecognizerSet, RunnerGuard};
pub use session::{RecognizerOutcome, Session, SessionReport};
