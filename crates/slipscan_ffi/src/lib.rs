//! # SlipScan FFI
//!
//! Bindings to the vendor payment-barcode recognition library
//! (`RecognizerApi`).
//!
//! This crate provides:
//! - `#[repr(C)]` mirrors of the payment settings and result structs
//! - Status code mapping onto the engine error taxonomy
//! - `NativeEngine`, a [`slipscan_engine::RecognitionEngine`] over the
//!   library (requires the `native` feature and the library on the linker
//!   search path)

#![warn(missing_docs)]

pub mod error;
#[cfg(feature = "native")]
mod native;
pub mod types;

pub use error::{NativeError, RecognizerStatus, StatusCode};
#[cfg(feature = "native")]
pub use native::{NativeEngine, NativeImage, NativeRecognizer, NativeRunner};
