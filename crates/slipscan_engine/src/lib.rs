//! # SlipScan Engine
//!
//! The boundary between SlipScan and a payment-barcode recognition engine.
//!
//! Recognition engines are **opaque native libraries**: they unlock with a
//! license, wrap caller pixel memory as images, and hand out recognizer and
//! runner objects that must be released explicitly, in dependency order.
//! This crate describes that surface as a trait with move-only handle types.
//!
//! ## Design Principles
//!
//! - Images borrow their pixel buffer, runners borrow their recognizers
//! - Disposal consumes the handle, so nothing is released twice
//! - Soft outcomes are data ([`ResultState`]), not errors
//!
//! ## Available Engines
//!
//! - [`MemoryEngine`] - Scripted engine that records every call
//! - `slipscan_ffi::NativeEngine` - The vendor C library

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod frame;
mod memory;
mod result;
mod settings;

pub use engine::{ProgressControl, ProgressObserver, RecognitionEngine};
pub use error::{CreateError, CreateResult, ImageError, ImageResult, UnlockError};
pub use frame::{Frame, PixelLayout};
pub use memory::{EngineEvent, HandleId, MemoryEngine, MemoryImage, MemoryRecognizer, MemoryRunner};
pub use result::{Amount, PaymentDate, PaymentResult, ResultState, SlipId};
pub use settings::{
    CommonPaymentSettings, License, Pdf417PaymentSettings, QrPaymentSettings, RecognizerKind,
    RecognizerSettings, RunnerSettings, DEFAULT_CONVERSION_RATE,
};
