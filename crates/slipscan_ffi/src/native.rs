//! `RecognitionEngine` backed by the vendor C library.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::os::raw::c_char;
use std::ptr::{self, NonNull};

use slipscan_engine::{
    CreateError, CreateResult, Frame, ImageError, ImageResult, License, PaymentResult,
    PixelLayout, ProgressObserver, RecognitionEngine, RecognizerSettings, ResultState,
    RunnerSettings, UnlockError,
};
use tracing::{debug, warn};

use crate::error::{NativeError, StatusCode};
use crate::types::{
    result_state, to_mb_bool, MBBool, MBCroatiaBarcodePaymentRecognizerResult,
    MBCroatiaPdf417PaymentRecognizer, MBCroatiaPdf417PaymentRecognizerSettings,
    MBCroatiaQrPaymentRecognizer, MBCroatiaQrPaymentRecognizerSettings, MBRecognizerImage,
    MBRecognizerPtr, MBRecognizerRunner, MBRecognizerRunnerSettings, RawImageType,
    RawResultState, MB_RAW_IMAGE_TYPE_RGB,
};

#[link(name = "RecognizerApi")]
extern "C" {
    fn recognizerAPISetCacheLocation(path: *const c_char);
    fn recognizerAPIUnlockWithLicenseKey(key: *const c_char) -> StatusCode;
    fn recognizerAPIUnlockForLicenseeWithLicenseKey(
        key: *const c_char,
        licensee: *const c_char,
    ) -> StatusCode;
    fn recognizerErrorToString(status: StatusCode) -> *const c_char;

    fn recognizerImageCreateFromRawImage(
        image: *mut *mut MBRecognizerImage,
        raw: *const u8,
        width: u16,
        height: u16,
        stride: u16,
        image_type: RawImageType,
    ) -> StatusCode;
    fn recognizerImageDelete(image: *mut *mut MBRecognizerImage) -> StatusCode;

    fn croatiaPdf417PaymentRecognizerCreate(
        recognizer: *mut *mut MBCroatiaPdf417PaymentRecognizer,
        settings: *const MBCroatiaPdf417PaymentRecognizerSettings,
    ) -> StatusCode;
    fn croatiaPdf417PaymentRecognizerResult(
        result: *mut MBCroatiaBarcodePaymentRecognizerResult,
        recognizer: *const MBCroatiaPdf417PaymentRecognizer,
    ) -> StatusCode;
    fn croatiaPdf417PaymentRecognizerDelete(
        recognizer: *mut *mut MBCroatiaPdf417PaymentRecognizer,
    ) -> StatusCode;

    fn croatiaQrPaymentRecognizerCreate(
        recognizer: *mut *mut MBCroatiaQrPaymentRecognizer,
        settings: *const MBCroatiaQrPaymentRecognizerSettings,
    ) -> StatusCode;
    fn croatiaQrPaymentRecognizerResult(
        result: *mut MBCroatiaBarcodePaymentRecognizerResult,
        recognizer: *const MBCroatiaQrPaymentRecognizer,
    ) -> StatusCode;
    fn croatiaQrPaymentRecognizerDelete(
        recognizer: *mut *mut MBCroatiaQrPaymentRecognizer,
    ) -> StatusCode;

    fn recognizerRunnerCreate(
        runner: *mut *mut MBRecognizerRunner,
        settings: *const MBRecognizerRunnerSettings,
    ) -> StatusCode;
    fn recognizerRunnerRecognizeFromImage(
        runner: *mut MBRecognizerRunner,
        image: *const MBRecognizerImage,
        image_is_video_frame: MBBool,
        callback: *const std::ffi::c_void,
    ) -> RawResultState;
    fn recognizerRunnerDelete(runner: *mut *mut MBRecognizerRunner) -> StatusCode;
}

fn native_error(code: StatusCode) -> NativeError {
    // Safety: the library returns a pointer to a static string.
    let message = unsafe {
        let ptr = recognizerErrorToString(code);
        if ptr.is_null() {
            String::from("unknown error")
        } else {
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    };
    NativeError::new(code, message)
}

fn check(code: StatusCode) -> Result<(), NativeError> {
    if code == 0 {
        Ok(())
    } else {
        Err(native_error(code))
    }
}

/// A recognition image wrapping caller memory.
#[derive(Debug)]
pub struct NativeImage<'buf> {
    raw: NonNull<MBRecognizerImage>,
    _pixels: PhantomData<&'buf [u8]>,
}

/// A native payment recognizer.
#[derive(Debug)]
pub enum NativeRecognizer {
    /// PDF417 payment recognizer.
    Pdf417(NonNull<MBCroatiaPdf417PaymentRecognizer>),
    /// QR payment recognizer.
    Qr(NonNull<MBCroatiaQrPaymentRecognizer>),
}

impl NativeRecognizer {
    fn as_base(&self) -> MBRecognizerPtr {
        match self {
            Self::Pdf417(p) => p.as_ptr().cast(),
            Self::Qr(p) => p.as_ptr().cast(),
        }
    }
}

/// A native runner borrowing its recognizers.
#[derive(Debug)]
pub struct NativeRunner<'r> {
    raw: NonNull<MBRecognizerRunner>,
    _recognizers: PhantomData<&'r NativeRecognizer>,
}

/// The vendor recognition library.
///
/// The library keeps its license state process-wide and is not safe to
/// drive from several threads, so this type is neither `Send` nor `Sync`.
#[derive(Debug, Default)]
pub struct NativeEngine {
    _single_thread: PhantomData<*const ()>,
}

impl NativeEngine {
    /// Creates a handle to the linked library.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecognitionEngine for NativeEngine {
    type Image<'buf> = NativeImage<'buf>;
    type Recognizer = NativeRecognizer;
    type Runner<'r> = NativeRunner<'r>;

    fn unlock(&self, license: &License) -> Result<(), UnlockError> {
        let cache_dir = license
            .cache_dir()
            .to_str()
            .ok_or_else(|| UnlockError::Cache("cache path is not valid UTF-8".into()))?;
        let cache_dir = CString::new(cache_dir)
            .map_err(|_| UnlockError::Cache("cache path contains a NUL byte".into()))?;
        let key = CString::new(license.key()).map_err(|_| UnlockError::InvalidKey)?;

        // Safety: all strings are valid and null-terminated for the call.
        let status = unsafe {
            recognizerAPISetCacheLocation(cache_dir.as_ptr());
            match license.licensee() {
                Some(licensee) => {
                    let licensee = CString::new(licensee)
                        .map_err(|_| UnlockError::LicenseeMismatch {
                            licensee: licensee.to_string(),
                        })?;
                    recognizerAPIUnlockForLicenseeWithLicenseKey(key.as_ptr(), licensee.as_ptr())
                }
                None => recognizerAPIUnlockWithLicenseKey(key.as_ptr()),
            }
        };

        check(status).map_err(|e| e.into_unlock_error(license.licensee()))
    }

    fn make_image<'buf>(&self, frame: Frame<'buf>) -> ImageResult<NativeImage<'buf>> {
        if frame.layout() != PixelLayout::Rgb24 {
            return Err(ImageError::UnsupportedLayout(frame.layout()));
        }

        let mut raw = ptr::null_mut();
        // Safety: `Frame` guarantees stride * height bytes are readable, and
        // the returned image borrows the buffer for 'buf.
        let status = unsafe {
            recognizerImageCreateFromRawImage(
                &mut raw,
                frame.pixels().as_ptr(),
                frame.width(),
                frame.height(),
                frame.stride(),
                MB_RAW_IMAGE_TYPE_RGB,
            )
        };
        check(status).map_err(|e| ImageError::Engine(e.to_string()))?;

        let raw = NonNull::new(raw).ok_or_else(|| ImageError::Engine("null image".into()))?;
        Ok(NativeImage {
            raw,
            _pixels: PhantomData,
        })
    }

    fn make_recognizer(&self, settings: &RecognizerSettings) -> CreateResult<NativeRecognizer> {
        let what = settings.kind().to_string();
        match settings {
            RecognizerSettings::Pdf417Payment(s) => {
                let raw_settings = MBCroatiaPdf417PaymentRecognizerSettings::from(s);
                let mut raw = ptr::null_mut();
                // Safety: both pointers are valid for the call.
                let status = unsafe { croatiaPdf417PaymentRecognizerCreate(&mut raw, &raw_settings) };
                check(status).map_err(|e| e.into_create_error(what.as_str()))?;
                NonNull::new(raw)
                    .map(NativeRecognizer::Pdf417)
                    .ok_or_else(|| CreateError::allocation(what))
            }
            RecognizerSettings::QrPayment(s) => {
                let raw_settings = MBCroatiaQrPaymentRecognizerSettings::from(s);
                let mut raw = ptr::null_mut();
                // Safety: both pointers are valid for the call.
                let status = unsafe { croatiaQrPaymentRecognizerCreate(&mut raw, &raw_settings) };
                check(status).map_err(|e| e.into_create_error(what.as_str()))?;
                NonNull::new(raw)
                    .map(NativeRecognizer::Qr)
                    .ok_or_else(|| CreateError::allocation(what))
            }
        }
    }

    fn make_runner<'r>(
        &self,
        recognizers: &[&'r NativeRecognizer],
        settings: &RunnerSettings,
    ) -> CreateResult<NativeRunner<'r>> {
        let pointers: Vec<MBRecognizerPtr> = recognizers.iter().map(|r| r.as_base()).collect();
        let raw_settings = MBRecognizerRunnerSettings {
            allow_multiple_results: to_mb_bool(settings.allow_multiple_results),
            recognizers: pointers.as_ptr(),
            num_of_recognizers: pointers.len(),
        };

        let mut raw = ptr::null_mut();
        // Safety: the pointer array outlives the call; the runner copies it.
        let status = unsafe { recognizerRunnerCreate(&mut raw, &raw_settings) };
        check(status).map_err(|e| e.into_create_error("recognizer runner"))?;

        let raw = NonNull::new(raw).ok_or_else(|| CreateError::allocation("recognizer runner"))?;
        Ok(NativeRunner {
            raw,
            _recognizers: PhantomData,
        })
    }

    fn run(
        &self,
        runner: &NativeRunner<'_>,
        image: &NativeImage<'_>,
        reset_pending: bool,
        progress: Option<&mut dyn ProgressObserver>,
    ) -> ResultState {
        if progress.is_some() {
            warn!("native engine does not report progress; running to completion");
        }
        // Safety: both handles are live for the duration of the borrow.
        let raw = unsafe {
            recognizerRunnerRecognizeFromImage(
                runner.raw.as_ptr(),
                image.raw.as_ptr(),
                to_mb_bool(reset_pending),
                ptr::null(),
            )
        };
        result_state(raw)
    }

    fn read_result(&self, recognizer: &NativeRecognizer) -> PaymentResult {
        let mut raw = MBCroatiaBarcodePaymentRecognizerResult::default();
        // Safety: `raw` is a valid out-pointer and the recognizer is live.
        let status = unsafe {
            match recognizer {
                NativeRecognizer::Pdf417(p) => croatiaPdf417PaymentRecognizerResult(&mut raw, p.as_ptr()),
                NativeRecognizer::Qr(p) => croatiaQrPaymentRecognizerResult(&mut raw, p.as_ptr()),
            }
        };
        if let Err(e) = check(status) {
            warn!(error = %e, "failed to read recognizer result");
            return PaymentResult::empty();
        }
        // Safety: string fields point into the live recognizer.
        unsafe { raw.to_payment_result() }
    }

    fn dispose_image(&self, image: NativeImage<'_>) {
        let mut raw = image.raw.as_ptr();
        // Safety: the handle is consumed, so this is the only delete.
        if let Err(e) = check(unsafe { recognizerImageDelete(&mut raw) }) {
            warn!(error = %e, "failed to delete image");
        }
    }

    fn dispose_runner(&self, runner: NativeRunner<'_>) {
        let mut raw = runner.raw.as_ptr();
        // Safety: the handle is consumed, so this is the only delete.
        if let Err(e) = check(unsafe { recognizerRunnerDelete(&mut raw) }) {
            warn!(error = %e, "failed to delete recognizer runner");
        }
    }

    fn dispose_recognizer(&self, recognizer: NativeRecognizer) {
        // Safety: the handle is consumed, so this is the only delete.
        let status = unsafe {
            match recognizer {
                NativeRecognizer::Pdf417(p) => {
                    let mut raw = p.as_ptr();
                    croatiaPdf417PaymentRecognizerDelete(&mut raw)
                }
                NativeRecognizer::Qr(p) => {
                    let mut raw = p.as_ptr();
                    croatiaQrPaymentRecognizerDelete(&mut raw)
                }
            }
        };
        if let Err(e) = check(status) {
            warn!(error = %e, "failed to delete recognizer");
        }
    }

    fn shutdown(&self) {
        // The library exposes no teardown call; license state lives until exit.
        debug!("native engine session closed");
    }
}
