//! Type definitions mirroring the vendor C headers.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

use slipscan_engine::{
    Amount, PaymentDate, PaymentResult, Pdf417PaymentSettings, QrPaymentSettings, ResultState,
    SlipId,
};
use tracing::warn;

/// C boolean (`MBBool`).
pub type MBBool = u8;

/// `MB_TRUE`.
pub const MB_TRUE: MBBool = 1;
/// `MB_FALSE`.
pub const MB_FALSE: MBBool = 0;

/// Raw result state (`MBRecognizerResultState`).
pub type RawResultState = c_int;

/// Raw pixel layout tag (`MBRawImageType`).
pub type RawImageType = c_int;

/// `MB_RAW_IMAGE_TYPE_RGB`: interleaved 8-bit RGB.
pub const MB_RAW_IMAGE_TYPE_RGB: RawImageType = 1;

/// An opaque recognition image.
#[repr(C)]
pub struct MBRecognizerImage {
    _private: [u8; 0],
}

/// An opaque recognizer runner.
#[repr(C)]
pub struct MBRecognizerRunner {
    _private: [u8; 0],
}

/// The opaque base every recognizer starts with.
#[repr(C)]
pub struct MBRecognizer {
    _private: [u8; 0],
}

/// Pointer to any recognizer (`MBRecognizerPtr`).
pub type MBRecognizerPtr = *mut MBRecognizer;

/// An opaque PDF417 payment recognizer.
#[repr(C)]
pub struct MBCroatiaPdf417PaymentRecognizer {
    _private: [u8; 0],
}

/// An opaque QR payment recognizer.
#[repr(C)]
pub struct MBCroatiaQrPaymentRecognizer {
    _private: [u8; 0],
}

/// Settings shared by both payment recognizers.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MBCroatiaCommonBarcodePaymentRecognizerSettings {
    /// EUR to HRK conversion rate.
    pub conversion_rate: f32,
}

/// PDF417 payment recognizer settings.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MBCroatiaPdf417PaymentRecognizerSettings {
    /// Shared settings.
    pub common: MBCroatiaCommonBarcodePaymentRecognizerSettings,
    /// Accept barcodes with missing rows.
    pub uncertain_decoding: MBBool,
}

impl From<&Pdf417PaymentSettings> for MBCroatiaPdf417PaymentRecognizerSettings {
    fn from(s: &Pdf417PaymentSettings) -> Self {
        Self {
            common: MBCroatiaCommonBarcodePaymentRecognizerSettings {
                conversion_rate: s.common.conversion_rate,
            },
            uncertain_decoding: to_mb_bool(s.uncertain_decoding),
        }
    }
}

/// QR payment recognizer settings.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MBCroatiaQrPaymentRecognizerSettings {
    /// Shared settings.
    pub common: MBCroatiaCommonBarcodePaymentRecognizerSettings,
    /// Scan more slowly and more thoroughly.
    pub slower_thorough_scan: MBBool,
}

impl From<&QrPaymentSettings> for MBCroatiaQrPaymentRecognizerSettings {
    fn from(s: &QrPaymentSettings) -> Self {
        Self {
            common: MBCroatiaCommonBarcodePaymentRecognizerSettings {
                conversion_rate: s.common.conversion_rate,
            },
            slower_thorough_scan: to_mb_bool(s.slower_thorough_scan),
        }
    }
}

/// Recognizer runner settings.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MBRecognizerRunnerSettings {
    /// Keep results from every matching recognizer.
    pub allow_multiple_results: MBBool,
    /// Array of recognizers, in priority order.
    pub recognizers: *const MBRecognizerPtr,
    /// Length of `recognizers`.
    pub num_of_recognizers: usize,
}

/// Fields common to every recognizer result.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MBBaseRecognizerResult {
    /// Result state.
    pub state: RawResultState,
}

/// Calendar date.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct MBDate {
    /// Day of month.
    pub day: c_int,
    /// Month.
    pub month: c_int,
    /// Year.
    pub year: c_int,
}

/// Result of either payment recognizer.
///
/// String fields point into memory owned by the recognizer and stay valid
/// until it is deleted or runs again.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MBCroatiaBarcodePaymentRecognizerResult {
    /// Base result.
    pub base_result: MBBaseRecognizerResult,
    /// Amount in lipa.
    pub amount_hrk: c_int,
    /// Amount in euro cents.
    pub amount_eur: c_int,
    /// Whether the HRK amount was converted.
    pub conversion_to_eur_performed: MBBool,
    /// Payer name.
    pub payer_name: *const c_char,
    /// Payer address.
    pub payer_address: *const c_char,
    /// Payer detailed address.
    pub payer_detailed_address: *const c_char,
    /// Recipient name.
    pub recipient_name: *const c_char,
    /// Recipient address.
    pub recipient_address: *const c_char,
    /// Recipient detailed address.
    pub recipient_detailed_address: *const c_char,
    /// Account number.
    pub account_number: *const c_char,
    /// Bank code.
    pub bank_code: *const c_char,
    /// IBAN.
    pub iban: *const c_char,
    /// Reference model.
    pub reference_model: *const c_char,
    /// Reference.
    pub reference: *const c_char,
    /// Purpose code.
    pub purpose_code: *const c_char,
    /// Payment description.
    pub payment_description: *const c_char,
    /// Payment description code.
    pub payment_description_code: *const c_char,
    /// Due date.
    pub due_date: MBDate,
    /// Trailing optional data.
    pub optional_data: *const c_char,
    /// Slip type (`MBCroatiaBarcodePaymentSlipIdType`).
    pub slip_id: c_int,
    /// Whether the barcode was decoded in uncertain mode.
    pub uncertain: MBBool,
}

impl Default for MBCroatiaBarcodePaymentRecognizerResult {
    fn default() -> Self {
        let null = std::ptr::null();
        Self {
            base_result: MBBaseRecognizerResult { state: 0 },
            amount_hrk: 0,
            amount_eur: 0,
            conversion_to_eur_performed: MB_FALSE,
            payer_name: null,
            payer_address: null,
            payer_detailed_address: null,
            recipient_name: null,
            recipient_address: null,
            recipient_detailed_address: null,
            account_number: null,
            bank_code: null,
            iban: null,
            reference_model: null,
            reference: null,
            purpose_code: null,
            payment_description: null,
            payment_description_code: null,
            due_date: MBDate::default(),
            optional_data: null,
            slip_id: 1,
            uncertain: MB_FALSE,
        }
    }
}

impl MBCroatiaBarcodePaymentRecognizerResult {
    /// Copies the result into owned Rust values.
    ///
    /// # Safety
    ///
    /// Every non-null string pointer must reference a valid null-terminated
    /// string for the duration of the call.
    pub unsafe fn to_payment_result(&self) -> PaymentResult {
        PaymentResult {
            state: result_state(self.base_result.state),
            iban: owned(self.iban),
            amount_eur: Amount::from_minor(i64::from(self.amount_eur)),
            amount_hrk: Amount::from_minor(i64::from(self.amount_hrk)),
            conversion_to_eur_performed: self.conversion_to_eur_performed != MB_FALSE,
            payer_name: owned(self.payer_name),
            payer_address: owned(self.payer_address),
            recipient_name: owned(self.recipient_name),
            recipient_address: owned(self.recipient_address),
            account_number: owned(self.account_number),
            bank_code: owned(self.bank_code),
            reference_model: owned(self.reference_model),
            reference: owned(self.reference),
            purpose_code: owned(self.purpose_code),
            payment_description: owned(self.payment_description),
            due_date: payment_date(self.due_date),
            slip_id: if self.slip_id == 0 {
                SlipId::Hub1
            } else {
                SlipId::Hub3
            },
            uncertain: self.uncertain != MB_FALSE,
        }
    }
}

/// Converts a Rust bool to `MBBool`.
pub fn to_mb_bool(value: bool) -> MBBool {
    if value {
        MB_TRUE
    } else {
        MB_FALSE
    }
}

/// Decodes a raw result state.
pub fn result_state(raw: RawResultState) -> ResultState {
    match raw {
        0 => ResultState::Empty,
        1 => ResultState::Uncertain,
        2 => ResultState::Valid,
        3 => ResultState::StageValid,
        other => {
            warn!(state = other, "unknown result state, treating as empty");
            ResultState::Empty
        }
    }
}

fn payment_date(date: MBDate) -> Option<PaymentDate> {
    let day = u8::try_from(date.day).ok().filter(|d| *d > 0)?;
    let month = u8::try_from(date.month).ok().filter(|m| *m > 0)?;
    let year = u16::try_from(date.year).ok().filter(|y| *y > 0)?;
    Some(PaymentDate { day, month, year })
}

unsafe fn owned(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn settings_conversion() {
        let raw = MBCroatiaPdf417PaymentRecognizerSettings::from(&Pdf417PaymentSettings::default());
        assert_eq!(raw.uncertain_decoding, MB_TRUE);
        assert!((raw.common.conversion_rate - 7.5345).abs() < f32::EPSILON);

        let qr = QrPaymentSettings {
            slower_thorough_scan: false,
            ..QrPaymentSettings::default()
        };
        assert_eq!(MBCroatiaQrPaymentRecognizerSettings::from(&qr).slower_thorough_scan, MB_FALSE);
    }

    #[test]
    fn result_conversion() {
        let iban = CString::new("HR1210010051863000160").unwrap();
        let payer = CString::new("Ivan Horvat").unwrap();
        let raw = MBCroatiaBarcodePaymentRecognizerResult {
            base_result: MBBaseRecognizerResult { state: 2 },
            amount_eur: 10_000,
            iban: iban.as_ptr(),
            payer_name: payer.as_ptr(),
            due_date: MBDate {
                day: 15,
                month: 3,
                year: 2024,
            },
            ..Default::default()
        };

        // Safety: the strings outlive the call.
        let result = unsafe { raw.to_payment_result() };
        assert_eq!(result.state, ResultState::Valid);
        assert_eq!(result.iban, "HR1210010051863000160");
        assert_eq!(result.amount_eur.to_string(), "100.00");
        assert_eq!(result.payer_name, "Ivan Horvat");
        assert!(result.recipient_name.is_empty());
        assert_eq!(
            result.due_date,
            Some(PaymentDate {
                day: 15,
                month: 3,
                year: 2024
            })
        );
    }

    #[test]
    fn empty_result_has_no_date() {
        // Safety: all pointers are null.
        let result = unsafe { MBCroatiaBarcodePaymentRecognizerResult::default().to_payment_result() };
        assert_eq!(result.state, ResultState::Empty);
        assert_eq!(result.due_date, None);
        assert_eq!(result.slip_id, SlipId::Hub3);
    }

    #[test]
    fn unknown_state_is_empty() {
        assert_eq!(result_state(99), ResultState::Empty);
        assert_eq!(result_state(3), ResultState::StageValid);
    }
}
