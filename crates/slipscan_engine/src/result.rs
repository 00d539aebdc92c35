//! Recognition outcomes and payment fields.

use std::fmt;

/// Outcome of a recognition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResultState {
    /// Nothing was found.
    #[default]
    Empty,
    /// Something was found but could not be fully decoded.
    Uncertain,
    /// A confident, complete result.
    Valid,
    /// An intermediate stage of a multi-stage recognizer succeeded.
    StageValid,
}

impl ResultState {
    /// Whether this state carries a usable result.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A monetary amount in minor units (cents, lipa).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    /// Creates an amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Payment slip standard the barcode was encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlipId {
    /// HUB1 slip.
    Hub1,
    /// HUB3 slip.
    #[default]
    Hub3,
}

/// Calendar date as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaymentDate {
    /// Day of month, 1-31.
    pub day: u8,
    /// Month, 1-12.
    pub month: u8,
    /// Four digit year.
    pub year: u16,
}

/// Snapshot of a payment recognizer's result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaymentResult {
    /// Recognizer-level state.
    pub state: ResultState,
    /// IBAN of the receiving account.
    pub iban: String,
    /// Amount in euro cents.
    pub amount_eur: Amount,
    /// Amount in lipa.
    pub amount_hrk: Amount,
    /// Whether an HRK amount was converted to EUR.
    pub conversion_to_eur_performed: bool,
    /// Payer name.
    pub payer_name: String,
    /// Payer address.
    pub payer_address: String,
    /// Recipient name.
    pub recipient_name: String,
    /// Recipient address.
    pub recipient_address: String,
    /// Recipient account number.
    pub account_number: String,
    /// Recipient bank code.
    pub bank_code: String,
    /// Reference model, e.g. `HR01`.
    pub reference_model: String,
    /// Payment reference.
    pub reference: String,
    /// Purpose code.
    pub purpose_code: String,
    /// Free-text payment description.
    pub payment_description: String,
    /// Due date, HUB3 slips only.
    pub due_date: Option<PaymentDate>,
    /// Slip standard.
    pub slip_id: SlipId,
    /// Whether the barcode was decoded in uncertain mode.
    pub uncertain: bool,
}

impl PaymentResult {
    /// An empty result, as reported by a recognizer that found nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A valid result carrying `iban` and `amount_eur`.
    #[must_use]
    pub fn valid(iban: impl Into<String>, amount_eur: Amount) -> Self {
        Self {
            state: ResultState::Valid,
            iban: iban.into(),
            amount_eur,
            ..Self::default()
        }
    }
}
