//! Guessing how a donation was paid from the free-text comments of a bank record.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Payment categories of the accounting provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum PaymentType {
    Unpaid,
    DeductionAtSource,
    Cash,
    Check,
    CreditCard,
    ElectronicTransfer,
    PayPal,
    PaymentApp,
    Other,
}

impl From<PaymentType> for i8 {
    fn from(value: PaymentType) -> Self {
        match value {
            PaymentType::Unpaid => -1,
            PaymentType::DeductionAtSource => 0,
            PaymentType::Cash => 1,
            PaymentType::Check => 2,
            PaymentType::CreditCard => 3,
            PaymentType::ElectronicTransfer => 4,
            PaymentType::PayPal => 5,
            PaymentType::PaymentApp => 10,
            PaymentType::Other => 11,
        }
    }
}

impl TryFrom<i8> for PaymentType {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Ok(match value {
            -1 => PaymentType::Unpaid,
            0 => PaymentType::DeductionAtSource,
            1 => PaymentType::Cash,
            2 => PaymentType::Check,
            3 => PaymentType::CreditCard,
            4 => PaymentType::ElectronicTransfer,
            5 => PaymentType::PayPal,
            10 => PaymentType::PaymentApp,
            11 => PaymentType::Other,
            other => return Err(format!("unknown payment type {other}")),
        })
    }
}

/// Used when no rule matches: donations mostly arrive as bank wires.
pub const DEFAULT_PAYMENT_TYPE: PaymentType = PaymentType::ElectronicTransfer;

const DEFAULT_RULES: &[(&str, PaymentType)] = &[
    ("^bit העברה נכנסת$", PaymentType::PaymentApp),
    (".*מזומן.*", PaymentType::Cash),
];

/// Ordered pattern rules; the first one matching the start of the comments wins.
#[derive(Debug, Clone)]
pub struct PaymentTypeRules {
    rules: Vec<(Regex, PaymentType)>,
}

impl PaymentTypeRules {
    pub fn new<S: AsRef<str>>(
        rules: impl IntoIterator<Item = (S, PaymentType)>,
    ) -> Result<Self, regex::Error> {
        let rules = rules
            .into_iter()
            .map(|(pattern, payment_type)| {
                compile(pattern.as_ref()).map(|pattern| (pattern, payment_type))
            })
            .collect::<Result<_, _>>()?;
        Ok(PaymentTypeRules { rules })
    }

    pub fn classify(&self, comments: &str) -> PaymentType {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.is_match(comments))
            .map_or(DEFAULT_PAYMENT_TYPE, |(_, payment_type)| *payment_type)
    }
}

impl Default for PaymentTypeRules {
    fn default() -> Self {
        PaymentTypeRules::new(DEFAULT_RULES.iter().copied()).expect("invalid default rule")
    }
}

// anchored at the start of the comments, like the rules are written
fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"\A(?:{pattern})"))
        .case_insensitive(true)
        .multi_line(true)
        .dot_matches_new_line(true)
        .build()
}
