//! Donation payments, either read from a bank export or reconstructed from a receipt
//! that already exists at the provider.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

use crate::receipt::{Currency, DocumentType, ReceiptSummary};
use crate::{Date, Decimal};

/// Every data line of an export starts with the year.
const YEAR_PREFIX: &str = "20";

pub const DEFAULT_CURRENCY: Currency = Currency::Ils;
pub const DEFAULT_DOCUMENT_TYPE: DocumentType = DocumentType::DonationReceipt;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("bank record must have exactly 7 tab-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("invalid payment date {0:?}")]
    InvalidDate(String),

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    #[error("invalid bank code {0:?}")]
    InvalidBankCode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BankAccount {
    pub code: u16,
    pub branch: String,
    pub account: String,
}

/// A single donation payment.
///
/// Two transactions are equal when they would produce the same receipt: same document
/// type, payment date, amount, client and comments. Bank details are not compared.
/// The hash only covers date, amount and client, so transactions differing in their
/// comments land in the same bucket and are told apart by the full comparison.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub document_type: DocumentType,
    pub pay_date: Date,
    pub client_name: String,
    pub bank: Option<BankAccount>,
    pub amount: Decimal,
    pub comments: String,
    pub currency: Currency,
}

/// Fields deciding whether two transactions are the same receipt.
pub type Signature<'a> = (DocumentType, Date, Decimal, &'a str, &'a str);
/// The part of the [`Signature`] that is hashed.
pub type HashKey<'a> = (Date, Decimal, &'a str);

impl Transaction {
    /// Parse one line of a bank export, after its dates were normalized.
    ///
    /// Returns `Ok(None)` for blank, header and comment lines: lines without a tab or
    /// not starting with the year.
    pub fn from_line(line: &str) -> Result<Option<Self>, FormatError> {
        if !line.contains('\t') || !line.starts_with(YEAR_PREFIX) {
            return Ok(None);
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let &[pay_date, client_name, bank_code, branch, account, amount, comments] =
            fields.as_slice()
        else {
            return Err(FormatError::FieldCount {
                found: fields.len(),
            });
        };

        let pay_date = Date::parse_from_str(pay_date.trim(), "%Y-%m-%d")
            .map_err(|_| FormatError::InvalidDate(pay_date.to_owned()))?;
        let code = bank_code
            .trim()
            .parse()
            .map_err(|_| FormatError::InvalidBankCode(bank_code.to_owned()))?;
        let amount = Decimal::from_str(&amount.trim().replace(',', ""))
            .map_err(|_| FormatError::InvalidAmount(amount.to_owned()))?;

        Ok(Some(Transaction {
            document_type: DEFAULT_DOCUMENT_TYPE,
            pay_date,
            client_name: client_name.to_owned(),
            bank: Some(BankAccount {
                code,
                branch: branch.trim().to_owned(),
                account: account.trim().to_owned(),
            }),
            amount,
            comments: comments.to_owned(),
            currency: DEFAULT_CURRENCY,
        }))
    }

    /// Reconstruct the transaction behind a receipt found at the provider.
    ///
    /// The payment date is taken from the receipt's first payment line, falling back to
    /// the document date for receipts without one.
    pub fn from_receipt(receipt: &ReceiptSummary) -> Self {
        let pay_date = match receipt.payment.first() {
            Some(payment) => payment.date,
            None => {
                tracing::warn!(
                    "receipt {} has no payment line, using its document date",
                    receipt.id
                );
                receipt.document_date
            }
        };

        Transaction {
            document_type: receipt.document_type,
            pay_date,
            client_name: receipt.client.name.clone().unwrap_or_default(),
            bank: None,
            amount: receipt.amount,
            comments: receipt.remarks.clone().unwrap_or_default(),
            currency: DEFAULT_CURRENCY,
        }
    }

    pub fn signature(&self) -> Signature<'_> {
        (
            self.document_type,
            self.pay_date,
            self.amount,
            &self.client_name,
            &self.comments,
        )
    }

    pub fn hash_key(&self) -> HashKey<'_> {
        (self.pay_date, self.amount, &self.client_name)
    }

    /// Render as an export line with an ISO date, the inverse of [`Transaction::from_line`].
    pub fn to_line(&self) -> String {
        let (code, branch, account) = match &self.bank {
            Some(bank) => (bank.code.to_string(), bank.branch.as_str(), bank.account.as_str()),
            None => (String::from("0"), "", ""),
        };
        let pay_date = self.pay_date.format("%Y-%m-%d").to_string();
        let amount = self.amount.to_string();
        [
            pay_date.as_str(),
            self.client_name.as_str(),
            code.as_str(),
            branch,
            account,
            amount.as_str(),
            self.comments.as_str(),
        ]
        .join("\t")
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.signature() == other.signature()
    }
}

impl Eq for Transaction {}

impl Hash for Transaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash_key().hash(state);
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:>10} {} {}",
            self.pay_date,
            self.amount.to_string(),
            self.currency,
            self.client_name
        )?;
        if !self.comments.is_empty() {
            write!(f, " ({})", self.comments)?;
        }
        Ok(())
    }
}
