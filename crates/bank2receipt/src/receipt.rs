//! Receipt documents as the accounting provider sees them: the creation request built
//! for a new donation, and the summaries returned when searching existing ones.

use std::fmt;

use chrono::Days;
use serde::{Deserialize, Serialize};

use crate::banks;
use crate::payment_type::{PaymentType, PaymentTypeRules};
use crate::{Date, Decimal, Transaction};

/// Receipt dates at least this many days old are rejected by the provider.
pub const MAX_RECEIPT_AGE_DAYS: u64 = 49;
/// How far back a receipt that would be too old gets dated instead.
pub const BACKDATE_DAYS: u64 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum DocumentType {
    PriceQuote,
    Order,
    DeliveryNote,
    ReturnDeliveryNote,
    TransactionAccount,
    TaxInvoice,
    TaxInvoiceReceipt,
    Refund,
    Receipt,
    DonationReceipt,
    PurchaseOrder,
    DepositReceipt,
    DepositWithdrawal,
}

impl From<DocumentType> for u16 {
    fn from(value: DocumentType) -> Self {
        match value {
            DocumentType::PriceQuote => 10,
            DocumentType::Order => 100,
            DocumentType::DeliveryNote => 200,
            DocumentType::ReturnDeliveryNote => 210,
            DocumentType::TransactionAccount => 300,
            DocumentType::TaxInvoice => 305,
            DocumentType::TaxInvoiceReceipt => 320,
            DocumentType::Refund => 330,
            DocumentType::Receipt => 400,
            DocumentType::DonationReceipt => 405,
            DocumentType::PurchaseOrder => 500,
            DocumentType::DepositReceipt => 600,
            DocumentType::DepositWithdrawal => 610,
        }
    }
}

impl TryFrom<u16> for DocumentType {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            10 => DocumentType::PriceQuote,
            100 => DocumentType::Order,
            200 => DocumentType::DeliveryNote,
            210 => DocumentType::ReturnDeliveryNote,
            300 => DocumentType::TransactionAccount,
            305 => DocumentType::TaxInvoice,
            320 => DocumentType::TaxInvoiceReceipt,
            330 => DocumentType::Refund,
            400 => DocumentType::Receipt,
            405 => DocumentType::DonationReceipt,
            500 => DocumentType::PurchaseOrder,
            600 => DocumentType::DepositReceipt,
            610 => DocumentType::DepositWithdrawal,
            other => return Err(format!("unknown document type {other}")),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ils,
    Usd,
    Eur,
    Gbp,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Currency::Ils => "ILS",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentLanguage {
    He,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum PaymentDealType {
    Regular,
    Installments,
    Credit,
    DeferredCharge,
    Other,
}

impl From<PaymentDealType> for u8 {
    fn from(value: PaymentDealType) -> Self {
        match value {
            PaymentDealType::Regular => 1,
            PaymentDealType::Installments => 2,
            PaymentDealType::Credit => 3,
            PaymentDealType::DeferredCharge => 4,
            PaymentDealType::Other => 5,
        }
    }
}

/// Body of a document creation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptRequest {
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub client: ClientRef,
    pub currency: Currency,
    pub lang: DocumentLanguage,
    pub date: Date,
    pub signed: bool,
    pub rounding: bool,
    pub remarks: String,
    pub payment: Vec<PaymentLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientRef {
    pub name: String,
    /// Whether the provider should add the client to its client list.
    pub add: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLine {
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub date: Date,
    pub deal_type: PaymentDealType,
    pub bank_name: String,
    pub bank_branch: String,
    pub bank_account: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub currency: Currency,
}

/// Identifier of a freshly created document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedReceipt {
    pub id: String,
    #[serde(default)]
    pub url: Option<DocumentUrl>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentUrl {
    #[serde(default)]
    pub origin: Option<String>,
}

/// A previously created document, as returned by a document search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub document_date: Date,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub client: ClientSummary,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub payment: Vec<PaymentSummary>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSummary {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentSummary {
    pub date: Date,
}

/// Parameters of a document search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(rename = "type")]
    pub document_types: Vec<DocumentType>,
    pub sort: String,
    pub from_date: Date,
    pub to_date: Date,
}

/// The date to put on a receipt for a payment made on `pay_date`.
///
/// A receipt can't be dated before the newest existing one, so the later of the two
/// dates is used. The provider refuses documents dated [`MAX_RECEIPT_AGE_DAYS`] or more
/// in the past; those are moved forward to [`BACKDATE_DAYS`] before `today`.
pub fn resolve_document_date(pay_date: Date, latest_payment: Option<Date>, today: Date) -> Date {
    let date = latest_payment.map_or(pay_date, |latest| latest.max(pay_date));
    let age = today.signed_duration_since(date).num_days();
    if age >= MAX_RECEIPT_AGE_DAYS as i64 {
        today - Days::new(BACKDATE_DAYS)
    } else {
        date
    }
}

/// Assemble the creation request for a donation `transaction`, dated `document_date`.
///
/// Only a payment line is sent. Income lines are left out as the organisation does not
/// report income per donation.
pub fn build_receipt_request(
    transaction: &Transaction,
    document_date: Date,
    payment_types: &PaymentTypeRules,
) -> ReceiptRequest {
    let (bank_name, bank_branch, bank_account) = match &transaction.bank {
        Some(bank) => (
            banks::bank_name(bank.code).to_owned(),
            bank.branch.clone(),
            bank.account.clone(),
        ),
        None => (banks::UNKNOWN_BANK.to_owned(), String::new(), String::new()),
    };

    ReceiptRequest {
        document_type: transaction.document_type,
        client: ClientRef {
            name: transaction.client_name.clone(),
            add: false,
        },
        currency: transaction.currency,
        lang: DocumentLanguage::He,
        date: document_date,
        signed: true,
        rounding: false,
        remarks: transaction.comments.clone(),
        payment: vec![PaymentLine {
            payment_type: payment_types.classify(&transaction.comments),
            date: transaction.pay_date,
            deal_type: PaymentDealType::Regular,
            bank_name,
            bank_branch,
            bank_account,
            price: transaction.amount,
            currency: transaction.currency,
        }],
    }
}
