//! Deciding which bank transactions still need a receipt, and creating those receipts.

mod matching;

pub use matching::{SignatureIndex, is_same_receipt};

use anyhow::Context as _;
use chrono::Days;

use crate::payment_type::PaymentTypeRules;
use crate::receipt::{
    CreatedReceipt, ReceiptSummary, SearchQuery, build_receipt_request, resolve_document_date,
};
use crate::transaction::DEFAULT_DOCUMENT_TYPE;
use crate::{Date, ReceiptProvider, Result, Transaction};

/// Existing receipts older than this are not looked at.
pub const SNAPSHOT_DAYS: u64 = 100;
pub const SEARCH_PAGE_SIZE: u32 = 50;
/// The provider's paging is unreliable enough that a fixed cap is used instead of
/// following its totals.
pub const SEARCH_MAX_PAGES: u32 = 6;
const SEARCH_SORT: &str = "documentDate";

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileItem {
    AlreadyRecorded(Transaction),
    NeedsReceipt {
        transaction: Transaction,
        document_date: Date,
    },
}

impl ReconcileItem {
    pub fn transaction(&self) -> &Transaction {
        match self {
            ReconcileItem::AlreadyRecorded(transaction)
            | ReconcileItem::NeedsReceipt { transaction, .. } => transaction,
        }
    }
}

/// The receipts already at the provider, as transactions.
#[derive(Debug, Default)]
pub struct Snapshot {
    index: SignatureIndex,
    latest_payment: Option<Date>,
}

impl Snapshot {
    pub fn from_receipts<'a>(receipts: impl IntoIterator<Item = &'a ReceiptSummary>) -> Self {
        let mut snapshot = Snapshot::default();
        for receipt in receipts {
            snapshot.insert(Transaction::from_receipt(receipt));
        }
        snapshot
    }

    pub fn insert(&mut self, transaction: Transaction) {
        self.latest_payment = self.latest_payment.max(Some(transaction.pay_date));
        self.index.insert(transaction);
    }

    /// Payment date of the newest existing receipt, `None` before any was seen.
    pub fn latest_payment(&self) -> Option<Date> {
        self.latest_payment
    }

    pub fn contains(&self, transaction: &Transaction) -> bool {
        self.index.contains(transaction)
    }

    pub fn possible_matches(&self, transaction: &Transaction) -> &[Transaction] {
        self.index.possible_matches(transaction)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Existing receipts ordered by payment date.
    pub fn sorted(&self) -> Vec<&Transaction> {
        let mut transactions: Vec<_> = self.index.iter().collect();
        transactions.sort_by(|a, b| {
            a.pay_date
                .cmp(&b.pay_date)
                .then_with(|| a.to_line().cmp(&b.to_line()))
        });
        transactions
    }
}

pub struct ReconcileConfig {
    today: Date,
    document_date: Option<Date>,
    payment_types: PaymentTypeRules,
}

impl ReconcileConfig {
    pub fn new(today: Date) -> Self {
        ReconcileConfig {
            today,
            document_date: None,
            payment_types: PaymentTypeRules::default(),
        }
    }

    /// Date every new receipt gets, instead of one derived from its payment.
    pub fn with_document_date(mut self, document_date: Option<Date>) -> Self {
        self.document_date = document_date;
        self
    }

    pub fn with_payment_types(mut self, payment_types: PaymentTypeRules) -> Self {
        self.payment_types = payment_types;
        self
    }

    pub fn today(&self) -> Date {
        self.today
    }

    pub fn search_query(&self, page: u32) -> SearchQuery {
        SearchQuery {
            page,
            page_size: SEARCH_PAGE_SIZE,
            document_types: vec![DEFAULT_DOCUMENT_TYPE],
            sort: SEARCH_SORT.to_owned(),
            from_date: self.today - Days::new(SNAPSHOT_DAYS),
            to_date: self.today,
        }
    }

    /// Download the receipts of the last [`SNAPSHOT_DAYS`] days.
    ///
    /// Pages are requested until one comes back empty or [`SEARCH_MAX_PAGES`] were read.
    pub async fn fetch_snapshot(&self, provider: &impl ReceiptProvider) -> Result<Snapshot> {
        let mut snapshot = Snapshot::default();

        for page in 1..=SEARCH_MAX_PAGES {
            tracing::info!("downloading existing receipts, page {page}/{SEARCH_MAX_PAGES}");
            let receipts = provider
                .search_receipts(&self.search_query(page))
                .await
                .with_context(|| format!("Failed to search existing receipts (page {page})"))?;
            if receipts.is_empty() {
                break;
            }
            tracing::debug!("page {page}: {} receipts", receipts.len());
            for receipt in &receipts {
                snapshot.insert(Transaction::from_receipt(receipt));
            }
        }

        tracing::info!(
            "found {} existing receipts, latest payment {}",
            snapshot.len(),
            snapshot
                .latest_payment()
                .map_or_else(|| "none".to_owned(), |date| date.to_string())
        );
        Ok(snapshot)
    }

    /// Classify each candidate, in order, as already recorded or needing a receipt.
    pub fn reconcile(
        &self,
        candidates: impl IntoIterator<Item = Transaction>,
        snapshot: &Snapshot,
    ) -> Vec<ReconcileItem> {
        candidates
            .into_iter()
            .map(|transaction| {
                if snapshot.contains(&transaction) {
                    tracing::debug!("already recorded: {transaction}");
                    return ReconcileItem::AlreadyRecorded(transaction);
                }
                let document_date = self.document_date.unwrap_or_else(|| {
                    resolve_document_date(
                        transaction.pay_date,
                        snapshot.latest_payment(),
                        self.today,
                    )
                });
                ReconcileItem::NeedsReceipt {
                    transaction,
                    document_date,
                }
            })
            .collect()
    }

    /// Create a receipt for every item that needs one.
    ///
    /// Stops at the first failure; receipts created before it stay created.
    pub async fn apply(
        &self,
        provider: &impl ReceiptProvider,
        items: &[ReconcileItem],
    ) -> Result<Vec<CreatedReceipt>> {
        let mut created = Vec::new();
        for item in items {
            let ReconcileItem::NeedsReceipt {
                transaction,
                document_date,
            } = item
            else {
                continue;
            };

            let request = build_receipt_request(transaction, *document_date, &self.payment_types);
            let receipt = provider.create_receipt(&request).await.with_context(|| {
                format!(
                    "Failed to create receipt for {transaction} ({} receipts were created before)",
                    created.len()
                )
            })?;
            tracing::info!("created receipt {} dated {document_date}: {transaction}", receipt.id);
            created.push(receipt);
        }
        Ok(created)
    }
}
