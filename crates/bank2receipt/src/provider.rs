use crate::Result;
use crate::receipt::{CreatedReceipt, ReceiptRequest, ReceiptSummary, SearchQuery};

/// The accounting service receipts are kept in.
///
/// Calls are made one at a time; nothing is retried.
#[allow(async_fn_in_trait)]
pub trait ReceiptProvider {
    /// Fetch one page of existing documents.
    async fn search_receipts(&self, query: &SearchQuery) -> Result<Vec<ReceiptSummary>>;

    /// Create and sign a new document.
    async fn create_receipt(&self, request: &ReceiptRequest) -> Result<CreatedReceipt>;
}
