use std::collections::HashMap;

use crate::{Date, Decimal, Transaction};

type BucketKey = (Date, Decimal, String);

/// Whether `candidate` would produce the same receipt as `existing`.
///
/// This is the authoritative check. Bank, branch and account are not part of it, so
/// two donations by the same client on the same day with the same amount and comments
/// are indistinguishable.
pub fn is_same_receipt(existing: &Transaction, candidate: &Transaction) -> bool {
    existing.signature() == candidate.signature()
}

/// Transactions bucketed by date, amount and client.
///
/// Looking up a bucket narrows the candidates down; [`is_same_receipt`] decides.
#[derive(Debug, Default)]
pub struct SignatureIndex {
    buckets: HashMap<BucketKey, Vec<Transaction>>,
    len: usize,
}

fn bucket_key(transaction: &Transaction) -> BucketKey {
    let (date, amount, client_name) = transaction.hash_key();
    (date, amount, client_name.to_owned())
}

impl SignatureIndex {
    /// Add a transaction, returning `false` if an identical one is already indexed.
    pub fn insert(&mut self, transaction: Transaction) -> bool {
        let bucket = self.buckets.entry(bucket_key(&transaction)).or_default();
        if bucket
            .iter()
            .any(|existing| is_same_receipt(existing, &transaction))
        {
            return false;
        }
        bucket.push(transaction);
        self.len += 1;
        true
    }

    /// Indexed transactions sharing the hash key of `transaction`.
    pub fn possible_matches(&self, transaction: &Transaction) -> &[Transaction] {
        self.buckets
            .get(&bucket_key(transaction))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn find(&self, transaction: &Transaction) -> Option<&Transaction> {
        self.possible_matches(transaction)
            .iter()
            .find(|existing| is_same_receipt(existing, transaction))
    }

    pub fn contains(&self, transaction: &Transaction) -> bool {
        self.find(transaction).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.buckets.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Transaction {
        Transaction::from_line(line).unwrap().unwrap()
    }

    #[test]
    fn match_identical() {
        let existing = parse("2022-12-29\tX\t10\t123\t3434343\t200.00\tY");
        let candidate = parse("2022-12-29\tX\t10\t123\t3434343\t200.00\tY");
        assert!(is_same_receipt(&existing, &candidate));
    }

    #[test]
    fn match_ignores_bank_details() {
        let existing = parse("2022-12-29\tX\t10\t123\t3434343\t200.00\tY");
        let candidate = parse("2022-12-29\tX\t12\t1\t99\t200.00\tY");
        assert!(is_same_receipt(&existing, &candidate));
    }

    #[test]
    fn match_compares_amounts_numerically() {
        let existing = parse("2022-12-29\tX\t10\t123\t3434343\t200\tY");
        let candidate = parse("2022-12-29\tX\t10\t123\t3434343\t200.00\tY");
        assert!(is_same_receipt(&existing, &candidate));
    }

    #[test]
    fn dont_match_different_fields() {
        let existing = parse("2022-12-29\tX\t10\t123\t3434343\t200.00\tY");
        for candidate in [
            "2022-12-28\tX\t10\t123\t3434343\t200.00\tY",
            "2022-12-29\tZ\t10\t123\t3434343\t200.00\tY",
            "2022-12-29\tX\t10\t123\t3434343\t201.00\tY",
            "2022-12-29\tX\t10\t123\t3434343\t200.00\tY2",
            "2022-12-29\tX\t10\t123\t3434343\t200.00\t",
        ] {
            assert!(!is_same_receipt(&existing, &parse(candidate)), "{candidate}");
        }
    }

    #[test]
    fn dont_match_different_document_type() {
        let existing = parse("2022-12-29\tX\t10\t123\t3434343\t200.00\tY");
        let mut candidate = existing.clone();
        candidate.document_type = crate::receipt::DocumentType::Receipt;
        assert!(!is_same_receipt(&existing, &candidate));
    }

    #[test]
    fn index_prefilters_on_hash_key() {
        let mut index = SignatureIndex::default();
        assert!(index.insert(parse("2022-12-29\tX\t10\t123\t3434343\t200.00\tY")));
        assert!(index.insert(parse("2022-12-29\tX\t10\t123\t3434343\t200.00\tW")));
        assert!(index.insert(parse("2022-12-30\tX\t10\t123\t3434343\t200.00\tY")));

        let other_comments = parse("2022-12-29\tX\t10\t123\t3434343\t200.00\tZ");
        assert_eq!(index.possible_matches(&other_comments).len(), 2);
        assert!(!index.contains(&other_comments));

        let unrelated = parse("2022-12-29\tQ\t10\t123\t3434343\t200.00\tY");
        assert!(index.possible_matches(&unrelated).is_empty());
        assert!(!index.contains(&unrelated));

        let duplicate = parse("2022-12-29\tX\t20\t1\t2\t200\tW");
        assert!(index.contains(&duplicate));
    }

    #[test]
    fn index_keeps_one_of_each() {
        let mut index = SignatureIndex::default();
        assert!(index.is_empty());
        assert!(index.insert(parse("2022-12-29\tX\t10\t123\t3434343\t200.00\tY")));
        assert!(!index.insert(parse("2022-12-29\tX\t10\t123\t3434343\t200.00\tY")));
        assert_eq!(index.len(), 1);
        assert_eq!(index.iter().count(), 1);
    }
}
