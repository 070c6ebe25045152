pub mod banks;
pub mod dates;
pub mod payment_type;
pub mod provider;
pub mod receipt;
pub mod reconcile;
mod sorting;
pub mod transaction;

pub type Decimal = rust_decimal::Decimal;
pub type Date = chrono::NaiveDate;

pub use anyhow::Result;
pub use provider::ReceiptProvider;
pub use transaction::{FormatError, Transaction};

use anyhow::Context as _;
use std::path::Path;

/// Read all transactions from a bank export file.
pub fn read_transactions(file: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let file = file.as_ref();
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read bank export: {}", file.display()))?;
    parse_transactions(&contents)
        .with_context(|| format!("Failed to parse bank export: {}", file.display()))
}

/// Parse the text of a bank export into transactions, ordered by their normalized line.
///
/// Header, comment and blank lines are skipped. The first malformed data line aborts
/// the whole export.
pub fn parse_transactions(contents: &str) -> Result<Vec<Transaction>> {
    let normalized = dates::normalize_dates(contents);
    let mut lines: Vec<&str> = normalized.lines().collect();
    sorting::sort_lines(&mut lines);

    let mut transactions = Vec::new();
    for line in lines {
        if let Some(transaction) = Transaction::from_line(line)
            .with_context(|| format!("Malformed bank record: {line:?}"))?
        {
            transactions.push(transaction);
        }
    }
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
# exported from the bank
תאריך\tשם\tבנק\tסניף\tחשבון\tסכום\tהערות
29/12/2022\tישראל ישראלי\t10\t123\t3434343\t200.00\tהעברה לעמותה
21/12/2022\tAmd Levi\t12\t345\t0\t50.50\tbit העברה נכנסת

18/12/2022\tדנה כהן\t20\t567\t987654\t333.00\tUS PERSON
";

    #[test]
    fn parse_skips_headers_and_sorts_by_date() {
        let transactions = parse_transactions(EXPORT).unwrap();
        let summary: Vec<String> = transactions
            .iter()
            .map(|t| format!("{} {} {}", t.pay_date, t.amount, t.client_name))
            .collect();

        insta::assert_snapshot!(summary.join("\n"), @r"
        2022-12-18 333.00 דנה כהן
        2022-12-21 50.50 Amd Levi
        2022-12-29 200.00 ישראל ישראלי
        ");
    }

    #[test]
    fn parse_aborts_on_first_malformed_line() {
        let export = "29/12/2022\tX\t10\t1\t2\t200.00\n19/12/2022\tY\t17\t456\t12345678\t300.00\n";
        let error = parse_transactions(export).unwrap_err();

        assert!(error.to_string().contains("Malformed bank record"));
        assert!(matches!(
            error.root_cause().downcast_ref::<FormatError>(),
            Some(FormatError::FieldCount { found: 6 })
        ));
    }

    #[test]
    fn parse_skips_title_line() {
        let export = "2023 donations report\n29/12/2022\tX\t10\t1\t2\t200.00\tY\n";
        let transactions = parse_transactions(export).unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].client_name, "X");
    }

    #[test]
    fn parse_empty_export() {
        assert!(parse_transactions("").unwrap().is_empty());
    }
}
