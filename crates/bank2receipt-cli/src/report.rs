use anstyle::{AnsiColor, Color, Style};
use bank2receipt::reconcile::{ReconcileItem, Snapshot};

const RECORDED_STYLE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
const NEW_STYLE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub already_recorded: usize,
    pub created: usize,
    /// Receipts that were needed but not created, in a dry run.
    pub skipped: usize,
}

impl Summary {
    pub fn new(items: &[ReconcileItem], created: usize) -> Self {
        let already_recorded = items
            .iter()
            .filter(|item| matches!(item, ReconcileItem::AlreadyRecorded(_)))
            .count();
        let needed = items.len() - already_recorded;
        Summary {
            already_recorded,
            created,
            skipped: needed.saturating_sub(created),
        }
    }
}

fn describe(item: &ReconcileItem) -> String {
    match item {
        ReconcileItem::AlreadyRecorded(transaction) => format!("recorded {transaction}"),
        ReconcileItem::NeedsReceipt {
            transaction,
            document_date,
        } => format!("new      {transaction} -> receipt dated {document_date}"),
    }
}

pub fn print_plan(source: &str, items: &[ReconcileItem]) {
    let reset = Style::new();
    println!("{}━━━ {source} ━━━{reset}", Style::new().bold());
    for item in items {
        let style = match item {
            ReconcileItem::AlreadyRecorded(_) => RECORDED_STYLE,
            ReconcileItem::NeedsReceipt { .. } => NEW_STYLE,
        };
        println!("{style}{}{reset}", describe(item));
    }
    println!();
}

pub fn print_summary(summary: &Summary) {
    let reset = Style::new();
    println!("{}━━━ Summary ━━━{reset}", Style::new().bold());
    println!("  {NEW_STYLE}{}{reset} receipt(s) created", summary.created);
    println!(
        "  {RECORDED_STYLE}{}{reset} transaction(s) already recorded",
        summary.already_recorded
    );
    if summary.skipped > 0 {
        println!(
            "  {} receipt(s) not created (dry run)",
            summary.skipped
        );
    }
    println!();
}

pub fn print_snapshot(snapshot: &Snapshot) {
    let reset = Style::new();
    if snapshot.is_empty() {
        println!("No existing receipts found");
        return;
    }

    for transaction in snapshot.sorted() {
        println!("{transaction}");
    }
    println!();
    println!("{}━━━ Summary ━━━{reset}", Style::new().bold());
    println!(
        "  {RECORDED_STYLE}{}{reset} existing receipt(s)",
        snapshot.len()
    );
    if let Some(latest) = snapshot.latest_payment() {
        println!("  latest payment on {latest}");
    }
}
