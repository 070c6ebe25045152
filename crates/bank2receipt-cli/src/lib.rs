mod config;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{Result, ensure};
use bank2receipt::reconcile::ReconcileConfig;
use bank2receipt::{Date, ReceiptProvider, Transaction};
use chrono::Datelike as _;
use clap::{CommandFactory as _, Parser, Subcommand};
use greeninvoice_client::{Client, Environment};

use config::Config;
use report::Summary;

/// Bank report used by the `test` command.
const SAMPLE_REPORT: &str = include_str!("sample_report.tsv");

const DEFAULT_LOG_FILTER: &str = "bank2receipt=info,greeninvoice_client=info";

#[derive(Parser)]
#[command(
    name = "bank2receipt",
    about = "Create GreenInvoice donation receipts from bank reports",
    long_about = "Create GreenInvoice donation receipts from bank reports.\n\n\
        Runs against the sandbox account unless the `real` command is used. \
        Transactions that already have a receipt are skipped."
)]
#[command(disable_help_subcommand = true)]
struct Args {
    /// Configuration file [default: ~/.bank2receipt.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Date every new receipt gets (YYYY-MM-DD)
    #[arg(long, global = true)]
    date: Option<Date>,

    /// Show which receipts would be created without creating them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Tab separated bank reports
    files: Vec<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create receipts in the production account
    Real {
        /// Tab separated bank reports
        files: Vec<PathBuf>,
    },
    /// Process a built-in sample report against the sandbox
    Test,
    /// List the receipts created in the last 100 days
    Search {
        /// Search the production account instead of the sandbox
        #[arg(long)]
        real: bool,
    },
}

pub async fn run(args: impl IntoIterator<Item = String>) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    clap_complete::CompleteEnv::with_factory(Args::command).complete();

    let args = Args::parse_from(args);
    let today = chrono::Local::now().date_naive();
    if let Some(date) = args.date {
        validate_document_date(date, today)?;
    }

    match args.command {
        None => process_files(&args, Environment::Sandbox, &args.files, today).await,
        Some(Commands::Real { ref files }) => {
            process_files(&args, Environment::Production, files, today).await
        }
        Some(Commands::Test) => {
            let config = Config::load(args.config.as_deref())?;
            let client = connect(&config, Environment::Sandbox).await?;
            let reconcile = reconcile_config(&config, &args, today);
            let transactions = bank2receipt::parse_transactions(SAMPLE_REPORT)?;
            process(&client, &reconcile, "sample report", transactions, args.dry_run).await?;
            Ok(())
        }
        Some(Commands::Search { real }) => {
            let environment = if real {
                Environment::Production
            } else {
                Environment::Sandbox
            };
            let config = Config::load(args.config.as_deref())?;
            let client = connect(&config, environment).await?;
            let snapshot = reconcile_config(&config, &args, today)
                .fetch_snapshot(&client)
                .await?;
            report::print_snapshot(&snapshot);
            Ok(())
        }
    }
}

/// Check an operator supplied receipt date.
fn validate_document_date(date: Date, today: Date) -> Result<()> {
    ensure!(
        (2020..=2039).contains(&date.year()),
        "Invalid receipt date {date}: the year must be between 2020 and 2039"
    );
    ensure!(
        date <= today,
        "Invalid receipt date {date}: it is in the future"
    );
    Ok(())
}

/// The paths that are existing files; everything else is skipped with a warning.
fn existing_files(paths: &[PathBuf]) -> Vec<&Path> {
    paths
        .iter()
        .filter(|path| {
            let is_file = path.is_file();
            if !is_file {
                tracing::warn!("skipping {}: not a file", path.display());
            }
            is_file
        })
        .map(PathBuf::as_path)
        .collect()
}

async fn process_files(
    args: &Args,
    environment: Environment,
    paths: &[PathBuf],
    today: Date,
) -> Result<()> {
    let files = existing_files(paths);
    if files.is_empty() {
        println!("{}", Args::command().render_usage());
        tracing::warn!("no bank files provided");
        return Ok(());
    }

    let config = Config::load(args.config.as_deref())?;
    let client = connect(&config, environment).await?;
    let reconcile = reconcile_config(&config, args, today);

    let mut created = 0;
    for file in files {
        let transactions = bank2receipt::read_transactions(file)?;
        let summary = process(
            &client,
            &reconcile,
            &file.display().to_string(),
            transactions,
            args.dry_run,
        )
        .await?;
        created += summary.created;
    }
    tracing::info!("{created} receipts created in {environment}");

    Ok(())
}

async fn connect(config: &Config, environment: Environment) -> Result<Client> {
    let account = config.account(environment)?;
    let url = config.url(environment)?;
    tracing::info!("connecting to the {environment} account at {url}");
    Client::connect(url, &account.credentials()).await
}

fn reconcile_config(config: &Config, args: &Args, today: Date) -> ReconcileConfig {
    ReconcileConfig::new(today)
        .with_document_date(args.date)
        .with_payment_types(config.payment_types())
}

/// Reconcile one bank report against a fresh snapshot of the existing receipts.
async fn process(
    provider: &impl ReceiptProvider,
    reconcile: &ReconcileConfig,
    source: &str,
    transactions: Vec<Transaction>,
    dry_run: bool,
) -> Result<Summary> {
    tracing::info!("processing {source}: {} transactions", transactions.len());
    let snapshot = reconcile.fetch_snapshot(provider).await?;
    let items = reconcile.reconcile(transactions, &snapshot);
    report::print_plan(source, &items);

    let created = if dry_run {
        0
    } else {
        reconcile.apply(provider, &items).await?.len()
    };

    let summary = Summary::new(&items, created);
    report::print_summary(&summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank2receipt::receipt::{CreatedReceipt, ReceiptRequest, ReceiptSummary, SearchQuery};
    use std::cell::RefCell;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("bank2receipt").chain(args.iter().copied()))
    }

    #[test]
    fn parse_sandbox_run() {
        let args = parse(&["--date", "2023-01-06", "a.tsv", "b.tsv"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.date, Some(date("2023-01-06")));
        assert_eq!(args.files, [PathBuf::from("a.tsv"), PathBuf::from("b.tsv")]);
    }

    #[test]
    fn parse_real_run() {
        let args = parse(&["real", "--dry-run", "a.tsv"]).unwrap();
        assert!(args.dry_run);
        let Some(Commands::Real { files }) = args.command else {
            panic!("expected the real command");
        };
        assert_eq!(files, [PathBuf::from("a.tsv")]);
    }

    #[test]
    fn parse_search() {
        let args = parse(&["--config", "conf.toml", "search", "--real"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("conf.toml")));
        assert!(matches!(args.command, Some(Commands::Search { real: true })));
    }

    #[test]
    fn parse_invalid_date() {
        assert!(parse(&["--date", "06/01/2023", "a.tsv"]).is_err());
    }

    #[test]
    fn document_date_validation() {
        let today = date("2023-02-15");
        assert!(validate_document_date(date("2023-01-06"), today).is_ok());
        assert!(validate_document_date(today, today).is_ok());

        let error = validate_document_date(date("2023-02-16"), today).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid receipt date 2023-02-16: it is in the future"
        );
        let error = validate_document_date(date("2019-12-31"), today).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid receipt date 2019-12-31: the year must be between 2020 and 2039"
        );
    }

    #[test]
    fn skip_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("report.tsv");
        std::fs::write(&report, "").unwrap();

        let paths = [report.clone(), dir.path().join("missing.tsv"), dir.path().to_owned()];
        assert_eq!(existing_files(&paths), [report.as_path()]);
    }

    #[tokio::test]
    async fn no_files_exits_before_loading_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("missing.toml");
        let missing = dir.path().join("missing.tsv");
        let args = parse(&[
            "--config",
            config.to_str().unwrap(),
            missing.to_str().unwrap(),
        ])
        .unwrap();

        process_files(&args, Environment::Sandbox, &args.files, date("2023-02-15"))
            .await
            .unwrap();
        // the config is only read once there is a file to process
        assert!(Config::load(Some(&config)).is_err());
    }

    #[test]
    fn sample_report_parses() {
        let transactions = bank2receipt::parse_transactions(SAMPLE_REPORT).unwrap();
        let lines: Vec<_> = transactions.iter().map(ToString::to_string).collect();
        insta::assert_snapshot!(lines.join("\n"), @r"
        2021-12-18     222.00 ILS יוסי מזרחי (תרומה חודשית קבועה)
        2022-12-18     333.00 ILS רונית אברהם (US PERSON תרומה)
        2022-12-19     300.00 ILS דנה כהן
        2022-12-21      50.50 ILS Amd לוי (bit העברה נכנסת)
        2022-12-29     200.00 ILS ישראל ישראלי (העברה לעמותה)
        2022-12-29      30.00 ILS משה כהן לוי (תרומה במזומן)
        2026-12-18     333.00 ILS רונית אברהם (תרומה חודשית קבועה)
        ");
    }

    #[derive(Default)]
    struct FakeProvider {
        existing: Vec<ReceiptSummary>,
        created: RefCell<Vec<ReceiptRequest>>,
    }

    impl ReceiptProvider for FakeProvider {
        async fn search_receipts(&self, query: &SearchQuery) -> Result<Vec<ReceiptSummary>> {
            Ok(match query.page {
                1 => self.existing.clone(),
                _ => Vec::new(),
            })
        }

        async fn create_receipt(&self, request: &ReceiptRequest) -> Result<CreatedReceipt> {
            let mut created = self.created.borrow_mut();
            created.push(request.clone());
            Ok(CreatedReceipt {
                id: format!("doc-{}", created.len()),
                url: None,
            })
        }
    }

    #[tokio::test]
    async fn process_sample_report() {
        let reconcile = ReconcileConfig::new(date("2023-02-15"));
        let transactions = bank2receipt::parse_transactions(SAMPLE_REPORT).unwrap();
        let provider = FakeProvider::default();

        let summary = process(&provider, &reconcile, "sample", transactions, false)
            .await
            .unwrap();

        assert_eq!(
            summary,
            Summary {
                already_recorded: 0,
                created: 7,
                skipped: 0,
            }
        );
        let created = provider.created.borrow();
        let dates: Vec<_> = created.iter().map(|request| request.date.to_string()).collect();
        assert_eq!(
            dates,
            [
                "2023-01-06",
                "2023-01-06",
                "2023-01-06",
                "2023-01-06",
                "2022-12-29",
                "2022-12-29",
                "2026-12-18",
            ]
        );
    }

    #[tokio::test]
    async fn process_dry_run() {
        let reconcile = ReconcileConfig::new(date("2023-02-15"));
        let transactions = bank2receipt::parse_transactions(SAMPLE_REPORT).unwrap();
        let provider = FakeProvider::default();

        let summary = process(&provider, &reconcile, "sample", transactions, true)
            .await
            .unwrap();

        assert_eq!(summary.skipped, 7);
        assert!(provider.created.borrow().is_empty());
    }
}
