use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::{LedgerService, LoggingObserver, init_tracing};
use crate::domain::{BalanceObserver, format_cents};
use crate::io::{DataFormat, ImportResult, IoOutcome};

/// finledger - in-memory personal finance ledger
#[derive(Parser)]
#[command(name = "finledger")]
#[command(about = "Load, inspect and convert personal finance ledgers (CSV/JSON)")]
#[command(version)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log filter directive
    #[arg(long, global = true, env = "FINLEDGER_LOG", default_value = "finledger=info")]
    pub log: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a file into an empty ledger and print its contents
    Summary {
        /// Input file (.csv or .json)
        input: PathBuf,

        /// Input format (defaults to the file extension)
        #[arg(short, long)]
        format: Option<DataFormat>,

        /// Net balance from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Net balance up to this date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,
    },

    /// Import a file and export the resulting ledger
    Convert {
        /// Input file (.csv or .json)
        input: PathBuf,

        /// Output file (.csv or .json)
        output: PathBuf,

        /// Input format (defaults to the input extension)
        #[arg(long)]
        input_format: Option<DataFormat>,

        /// Output format (defaults to the output extension)
        #[arg(long)]
        output_format: Option<DataFormat>,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let directive = if self.verbose {
            "finledger=debug"
        } else {
            self.log.as_str()
        };
        init_tracing(directive);

        let observers: Vec<Arc<dyn BalanceObserver>> = vec![Arc::new(LoggingObserver)];
        let mut service = LedgerService::with_observers(observers);

        match self.command {
            Commands::Summary {
                input,
                format,
                from,
                to,
            } => {
                let format = resolve_format(format, &input)?;
                let Some(result) = import_file(&mut service, format, &input)? else {
                    return Ok(());
                };
                print_import_result(&result);

                let start = from
                    .as_deref()
                    .map(parse_day)
                    .transpose()?
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                let end = to
                    .as_deref()
                    .map(parse_day)
                    .transpose()?
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                print_ledger(&service, start, end)?;
            }

            Commands::Convert {
                input,
                output,
                input_format,
                output_format,
            } => {
                let input_format = resolve_format(input_format, &input)?;
                let output_format = resolve_format(output_format, &output)?;
                let Some(result) = import_file(&mut service, input_format, &input)? else {
                    return Ok(());
                };
                print_import_result(&result);

                match output_format.exporter().export(&service, &output)? {
                    IoOutcome::Completed(summary) => println!(
                        "Exported {} accounts, {} categories, {} operations to {}",
                        summary.accounts,
                        summary.categories,
                        summary.operations,
                        summary.path.display()
                    ),
                    IoOutcome::Rejected(issue) => println!("{}", issue),
                }
            }
        }

        Ok(())
    }
}

fn resolve_format(explicit: Option<DataFormat>, path: &Path) -> Result<DataFormat> {
    explicit
        .or_else(|| DataFormat::from_path(path))
        .ok_or_else(|| {
            anyhow!(
                "Cannot infer format of '{}'. Use a .csv/.json extension or pass a format",
                path.display()
            )
        })
}

fn import_file(
    service: &mut LedgerService,
    format: DataFormat,
    path: &Path,
) -> Result<Option<ImportResult>> {
    let outcome = format
        .importer()
        .import(path, service)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    match outcome {
        IoOutcome::Completed(result) => Ok(Some(result)),
        IoOutcome::Rejected(issue) => {
            println!("{}", issue);
            Ok(None)
        }
    }
}

fn parse_day(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", s))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn print_import_result(result: &ImportResult) {
    println!(
        "Imported {} record(s), skipped {}, failed {}",
        result.imported,
        result.skipped,
        result.errors.len()
    );
    for error in &result.errors {
        match &error.field {
            Some(field) => println!("  record {} ({}): {}", error.record, field, error.error),
            None => println!("  record {}: {}", error.record, error.error),
        }
    }
}

fn print_ledger(service: &LedgerService, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    println!();
    println!("{:<24} {:>12}", "ACCOUNT", "BALANCE");
    println!("{}", "-".repeat(37));
    for account in service.bank_accounts() {
        println!("{:<24} {:>12}", account.name, format_cents(account.balance()));
    }

    println!();
    println!("{:<24} {:<8}", "CATEGORY", "TYPE");
    println!("{}", "-".repeat(33));
    for category in service.categories() {
        println!("{:<24} {:<8}", category.name, category.entity_type);
    }

    println!();
    println!(
        "{:<10} {:<8} {:>12} {:<16} {}",
        "DATE", "TYPE", "AMOUNT", "CATEGORY", "DESCRIPTION"
    );
    println!("{}", "-".repeat(64));
    for op in service.operations() {
        println!(
            "{:<10} {:<8} {:>12} {:<16} {}",
            op.date.format("%Y-%m-%d"),
            op.entity_type,
            format_cents(op.amount),
            op.category.name,
            op.description
        );
    }

    println!();
    println!(
        "Net balance: {}",
        format_cents(service.calculate_net_balance(start, end)?)
    );
    Ok(())
}
