//! Batch processing command for multiple files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use receipta_core::invoice::ExtractionEngine;
use receipta_core::models::expense::{Expense, ExpenseCategory, ExpenseFilter};

use super::config::load_config;
use super::process::{extract_file, format_expense, resolve_category, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Category assigned to every processed document
    #[arg(long)]
    category: Option<String>,

    /// Notes attached to every processed document
    #[arg(long)]
    notes: Option<String>,

    #[command(flatten)]
    filter: FilterArgs,
}

/// Summary filter, applied to the booked expenses.
#[derive(Args)]
struct FilterArgs {
    /// Only summarize transactions on or after this date (YYYY-MM-DD)
    #[arg(long)]
    since: Option<NaiveDate>,

    /// Only summarize transactions on or before this date (YYYY-MM-DD)
    #[arg(long)]
    until: Option<NaiveDate>,

    /// Minimum total after VAT
    #[arg(long)]
    min_amount: Option<Decimal>,

    /// Maximum total after VAT
    #[arg(long)]
    max_amount: Option<Decimal>,

    /// Only summarize this category
    #[arg(long)]
    only_category: Option<String>,

    /// Vendor name substring (case-insensitive)
    #[arg(long)]
    business: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> anyhow::Result<ExpenseFilter> {
        let category = self
            .only_category
            .as_deref()
            .map(|name| {
                ExpenseCategory::from_str(name)
                    .ok_or_else(|| anyhow::anyhow!("Unknown category: {}", name))
            })
            .transpose()?;

        Ok(ExpenseFilter {
            start_date: self.since,
            end_date: self.until,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            category,
            business_name: self.business.clone(),
        })
    }
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    expense: Option<Expense>,
    warnings: usize,
    error: Option<String>,
    processing_time_ms: u64,
}

/// Row of the summary CSV.
#[derive(Serialize)]
struct SummaryRow<'a> {
    filename: &'a str,
    status: &'static str,
    category: &'a str,
    document_type: &'a str,
    business_name: &'a str,
    business_vat_number: &'a str,
    amount_before_vat: String,
    amount_after_vat: String,
    transaction_date: String,
    invoice_number: &'a str,
    warnings: usize,
    processing_time_ms: u64,
    error: &'a str,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let category = resolve_category(args.category.as_deref(), &config)?;
    let notes = args.notes.clone().or_else(|| config.expenses.notes.clone());
    let filter = args.filter.to_filter()?;

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "txt" | "text" | "json")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let engine = Arc::new(ExtractionEngine::from_config(config.extraction.clone())?);
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let engine = Arc::clone(&engine);
        let pb = overall_pb.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let result = extract_file(&path, &engine);
            pb.inc(1);
            (path, result, file_start.elapsed().as_millis() as u64)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    let mut pending = handles.into_iter();

    while let Some(handle) = pending.next() {
        let (path, result, processing_time_ms) = handle.await?;

        match result {
            Ok(extraction) => {
                results.push(ProcessResult {
                    path,
                    warnings: extraction.warnings.len(),
                    expense: Some(Expense::from_invoice(extraction.invoice, category, notes.clone())),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        expense: None,
                        warnings: 0,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    cancel_pending(pending).await;
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }
    }

    overall_pb.finish_and_clear();

    let successful: Vec<_> = results.iter().filter(|r| r.expense.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(expense) = &result.expense {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("document");

                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));
                fs::write(&output_path, format_expense(expense, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    let matched: Vec<&ProcessResult> = successful
        .iter()
        .copied()
        .filter(|r| r.expense.as_ref().is_some_and(|e| filter.matches(e)))
        .collect();

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, matched.iter().copied().chain(failed.iter().copied()))?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let total: Decimal = matched
        .iter()
        .filter_map(|r| r.expense.as_ref())
        .map(|e| e.amount_after_vat)
        .sum();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );
    if !filter.is_empty() {
        println!("   {} matching the filter", matched.len());
    }
    println!("   Total after VAT: {}", total);

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Cancel tasks that have not started and wait for the running ones.
async fn cancel_pending<T>(handles: impl Iterator<Item = JoinHandle<T>>) {
    let handles: Vec<_> = handles.collect();
    for handle in &handles {
        handle.abort();
    }
    for handle in handles {
        let _ = handle.await;
    }
}

fn write_summary<'a>(
    path: &Path,
    results: impl IntoIterator<Item = &'a ProcessResult>,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        let row = match &result.expense {
            Some(expense) => SummaryRow {
                filename,
                status: "success",
                category: expense.category.label(),
                document_type: expense.document_type.label(),
                business_name: &expense.business_name,
                business_vat_number: &expense.business_vat_number,
                amount_before_vat: expense.amount_before_vat.to_string(),
                amount_after_vat: expense.amount_after_vat.to_string(),
                transaction_date: expense.transaction_date.to_string(),
                invoice_number: expense.invoice_number.as_deref().unwrap_or(""),
                warnings: result.warnings,
                processing_time_ms: result.processing_time_ms,
                error: "",
            },
            None => SummaryRow {
                filename,
                status: "error",
                category: "",
                document_type: "",
                business_name: "",
                business_vat_number: "",
                amount_before_vat: String::new(),
                amount_after_vat: String::new(),
                transaction_date: String::new(),
                invoice_number: "",
                warnings: result.warnings,
                processing_time_ms: result.processing_time_ms,
                error: result.error.as_deref().unwrap_or(""),
            },
        };

        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}
