//! Process command - book a single OCR text or OCR JSON file as an expense.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use receipta_core::invoice::{ExtractionEngine, ExtractionResult, InvoiceParser};
use receipta_core::models::config::ReceiptaConfig;
use receipta_core::models::expense::{Expense, ExpenseCategory};
use receipta_core::ocr::OcrDocument;

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (.txt with OCR text, or .json OCR response)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Expense category (Hebrew label or English name)
    #[arg(long)]
    category: Option<String>,

    /// Notes attached to the expense
    #[arg(long)]
    notes: Option<String>,

    /// Show fields that fell back to defaults
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Columns of an expense row.
const EXPENSE_COLUMNS: [&str; 9] = [
    "category",
    "document_type",
    "business_name",
    "business_vat_number",
    "amount_before_vat",
    "amount_after_vat",
    "transaction_date",
    "invoice_number",
    "notes",
];

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let category = resolve_category(args.category.as_deref(), &config)?;
    let engine = ExtractionEngine::from_config(config.extraction.clone())?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Extracting fields...");

    let result = extract_file(&args.input, &engine)?;

    pb.finish_and_clear();

    if args.show_warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let notes = args.notes.clone().or_else(|| config.expenses.notes.clone());
    let processing_time_ms = result.processing_time_ms;
    let expense = Expense::from_invoice(result.invoice, category, notes);

    let output = format_expense(&expense, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!(
        "Extraction took {}ms, total {:?}",
        processing_time_ms,
        start.elapsed()
    );

    Ok(())
}

/// Category from the command line, or the configured default.
pub fn resolve_category(
    name: Option<&str>,
    config: &ReceiptaConfig,
) -> anyhow::Result<ExpenseCategory> {
    match name {
        Some(name) => ExpenseCategory::from_str(name).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown category: {} (expected one of: vehicle, food, operations, it, training, other)",
                name
            )
        }),
        None => Ok(config.expenses.default_category),
    }
}

/// Read and parse one input file, choosing the reader by extension.
pub fn extract_file(path: &Path, engine: &ExtractionEngine) -> anyhow::Result<ExtractionResult> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let result = match extension.as_str() {
        "txt" | "text" => {
            let text = fs::read_to_string(path)?;
            engine.parse(&text)?
        }
        "json" => {
            let json = fs::read_to_string(path)?;
            let document = OcrDocument::from_json(&json)?;
            debug!("OCR response has {} annotations", document.annotations.len());
            engine.parse_document(&document)?
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    Ok(result)
}

pub fn format_expense(expense: &Expense, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(expense)?),
        OutputFormat::Csv => format_csv(expense),
        OutputFormat::Text => Ok(format_text(expense)),
    }
}

/// Field values in [`EXPENSE_COLUMNS`] order.
fn expense_record(expense: &Expense) -> [String; 9] {
    [
        expense.category.label().to_string(),
        expense.document_type.label().to_string(),
        expense.business_name.clone(),
        expense.business_vat_number.clone(),
        expense.amount_before_vat.to_string(),
        expense.amount_after_vat.to_string(),
        expense.transaction_date.to_string(),
        expense.invoice_number.clone().unwrap_or_default(),
        expense.notes.clone().unwrap_or_default(),
    ]
}

fn format_csv(expense: &Expense) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(EXPENSE_COLUMNS)?;
    wtr.write_record(expense_record(expense))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(expense: &Expense) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}: {}\n", expense.document_type, expense.business_name));
    output.push_str(&format!("VAT number: {}\n", expense.business_vat_number));
    output.push_str(&format!("Date: {}\n", expense.transaction_date));
    if let Some(number) = &expense.invoice_number {
        output.push_str(&format!("Number: {}\n", number));
    }
    output.push('\n');

    output.push_str("Amounts:\n");
    output.push_str(&format!("  Before VAT: {}\n", expense.amount_before_vat));
    output.push_str(&format!("  After VAT:  {}\n", expense.amount_after_vat));
    output.push('\n');

    output.push_str(&format!("Category: {}\n", expense.category.label()));
    if let Some(notes) = &expense.notes {
        output.push_str(&format!("Notes: {}\n", notes));
    }

    output
}
