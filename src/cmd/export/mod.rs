//! Export command - annual report as HTML or CSV
//!
//! Totals come from the same aggregation the summary and context commands use.

mod html;

use super::history::{monthly_rows, MonthRow, RecordRow};
use super::summary::{choose_ceiling, CeilingChoice};
use super::{current_year, format_eur, read_history};
use crate::core::{aggregate, records_for_year, Aggregate, HistoryRecord};
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ExportCommand {
    /// History file (JSON or CSV). Reads JSON from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Fiscal year to export (defaults to the current year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Annual revenue ceiling (defaults to the ceiling of the dominant activity)
    #[arg(short, long)]
    ceiling: Option<Decimal>,

    /// Document format
    #[arg(long, value_enum, default_value = "html")]
    format: ExportFormat,

    /// Output file path (default: HTML opens in browser, CSV goes to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Html,
    Csv,
}

/// Data structure for embedding in HTML as JSON
#[derive(Debug, Serialize)]
pub struct ReportData {
    pub summary: ReportSummary,
    pub months: Vec<MonthRow>,
    pub records: Vec<RecordRow>,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub year: i32,
    pub total_revenue: String,
    pub total_contributions: String,
    pub total_income_tax: String,
    pub total_net: String,
    pub average_monthly_revenue: String,
    pub ceiling: Option<String>,
    pub ceiling_progress_pct: Option<String>,
}

/// One line of the CSV export
#[derive(Debug, Serialize)]
struct ExportRow {
    period: String,
    activity: String,
    revenue: String,
    contributions: String,
    income_tax: String,
    net_after_contributions: String,
    net_after_all: String,
}

impl ExportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let year = self.year.unwrap_or_else(current_year);
        let history = read_history(&self.file)?;
        let records = records_for_year(&history.records, Some(year));
        if records.is_empty() {
            anyhow::bail!("No records found for {}", year);
        }
        let agg = aggregate(&records);
        let choice = choose_ceiling(&records, self.ceiling);

        match self.format {
            ExportFormat::Html => {
                let data = build_report_data(&records, &agg, year, choice);
                self.write_html(&html::generate_html(&data)?)
            }
            ExportFormat::Csv => match &self.output {
                Some(path) => {
                    write_csv(&records, &agg, std::fs::File::create(path)?)?;
                    println!("CSV export written to: {}", path.display());
                    Ok(())
                }
                None => write_csv(&records, &agg, io::stdout()),
            },
        }
    }

    fn write_html(&self, html: &str) -> anyhow::Result<()> {
        if let Some(ref output_path) = self.output {
            std::fs::write(output_path, html)?;
            println!("HTML report written to: {}", output_path.display());
        } else {
            // Write to temp file and open in browser
            let temp_path = std::env::temp_dir().join("microfisc-report.html");
            std::fs::write(&temp_path, html)?;
            opener::open(&temp_path)?;
            println!("Opened HTML report in browser: {}", temp_path.display());
        }
        Ok(())
    }
}

pub fn build_report_data(
    records: &[HistoryRecord],
    agg: &Aggregate,
    year: i32,
    choice: CeilingChoice,
) -> ReportData {
    ReportData {
        summary: ReportSummary {
            year,
            total_revenue: format_eur(agg.total_revenue),
            total_contributions: format_eur(agg.total_contributions),
            total_income_tax: format_eur(agg.total_income_tax),
            total_net: format_eur(agg.total_net),
            average_monthly_revenue: format_eur(agg.average_monthly_revenue()),
            ceiling: choice.ceiling.map(format_eur),
            ceiling_progress_pct: choice
                .ceiling
                .and_then(|c| agg.ceiling_progress(c))
                .map(|p| format!("{:.1}", (p * Decimal::ONE_HUNDRED).round_dp(1))),
        },
        months: monthly_rows(agg),
        records: records.iter().map(RecordRow::from).collect(),
    }
}

/// Records followed by a TOTAL line taken from the aggregate
fn write_csv<W: Write>(
    records: &[HistoryRecord],
    agg: &Aggregate,
    writer: W,
) -> anyhow::Result<()> {
    let cents = |d: Decimal| format!("{:.2}", d.round_dp(2));
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(ExportRow {
            period: record.period_label(),
            activity: record.activity_label().to_string(),
            revenue: cents(record.revenue),
            contributions: cents(record.contributions),
            income_tax: record.income_tax.map_or(String::new(), cents),
            net_after_contributions: cents(record.net_after_contributions),
            net_after_all: cents(record.net_after_all),
        })?;
    }
    wtr.serialize(ExportRow {
        period: "TOTAL".to_string(),
        activity: String::new(),
        revenue: cents(agg.total_revenue),
        contributions: cents(agg.total_contributions),
        income_tax: cents(agg.total_income_tax),
        net_after_contributions: cents(agg.total_revenue - agg.total_contributions),
        net_after_all: cents(agg.total_net),
    })?;
    wtr.flush()?;
    Ok(())
}
