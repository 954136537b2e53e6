//! Validate command - re-derive stored records and flag divergences

use super::read_history;
use crate::core::{records_for_year, FiscalProfile, HistoryRecord, MonthResult};
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::path::PathBuf;

/// Largest difference tolerated between a stored and a recomputed figure
const TOLERANCE: Decimal = dec!(0.01);

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// History file (JSON or CSV). Reads JSON from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Fiscal year to filter
    #[arg(short, long)]
    year: Option<i32>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// A validation issue for output
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub period: String,
    pub activity: String,
    pub field: String,
    pub stored: String,
    pub expected: String,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ValidationOutput {
    record_count: usize,
    issue_count: usize,
    issues: Vec<ValidationIssue>,
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let history = read_history(&self.file)?;
        let profile = history.profile.unwrap_or_else(|| {
            log::warn!("History has no fiscal profile, assuming no ACRE and no income tax");
            FiscalProfile::default()
        });
        let records = records_for_year(&history.records, self.year);

        let mut issues = Vec::new();
        for record in &records {
            issues.extend(check_record(record, &profile)?);
        }

        if self.json {
            let output = ValidationOutput {
                record_count: records.len(),
                issue_count: issues.len(),
                issues: issues.clone(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_text(&issues, records.len());
        }

        // Exit with code 1 if issues found
        if !issues.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }
}

/// Compare a stored record with the figures the engine derives for it
pub fn check_record(
    record: &HistoryRecord,
    profile: &FiscalProfile,
) -> anyhow::Result<Vec<ValidationIssue>> {
    let expected = record.rederive(profile)?.rounded();
    let stored = MonthResult {
        revenue: record.revenue,
        effective_contribution_rate: expected.effective_contribution_rate,
        contributions: record.contributions,
        income_tax: record.income_tax_or_zero(),
        net_after_contributions: record.net_after_contributions,
        net_after_all: record.net_after_all,
    };

    let fields = [
        ("contributions", stored.contributions, expected.contributions),
        ("income_tax", stored.income_tax, expected.income_tax),
        (
            "net_after_contributions",
            stored.net_after_contributions,
            expected.net_after_contributions,
        ),
        ("net_after_all", stored.net_after_all, expected.net_after_all),
    ];

    let issues: Vec<ValidationIssue> = fields
        .into_iter()
        .filter(|(_, stored, expected)| (*stored - *expected).abs() > TOLERANCE)
        .map(|(field, stored, expected)| ValidationIssue {
            period: record.period_label(),
            activity: record.activity_label().to_string(),
            field: field.to_string(),
            stored: format!("{:.2}", stored),
            expected: format!("{:.2}", expected),
        })
        .collect();

    for issue in &issues {
        log::warn!(
            "{} {}: stored {} {} differs from derived {}",
            issue.period,
            issue.activity,
            issue.field,
            issue.stored,
            issue.expected
        );
    }
    Ok(issues)
}

fn print_text(issues: &[ValidationIssue], record_count: usize) {
    println!();
    println!("VALIDATION RESULTS ({} records)", record_count);
    println!();

    if issues.is_empty() {
        println!("\u{2713} No issues found.");
        return;
    }

    println!("\u{26A0} {} issue(s) found:", issues.len());
    println!();
    for (i, issue) in issues.iter().enumerate() {
        println!(
            "  {}. [{}] {} {}: stored {} but expected {}",
            i + 1,
            issue.field,
            issue.period,
            issue.activity,
            issue.stored,
            issue.expected
        );
    }
    println!();
}
