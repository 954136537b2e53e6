//! History command - monthly series with month-over-month growth

use super::{format_eur, read_history};
use crate::core::{aggregate, records_for_year, Aggregate, HistoryRecord};
use clap::Args;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct HistoryCommand {
    /// History file (JSON or CSV). Reads JSON from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Fiscal year to filter
    #[arg(short, long)]
    year: Option<i32>,

    /// List individual records instead of monthly totals
    #[arg(long)]
    records: bool,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

impl HistoryCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let history = read_history(&self.file)?;
        let records = records_for_year(&history.records, self.year);

        if self.records {
            let rows: Vec<RecordRow> = records.iter().map(RecordRow::from).collect();
            self.output(&rows)
        } else {
            let rows = monthly_rows(&aggregate(&records));
            self.output(&rows)
        }
    }

    fn output<R: Tabled + serde::Serialize>(&self, rows: &[R]) -> anyhow::Result<()> {
        if self.csv {
            let mut wtr = csv::Writer::from_writer(io::stdout());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
            return Ok(());
        }

        if rows.is_empty() {
            println!("No records found matching filters");
            return Ok(());
        }

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}

/// Row for the monthly table output
#[derive(Debug, Clone, Tabled, serde::Serialize)]
pub struct MonthRow {
    #[tabled(rename = "Month")]
    pub period: String,

    #[tabled(rename = "Revenue")]
    pub revenue: String,

    #[tabled(rename = "Contributions")]
    pub contributions: String,

    #[tabled(rename = "Income Tax")]
    pub income_tax: String,

    #[tabled(rename = "Net")]
    pub net: String,

    #[tabled(rename = "Growth")]
    pub growth: String,
}

pub fn monthly_rows(agg: &Aggregate) -> Vec<MonthRow> {
    agg.monthly
        .iter()
        .enumerate()
        .map(|(i, m)| MonthRow {
            period: format!("{}-{:02}", m.year, m.month),
            revenue: format_eur(m.revenue),
            contributions: format_eur(m.contributions),
            income_tax: format_eur(m.income_tax),
            net: format_eur(m.net_after_all),
            growth: agg.growth_rate(i).display(),
        })
        .collect()
}

/// Row for the per-record table output
#[derive(Debug, Clone, Tabled, serde::Serialize)]
pub struct RecordRow {
    #[tabled(rename = "Month")]
    pub period: String,

    #[tabled(rename = "Activity")]
    pub activity: String,

    #[tabled(rename = "Revenue")]
    pub revenue: String,

    #[tabled(rename = "Contributions")]
    pub contributions: String,

    #[tabled(rename = "IR Mode")]
    pub ir_mode: String,

    #[tabled(rename = "Income Tax")]
    pub income_tax: String,

    #[tabled(rename = "Net")]
    pub net: String,

    #[tabled(rename = "Recorded")]
    pub created_at: String,
}

impl From<&HistoryRecord> for RecordRow {
    fn from(record: &HistoryRecord) -> Self {
        RecordRow {
            period: record.period_label(),
            activity: record.activity_label().to_string(),
            revenue: format_eur(record.revenue),
            contributions: format_eur(record.contributions),
            ir_mode: record.ir_mode.map_or("—".to_string(), |m| m.to_string()),
            income_tax: record.income_tax.map_or("—".to_string(), format_eur),
            net: format_eur(record.net_after_all),
            created_at: record.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}
