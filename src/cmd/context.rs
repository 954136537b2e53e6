//! Context command - aggregated statistics for the assistant

use super::summary::choose_ceiling;
use super::{current_year, read_history};
use crate::core::{aggregate, records_for_year, Statistics};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ContextCommand {
    /// History file (JSON or CSV). Reads JSON from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Fiscal year (defaults to the current year)
    #[arg(short, long, conflicts_with = "all")]
    year: Option<i32>,

    /// Use every record regardless of year
    #[arg(long)]
    all: bool,

    /// Annual revenue ceiling (defaults to the ceiling of the dominant activity)
    #[arg(short, long)]
    ceiling: Option<Decimal>,
}

impl ContextCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let year = (!self.all).then(|| self.year.unwrap_or_else(current_year));
        let history = read_history(&self.file)?;
        let records = records_for_year(&history.records, year);
        let choice = choose_ceiling(&records, self.ceiling);

        let stats = Statistics::new(
            &aggregate(&records),
            year,
            choice.dominant_activity,
            choice.ceiling,
        );
        println!("{}", serde_json::to_string_pretty(&stats)?);
        Ok(())
    }
}
