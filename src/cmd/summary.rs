//! Summary command - annual totals, averages and ceiling progress

use super::{current_year, format_eur, format_pct, read_history};
use crate::core::{
    aggregate, dominant_activity, records_for_year, revenue_ceiling, ActivityType, Aggregate,
    HistoryRecord,
};
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::path::PathBuf;

/// Share of the ceiling from which the summary flags the regime exit risk
const CEILING_WARNING: Decimal = dec!(0.8);

#[derive(Args, Debug)]
pub struct SummaryCommand {
    /// History file (JSON or CSV). Reads JSON from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Fiscal year to summarise (defaults to the current year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Annual revenue ceiling (defaults to the ceiling of the dominant activity)
    #[arg(short, long)]
    ceiling: Option<Decimal>,

    /// Output as JSON instead of formatted text. Amounts are two-decimal
    /// strings; use `context` for plain numbers
    #[arg(long)]
    json: bool,
}

/// Ceiling to measure progress against, with the activity it was taken from
#[derive(Debug, Clone, Copy)]
pub struct CeilingChoice {
    pub dominant_activity: Option<ActivityType>,
    pub ceiling: Option<Decimal>,
}

/// An explicit ceiling wins; otherwise the dominant activity's ceiling applies
pub fn choose_ceiling(records: &[HistoryRecord], explicit: Option<Decimal>) -> CeilingChoice {
    let dominant = dominant_activity(records);
    CeilingChoice {
        dominant_activity: dominant,
        ceiling: explicit.or_else(|| dominant.map(revenue_ceiling)),
    }
}

/// Summary data for JSON output, amounts formatted as strings to the cent
#[derive(Debug, Serialize)]
struct SummaryData {
    year: i32,
    record_count: usize,
    distinct_months: usize,
    total_revenue: String,
    total_contributions: String,
    total_income_tax: String,
    total_net: String,
    average_monthly_revenue: String,
    latest_growth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dominant_activity: Option<ActivityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ceiling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ceiling_progress_pct: Option<String>,
}

impl SummaryCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let year = self.year.unwrap_or_else(current_year);
        let history = read_history(&self.file)?;
        let records = records_for_year(&history.records, Some(year));
        let agg = aggregate(&records);
        let choice = choose_ceiling(&records, self.ceiling);

        if self.json {
            self.print_json(&agg, year, choice)
        } else {
            self.print_summary(&agg, year, choice);
            Ok(())
        }
    }

    fn print_summary(&self, agg: &Aggregate, year: i32, choice: CeilingChoice) {
        println!();
        println!("URSSAF SUMMARY ({})", year);
        println!();

        if agg.record_count == 0 {
            println!("  No declarations recorded.");
            println!();
            return;
        }

        println!(
            "  Declarations: {} over {} month(s)",
            agg.record_count,
            agg.distinct_months()
        );
        println!(
            "  Revenue: {} | Average per month: {}",
            format_eur(agg.total_revenue),
            format_eur(agg.average_monthly_revenue())
        );
        println!(
            "  Contributions: {} | Income tax: {}",
            format_eur(agg.total_contributions),
            format_eur(agg.total_income_tax)
        );
        println!("  Net: {}", format_eur(agg.total_net));
        println!("  Last month growth: {}", agg.latest_growth());
        println!();

        if let Some(ceiling) = choice.ceiling {
            let progress = agg.ceiling_progress(ceiling).unwrap_or(Decimal::ZERO);
            let source = choice
                .dominant_activity
                .filter(|_| self.ceiling.is_none())
                .map_or(String::new(), |a| format!(" ({})", a));
            println!("CEILING{}", source);
            println!(
                "  {} of {} reached: {}",
                format_eur(agg.total_revenue),
                format_eur(ceiling),
                format_pct(progress)
            );
            if progress >= Decimal::ONE {
                println!("  Ceiling exceeded: the micro regime no longer applies.");
            } else if progress >= CEILING_WARNING {
                println!("  Approaching the ceiling.");
            }
            println!();
        }
    }

    fn print_json(&self, agg: &Aggregate, year: i32, choice: CeilingChoice) -> anyhow::Result<()> {
        let data = SummaryData {
            year,
            record_count: agg.record_count,
            distinct_months: agg.distinct_months(),
            total_revenue: format!("{:.2}", agg.total_revenue.round_dp(2)),
            total_contributions: format!("{:.2}", agg.total_contributions.round_dp(2)),
            total_income_tax: format!("{:.2}", agg.total_income_tax.round_dp(2)),
            total_net: format!("{:.2}", agg.total_net.round_dp(2)),
            average_monthly_revenue: format!("{:.2}", agg.average_monthly_revenue().round_dp(2)),
            latest_growth: agg.latest_growth().display(),
            dominant_activity: choice.dominant_activity,
            ceiling: choice.ceiling.map(|c| format!("{:.2}", c.round_dp(2))),
            ceiling_progress_pct: choice
                .ceiling
                .and_then(|c| agg.ceiling_progress(c))
                .map(|p| format!("{:.2}", (p * Decimal::ONE_HUNDRED).round_dp(2))),
        };

        println!("{}", serde_json::to_string_pretty(&data)?);
        Ok(())
    }
}
