//! Simulate command - live estimate for one month of revenue

use super::{current_year, format_eur, format_pct, ActivityArg, IrModeArg};
use crate::core::{acre_year, preview, AcreStatus, MonthDraft, MonthResult};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct SimulateCommand {
    /// Revenue declared for the month, in euros
    #[arg(short, long)]
    revenue: Option<Decimal>,

    /// Activity class
    #[arg(short, long, value_enum)]
    activity: Option<ActivityArg>,

    /// Year the business was created under ACRE (omit when not enrolled)
    #[arg(long)]
    acre_since: Option<i32>,

    /// Income tax regime
    #[arg(short, long, value_enum, default_value_t = IrModeArg::None)]
    ir_mode: IrModeArg,

    /// Barème provisioning rate, between 0 and 0.20 (e.g. 0.11)
    #[arg(short, long)]
    provision_rate: Option<Decimal>,

    /// Fiscal year the revenue belongs to (defaults to the current year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct SimulationOutput {
    year: i32,
    acre_year: u8,
    result: Option<MonthResult>,
}

impl SimulateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let year = self.year.unwrap_or_else(current_year);
        let acre = self.acre_since.map_or_else(AcreStatus::none, AcreStatus::enrolled_in);
        let draft = MonthDraft {
            revenue: self.revenue,
            activity: self.activity.map(Into::into),
            acre,
            ir_mode: self.ir_mode.into(),
            bareme_provision_rate: self.provision_rate,
        };

        let result = preview(&draft, year)?.map(|r| r.rounded());
        let output = SimulationOutput {
            year,
            acre_year: acre_year(&acre, year).value(),
            result,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            self.print_text(&output);
        }
        Ok(())
    }

    fn print_text(&self, output: &SimulationOutput) {
        println!();
        println!("MONTHLY ESTIMATE ({})", output.year);
        println!();

        let Some(result) = output.result else {
            println!("  —  (revenue and activity are required");
            println!("      and a provision rate for the barème regime)");
            println!();
            return;
        };

        if output.acre_year > 0 {
            println!("  ACRE: year {}", output.acre_year);
        }
        println!("  Revenue: {}", format_eur(result.revenue));
        println!(
            "  Contributions @ {}: {}",
            format_pct(result.effective_contribution_rate),
            format_eur(result.contributions)
        );
        println!("  Net after contributions: {}", format_eur(result.net_after_contributions));
        if !matches!(self.ir_mode, IrModeArg::None) {
            println!("  Income tax: {}", format_eur(result.income_tax));
        }
        println!("  Net after tax: {}", format_eur(result.net_after_all));
        println!();
    }
}
