//! Record command - compute a month and append it to a history file

use super::{format_eur, read_history, ActivityArg, IrModeArg};
use crate::core::{
    compute_month, write_history_json, AcreStatus, FiscalProfile, HistoryInput, HistoryRecord,
};
use clap::Args;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct RecordCommand {
    /// JSON history file (.json) to append to, created if missing
    #[arg(short = 'f', long)]
    history: PathBuf,

    /// Fiscal year of the declaration
    #[arg(short, long)]
    year: i32,

    /// Month of the declaration, 1 to 12
    #[arg(short, long)]
    month: u32,

    /// Revenue declared for the month, in euros
    #[arg(short, long)]
    revenue: Decimal,

    /// Activity class
    #[arg(short, long, value_enum)]
    activity: ActivityArg,

    /// Year the business was created under ACRE (overrides the stored profile)
    #[arg(long)]
    acre_since: Option<i32>,

    /// Income tax regime (overrides the stored profile)
    #[arg(short, long, value_enum)]
    ir_mode: Option<IrModeArg>,

    /// Barème provisioning rate (overrides the stored profile)
    #[arg(short, long)]
    provision_rate: Option<Decimal>,
}

impl RecordCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        if self.history == Path::new("-") {
            anyhow::bail!("record needs a history file path, not stdin");
        }
        if !is_json_path(&self.history) {
            anyhow::bail!(
                "record only appends to JSON histories, {} is not a .json file",
                self.history.display()
            );
        }

        let mut history = if self.history.exists() {
            read_history(&self.history)?
        } else {
            log::info!("Creating history file {}", self.history.display());
            HistoryInput::default()
        };

        let profile = self.profile(history.profile.unwrap_or_default());
        let input = profile.month_input(self.revenue, self.activity.into())?;
        let result = compute_month(&input, self.year);
        let created_at = chrono::Local::now().fixed_offset();
        let record =
            HistoryRecord::from_result(self.year, self.month, &input, &result, created_at)?;

        println!(
            "Recorded {} {}: revenue {}, contributions {}, net {}",
            record.period_label(),
            record.activity_label(),
            format_eur(record.revenue),
            format_eur(record.contributions),
            format_eur(record.net_after_all)
        );

        history.profile = Some(profile);
        history.records.push(record);
        let writer = BufWriter::new(File::create(&self.history)?);
        write_history_json(&history, writer)?;
        log::info!(
            "Wrote {} records to {}",
            history.records.len(),
            self.history.display()
        );
        Ok(())
    }

    fn profile(&self, stored: FiscalProfile) -> FiscalProfile {
        FiscalProfile {
            acre: self.acre_since.map_or(stored.acre, AcreStatus::enrolled_in),
            ir_mode: self.ir_mode.map_or(stored.ir_mode, Into::into),
            bareme_provision_rate: self
                .provision_rate
                .unwrap_or(stored.bareme_provision_rate),
        }
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
