pub mod context;
pub mod export;
pub mod history;
pub mod record;
pub mod schema;
pub mod simulate;
pub mod summary;
pub mod validate;

use crate::core::{self, ActivityType, HistoryInput, IrMode};
use chrono::Datelike;
use clap::ValueEnum;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read a history file (JSON, or CSV by extension) or stdin with "-"
pub fn read_history(path: &Path) -> anyhow::Result<HistoryInput> {
    if path.as_os_str() == "-" {
        return read_from_stdin();
    }
    let reader = BufReader::new(File::open(path)?);
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        core::read_history_csv(reader)
    } else {
        core::read_history_json(reader)
    }
}

fn read_from_stdin() -> anyhow::Result<HistoryInput> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    core::read_history_json(io::Cursor::new(buffer))
}

/// Fiscal year used when none is given on the command line
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ActivityArg {
    Sale,
    Service,
    Liberal,
}

impl From<ActivityArg> for ActivityType {
    fn from(arg: ActivityArg) -> Self {
        match arg {
            ActivityArg::Sale => ActivityType::Sale,
            ActivityArg::Service => ActivityType::Service,
            ActivityArg::Liberal => ActivityType::Liberal,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum IrModeArg {
    #[default]
    None,
    Liberatoire,
    Bareme,
}

impl From<IrModeArg> for IrMode {
    fn from(arg: IrModeArg) -> Self {
        match arg {
            IrModeArg::None => IrMode::None,
            IrModeArg::Liberatoire => IrMode::VersementLiberatoire,
            IrModeArg::Bareme => IrMode::Bareme,
        }
    }
}

pub fn format_eur(amount: Decimal) -> String {
    format!("{:.2} €", amount.round_dp(2))
}

pub fn format_pct(ratio: Decimal) -> String {
    format!("{:.2}%", (ratio * Decimal::ONE_HUNDRED).round_dp(2))
}
