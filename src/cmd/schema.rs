//! Schema command - print expected history formats

use crate::core::HistoryInput;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema or csv-header
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the history file
    JsonSchema,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(HistoryInput);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => {
                let columns: Vec<&str> = CSV_FIELDS.iter().map(|(name, _, _)| *name).collect();
                println!("{}", columns.join(","));
            }
            SchemaFormat::CsvFields => {
                println!("CSV History Format");
                println!("==================");
                println!();
                for (name, required, description) in CSV_FIELDS {
                    let req = if *required { "required" } else { "optional" };
                    println!("{:24} ({:8})  {}", name, req, description);
                }
                println!();
                println!("Amounts are in euros. CSV files carry no fiscal profile.");
            }
        }
        Ok(())
    }
}

const CSV_FIELDS: &[(&str, bool, &str)] = &[
    ("year", true, "Fiscal year of the declaration"),
    ("month", true, "Month of the declaration, 1 to 12"),
    ("activity", true, "Sale, Service or Liberal"),
    ("revenue", true, "Declared revenue"),
    ("contributions", true, "URSSAF contributions"),
    (
        "ir_mode",
        false,
        "VersementLiberatoire or Bareme, empty when no income tax",
    ),
    ("ir_amount", false, "Income tax, empty when no income tax"),
    ("net_after_contributions", true, "Revenue minus contributions"),
    ("net_after_all", true, "Revenue minus contributions and income tax"),
    ("created_at", true, "Recording time (RFC3339)"),
    (
        "acre_year",
        false,
        "ACRE tier applied, 0 to 3, empty to use the profile",
    ),
    (
        "bareme_provision_rate",
        false,
        "Barème provisioning rate applied, empty to use the profile",
    ),
];
