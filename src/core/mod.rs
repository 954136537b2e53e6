pub mod acre;
pub mod aggregate;
pub mod history;
pub mod month;
pub mod rates;
pub mod regime;

// Flat public surface for domain types and functions.
pub use acre::{acre_year, AcreStatus};
pub use aggregate::{aggregate, dominant_activity, Aggregate, Growth, Statistics};
pub use history::{
    read_history_csv, read_history_json, records_for_year, write_history_json, FiscalProfile,
    HistoryInput, HistoryRecord,
};
pub use month::{compute_month, preview, MonthDraft, MonthResult};
pub use rates::{revenue_ceiling, ActivityType};
pub use regime::IrMode;
#[allow(unused_imports)]
pub use {
    acre::{acre_multiplier, AcreYear},
    aggregate::{ceiling_progress, growth_rate, MonthTotal},
    history::sort_records,
    month::{MonthInput, ValidationError},
    rates::{abatement_rate, base_rate, liberatoire_rate},
    regime::{compute_tax, ProvisionRate},
};
