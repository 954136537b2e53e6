use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Micro-enterprise activity class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum ActivityType {
    /// Vente de marchandises (BIC)
    Sale,
    /// Prestation de services commerciales ou artisanales (BIC)
    #[default]
    Service,
    /// Profession libérale (BNC)
    Liberal,
}

/// Fiscal constants for one activity class
#[derive(Debug)]
struct RateEntry {
    /// URSSAF contribution rate applied to revenue
    base_rate: Decimal,
    /// Flat allowance removed from revenue before the barème applies
    abatement: Decimal,
    /// Versement libératoire withholding rate
    liberatoire: Decimal,
    /// Annual revenue ceiling of the micro regime
    ceiling: Decimal,
    label: &'static str,
}

// Indexed by `ActivityType as usize`.
static RATE_TABLE: [RateEntry; 3] = [
    RateEntry {
        base_rate: dec!(0.123),
        abatement: dec!(0.71),
        liberatoire: dec!(0.01),
        ceiling: dec!(188700),
        label: "Vente de marchandises",
    },
    RateEntry {
        base_rate: dec!(0.212),
        abatement: dec!(0.50),
        liberatoire: dec!(0.017),
        ceiling: dec!(77700),
        label: "Prestation de services",
    },
    RateEntry {
        base_rate: dec!(0.211),
        abatement: dec!(0.34),
        liberatoire: dec!(0.022),
        ceiling: dec!(77700),
        label: "Profession libérale",
    },
];

impl ActivityType {
    pub const ALL: [ActivityType; 3] = [
        ActivityType::Sale,
        ActivityType::Service,
        ActivityType::Liberal,
    ];

    fn entry(self) -> &'static RateEntry {
        &RATE_TABLE[self as usize]
    }

    /// Human readable label, as shown on declarations
    pub fn label(self) -> &'static str {
        self.entry().label
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// URSSAF contribution rate before any ACRE reduction
pub fn base_rate(activity: ActivityType) -> Decimal {
    activity.entry().base_rate
}

/// Income-tax abatement used by the barème regime
pub fn abatement_rate(activity: ActivityType) -> Decimal {
    activity.entry().abatement
}

/// Flat withholding rate used by the versement libératoire regime
pub fn liberatoire_rate(activity: ActivityType) -> Decimal {
    activity.entry().liberatoire
}

/// Annual revenue threshold above which the micro regime no longer applies
pub fn revenue_ceiling(activity: ActivityType) -> Decimal {
    activity.entry().ceiling
}
