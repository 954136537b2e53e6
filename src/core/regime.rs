use super::rates::{abatement_rate, liberatoire_rate, ActivityType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Income tax regime chosen by the micro-entrepreneur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum IrMode {
    /// No income tax line is computed
    #[default]
    None,
    /// Flat withholding paid with the URSSAF declaration
    VersementLiberatoire,
    /// Barème progressif, provisioned at a user supplied rate
    Bareme,
}

impl IrMode {
    pub fn display(&self) -> &'static str {
        match self {
            IrMode::None => "None",
            IrMode::VersementLiberatoire => "Versement libératoire",
            IrMode::Bareme => "Barème progressif",
        }
    }

    /// Value stored by the record store, where `None` is persisted as null
    pub fn persisted(self) -> Option<IrMode> {
        match self {
            IrMode::None => None,
            mode => Some(mode),
        }
    }
}

impl std::fmt::Display for IrMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Marginal rate used to provision barème income tax, within [0, 0.20]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ProvisionRate(Decimal);

impl ProvisionRate {
    pub const MIN: Decimal = Decimal::ZERO;
    pub const MAX: Decimal = dec!(0.20);

    /// Accept the rate only when it is already within bounds
    pub fn new(rate: Decimal) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&rate)
            .then_some(ProvisionRate(rate))
    }

    /// Clamp the rate into bounds
    pub fn clamped(rate: Decimal) -> Self {
        let clamped = rate.clamp(Self::MIN, Self::MAX);
        if clamped != rate {
            log::warn!("Provision rate {} clamped to {}", rate, clamped);
        }
        ProvisionRate(clamped)
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

/// Income tax due on `revenue` for the given regime.
///
/// The provision rate is clamped here as well, so an input that skipped
/// validation still cannot produce a negative or oversized tax figure.
pub fn compute_tax(
    revenue: Decimal,
    activity: ActivityType,
    ir_mode: IrMode,
    provision_rate: Decimal,
) -> Decimal {
    match ir_mode {
        IrMode::None => Decimal::ZERO,
        IrMode::VersementLiberatoire => revenue * liberatoire_rate(activity),
        IrMode::Bareme => {
            let taxable_base = revenue * (Decimal::ONE - abatement_rate(activity));
            let rate = ProvisionRate::clamped(provision_rate).value();
            log::debug!(
                "Barème: revenue={}, taxable base={}, provision rate={}",
                revenue,
                taxable_base,
                rate
            );
            taxable_base * rate
        }
    }
}
