use super::acre::{acre_multiplier, acre_year, AcreStatus};
use super::rates::{base_rate, ActivityType};
use super::regime::{compute_tax, IrMode, ProvisionRate};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("revenue must not be negative: {0}")]
    NegativeRevenue(Decimal),
    #[error("provision rate must be between 0 and 0.20: {0}")]
    ProvisionRateOutOfRange(Decimal),
    #[error("month must be between 1 and 12: {0}")]
    InvalidMonth(u32),
    #[error("{field} must not be negative: {value}")]
    NegativeAmount { field: &'static str, value: Decimal },
    #[error("ACRE year must be between 0 and 3: {0}")]
    InvalidAcreYear(u8),
}

/// Validated inputs for one month's computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthInput {
    revenue: Decimal,
    activity: ActivityType,
    acre: AcreStatus,
    ir_mode: IrMode,
    bareme_provision_rate: Decimal,
}

impl MonthInput {
    pub fn new(
        revenue: Decimal,
        activity: ActivityType,
        acre: AcreStatus,
        ir_mode: IrMode,
        bareme_provision_rate: Decimal,
    ) -> Result<Self, ValidationError> {
        if revenue < Decimal::ZERO {
            return Err(ValidationError::NegativeRevenue(revenue));
        }
        if ProvisionRate::new(bareme_provision_rate).is_none() {
            return Err(ValidationError::ProvisionRateOutOfRange(
                bareme_provision_rate,
            ));
        }
        Ok(MonthInput {
            revenue,
            activity,
            acre,
            ir_mode,
            bareme_provision_rate,
        })
    }

    pub fn activity(&self) -> ActivityType {
        self.activity
    }

    pub fn acre(&self) -> AcreStatus {
        self.acre
    }

    pub fn ir_mode(&self) -> IrMode {
        self.ir_mode
    }

    pub fn bareme_provision_rate(&self) -> Decimal {
        self.bareme_provision_rate
    }
}

/// A month input as it is being filled in; any field may still be unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthDraft {
    pub revenue: Option<Decimal>,
    pub activity: Option<ActivityType>,
    pub acre: AcreStatus,
    pub ir_mode: IrMode,
    pub bareme_provision_rate: Option<Decimal>,
}

impl MonthDraft {
    /// `Ok(None)` while a required field is missing
    pub fn to_input(&self) -> Result<Option<MonthInput>, ValidationError> {
        let (Some(revenue), Some(activity)) = (self.revenue, self.activity) else {
            return Ok(None);
        };
        let provision_rate = match (self.ir_mode, self.bareme_provision_rate) {
            (IrMode::Bareme, None) => return Ok(None),
            (_, rate) => rate.unwrap_or(Decimal::ZERO),
        };
        MonthInput::new(revenue, activity, self.acre, self.ir_mode, provision_rate).map(Some)
    }
}

/// Computed figures for one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthResult {
    pub revenue: Decimal,
    pub effective_contribution_rate: Decimal,
    pub contributions: Decimal,
    pub income_tax: Decimal,
    pub net_after_contributions: Decimal,
    pub net_after_all: Decimal,
}

impl MonthResult {
    /// Round to cents for display or storage.
    ///
    /// Only revenue, contributions and income tax are rounded; the nets are
    /// derived from the rounded figures so they still add up to the cent.
    pub fn rounded(&self) -> MonthResult {
        let revenue = self.revenue.round_dp(2);
        let contributions = self.contributions.round_dp(2);
        let income_tax = self.income_tax.round_dp(2);
        let net_after_contributions = revenue - contributions;
        MonthResult {
            revenue,
            effective_contribution_rate: self.effective_contribution_rate,
            contributions,
            income_tax,
            net_after_contributions,
            net_after_all: net_after_contributions - income_tax,
        }
    }
}

/// Compute contributions, income tax and net revenue for one month.
///
/// `evaluation_year` is the fiscal year the revenue belongs to; it decides
/// which ACRE tier applies.
pub fn compute_month(input: &MonthInput, evaluation_year: i32) -> MonthResult {
    debug_assert!(input.revenue >= Decimal::ZERO);
    let acre = acre_year(&input.acre, evaluation_year);
    let effective_contribution_rate = base_rate(input.activity) * acre_multiplier(acre);
    let contributions = input.revenue * effective_contribution_rate;
    let income_tax = compute_tax(
        input.revenue,
        input.activity,
        input.ir_mode,
        input.bareme_provision_rate,
    );
    let net_after_contributions = input.revenue - contributions;
    let net_after_all = net_after_contributions - income_tax;

    log::debug!(
        "{} {}: revenue={}, ACRE {}, rate={}, contributions={}, {}={}",
        evaluation_year,
        input.activity,
        input.revenue,
        acre,
        effective_contribution_rate,
        contributions,
        input.ir_mode,
        income_tax
    );

    MonthResult {
        revenue: input.revenue,
        effective_contribution_rate,
        contributions,
        income_tax,
        net_after_contributions,
        net_after_all,
    }
}

/// Live preview entry point: tolerates partially filled input
pub fn preview(
    draft: &MonthDraft,
    evaluation_year: i32,
) -> Result<Option<MonthResult>, ValidationError> {
    Ok(draft
        .to_input()?
        .map(|input| compute_month(&input, evaluation_year)))
}
