//! ACRE: tapering contribution relief for the first three years of a business.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ACRE enrollment as declared by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct AcreStatus {
    pub enrolled: bool,
    /// Calendar year the business was created under ACRE
    #[serde(default)]
    pub enrollment_year: i32,
}

impl AcreStatus {
    pub fn none() -> Self {
        AcreStatus::default()
    }

    pub fn enrolled_in(year: i32) -> Self {
        AcreStatus {
            enrolled: true,
            enrollment_year: year,
        }
    }
}

/// Active ACRE year, 1 to 3, or 0 when ACRE does not apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AcreYear(u8);

impl AcreYear {
    pub const NONE: AcreYear = AcreYear(0);

    /// Returns `None` for tiers outside the schedule
    pub fn new(year: u8) -> Option<Self> {
        if year == 0 || ACRE_SCHEDULE.iter().any(|(y, _)| *y == year) {
            Some(AcreYear(year))
        } else {
            None
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_active(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for AcreYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_active() {
            write!(f, "year {}", self.0)
        } else {
            write!(f, "none")
        }
    }
}

/// Fraction of the base rate retained in each ACRE year
const ACRE_SCHEDULE: [(u8, Decimal); 3] = [(1, dec!(0.50)), (2, dec!(0.75)), (3, dec!(0.875))];

/// Derive the ACRE year for the fiscal year being evaluated.
///
/// An enrollment year after the evaluation year, or more than three years
/// before it, yields [`AcreYear::NONE`].
pub fn acre_year(status: &AcreStatus, evaluation_year: i32) -> AcreYear {
    if !status.enrolled {
        return AcreYear::NONE;
    }
    let elapsed = i64::from(evaluation_year) - i64::from(status.enrollment_year) + 1;
    if elapsed < 1 {
        log::debug!(
            "ACRE enrollment {} is after evaluation year {}",
            status.enrollment_year,
            evaluation_year
        );
        return AcreYear::NONE;
    }
    u8::try_from(elapsed)
        .ok()
        .and_then(AcreYear::new)
        .unwrap_or(AcreYear::NONE)
}

pub fn acre_multiplier(year: AcreYear) -> Decimal {
    ACRE_SCHEDULE
        .iter()
        .find(|(y, _)| *y == year.0)
        .map_or(Decimal::ONE, |(_, multiplier)| *multiplier)
}
