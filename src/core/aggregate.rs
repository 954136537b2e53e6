use super::history::HistoryRecord;
use super::rates::ActivityType;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Month-over-month change in revenue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Growth {
    /// Relative change, 0.5 meaning +50%
    Finite(#[serde(with = "rust_decimal::serde::float")] Decimal),
    /// Previous month had no revenue, current month has some
    Infinite,
    /// No previous month to compare against
    Undefined,
}

impl Growth {
    /// Percentage for display, "∞" or "—" for the degenerate cases
    pub fn display(&self) -> String {
        match self {
            Growth::Finite(rate) => format!("{:+.1}%", (rate * Decimal::ONE_HUNDRED).round_dp(1)),
            Growth::Infinite => "∞".to_string(),
            Growth::Undefined => "—".to_string(),
        }
    }
}

impl std::fmt::Display for Growth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Growth between `revenues[index - 1]` and `revenues[index]`
pub fn growth_rate(revenues: &[Decimal], index: usize) -> Growth {
    if index == 0 || index >= revenues.len() {
        return Growth::Undefined;
    }
    let previous = revenues[index - 1];
    let current = revenues[index];
    if previous.is_zero() {
        if current > Decimal::ZERO {
            Growth::Infinite
        } else {
            Growth::Finite(Decimal::ZERO)
        }
    } else {
        Growth::Finite((current - previous) / previous)
    }
}

/// Share of an annual ceiling already reached, `None` for a zero ceiling
pub fn ceiling_progress(total_revenue: Decimal, ceiling: Decimal) -> Option<Decimal> {
    if ceiling <= Decimal::ZERO {
        return None;
    }
    Some(total_revenue / ceiling)
}

/// Activity carrying the most revenue, ties going to the first declared
pub fn dominant_activity(records: &[HistoryRecord]) -> Option<ActivityType> {
    let mut totals: HashMap<ActivityType, Decimal> = HashMap::new();
    for record in records {
        *totals.entry(record.activity).or_default() += record.revenue;
    }
    ActivityType::ALL
        .into_iter()
        .filter_map(|a| totals.get(&a).map(|total| (a, *total)))
        .fold(None, |best: Option<(ActivityType, Decimal)>, (a, total)| match best {
            Some((_, best_total)) if best_total >= total => best,
            _ => Some((a, total)),
        })
        .map(|(a, _)| a)
}

/// Totals for one calendar month, all activities combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub revenue: Decimal,
    pub contributions: Decimal,
    pub income_tax: Decimal,
    pub net_after_all: Decimal,
}

/// Folded view over a sequence of history records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub total_revenue: Decimal,
    pub total_contributions: Decimal,
    pub total_income_tax: Decimal,
    pub total_net: Decimal,
    pub record_count: usize,
    /// Monthly totals in (year, month) order
    pub monthly: Vec<MonthTotal>,
}

impl Aggregate {
    pub fn distinct_months(&self) -> usize {
        self.monthly.len()
    }

    /// Revenue per distinct month, zero without history
    pub fn average_monthly_revenue(&self) -> Decimal {
        if self.monthly.is_empty() {
            return Decimal::ZERO;
        }
        self.total_revenue / Decimal::from(self.monthly.len())
    }

    pub fn monthly_revenues(&self) -> Vec<Decimal> {
        self.monthly.iter().map(|m| m.revenue).collect()
    }

    /// Growth of the month at `index` in [`Aggregate::monthly`]
    pub fn growth_rate(&self, index: usize) -> Growth {
        growth_rate(&self.monthly_revenues(), index)
    }

    /// Growth of the most recent month over the one before it
    pub fn latest_growth(&self) -> Growth {
        match self.monthly.len() {
            0 => Growth::Undefined,
            n => self.growth_rate(n - 1),
        }
    }

    pub fn ceiling_progress(&self, ceiling: Decimal) -> Option<Decimal> {
        ceiling_progress(self.total_revenue, ceiling)
    }
}

/// Fold records into annual totals and a monthly series
pub fn aggregate(records: &[HistoryRecord]) -> Aggregate {
    let mut months: BTreeMap<(i32, u32), MonthTotal> = BTreeMap::new();
    let mut agg = Aggregate {
        record_count: records.len(),
        ..Default::default()
    };

    for record in records {
        let income_tax = record.income_tax_or_zero();
        agg.total_revenue += record.revenue;
        agg.total_contributions += record.contributions;
        agg.total_income_tax += income_tax;
        agg.total_net += record.net_after_all;

        let month = months.entry(record.period()).or_insert(MonthTotal {
            year: record.year,
            month: record.month,
            revenue: Decimal::ZERO,
            contributions: Decimal::ZERO,
            income_tax: Decimal::ZERO,
            net_after_all: Decimal::ZERO,
        });
        month.revenue += record.revenue;
        month.contributions += record.contributions;
        month.income_tax += income_tax;
        month.net_after_all += record.net_after_all;
    }

    agg.monthly = months.into_values().collect();
    log::debug!(
        "Aggregated {} records over {} months: revenue={}, contributions={}, net={}",
        agg.record_count,
        agg.monthly.len(),
        agg.total_revenue,
        agg.total_contributions,
        agg.total_net
    );
    agg
}

/// Plain numeric snapshot of an [`Aggregate`], serialisable for the assistant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub record_count: usize,
    pub distinct_months: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_contributions: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_net: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_monthly_revenue: Decimal,
    pub latest_growth: Growth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_activity: Option<ActivityType>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub ceiling: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub ceiling_progress: Option<Decimal>,
}

impl Statistics {
    /// Figures are rounded to cents, the ceiling ratio to four places
    pub fn new(
        agg: &Aggregate,
        year: Option<i32>,
        dominant_activity: Option<ActivityType>,
        ceiling: Option<Decimal>,
    ) -> Self {
        Statistics {
            year,
            record_count: agg.record_count,
            distinct_months: agg.distinct_months(),
            total_revenue: agg.total_revenue.round_dp(2),
            total_contributions: agg.total_contributions.round_dp(2),
            total_income_tax: agg.total_income_tax.round_dp(2),
            total_net: agg.total_net.round_dp(2),
            average_monthly_revenue: agg.average_monthly_revenue().round_dp(2),
            latest_growth: match agg.latest_growth() {
                Growth::Finite(rate) => Growth::Finite(rate.round_dp(4)),
                other => other,
            },
            dominant_activity,
            ceiling,
            ceiling_progress: ceiling
                .and_then(|c| agg.ceiling_progress(c))
                .map(|p| p.round_dp(4)),
        }
    }
}
