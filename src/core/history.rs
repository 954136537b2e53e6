use super::acre::{acre_year, AcreStatus, AcreYear};
use super::month::{compute_month, MonthInput, MonthResult, ValidationError};
use super::rates::ActivityType;
use super::regime::{IrMode, ProvisionRate};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Fiscal configuration the records of a history were computed with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FiscalProfile {
    #[serde(default)]
    pub acre: AcreStatus,
    #[serde(default)]
    pub ir_mode: IrMode,
    /// Barème provisioning rate, between 0 and 0.20
    #[serde(default)]
    #[schemars(with = "f64")]
    pub bareme_provision_rate: Decimal,
}

impl FiscalProfile {
    pub fn month_input(
        &self,
        revenue: Decimal,
        activity: ActivityType,
    ) -> Result<MonthInput, ValidationError> {
        MonthInput::new(
            revenue,
            activity,
            self.acre,
            self.ir_mode,
            self.bareme_provision_rate,
        )
    }
}

/// Root of a history JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HistoryInput {
    #[serde(default)]
    pub profile: Option<FiscalProfile>,
    pub records: Vec<HistoryRecord>,
}

/// A persisted monthly declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryRecord {
    pub year: i32,
    /// Calendar month, 1 to 12
    pub month: u32,
    pub activity: ActivityType,
    #[schemars(with = "f64")]
    pub revenue: Decimal,
    #[schemars(with = "f64")]
    pub contributions: Decimal,
    /// Null when no income tax regime was selected
    #[serde(default)]
    pub ir_mode: Option<IrMode>,
    /// Null when no income tax regime was selected
    #[serde(default, rename = "ir_amount")]
    #[schemars(with = "Option<f64>")]
    pub income_tax: Option<Decimal>,
    #[schemars(with = "f64")]
    pub net_after_contributions: Decimal,
    #[schemars(with = "f64")]
    pub net_after_all: Decimal,
    #[schemars(with = "String")]
    pub created_at: DateTime<FixedOffset>,
    /// ACRE tier applied, 0 when none. Falls back to the profile when absent
    #[serde(default)]
    pub acre_year: Option<u8>,
    /// Barème provisioning rate applied. Falls back to the profile when absent
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub bareme_provision_rate: Option<Decimal>,
}

impl HistoryRecord {
    /// Build the record the store persists for a computed month.
    ///
    /// Figures are stored rounded to cents.
    pub fn from_result(
        year: i32,
        month: u32,
        input: &MonthInput,
        result: &MonthResult,
        created_at: DateTime<FixedOffset>,
    ) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ValidationError::InvalidMonth(month));
        }
        let rounded = result.rounded();
        let ir_mode = input.ir_mode().persisted();
        let bareme_provision_rate =
            (input.ir_mode() == IrMode::Bareme).then(|| input.bareme_provision_rate());
        Ok(HistoryRecord {
            year,
            month,
            activity: input.activity(),
            revenue: rounded.revenue,
            contributions: rounded.contributions,
            ir_mode,
            income_tax: ir_mode.map(|_| rounded.income_tax),
            net_after_contributions: rounded.net_after_contributions,
            net_after_all: rounded.net_after_all,
            created_at,
            acre_year: Some(acre_year(&input.acre(), year).value()),
            bareme_provision_rate,
        })
    }

    pub fn activity_label(&self) -> &'static str {
        self.activity.label()
    }

    pub fn income_tax_or_zero(&self) -> Decimal {
        self.income_tax.unwrap_or(Decimal::ZERO)
    }

    /// Year and month as a sortable key
    pub fn period(&self) -> (i32, u32) {
        (self.year, self.month)
    }

    pub fn period_label(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }

    /// Recompute this record's figures from its stored revenue.
    ///
    /// The regime, ACRE tier and provisioning rate stored on the record win
    /// over the profile's, so a record is re-derived with the settings it was
    /// declared under. The profile only fills in what older records lack.
    pub fn rederive(&self, profile: &FiscalProfile) -> Result<MonthResult, ValidationError> {
        let acre = match self.acre_year {
            Some(0) => AcreStatus::none(),
            Some(tier) => AcreStatus::enrolled_in(self.year - i32::from(tier) + 1),
            None => profile.acre,
        };
        let profile = FiscalProfile {
            acre,
            ir_mode: self.ir_mode.unwrap_or(IrMode::None),
            bareme_provision_rate: self
                .bareme_provision_rate
                .unwrap_or(profile.bareme_provision_rate),
        };
        let input = profile.month_input(self.revenue, self.activity)?;
        Ok(compute_month(&input, self.year))
    }

    /// Reject records no computation could have produced
    fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=12).contains(&self.month) {
            return Err(ValidationError::InvalidMonth(self.month));
        }
        let amounts = [
            ("revenue", Some(self.revenue)),
            ("contributions", Some(self.contributions)),
            ("ir_amount", self.income_tax),
            ("net_after_contributions", Some(self.net_after_contributions)),
            ("net_after_all", Some(self.net_after_all)),
        ];
        for (field, value) in amounts {
            if let Some(value) = value.filter(|v| *v < Decimal::ZERO) {
                return Err(ValidationError::NegativeAmount { field, value });
            }
        }
        if let Some(tier) = self.acre_year.filter(|t| AcreYear::new(*t).is_none()) {
            return Err(ValidationError::InvalidAcreYear(tier));
        }
        if let Some(rate) = self
            .bareme_provision_rate
            .filter(|r| ProvisionRate::new(*r).is_none())
        {
            return Err(ValidationError::ProvisionRateOutOfRange(rate));
        }
        Ok(())
    }
}

/// Order records by (year, month, created_at)
pub fn sort_records(records: &mut [HistoryRecord]) {
    records.sort_by_key(|r| (r.year, r.month, r.created_at));
}

/// Records of one fiscal year, or all of them
pub fn records_for_year(records: &[HistoryRecord], year: Option<i32>) -> Vec<HistoryRecord> {
    records
        .iter()
        .filter(|r| year.is_none_or(|y| r.year == y))
        .cloned()
        .collect()
}

/// Read a history from JSON
pub fn read_history_json<R: Read>(reader: R) -> anyhow::Result<HistoryInput> {
    let mut input: HistoryInput = serde_json::from_reader(reader)?;
    validate_records(&input.records)?;
    sort_records(&mut input.records);
    log::info!("Read {} history records", input.records.len());
    Ok(input)
}

/// Read history records from CSV, one record per row
pub fn read_history_csv<R: Read>(reader: R) -> anyhow::Result<HistoryInput> {
    let mut rdr = csv::Reader::from_reader(reader);
    let records: Result<Vec<HistoryRecord>, _> = rdr.deserialize().collect();
    let mut records = records?;
    validate_records(&records)?;
    sort_records(&mut records);
    log::info!("Read {} history records", records.len());
    Ok(HistoryInput {
        profile: None,
        records,
    })
}

pub fn write_history_json<W: Write>(input: &HistoryInput, writer: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, input)?;
    Ok(())
}

fn validate_records(records: &[HistoryRecord]) -> Result<(), ValidationError> {
    records.iter().try_for_each(HistoryRecord::validate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn created(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn record_from_result_without_income_tax() {
        let input = MonthInput::new(
            dec!(1234.57),
            ActivityType::Sale,
            AcreStatus::none(),
            IrMode::None,
            dec!(0),
        )
        .unwrap();
        let result = compute_month(&input, 2025);
        let created_at = created("2025-04-01T09:00:00+02:00");
        let record = HistoryRecord::from_result(2025, 3, &input, &result, created_at).unwrap();
        assert_eq!(record.contributions, dec!(151.85));
        assert_eq!(record.ir_mode, None);
        assert_eq!(record.income_tax, None);
        assert_eq!(record.activity_label(), "Vente de marchandises");
    }

    #[test]
    fn record_from_result_with_income_tax() {
        let input = MonthInput::new(
            dec!(4000),
            ActivityType::Liberal,
            AcreStatus::none(),
            IrMode::Bareme,
            dec!(0.06),
        )
        .unwrap();
        let result = compute_month(&input, 2025);
        let record =
            HistoryRecord::from_result(2025, 5, &input, &result, created("2025-06-01T09:00:00Z"))
                .unwrap();
        assert_eq!(record.ir_mode, Some(IrMode::Bareme));
        assert_eq!(record.income_tax, Some(dec!(158.40)));
    }

    #[test]
    fn record_rejects_invalid_month() {
        let input = MonthInput::new(
            dec!(100),
            ActivityType::Sale,
            AcreStatus::none(),
            IrMode::None,
            dec!(0),
        )
        .unwrap();
        let result = compute_month(&input, 2025);
        let created_at = created("2025-01-01T00:00:00Z");
        let err = HistoryRecord::from_result(2025, 13, &input, &result, created_at).unwrap_err();
        assert_eq!(err, ValidationError::InvalidMonth(13));
    }

    #[test]
    fn parse_json_sorted_by_period() {
        let json = r#"{
            "profile": {
                "acre": { "enrolled": true, "enrollment_year": 2025 },
                "ir_mode": "VersementLiberatoire"
            },
            "records": [
                {
                    "year": 2025, "month": 2, "activity": "Service",
                    "revenue": 3000, "contributions": 318,
                    "ir_mode": "VersementLiberatoire", "ir_amount": 51,
                    "net_after_contributions": 2682, "net_after_all": 2631,
                    "created_at": "2025-03-01T10:00:00+01:00"
                },
                {
                    "year": 2025, "month": 1, "activity": "Service",
                    "revenue": 2000, "contributions": 212,
                    "ir_mode": "VersementLiberatoire", "ir_amount": 34,
                    "net_after_contributions": 1788, "net_after_all": 1754,
                    "created_at": "2025-02-01T10:00:00+01:00"
                }
            ]
        }"#;
        let input = read_history_json(json.as_bytes()).unwrap();
        assert_eq!(input.records.len(), 2);
        assert_eq!(input.records[0].period(), (2025, 1));
        assert_eq!(input.records[1].period(), (2025, 2));
        let profile = input.profile.unwrap();
        assert!(profile.acre.enrolled);
        assert_eq!(profile.bareme_provision_rate, Decimal::ZERO);
    }

    #[test]
    fn parse_csv_with_null_income_tax() {
        let csv_data = "year,month,activity,revenue,contributions,ir_mode,ir_amount,net_after_contributions,net_after_all,created_at
2025,4,Sale,5000,615,,,4385,4385,2025-05-01T08:00:00+02:00
2025,4,Service,1000,212,,,788,788,2025-05-01T08:00:00+02:00
2025,3,Sale,1000,123,,,877,877,2025-04-01T08:00:00+02:00";
        let input = read_history_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(input.records.len(), 3);
        assert_eq!(input.records[0].period_label(), "2025-03");
        assert_eq!(input.records[1].income_tax, None);
        assert_eq!(input.records[1].income_tax_or_zero(), Decimal::ZERO);
    }

    #[test]
    fn rejects_month_out_of_range() {
        let json = r#"{ "records": [ {
            "year": 2025, "month": 0, "activity": "Sale",
            "revenue": 1, "contributions": 0,
            "net_after_contributions": 1, "net_after_all": 1,
            "created_at": "2025-01-01T00:00:00Z"
        } ] }"#;
        assert!(read_history_json(json.as_bytes()).is_err());
    }

    #[test]
    fn same_month_ordered_by_creation() {
        let mut records = vec![
            sample(2025, 6, "2025-07-02T00:00:00Z"),
            sample(2025, 6, "2025-07-01T00:00:00Z"),
            sample(2024, 12, "2025-01-05T00:00:00Z"),
        ];
        sort_records(&mut records);
        assert_eq!(records[0].year, 2024);
        assert_eq!(records[1].created_at, created("2025-07-01T00:00:00Z"));
    }

    #[test]
    fn filter_by_year() {
        let records = vec![
            sample(2024, 12, "2025-01-05T00:00:00Z"),
            sample(2025, 1, "2025-02-05T00:00:00Z"),
        ];
        assert_eq!(records_for_year(&records, Some(2025)).len(), 1);
        assert_eq!(records_for_year(&records, None).len(), 2);
    }

    #[test]
    fn rederive_uses_record_year_for_acre() {
        let profile = FiscalProfile {
            acre: AcreStatus::enrolled_in(2024),
            ..Default::default()
        };
        let mut record = sample(2024, 6, "2024-07-01T00:00:00Z");
        record.activity = ActivityType::Sale;
        record.revenue = dec!(5000);
        assert_eq!(record.rederive(&profile).unwrap().contributions, dec!(307.50));
        record.year = 2027;
        assert_eq!(record.rederive(&profile).unwrap().contributions, dec!(615));
    }

    #[test]
    fn record_keeps_acre_tier_and_provision_rate() {
        let input = MonthInput::new(
            dec!(4000),
            ActivityType::Liberal,
            AcreStatus::enrolled_in(2024),
            IrMode::Bareme,
            dec!(0.06),
        )
        .unwrap();
        let result = compute_month(&input, 2025);
        let record =
            HistoryRecord::from_result(2025, 2, &input, &result, created("2025-03-01T00:00:00Z"))
                .unwrap();
        assert_eq!(record.acre_year, Some(2));
        assert_eq!(record.bareme_provision_rate, Some(dec!(0.06)));

        let changed = FiscalProfile {
            acre: AcreStatus::none(),
            ir_mode: IrMode::None,
            bareme_provision_rate: dec!(0.15),
        };
        assert_eq!(record.rederive(&changed).unwrap(), result);
    }

    #[test]
    fn record_without_income_tax_stores_no_provision_rate() {
        let input = MonthInput::new(
            dec!(1000),
            ActivityType::Sale,
            AcreStatus::none(),
            IrMode::VersementLiberatoire,
            dec!(0),
        )
        .unwrap();
        let result = compute_month(&input, 2025);
        let record =
            HistoryRecord::from_result(2025, 2, &input, &result, created("2025-03-01T00:00:00Z"))
                .unwrap();
        assert_eq!(record.acre_year, Some(0));
        assert_eq!(record.bareme_provision_rate, None);
    }

    #[test]
    fn rejects_negative_amounts() {
        let json = r#"{ "records": [ {
            "year": 2025, "month": 1, "activity": "Sale",
            "revenue": -100, "contributions": 0,
            "net_after_contributions": 0, "net_after_all": 0,
            "created_at": "2025-01-01T00:00:00Z"
        } ] }"#;
        let err = read_history_json(json.as_bytes()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NegativeAmount {
                field: "revenue",
                value: dec!(-100)
            })
        );

        let mut record = sample(2025, 1, "2025-02-01T00:00:00Z");
        record.income_tax = Some(dec!(-0.01));
        assert_eq!(
            record.validate(),
            Err(ValidationError::NegativeAmount {
                field: "ir_amount",
                value: dec!(-0.01)
            })
        );
    }

    #[test]
    fn rejects_unknown_acre_tier() {
        let mut record = sample(2025, 1, "2025-02-01T00:00:00Z");
        record.acre_year = Some(4);
        assert_eq!(record.validate(), Err(ValidationError::InvalidAcreYear(4)));
        record.acre_year = Some(3);
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn rejects_stored_provision_rate_out_of_range() {
        let mut record = sample(2025, 1, "2025-02-01T00:00:00Z");
        record.bareme_provision_rate = Some(dec!(0.5));
        assert_eq!(
            record.validate(),
            Err(ValidationError::ProvisionRateOutOfRange(dec!(0.5)))
        );
    }

    fn sample(year: i32, month: u32, created_at: &str) -> HistoryRecord {
        HistoryRecord {
            year,
            month,
            activity: ActivityType::Service,
            revenue: dec!(1000),
            contributions: dec!(212),
            ir_mode: None,
            income_tax: None,
            net_after_contributions: dec!(788),
            net_after_all: dec!(788),
            created_at: created(created_at),
            acre_year: None,
            bareme_provision_rate: None,
        }
    }
}
