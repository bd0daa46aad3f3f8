//! Declarative YAML scenario specification

use payform_common::{CardField, CardInfo, DataGenerator, PaymentFlow};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable title shown in reports
    #[serde(default)]
    pub title: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Flows the scenario runs through
    #[serde(default = "default_flows")]
    pub flows: Vec<PaymentFlow>,

    /// How each card field is generated
    #[serde(default)]
    pub card: CardTemplate,

    /// Fields submitted empty
    #[serde(default)]
    pub blank: Vec<CardField>,

    /// What the form and the database must show afterwards
    pub expect: Expectation,
}

fn default_flows() -> Vec<PaymentFlow> {
    PaymentFlow::ALL.to_vec()
}

/// Fixture choice per card field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTemplate {
    pub number: NumberFixture,
    pub expiry: ExpiryFixture,
    pub holder: HolderFixture,
    pub cvc: CvcFixture,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFixture {
    /// Card the bank simulator approves
    #[default]
    Approved,
    /// Card the bank simulator declines
    Declined,
    /// 16 digits unknown to the bank
    Random,
    /// 15 digits
    Short,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryFixture {
    /// 1 to 4 years ahead
    #[default]
    Valid,
    /// More than 5 years ahead
    Future,
    /// 1 to 5 years back
    Past,
    /// Last month of the current year
    PreviousMonth,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderFixture {
    #[default]
    Valid,
    Digits,
    SpecialChars,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvcFixture {
    #[default]
    Random,
    /// Two digits
    Short,
}

/// Expected result of submitting the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Expectation {
    /// Success banner, APPROVED payment, order linked to it
    Approved,
    /// Error banner, DECLINED payment, no order linked to it
    Declined,
    /// Error banner and no success banner; the database is not checked
    Rejected,
    /// Inline validation message, nothing sent to the bank
    FieldInvalid { message: String },
}

impl Expectation {
    /// Whether the submission reaches the bank simulator
    pub fn reaches_bank(&self) -> bool {
        !matches!(self, Expectation::FieldInvalid { .. })
    }
}

impl CardTemplate {
    /// Draw the fixtures this template names
    pub fn resolve<R: Rng>(&self, generator: &mut DataGenerator<R>) -> CardInfo {
        let number = match self.number {
            NumberFixture::Approved => generator.approved_card_number(),
            NumberFixture::Declined => generator.declined_card_number(),
            NumberFixture::Random => generator.random_card_number(),
            NumberFixture::Short => generator.invalid_card_number_short(),
        };
        let expiry = match self.expiry {
            ExpiryFixture::Valid => generator.valid_month_and_year(),
            ExpiryFixture::Future => generator.invalid_future_years(),
            ExpiryFixture::Past => generator.invalid_past_years(),
            ExpiryFixture::PreviousMonth => generator.current_month_and_year(),
        };
        let holder = match self.holder {
            HolderFixture::Valid => generator.valid_holder_name(),
            HolderFixture::Digits => generator.invalid_holder_digits(),
            HolderFixture::SpecialChars => generator.invalid_holder_special_chars(),
        };
        let cvc = match self.cvc {
            CvcFixture::Random => generator.random_cvc(),
            CvcFixture::Short => generator.invalid_cvc(),
        };
        CardInfo::new(number, expiry, holder, cvc)
    }
}

impl ScenarioSpec {
    /// Card for one run of this scenario
    pub fn build_card<R: Rng>(&self, generator: &mut DataGenerator<R>) -> CardInfo {
        let mut card = self.card.resolve(generator);
        for field in &self.blank {
            card.blank(*field);
        }
        card
    }

    /// Title if set, name otherwise
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }

    /// Parse a scenario from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios from a directory, sorted by file path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        if !dir.is_dir() {
            return Err(E2eError::SpecParse(format!(
                "scenario directory not found: {}",
                dir.display()
            )));
        }

        let mut specs: Vec<Self> = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            let spec = Self::from_file(entry.path())?;
            if specs.iter().any(|s| s.name == spec.name) {
                return Err(E2eError::SpecParse(format!(
                    "duplicate scenario name '{}' in {}",
                    spec.name,
                    entry.path().display()
                )));
            }
            specs.push(spec);
        }

        Ok(specs)
    }

    /// Filter specs by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }

    fn validate(&self) -> E2eResult<()> {
        if self.name.trim().is_empty() {
            return Err(E2eError::SpecParse("scenario without a name".to_string()));
        }
        if self.flows.is_empty() {
            return Err(E2eError::SpecParse(format!("{}: empty flow list", self.name)));
        }
        if let Expectation::FieldInvalid { message } = &self.expect {
            if message.trim().is_empty() {
                return Err(E2eError::SpecParse(format!(
                    "{}: field_invalid needs a message",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn generator() -> DataGenerator {
        DataGenerator::seeded(11).with_today(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
    }

    #[test]
    fn test_parse_approved_spec() {
        let yaml = r#"
name: approved-card
title: Успешная покупка с валидными данными карты со статусом APPROVED
tags:
  - smoke
  - db
card:
  number: approved
  expiry: valid
  holder: valid
  cvc: random
expect:
  outcome: approved
"#;
        let spec = ScenarioSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.name, "approved-card");
        assert_eq!(spec.flows, vec![PaymentFlow::Debit, PaymentFlow::Credit]);
        assert_eq!(spec.expect, Expectation::Approved);
        assert!(spec.expect.reaches_bank());

        let card = spec.build_card(&mut generator());
        assert_eq!(card.number, "1111 2222 3333 4444");
        assert_eq!(card.cvc.len(), 3);
    }

    #[test]
    fn test_parse_field_invalid_spec_with_blank_field() {
        let yaml = r#"
name: no-month
flows: [credit]
card:
  number: random
blank: [month]
expect:
  outcome: field_invalid
  message: Месяц Неверный формат
"#;
        let spec = ScenarioSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.flows, vec![PaymentFlow::Credit]);
        assert_eq!(
            spec.expect,
            Expectation::FieldInvalid {
                message: "Месяц Неверный формат".to_string()
            }
        );
        assert!(!spec.expect.reaches_bank());
        assert_eq!(spec.display_name(), "no-month");

        let card = spec.build_card(&mut generator());
        assert_eq!(card.month, "");
        assert_eq!(card.year.len(), 2);
        assert_eq!(card.number.len(), 19);
    }

    #[test]
    fn test_template_defaults() {
        let spec =
            ScenarioSpec::from_yaml("name: defaults\nexpect: { outcome: approved }\n").unwrap();
        assert_eq!(spec.card.number, NumberFixture::Approved);
        assert_eq!(spec.card.expiry, ExpiryFixture::Valid);
        assert_eq!(spec.card.holder, HolderFixture::Valid);
        assert_eq!(spec.card.cvc, CvcFixture::Random);
        assert!(spec.blank.is_empty());
    }

    #[test]
    fn test_previous_month_fixture() {
        let yaml = r#"
name: prev
card: { number: random, expiry: previous_month }
expect: { outcome: rejected }
"#;
        let spec = ScenarioSpec::from_yaml(yaml).unwrap();
        let card = spec.build_card(&mut generator());
        assert_eq!((card.month.as_str(), card.year.as_str()), ("09", "26"));
    }

    #[test]
    fn test_rejects_field_invalid_without_message() {
        let yaml = "name: x\nexpect: { outcome: field_invalid, message: '' }\n";
        let err = ScenarioSpec::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, E2eError::SpecParse(_)));
    }

    #[test]
    fn test_rejects_unknown_fixture() {
        let yaml = "name: x\ncard: { number: stolen }\nexpect: { outcome: approved }\n";
        let err = ScenarioSpec::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, E2eError::Yaml(_)));
    }

    #[test]
    fn test_filter_by_tag() {
        let specs: Vec<ScenarioSpec> = [
            "name: a\ntags: [db]\nexpect: { outcome: approved }\n",
            "name: b\nexpect: { outcome: declined }\n",
        ]
        .iter()
        .map(|yaml| ScenarioSpec::from_yaml(yaml).unwrap())
        .collect();
        let tagged = ScenarioSpec::filter_by_tag(&specs, "db");
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].name, "a");
    }
}
