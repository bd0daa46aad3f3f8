//! Card form inputs

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Everything typed into the payment form for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    pub number: String,
    pub month: String,
    pub year: String,
    pub holder: String,
    pub cvc: String,
}

impl CardInfo {
    pub fn new(
        number: impl Into<String>,
        expiry: CardMonthAndYear,
        holder: impl Into<String>,
        cvc: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            month: expiry.month,
            year: expiry.year,
            holder: holder.into(),
            cvc: cvc.into(),
        }
    }

    /// Value currently held for `field`
    pub fn field(&self, field: CardField) -> &str {
        match field {
            CardField::Number => &self.number,
            CardField::Month => &self.month,
            CardField::Year => &self.year,
            CardField::Holder => &self.holder,
            CardField::Cvc => &self.cvc,
        }
    }

    /// Submit `field` empty
    pub fn blank(&mut self, field: CardField) {
        match field {
            CardField::Number => self.number.clear(),
            CardField::Month => self.month.clear(),
            CardField::Year => self.year.clear(),
            CardField::Holder => self.holder.clear(),
            CardField::Cvc => self.cvc.clear(),
        }
    }
}

/// Input fields of the card form, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardField {
    Number,
    Month,
    Year,
    Holder,
    Cvc,
}

impl CardField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardField::Number => "number",
            CardField::Month => "month",
            CardField::Year => "year",
            CardField::Holder => "holder",
            CardField::Cvc => "cvc",
        }
    }
}

/// Two-digit month and year drawn together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMonthAndYear {
    pub month: String,
    pub year: String,
}

impl CardMonthAndYear {
    pub fn new(month: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            year: year.into(),
        }
    }

    /// Months between `today` and the expiry month.
    ///
    /// A card is valid through the end of its expiry month, so `0` means it
    /// expires this month and negative values mean it has expired. Years are
    /// read as 20YY.
    pub fn months_until(&self, today: NaiveDate) -> Result<i32> {
        let malformed = || Error::MalformedExpiry {
            month: self.month.clone(),
            year: self.year.clone(),
        };

        let month: i32 = self.month.parse().map_err(|_| malformed())?;
        let year: i32 = self.year.parse().map_err(|_| malformed())?;
        if self.year.len() != 2 || !(0..=12).contains(&month) {
            return Err(malformed());
        }

        let expiry = (2000 + year) * 12 + month;
        let current = today.year() * 12 + today.month() as i32;
        Ok(expiry - current)
    }

    pub fn is_expired(&self, today: NaiveDate) -> Result<bool> {
        Ok(self.months_until(today)? < 0)
    }

    /// True when the expiry lies further out than `years` from `today`
    pub fn exceeds_window(&self, today: NaiveDate, years: i32) -> Result<bool> {
        Ok(self.months_until(today)? > years * 12)
    }
}
