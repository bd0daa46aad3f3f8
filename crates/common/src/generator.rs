//! Fixture generation for the card form
//!
//! [`DataGenerator`] owns its RNG and the date it treats as "today", so a
//! seeded generator with a pinned date produces the same fixtures on every
//! run. Construct one per suite run and pass it to whatever needs fixtures.

use chrono::{Datelike, Local, NaiveDate};
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::number::raw::NumberWithFormat;
use fake::locales::EN;
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::card::CardMonthAndYear;

/// Card number the bank simulator approves
pub const APPROVED_CARD_NUMBER: &str = "1111 2222 3333 4444";

/// Card number the bank simulator declines
pub const DECLINED_CARD_NUMBER: &str = "5555 6666 7777 8888";

pub fn approved_card_number() -> String {
    APPROVED_CARD_NUMBER.to_string()
}

pub fn declined_card_number() -> String {
    DECLINED_CARD_NUMBER.to_string()
}

pub fn invalid_holder_digits() -> String {
    "12345".to_string()
}

pub fn invalid_holder_special_chars() -> String {
    "@#$%%^&*".to_string()
}

/// Seedable source of card fixtures
pub struct DataGenerator<R = StdRng> {
    rng: R,
    today: NaiveDate,
}

impl DataGenerator<StdRng> {
    /// Deterministic generator for a given seed
    pub fn seeded(seed: u64) -> Self {
        debug!("Fixture generator seeded with {}", seed);
        Self::new(StdRng::seed_from_u64(seed), Local::now().date_naive())
    }
}

impl<R: Rng> DataGenerator<R> {
    pub fn new(rng: R, today: NaiveDate) -> Self {
        Self { rng, today }
    }

    /// Pin the date fixtures are computed against
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn approved_card_number(&self) -> String {
        approved_card_number()
    }

    pub fn declined_card_number(&self) -> String {
        declined_card_number()
    }

    /// 16 random digits in groups of four
    pub fn random_card_number(&mut self) -> String {
        self.digit_pattern("#### #### #### ####")
    }

    /// 15 random digits, one short of a full number
    pub fn invalid_card_number_short(&mut self) -> String {
        self.digit_pattern("#### #### #### ###")
    }

    /// Expiry 1 to 4 years ahead
    pub fn valid_month_and_year(&mut self) -> CardMonthAndYear {
        let offset = self.rng.gen_range(1..=4);
        self.month_and_year(self.today.year() + offset)
    }

    /// Expiry 6 to 50 years ahead, past the 5 year validity window
    pub fn invalid_future_years(&mut self) -> CardMonthAndYear {
        let offset = self.rng.gen_range(6..=50);
        self.month_and_year(self.today.year() + offset)
    }

    /// Expiry 1 to 5 years back
    pub fn invalid_past_years(&mut self) -> CardMonthAndYear {
        let offset = self.rng.gen_range(1..=5);
        self.month_and_year(self.today.year() - offset)
    }

    /// Current year with the month before the current one.
    ///
    /// The month is not wrapped at the year boundary: in January this yields
    /// month `"00"`.
    pub fn current_month_and_year(&self) -> CardMonthAndYear {
        let month = self.today.month() as i32 - 1;
        CardMonthAndYear::new(format!("{:02}", month), two_digit_year(self.today.year()))
    }

    pub fn valid_holder_name(&mut self) -> String {
        let first: String = FirstName().fake_with_rng(&mut self.rng);
        let last: String = LastName().fake_with_rng(&mut self.rng);
        format!("{} {}", first, last)
    }

    pub fn invalid_holder_digits(&self) -> String {
        invalid_holder_digits()
    }

    pub fn invalid_holder_special_chars(&self) -> String {
        invalid_holder_special_chars()
    }

    pub fn random_cvc(&mut self) -> String {
        self.digit_pattern("###")
    }

    /// Two digits, one short of a CVC
    pub fn invalid_cvc(&mut self) -> String {
        self.digit_pattern("##")
    }

    fn month_and_year(&mut self, year: i32) -> CardMonthAndYear {
        let month: u32 = self.rng.gen_range(1..=12);
        CardMonthAndYear::new(format!("{:02}", month), two_digit_year(year))
    }

    /// `pattern` with every `#` replaced by a random digit
    fn digit_pattern(&mut self, pattern: &str) -> String {
        NumberWithFormat(EN, pattern).fake_with_rng(&mut self.rng)
    }
}

fn two_digit_year(year: i32) -> String {
    format!("{:02}", year.rem_euclid(100))
}
