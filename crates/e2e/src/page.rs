//! Page object for the payment form
//!
//! [`PaymentPage`] knows where things are on the tour purchase page and how
//! long to wait for them. It holds no test logic: the runner decides which
//! checks apply to a scenario.

use std::time::Duration;

use payform_common::{CardInfo, PaymentFlow};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::driver::{normalize_text, FormDriver, Locator};
use crate::error::{E2eError, E2eResult};

/// Where the form's elements live.
///
/// Defaults match the aqa-shop markup; override individual entries from the
/// `[selectors]` table of the config file when the markup changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSelectors {
    pub buy_debit: Locator,
    pub buy_credit: Locator,
    pub debit_heading: Locator,
    pub credit_heading: Locator,
    pub number: Locator,
    pub month: Locator,
    pub year: Locator,
    pub holder: Locator,
    pub cvc: Locator,
    pub submit: Locator,
    pub notification: Locator,
    pub success: Locator,
    pub success_content: Locator,
    pub error_content: Locator,
    pub field_invalid: Locator,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            buy_debit: Locator::text("Купить"),
            buy_credit: Locator::text("Купить в кредит"),
            debit_heading: Locator::text("Оплата по карте"),
            credit_heading: Locator::text("Кредит по данным карты"),
            number: Locator::css("form fieldset .input input"),
            month: Locator::css("form fieldset .input-group .input input"),
            year: Locator::css("form fieldset .input-group > span:nth-child(2) .input input"),
            holder: Locator::css("form fieldset > div:nth-child(3) .input-group [view='default']"),
            cvc: Locator::css(
                "form > fieldset > div:nth-child(3) > .input-group > span:nth-child(2) .input input",
            ),
            submit: Locator::css("form fieldset button"),
            notification: Locator::css(".notification"),
            success: Locator::css(".notification_status_ok"),
            success_content: Locator::css(".notification_status_ok .notification__content"),
            error_content: Locator::css(".notification_status_error .notification__content"),
            field_invalid: Locator::css(".input_invalid"),
        }
    }
}

impl PageSelectors {
    fn buy_button(&self, flow: PaymentFlow) -> &Locator {
        match flow {
            PaymentFlow::Debit => &self.buy_debit,
            PaymentFlow::Credit => &self.buy_credit,
        }
    }

    fn heading(&self, flow: PaymentFlow) -> &Locator {
        match flow {
            PaymentFlow::Debit => &self.debit_heading,
            PaymentFlow::Credit => &self.credit_heading,
        }
    }
}

/// Upper bounds for the page's polling waits, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageTimeouts {
    /// Page headings and other plain visibility checks
    pub default_ms: u64,
    /// Bank notifications, which need a round trip to the simulator
    pub notification_ms: u64,
    /// Inline field validation
    pub field_ms: u64,
    /// Delay between two probes of the same element
    pub poll_ms: u64,
}

impl Default for PageTimeouts {
    fn default() -> Self {
        Self {
            default_ms: 4_000,
            notification_ms: 15_000,
            field_ms: 5_000,
            poll_ms: 100,
        }
    }
}

impl PageTimeouts {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_ms)
    }

    pub fn notification(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn field(&self) -> Duration {
        Duration::from_millis(self.field_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

/// The purchase page, driven through a [`FormDriver`]
pub struct PaymentPage<'a> {
    driver: &'a mut dyn FormDriver,
    selectors: &'a PageSelectors,
    timeouts: &'a PageTimeouts,
}

impl<'a> PaymentPage<'a> {
    pub fn new(
        driver: &'a mut dyn FormDriver,
        selectors: &'a PageSelectors,
        timeouts: &'a PageTimeouts,
    ) -> Self {
        Self {
            driver,
            selectors,
            timeouts,
        }
    }

    /// Choose a purchase flow and wait for its form
    pub async fn open_pay_page(&mut self, flow: PaymentFlow) -> E2eResult<()> {
        let s = self.selectors;
        self.driver.click(s.buy_button(flow)).await?;
        let timeout = self.timeouts.default_timeout();
        self.wait_visible(s.heading(flow), timeout).await
    }

    /// Fill every card field and press the submit button
    pub async fn submit_card(&mut self, card: &CardInfo) -> E2eResult<()> {
        debug!("Submitting card {} {}/{}", card.number, card.month, card.year);
        let s = self.selectors;
        self.driver.fill(&s.number, &card.number).await?;
        self.driver.fill(&s.month, &card.month).await?;
        self.driver.fill(&s.year, &card.year).await?;
        self.driver.fill(&s.holder, &card.holder).await?;
        self.driver.fill(&s.cvc, &card.cvc).await?;
        self.driver.click(&s.submit).await
    }

    /// Block until any bank notification shows up
    pub async fn wait_for_notification(&mut self) -> E2eResult<()> {
        let s = self.selectors;
        let timeout = self.timeouts.notification();
        self.wait_visible(&s.notification, timeout).await
    }

    pub async fn assert_success_text(&mut self, expected: &str) -> E2eResult<()> {
        let s = self.selectors;
        let timeout = self.timeouts.notification();
        self.wait_text(&s.success_content, expected, timeout).await
    }

    pub async fn assert_error_text(&mut self, expected: &str) -> E2eResult<()> {
        let s = self.selectors;
        let timeout = self.timeouts.notification();
        self.wait_text(&s.error_content, expected, timeout).await
    }

    /// The success banner must not be visible once the wait ends
    pub async fn assert_success_notification_absent(&mut self) -> E2eResult<()> {
        let s = self.selectors;
        let timeout = self.timeouts.notification();
        self.wait_hidden(&s.success, timeout).await
    }

    /// First inline validation message reads exactly `expected`
    pub async fn assert_field_invalid(&mut self, expected: &str) -> E2eResult<()> {
        let s = self.selectors;
        let timeout = self.timeouts.field();
        self.wait_text(&s.field_invalid, expected, timeout).await
    }

    async fn wait_visible(&mut self, locator: &Locator, timeout: Duration) -> E2eResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.driver.visible_text(locator).await?.is_some() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(E2eError::Timeout(format!(
                    "{} to be visible ({} ms)",
                    locator,
                    timeout.as_millis()
                )));
            }
            sleep(self.timeouts.poll()).await;
        }
    }

    async fn wait_hidden(&mut self, locator: &Locator, timeout: Duration) -> E2eResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.driver.visible_text(locator).await?.is_none() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(E2eError::AssertionFailed(format!(
                    "{} still visible after {} ms",
                    locator,
                    timeout.as_millis()
                )));
            }
            sleep(self.timeouts.poll()).await;
        }
    }

    async fn wait_text(
        &mut self,
        locator: &Locator,
        expected: &str,
        timeout: Duration,
    ) -> E2eResult<()> {
        let expected = normalize_text(expected);
        let deadline = Instant::now() + timeout;
        let mut last_seen = None;
        loop {
            if let Some(text) = self.driver.visible_text(locator).await? {
                let actual = normalize_text(&text);
                if actual == expected {
                    return Ok(());
                }
                last_seen = Some(actual);
            }
            if Instant::now() >= deadline {
                return Err(match last_seen {
                    Some(actual) => E2eError::AssertionFailed(format!(
                        "{}: expected text '{}', found '{}'",
                        locator, expected, actual
                    )),
                    None => E2eError::Timeout(format!(
                        "{} to show '{}' ({} ms)",
                        locator,
                        expected,
                        timeout.as_millis()
                    )),
                });
            }
            sleep(self.timeouts.poll()).await;
        }
    }
}
