//! In-process stand-in for the shop page, and a SQLite store shaped like the shop's

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use payform_common::generator::{APPROVED_CARD_NUMBER, DECLINED_CARD_NUMBER};
use payform_common::messages::{
    APPROVED_NOTIFICATION, DECLINED_NOTIFICATION, MONTH_INVALID_FORMAT, NUMBER_INVALID_FORMAT,
};
use payform_common::{CardField, PaymentFlow};
use payform_e2e::{E2eError, E2eResult, FormDriver, Locator, PageSelectors, PageTimeouts};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

pub const BASE_URL: &str = "http://shop.test";

pub fn fast_timeouts() -> PageTimeouts {
    PageTimeouts {
        default_ms: 200,
        notification_ms: 300,
        field_ms: 200,
        poll_ms: 5,
    }
}

/// In-memory SQLite with the shop's three tables
pub async fn shop_store() -> AnyPool {
    sqlx::any::install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    for ddl in [
        "CREATE TABLE payment_entity (id INTEGER PRIMARY KEY, status TEXT NOT NULL, transaction_id TEXT, created INTEGER NOT NULL)",
        "CREATE TABLE credit_request_entity (id INTEGER PRIMARY KEY, status TEXT NOT NULL, bank_id TEXT, created INTEGER NOT NULL)",
        "CREATE TABLE order_entity (id INTEGER PRIMARY KEY, payment_id TEXT, credit_id TEXT, created INTEGER NOT NULL)",
    ] {
        sqlx::query(ddl).execute(&pool).await.unwrap();
    }
    pool
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Banner {
    Ok,
    Error,
}

/// Behaves like the purchase page for the checks the runner makes.
///
/// Banners only show after `banner_delay_probes` probes so the page object's
/// polling is exercised. With `swap_banners` set the bank answers backwards.
pub struct FakeShop {
    selectors: PageSelectors,
    store: Option<AnyPool>,
    flow: Option<PaymentFlow>,
    inputs: HashMap<CardField, String>,
    banner: Option<Banner>,
    field_error: Option<&'static str>,
    probes_since_submit: u32,
    clock: i64,
    pub banner_delay_probes: u32,
    pub swap_banners: bool,
    pub submissions: u32,
    pub screenshots: Vec<String>,
}

impl FakeShop {
    pub fn new(store: Option<AnyPool>) -> Self {
        Self {
            selectors: PageSelectors::default(),
            store,
            flow: None,
            inputs: HashMap::new(),
            banner: None,
            field_error: None,
            probes_since_submit: 0,
            clock: 0,
            banner_delay_probes: 3,
            swap_banners: false,
            submissions: 0,
            screenshots: Vec::new(),
        }
    }

    fn field_for(&self, locator: &Locator) -> Option<CardField> {
        let s = &self.selectors;
        [
            (&s.number, CardField::Number),
            (&s.month, CardField::Month),
            (&s.year, CardField::Year),
            (&s.holder, CardField::Holder),
            (&s.cvc, CardField::Cvc),
        ]
        .into_iter()
        .find(|(l, _)| *l == locator)
        .map(|(_, field)| field)
    }

    fn input(&self, field: CardField) -> &str {
        self.inputs.get(&field).map(String::as_str).unwrap_or("")
    }

    async fn submit(&mut self, flow: PaymentFlow) -> E2eResult<()> {
        self.submissions += 1;
        self.probes_since_submit = 0;

        let digits = self.input(CardField::Number).chars().filter(char::is_ascii_digit).count();
        if digits != 16 {
            self.field_error = Some(NUMBER_INVALID_FORMAT);
            return Ok(());
        }
        if self.input(CardField::Month).is_empty() {
            self.field_error = Some(MONTH_INVALID_FORMAT);
            return Ok(());
        }

        let number = self.input(CardField::Number).to_string();
        let status = if number == APPROVED_CARD_NUMBER {
            Some("APPROVED")
        } else if number == DECLINED_CARD_NUMBER {
            Some("DECLINED")
        } else {
            None
        };

        let approved = status == Some("APPROVED");
        self.banner = Some(if approved != self.swap_banners {
            Banner::Ok
        } else {
            Banner::Error
        });

        if let (Some(status), Some(store)) = (status, &self.store) {
            self.clock += 1;
            let bank_id = format!("bank-{}", self.clock);
            let (table, id_column) = match flow {
                PaymentFlow::Debit => ("payment_entity", "transaction_id"),
                PaymentFlow::Credit => ("credit_request_entity", "bank_id"),
            };
            let link = if approved {
                format!("'{}'", bank_id)
            } else {
                "NULL".to_string()
            };
            let payment = format!(
                "INSERT INTO {} (status, {}, created) VALUES ('{}', '{}', {})",
                table, id_column, status, bank_id, self.clock
            );
            // Both flows link the order through payment_id; credit_id stays empty
            let order = format!(
                "INSERT INTO order_entity (payment_id, created) VALUES ({}, {})",
                link, self.clock
            );
            sqlx::query(&payment).execute(store).await?;
            sqlx::query(&order).execute(store).await?;
        }
        Ok(())
    }

    fn banner_shown(&mut self) -> Option<Banner> {
        self.probes_since_submit += 1;
        if self.probes_since_submit > self.banner_delay_probes {
            self.banner
        } else {
            None
        }
    }
}

#[async_trait]
impl FormDriver for FakeShop {
    async fn goto(&mut self, url: &str) -> E2eResult<()> {
        if url != BASE_URL {
            return Err(E2eError::Playwright(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)));
        }
        self.flow = None;
        self.inputs.clear();
        self.banner = None;
        self.field_error = None;
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> E2eResult<()> {
        if *locator == self.selectors.buy_debit {
            self.flow = Some(PaymentFlow::Debit);
            Ok(())
        } else if *locator == self.selectors.buy_credit {
            self.flow = Some(PaymentFlow::Credit);
            Ok(())
        } else if *locator == self.selectors.submit {
            match self.flow {
                Some(flow) => self.submit(flow).await,
                None => Err(E2eError::Playwright(format!("{} not found", locator))),
            }
        } else {
            Err(E2eError::Playwright(format!("{} not found", locator)))
        }
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> E2eResult<()> {
        let field = self
            .field_for(locator)
            .ok_or_else(|| E2eError::Playwright(format!("{} not found", locator)))?;
        self.inputs.insert(field, value.to_string());
        Ok(())
    }

    async fn visible_text(&mut self, locator: &Locator) -> E2eResult<Option<String>> {
        let s = self.selectors.clone();
        let text = match self.flow {
            Some(PaymentFlow::Debit) if *locator == s.debit_heading => {
                Some("Оплата по карте".to_string())
            }
            Some(PaymentFlow::Credit) if *locator == s.credit_heading => {
                Some("Кредит по данным карты".to_string())
            }
            _ if *locator == s.field_invalid => self.field_error.map(|m| {
                let (label, message) = m.split_once(' ').unwrap_or((m, ""));
                format!("{}\n{}", label, message)
            }),
            _ if *locator == s.notification => self.banner_shown().map(|_| "Успешно".to_string()),
            _ if *locator == s.success || *locator == s.success_content => {
                match self.banner_shown() {
                    Some(Banner::Ok) => Some(APPROVED_NOTIFICATION.to_string()),
                    _ => None,
                }
            }
            _ if *locator == s.error_content => match self.banner_shown() {
                Some(Banner::Error) => Some(format!("  {}  ", DECLINED_NOTIFICATION)),
                _ => None,
            },
            _ => None,
        };
        Ok(text)
    }

    async fn screenshot(&mut self, path: &Path) -> E2eResult<()> {
        std::fs::write(path, b"\x89PNG")?;
        self.screenshots.push(path.display().to_string());
        Ok(())
    }
}
