//! Payform E2E Test Framework
//!
//! This crate drives the card payment form of the tour shop end to end:
//! - Optionally launches the shop and waits until it answers HTTP
//! - Controls a browser through a Playwright bridge speaking line-delimited JSON
//! - Parses declarative YAML scenarios and fills the form with generated cards
//! - Verifies the resulting payment and order rows in the shop's database
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── run_specs(driver, db, specs) -> SuiteResult          │
//! │    ├── run_scenario(spec, flow) -> ScenarioResult           │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PaymentPage ──> dyn FormDriver ──> PlaywrightSession       │
//! │  DbVerifier  ──> sqlx AnyPool (MySQL / PostgreSQL)          │
//! │  ServerHandle ─> java -jar aqa-shop.jar                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioSpec (YAML)                                        │
//! │    ├── name, title, tags, flows                             │
//! │    ├── card { number, expiry, holder, cvc }                 │
//! │    ├── blank: [field]                                       │
//! │    └── expect { approved | declined | rejected |            │
//! │                 field_invalid { message } }                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod db;
pub mod driver;
pub mod error;
pub mod page;
pub mod playwright;
pub mod runner;
pub mod server;
pub mod spec;

pub use db::{DbVerifier, Schema};
pub use driver::{FormDriver, Locator};
pub use error::{E2eError, E2eResult};
pub use page::{PageSelectors, PageTimeouts, PaymentPage};
pub use playwright::{Browser, PlaywrightConfig, PlaywrightSession};
pub use runner::{RunnerConfig, ScenarioResult, StepResult, StepStatus, SuiteResult, TestRunner};
pub use server::{ServerConfig, ServerHandle};
pub use spec::{CardTemplate, Expectation, ScenarioSpec};
