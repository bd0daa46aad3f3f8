//! Payment and order verification against the application's database
//!
//! Read-only: the verifier only ever selects the newest row of a table. It
//! relies on scenarios running one at a time, so the newest row belongs to
//! the submission that just finished.

use payform_common::{OrderRecord, PaymentFlow, PaymentRecord, PaymentStatus};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Row};
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};

/// Table and column names owned by the application under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    /// Card payments
    pub payment_table: String,
    pub payment_id_column: String,

    /// Credit requests
    pub credit_table: String,
    pub credit_id_column: String,

    pub order_table: String,
    /// Order column holding the bank id of the payment it belongs to, in both flows
    pub order_link_column: String,

    pub status_column: String,
    pub created_column: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            payment_table: "payment_entity".to_string(),
            payment_id_column: "transaction_id".to_string(),
            credit_table: "credit_request_entity".to_string(),
            credit_id_column: "bank_id".to_string(),
            order_table: "order_entity".to_string(),
            order_link_column: "payment_id".to_string(),
            status_column: "status".to_string(),
            created_column: "created".to_string(),
        }
    }
}

impl Schema {
    fn payment_source(&self, flow: PaymentFlow) -> (&str, &str) {
        match flow {
            PaymentFlow::Debit => (self.payment_table.as_str(), self.payment_id_column.as_str()),
            PaymentFlow::Credit => (self.credit_table.as_str(), self.credit_id_column.as_str()),
        }
    }

    fn latest_payment_sql(&self, flow: PaymentFlow) -> E2eResult<String> {
        let (table, id_column) = self.payment_source(flow);
        Ok(format!(
            "SELECT {} AS status, {} AS bank_id FROM {} ORDER BY {} DESC LIMIT 1",
            ident(&self.status_column)?,
            ident(id_column)?,
            ident(table)?,
            ident(&self.created_column)?,
        ))
    }

    fn latest_order_sql(&self) -> E2eResult<String> {
        Ok(format!(
            "SELECT {} AS payment_id FROM {} ORDER BY {} DESC LIMIT 1",
            ident(&self.order_link_column)?,
            ident(&self.order_table)?,
            ident(&self.created_column)?,
        ))
    }
}

/// Configured names are spliced into SQL, so only plain identifiers pass
fn ident(name: &str) -> E2eResult<&str> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(name)
    } else {
        Err(E2eError::Config(format!("invalid SQL identifier: {:?}", name)))
    }
}

/// Hide the password part of a connection URL
pub fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    let Some(at) = rest.rfind('@') else {
        return url.to_string();
    };
    let credentials = &rest[..at];
    match credentials.find(':') {
        Some(colon) => format!(
            "{}{}:***{}",
            &url[..scheme_end + 3],
            &credentials[..colon],
            &rest[at..]
        ),
        None => url.to_string(),
    }
}

/// Reads the rows a submission left behind
pub struct DbVerifier {
    pool: AnyPool,
    schema: Schema,
}

impl DbVerifier {
    /// Connect to a MySQL, PostgreSQL or SQLite URL
    pub async fn connect(database_url: &str, schema: Schema) -> E2eResult<Self> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        info!("Connected to {}", redact_url(database_url));
        Ok(Self::from_pool(pool, schema))
    }

    pub fn from_pool(pool: AnyPool, schema: Schema) -> Self {
        Self { pool, schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Status and bank id of the newest payment for `flow`
    pub async fn latest_payment_record(&self, flow: PaymentFlow) -> E2eResult<PaymentRecord> {
        let sql = self.schema.latest_payment_sql(flow)?;
        debug!("{}", sql);

        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                E2eError::RecordNotFound(self.schema.payment_source(flow).0.to_string())
            })?;

        let status: String = row.try_get("status")?;
        let bank_id: Option<String> = row.try_get("bank_id")?;
        Ok(PaymentRecord {
            status: status.parse::<PaymentStatus>()?,
            bank_id,
        })
    }

    /// Payment link of the newest order; both flows write the same column
    pub async fn latest_order_record(&self) -> E2eResult<OrderRecord> {
        let sql = self.schema.latest_order_sql()?;
        debug!("{}", sql);

        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| E2eError::RecordNotFound(self.schema.order_table.clone()))?;

        Ok(OrderRecord {
            payment_id: row.try_get("payment_id")?,
        })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// The payment ended with `expected`
pub fn expect_status(record: &PaymentRecord, expected: PaymentStatus) -> E2eResult<()> {
    if record.status == expected {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(format!(
            "payment status: expected {}, found {}",
            expected, record.status
        )))
    }
}

/// The order references the payment exactly when `linked` is set
pub fn expect_order_link(
    payment: &PaymentRecord,
    order: &OrderRecord,
    linked: bool,
) -> E2eResult<()> {
    match (linked, order.links_to(payment)) {
        (true, true) | (false, false) => Ok(()),
        (true, false) => Err(E2eError::AssertionFailed(format!(
            "order payment id {:?} does not match bank id {:?}",
            order.payment_id, payment.bank_id
        ))),
        (false, true) => Err(E2eError::AssertionFailed(format!(
            "order references declined payment {:?}",
            payment.bank_id
        ))),
    }
}
