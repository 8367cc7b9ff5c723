use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct SubscriptionStore {
    pool: SqlitePool,
}

/// One subscription per email, written by the payment webhook.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub customer_id: String,
    pub email: String,
    pub purchase_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// The access predicate. The boundary `now == expiration_date` counts
    /// as expired.
    pub fn grants_access_at(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expiration_date
    }
}

impl SubscriptionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the subscription record for an email.
    pub async fn get(&self, email: &str) -> Result<Option<SubscriptionRecord>, sqlx::Error> {
        let row: Option<SubscriptionRecord> = sqlx::query_as(
            "SELECT customer_id, email, purchase_date, expiration_date, active, updated_at
             FROM subscriptions WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Insert or update the subscription record for an email.
    /// The purchase date is kept from the original row on renewal.
    pub async fn upsert(
        &self,
        email: &str,
        customer_id: &str,
        expiration_date: DateTime<Utc>,
        active: bool,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO subscriptions (email, customer_id, purchase_date, expiration_date, active, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(email) DO UPDATE SET
                 customer_id = excluded.customer_id,
                 expiration_date = excluded.expiration_date,
                 active = excluded.active,
                 updated_at = excluded.updated_at",
        )
        .bind(email)
        .bind(customer_id)
        .bind(now)
        .bind(expiration_date)
        .bind(active)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
