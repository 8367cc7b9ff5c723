use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct RoleStore {
    pool: SqlitePool,
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }

    /// Parse a role string. Unknown values fall back to `Customer`,
    /// matching the column default.
    pub fn from_str(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            _ => Role::Customer,
        }
    }

    /// Strict parse for request validation: only the two known role
    /// names are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    role: String,
}

impl RoleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the role for an email. None means no role record exists.
    pub async fn get(&self, email: &str) -> Result<Option<Role>, sqlx::Error> {
        let row: Option<RoleRow> = sqlx::query_as("SELECT role FROM roles WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Role::from_str(&r.role)))
    }

    /// Insert or update the role record for an email.
    pub async fn upsert(&self, email: &str, role: Role) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO roles (email, role, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(email) DO UPDATE SET role = excluded.role, updated_at = excluded.updated_at",
        )
        .bind(email)
        .bind(role.as_str())
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete the role record for an email. Returns true if a record existed.
    pub async fn delete(&self, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
