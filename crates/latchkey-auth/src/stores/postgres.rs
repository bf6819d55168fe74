//! Postgres-backed user store

use crate::config::UserTableConfig;
use crate::{AuthResult, StoredUser, UserStore};
use async_trait::async_trait;
use sqlx::PgPool;

/// Reads user records from a table described by [`UserTableConfig`]
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
    query: String,
}

impl PgUserStore {
    /// Create a store; fails if any table or column name is not a plain identifier
    pub fn new(pool: PgPool, table: &UserTableConfig) -> AuthResult<Self> {
        table.validate()?;
        Ok(Self {
            pool,
            query: Self::lookup_query(table),
        })
    }

    /// Connect to `database_url` and create a store
    pub async fn connect(database_url: &str, table: &UserTableConfig) -> AuthResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        tracing::info!(table = %table.table, "Connected user store to Postgres");
        Self::new(pool, table)
    }

    fn lookup_query(table: &UserTableConfig) -> String {
        format!(
            "SELECT {id}::text AS id, {email} AS email, {password} AS password_hash \
             FROM {table} WHERE {email} = $1 LIMIT 1",
            id = table.id_column,
            email = table.email_column,
            password = table.password_column,
            table = table.table,
        )
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<StoredUser>> {
        let user = sqlx::query_as::<_, StoredUser>(&self.query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    fn store_name(&self) -> &str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_query_uses_mapping() {
        let table = UserTableConfig {
            table: "auth.accounts".to_string(),
            id_column: "account_id".to_string(),
            email_column: "login".to_string(),
            password_column: "pw_hash".to_string(),
        };

        assert_eq!(
            PgUserStore::lookup_query(&table),
            "SELECT account_id::text AS id, login AS email, pw_hash AS password_hash \
             FROM auth.accounts WHERE login = $1 LIMIT 1"
        );
    }

    #[tokio::test]
    async fn test_rejects_unsafe_identifiers() {
        let table = UserTableConfig {
            table: "users; DROP TABLE users".to_string(),
            ..UserTableConfig::default()
        };
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/latchkey")
            .unwrap();

        assert!(PgUserStore::new(pool, &table).is_err());
    }
}
