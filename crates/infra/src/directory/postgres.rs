//! Postgres-backed directory.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | DomainError |
//! |------------|----------------------|-------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `NotFound` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolClosed / Io / Tls / other | N/A | `Unavailable` |
//!
//! Schema lives in `migrations/` and is applied by [`PostgresDirectory::connect`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use orgdesk_core::{
    Directory, DomainError, DomainResult, NewOrganisation, NewUser, Organisation, OrganisationId,
    User, UserId,
};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    pool: Arc<PgPool>,
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url` and bring the schema up to date.
    pub async fn connect(database_url: &str) -> DomainResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| DomainError::unavailable(format!("migration failed: {e}")))?;

        tracing::info!("directory schema migrated");
        Ok(Self::new(pool))
    }

    async fn load_user(&self, row: UserRow) -> DomainResult<User> {
        let organisations = self.memberships_of(row.user_id).await?;
        Ok(row.into_user(organisations))
    }

    async fn memberships_of(&self, user_id: Uuid) -> DomainResult<Vec<Organisation>> {
        let rows = sqlx::query(
            r#"
            SELECT o.org_id, o.name, o.description, o.created_at
            FROM organisations o
            JOIN user_organisations uo ON uo.org_id = o.org_id
            WHERE uo.user_id = $1
            ORDER BY uo.created_at ASC, o.org_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("memberships_of", e))?;

        rows.iter()
            .map(|row| {
                OrganisationRow::from_row(row)
                    .map(Organisation::from)
                    .map_err(|e| map_sqlx_error("memberships_of", e))
            })
            .collect()
    }

    async fn user_exists(&self, user_id: Uuid) -> DomainResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("user_exists", e))?;
        Ok(exists)
    }
}

#[async_trait]
impl Directory for PostgresDirectory {
    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_user_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, first_name, last_name, email, password_hash, phone, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_id", e))?;

        match row {
            Some(row) => {
                let row = UserRow::from_row(&row).map_err(|e| map_sqlx_error("find_user_by_id", e))?;
                self.load_user(row).await.map(Some)
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, email), err)]
    async fn find_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, first_name, last_name, email, password_hash, phone, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        match row {
            Some(row) => {
                let row =
                    UserRow::from_row(&row).map_err(|e| map_sqlx_error("find_user_by_email", e))?;
                self.load_user(row).await.map(Some)
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(org_id = %id), err)]
    async fn find_organisation_by_id(
        &self,
        id: OrganisationId,
    ) -> DomainResult<Option<Organisation>> {
        let row = sqlx::query(
            "SELECT org_id, name, description, created_at FROM organisations WHERE org_id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_organisation_by_id", e))?;

        row.map(|row| {
            OrganisationRow::from_row(&row)
                .map(Organisation::from)
                .map_err(|e| map_sqlx_error("find_organisation_by_id", e))
        })
        .transpose()
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn organisations_of(&self, user_id: UserId) -> DomainResult<Vec<Organisation>> {
        if !self.user_exists(*user_id.as_uuid()).await? {
            return Err(DomainError::not_found("user"));
        }
        self.memberships_of(*user_id.as_uuid()).await
    }

    #[instrument(skip(self, user), err)]
    async fn create_user(&self, user: NewUser) -> DomainResult<User> {
        let id = UserId::new();
        let row = sqlx::query(
            r#"
            INSERT INTO users (user_id, first_name, last_name, email, password_hash, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING user_id, first_name, last_name, email, password_hash, phone, created_at
            "#,
        )
        .bind(*id.as_uuid())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(Utc::now())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| match map_sqlx_error("create_user", e) {
            DomainError::Conflict(_) => {
                DomainError::conflict(format!("user with email {} already exists", user.email))
            }
            other => other,
        })?;

        let row = UserRow::from_row(&row).map_err(|e| map_sqlx_error("create_user", e))?;
        Ok(row.into_user(Vec::new()))
    }

    #[instrument(skip(self, org), fields(name = %org.name), err)]
    async fn create_organisation(&self, org: NewOrganisation) -> DomainResult<Organisation> {
        let row = sqlx::query(
            r#"
            INSERT INTO organisations (org_id, name, description, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING org_id, name, description, created_at
            "#,
        )
        .bind(*OrganisationId::new().as_uuid())
        .bind(&org.name)
        .bind(&org.description)
        .bind(Utc::now())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_organisation", e))?;

        OrganisationRow::from_row(&row)
            .map(Organisation::from)
            .map_err(|e| map_sqlx_error("create_organisation", e))
    }

    #[instrument(skip(self), fields(user_id = %user_id, org_id = %org_id), err)]
    async fn add_membership(&self, user_id: UserId, org_id: OrganisationId) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_organisations (user_id, org_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, org_id) DO NOTHING
            "#,
        )
        .bind(*user_id.as_uuid())
        .bind(*org_id.as_uuid())
        .bind(Utc::now())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("add_membership", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id, org_id = %org_id), err)]
    async fn is_member(&self, user_id: UserId, org_id: OrganisationId) -> DomainResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM user_organisations WHERE user_id = $1 AND org_id = $2
            )
            "#,
        )
        .bind(*user_id.as_uuid())
        .bind(*org_id.as_uuid())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("is_member", e))?;
        Ok(exists)
    }
}

/// Map SQLx errors to `DomainError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => DomainError::conflict(msg),
                // Dangling user or organisation reference in a membership insert.
                Some("23503") => DomainError::not_found("user or organisation"),
                _ => DomainError::unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            DomainError::unavailable(format!("connection pool closed in {}", operation))
        }
        _ => DomainError::unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}

struct UserRow {
    user_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            user_id: row.try_get("user_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            phone: row.try_get("phone")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl UserRow {
    fn into_user(self, organisations: Vec<Organisation>) -> User {
        User {
            id: UserId::from_uuid(self.user_id),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            phone: self.phone,
            organisations,
            created_at: self.created_at,
        }
    }
}

struct OrganisationRow {
    org_id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for OrganisationRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrganisationRow {
            org_id: row.try_get("org_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<OrganisationRow> for Organisation {
    fn from(row: OrganisationRow) -> Self {
        Organisation {
            id: OrganisationId::from_uuid(row.org_id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_closed_is_unavailable() {
        let err = map_sqlx_error("find_user_by_id", sqlx::Error::PoolClosed);
        assert!(matches!(err, DomainError::Unavailable(_)));
    }

    #[test]
    fn missing_row_is_unavailable_not_not_found() {
        // Lookups use fetch_optional; RowNotFound here means a broken query.
        let err = map_sqlx_error("create_user", sqlx::Error::RowNotFound);
        assert!(matches!(err, DomainError::Unavailable(_)));
    }
}
