use sqlx::PgPool;
use tracing::{debug, info};

use crate::accounts::error::StoreError;
use crate::accounts::repo_types::Account;
use crate::accounts::services::validate;

const SELECT_ACCOUNT: &str = r#"
    SELECT id, email, username, roles, password, first_name, last_name,
           phone_number, birth_date, profile_picture, bio, is_active, is_verified,
           api_token, api_token_expires_at, refresh_token, refresh_token_expires_at,
           reset_password_token, reset_password_token_expires_at,
           created_at, updated_at, last_login_at, locale, timezone, preferences
    FROM account
"#;

impl Account {
    /// Load an account by id.
    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(&format!("{SELECT_ACCOUNT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(&format!("{SELECT_ACCOUNT} WHERE email = $1"))
            .bind(email)
            .fetch_optional(db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(&format!("{SELECT_ACCOUNT} WHERE username = $1"))
            .bind(username)
            .fetch_optional(db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Persist the record: validate, refresh `updated_at`, then insert or
    /// update depending on whether the store has assigned an id yet.
    ///
    /// Email/username uniqueness is enforced by the store's unique indexes
    /// and surfaces as [`StoreError::Conflict`].
    pub async fn save(&mut self, db: &PgPool) -> Result<(), StoreError> {
        let violations = validate(self);
        if !violations.is_empty() {
            return Err(StoreError::Invalid(violations));
        }
        self.touch();

        match self.id {
            None => {
                let (id,): (i64,) = sqlx::query_as(
                    r#"
                    INSERT INTO account (
                        email, username, roles, password, first_name, last_name,
                        phone_number, birth_date, profile_picture, bio, is_active, is_verified,
                        api_token, api_token_expires_at, refresh_token, refresh_token_expires_at,
                        reset_password_token, reset_password_token_expires_at,
                        created_at, updated_at, last_login_at, locale, timezone, preferences
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                            $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24)
                    RETURNING id
                    "#,
                )
                .bind(&self.email)
                .bind(&self.username)
                .bind(&self.roles)
                .bind(&self.password_hash)
                .bind(&self.first_name)
                .bind(&self.last_name)
                .bind(&self.phone_number)
                .bind(self.birth_date)
                .bind(&self.profile_picture)
                .bind(&self.bio)
                .bind(self.is_active)
                .bind(self.is_verified)
                .bind(&self.api_token)
                .bind(self.api_token_expires_at)
                .bind(&self.refresh_token)
                .bind(self.refresh_token_expires_at)
                .bind(&self.reset_password_token)
                .bind(self.reset_password_token_expires_at)
                .bind(self.created_at)
                .bind(self.updated_at)
                .bind(self.last_login_at)
                .bind(&self.locale)
                .bind(&self.timezone)
                .bind(&self.preferences)
                .fetch_one(db)
                .await
                .map_err(into_store_error)?;

                self.id = Some(id);
                info!(account_id = id, "account created");
                Ok(())
            }
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE account
                    SET email = $1, username = $2, roles = $3, password = $4,
                        first_name = $5, last_name = $6, phone_number = $7, birth_date = $8,
                        profile_picture = $9, bio = $10, is_active = $11, is_verified = $12,
                        api_token = $13, api_token_expires_at = $14,
                        refresh_token = $15, refresh_token_expires_at = $16,
                        reset_password_token = $17, reset_password_token_expires_at = $18,
                        updated_at = $19, last_login_at = $20,
                        locale = $21, timezone = $22, preferences = $23
                    WHERE id = $24
                    "#,
                )
                .bind(&self.email)
                .bind(&self.username)
                .bind(&self.roles)
                .bind(&self.password_hash)
                .bind(&self.first_name)
                .bind(&self.last_name)
                .bind(&self.phone_number)
                .bind(self.birth_date)
                .bind(&self.profile_picture)
                .bind(&self.bio)
                .bind(self.is_active)
                .bind(self.is_verified)
                .bind(&self.api_token)
                .bind(self.api_token_expires_at)
                .bind(&self.refresh_token)
                .bind(self.refresh_token_expires_at)
                .bind(&self.reset_password_token)
                .bind(self.reset_password_token_expires_at)
                .bind(self.updated_at)
                .bind(self.last_login_at)
                .bind(&self.locale)
                .bind(&self.timezone)
                .bind(&self.preferences)
                .bind(id)
                .execute(db)
                .await
                .map_err(into_store_error)?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::NotFound);
                }
                debug!(account_id = id, "account updated");
                Ok(())
            }
        }
    }

    /// Delete an account by id.
    pub async fn delete(db: &PgPool, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM account WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        info!(account_id = id, "account deleted");
        Ok(())
    }
}

/// Map unique-index violations onto the field they protect; everything
/// else passes through as a database error.
fn into_store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(constraint) = db_err.constraint() {
            if let Some(field) = conflict_field(constraint) {
                return StoreError::Conflict { field };
            }
        }
    }
    StoreError::Database(err)
}

fn conflict_field(constraint: &str) -> Option<&'static str> {
    match constraint {
        "uq_account_email" => Some("email"),
        "uq_account_username" => Some("username"),
        _ => None,
    }
}
