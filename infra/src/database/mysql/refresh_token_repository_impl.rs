//! MySQL implementation of the RefreshTokenRepository trait.
//!
//! Persists the refresh token ledger with SQLx. Rows are append-mostly:
//! the only update ever applied is setting `revoked_at`, and rotation
//! writes happen inside a transaction guarded by `revoked_at IS NULL` so
//! concurrent rotations of the same record cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use care_core::domain::entities::refresh_token::RefreshTokenRecord;
use care_core::errors::{DomainError, RefreshTokenError};
use care_core::repositories::RefreshTokenRepository;

/// MySQL implementation of RefreshTokenRepository
pub struct MySqlRefreshTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRefreshTokenRepository {
    /// Create a new MySQL refresh token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a RefreshTokenRecord entity
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<RefreshTokenRecord, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get id: {}", e) })?;

        let rotated_from: Option<String> = row.try_get("rotated_from").map_err(|e| {
            DomainError::Internal { message: format!("Failed to get rotated_from: {}", e) }
        })?;

        Ok(RefreshTokenRecord {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::Internal { message: format!("Invalid record UUID: {}", e) })?,
            user_id: row
                .try_get("user_id")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get user_id: {}", e) })?,
            token_hash: row.try_get("token_hash").map_err(|e| {
                DomainError::Internal { message: format!("Failed to get token_hash: {}", e) }
            })?,
            rotated_from: rotated_from
                .map(|raw| Uuid::parse_str(&raw))
                .transpose()
                .map_err(|e| DomainError::Internal { message: format!("Invalid rotated_from UUID: {}", e) })?,
            ip: row
                .try_get("ip")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get ip: {}", e) })?,
            user_agent: row.try_get("user_agent").map_err(|e| {
                DomainError::Internal { message: format!("Failed to get user_agent: {}", e) }
            })?,
            issued_at: row.try_get::<DateTime<Utc>, _>("issued_at").map_err(|e| {
                DomainError::Internal { message: format!("Failed to get issued_at: {}", e) }
            })?,
            expired_at: row.try_get::<DateTime<Utc>, _>("expired_at").map_err(|e| {
                DomainError::Internal { message: format!("Failed to get expired_at: {}", e) }
            })?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get revoked_at: {}", e) })?,
        })
    }
}

const INSERT_QUERY: &str = r#"
    INSERT INTO refresh_tokens (
        id, user_id, token_hash, rotated_from, ip, user_agent,
        issued_at, expired_at, revoked_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, token_hash, rotated_from, ip, user_agent,
           issued_at, expired_at, revoked_at
    FROM refresh_tokens
"#;

#[async_trait]
impl RefreshTokenRepository for MySqlRefreshTokenRepository {
    async fn save(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        // token_hash carries a UNIQUE index; a duplicate surfaces here
        sqlx::query(INSERT_QUERY)
            .bind(record.id.to_string())
            .bind(record.user_id)
            .bind(&record.token_hash)
            .bind(record.rotated_from.map(|id| id.to_string()))
            .bind(&record.ip)
            .bind(&record.user_agent)
            .bind(record.issued_at)
            .bind(record.expired_at)
            .bind(record.revoked_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to save refresh token: {}", e),
            })?;

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find refresh token by id: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let query = format!("{} WHERE user_id = ? ORDER BY issued_at DESC", SELECT_COLUMNS);

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find user refresh tokens: {}", e),
            })?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(Self::row_to_record(&row)?);
        }

        Ok(records)
    }

    async fn update(&self, record: &RefreshTokenRecord) -> Result<(), DomainError> {
        // Guarded like save_rotation: revoked_at is terminal, so the row
        // is only written while it is still NULL. Zero affected rows means
        // a concurrent revoke already won (or the row never existed).
        let query = r#"
            UPDATE refresh_tokens
            SET revoked_at = ?
            WHERE id = ? AND revoked_at IS NULL
        "#;

        let result = sqlx::query(query)
            .bind(record.revoked_at)
            .bind(record.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to update refresh token: {}", e),
            })?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(record.id).await? {
                Some(_) => Err(RefreshTokenError::AlreadyRevoked.into()),
                None => Err(DomainError::NotFound {
                    resource: format!("refresh token {}", record.id),
                }),
            };
        }

        Ok(())
    }

    async fn save_rotation(
        &self,
        revoked: &RefreshTokenRecord,
        replacement: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| DomainError::Internal {
            message: format!("Failed to open rotation transaction: {}", e),
        })?;

        // Guarded revoke: a concurrent rotate or revoke that already won
        // leaves zero affected rows, and this rotation loses.
        let revoke_result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = ?
            WHERE id = ? AND revoked_at IS NULL
            "#,
        )
        .bind(revoked.revoked_at)
        .bind(revoked.id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to revoke rotated token: {}", e),
        })?;

        if revoke_result.rows_affected() == 0 {
            tx.rollback().await.map_err(|e| DomainError::Internal {
                message: format!("Failed to roll back rotation: {}", e),
            })?;
            return Err(RefreshTokenError::NotFound.into());
        }

        sqlx::query(INSERT_QUERY)
            .bind(replacement.id.to_string())
            .bind(replacement.user_id)
            .bind(&replacement.token_hash)
            .bind(replacement.rotated_from.map(|id| id.to_string()))
            .bind(&replacement.ip)
            .bind(&replacement.user_agent)
            .bind(replacement.issued_at)
            .bind(replacement.expired_at)
            .bind(replacement.revoked_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to insert rotated token: {}", e),
            })?;

        tx.commit().await.map_err(|e| DomainError::Internal {
            message: format!("Failed to commit rotation: {}", e),
        })?;

        Ok(replacement)
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expired_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to delete expired refresh tokens: {}", e),
            })?;

        Ok(result.rows_affected() as usize)
    }
}
