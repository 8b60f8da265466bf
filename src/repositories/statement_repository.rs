use crate::error::{AppError, Result};
use crate::models::{StatementEntry, TransferLegs};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Append-only store of statement entries.
///
/// The store is where the ledger's isolation guarantees live: the debit and
/// transfer paths re-derive the payer's balance inside the store's own
/// transaction boundary, so two concurrent debits cannot both pass a funds
/// check against a stale sum. Entries are never updated or deleted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatementRepository: Send + Sync {
    /// Appends exactly one entry. Never merges or dedupes.
    async fn append(&self, entry: &StatementEntry) -> Result<StatementEntry>;

    /// Appends a debit entry after re-checking the owner's balance against
    /// the debit magnitude inside a serialized read-then-write. Fails with
    /// `InsufficientFunds` without writing when the check does not hold.
    async fn append_debit(&self, entry: &StatementEntry) -> Result<StatementEntry>;

    /// Writes both legs of a transfer as a single atomic unit, re-checking
    /// the sender's funds inside the same boundary. Either both rows commit
    /// or neither does.
    async fn append_transfer(&self, legs: &TransferLegs) -> Result<TransferLegs>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StatementEntry>>;

    /// All entries owned by the account, in creation order.
    async fn find_by_account(&self, account_id: Uuid) -> Result<Vec<StatementEntry>>;

    /// Algebraic sum of signed amounts owned by the account; zero when the
    /// account has no entries.
    async fn sum_by_account(&self, account_id: Uuid) -> Result<Decimal>;
}

const INSERT_ENTRY: &str = r#"
    INSERT INTO statement_entries (id, account_id, kind, amount, description, counterparty_id, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id, account_id, kind, amount, description, counterparty_id, created_at
"#;

const SELECT_ENTRY: &str = r#"
    SELECT id, account_id, kind, amount, description, counterparty_id, created_at
    FROM statement_entries
"#;

/// Postgres-backed statement store. Funds-checked writes run under
/// SERIALIZABLE isolation; a serialization conflict surfaces as the
/// transient `Database` kind and is never retried here.
pub struct PostgresStatementRepository {
    pool: PgPool,
}

impl PostgresStatementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_entry(
        conn: &mut PgConnection,
        entry: &StatementEntry,
    ) -> Result<StatementEntry> {
        let row = sqlx::query_as::<_, StatementEntry>(INSERT_ENTRY)
            .bind(entry.id)
            .bind(entry.account_id)
            .bind(entry.kind)
            .bind(entry.amount)
            .bind(&entry.description)
            .bind(entry.counterparty_id)
            .bind(entry.created_at)
            .fetch_one(&mut *conn)
            .await?;

        Ok(row)
    }

    async fn sum_on(conn: &mut PgConnection, account_id: Uuid) -> Result<Decimal> {
        let row: (Option<Decimal>,) =
            sqlx::query_as("SELECT SUM(amount) FROM statement_entries WHERE account_id = $1")
                .bind(account_id)
                .fetch_one(&mut *conn)
                .await?;

        Ok(row.0.unwrap_or(Decimal::ZERO))
    }
}

#[async_trait]
impl StatementRepository for PostgresStatementRepository {
    async fn append(&self, entry: &StatementEntry) -> Result<StatementEntry> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_entry(&mut conn, entry).await
    }

    async fn append_debit(&self, entry: &StatementEntry) -> Result<StatementEntry> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let available = Self::sum_on(&mut tx, entry.account_id).await?;
        let requested = entry.magnitude();
        if available < requested {
            return Err(AppError::InsufficientFunds {
                requested,
                available,
            });
        }

        let row = Self::insert_entry(&mut tx, entry).await?;
        tx.commit().await?;

        Ok(row)
    }

    async fn append_transfer(&self, legs: &TransferLegs) -> Result<TransferLegs> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let available = Self::sum_on(&mut tx, legs.sender.account_id).await?;
        let requested = legs.magnitude();
        if available < requested {
            return Err(AppError::InsufficientFunds {
                requested,
                available,
            });
        }

        let receiver = Self::insert_entry(&mut tx, &legs.receiver).await?;
        let sender = Self::insert_entry(&mut tx, &legs.sender).await?;
        tx.commit().await?;

        Ok(TransferLegs { receiver, sender })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StatementEntry>> {
        let row = sqlx::query_as::<_, StatementEntry>(&format!("{SELECT_ENTRY} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Vec<StatementEntry>> {
        let rows = sqlx::query_as::<_, StatementEntry>(&format!(
            "{SELECT_ENTRY} WHERE account_id = $1 ORDER BY created_at"
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn sum_by_account(&self, account_id: Uuid) -> Result<Decimal> {
        let row: (Option<Decimal>,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0) FROM statement_entries WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0.unwrap_or(Decimal::ZERO))
    }
}
