//! Ledger store - the append-only table of transactions.
//!
//! A [`Ledger`] can only be obtained through [`Ledger::initialize`], which
//! ensures the schema exists, so every append and aggregate runs against an
//! initialized store. The wrapped `DatabaseConnection` is a pool: each call
//! checks a connection out for the duration of one statement.
//!
//! Amounts are written as `Decimal` into a NUMERIC(12, 2) column and read
//! back as text, which keeps them exact on PostgreSQL and lets the `SQLite`
//! representation (a float or an integer) be parsed and rounded to two digits.
//!
//! `append` is not idempotent. A retry after an ambiguous failure can record
//! the same entry twice; there is no deduplication.

use crate::{
    config::database,
    core::amount,
    core::validation::MAX_CATEGORY_CHARS,
    entities::{Transaction, TransactionKind, transaction},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{
    QueryOrder, QuerySelect, Set,
    prelude::*,
    sea_query::{Alias, Func, SimpleExpr},
};
use std::{ops::Add, str::FromStr, sync::Arc};
use tracing::{debug, instrument};

/// Chat platform identity that partitions the ledger.
pub type UserId = i64;

/// Per-user sums of each entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    /// Sum of all income amounts
    pub income: Decimal,
    /// Sum of all expense amounts
    pub expense: Decimal,
}

impl Add for Totals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            income: self.income + rhs.income,
            expense: self.expense + rhs.expense,
        }
    }
}

/// One stored entry as read back from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Id assigned on insert
    pub id: i64,
    /// Amount with two fractional digits
    pub amount: Decimal,
    /// Category label
    pub category: String,
    /// Income or expense
    pub kind: TransactionKind,
    /// Insertion time set by the database
    pub created_at: DateTimeUtc,
}

/// Handle to the transactions table.
#[derive(Debug, Clone)]
pub struct Ledger {
    db: Arc<DatabaseConnection>,
}

impl Ledger {
    /// Creates the schema if it is missing and returns a usable ledger.
    ///
    /// Safe to call on every startup, including against a `transactions`
    /// table that already exists with the same columns.
    #[instrument(skip(db))]
    pub async fn initialize(db: DatabaseConnection) -> Result<Self> {
        database::create_tables(&db).await?;
        debug!("Ledger schema ensured");
        Ok(Self { db: Arc::new(db) })
    }

    /// Underlying connection pool.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Persists a new entry and returns its id.
    ///
    /// Amounts that are not positive or do not fit NUMERIC(12, 2), and
    /// categories longer than the column allows, are refused with
    /// [`Error::ConstraintViolation`] before anything is written.
    #[instrument(skip(self, amount, category))]
    pub async fn append(
        &self,
        user_id: UserId,
        amount: Decimal,
        category: &str,
        kind: TransactionKind,
    ) -> Result<i64> {
        let amount = amount::round(amount);
        if amount <= Decimal::ZERO || amount > amount::max_amount() {
            return Err(Error::ConstraintViolation {
                message: format!("amount {amount} is outside the storable range"),
            });
        }

        if category.chars().count() > MAX_CATEGORY_CHARS {
            return Err(Error::ConstraintViolation {
                message: format!("category longer than {MAX_CATEGORY_CHARS} characters"),
            });
        }

        let entry = transaction::ActiveModel {
            user_id: Set(user_id),
            amount: Set(amount),
            category: Set(category.to_string()),
            kind: Set(kind),
            ..Default::default()
        };

        let id = Transaction::insert(entry)
            .exec(self.db.as_ref())
            .await?
            .last_insert_id;
        debug!(id, %amount, category, "Transaction appended");
        Ok(id)
    }

    /// Sums income and expense amounts for one user.
    ///
    /// A user with no entries gets zero for both totals.
    #[instrument(skip(self))]
    pub async fn aggregate(&self, user_id: UserId) -> Result<Totals> {
        let rows: Vec<(TransactionKind, String)> = Transaction::find()
            .select_only()
            .column(transaction::Column::Kind)
            .column_as(amount_as_text(), "amount_text")
            .filter(transaction::Column::UserId.eq(user_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        let mut totals = Totals::default();
        for (kind, text) in rows {
            let value = parse_stored_amount(&text)?;
            match kind {
                TransactionKind::Income => totals.income += value,
                TransactionKind::Expense => totals.expense += value,
            }
        }
        Ok(totals)
    }

    /// Most recent entries for a user, newest first.
    #[instrument(skip(self))]
    pub async fn history(&self, user_id: UserId, limit: u64) -> Result<Vec<Entry>> {
        let rows: Vec<(i64, String, String, TransactionKind, DateTimeUtc)> = Transaction::find()
            .select_only()
            .column(transaction::Column::Id)
            .column_as(amount_as_text(), "amount_text")
            .column(transaction::Column::Category)
            .column(transaction::Column::Kind)
            .column(transaction::Column::CreatedAt)
            .filter(transaction::Column::UserId.eq(user_id))
            .order_by_desc(transaction::Column::CreatedAt)
            .order_by_desc(transaction::Column::Id)
            .limit(limit)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        rows.into_iter()
            .map(|(id, text, category, kind, created_at)| {
                Ok(Entry {
                    id,
                    amount: parse_stored_amount(&text)?,
                    category,
                    kind,
                    created_at,
                })
            })
            .collect()
    }
}

// CAST(amount AS TEXT): exact NUMERIC text on Postgres, shortest round-trip text on SQLite
fn amount_as_text() -> SimpleExpr {
    Func::cast_as(Expr::col(transaction::Column::Amount), Alias::new("TEXT")).into()
}

fn parse_stored_amount(text: &str) -> Result<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map(amount::round)
        .map_err(|e| Error::ConstraintViolation {
            message: format!("stored amount '{text}' is not a decimal: {e}"),
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{
        ConnectionTrait, DatabaseBackend, MockDatabase, MockExecResult, RuntimeErr, Statement,
    };

    #[tokio::test]
    async fn test_new_user_has_zero_totals() -> Result<()> {
        let ledger = setup_test_ledger().await?;

        let totals = ledger.aggregate(42).await?;
        assert_eq!(totals, Totals::default());
        assert_eq!(totals.income, Decimal::ZERO);
        assert_eq!(totals.expense, Decimal::ZERO);

        Ok(())
    }

    #[tokio::test]
    async fn test_append_assigns_ids_and_stores_exact_amount() -> Result<()> {
        let ledger = setup_test_ledger().await?;

        let first = ledger
            .append(1, dec("1000.00"), "зарплата", TransactionKind::Income)
            .await?;
        let second = ledger
            .append(1, dec("0.10"), "coffee", TransactionKind::Expense)
            .await?;
        assert_ne!(first, second);

        let stored = ledger.history(1, 10).await?;
        assert_eq!(stored.len(), 2);
        let salary = stored.iter().find(|t| t.id == first).unwrap();
        assert_eq!(salary.amount, dec("1000.00"));
        assert_eq!(salary.category, "зарплата");
        assert_eq!(salary.kind, TransactionKind::Income);
        let coffee = stored.iter().find(|t| t.id == second).unwrap();
        assert_eq!(coffee.amount, dec("0.10"));

        Ok(())
    }

    #[tokio::test]
    async fn test_aggregate_sums_per_kind() -> Result<()> {
        let ledger = setup_test_ledger().await?;

        ledger
            .append(1, dec("1000.00"), "зарплата", TransactionKind::Income)
            .await?;
        assert_eq!(
            ledger.aggregate(1).await?,
            Totals {
                income: dec("1000.00"),
                expense: Decimal::ZERO,
            }
        );

        ledger
            .append(1, dec("300.00"), "продукты", TransactionKind::Expense)
            .await?;
        assert_eq!(
            ledger.aggregate(1).await?,
            Totals {
                income: dec("1000.00"),
                expense: dec("300.00"),
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_aggregate_has_no_float_drift() -> Result<()> {
        let ledger = setup_test_ledger().await?;

        for _ in 0..10 {
            ledger
                .append(5, dec("0.10"), "candy", TransactionKind::Expense)
                .await?;
        }
        ledger
            .append(5, dec("0.20"), "refund", TransactionKind::Income)
            .await?;
        ledger
            .append(5, dec("0.10"), "refund", TransactionKind::Income)
            .await?;

        let totals = ledger.aggregate(5).await?;
        assert_eq!(totals.expense, dec("1.00"));
        assert_eq!(totals.income, dec("0.30"));
        assert_eq!(amount::format(totals.income), "0.30");

        Ok(())
    }

    #[tokio::test]
    async fn test_aggregate_is_partitioned_by_user() -> Result<()> {
        let ledger = setup_test_ledger().await?;

        ledger
            .append(1, dec("100"), "a", TransactionKind::Income)
            .await?;
        ledger
            .append(2, dec("70"), "b", TransactionKind::Expense)
            .await?;

        assert_eq!(ledger.aggregate(1).await?.expense, Decimal::ZERO);
        assert_eq!(ledger.aggregate(2).await?.income, Decimal::ZERO);
        assert_eq!(ledger.aggregate(2).await?.expense, dec("70"));
        assert_eq!(ledger.aggregate(3).await?, Totals::default());

        Ok(())
    }

    #[tokio::test]
    async fn test_aggregate_is_idempotent() -> Result<()> {
        let ledger = setup_test_ledger().await?;
        ledger
            .append(9, dec("12.34"), "x", TransactionKind::Income)
            .await?;
        ledger
            .append(9, dec("5.67"), "y", TransactionKind::Expense)
            .await?;

        let first = ledger.aggregate(9).await?;
        let second = ledger.aggregate(9).await?;
        assert_eq!(first, second);

        Ok(())
    }

    #[tokio::test]
    async fn test_aggregate_is_additive_and_order_independent() -> Result<()> {
        let entries = [
            ("1000.00", TransactionKind::Income),
            ("300.00", TransactionKind::Expense),
            ("0.01", TransactionKind::Expense),
            ("49.99", TransactionKind::Income),
            ("12.50", TransactionKind::Expense),
        ];

        // Sum of single-entry aggregates, each in a fresh ledger
        let mut expected = Totals::default();
        for (raw, kind) in entries {
            let single = setup_test_ledger().await?;
            single.append(1, dec(raw), "c", kind).await?;
            expected = expected + single.aggregate(1).await?;
        }

        let forward = setup_test_ledger().await?;
        for (raw, kind) in entries {
            forward.append(1, dec(raw), "c", kind).await?;
        }

        let backward = setup_test_ledger().await?;
        for (raw, kind) in entries.iter().rev() {
            backward.append(1, dec(raw), "c", *kind).await?;
        }

        assert_eq!(forward.aggregate(1).await?, expected);
        assert_eq!(backward.aggregate(1).await?, expected);

        Ok(())
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() -> Result<()> {
        let ledger = setup_test_ledger().await?;
        ledger
            .append(1, dec("10"), "kept", TransactionKind::Income)
            .await?;

        database::create_tables(ledger.connection()).await?;
        assert_eq!(ledger.aggregate(1).await?.income, dec("10"));

        Ok(())
    }

    #[tokio::test]
    async fn test_clones_share_one_pool() -> Result<()> {
        let ledger = setup_test_ledger().await?;
        let handle = ledger.clone();

        handle
            .append(3, dec("25.75"), "shared", TransactionKind::Expense)
            .await?;
        assert_eq!(ledger.aggregate(3).await?.expense, dec("25.75"));
        assert!(std::ptr::eq(ledger.connection(), handle.connection()));

        Ok(())
    }

    #[tokio::test]
    async fn test_created_at_is_set_by_the_database() -> Result<()> {
        let ledger = setup_test_ledger().await?;
        let before = chrono::Utc::now() - chrono::TimeDelta::seconds(5);

        ledger
            .append(6, dec("1"), "t", TransactionKind::Income)
            .await?;

        let after = chrono::Utc::now() + chrono::TimeDelta::seconds(5);
        let stored = ledger.history(6, 1).await?;
        assert!(stored[0].created_at >= before, "{:?}", stored[0].created_at);
        assert!(stored[0].created_at <= after, "{:?}", stored[0].created_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_whole_and_fractional_amounts_read_back_exactly() -> Result<()> {
        let ledger = setup_test_ledger().await?;
        for raw in ["1000", "0.01", "12.5", "9999999999.99"] {
            ledger
                .append(8, dec(raw), "r", TransactionKind::Income)
                .await?;
        }

        let mut amounts: Vec<Decimal> = ledger
            .history(8, 10)
            .await?
            .into_iter()
            .map(|entry| entry.amount)
            .collect();
        amounts.sort();
        assert_eq!(
            amounts,
            vec![dec("0.01"), dec("12.50"), dec("1000.00"), dec("9999999999.99")]
        );
        assert_eq!(ledger.aggregate(8).await?.income, dec("10000001012.50"));

        Ok(())
    }

    #[tokio::test]
    async fn test_reuses_table_created_by_earlier_deployments() -> Result<()> {
        let db = memory_connection().await?;
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "CREATE TABLE transactions ( \
                id INTEGER PRIMARY KEY AUTOINCREMENT, \
                user_id BIGINT NOT NULL, \
                amount DECIMAL(12, 2) NOT NULL, \
                category VARCHAR(100), \
                type VARCHAR(10) CHECK (type IN ('income', 'expense')), \
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP)",
        ))
        .await?;
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "INSERT INTO transactions (user_id, amount, category, type) \
             VALUES (1, 1000.00, 'зарплата', 'income')",
        ))
        .await?;

        let ledger = Ledger::initialize(db).await?;
        ledger
            .append(1, dec("300.00"), "продукты", TransactionKind::Expense)
            .await?;

        assert_eq!(
            ledger.aggregate(1).await?,
            Totals {
                income: dec("1000.00"),
                expense: dec("300.00"),
            }
        );
        assert_eq!(ledger.history(1, 10).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_limited() -> Result<()> {
        let ledger = setup_test_ledger().await?;
        let mut ids = Vec::new();
        for raw in ["1", "2", "3"] {
            ids.push(
                ledger
                    .append(4, dec(raw), "h", TransactionKind::Expense)
                    .await?,
            );
        }

        let recent = ledger.history(4, 2).await?;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, ids[2]);
        assert_eq!(recent[1].id, ids[1]);
        assert!(recent[0].created_at >= recent[1].created_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_append_refuses_unstorable_values() -> Result<()> {
        let ledger = setup_test_ledger().await?;

        let zero = ledger
            .append(1, Decimal::ZERO, "z", TransactionKind::Income)
            .await;
        assert!(matches!(zero, Err(Error::ConstraintViolation { .. })));

        let negative = ledger
            .append(1, dec("-1"), "n", TransactionKind::Expense)
            .await;
        assert!(matches!(negative, Err(Error::ConstraintViolation { .. })));

        let huge = ledger
            .append(1, dec("10000000000"), "h", TransactionKind::Income)
            .await;
        assert!(matches!(huge, Err(Error::ConstraintViolation { .. })));

        let long = "c".repeat(MAX_CATEGORY_CHARS + 1);
        let too_long = ledger
            .append(1, dec("1"), &long, TransactionKind::Income)
            .await;
        assert!(matches!(too_long, Err(Error::ConstraintViolation { .. })));

        assert_eq!(ledger.aggregate(1).await?, Totals::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_schema_rejects_unknown_type() -> Result<()> {
        let ledger = setup_test_ledger().await?;
        let db = ledger.connection();

        let result = db
            .execute(Statement::from_string(
                db.get_database_backend(),
                "INSERT INTO transactions (user_id, amount, category, type) \
                 VALUES (1, 1.00, 'x', 'transfer')",
            ))
            .await;
        let err: Error = result.unwrap_err().into();
        assert!(matches!(err, Error::ConstraintViolation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_schema_rejects_non_positive_amount() -> Result<()> {
        let ledger = setup_test_ledger().await?;
        let db = ledger.connection();

        let result = db
            .execute(Statement::from_string(
                db.get_database_backend(),
                "INSERT INTO transactions (user_id, amount, category, type) \
                 VALUES (1, -1.00, 'x', 'income')",
            ))
            .await;
        let err: Error = result.unwrap_err().into();
        assert!(matches!(err, Error::ConstraintViolation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_connection_loss_surfaces_as_storage_unavailable() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            // CREATE TABLE and CREATE INDEX
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .append_query_errors([DbErr::Conn(RuntimeErr::Internal(
                "connection refused".to_string(),
            ))])
            .into_connection();

        let ledger = Ledger::initialize(db).await?;
        let result = ledger.aggregate(1).await;
        assert!(matches!(result, Err(Error::StorageUnavailable { .. })));

        Ok(())
    }
}
