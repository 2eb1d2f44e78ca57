//! Transaction entity - One immutable income or expense entry.
//!
//! Each row belongs to exactly one `user_id`, carries a strictly positive
//! NUMERIC(12, 2) amount, a category label, and a `type` column restricted
//! to `income`/`expense`. Rows are only ever inserted; `created_at` is
//! filled in by the database.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of an entry. The sign of an amount is carried here, never by the number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl TransactionKind {
    /// Lowercase label as stored in the `type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Surrogate key assigned by the database
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Chat platform id of the owning user
    pub user_id: i64,
    /// Always positive, two fractional digits
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    /// Free-text label, at most 100 characters
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub category: String,
    /// Income or expense
    #[sea_orm(column_name = "type")]
    pub kind: TransactionKind,
    /// Insertion time, defaulted by the database
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeUtc,
}

/// Transactions have no relations; `user_id` is a bare partition key.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
