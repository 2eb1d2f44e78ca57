//! Entity module - SeaORM definitions for the ledger's single table.

pub mod transaction;

pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionKind,
};
