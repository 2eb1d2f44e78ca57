//! Discord command implementations organized by category.

/// Greeting and help commands
pub mod general;

/// Income, expense, and balance commands
pub mod ledger;

// Export commands
pub use general::*;
pub use ledger::*;
