pub mod account;
pub mod statement_entry;

pub use account::Account;
pub use statement_entry::{LegRole, OperationKind, StatementEntry, TransferLegs};
