use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Operation kind recorded on a statement entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "operation_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Deposit,
    Withdraw,
    Transfer,
}

/// Which side of an operation an entry records. Deposits credit their
/// target, withdrawals debit it; a transfer has one leg of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegRole {
    Receiver,
    Sender,
}

impl OperationKind {
    /// Derives the signed amount stored on the ledger for one leg of this
    /// operation from the positive magnitude the caller requested.
    ///
    /// Credits are positive, debits negative. Every entry constructor routes
    /// through here; no call site flips signs on its own.
    pub fn signed_amount(self, role: LegRole, magnitude: Decimal) -> Decimal {
        match (self, role) {
            (OperationKind::Deposit, _) => magnitude,
            (OperationKind::Withdraw, _) => -magnitude,
            (OperationKind::Transfer, LegRole::Receiver) => magnitude,
            (OperationKind::Transfer, LegRole::Sender) => -magnitude,
        }
    }
}

/// One row of the append-only statement ledger.
///
/// Entries are immutable once written; corrections are new offsetting
/// entries. `amount` is signed, and an account's balance is the plain sum
/// of the amounts it owns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatementEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: OperationKind,
    pub amount: Decimal,
    pub description: String,
    /// The other account of a transfer; absent for deposits and withdrawals.
    pub counterparty_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl StatementEntry {
    /// Creates a deposit entry crediting `account_id` with `magnitude`.
    pub fn deposit(account_id: Uuid, magnitude: Decimal, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            kind: OperationKind::Deposit,
            amount: OperationKind::Deposit.signed_amount(LegRole::Receiver, magnitude),
            description: description.into(),
            counterparty_id: None,
            created_at: Utc::now(),
        }
    }

    /// Creates a withdrawal entry debiting `account_id` by `magnitude`.
    pub fn withdraw(account_id: Uuid, magnitude: Decimal, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            kind: OperationKind::Withdraw,
            amount: OperationKind::Withdraw.signed_amount(LegRole::Sender, magnitude),
            description: description.into(),
            counterparty_id: None,
            created_at: Utc::now(),
        }
    }

    /// The positive magnitude of the entry, regardless of direction.
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }

    pub fn is_credit(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_debit(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}

/// The two linked entries of a transfer, built as a unit so the legs cannot
/// disagree on magnitude or counterparties. The store commits both rows or
/// neither.
#[derive(Debug, Clone)]
pub struct TransferLegs {
    /// Credit entry owned by the receiver, counterparty = sender.
    pub receiver: StatementEntry,
    /// Debit entry owned by the sender, counterparty = receiver.
    pub sender: StatementEntry,
}

impl TransferLegs {
    pub fn new(
        sender_id: Uuid,
        receiver_id: Uuid,
        magnitude: Decimal,
        description: impl Into<String>,
    ) -> Self {
        let description = description.into();
        let created_at = Utc::now();

        let receiver = StatementEntry {
            id: Uuid::new_v4(),
            account_id: receiver_id,
            kind: OperationKind::Transfer,
            amount: OperationKind::Transfer.signed_amount(LegRole::Receiver, magnitude),
            description: description.clone(),
            counterparty_id: Some(sender_id),
            created_at,
        };

        let sender = StatementEntry {
            id: Uuid::new_v4(),
            account_id: sender_id,
            kind: OperationKind::Transfer,
            amount: OperationKind::Transfer.signed_amount(LegRole::Sender, magnitude),
            description,
            counterparty_id: Some(receiver_id),
            created_at,
        };

        Self { receiver, sender }
    }

    /// The positive amount moved between the two accounts.
    pub fn magnitude(&self) -> Decimal {
        self.receiver.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sign_convention() {
        assert_eq!(
            OperationKind::Deposit.signed_amount(LegRole::Receiver, dec!(100)),
            dec!(100)
        );
        assert_eq!(
            OperationKind::Withdraw.signed_amount(LegRole::Sender, dec!(100)),
            dec!(-100)
        );
        assert_eq!(
            OperationKind::Transfer.signed_amount(LegRole::Receiver, dec!(100)),
            dec!(100)
        );
        assert_eq!(
            OperationKind::Transfer.signed_amount(LegRole::Sender, dec!(100)),
            dec!(-100)
        );
    }

    #[test]
    fn test_deposit_entry() {
        let account_id = Uuid::new_v4();
        let entry = StatementEntry::deposit(account_id, dec!(123), "initial deposit");

        assert_eq!(entry.account_id, account_id);
        assert_eq!(entry.kind, OperationKind::Deposit);
        assert_eq!(entry.amount, dec!(123));
        assert!(entry.counterparty_id.is_none());
        assert!(entry.is_credit());
    }

    #[test]
    fn test_withdraw_entry_stored_negative() {
        let entry = StatementEntry::withdraw(Uuid::new_v4(), dec!(23), "groceries");

        assert_eq!(entry.kind, OperationKind::Withdraw);
        assert_eq!(entry.amount, dec!(-23));
        assert_eq!(entry.magnitude(), dec!(23));
        assert!(entry.is_debit());
    }

    #[test]
    fn test_transfer_legs_linked() {
        let sender_id = Uuid::new_v4();
        let receiver_id = Uuid::new_v4();
        let legs = TransferLegs::new(sender_id, receiver_id, dec!(50), "rent split");

        assert_eq!(legs.receiver.account_id, receiver_id);
        assert_eq!(legs.receiver.amount, dec!(50));
        assert_eq!(legs.receiver.counterparty_id, Some(sender_id));

        assert_eq!(legs.sender.account_id, sender_id);
        assert_eq!(legs.sender.amount, dec!(-50));
        assert_eq!(legs.sender.counterparty_id, Some(receiver_id));

        assert_eq!(legs.receiver.kind, OperationKind::Transfer);
        assert_eq!(legs.sender.kind, OperationKind::Transfer);
        assert_ne!(legs.receiver.id, legs.sender.id);
    }

    #[test]
    fn test_transfer_legs_net_to_zero() {
        let legs = TransferLegs::new(Uuid::new_v4(), Uuid::new_v4(), dec!(77.25), "split");
        assert_eq!(legs.receiver.amount + legs.sender.amount, Decimal::ZERO);
        assert_eq!(legs.magnitude(), dec!(77.25));
    }

    #[test]
    fn test_entry_serialization() {
        let entry = StatementEntry::deposit(Uuid::new_v4(), dec!(100.50), "paycheck");

        let json = serde_json::to_string(&entry).unwrap();
        let deserialized: StatementEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.amount, dec!(100.50));
        assert_eq!(deserialized.kind, OperationKind::Deposit);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OperationKind::Deposit).unwrap(),
            "\"deposit\""
        );
        assert_eq!(
            serde_json::to_string(&OperationKind::Transfer).unwrap(),
            "\"transfer\""
        );
    }
}
