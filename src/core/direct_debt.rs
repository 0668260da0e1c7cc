use crate::core::error::{Result, SettlementError};
use crate::core::ledger::validate_amount;
use crate::core::member::MemberId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bilateral obligation recorded outside the pooled expenses.
///
/// Represents the fact that `debtor` owes `creditor` a specific `amount`
/// on top of whatever the pooled share calculation produces, for example
/// because the creditor fronted a purchase only the debtor benefits from.
///
/// Debts are immutable once created. Several debts between the same
/// ordered pair simply add up. A deserialized debt bypasses the checks in
/// [`DirectDebt::new`]; [`Ledger::record_debt`](crate::core::ledger::Ledger::record_debt)
/// repeats them before accepting it.
///
/// # Examples
///
/// ```
/// use expense_settlement::core::direct_debt::DirectDebt;
/// use expense_settlement::core::member::MemberId;
/// use rust_decimal_macros::dec;
///
/// let debt = DirectDebt::new(
///     MemberId::new("carol"),
///     MemberId::new("alice"),
///     dec!(5),
/// ).unwrap();
///
/// assert_eq!(debt.amount(), dec!(5));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectDebt {
    /// Unique identifier for this debt.
    id: Uuid,
    /// The member that owes the amount.
    debtor: MemberId,
    /// The member that is owed the amount.
    creditor: MemberId,
    /// The amount owed. Never negative.
    amount: Decimal,
    /// When this debt was recorded.
    recorded_at: DateTime<Utc>,
    /// Optional memo, e.g. what was bought.
    memo: Option<String>,
}

impl DirectDebt {
    /// Create a new direct debt.
    ///
    /// Fails with [`SettlementError::InvalidAmount`] for a negative amount,
    /// [`SettlementError::AmountTooLarge`] above
    /// [`MAX_AMOUNT`](crate::core::ledger::MAX_AMOUNT) and
    /// [`SettlementError::InvalidDebt`] when debtor and creditor match.
    pub fn new(debtor: MemberId, creditor: MemberId, amount: Decimal) -> Result<Self> {
        Self::with_id(Uuid::new_v4(), debtor, creditor, amount)
    }

    /// Create a debt with a specific ID (useful for testing / determinism).
    pub fn with_id(
        id: Uuid,
        debtor: MemberId,
        creditor: MemberId,
        amount: Decimal,
    ) -> Result<Self> {
        validate_amount(amount)?;
        if debtor == creditor {
            return Err(SettlementError::InvalidDebt(debtor));
        }
        Ok(Self {
            id,
            debtor,
            creditor,
            amount,
            recorded_at: Utc::now(),
            memo: None,
        })
    }

    /// Attach a memo.
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn debtor(&self) -> &MemberId {
        &self.debtor
    }

    pub fn creditor(&self) -> &MemberId {
        &self.creditor
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }
}
