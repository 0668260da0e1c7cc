use crate::core::direct_debt::DirectDebt;
use crate::core::error::{Result, SettlementError};
use crate::core::member::MemberId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// The raw record of one settlement period.
///
/// Holds the ordered member list, each member's pooled-expense total and
/// every direct debt recorded between members. Every mutation is
/// validated immediately; a `Ledger` is therefore always internally
/// consistent and can be handed to
/// [`BalanceMatrix::build`](crate::matrix::balance_matrix::BalanceMatrix::build)
/// as-is.
///
/// # Examples
///
/// ```
/// use expense_settlement::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let mut ledger = Ledger::new();
/// ledger.add_member(MemberId::new("A")).unwrap();
/// ledger.add_member(MemberId::new("B")).unwrap();
/// ledger.set_expense(&MemberId::new("A"), dec!(30)).unwrap();
/// ledger.add_direct_debt(&MemberId::new("B"), &MemberId::new("A"), dec!(5)).unwrap();
///
/// assert_eq!(ledger.member_count(), 2);
/// assert_eq!(ledger.total_expenses(), dec!(30));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    /// Members in insertion order. Order fixes matrix indexing.
    members: Vec<MemberId>,
    /// Member -> position in `members`.
    index: HashMap<MemberId, usize>,
    /// Pooled-expense total per member, parallel to `members`.
    expenses: Vec<Decimal>,
    direct_debts: Vec<DirectDebt>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member with a zero expense record.
    pub fn add_member(&mut self, id: MemberId) -> Result<()> {
        if self.index.contains_key(&id) {
            return Err(SettlementError::DuplicateMember(id));
        }
        self.index.insert(id.clone(), self.members.len());
        self.members.push(id);
        self.expenses.push(Decimal::ZERO);
        Ok(())
    }

    /// Set the total a member paid toward shared costs.
    ///
    /// Overwrites any previous value for the member.
    pub fn set_expense(&mut self, id: &MemberId, amount: Decimal) -> Result<()> {
        validate_amount(amount)?;
        let idx = self.require(id)?;
        self.expenses[idx] = amount;
        Ok(())
    }

    /// Record that `debtor` owes `creditor` an extra `amount`.
    pub fn add_direct_debt(
        &mut self,
        debtor: &MemberId,
        creditor: &MemberId,
        amount: Decimal,
    ) -> Result<()> {
        self.record_debt(DirectDebt::new(debtor.clone(), creditor.clone(), amount)?)
    }

    /// Record an already constructed debt, e.g. one carrying a memo.
    ///
    /// The debt is checked again in full, since one obtained through
    /// deserialization never passed through [`DirectDebt::new`]. Checks run
    /// in a fixed order on every path: amount, then self-debt, then
    /// membership.
    pub fn record_debt(&mut self, debt: DirectDebt) -> Result<()> {
        validate_amount(debt.amount())?;
        if debt.debtor() == debt.creditor() {
            return Err(SettlementError::InvalidDebt(debt.debtor().clone()));
        }
        self.require(debt.debtor())?;
        self.require(debt.creditor())?;
        self.direct_debts.push(debt);
        Ok(())
    }

    /// Members in matrix order.
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Position of a member in matrix order, if present.
    pub fn index_of(&self, id: &MemberId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Pooled-expense total of a member.
    pub fn expense(&self, id: &MemberId) -> Result<Decimal> {
        let idx = self.require(id)?;
        Ok(self.expenses[idx])
    }

    /// Pooled-expense totals, parallel to [`members`](Self::members).
    pub fn expenses(&self) -> &[Decimal] {
        &self.expenses
    }

    pub fn direct_debts(&self) -> &[DirectDebt] {
        &self.direct_debts
    }

    /// Sum of all pooled expenses.
    pub fn total_expenses(&self) -> Decimal {
        self.expenses.iter().copied().sum()
    }

    /// Build a ledger from its serialized form, validating every entry.
    pub fn from_input(input: &LedgerInput) -> Result<Self> {
        let mut ledger = Self::new();
        for member in &input.members {
            ledger.add_member(member.clone())?;
        }
        for (member, amount) in &input.expenses {
            ledger.set_expense(member, *amount)?;
        }
        for debt in &input.direct_debts {
            let mut entry = DirectDebt::new(debt.debtor.clone(), debt.creditor.clone(), debt.amount)?;
            if let Some(memo) = &debt.memo {
                entry = entry.with_memo(memo.clone());
            }
            ledger.record_debt(entry)?;
        }
        Ok(ledger)
    }

    /// Serializable snapshot of this ledger.
    pub fn to_input(&self) -> LedgerInput {
        LedgerInput {
            members: self.members.clone(),
            expenses: self
                .members
                .iter()
                .cloned()
                .zip(self.expenses.iter().copied())
                .collect(),
            direct_debts: self
                .direct_debts
                .iter()
                .map(|d| DebtInput {
                    debtor: d.debtor().clone(),
                    creditor: d.creditor().clone(),
                    amount: d.amount(),
                    memo: d.memo().map(str::to_string),
                })
                .collect(),
        }
    }

    fn require(&self, id: &MemberId) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| SettlementError::UnknownMember(id.clone()))
    }
}

/// Largest expense or direct debt a ledger accepts: one quadrillion.
///
/// Keeps every sum the matrix and summary form far below `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Amounts must lie in `0..=MAX_AMOUNT`.
pub(crate) fn validate_amount(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(SettlementError::InvalidAmount { amount });
    }
    if amount > MAX_AMOUNT {
        return Err(SettlementError::AmountTooLarge { amount });
    }
    Ok(())
}

/// JSON schema for a ledger.
///
/// ```json
/// {
///   "members": ["A", "B", "C"],
///   "expenses": { "A": "14.98", "B": "16.65", "C": "33.14" },
///   "direct_debts": [ { "debtor": "C", "creditor": "A", "amount": "5" } ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerInput {
    pub members: Vec<MemberId>,
    #[serde(default)]
    pub expenses: BTreeMap<MemberId, Decimal>,
    #[serde(default)]
    pub direct_debts: Vec<DebtInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtInput {
    pub debtor: MemberId,
    pub creditor: MemberId,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}
