use crate::core::error::{Result, SettlementError};
use crate::core::ledger::{validate_amount, Ledger};
use crate::core::member::MemberId;
use log::{debug, trace};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Dense n×n matrix of gross pairwise obligations.
///
/// Cell `(i, j)` is what member `i` owes member `j` before any netting:
/// a `1/n` share of everything `j` paid into the pool, plus every direct
/// debt recorded from `i` to `j`. The diagonal is always zero.
///
/// Cells are only reachable through member ids or indices validated
/// against the member list; there is no raw slice access. A deserialized
/// matrix is checked for shape, distinct members, in-range cells and a
/// zero diagonal before it is accepted.
///
/// # Examples
///
/// ```
/// use expense_settlement::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let mut ledger = Ledger::new();
/// for id in ["A", "B"] {
///     ledger.add_member(MemberId::new(id)).unwrap();
/// }
/// ledger.set_expense(&MemberId::new("B"), dec!(10)).unwrap();
///
/// let matrix = BalanceMatrix::build(&ledger).unwrap();
/// assert_eq!(matrix.owed(&MemberId::new("A"), &MemberId::new("B")).unwrap(), dec!(5));
/// assert_eq!(matrix.owed(&MemberId::new("B"), &MemberId::new("B")).unwrap(), dec!(0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct BalanceMatrix {
    members: Vec<MemberId>,
    /// Row-major, `members.len()²` cells.
    cells: Vec<Decimal>,
}

/// Wire form of a [`BalanceMatrix`], unchecked.
#[derive(Deserialize)]
struct RawMatrix {
    members: Vec<MemberId>,
    cells: Vec<Decimal>,
}

impl TryFrom<RawMatrix> for BalanceMatrix {
    type Error = SettlementError;

    fn try_from(raw: RawMatrix) -> Result<Self> {
        let n = raw.members.len();
        if n == 0 {
            return Err(SettlementError::EmptyLedger);
        }
        if raw.cells.len() != n * n {
            return Err(SettlementError::MatrixShape {
                members: n,
                cells: raw.cells.len(),
            });
        }

        let mut seen = HashSet::with_capacity(n);
        for member in &raw.members {
            if !seen.insert(member) {
                return Err(SettlementError::DuplicateMember(member.clone()));
            }
        }
        for cell in &raw.cells {
            validate_amount(*cell)?;
        }
        for (i, member) in raw.members.iter().enumerate() {
            if !raw.cells[i * n + i].is_zero() {
                return Err(SettlementError::InvalidDebt(member.clone()));
            }
        }

        Ok(Self {
            members: raw.members,
            cells: raw.cells,
        })
    }
}

impl BalanceMatrix {
    /// Build the gross obligation matrix for a ledger.
    ///
    /// # Algorithm
    ///
    /// 1. Each member `j` is owed `E(j) / n` by every member, itself included.
    /// 2. Direct debts `i -> j` are added on top of cell `(i, j)`.
    /// 3. The diagonal is cleared: nobody owes themselves their own share.
    ///
    /// Fails with [`SettlementError::EmptyLedger`] when the ledger has no
    /// members. A single member yields a valid all-zero matrix.
    pub fn build(ledger: &Ledger) -> Result<Self> {
        let n = ledger.member_count();
        if n == 0 {
            return Err(SettlementError::EmptyLedger);
        }

        let divisor = Decimal::from(n);
        let shares: Vec<Decimal> = ledger.expenses().iter().map(|e| *e / divisor).collect();

        let mut cells = Vec::with_capacity(n * n);
        for _debtor in 0..n {
            cells.extend(shares.iter().copied());
        }

        for debt in ledger.direct_debts() {
            let i = ledger
                .index_of(debt.debtor())
                .ok_or_else(|| SettlementError::UnknownMember(debt.debtor().clone()))?;
            let j = ledger
                .index_of(debt.creditor())
                .ok_or_else(|| SettlementError::UnknownMember(debt.creditor().clone()))?;
            trace!("direct debt {} -> {}: {}", debt.debtor(), debt.creditor(), debt.amount());
            cells[i * n + j] += debt.amount();
        }

        for i in 0..n {
            cells[i * n + i] = Decimal::ZERO;
        }

        debug!(
            "built {n}x{n} balance matrix from {} direct debts",
            ledger.direct_debts().len()
        );

        Ok(Self {
            members: ledger.members().to_vec(),
            cells,
        })
    }

    /// Number of members (rows and columns).
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Members in row/column order.
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    /// Member at a validated index.
    pub fn member(&self, index: usize) -> Option<&MemberId> {
        self.members.get(index)
    }

    /// Cell `(debtor, creditor)` by index; `None` when out of range.
    pub fn get(&self, debtor: usize, creditor: usize) -> Option<Decimal> {
        let n = self.size();
        if debtor >= n || creditor >= n {
            return None;
        }
        Some(self.cells[debtor * n + creditor])
    }

    /// Gross amount `debtor` owes `creditor`.
    pub fn owed(&self, debtor: &MemberId, creditor: &MemberId) -> Result<Decimal> {
        let i = self.position(debtor)?;
        let j = self.position(creditor)?;
        Ok(self.cells[i * self.size() + j])
    }

    /// Sum of all off-diagonal cells: what would change hands with no netting.
    pub fn gross_total(&self) -> Decimal {
        self.cells.iter().copied().sum()
    }

    /// Net position of every member against the group.
    ///
    /// Positive means the member is owed money overall, negative means
    /// they owe. The positions always sum to zero.
    pub fn net_balances(&self) -> HashMap<MemberId, Decimal> {
        let n = self.size();
        let mut balances: HashMap<MemberId, Decimal> = HashMap::with_capacity(n);
        for (i, member) in self.members.iter().enumerate() {
            let mut balance = Decimal::ZERO;
            for k in 0..n {
                balance += self.cells[k * n + i];
                balance -= self.cells[i * n + k];
            }
            balances.insert(member.clone(), balance);
        }
        balances
    }

    fn position(&self, id: &MemberId) -> Result<usize> {
        self.members
            .iter()
            .position(|m| m == id)
            .ok_or_else(|| SettlementError::UnknownMember(id.clone()))
    }
}
