use crate::core::error::{Result, SettlementError};
use crate::core::ledger::Ledger;
use crate::core::member::MemberId;
use crate::matrix::balance_matrix::BalanceMatrix;
use crate::settlement::rounding::RoundingPolicy;
use crate::settlement::summary::SettlementSummary;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single-direction payment settling everything between two members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetTransfer {
    pub debtor: MemberId,
    pub creditor: MemberId,
    /// Always positive, rounded to the engine's policy scale.
    pub amount: Decimal,
}

impl fmt::Display for NetTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.debtor, self.creditor, self.amount)
    }
}

/// A member's position against a virtual common pool.
///
/// Positive means the pool owes the member, negative means the member
/// owes the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBalance {
    pub member: MemberId,
    pub balance: Decimal,
}

/// The settlement engine.
///
/// Reduces a [`BalanceMatrix`] to pairwise net transfers. Rounding is an
/// explicit parameter of the engine, never a hidden constant.
///
/// # Examples
///
/// ```
/// use expense_settlement::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let mut ledger = Ledger::new();
/// for id in ["A", "B", "C"] {
///     ledger.add_member(MemberId::new(id)).unwrap();
/// }
/// ledger.set_expense(&MemberId::new("B"), dec!(1)).unwrap();
/// ledger.set_expense(&MemberId::new("C"), dec!(2)).unwrap();
///
/// let matrix = BalanceMatrix::build(&ledger).unwrap();
/// let transfers = SettlementEngine::default().settle(&matrix);
///
/// assert_eq!(transfers.len(), 3);
/// assert_eq!(transfers[0].to_string(), "A -> B: 0.33");
/// assert_eq!(transfers[1].to_string(), "A -> C: 0.67");
/// assert_eq!(transfers[2].to_string(), "B -> C: 0.33");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementEngine {
    policy: RoundingPolicy,
}

impl SettlementEngine {
    pub fn new(policy: RoundingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RoundingPolicy {
        self.policy
    }

    /// Collapse every pair of opposite obligations into one net transfer.
    ///
    /// For each pair `i < j` the two directions of the matrix are
    /// subtracted at full precision; whoever owes more pays the
    /// difference. A difference that rounds to zero emits nothing.
    ///
    /// Transfers are enumerated in member index order. No attempt is made
    /// to shorten chains or cycles spanning three or more members.
    pub fn settle(&self, matrix: &BalanceMatrix) -> Vec<NetTransfer> {
        let n = matrix.size();
        let mut transfers = Vec::new();

        for i in 0..n {
            for j in (i + 1)..n {
                let (Some(i_owes_j), Some(j_owes_i)) = (matrix.get(i, j), matrix.get(j, i)) else {
                    continue;
                };
                let net = i_owes_j - j_owes_i;
                let amount = self.policy.round(net.abs());
                if amount.is_zero() {
                    continue;
                }

                let (debtor, creditor) = if net > Decimal::ZERO { (i, j) } else { (j, i) };
                transfers.push(NetTransfer {
                    debtor: matrix.members()[debtor].clone(),
                    creditor: matrix.members()[creditor].clone(),
                    amount,
                });
            }
        }

        debug!(
            "settled {} members into {} transfers ({} pairs)",
            n,
            transfers.len(),
            n * n.saturating_sub(1) / 2
        );
        transfers
    }

    /// Build the matrix for a ledger and settle it in one step.
    pub fn settle_ledger(&self, ledger: &Ledger) -> Result<Vec<NetTransfer>> {
        let matrix = BalanceMatrix::build(ledger)?;
        Ok(self.settle(&matrix))
    }

    /// Pure-pooling view: each member's expense minus the equal share.
    ///
    /// Direct debts are ignored; with none recorded this matches
    /// [`BalanceMatrix::net_balances`] up to rounding.
    pub fn pool_balances(&self, ledger: &Ledger) -> Result<Vec<PoolBalance>> {
        if ledger.is_empty() {
            return Err(SettlementError::EmptyLedger);
        }
        let share = ledger.total_expenses() / Decimal::from(ledger.member_count());
        Ok(ledger
            .members()
            .iter()
            .zip(ledger.expenses())
            .map(|(member, expense)| PoolBalance {
                member: member.clone(),
                balance: self.policy.round(*expense - share),
            })
            .collect())
    }

    /// Gross vs. net figures for a settlement.
    pub fn summarize(&self, matrix: &BalanceMatrix, transfers: &[NetTransfer]) -> SettlementSummary {
        SettlementSummary::from_transfers(matrix, transfers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::rounding::RoundingMode;
    use rust_decimal_macros::dec;

    fn ledger(expenses: &[(&str, Decimal)]) -> Ledger {
        let mut ledger = Ledger::new();
        for (id, amount) in expenses {
            ledger.add_member(MemberId::new(*id)).unwrap();
            ledger.set_expense(&MemberId::new(*id), *amount).unwrap();
        }
        ledger
    }

    fn transfer(debtor: &str, creditor: &str, amount: Decimal) -> NetTransfer {
        NetTransfer {
            debtor: MemberId::new(debtor),
            creditor: MemberId::new(creditor),
            amount,
        }
    }

    #[test]
    fn test_pooling_example() {
        let ledger = ledger(&[("A", dec!(0)), ("B", dec!(1)), ("C", dec!(2))]);
        let transfers = SettlementEngine::default().settle_ledger(&ledger).unwrap();

        assert_eq!(
            transfers,
            vec![
                transfer("A", "B", dec!(0.33)),
                transfer("A", "C", dec!(0.67)),
                transfer("B", "C", dec!(0.33)),
            ]
        );
    }

    #[test]
    fn test_direct_debt_composition() {
        let mut ledger = ledger(&[("A", dec!(14.98)), ("B", dec!(16.65)), ("C", dec!(33.14))]);
        let c = MemberId::new("C");
        ledger.add_direct_debt(&c, &MemberId::new("A"), dec!(5)).unwrap();
        ledger.add_direct_debt(&c, &MemberId::new("B"), dec!(5)).unwrap();

        let transfers = SettlementEngine::default().settle_ledger(&ledger).unwrap();
        assert_eq!(
            transfers,
            vec![
                transfer("A", "B", dec!(0.56)),
                transfer("A", "C", dec!(1.05)),
                transfer("B", "C", dec!(0.50)),
            ]
        );
    }

    #[test]
    fn test_opposite_debts_cancel() {
        let mut ledger = ledger(&[("A", dec!(0)), ("B", dec!(0))]);
        let a = MemberId::new("A");
        let b = MemberId::new("B");
        ledger.add_direct_debt(&a, &b, dec!(100)).unwrap();
        ledger.add_direct_debt(&b, &a, dec!(60)).unwrap();

        let transfers = SettlementEngine::default().settle_ledger(&ledger).unwrap();
        assert_eq!(transfers, vec![transfer("A", "B", dec!(40))]);
    }

    #[test]
    fn test_equal_expenses_settle_to_nothing() {
        let ledger = ledger(&[("A", dec!(10)), ("B", dec!(10)), ("C", dec!(10))]);
        let transfers = SettlementEngine::default().settle_ledger(&ledger).unwrap();
        assert!(transfers.is_empty());
    }

    #[test]
    fn test_sub_cent_difference_is_dropped() {
        let ledger = ledger(&[("A", dec!(0)), ("B", dec!(0.008))]);
        // A owes B 0.004
        let transfers = SettlementEngine::default().settle_ledger(&ledger).unwrap();
        assert!(transfers.is_empty());
    }

    #[test]
    fn test_rounding_mode_is_respected() {
        // A owes B exactly 0.125
        let ledger = ledger(&[("A", dec!(0)), ("B", dec!(0.25))]);
        let matrix = BalanceMatrix::build(&ledger).unwrap();

        let half_up = SettlementEngine::default().settle(&matrix);
        assert_eq!(half_up[0].amount, dec!(0.13));

        let bankers = SettlementEngine::new(RoundingPolicy::new(2, RoundingMode::HalfEven));
        assert_eq!(bankers.settle(&matrix)[0].amount, dec!(0.12));

        let whole = SettlementEngine::new(RoundingPolicy::new(0, RoundingMode::HalfAwayFromZero));
        assert!(whole.settle(&matrix).is_empty());
    }

    #[test]
    fn test_single_member_settles_empty() {
        let ledger = ledger(&[("solo", dec!(99))]);
        let transfers = SettlementEngine::default().settle_ledger(&ledger).unwrap();
        assert!(transfers.is_empty());
    }

    #[test]
    fn test_empty_ledger_propagates() {
        let engine = SettlementEngine::default();
        assert_eq!(
            engine.settle_ledger(&Ledger::new()).unwrap_err(),
            SettlementError::EmptyLedger
        );
        assert_eq!(
            engine.pool_balances(&Ledger::new()).unwrap_err(),
            SettlementError::EmptyLedger
        );
    }

    #[test]
    fn test_pool_balances() {
        let ledger = ledger(&[("A", dec!(0)), ("B", dec!(1)), ("C", dec!(2))]);
        let balances = SettlementEngine::default().pool_balances(&ledger).unwrap();
        let values: Vec<Decimal> = balances.iter().map(|b| b.balance).collect();
        assert_eq!(values, vec![dec!(-1), dec!(0), dec!(1)]);
    }

    #[test]
    fn test_largest_amounts_stay_in_range() {
        use crate::core::ledger::MAX_AMOUNT;

        let mut ledger = ledger(&[("A", MAX_AMOUNT), ("B", MAX_AMOUNT), ("C", MAX_AMOUNT)]);
        let a = MemberId::new("A");
        let b = MemberId::new("B");
        for _ in 0..3 {
            ledger.add_direct_debt(&a, &b, MAX_AMOUNT).unwrap();
        }
        assert_eq!(
            ledger.set_expense(&a, Decimal::MAX).unwrap_err(),
            SettlementError::AmountTooLarge { amount: Decimal::MAX }
        );

        let engine = SettlementEngine::default();
        let matrix = BalanceMatrix::build(&ledger).unwrap();
        let transfers = engine.settle(&matrix);
        assert_eq!(transfers, vec![transfer("A", "B", MAX_AMOUNT * dec!(3))]);

        let summary = engine.summarize(&matrix, &transfers);
        assert!(summary.is_balanced());
        assert!(summary.gross_total > summary.net_total);

        let pool = engine.pool_balances(&ledger).unwrap();
        assert!(pool.iter().all(|p| p.balance.is_zero()));
    }

    #[test]
    fn test_settle_is_idempotent() {
        let ledger = ledger(&[("A", dec!(12.34)), ("B", dec!(0)), ("C", dec!(7.01)), ("D", dec!(3))]);
        let matrix = BalanceMatrix::build(&ledger).unwrap();
        let engine = SettlementEngine::default();
        assert_eq!(engine.settle(&matrix), engine.settle(&matrix));
    }
}
