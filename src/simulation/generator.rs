//! Random ledger generation.
//!
//! Produces synthetic groups for benchmarks, property checks and the
//! CLI's `generate` command.

use crate::core::error::Result;
use crate::core::ledger::Ledger;
use crate::core::member::MemberId;
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for generating a random ledger.
#[derive(Debug, Clone)]
pub struct GroupConfig {
    /// Number of members in the group.
    pub member_count: usize,
    /// Number of direct debts to scatter between members.
    pub direct_debt_count: usize,
    /// Largest pooled expense per member, in whole units.
    pub max_expense: u32,
    /// Largest direct debt, in whole units.
    pub max_debt: u32,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            member_count: 5,
            direct_debt_count: 3,
            max_expense: 500,
            max_debt: 50,
        }
    }
}

/// Generate a random ledger. Amounts carry two decimal places.
pub fn generate_random_ledger(config: &GroupConfig) -> Result<Ledger> {
    let mut rng = rand::thread_rng();
    let mut ledger = Ledger::new();

    let members: Vec<MemberId> = (0..config.member_count)
        .map(|i| MemberId::new(format!("MEMBER-{:03}", i)))
        .collect();

    for member in &members {
        ledger.add_member(member.clone())?;
        let cents = rng.gen_range(0..=u64::from(config.max_expense) * 100);
        ledger.set_expense(member, Decimal::new(cents as i64, 2))?;
    }

    if members.len() < 2 {
        return Ok(ledger);
    }

    for _ in 0..config.direct_debt_count {
        let debtor = rng.gen_range(0..members.len());
        let mut creditor = rng.gen_range(0..members.len());
        while creditor == debtor {
            creditor = rng.gen_range(0..members.len());
        }
        let cents = rng.gen_range(1..=u64::from(config.max_debt.max(1)) * 100);
        ledger.add_direct_debt(
            &members[debtor],
            &members[creditor],
            Decimal::new(cents as i64, 2),
        )?;
    }

    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::engine::SettlementEngine;

    #[test]
    fn test_random_ledger_generation() {
        let config = GroupConfig {
            member_count: 6,
            direct_debt_count: 4,
            ..Default::default()
        };

        let ledger = generate_random_ledger(&config).unwrap();
        assert_eq!(ledger.member_count(), 6);
        assert_eq!(ledger.direct_debts().len(), 4);
        assert!(ledger.expenses().iter().all(|e| *e >= Decimal::ZERO));
    }

    #[test]
    fn test_single_member_skips_debts() {
        let config = GroupConfig {
            member_count: 1,
            direct_debt_count: 10,
            ..Default::default()
        };
        let ledger = generate_random_ledger(&config).unwrap();
        assert!(ledger.direct_debts().is_empty());
    }

    #[test]
    fn test_random_ledger_settles() {
        let config = GroupConfig {
            member_count: 20,
            direct_debt_count: 15,
            ..Default::default()
        };
        let ledger = generate_random_ledger(&config).unwrap();
        let transfers = SettlementEngine::default().settle_ledger(&ledger).unwrap();

        assert!(transfers.len() <= 20 * 19 / 2);
        assert!(transfers.iter().all(|t| t.amount > Decimal::ZERO && t.debtor != t.creditor));
    }
}
