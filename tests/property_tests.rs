use expense_settlement::core::ledger::Ledger;
use expense_settlement::core::member::MemberId;
use expense_settlement::matrix::balance_matrix::BalanceMatrix;
use expense_settlement::settlement::engine::{NetTransfer, SettlementEngine};
use expense_settlement::settlement::rounding::RoundingPolicy;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

const NAMES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// Amount in cents, 0 to 10,000.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Expenses for 1..=6 members.
fn arb_expenses() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(arb_amount(), 1..=NAMES.len())
}

/// Expenses plus direct debts as (debtor index, creditor index, amount).
fn arb_group() -> impl Strategy<Value = (Vec<Decimal>, Vec<(usize, usize, Decimal)>)> {
    prop::collection::vec(arb_amount(), 2..=NAMES.len()).prop_flat_map(|expenses| {
        let n = expenses.len();
        let debts = prop::collection::vec((0..n, 0..n, arb_amount()), 0..8)
            .prop_map(|debts| {
                debts
                    .into_iter()
                    .filter(|(d, c, _)| d != c)
                    .collect::<Vec<_>>()
            });
        (Just(expenses), debts)
    })
}

fn build_ledger(order: &[usize], expenses: &[Decimal], debts: &[(usize, usize, Decimal)]) -> Ledger {
    let mut ledger = Ledger::new();
    for &i in order {
        ledger.add_member(MemberId::new(NAMES[i])).unwrap();
        ledger.set_expense(&MemberId::new(NAMES[i]), expenses[i]).unwrap();
    }
    for (d, c, amount) in debts {
        ledger
            .add_direct_debt(&MemberId::new(NAMES[*d]), &MemberId::new(NAMES[*c]), *amount)
            .unwrap();
    }
    ledger
}

fn settle(ledger: &Ledger) -> Vec<NetTransfer> {
    SettlementEngine::default().settle_ledger(ledger).unwrap()
}

proptest! {
    // ===================================================================
    // Balance conservation: with no direct debts, what each member
    // receives minus what they pay equals expense - total/n, up to one
    // rounding step per transfer touching the member.
    // ===================================================================
    #[test]
    fn balance_conservation(expenses in arb_expenses()) {
        let order: Vec<usize> = (0..expenses.len()).collect();
        let ledger = build_ledger(&order, &expenses, &[]);
        let transfers = settle(&ledger);

        let n = Decimal::from(expenses.len());
        let share = ledger.total_expenses() / n;
        let tolerance = RoundingPolicy::default().half_unit() * n;

        for (i, expected) in expenses.iter().map(|e| *e - share).enumerate() {
            let member = MemberId::new(NAMES[i]);
            let received: Decimal = transfers.iter().filter(|t| t.creditor == member).map(|t| t.amount).sum();
            let paid: Decimal = transfers.iter().filter(|t| t.debtor == member).map(|t| t.amount).sum();
            prop_assert!(
                (received - paid - expected).abs() <= tolerance,
                "member {} nets {} but pool says {}",
                member, received - paid, expected
            );
        }
    }

    // ===================================================================
    // Zero-sum: the matrix's net balances cancel out, and the settlement
    // summary pays out exactly what it takes in.
    // ===================================================================
    #[test]
    fn zero_sum((expenses, debts) in arb_group()) {
        let order: Vec<usize> = (0..expenses.len()).collect();
        let ledger = build_ledger(&order, &expenses, &debts);
        let matrix = BalanceMatrix::build(&ledger).unwrap();
        let engine = SettlementEngine::default();
        let transfers = engine.settle(&matrix);

        let summary = engine.summarize(&matrix, &transfers);
        prop_assert!(summary.is_balanced());

        let total: Decimal = matrix.net_balances().values().copied().sum();
        prop_assert!(total.abs() < Decimal::new(1, 20));
    }

    // ===================================================================
    // Shape: positive amounts, no self-transfers, one direction per pair.
    // ===================================================================
    #[test]
    fn transfers_are_well_formed((expenses, debts) in arb_group()) {
        let order: Vec<usize> = (0..expenses.len()).collect();
        let transfers = settle(&build_ledger(&order, &expenses, &debts));

        let mut pairs = HashSet::new();
        for t in &transfers {
            prop_assert!(t.amount > Decimal::ZERO);
            prop_assert_ne!(&t.debtor, &t.creditor);
            let key = if t.debtor < t.creditor {
                (t.debtor.clone(), t.creditor.clone())
            } else {
                (t.creditor.clone(), t.debtor.clone())
            };
            prop_assert!(pairs.insert(key), "pair settled twice: {}", t);
        }
    }

    // ===================================================================
    // Idempotence: settling the same matrix twice yields identical output.
    // ===================================================================
    #[test]
    fn settle_is_idempotent((expenses, debts) in arb_group()) {
        let order: Vec<usize> = (0..expenses.len()).collect();
        let matrix = BalanceMatrix::build(&build_ledger(&order, &expenses, &debts)).unwrap();
        let engine = SettlementEngine::default();
        prop_assert_eq!(engine.settle(&matrix), engine.settle(&matrix));
    }

    // ===================================================================
    // Permutation invariance: member order only changes enumeration order.
    // ===================================================================
    #[test]
    fn member_order_does_not_matter((expenses, debts) in arb_group()) {
        let forward: Vec<usize> = (0..expenses.len()).collect();
        let reversed: Vec<usize> = forward.iter().rev().copied().collect();

        let as_map = |transfers: Vec<NetTransfer>| -> HashMap<(MemberId, MemberId), Decimal> {
            transfers.into_iter().map(|t| ((t.debtor, t.creditor), t.amount)).collect()
        };

        let a = as_map(settle(&build_ledger(&forward, &expenses, &debts)));
        let b = as_map(settle(&build_ledger(&reversed, &expenses, &debts)));
        prop_assert_eq!(a, b);
    }

    // ===================================================================
    // Net never exceeds gross.
    // ===================================================================
    #[test]
    fn net_never_exceeds_gross((expenses, debts) in arb_group()) {
        let order: Vec<usize> = (0..expenses.len()).collect();
        let matrix = BalanceMatrix::build(&build_ledger(&order, &expenses, &debts)).unwrap();
        let engine = SettlementEngine::default();
        let summary = engine.summarize(&matrix, &engine.settle(&matrix));
        let slack = engine.policy().half_unit() * Decimal::from(summary.transfer_count);
        prop_assert!(summary.net_total <= summary.gross_total + slack);
    }
}
