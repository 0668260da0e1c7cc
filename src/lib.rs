//! # expense-settlement
//!
//! Shared-expense settlement engine.
//!
//! Given what each member of a group paid toward shared costs, plus any
//! direct debts between specific members, this engine computes the net
//! pairwise transfers that leave everyone having paid an equal share.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: members, direct debts, the ledger, errors
//! - **matrix** — Gross pairwise obligation matrix built from a ledger
//! - **settlement** — Pairwise netting, rounding policy, summaries
//! - **graph** — Cycle report over net transfers
//! - **simulation** — Random ledger generation

pub mod core;
pub mod graph;
pub mod matrix;
pub mod settlement;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::direct_debt::DirectDebt;
    pub use crate::core::error::SettlementError;
    pub use crate::core::ledger::{Ledger, LedgerInput};
    pub use crate::core::member::MemberId;
    pub use crate::matrix::balance_matrix::BalanceMatrix;
    pub use crate::settlement::engine::{NetTransfer, PoolBalance, SettlementEngine};
    pub use crate::settlement::rounding::{RoundingMode, RoundingPolicy};
    pub use crate::settlement::summary::SettlementSummary;
}
