use crate::core::ledger::MAX_AMOUNT;
use crate::core::member::MemberId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while assembling a ledger or building its balance matrix.
///
/// All of them are raised at the point of invalid input; no partial
/// settlement is ever produced alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("amount must be non-negative, got {amount}")]
    InvalidAmount { amount: Decimal },
    #[error("amount {amount} exceeds the largest supported amount {max}", max = MAX_AMOUNT)]
    AmountTooLarge { amount: Decimal },
    #[error("unknown member: {0}")]
    UnknownMember(MemberId),
    #[error("member {0} cannot owe themselves")]
    InvalidDebt(MemberId),
    #[error("member {0} is already part of the ledger")]
    DuplicateMember(MemberId),
    #[error("ledger has no members")]
    EmptyLedger,
    #[error("{members} members need {} matrix cells, got {cells}", .members * .members)]
    MatrixShape { members: usize, cells: usize },
}

pub type Result<T> = std::result::Result<T, SettlementError>;
