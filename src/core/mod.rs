pub mod direct_debt;
pub mod error;
pub mod ledger;
pub mod member;
