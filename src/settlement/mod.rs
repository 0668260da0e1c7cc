pub mod engine;
pub mod rounding;
pub mod summary;
