pub mod balance_matrix;
