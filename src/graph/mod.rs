pub mod cycle_detection;
