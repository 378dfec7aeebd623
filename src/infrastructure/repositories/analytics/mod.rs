pub mod goals;
pub mod stats;
