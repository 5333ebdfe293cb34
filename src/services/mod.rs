pub mod evaluation;
pub mod quiz;
pub mod random;
pub mod stats;
