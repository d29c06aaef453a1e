pub mod catalog;
pub mod stats;
