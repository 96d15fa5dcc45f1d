pub mod audit;
pub mod error;
pub mod execution;
pub mod report;
