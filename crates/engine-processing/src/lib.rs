pub mod dedup;
pub mod error;
pub mod incremental;
pub mod merge;
pub mod profile;
pub mod validation;
