pub mod connectors;
pub mod error;
pub mod events;
pub mod state;
