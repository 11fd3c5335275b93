//! rotabot — group duty rotation with supervisor confirmation.

pub mod channels;
pub mod commands;
pub mod config;
pub mod error;
pub mod rotation;
pub mod router;
pub mod scheduler;
pub mod store;
