pub mod config;
pub mod error;
pub mod io;
pub mod paths;
pub mod report;
pub mod sla;
pub mod ticket;
pub mod types;

pub use error::{Result, SlaError};
