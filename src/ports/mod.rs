//! Port traits at the edges of the domain.

pub mod data_port;
pub mod config_port;
pub mod report_port;
