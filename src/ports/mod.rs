//! Port traits decoupling the domain from I/O.

pub mod config_port;
pub mod price_source;
pub mod report_port;
