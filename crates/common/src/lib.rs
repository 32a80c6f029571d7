//! Utilities shared by the chainview services, mostly process setup such as
//! initializing the tracing framework.

pub mod logging;
