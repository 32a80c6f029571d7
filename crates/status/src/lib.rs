//! Network info and latest blocks providers.
//!
//! [`StatusChannel`] holds the observable values, the workers in [`worker`]
//! keep them fresh by polling the query service.

mod channel;
pub mod worker;

pub use channel::StatusChannel;
