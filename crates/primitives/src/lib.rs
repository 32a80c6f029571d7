//! Data types shared between the query layer, the status providers and the
//! epoch store.

pub mod block;
pub mod epoch;
pub mod network;

pub mod prelude;
