//! Epoch data store.
//!
//! Keeps two independently fetched sets of epochs, the explicitly browsed
//! page and the automatically refreshed latest window, and derives display
//! overviews from them.

mod memo;
mod reactions;
mod store;
pub mod transform;

pub use store::{EpochStore, LATEST_EPOCHS_WINDOW};
