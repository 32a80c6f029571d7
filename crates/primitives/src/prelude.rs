pub use crate::{
    block::BlockRecord,
    epoch::{EpochOverview, EpochRange, EpochRecord, RawEpochs},
    network::NetworkInfo,
};
