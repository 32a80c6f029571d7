use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// Block summary as returned by the query service.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    /// Block height, absent for epoch boundary blocks.
    pub number: Option<u64>,

    pub hash: String,

    pub epoch_no: Option<u64>,

    pub slot_no: Option<u64>,

    pub created_at: DateTime<Utc>,

    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub transactions_count: u64,
}
