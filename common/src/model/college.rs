use serde::{Deserialize, Serialize};

/// A row of the `colleges` table. `college_name` is unique in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct College {
    pub college_id: i64,
    pub college_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
