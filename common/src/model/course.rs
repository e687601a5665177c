use serde::{Deserialize, Serialize};

/// A row of the `courses` table. `course_name` is unique in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: i64,
    pub course_name: String,
}
