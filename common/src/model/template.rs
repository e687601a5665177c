use serde::{Deserialize, Serialize};

/// A certificate template owned by a company.
///
/// `template` holds the image as a base64 data URL (`data:image/png;base64,...`).
/// Rows seeded by older migrations may carry a bare file name instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    pub template: String,
    pub company_id: i64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A template joined with the name of its company for listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateView {
    #[serde(flatten)]
    pub template: Template,
    pub company_name: Option<String>,
}
