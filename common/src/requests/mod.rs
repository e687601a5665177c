//! Request payloads of the portal API. Text fields arrive untrimmed; the
//! shell trims and validates them before any store call.

use crate::model::session::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseDraft {
    #[serde(default)]
    pub course_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollegeDraft {
    #[serde(default)]
    pub college_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyDraft {
    #[serde(default)]
    pub company_name: String,
}

/// Add/edit form of a student.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub college_id: Option<i64>,
    /// Only honoured by edits; new students always start at zero.
    #[serde(default)]
    pub downloaded_count: Option<i64>,
}

/// Flips a boolean column; `current` is the value the caller last saw.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub current: bool,
}

/// Body of `PUT /v1/students/{id}/eligibility`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRequest {
    pub eligible: bool,
}

/// Body of a non-2xx answer of the eligibility endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum LoginRequest {
    Admin { key: String },
    Student { phone_number: String },
}

impl LoginRequest {
    pub fn role(&self) -> Role {
        match self {
            LoginRequest::Admin { .. } => Role::Admin,
            LoginRequest::Student { .. } => Role::Student,
        }
    }
}
