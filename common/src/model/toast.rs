use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Default,
    Destructive,
}

/// A transient notification. Every portal operation answers with one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn new(title: impl Into<String>, description: impl Into<String>, variant: ToastVariant) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant,
        }
    }

    pub fn success(description: impl Into<String>) -> Self {
        Self::new("Success", description, ToastVariant::Default)
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self::new("Error", description, ToastVariant::Destructive)
    }

    pub fn is_error(&self) -> bool {
        self.variant == ToastVariant::Destructive
    }
}

/// Envelope of every JSON answer of the portal API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
}

impl<T> PageResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            toast: None,
        }
    }

    pub fn with_toast(data: Option<T>, toast: Toast) -> Self {
        Self {
            data,
            toast: Some(toast),
        }
    }
}
