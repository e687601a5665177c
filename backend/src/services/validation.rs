use crate::errors::PortalError;
use serde_json::Value;

/// Trims a required text field; blank values are rejected with `message`.
pub fn required(value: &str, message: &str) -> Result<String, PortalError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PortalError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field, storing blanks as `null`.
pub fn optional_text(value: Option<&str>) -> Value {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => Value::String(s.to_string()),
        _ => Value::Null,
    }
}

/// Accepts uploads whose MIME type is `image/*` and whose size is at most `max_bytes`.
pub fn image_upload(mime: Option<&str>, size: usize, max_bytes: usize) -> Result<(), PortalError> {
    match mime {
        Some(m) if m.starts_with("image/") => {}
        _ => {
            return Err(PortalError::Validation(
                "Please select an image file".to_string(),
            ))
        }
    }
    if size > max_bytes {
        return Err(PortalError::Validation(format!(
            "File size must be less than {}MB",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}
