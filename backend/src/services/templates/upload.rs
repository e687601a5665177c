//! Template upload (`POST /api/admin/templates`).
//!
//! The multipart body carries a `company_id` field and a `file` field. All
//! checks that need no store run first, in this order: both parts present,
//! `image/*` type, size limit. Only then is the store asked whether the
//! company already has a template, and the image stored as a data URL.

use crate::auth::AdminSession;
use crate::errors::PortalError;
use crate::services::crud::{respond, Action, Entity};
use crate::services::validation::image_upload;
use crate::state::AppState;
use crate::store::{decode_row, select_single, Filter, Query, RemoteStore, Row};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::model::template::Template;
use futures_util::StreamExt;
use log::info;
use serde_json::Value;

#[derive(Debug, Default)]
pub struct UploadForm {
    pub company_id: Option<i64>,
    pub file: Option<UploadedFile>,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
    /// Total size of the part, even when reading stopped at the limit.
    pub size: usize,
}

fn multipart_error(err: actix_multipart::MultipartError) -> PortalError {
    PortalError::Validation(format!("Invalid upload: {err}"))
}

/// Reads the form. File bytes beyond `max_bytes` are counted but not kept.
pub async fn read_form(mut payload: Multipart, max_bytes: usize) -> Result<UploadForm, PortalError> {
    let mut form = UploadForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some("company_id") => {
                let mut raw = Vec::new();
                while let Some(chunk) = field.next().await {
                    raw.extend_from_slice(&chunk.map_err(multipart_error)?);
                }
                form.company_id = String::from_utf8_lossy(&raw).trim().parse().ok();
            }
            Some("file") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(str::to_string));
                let mime = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .filter(|m| m != "application/octet-stream")
                    .or_else(|| {
                        filename.as_deref().and_then(|f| {
                            mime_guess::from_path(f).first().map(|m| m.essence_str().to_string())
                        })
                    });

                let mut bytes = Vec::new();
                let mut size = 0;
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(multipart_error)?;
                    size += chunk.len();
                    if size <= max_bytes {
                        bytes.extend_from_slice(&chunk);
                    }
                }
                if size > 0 || filename.is_some() {
                    form.file = Some(UploadedFile { mime, bytes, size });
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Checks the form without touching the store.
pub fn validate(form: UploadForm, max_bytes: usize) -> Result<(i64, UploadedFile), PortalError> {
    let (Some(company_id), Some(file)) = (form.company_id, form.file) else {
        return Err(PortalError::Validation(
            Template::MESSAGES.required.to_string(),
        ));
    };
    image_upload(file.mime.as_deref(), file.size, max_bytes)?;
    Ok((company_id, file))
}

pub async fn store_template(
    store: &dyn RemoteStore,
    company_id: i64,
    file: UploadedFile,
) -> Result<Template, PortalError> {
    let existing = select_single(
        store,
        Template::TABLE,
        Query::all()
            .columns(&[Template::ID_COLUMN])
            .filter(Filter::eq("company_id", company_id)),
    )
    .await?;
    if existing.is_some() {
        return Err(PortalError::Conflict(
            Template::MESSAGES.duplicate.unwrap_or(Template::MESSAGES.add_failed).to_string(),
        ));
    }

    let mime = file.mime.unwrap_or_else(|| "image/png".to_string());
    let data_url = format!("data:{};base64,{}", mime, BASE64.encode(&file.bytes));
    let mut row = Row::new();
    row.insert("company_id".to_string(), Value::from(company_id));
    row.insert("template".to_string(), Value::String(data_url));
    row.insert("is_selected".to_string(), Value::Bool(false));
    let stored = store.insert(Template::TABLE, row).await?;
    Ok(decode_row(stored)?)
}

pub async fn process(
    _admin: AdminSession,
    state: web::Data<AppState>,
    payload: Multipart,
) -> HttpResponse {
    let max_bytes = state.config.max_template_bytes;
    let result = async {
        let form = read_form(payload, max_bytes).await?;
        let (company_id, file) = validate(form, max_bytes)?;
        let template = store_template(state.store.as_ref(), company_id, file).await?;
        info!("template {} uploaded for company {}", template.id, company_id);
        Ok::<_, PortalError>(template)
    }
    .await;
    respond(result, &Template::MESSAGES, Action::Add)
}
