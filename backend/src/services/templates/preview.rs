use crate::auth::AdminSession;
use crate::certificates::convert::decode_blob;
use crate::errors::PortalError;
use crate::services::crud::Entity;
use crate::state::AppState;
use crate::store::{decode_row, select_single, Filter, Query};
use actix_web::{web, HttpResponse};
use common::model::template::Template;

/// MIME type declared by a data URL, if any.
fn declared_mime(data_url: &str) -> Option<&str> {
    data_url
        .strip_prefix("data:")?
        .split_once(';')
        .map(|(mime, _)| mime)
}

/// `GET /{id}/image`: the template image as stored.
pub async fn process(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, PortalError> {
    let id = id.into_inner();
    let row = select_single(
        state.store.as_ref(),
        Template::TABLE,
        Query::all().filter(Filter::eq(Template::ID_COLUMN, id)),
    )
    .await?
    .ok_or_else(|| PortalError::NotFound(format!("Template {id}")))?;
    let template: Template = decode_row(row)?;

    let mime = declared_mime(&template.template)
        .map(str::to_string)
        .unwrap_or_else(|| {
            mime_guess::from_path(&template.template)
                .first_or_octet_stream()
                .to_string()
        });
    let bytes = decode_blob(&template.template)
        .map_err(|e| PortalError::Validation(e.to_string()))?;
    Ok(HttpResponse::Ok().content_type(mime).body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_the_mime_type_of_data_urls() {
        assert_eq!(declared_mime("data:image/jpeg;base64,AAAA"), Some("image/jpeg"));
        assert_eq!(declared_mime("certificate.png"), None);
    }
}
