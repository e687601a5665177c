//! Fetch, check, convert and show one student's certificate.

use super::convert::{decode_blob, ConvertError};
use crate::state::AppState;
use crate::store::{decode_row, select_single, Filter, Query, StoreError};
use common::model::student::CertificateRow;
use common::model::toast::{Toast, ToastVariant};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

const CERTIFICATE_COLUMNS: &[&str] = &["name", "certificate", "certificate_approved", "eligible"];

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("This student is not eligible for a certificate.")]
    NotEligible,

    #[error("This student's certificate has not been approved yet.")]
    NotApproved,

    #[error("No certificate data found for this student.")]
    NoCertificate,

    #[error("Student not found")]
    StudentNotFound,

    #[error("Failed to fetch student certificate data")]
    Fetch(#[source] StoreError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("Generated PDF blob is empty")]
    EmptyPdf,

    #[error("Failed to save certificate preview: {0}")]
    Save(#[from] std::io::Error),

    #[error("Failed to convert certificate to PDF: {0}")]
    Task(String),
}

impl PreviewError {
    pub fn title(&self) -> &'static str {
        match self {
            PreviewError::NotEligible => "Not Eligible",
            PreviewError::NotApproved => "Certificate Not Approved",
            PreviewError::NoCertificate => "No Certificate",
            _ => "Preview Error",
        }
    }

    pub fn toast(&self) -> Toast {
        Toast::new(self.title(), self.to_string(), ToastVariant::Destructive)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PreviewOutcome {
    /// Shown in a new tab at a temporary URL.
    Opened { url: String },
    /// The tab could not be opened; the PDF was written to the downloads directory.
    Downloaded { path: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub student_name: String,
    #[serde(flatten)]
    pub outcome: PreviewOutcome,
}

impl Preview {
    pub fn toast(&self) -> Toast {
        match self.outcome {
            PreviewOutcome::Opened { .. } => Toast::new(
                "Preview Opened",
                format!("Certificate preview for {} opened in new tab", self.student_name),
                ToastVariant::Default,
            ),
            PreviewOutcome::Downloaded { .. } => Toast::new(
                "Preview Downloaded",
                "Pop-up was blocked. Certificate preview has been downloaded instead.",
                ToastVariant::Default,
            ),
        }
    }
}

pub struct CertificatePdf {
    pub student_name: String,
    pub bytes: Vec<u8>,
}

fn safe_name(student_name: &str) -> String {
    student_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name of a saved preview, with path separators and other unsafe characters replaced.
pub fn preview_file_name(student_name: &str) -> String {
    format!("{}_certificate_preview.pdf", safe_name(student_name))
}

/// File name of a downloaded certificate.
pub fn certificate_file_name(student_name: &str) -> String {
    format!("{}_certificate.pdf", safe_name(student_name))
}

/// Loads and checks the certificate of `student_id`, then converts it to PDF.
///
/// The checks run in order: eligibility, approval, presence of data. The
/// converter is only invoked when all of them pass.
pub async fn fetch_pdf(state: &AppState, student_id: i64) -> Result<CertificatePdf, PreviewError> {
    let query = Query::all()
        .columns(CERTIFICATE_COLUMNS)
        .filter(Filter::eq("student_id", student_id));
    let row = select_single(state.store.as_ref(), "students", query)
        .await
        .map_err(PreviewError::Fetch)?
        .ok_or(PreviewError::StudentNotFound)?;
    let row: CertificateRow = decode_row(row).map_err(PreviewError::Fetch)?;

    if !row.eligible {
        return Err(PreviewError::NotEligible);
    }
    if !row.certificate_approved {
        return Err(PreviewError::NotApproved);
    }
    let blob = match row.certificate {
        Some(blob) if !blob.trim().is_empty() => blob,
        _ => return Err(PreviewError::NoCertificate),
    };

    let converter = Arc::clone(&state.converter);
    let bytes = tokio::task::spawn_blocking(move || {
        let image = decode_blob(&blob)?;
        converter.convert(&image)
    })
    .await
    .map_err(|e| PreviewError::Task(e.to_string()))??;

    if bytes.is_empty() {
        return Err(PreviewError::EmptyPdf);
    }
    Ok(CertificatePdf {
        student_name: row.name,
        bytes,
    })
}

/// Converts the certificate of `student_id` and shows it in a new tab,
/// falling back to a file in the downloads directory. The temporary URL is
/// revoked after the configured delay whatever the outcome.
pub async fn preview(state: &AppState, student_id: i64) -> Result<Preview, PreviewError> {
    let pdf = fetch_pdf(state, student_id).await?;
    let file_name = preview_file_name(&pdf.student_name);
    let object = state
        .blobs
        .create(pdf.bytes.clone(), "application/pdf", &file_name)
        .await;
    state
        .blobs
        .revoke_after(object.token.clone(), state.config.preview_revoke_delay());

    let viewer = Arc::clone(&state.viewer);
    let url = object.url.clone();
    let opened = tokio::task::spawn_blocking(move || viewer.open(&url))
        .await
        .map_err(|e| PreviewError::Task(e.to_string()))?;

    let outcome = if opened {
        info!("opened certificate preview of student {}", student_id);
        PreviewOutcome::Opened { url: object.url }
    } else {
        warn!("preview tab blocked, saving {} instead", file_name);
        let dir = &state.config.downloads_dir;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &pdf.bytes).await?;
        PreviewOutcome::Downloaded {
            path: path.display().to_string(),
        }
    };

    Ok(Preview {
        student_name: pdf.student_name,
        outcome,
    })
}


#[cfg(test)]
mod tests {
    use super::fakes::{CountingConverter, FakeViewer};
    use super::*;
    use crate::config::test_config;
    use crate::store::sqlite::SqliteStore;
    use crate::store::Row;
    use serde_json::json;
    use std::time::Duration;

    // 1x1 transparent PNG
    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    struct Fixture {
        state: AppState,
        converter: Arc<CountingConverter>,
        viewer: Arc<FakeViewer>,
        downloads: tempfile::TempDir,
    }

    async fn fixture(pdf: &[u8], allow_tabs: bool) -> Fixture {
        let downloads = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.downloads_dir = downloads.path().to_path_buf();
        let converter = Arc::new(CountingConverter::new(pdf));
        let viewer = Arc::new(FakeViewer::new(allow_tabs));
        let state = AppState::assemble(
            config,
            Arc::new(SqliteStore::open_in_memory().unwrap()),
            converter.clone(),
            viewer.clone(),
        )
        .unwrap();
        Fixture {
            state,
            converter,
            viewer,
            downloads,
        }
    }

    async fn seed(
        state: &AppState,
        name: &str,
        eligible: bool,
        approved: bool,
        certificate: Option<&str>,
    ) -> i64 {
        let row = json!({
            "name": name,
            "phone_number": format!("phone-{name}"),
            "eligible": eligible,
            "certificate_approved": approved,
            "certificate": certificate,
        });
        let row: Row = row.as_object().unwrap().clone();
        let stored = state.store.insert("students", row).await.unwrap();
        stored["student_id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn checks_run_in_order_before_any_conversion() {
        let f = fixture(b"%PDF", true).await;
        let cases = [
            ("Asha", false, true, Some(PIXEL), "Not Eligible"),
            ("Ravi", true, false, Some(PIXEL), "Certificate Not Approved"),
            ("Meena", true, true, None, "No Certificate"),
            ("Kiran", true, true, Some("  "), "No Certificate"),
            ("Dev", false, false, None, "Not Eligible"),
        ];
        for (name, eligible, approved, certificate, title) in cases {
            let id = seed(&f.state, name, eligible, approved, certificate).await;
            let err = preview(&f.state, id).await.unwrap_err();
            assert_eq!(err.toast().title, title, "{name}");
            assert!(err.toast().is_error());
        }
        assert_eq!(f.converter.calls(), 0);
        assert!(f.viewer.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn opens_a_tab_when_possible() {
        let f = fixture(b"%PDF-1.3 fake", true).await;
        let id = seed(&f.state, "Asha", true, true, Some(PIXEL)).await;

        let preview = preview(&f.state, id).await.unwrap();
        let PreviewOutcome::Opened { url } = &preview.outcome else {
            panic!("expected a tab, got {:?}", preview.outcome);
        };
        assert_eq!(f.viewer.opened.lock().unwrap().as_slice(), &[url.clone()]);
        assert_eq!(
            preview.toast().description,
            "Certificate preview for Asha opened in new tab"
        );

        let token = url.rsplit('/').next().unwrap();
        let blob = f.state.blobs.get(token).await.unwrap();
        assert_eq!(blob.bytes.as_slice(), b"%PDF-1.3 fake");
        assert_eq!(f.converter.calls(), 1);
    }

    #[tokio::test]
    async fn blocked_tabs_fall_back_to_a_download() {
        let f = fixture(b"%PDF-1.3 fake", false).await;
        let id = seed(&f.state, "Ravi Kumar", true, true, Some(PIXEL)).await;

        let preview = preview(&f.state, id).await.unwrap();
        let PreviewOutcome::Downloaded { path } = &preview.outcome else {
            panic!("expected a download, got {:?}", preview.outcome);
        };
        assert!(path.ends_with("Ravi Kumar_certificate_preview.pdf"));
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.3 fake");
        assert_eq!(preview.toast().title, "Preview Downloaded");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_downloads_still_revoke_the_url() {
        let mut f = fixture(b"%PDF-1.3 fake", false).await;
        let blocker = tempfile::NamedTempFile::new_in(f.downloads.path()).unwrap();
        let mut config = (*f.state.config).clone();
        config.downloads_dir = blocker.path().join("downloads");
        f.state.config = Arc::new(config);
        let id = seed(&f.state, "Asha", true, true, Some(PIXEL)).await;

        let err = preview(&f.state, id).await.unwrap_err();
        assert!(matches!(err, PreviewError::Save(_)));
        assert_eq!(err.toast().title, "Preview Error");

        let url = f.viewer.opened.lock().unwrap()[0].clone();
        let token = url.rsplit('/').next().unwrap();
        assert!(f.state.blobs.get(token).await.is_some());

        tokio::time::sleep(f.state.config.preview_revoke_delay() + Duration::from_secs(1)).await;
        assert!(f.state.blobs.get(token).await.is_none());
    }

    #[tokio::test]
    async fn empty_pdfs_and_missing_students_are_preview_errors() {
        let f = fixture(b"", true).await;
        let id = seed(&f.state, "Asha", true, true, Some(PIXEL)).await;
        let err = preview(&f.state, id).await.unwrap_err();
        assert!(matches!(err, PreviewError::EmptyPdf));
        assert_eq!(err.toast().title, "Preview Error");

        let err = preview(&f.state, 404).await.unwrap_err();
        assert_eq!(err.toast().description, "Student not found");
    }

    #[test]
    fn file_names_stay_inside_the_downloads_directory() {
        assert_eq!(preview_file_name("Asha"), "Asha_certificate_preview.pdf");
        assert_eq!(
            preview_file_name("../etc/passwd"),
            ".._etc_passwd_certificate_preview.pdf"
        );
    }
}
