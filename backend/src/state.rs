use crate::auth::SessionStore;
use crate::certificates::blobs::BlobRegistry;
use crate::certificates::convert::{GenPdfConverter, PdfConverter};
use crate::certificates::viewer::{BrowserViewer, NoViewer, Viewer};
use crate::config::{Config, StoreBackend};
use crate::eligibility::EligibilityClient;
use crate::errors::PortalError;
use crate::store::rest::RestStore;
use crate::store::sqlite::SqliteStore;
use crate::store::RemoteStore;
use log::info;
use std::sync::Arc;

/// Shared by every worker of the server as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn RemoteStore>,
    pub eligibility: EligibilityClient,
    pub sessions: SessionStore,
    pub blobs: BlobRegistry,
    pub converter: Arc<dyn PdfConverter>,
    pub viewer: Arc<dyn Viewer>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, PortalError> {
        let store: Arc<dyn RemoteStore> = match config.store_backend {
            StoreBackend::Rest => {
                let (Some(url), Some(key)) = (&config.store_url, &config.store_key) else {
                    return Err(PortalError::Config(
                        "PORTAL_STORE_URL and PORTAL_STORE_KEY are required for the rest backend"
                            .to_string(),
                    ));
                };
                info!("using hosted store at {}", url);
                Arc::new(RestStore::new(url, key, config.request_timeout())?)
            }
            StoreBackend::Sqlite => {
                info!("using local store {}", config.sqlite_path);
                Arc::new(SqliteStore::open(&config.sqlite_path)?)
            }
        };
        let converter = Arc::new(GenPdfConverter::new(config.fonts_dir.clone()));
        let viewer: Arc<dyn Viewer> = if config.open_browser {
            Arc::new(BrowserViewer)
        } else {
            Arc::new(NoViewer)
        };
        Self::assemble(config, store, converter, viewer)
    }

    pub fn assemble(
        config: Config,
        store: Arc<dyn RemoteStore>,
        converter: Arc<dyn PdfConverter>,
        viewer: Arc<dyn Viewer>,
    ) -> Result<Self, PortalError> {
        let eligibility = EligibilityClient::new(&config.api_url, config.request_timeout())
            .map_err(|e| PortalError::Config(e.to_string()))?;
        Ok(Self {
            blobs: BlobRegistry::new(config.public_url()),
            sessions: SessionStore::new(config.session_ttl()),
            config: Arc::new(config),
            store,
            eligibility,
            converter,
            viewer,
        })
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory store, a converter answering a fixed PDF, and no browser.
    pub(crate) fn for_tests() -> Self {
        use crate::certificates::preview::fakes::CountingConverter;

        let mut config = crate::config::test_config();
        config.admin_key = Some("admin-secret".to_string());
        Self::assemble(
            config,
            Arc::new(SqliteStore::open_in_memory().unwrap()),
            Arc::new(CountingConverter::new(b"%PDF-1.3 test")),
            Arc::new(NoViewer),
        )
        .unwrap()
    }
}
