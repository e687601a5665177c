/// Opens a URL in a new browser tab.
pub trait Viewer: Send + Sync {
    /// Returns false when no tab could be opened (blocked or headless).
    fn open(&self, url: &str) -> bool;
}

/// The user's default browser.
pub struct BrowserViewer;

impl Viewer for BrowserViewer {
    fn open(&self, url: &str) -> bool {
        match webbrowser::open(url) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("could not open {}: {}", url, e);
                false
            }
        }
    }
}

/// Never opens anything; previews fall back to downloads.
pub struct NoViewer;

impl Viewer for NoViewer {
    fn open(&self, _url: &str) -> bool {
        false
    }
}
