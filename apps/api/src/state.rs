use std::sync::Arc;

use crate::config::Config;
use crate::styling::advisor::Advisor;
use crate::wardrobe::images::ImageStore;
use crate::wardrobe::store::WardrobeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Sole owner of the wardrobe and rating documents; serialises appends.
    pub store: Arc<WardrobeStore>,
    /// Pluggable image storage. Default: LocalImageStore on UPLOAD_DIR.
    pub images: Arc<dyn ImageStore>,
    /// Pluggable advisor. DisabledAdvisor unless ANTHROPIC_API_KEY is set.
    pub advisor: Arc<dyn Advisor>,
    pub config: Config,
}
