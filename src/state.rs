use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::render::Typeface;

#[derive(Clone)]
pub struct AppState {
    pub typeface: Arc<Typeface>,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub dev_mode: bool,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        AppState {
            typeface: Arc::new(Typeface::load(&config.font_path, config.font_size)),
            static_dir: config.static_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
            dev_mode: config.dev_mode,
        }
    }
}
