use std::sync::Arc;

use picstash_core::core::asset_manager::AssetManager;

pub struct AppState {
    pub manager: AssetManager,
}

pub type SharedState = Arc<AppState>;
