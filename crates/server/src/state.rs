use std::sync::Arc;
use optimux_core::{ChunkWriter, Config, DeletionRegistry, Engine, SanitizedConfig};

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    engine: Arc<dyn Engine>,
    deletions: DeletionRegistry,
    uploads: ChunkWriter,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    pub fn new(
        config: Config,
        engine: Arc<dyn Engine>,
        deletions: DeletionRegistry,
        uploads: ChunkWriter,
        ws_broadcaster: WsBroadcaster,
    ) -> Self {
        Self {
            config,
            engine,
            deletions,
            uploads,
            ws_broadcaster,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn deletions(&self) -> &DeletionRegistry {
        &self.deletions
    }

    pub fn uploads(&self) -> &ChunkWriter {
        &self.uploads
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}
