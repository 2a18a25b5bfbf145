use crate::{ContentSource, FetchWindow};
use async_trait::async_trait;
use tracing::info;
use xthreads_core::{CoreError, RawPost, SnapshotStore, Stage};

/// Replays a previously saved raw snapshot instead of hitting the network.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    platform: String,
    store: SnapshotStore,
}

impl SnapshotSource {
    pub fn new(platform: impl Into<String>, store: SnapshotStore) -> Self {
        Self {
            platform: platform.into(),
            store,
        }
    }
}

#[async_trait]
impl ContentSource for SnapshotSource {
    fn platform(&self) -> &str {
        &self.platform
    }

    async fn fetch(&self, window: &FetchWindow) -> Result<Vec<RawPost>, CoreError> {
        let mut posts: Vec<RawPost> = self.store.load(Stage::Raw, &self.platform)?;
        posts.truncate(window.max_posts);
        info!(
            "Replayed {} {} posts from {}",
            posts.len(),
            self.platform,
            self.store.path_for(Stage::Raw, &self.platform).display()
        );
        Ok(posts)
    }
}
