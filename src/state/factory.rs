use crate::config::DataConfig;
use crate::error::{AppError, Result};
use crate::models::ForumFixture;
use crate::state::{ForumStore, InMemoryForumStore};
use std::path::Path;
use std::sync::Arc;

/// Read a forum fixture from a JSON file
pub fn load_fixture(path: &Path) -> Result<ForumFixture> {
    let raw = std::fs::read_to_string(path)?;
    let fixture: ForumFixture = serde_json::from_str(&raw)?;
    Ok(fixture)
}

/// Create the forum store based on configuration
pub fn create_store(config: &DataConfig) -> Result<Arc<dyn ForumStore>> {
    match config.fixture_path.as_deref() {
        Some(path) if path.exists() => {
            tracing::info!(path = ?path, "Loading forum fixture");
            let fixture = load_fixture(path)?;
            tracing::info!(
                categories = fixture.categories.len(),
                threads = fixture.threads.len(),
                posts = fixture.posts.len(),
                users = fixture.users.len(),
                "Forum fixture loaded"
            );
            Ok(Arc::new(InMemoryForumStore::from_fixture(fixture)))
        }
        Some(path) => Err(AppError::Configuration(format!(
            "Fixture file not found: {}",
            path.display()
        ))),
        None => {
            tracing::warn!("No fixture configured, starting with an empty forum");
            Ok(Arc::new(InMemoryForumStore::new()))
        }
    }
}
