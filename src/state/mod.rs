pub mod cache;
pub mod factory;
pub mod store;

pub use cache::*;
pub use factory::{create_store, load_fixture};
pub use store::*;

use crate::error::Result;
use crate::models::{Category, Post, Subcategory, Thread, User};
use async_trait::async_trait;

/// Read-only lookup over forum entities
#[async_trait]
pub trait ForumStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>>;

    async fn list_subcategories(&self) -> Result<Vec<Subcategory>>;

    async fn list_threads(&self) -> Result<Vec<Thread>>;

    async fn list_posts(&self) -> Result<Vec<Post>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    async fn get_category(&self, id: u64) -> Result<Option<Category>>;

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    async fn get_subcategory(&self, id: u64) -> Result<Option<Subcategory>>;

    async fn get_thread(&self, id: u64) -> Result<Option<Thread>>;

    async fn get_post(&self, id: u64) -> Result<Option<Post>>;

    async fn get_user(&self, id: u64) -> Result<Option<User>>;
}
