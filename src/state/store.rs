use crate::error::Result;
use crate::models::{Category, ForumFixture, Post, Subcategory, Thread, User};
use crate::state::ForumStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory forum store (for standalone runs and testing)
#[derive(Clone, Default)]
pub struct InMemoryForumStore {
    categories: Arc<DashMap<u64, Category>>,
    subcategories: Arc<DashMap<u64, Subcategory>>,
    threads: Arc<DashMap<u64, Thread>>,
    posts: Arc<DashMap<u64, Post>>,
    users: Arc<DashMap<u64, User>>,
}

impl InMemoryForumStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: ForumFixture) -> Self {
        let store = Self::new();
        for category in fixture.categories {
            store.insert_category(category);
        }
        for subcategory in fixture.subcategories {
            store.insert_subcategory(subcategory);
        }
        for thread in fixture.threads {
            store.insert_thread(thread);
        }
        for post in fixture.posts {
            store.insert_post(post);
        }
        for user in fixture.users {
            store.insert_user(user);
        }
        store
    }

    pub fn insert_category(&self, category: Category) {
        self.categories.insert(category.id, category);
    }

    pub fn insert_subcategory(&self, subcategory: Subcategory) {
        self.subcategories.insert(subcategory.id, subcategory);
    }

    pub fn insert_thread(&self, thread: Thread) {
        self.threads.insert(thread.id, thread);
    }

    pub fn insert_post(&self, post: Post) {
        self.posts.insert(post.id, post);
    }

    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }
}

/// Collect map values ordered by id so iteration order never leaks into results
fn sorted_values<T: Clone>(map: &DashMap<u64, T>) -> Vec<T> {
    let mut entries: Vec<(u64, T)> = map
        .iter()
        .map(|entry| (*entry.key(), entry.value().clone()))
        .collect();
    entries.sort_by_key(|(id, _)| *id);
    entries.into_iter().map(|(_, value)| value).collect()
}

#[async_trait]
impl ForumStore for InMemoryForumStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(sorted_values(&self.categories))
    }

    async fn list_subcategories(&self) -> Result<Vec<Subcategory>> {
        Ok(sorted_values(&self.subcategories))
    }

    async fn list_threads(&self) -> Result<Vec<Thread>> {
        Ok(sorted_values(&self.threads))
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(sorted_values(&self.posts))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(sorted_values(&self.users))
    }

    async fn get_category(&self, id: u64) -> Result<Option<Category>> {
        Ok(self.categories.get(&id).map(|entry| entry.clone()))
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        Ok(self
            .categories
            .iter()
            .find(|entry| entry.slug == slug)
            .map(|entry| entry.value().clone()))
    }

    async fn get_subcategory(&self, id: u64) -> Result<Option<Subcategory>> {
        Ok(self.subcategories.get(&id).map(|entry| entry.clone()))
    }

    async fn get_thread(&self, id: u64) -> Result<Option<Thread>> {
        Ok(self.threads.get(&id).map(|entry| entry.clone()))
    }

    async fn get_post(&self, id: u64) -> Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|entry| entry.clone()))
    }

    async fn get_user(&self, id: u64) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(id: u64, slug: &str) -> Category {
        Category {
            id,
            name: slug.to_uppercase(),
            slug: slug.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_lists_are_ordered_by_id() {
        let store = InMemoryForumStore::new();
        store.insert_category(category(3, "woodworking"));
        store.insert_category(category(1, "gardening"));
        store.insert_category(category(2, "music"));

        let ids: Vec<u64> = store
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_find_category_by_slug() {
        let store = InMemoryForumStore::new();
        store.insert_category(category(1, "gardening"));

        assert!(store.find_category_by_slug("gardening").await.unwrap().is_some());
        assert!(store.find_category_by_slug("knitting").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_from_fixture() {
        let fixture = ForumFixture {
            categories: vec![category(1, "gardening")],
            users: vec![User {
                id: 7,
                display_name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
                bio: String::new(),
                location: String::new(),
                is_active: true,
                date_joined: Utc::now(),
                post_count: 0,
            }],
            ..Default::default()
        };

        let store = InMemoryForumStore::from_fixture(fixture);
        assert_eq!(store.list_categories().await.unwrap().len(), 1);
        assert_eq!(store.get_user(7).await.unwrap().unwrap().display_name, "Jane");
        assert!(store.get_post(1).await.unwrap().is_none());
    }
}
