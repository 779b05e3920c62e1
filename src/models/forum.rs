use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level forum category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

/// Subcategory nested under a category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subcategory {
    pub id: u64,
    pub category_id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

/// Discussion thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thread {
    pub id: u64,
    pub subcategory_id: u64,
    pub author_id: u64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub post_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Reply inside a thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: u64,
    pub thread_id: u64,
    pub author_id: u64,
    pub content: String,
    #[serde(default)]
    pub vote_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Forum member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    #[serde(default)]
    pub post_count: u64,
}

fn default_active() -> bool {
    true
}

/// Snapshot of forum content, as stored in the JSON fixture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForumFixture {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
    #[serde(default)]
    pub threads: Vec<Thread>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub users: Vec<User>,
}
