//! Building result records from forum entities

use crate::models::{
    AuthorRef, Category, EntitySignals, Post, ResultRecord, ResultType, Subcategory, Thread, User,
};

/// Posts are shown as a snippet of this many characters
pub const POST_SNIPPET_CHARS: usize = 200;

/// Cut `text` to `max_chars`, appending "..." when something was cut
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn author_ref(user: &User) -> AuthorRef {
    AuthorRef {
        id: user.id,
        display_name: user.display_name.clone(),
    }
}

pub fn post_record(
    post: &Post,
    thread: &Thread,
    subcategory: &Subcategory,
    category: &Category,
    author: Option<&User>,
    rank: f64,
) -> ResultRecord {
    ResultRecord {
        result_type: ResultType::Post,
        id: post.id,
        title: format!("Post in \"{}\"", thread.title),
        content: truncate_with_ellipsis(&post.content, POST_SNIPPET_CHARS),
        author: author.map(author_ref),
        created_at: Some(post.created_at),
        url: format!(
            "/forums/{}/{}/{}/#post-{}",
            category.slug, subcategory.slug, thread.slug, post.id
        ),
        category: category.name.clone(),
        subcategory: subcategory.name.clone(),
        rank,
        signals: EntitySignals {
            vote_count: post.vote_count,
            body_length: post.content.chars().count(),
            ..Default::default()
        },
        score: None,
    }
}

pub fn thread_record(
    thread: &Thread,
    subcategory: &Subcategory,
    category: &Category,
    author: Option<&User>,
    rank: f64,
) -> ResultRecord {
    ResultRecord {
        result_type: ResultType::Thread,
        id: thread.id,
        title: thread.title.clone(),
        content: format!("Thread in {} - {} posts", subcategory.name, thread.post_count),
        author: author.map(author_ref),
        created_at: Some(thread.created_at),
        url: format!("/forums/{}/{}/{}/", category.slug, subcategory.slug, thread.slug),
        category: category.name.clone(),
        subcategory: subcategory.name.clone(),
        rank,
        signals: EntitySignals {
            view_count: thread.view_count,
            post_count: thread.post_count,
            is_pinned: thread.is_pinned,
            is_locked: thread.is_locked,
            ..Default::default()
        },
        score: None,
    }
}

pub fn user_record(user: &User, rank: f64) -> ResultRecord {
    let location = (!user.location.is_empty()).then(|| user.location.clone());

    ResultRecord {
        result_type: ResultType::User,
        id: user.id,
        title: user.display_name.clone(),
        content: if user.bio.is_empty() {
            "No bio available".to_string()
        } else {
            user.bio.clone()
        },
        author: Some(author_ref(user)),
        created_at: Some(user.date_joined),
        url: format!("/accounts/user/{}/", user.id),
        category: "Users".to_string(),
        subcategory: location.clone().unwrap_or_else(|| "Unknown location".to_string()),
        rank,
        signals: EntitySignals {
            post_count: user.post_count,
            location,
            joined_at: Some(user.date_joined),
            ..Default::default()
        },
        score: None,
    }
}

pub fn category_record(category: &Category, rank: f64) -> ResultRecord {
    ResultRecord {
        result_type: ResultType::Category,
        id: category.id,
        title: category.name.clone(),
        content: category.description.clone(),
        author: None,
        created_at: None,
        url: format!("/forums/{}/", category.slug),
        category: "Categories".to_string(),
        subcategory: "Main Category".to_string(),
        rank,
        signals: EntitySignals::default(),
        score: None,
    }
}

pub fn subcategory_record(subcategory: &Subcategory, category: &Category, rank: f64) -> ResultRecord {
    ResultRecord {
        result_type: ResultType::Subcategory,
        id: subcategory.id,
        title: subcategory.name.clone(),
        content: subcategory.description.clone(),
        author: None,
        created_at: None,
        url: format!("/forums/{}/{}/", category.slug, subcategory.slug),
        category: category.name.clone(),
        subcategory: "Subcategory".to_string(),
        rank,
        signals: EntitySignals::default(),
        score: None,
    }
}

/// Text a strategy matches against for each entity type
pub fn post_text(post: &Post) -> Vec<&str> {
    vec![post.content.as_str()]
}

pub fn thread_text(thread: &Thread) -> Vec<&str> {
    vec![thread.title.as_str()]
}

pub fn user_text(user: &User) -> Vec<&str> {
    vec![user.display_name.as_str(), user.bio.as_str(), user.location.as_str()]
}

pub fn category_text(category: &Category) -> Vec<&str> {
    vec![category.name.as_str(), category.description.as_str()]
}

pub fn subcategory_text(subcategory: &Subcategory) -> Vec<&str> {
    vec![subcategory.name.as_str(), subcategory.description.as_str()]
}
