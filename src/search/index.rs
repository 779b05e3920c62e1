//! Tantivy-backed full-text strategy

use crate::models::ResultType;
use crate::search::config::SearchConfig;
use crate::search::document::{category_text, post_text, subcategory_text, thread_text, user_text};
use crate::search::error::{SearchError, SearchResult};
use crate::search::strategy::{BackendCapability, SearchStrategy, TextMatch};
use crate::state::ForumStore;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{BooleanQuery, ConstScoreQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Schema, Value, FAST, INDEXED, STORED, STRING, TEXT};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

/// Index statistics
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    /// Total number of documents in the index
    pub total_documents: u64,

    /// Number of segments
    pub num_segments: usize,
}

#[derive(Clone, Copy)]
struct IndexFields {
    kind: Field,
    entity_id: Field,
    body: Field,
}

fn build_schema() -> (Schema, IndexFields) {
    let mut builder = Schema::builder();
    let kind = builder.add_text_field("kind", STRING | STORED);
    let entity_id = builder.add_u64_field("entity_id", INDEXED | STORED | FAST);
    let body = builder.add_text_field("body", TEXT);
    (builder.build(), IndexFields { kind, entity_id, body })
}

/// Split a term the way the default tokenizer does: alphanumeric runs, lowercased
fn tokenize(term: &str) -> Vec<String> {
    term.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// In-RAM inverted index over the forum with BM25 scoring
pub struct NativeFullTextStrategy {
    store: Arc<dyn ForumStore>,
    fields: IndexFields,

    /// Index writer (wrapped in RwLock for thread-safety)
    writer: Arc<RwLock<IndexWriter>>,

    /// Index reader
    reader: IndexReader,
}

impl NativeFullTextStrategy {
    /// Build the index and load every searchable entity from `store`
    pub async fn new(store: Arc<dyn ForumStore>, config: &SearchConfig) -> SearchResult<Self> {
        let (schema, fields) = build_schema();
        let index = Index::create_in_ram(schema);

        let writer = index
            .writer_with_num_threads(1, config.writer_heap_size)
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create writer: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create reader: {}", e)))?;

        let strategy = Self {
            store,
            fields,
            writer: Arc::new(RwLock::new(writer)),
            reader,
        };
        strategy.refresh().await?;
        Ok(strategy)
    }

    /// Rebuild the index from the current repository contents
    pub async fn refresh(&self) -> SearchResult<u64> {
        let categories = self.store.list_categories().await?;
        let subcategories = self.store.list_subcategories().await?;
        let threads = self.store.list_threads().await?;
        let posts = self.store.list_posts().await?;
        let users = self.store.list_users().await?;

        let mut writer = self.writer.write().await;
        writer.delete_all_documents()?;

        let mut indexed = 0u64;
        let mut add = |kind: ResultType, id: u64, texts: Vec<&str>| -> SearchResult<()> {
            let mut doc = TantivyDocument::new();
            doc.add_text(self.fields.kind, kind.to_string());
            doc.add_u64(self.fields.entity_id, id);
            for text in texts.into_iter().filter(|t| !t.is_empty()) {
                doc.add_text(self.fields.body, text);
            }
            writer.add_document(doc)?;
            indexed += 1;
            Ok(())
        };

        for post in &posts {
            add(ResultType::Post, post.id, post_text(post))?;
        }
        for thread in &threads {
            add(ResultType::Thread, thread.id, thread_text(thread))?;
        }
        for user in users.iter().filter(|u| u.is_active) {
            add(ResultType::User, user.id, user_text(user))?;
        }
        for category in &categories {
            add(ResultType::Category, category.id, category_text(category))?;
        }
        for subcategory in &subcategories {
            add(ResultType::Subcategory, subcategory.id, subcategory_text(subcategory))?;
        }

        writer.commit()?;
        self.reader.reload()?;

        tracing::info!(documents = indexed, "Search index rebuilt");
        Ok(indexed)
    }

    /// Get index statistics
    pub fn stats(&self) -> SearchResult<IndexStats> {
        let searcher = self.reader.searcher();
        let total_documents = searcher.search(&tantivy::query::AllQuery, &Count)? as u64;

        Ok(IndexStats {
            total_documents,
            num_segments: searcher.segment_readers().len(),
        })
    }

    fn build_query(&self, kind: ResultType, tokens: &[String]) -> BooleanQuery {
        let kind_term = Term::from_field_text(self.fields.kind, &kind.to_string());
        let kind_query: Box<dyn Query> = Box::new(ConstScoreQuery::new(
            Box::new(TermQuery::new(kind_term, IndexRecordOption::Basic)),
            0.0,
        ));

        let any_token: Vec<(Occur, Box<dyn Query>)> = tokens
            .iter()
            .map(|token| {
                let term = Term::from_field_text(self.fields.body, token);
                let query: Box<dyn Query> =
                    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                (Occur::Should, query)
            })
            .collect();

        BooleanQuery::new(vec![
            (Occur::Must, kind_query),
            (Occur::Must, Box::new(BooleanQuery::new(any_token))),
        ])
    }
}

#[async_trait]
impl SearchStrategy for NativeFullTextStrategy {
    fn capability(&self) -> BackendCapability {
        BackendCapability::NativeFullText
    }

    async fn text_search(&self, kind: ResultType, terms: &[String]) -> SearchResult<Vec<TextMatch>> {
        let mut tokens: Vec<String> = terms.iter().flat_map(|t| tokenize(t)).collect();
        tokens.sort();
        tokens.dedup();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.build_query(kind, &tokens);
        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(searcher.num_docs().max(1) as usize))
            .map_err(|e| SearchError::BackendExecutionFailure(format!("Index search failed: {}", e)))?;

        let mut matches = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            let id = doc
                .get_first(self.fields.entity_id)
                .and_then(|value| value.as_u64())
                .ok_or_else(|| {
                    SearchError::BackendExecutionFailure("Indexed document without entity id".to_string())
                })?;
            matches.push(TextMatch {
                id,
                rank: f64::from(score),
            });
        }

        tracing::trace!(kind = %kind, matches = matches.len(), "Full-text search finished");
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Thread};
    use crate::state::InMemoryForumStore;
    use chrono::Utc;

    fn thread(id: u64, title: &str) -> Thread {
        Thread {
            id,
            subcategory_id: 1,
            author_id: 1,
            title: title.into(),
            slug: format!("t-{}", id),
            is_pinned: false,
            is_locked: false,
            view_count: 0,
            post_count: 0,
            created_at: Utc::now(),
        }
    }

    async fn strategy() -> NativeFullTextStrategy {
        let store = InMemoryForumStore::new();
        store.insert_thread(thread(1, "Python Basics"));
        store.insert_thread(thread(2, "Python python everywhere"));
        store.insert_thread(thread(3, "Rust Ownership"));
        store.insert_category(Category {
            id: 1,
            name: "Python".into(),
            slug: "python".into(),
            description: String::new(),
        });

        NativeFullTextStrategy::new(Arc::new(store), &SearchConfig::default())
            .await
            .unwrap()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("C++/Rust"), vec!["c", "rust"]);
        assert!(tokenize("!!").is_empty());
    }

    #[tokio::test]
    async fn test_index_is_built() {
        let strategy = strategy().await;
        let stats = strategy.stats().unwrap();
        assert_eq!(stats.total_documents, 4);
        assert_eq!(strategy.capability(), BackendCapability::NativeFullText);
    }

    #[tokio::test]
    async fn test_search_is_scoped_to_kind() {
        let strategy = strategy().await;
        let matches = strategy
            .text_search(ResultType::Thread, &["python".to_string()])
            .await
            .unwrap();

        let mut ids: Vec<u64> = matches.iter().map(|m| m.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
        assert!(matches.iter().all(|m| m.rank > 0.0));
    }

    #[tokio::test]
    async fn test_any_term_matches() {
        let strategy = strategy().await;
        let matches = strategy
            .text_search(ResultType::Thread, &["rust".to_string(), "golang".to_string()])
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, 3);
    }

    #[tokio::test]
    async fn test_punctuation_only_terms_match_nothing() {
        let strategy = strategy().await;
        let matches = strategy
            .text_search(ResultType::Thread, &["??".to_string()])
            .await
            .unwrap();
        assert!(matches.is_empty());
    }
}
