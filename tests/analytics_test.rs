//! Search analytics: recording, click feedback and period summaries

mod common;

use chrono::Duration;
use common::TestHarness;
use forum_search::{
    analytics::{AnalyticsConfig, AnalyticsError, ClickFeedback, RequestContext},
    models::ResultType,
    search::{BackendKind, ContentType, SearchRequest},
};
use tokio_test::{assert_err, assert_ok};

fn session(id: &str, user_id: Option<u64>) -> RequestContext {
    RequestContext {
        session_id: id.to_string(),
        user_id,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_summary_over_recorded_searches() {
    let harness = TestHarness::portable().await;
    let threads = SearchRequest::new("python").with_content_type("threads");

    let first = harness.service.search(&threads, session("a", Some(1))).await.unwrap();
    harness.clock.advance(Duration::seconds(1));
    harness.service.search(&threads, session("a", Some(1))).await.unwrap();
    harness.clock.advance(Duration::seconds(1));
    harness
        .service
        .search(&SearchRequest::new("zzzz"), session("b", None))
        .await
        .unwrap();

    harness
        .analytics
        .record_click(
            first.search_id,
            ClickFeedback {
                position: 1,
                result_type: ResultType::Thread,
                time_to_click_ms: Some(1800),
            },
        )
        .await
        .unwrap();

    let summary = harness.analytics.summary(7).await.unwrap();
    assert_eq!(summary.period_days, 7);
    assert_eq!(summary.metrics.total_searches, 3);
    assert_eq!(summary.metrics.unique_users, 1);
    assert_eq!(summary.metrics.unique_sessions, 2);
    assert_eq!(summary.metrics.click_through_rate, 33.33);
    assert_eq!(summary.metrics.zero_result_rate, 33.33);
    assert_eq!(summary.metrics.performance.avg_results_count, 2.0);

    assert_eq!(summary.top_queries[0].normalized_query, "python");
    assert_eq!(summary.top_queries[0].search_count, 2);
    assert_eq!(summary.top_queries[0].avg_results, 3.0);

    let threads_count = summary
        .content_type_distribution
        .iter()
        .find(|c| c.content_type == ContentType::Threads)
        .unwrap();
    assert_eq!(threads_count.search_count, 2);
}

#[tokio::test]
async fn test_cache_hit_is_marked_in_analytics() {
    let harness = TestHarness::portable().await;
    let request = SearchRequest::new("python");

    let miss = harness.service.search(&request, RequestContext::default()).await.unwrap();
    let hit = harness.service.search(&request, RequestContext::default()).await.unwrap();

    let miss_record = harness.analytics.get(miss.search_id).await.unwrap().unwrap();
    let hit_record = harness.analytics.get(hit.search_id).await.unwrap().unwrap();
    assert!(!miss_record.cache_hit);
    assert!(hit_record.cache_hit);
    assert_eq!(hit_record.results_count, miss_record.results_count);
    assert_eq!(hit_record.search_time_ms, miss_record.search_time_ms);
}

#[tokio::test]
async fn test_filters_are_recorded() {
    let harness = TestHarness::portable().await;
    let response = harness
        .service
        .search(
            &SearchRequest::new("water")
                .with_category("gardening")
                .with_author("tom"),
            RequestContext::default(),
        )
        .await
        .unwrap();

    let record = harness.analytics.get(response.search_id).await.unwrap().unwrap();
    assert_eq!(record.filters_used.get("category").map(String::as_str), Some("gardening"));
    assert_eq!(record.filters_used.get("author").map(String::as_str), Some("tom"));
    assert!(!record.filters_used.contains_key("date_from"));
}

#[tokio::test]
async fn test_summary_excludes_old_records() {
    let harness = TestHarness::portable().await;
    harness
        .service
        .search(&SearchRequest::new("python"), RequestContext::default())
        .await
        .unwrap();

    harness.clock.advance(Duration::days(8));
    let recent = harness.analytics.summary(7).await.unwrap();
    assert_eq!(recent.metrics.total_searches, 0);
    assert_eq!(recent.metrics.click_through_rate, 0.0);
    assert!(recent.top_queries.is_empty());

    let month = harness.analytics.summary(30).await.unwrap();
    assert_eq!(month.metrics.total_searches, 1);
}

#[tokio::test]
async fn test_summary_period_bounds() {
    let harness = TestHarness::portable().await;
    assert!(matches!(
        harness.analytics.summary(0).await,
        Err(AnalyticsError::InvalidPeriod(0))
    ));
    assert!(matches!(
        harness.analytics.summary(366).await,
        Err(AnalyticsError::InvalidPeriod(366))
    ));
    assert_ok!(harness.analytics.summary(365).await);
    assert_err!(harness.analytics.summary(-7).await);
}

#[tokio::test]
async fn test_click_on_unknown_search() {
    let harness = TestHarness::portable().await;
    let result = harness
        .analytics
        .record_click(
            uuid::Uuid::new_v4(),
            ClickFeedback {
                position: 1,
                result_type: ResultType::Post,
                time_to_click_ms: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AnalyticsError::RecordNotFound(_))));
}

#[tokio::test]
async fn test_default_config_records_after_search_returns() {
    let harness = TestHarness::with_analytics(BackendKind::Portable, AnalyticsConfig::default()).await;
    let response = harness
        .service
        .search(&SearchRequest::new("python"), RequestContext::default())
        .await
        .unwrap();

    let mut record = None;
    for _ in 0..50 {
        record = harness.analytics.get(response.search_id).await.unwrap();
        if record.is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let record = record.expect("spawned write should land");
    assert_eq!(record.normalized_query, "python");
    assert_eq!(record.results_count, response.total_results);
}
