//! Tests against a live Redis. Run with:
//!
//! ```bash
//! REDIS_URL=redis://127.0.0.1:6379/15 cargo test --test repository_redis -- --ignored
//! ```

use chrono::TimeDelta;
use shortener_service::domain::entities::UrlRecord;
use shortener_service::domain::repositories::{StoreError, UrlRepository};
use shortener_service::domain::url_event::UrlEvent;
use shortener_service::infrastructure::events::{
    EventPublisher, RedisStreamPublisher, RequiredAcks, StreamPublisherConfig,
};
use shortener_service::infrastructure::persistence::RedisUrlRepository;
use shortener_service::utils::code_generator::generate_code;
use std::time::Duration;

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/15".to_string())
}

async fn repository() -> RedisUrlRepository {
    RedisUrlRepository::connect(&redis_url(), 2, "test:url:")
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_save_get_delete() {
    let repo = repository().await;
    let code = generate_code("https://example.com");
    let record = UrlRecord::with_code(code.clone(), "https://example.com");

    repo.save(&record, TimeDelta::minutes(1)).await.unwrap();
    assert_eq!(repo.get(&code).await.unwrap(), record);

    repo.delete(&code).await.unwrap();
    assert_eq!(repo.get(&code).await, Err(StoreError::NotFound));

    // Deleting again is still a success
    repo.delete(&code).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_ttl_expires_record() {
    let repo = repository().await;
    let code = generate_code("https://example.com/short-lived");
    let record = UrlRecord::with_code(code.clone(), "https://example.com/short-lived");

    repo.save(&record, TimeDelta::milliseconds(100)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;

    assert_eq!(repo.get(&code).await, Err(StoreError::NotFound));
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_zero_ttl_never_expires() {
    let repo = repository().await;
    let code = generate_code("https://example.com/forever");
    let record = UrlRecord::with_code(code.clone(), "https://example.com/forever");

    repo.save(&record, TimeDelta::zero()).await.unwrap();
    assert!(repo.get(&code).await.is_ok());

    repo.delete(&code).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_negative_ttl_is_rejected_by_backend() {
    let repo = repository().await;
    let record = UrlRecord::with_code(generate_code("https://example.com"), "https://example.com");

    let result = repo.save(&record, TimeDelta::seconds(-5)).await;

    assert!(matches!(result, Err(StoreError::Backend(_))));
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_empty_key_rejected() {
    let repo = repository().await;

    assert!(matches!(
        repo.get("").await,
        Err(StoreError::Validation(_))
    ));
    assert!(matches!(
        repo.delete("").await,
        Err(StoreError::Validation(_))
    ));
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_stream_publisher_appends_events() {
    let topic = format!("test_url_events_{}", generate_code("topic"));
    let publisher = RedisStreamPublisher::connect(
        &redis_url(),
        StreamPublisherConfig {
            topic: topic.clone(),
            write_timeout: Duration::from_secs(1),
            required_acks: RequiredAcks::Leader,
            batch_bytes: 1024,
            max_attempts: 2,
            max_len: None,
        },
    )
    .await
    .unwrap();

    assert!(publisher.health_check().await);
    publisher
        .publish_batch(&[
            UrlEvent::created("abc12345", "https://example.com"),
            UrlEvent::deleted("abc12345"),
        ])
        .await
        .unwrap();

    let client = redis::Client::open(redis_url()).unwrap();
    let mut conn = redis::aio::ConnectionManager::new(client).await.unwrap();
    let len: usize = redis::cmd("XLEN")
        .arg(&topic)
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(len, 2);

    let _: () = redis::cmd("DEL")
        .arg(&topic)
        .query_async(&mut conn)
        .await
        .unwrap();
}
