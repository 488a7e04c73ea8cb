//! Tests for the pipeline driver

use super::*;
use sift_stage::StageResult;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

fn subscribed(events: serde_json::Value) -> Pipeline {
    Pipeline::builder()
        .filter(FilterConfig::from_json(&events).unwrap())
        .build()
}

#[tokio::test]
async fn test_end_to_end_single_chunk() {
    let (tx, rx) = mpsc::channel(1);
    let mut handle = subscribed(serde_json::json!({"request": "*"})).spawn(rx);

    tx.send(EventRecord::builder("request").field("id", 1).build())
        .await
        .unwrap();
    tx.send(EventRecord::builder("ops").field("id", 2).build())
        .await
        .unwrap();
    drop(tx);

    let mut chunks = Vec::new();
    while let Some(chunk) = handle.recv().await {
        chunks.push(chunk);
    }

    // Only the subscribed record makes it through, as exactly one chunk
    assert_eq!(chunks, vec!["{\"event\":\"request\",\"id\":1}\n".to_string()]);

    let snapshot = handle.join().await;
    assert_eq!(snapshot.records_received, 2);
    assert_eq!(snapshot.records_forwarded, 1);
    assert_eq!(snapshot.records_dropped, 1);
    assert_eq!(snapshot.chunks_emitted, 1);
}

#[tokio::test]
async fn test_output_preserves_input_order() {
    let (tx, rx) = mpsc::channel(1);
    let mut handle = subscribed(serde_json::json!({"log": "*"})).spawn(rx);

    let producer = tokio::spawn(async move {
        for i in 0..100i64 {
            tx.send(EventRecord::builder("log").field("seq", i).build())
                .await
                .unwrap();
        }
    });

    let mut chunks = Vec::new();
    while let Some(chunk) = handle.recv().await {
        chunks.push(chunk);
    }
    producer.await.unwrap();

    // Lossless and in order: every record arrives, in the order it was sent
    assert_eq!(chunks.len(), 100);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk, &format!("{{\"event\":\"log\",\"seq\":{}}}\n", i));
    }
}

#[tokio::test]
async fn test_backpressure_stalls_producer_until_consumed() {
    let (tx, rx) = mpsc::channel(1);
    let mut handle = subscribed(serde_json::json!({"log": "*"})).spawn(rx);

    let mut producer = tokio::spawn(async move {
        for i in 0..10i64 {
            tx.send(EventRecord::builder("log").field("id", i).build())
                .await
                .unwrap();
        }
    });

    // Every hop holds at most one record, so with nothing consuming the
    // output the producer cannot run ahead
    let stalled = tokio::time::timeout(Duration::from_millis(100), &mut producer).await;
    assert!(stalled.is_err(), "producer should stall until chunks are consumed");

    let mut chunks = Vec::new();
    for _ in 0..10 {
        chunks.push(handle.recv().await.unwrap());
    }
    producer.await.unwrap();
    assert!(handle.recv().await.is_none());
    assert_eq!(chunks.len(), 10);
}

#[tokio::test]
async fn test_stream_stays_open_between_records() {
    let (tx, rx) = mpsc::channel(1);
    let mut handle = subscribed(serde_json::json!({"request": "*"})).spawn(rx);

    tx.send(EventRecord::builder("request").field("id", 1).build())
        .await
        .unwrap();
    assert_eq!(handle.recv().await.unwrap(), "{\"event\":\"request\",\"id\":1}\n");

    // A dropped record does not end the stream
    tx.send(EventRecord::builder("ops").field("id", 2).build())
        .await
        .unwrap();

    tx.send(EventRecord::builder("request").field("id", 3).build())
        .await
        .unwrap();
    assert_eq!(handle.recv().await.unwrap(), "{\"event\":\"request\",\"id\":3}\n");

    drop(tx);
    assert!(handle.recv().await.is_none());
}

#[tokio::test]
async fn test_custom_render_config() {
    let (tx, rx) = mpsc::channel(1);
    let mut handle = Pipeline::builder()
        .filter(FilterConfig::from_json(&serde_json::json!({"log": "*"})).unwrap())
        .render(RenderConfig::new().with_separator("#"))
        .build()
        .spawn(rx);

    tx.send(EventRecord::builder("log").field("a", 1).build())
        .await
        .unwrap();
    tx.send(EventRecord::builder("log").field("b", 2).build())
        .await
        .unwrap();
    drop(tx);

    let mut out = String::new();
    while let Some(chunk) = handle.recv().await {
        out += &chunk;
    }
    assert_eq!(out, "{\"event\":\"log\",\"a\":1}#{\"event\":\"log\",\"b\":2}#");
}

#[tokio::test]
async fn test_empty_chain_forwards_everything() {
    let (tx, rx) = mpsc::channel(1);
    let mut handle = Pipeline::builder().build().spawn(rx);

    tx.send(EventRecord::builder("anything").build()).await.unwrap();
    drop(tx);

    assert_eq!(handle.recv().await.unwrap(), "{\"event\":\"anything\"}\n");
    assert!(handle.recv().await.is_none());
}

#[tokio::test]
async fn test_from_stage_configs() {
    let registry = StageRegistry::builtin();

    let mut config = StageConfig::new();
    let events: toml::Value = toml::from_str(r#"request = "*""#).unwrap();
    config.insert("events".to_string(), events);

    let pipeline = Pipeline::from_stage_configs(
        &[("filter".to_string(), config)],
        &registry,
        RenderConfig::default(),
    )
    .unwrap();

    let (tx, rx) = mpsc::channel(1);
    let mut handle = pipeline.spawn(rx);

    tx.send(EventRecord::builder("request").field("id", 1).build())
        .await
        .unwrap();
    drop(tx);

    assert_eq!(handle.recv().await.unwrap(), "{\"event\":\"request\",\"id\":1}\n");
}

#[tokio::test]
async fn test_from_stage_configs_rejects_bad_rules() {
    let registry = StageRegistry::builtin();

    let mut config = StageConfig::new();
    config.insert("events".to_string(), toml::Value::Integer(1));

    let err = Pipeline::from_stage_configs(
        &[("filter".to_string(), config)],
        &registry,
        RenderConfig::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("events must be an object"));
}

#[tokio::test]
async fn test_from_stage_configs_rejects_unknown_type() {
    let registry = StageRegistry::builtin();
    let err = Pipeline::from_stage_configs(
        &[("frobnicate".to_string(), StageConfig::new())],
        &registry,
        RenderConfig::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("no stage type named 'frobnicate'"));
}

#[tokio::test]
async fn test_metrics_handle_outlives_spawn() {
    let pipeline = subscribed(serde_json::json!({"log": "*"}));
    let metrics = pipeline.metrics_handle();

    let (tx, rx) = mpsc::channel(1);
    let mut handle = pipeline.spawn(rx);

    tx.send(EventRecord::builder("log").build()).await.unwrap();
    drop(tx);
    while handle.recv().await.is_some() {}
    handle.join().await;

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.records_received, 1);
    assert_eq!(snapshot.chunks_emitted, 1);
}

/// A stage that always errors, for exercising the drop-on-error path
struct FailingStage;

impl Stage for FailingStage {
    fn apply<'a>(
        &'a self,
        _record: EventRecord,
    ) -> Pin<Box<dyn Future<Output = StageResult<Option<EventRecord>>> + Send + 'a>> {
        Box::pin(async move { Err(sift_stage::StageError::config("broken stage")) })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[tokio::test]
async fn test_stage_error_drops_record_without_ending_stream() {
    let (tx, rx) = mpsc::channel(1);
    let mut handle = Pipeline::builder()
        .stage(Box::new(FailingStage))
        .build()
        .spawn(rx);

    tx.send(EventRecord::builder("log").field("id", 1).build())
        .await
        .unwrap();
    tx.send(EventRecord::builder("log").field("id", 2).build())
        .await
        .unwrap();
    drop(tx);

    // Both records dropped, stream ends only on input closure
    assert!(handle.recv().await.is_none());

    let snapshot = handle.join().await;
    assert_eq!(snapshot.records_received, 2);
    assert_eq!(snapshot.records_dropped, 2);
    assert_eq!(snapshot.chunks_emitted, 0);
}
