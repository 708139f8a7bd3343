use std::sync::Arc;
use std::time::{Duration, Instant};

use pixpress_engine::{
    CompressError, CompressSettings, CompressedImage, CompressedPayload, Compressor, EngineEvent,
    EngineHandle, FailureKind, ImageFile, ProgressSink, RequestId,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Never answers; only cancellation ends its requests.
struct HangingCompressor;

#[async_trait::async_trait]
impl Compressor for HangingCompressor {
    async fn compress(
        &self,
        _request_id: RequestId,
        _file: &ImageFile,
        _sink: &dyn ProgressSink,
    ) -> Result<CompressedPayload, CompressError> {
        std::future::pending().await
    }
}

fn image_on_disk(dir: &TempDir, name: &str) -> ImageFile {
    let path = dir.path().join(name);
    std::fs::write(&path, b"original").unwrap();
    ImageFile::from_path(&path).unwrap()
}

fn wait_completed(engine: &EngineHandle) -> (RequestId, Result<CompressedImage, CompressError>) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(EngineEvent::Completed { request_id, result }) =
            engine.recv_timeout(Duration::from_millis(50)).unwrap()
        {
            return (request_id, result);
        }
    }
    panic!("engine did not complete in time");
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_request_lands_in_blob_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/compress"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0xFF, 0xD8, 0xFF], "image/jpeg"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = image_on_disk(&dir, "cat.png");
    let settings = CompressSettings {
        endpoint: format!("{}/compress", server.uri()),
        ..CompressSettings::default()
    };

    let (request_id, image, bytes) = tokio::task::spawn_blocking(move || {
        let engine = EngineHandle::new(settings).unwrap();
        engine.submit(9, file);
        let (request_id, result) = wait_completed(&engine);
        let image = result.expect("compressed");
        let bytes = engine.blobs().get(image.handle).expect("blob present");
        (request_id, image, bytes)
    })
    .await
    .unwrap();

    assert_eq!(request_id, 9);
    assert_eq!(bytes.as_ref(), &[0xFF, 0xD8, 0xFF]);
    assert_eq!(image.byte_len, 3);
    assert_eq!(image.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(image.handle.url(), "blob:pixpress/1");
}

#[test]
fn cancel_completes_request_as_cancelled() {
    let dir = TempDir::new().unwrap();
    let engine = EngineHandle::with_compressor(Arc::new(HangingCompressor)).unwrap();

    engine.submit(1, image_on_disk(&dir, "a.jpg"));
    assert!(engine.cancel(1));
    assert!(!engine.cancel(1));

    let (request_id, result) = wait_completed(&engine);
    assert_eq!(request_id, 1);
    assert_eq!(result.unwrap_err().kind, FailureKind::Cancelled);
    assert!(engine.blobs().is_empty());
}

#[test]
fn cancelling_unknown_request_is_false() {
    let engine = EngineHandle::with_compressor(Arc::new(HangingCompressor)).unwrap();
    assert!(!engine.cancel(42));
    assert!(engine.try_recv().is_none());
}

#[test]
fn connection_refused_completes_with_network_failure() {
    let dir = TempDir::new().unwrap();
    let settings = CompressSettings {
        endpoint: "http://127.0.0.1:1/compress".to_string(),
        ..CompressSettings::default()
    };
    let engine = EngineHandle::new(settings).unwrap();

    engine.submit(3, image_on_disk(&dir, "a.jpg"));

    let (request_id, result) = wait_completed(&engine);
    assert_eq!(request_id, 3);
    assert_eq!(result.unwrap_err().kind, FailureKind::Network);
}
