#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use image::{ImageFormat, RgbImage};
use sketchmap_api::config::ServerConfig;
use sketchmap_api::router::build_app_router;
use sketchmap_api::state::AppState;
use sketchmap_core::job_kind::JobKind;
use sketchmap_core::memory::{MemoryBlobStore, MemoryRegistry};
use sketchmap_core::upload::UploadLimits;
use sketchmap_pipeline::runtime::{LocalRuntime, WorkerContext};
use sketchmap_pipeline::{Admission, Dispatcher, JobPayload, Resolver};
use tower::ServiceExt;

pub const BOUNDARY: &str = "sketchmap-test-boundary";

/// Result bytes of the sketch map task.
pub const SKETCH_MAP_PDF: &[u8] = b"%PDF-1.7 sketch";

/// Failure cause of the quality report task.
pub const QUALITY_REPORT_ERROR: &str = "no map data for the area";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 10 * 1024 * 1024,
    }
}

/// Runtime whose tasks finish immediately, except vector extraction, which
/// stays pending for the duration of a test.
fn test_runtime(blobs: Arc<MemoryBlobStore>) -> LocalRuntime {
    LocalRuntime::new(WorkerContext::new(blobs))
        .with_task(
            JobKind::SketchMap,
            |_ctx: Arc<WorkerContext>, _payload: JobPayload| async move {
                Ok::<_, String>(SKETCH_MAP_PDF.to_vec())
            },
        )
        .with_task(
            JobKind::QualityReport,
            |_ctx: Arc<WorkerContext>, _payload: JobPayload| async move {
                Err::<Vec<u8>, _>(QUALITY_REPORT_ERROR.to_string())
            },
        )
        .with_task(
            JobKind::RasterResults,
            |ctx: Arc<WorkerContext>, payload: JobPayload| async move {
                let uploads = ctx.load_blobs(&payload.blob_ids).await.map_err(|e| e.to_string())?;
                let names: Vec<String> = uploads.into_iter().map(|b| b.file_name).collect();
                Ok::<Vec<u8>, String>(names.join(",").into_bytes())
            },
        )
        .with_task(
            JobKind::VectorResults,
            |_ctx: Arc<WorkerContext>, _payload: JobPayload| async move {
                tokio::time::sleep(Duration::from_secs(600)).await;
                Ok::<_, String>(Vec::new())
            },
        )
}

pub struct TestApp {
    pub router: Router,
    pub registry: Arc<MemoryRegistry>,
    pub blobs: Arc<MemoryBlobStore>,
}

/// Build the full application router with in-memory storage and the
/// in-process runtime.
pub fn build_test_app(limits: UploadLimits) -> TestApp {
    let config = test_config();
    let registry = Arc::new(MemoryRegistry::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let dispatcher = Dispatcher::new(Arc::new(test_runtime(blobs.clone())));

    let state = AppState {
        registry: registry.clone(),
        admission: Arc::new(Admission::new(
            registry.clone(),
            blobs.clone(),
            dispatcher.clone(),
            limits,
        )),
        resolver: Resolver::new(registry.clone(), dispatcher),
    };

    TestApp {
        router: build_app_router(state, &config).unwrap(),
        registry,
        blobs,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// One part of a multipart body.
pub enum Part<'a> {
    Text { name: &'a str, value: &'a str },
    File { name: &'a str, file_name: &'a str, content: &'a [u8] },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: &Router, uri: &str, parts: &[Part<'_>]) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}
