#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use intake_cloud::api::create_router;
use intake_cloud::config::Config;
use intake_cloud::email::{EmailProvider, OutgoingEmail, ProviderError};
use intake_cloud::state::{AppState, MemoryBackend};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const BOUNDARY: &str = "intake-test-boundary";

/// Email provider that records instead of sending
#[derive(Default)]
pub struct RecordingProvider {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingProvider {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailProvider for RecordingProvider {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), ProviderError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub backend: MemoryBackend,
    pub emails: Arc<RecordingProvider>,
}

/// Router over the in-memory backend with a recording email provider
pub fn spawn_app() -> TestApp {
    let emails = Arc::new(RecordingProvider::default());
    build(Some(emails.clone() as Arc<dyn EmailProvider>), emails)
}

/// Same, but with no email credential configured
pub fn spawn_app_without_email() -> TestApp {
    build(None, Arc::new(RecordingProvider::default()))
}

/// Same, with a custom email provider (nothing is recorded)
pub fn spawn_app_with_provider(provider: Arc<dyn EmailProvider>) -> TestApp {
    build(Some(provider), Arc::new(RecordingProvider::default()))
}

/// Provider that refuses every message with a fixed status and body
pub struct RejectingProvider {
    pub status: u16,
    pub body: String,
}

#[async_trait]
impl EmailProvider for RejectingProvider {
    async fn send(&self, _email: &OutgoingEmail) -> Result<(), ProviderError> {
        Err(ProviderError::Rejected {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

fn build(provider: Option<Arc<dyn EmailProvider>>, emails: Arc<RecordingProvider>) -> TestApp {
    let config = Config::for_memory("test-secret");
    let (state, backend) = AppState::memory_with_provider(&config, provider);
    TestApp {
        router: create_router(state.clone()),
        state,
        backend,
        emails,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, body)
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_multipart(&self, uri: &str, token: &str, body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Sign up and log in; returns (token, user id)
    pub async fn account(&self, email: &str, role: &str) -> (String, String) {
        let credentials = json!({ "email": email, "password": "correct-horse", "role": role });
        let (status, _) = self.post_json("/api/auth/signup", None, credentials.clone()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = self.post_json("/api/auth/login", None, credentials).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Submit a complete application as `token`; returns the created row
    pub async fn submit(&self, token: &str, email: &str) -> Value {
        self.submit_with_picture(token, email, &png_bytes(32, 32)).await
    }

    pub async fn submit_with_picture(&self, token: &str, email: &str, picture: &[u8]) -> Value {
        let body = MultipartBuilder::new()
            .applicant(email)
            .file("profile_picture", "me.png", picture)
            .file("source_code", "code.zip", &zip_bytes())
            .finish();
        let (status, body) = self.post_multipart("/api/submissions", token, body).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["submission"].clone()
    }
}

pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        write!(
            self.body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .unwrap();
        self
    }

    pub fn file(mut self, name: &str, filename: &str, data: &[u8]) -> Self {
        write!(
            self.body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .unwrap();
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// All five applicant text fields
    pub fn applicant(self, email: &str) -> Self {
        self.text("full_name", "Ada Lovelace")
            .text("phone_number", "555-0100")
            .text("location", "London")
            .text("email", email)
            .text("hobbies", "chess, engines")
    }

    pub fn finish(mut self) -> Vec<u8> {
        write!(self.body, "--{BOUNDARY}--\r\n").unwrap();
        self.body
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::ImageBuffer::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128u8])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn zip_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buf);
        writer
            .start_file("src/main.rs", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"fn main() {}").unwrap();
        writer.finish().unwrap();
    }
    buf.into_inner()
}
