//! Fixtures shared by the route and state tests.

#![allow(clippy::unwrap_used)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::FromRequest;
use axum::http::{Request, header};
use axum::response::Response;
use axum_extra::extract::Multipart;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use pdf_assembler_core::{AppConfig, InputFile, PipelineKind, RunState};

use crate::state::AppState;

const BOUNDARY: &str = "pdf-assembler-test-boundary";

pub fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(&AppConfig::default()).unwrap())
}

pub fn png_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(8, 6, Rgb([200, 40, 40])));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn png(name: &str) -> InputFile {
    InputFile::new(name, "image/png", png_bytes())
}

/// Create a session whose `kind` batch already holds `files`.
pub async fn session_with(state: &AppState, kind: PipelineKind, files: Vec<InputFile>) -> String {
    let id = state.create_session().await;
    state
        .get_session(&id)
        .await
        .unwrap()
        .with_session_mut(|s| s.workspace.pipeline_mut(kind).add(files).unwrap())
        .await
        .unwrap();
    id
}

/// Wait until the `kind` pipeline of session `id` leaves `Running`.
pub async fn wait_for_run(state: &AppState, id: &str, kind: PipelineKind) -> RunState {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let run_state = state
                .get_session(id)
                .await
                .unwrap()
                .with_session(|s| s.workspace.pipeline(kind).state())
                .await
                .unwrap();
            if run_state != RunState::Running {
                return run_state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap()
}

/// One multipart part: field name, file name, content type and contents.
pub type Part<'a> = (&'a str, &'a str, &'a str, &'a [u8]);

/// Build the `Multipart` extractor a browser upload would produce.
pub async fn multipart(parts: &[Part<'_>]) -> Multipart {
    let mut body = Vec::new();
    for (field, file_name, content_type, data) in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
                 filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap();
    Multipart::from_request(request, &()).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}
