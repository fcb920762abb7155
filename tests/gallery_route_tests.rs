use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

use vesta::auth::{PasswordHasher, TokenIssuer};
use vesta::config::{AuthConfig, UploadConfig};
use vesta::mail::Mailer;
use vesta::server::router::{AppState, cms_router};
use vesta::storage::FileStore;

const BOUNDARY: &str = "X-VESTA-TEST-BOUNDARY";

async fn test_app(tag: &str) -> (Router, PathBuf, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!("vesta-{tag}-{pid}-{nanos}.sqlite"));
    let database_url = format!("sqlite:{}", db_path.display());
    let db = vesta::db::spawn(&database_url).await;

    let mut upload_dir = std::env::temp_dir();
    upload_dir.push(format!("vesta-{tag}-uploads-{pid}-{nanos}"));
    let upload_cfg = UploadConfig {
        dir: upload_dir.clone(),
        ..UploadConfig::default()
    };
    let store = Arc::new(
        FileStore::new(&upload_cfg)
            .await
            .expect("failed to build store"),
    );

    let passwords = PasswordHasher::new();
    let tokens = TokenIssuer::new("integration-test-secret-0123456789".to_string(), 24);
    vesta::bootstrap::ensure_admin(&db, &passwords, &AuthConfig::default())
        .await
        .expect("bootstrap failed");

    let state = AppState::new(db, store, tokens, passwords, Mailer::disabled());
    (cms_router(state), db_path, upload_dir)
}

async fn admin_token(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"username":"admin","password":"admin123"}"#,
                ))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let auth: serde_json::Value = serde_json::from_slice(&body).unwrap();
    auth["token"].as_str().unwrap().to_string()
}

fn multipart_body(data_json: &str, file: Option<(&str, &str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"data\"\r\n\r\n{data_json}\r\n"
        )
        .as_bytes(),
    );
    if let Some((field, filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Vec<u8>>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(bytes) => builder
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(bytes)),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    let resp = app.clone().oneshot(request).await.expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

fn stored_path(upload_dir: &Path, public_url: &str) -> PathBuf {
    upload_dir.join(public_url.trim_start_matches("/uploads/"))
}

#[tokio::test]
async fn gallery_crud_flow() {
    let (app, db_path, upload_dir) = test_app("gallery").await;
    let token = admin_token(&app).await;

    // 1) Creating without an image fails validation.
    let create = multipart_body(r#"{"title":"CNC Turning","category":"Turning"}"#, None);
    let (status, error) = send(&app, "POST", "/api/gallery", Some(&token), Some(create)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "VALIDATION_FAILED");

    // 2) A valid JPEG under the cap creates the item; the thumbnail mirrors
    //    the image reference.
    let jpeg: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIFfake";
    let create = multipart_body(
        r#"{"title":"CNC Turning","category":"Turning"}"#,
        Some(("image", "lathe.jpg", "image/jpeg", jpeg)),
    );
    let (status, created) = send(&app, "POST", "/api/gallery", Some(&token), Some(create)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].as_str().is_some());
    let id = created["id"].as_str().unwrap().to_string();
    let image_url = created["imageUrl"].as_str().unwrap().to_string();
    assert!(image_url.contains("gallery/"));
    assert_eq!(created["thumbnailUrl"], created["imageUrl"]);
    assert_eq!(created["displayOrder"], 0);

    let image_path = stored_path(&upload_dir, &image_url);
    assert_eq!(tokio::fs::read(&image_path).await.unwrap(), jpeg);

    // 3) Public list and category filter.
    let (status, listed) = send(&app, "GET", "/api/gallery?category=Turning", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, listed) = send(&app, "GET", "/api/gallery?category=Milling", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 0);

    // 4) Partial update keeps the image; replacing it swaps files and
    //    re-points the thumbnail.
    let update = multipart_body(r#"{"description":"Precision lathe work"}"#, None);
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/gallery/{id}"),
        Some(&token),
        Some(update),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "Precision lathe work");
    assert_eq!(updated["imageUrl"], image_url);
    assert_eq!(updated["title"], "CNC Turning");

    let replacement: &[u8] = b"\xff\xd8\xff\xe0replacement";
    let update = multipart_body(
        r#"{}"#,
        Some(("image", "lathe2.jpg", "image/jpeg", replacement)),
    );
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/gallery/{id}"),
        Some(&token),
        Some(update),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_image_url = updated["imageUrl"].as_str().unwrap().to_string();
    assert_ne!(new_image_url, image_url);
    assert_eq!(updated["thumbnailUrl"], updated["imageUrl"]);
    assert!(!tokio::fs::try_exists(&image_path).await.unwrap());

    // 5) Delete: thumbnail == image, so the single backing file is removed
    //    exactly once and the delete still succeeds.
    let new_image_path = stored_path(&upload_dir, &new_image_url);
    assert!(tokio::fs::try_exists(&new_image_path).await.unwrap());

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/gallery/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!tokio::fs::try_exists(&new_image_path).await.unwrap());

    let (status, _) = send(&app, "GET", &format!("/api/gallery/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 6) Writes stay admin-only.
    let create = multipart_body(
        r#"{"title":"Sneaky"}"#,
        Some(("image", "x.jpg", "image/jpeg", b"bytes")),
    );
    let (status, _) = send(&app, "POST", "/api/gallery", None, Some(create)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let _ = tokio::fs::remove_dir_all(&upload_dir).await;
    let _ = tokio::fs::remove_file(format!("{}-wal", db_path.to_string_lossy())).await;
    let _ = tokio::fs::remove_file(format!("{}-shm", db_path.to_string_lossy())).await;
    let _ = tokio::fs::remove_file(&db_path).await;
}
