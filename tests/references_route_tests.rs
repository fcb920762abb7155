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
async fn reference_crud_flow() {
    let (app, db_path, upload_dir) = test_app("references").await;
    let token = admin_token(&app).await;

    // 1) Empty list to start.
    let (status, body) = send(&app, "GET", "/api/references", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));

    // 2) Create with a logo upload.
    let logo_bytes: &[u8] = b"\x89PNG\r\n\x1a\nfake-logo-bytes";
    let create = multipart_body(
        r#"{"name":"Alpha Machining","websiteUrl":"https://alpha.example.com","industry":"Automotive","description":"Precision parts","displayOrder":1}"#,
        Some(("logo", "brand logo.png", "image/png", logo_bytes)),
    );
    let (status, created) = send(&app, "POST", "/api/references", Some(&token), Some(create)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Alpha Machining");
    assert_eq!(created["displayOrder"], 1);
    let id = created["id"].as_str().expect("id missing").to_string();
    let logo_url = created["logoUrl"].as_str().expect("logoUrl missing").to_string();
    assert!(logo_url.starts_with("/uploads/logos/"));
    assert!(!logo_url.contains("brand logo"));

    let logo_path = stored_path(&upload_dir, &logo_url);
    assert_eq!(
        tokio::fs::read(&logo_path).await.expect("logo not stored"),
        logo_bytes
    );

    // 3) Fetch by id; unknown ids are 404.
    let (status, fetched) =
        send(&app, "GET", &format!("/api/references/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["description"], "Precision parts");

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/references/{}", uuid::Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 4) A second reference sorts ahead via its lower display order.
    let create = multipart_body(r#"{"name":"Beta Robotics","displayOrder":0}"#, None);
    let (status, _) = send(&app, "POST", "/api/references", Some(&token), Some(create)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, listed) = send(&app, "GET", "/api/references", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Beta Robotics", "Alpha Machining"]);

    // 5) Industry filter.
    let (status, filtered) =
        send(&app, "GET", "/api/references?industry=Automotive", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered.as_array().unwrap().len(), 1);

    // 6) Partial update: omitted fields stay untouched.
    let update = multipart_body(r#"{"industry":"Aerospace"}"#, None);
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/references/{id}"),
        Some(&token),
        Some(update),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["industry"], "Aerospace");
    assert_eq!(updated["name"], "Alpha Machining");
    assert_eq!(updated["description"], "Precision parts");
    assert_eq!(updated["logoUrl"], logo_url);

    // 7) Replacing the logo deletes the old file and stores a new one.
    let new_logo: &[u8] = b"\x89PNG\r\n\x1a\nreplacement-logo";
    let update = multipart_body(r#"{}"#, Some(("logo", "new.png", "image/png", new_logo)));
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/references/{id}"),
        Some(&token),
        Some(update),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_logo_url = updated["logoUrl"].as_str().unwrap().to_string();
    assert_ne!(new_logo_url, logo_url);
    assert!(!tokio::fs::try_exists(&logo_path).await.unwrap());
    assert!(
        tokio::fs::try_exists(stored_path(&upload_dir, &new_logo_url))
            .await
            .unwrap()
    );

    // 8) Missing required name -> 400.
    let create = multipart_body(r#"{"industry":"Automotive"}"#, None);
    let (status, error) = send(&app, "POST", "/api/references", Some(&token), Some(create)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "VALIDATION_FAILED");

    // 9) Delete removes the row and its logo file; idempotency is not
    //    promised at the HTTP layer (second delete is 404).
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/references/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(
        !tokio::fs::try_exists(stored_path(&upload_dir, &new_logo_url))
            .await
            .unwrap()
    );

    let (status, _) = send(&app, "GET", &format!("/api/references/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/references/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let _ = tokio::fs::remove_dir_all(&upload_dir).await;
    let _ = tokio::fs::remove_file(format!("{}-wal", db_path.to_string_lossy())).await;
    let _ = tokio::fs::remove_file(format!("{}-shm", db_path.to_string_lossy())).await;
    let _ = tokio::fs::remove_file(&db_path).await;
}
