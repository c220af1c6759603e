use std::net::SocketAddr;

use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let dir = std::env::temp_dir().join(format!("livret_e2e_{}", Uuid::new_v4()));
    let mut cfg = configs::AppConfig::default();
    cfg.apply_env(|key| match key {
        "LIVRET_DATA_FILE" => Some(dir.join("livrets.json").display().to_string()),
        "LIVRET_STATIC_DIR" => Some(dir.join("public").display().to_string()),
        "ADMIN_PASSWORD" => Some("e2e-secret".into()),
        _ => None,
    });
    cfg.normalize_and_validate()?;

    let app = server::build_app(&cfg).await?;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], json!("ok"));
    Ok(())
}

#[tokio::test]
async fn e2e_student_and_teacher_session() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/login", app.base_url))
        .json(&json!({"nom": "Dupont", "prenom": "Lea", "classe": "CM2", "code": "ABC123"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    let id = body["eleveId"].as_str().unwrap_or_default().to_string();
    assert_eq!(id, "abc123");

    let res = client
        .post(format!("{}/api/save/{}", app.base_url, id))
        .json(&json!({"livret": {"francais": {"lecture": "A"}}}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = client
        .post(format!("{}/api/admin/eleves", app.base_url))
        .json(&json!({"password": "prof2024"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/api/admin/eleve/{}", app.base_url, id))
        .json(&json!({"password": "e2e-secret"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["eleve"]["livret"]["francais"]["lecture"], json!("A"));
    assert!(body["eleve"]["lastSaved"].is_string());
    Ok(())
}
