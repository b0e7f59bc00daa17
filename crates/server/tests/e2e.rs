use std::net::SocketAddr;

use chrono::{Duration, SecondsFormat, Utc};
use configs::{AppConfig, StorageBackend};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use server::startup;

struct TestApp {
    base_url: String,
    data_dir: std::path::PathBuf,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // isolated quiz directory per test run
    let data_dir = std::env::temp_dir().join(format!("quizbox-e2e-{}", Uuid::new_v4()));
    let mut cfg = AppConfig::default();
    cfg.storage.backend = StorageBackend::File;
    cfg.storage.dir = data_dir.to_string_lossy().into_owned();

    let app = startup::build_app(&cfg).await?;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, data_dir })
}

fn ts(offset: Duration) -> String {
    (Utc::now() + offset).to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[tokio::test]
async fn e2e_quiz_lifecycle_on_disk() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let submitted = json!({
        "question": "2 + 2?",
        "options": ["3", "4", "5"],
        "answer": "1",
        "start_date": ts(Duration::minutes(-30)),
        "end_date": ts(Duration::minutes(30))
    });
    let res = c.post(format!("{}/quizzes", app.base_url)).json(&submitted).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"success": true}));

    // the record landed in <dir>/1.json with the answer coerced to an integer
    let on_disk: Value = serde_json::from_slice(&tokio::fs::read(app.data_dir.join("1.json")).await?)?;
    assert_eq!(on_disk["id"], 1);
    assert_eq!(on_disk["answer"], 1);
    assert_eq!(on_disk["start_date"], submitted["start_date"]);

    let active = c.get(format!("{}/quizzes/active", app.base_url)).send().await?;
    assert_eq!(active.status(), HttpStatusCode::OK);
    let active = active.json::<Value>().await?;
    assert_eq!(active["question"], "2 + 2?");
    assert_eq!(active["options"], submitted["options"]);

    let all = c.get(format!("{}/quizzes/all", app.base_url)).send().await?.json::<Value>().await?;
    assert_eq!(all.as_array().map(Vec::len), Some(1));
    assert!(all[0].get("answer").is_none());

    let res = c.get(format!("{}/quizzes/1/result", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert!(body["message"].as_str().is_some_and(|m| m.starts_with("Result not available yet, wait ")));

    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_second_submission_gets_next_id() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    for question in ["first", "second"] {
        let res = c
            .post(format!("{}/quizzes", app.base_url))
            .json(&json!({
                "question": question,
                "options": ["a", "b"],
                "answer": 0,
                "start_date": ts(Duration::days(-2)),
                "end_date": ts(Duration::days(-1))
            }))
            .send()
            .await?;
        assert_eq!(res.status(), HttpStatusCode::OK);
    }

    let res = c.get(format!("{}/quizzes/2/result", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["question"], "second");
    assert_eq!(body["answer"], 0);

    let active = c.get(format!("{}/quizzes/active", app.base_url)).send().await?.json::<Value>().await?;
    assert_eq!(active, Value::Null);

    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}
