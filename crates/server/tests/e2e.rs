use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use migration::MigratorTrait;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, auth};
use service::auth::{
    repo::seaorm::SeaOrmAuthRepository,
    service::{AuthConfig, AuthService},
};

const TEST_SECRET: &str = "test-secret";

struct TestApp {
    base_url: String,
    admin_email: String,
    admin_password: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // Use DATABASE_URL from environment; if not present, skip tests gracefully
    if std::env::var("DATABASE_URL").is_err() {
        anyhow::bail!("missing DATABASE_URL");
    }

    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("migrations notice: {}", e);
    }

    // Seed a fresh admin for this run
    let admin_email = format!("admin_{}@example.com", Uuid::new_v4());
    let admin_password = "S3curePass!".to_string();
    let svc = AuthService::new(
        Arc::new(SeaOrmAuthRepository { db: db.clone() }),
        AuthConfig {
            jwt_secret: Some(TEST_SECRET.into()),
            token_ttl_hours: 12,
            password_algorithm: "argon2".into(),
        },
    );
    svc.seed_admin(&admin_email, &admin_password).await?;

    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret: TEST_SECRET.into(), token_ttl_hours: 12 },
    };
    let app: Router = routes::build_router(CorsLayer::very_permissive(), state);

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url, admin_email, admin_password })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().expect("reqwest client")
}

async fn admin_token(c: &reqwest::Client, app: &TestApp) -> anyhow::Result<String> {
    let res = c
        .post(format!("{}/auth/login", app.base_url))
        .json(&json!({"email": app.admin_email, "password": app.admin_password}))
        .send()
        .await?;
    anyhow::ensure!(res.status() == HttpStatusCode::OK, "login failed: {}", res.status());
    let body = res.json::<serde_json::Value>().await?;
    Ok(body["token"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = match start_server().await {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_registered_client_cannot_manage_companies() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = match start_server().await {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    let c = client();

    let email = format!("user_{}@example.com", Uuid::new_v4());
    let res = c
        .post(format!("{}/auth/register", app.base_url))
        .json(&json!({"email": email, "name": "Tester", "password": "S3curePass!"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = c
        .post(format!("{}/auth/login", app.base_url))
        .json(&json!({"email": email, "password": "S3curePass!"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let token = res.json::<serde_json::Value>().await?["token"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    // Registration always yields CLIENT, which the gate refuses
    let res = c
        .get(format!("{}/companies", app.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn e2e_company_crud_and_report() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let app = match start_server().await {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    let c = client();
    let token = admin_token(&c, &app).await?;

    let tag = Uuid::new_v4().to_string();
    let category = format!("e2e-{tag}");

    // Create three companies with distinct impact levels
    let mut created_ids = Vec::new();
    for (suffix, level, years) in
        [("low", "Low", 3), ("high", "High", 40), ("medium", "Medium", 11)]
    {
        let res = c
            .post(format!("{}/companies", app.base_url))
            .bearer_auth(&token)
            .json(&json!({
                "name": format!("e2e-{tag}-{suffix}"),
                "impactLevel": level,
                "yearsOfExperience": years,
                "category": category,
            }))
            .send()
            .await?;
        assert_eq!(res.status(), HttpStatusCode::CREATED);
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["impactLevel"], level);
        assert_eq!(body["yearsOfExperience"], years);
        assert_eq!(body["status"], true);
        created_ids.push(body["id"].as_str().unwrap_or_default().to_string());
    }

    // Duplicate name is a client error and no second record appears
    let res = c
        .post(format!("{}/companies", app.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": format!("e2e-{tag}-low"),
            "impactLevel": "High",
            "yearsOfExperience": 1,
            "category": category,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    // Invalid impact level is a validation error
    let res = c
        .post(format!("{}/companies", app.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": format!("e2e-{tag}-invalid"),
            "impactLevel": "Critical",
            "yearsOfExperience": 1,
            "category": category,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    // Ranked sort: ascending follows [High, Medium, Low]
    let filter = json!({"category": category}).to_string();
    let res = c
        .get(format!("{}/companies", app.base_url))
        .bearer_auth(&token)
        .query(&[("filter", filter.as_str()), ("sort", "impactLevel")])
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let listed = res.json::<Vec<serde_json::Value>>().await?;
    let levels: Vec<_> = listed.iter().map(|c| c["impactLevel"].as_str().unwrap_or("")).collect();
    assert_eq!(levels, vec!["High", "Medium", "Low"]);

    // Point read
    let res = c
        .get(format!("{}/companies/{}", app.base_url, created_ids[0]))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    // Unknown id is 404 for read and update
    let missing = Uuid::new_v4();
    let res = c
        .get(format!("{}/companies/{}", app.base_url, missing))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let res = c
        .put(format!("{}/companies/{}", app.base_url, missing))
        .bearer_auth(&token)
        .json(&json!({"category": "Whatever"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    // Partial update: blank category is skipped, zero experience applies
    let res = c
        .put(format!("{}/companies/{}", app.base_url, created_ids[0]))
        .bearer_auth(&token)
        .json(&json!({"category": "", "yearsOfExperience": 0}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["category"], category);
    assert_eq!(body["yearsOfExperience"], 0);

    // Report carries the xlsx content type, fixed filename, and rows
    let res = c
        .get(format!("{}/companies/report", app.base_url))
        .bearer_auth(&token)
        .query(&[("filter", filter.as_str()), ("sort", "-impactLevel")])
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let content_type = res
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(
        content_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let disposition = res
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("empresas.xlsx"), "disposition: {disposition}");
    let bytes = res.bytes().await?;
    assert_eq!(&bytes[..2], b"PK");
    Ok(())
}
