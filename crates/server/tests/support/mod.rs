#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use configs::{AdminSeedConfig, AppConfig, JwtConfig};
use models::db::{connect_with_config, DatabaseConfig};
use service::seed::DataInitializer;

pub const ROOT_EMAIL: &str = "root@travel.test";
pub const ROOT_PASSWORD: &str = "rootpw";
pub const PASSWORD: &str = "secret1";

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    pub app: Router,
    pub db: sea_orm::DatabaseConnection,
}

fn test_config(seed_admin: bool) -> AppConfig {
    AppConfig {
        jwt: JwtConfig { secret: "test-secret".into(), ..Default::default() },
        admin: seed_admin.then(|| AdminSeedConfig {
            email: ROOT_EMAIL.into(),
            password: ROOT_PASSWORD.into(),
            first_name: "Root".into(),
            last_name: "Admin".into(),
            phone_number: String::new(),
        }),
        ..Default::default()
    }
}

/// App over a fresh migrated SQLite file, optionally with the default super admin seeded.
pub async fn spawn_app(seed_admin: bool) -> anyhow::Result<TestApp> {
    spawn_app_with(seed_admin, |_| {}).await
}

/// Same as [`spawn_app`] with a hook to adjust the configuration first.
pub async fn spawn_app_with(seed_admin: bool, adjust: impl FnOnce(&mut AppConfig)) -> anyhow::Result<TestApp> {
    let path = std::env::temp_dir().join(format!("server-test-{}.db", Uuid::new_v4()));
    let db_cfg = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    let db = connect_with_config(&db_cfg).await?;
    migration::Migrator::up(&db, None).await?;

    let mut cfg = test_config(seed_admin);
    adjust(&mut cfg);
    DataInitializer::new(db.clone(), cfg.admin.clone()).ensure_seeded().await?;
    let app = server::build_app(db.clone(), &cfg);
    Ok(TestApp { app, db })
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<Reply> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
        }
        let req = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&v)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> anyhow::Result<Reply> {
        let resp = self.app.clone().oneshot(req).await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok(Reply { status, headers, body })
    }

    pub async fn get(&self, uri: &str, token: &str) -> anyhow::Result<Reply> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> anyhow::Result<Reply> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> anyhow::Result<Reply> {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<String> {
        let reply = self
            .request(Method::POST, "/api/Auth/login", None, Some(json!({"email": email, "password": password})))
            .await?;
        anyhow::ensure!(reply.status == StatusCode::OK, "login failed for {}: {}", email, reply.body);
        reply.body["token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("login reply without token"))
    }

    pub async fn root_token(&self) -> anyhow::Result<String> {
        self.login(ROOT_EMAIL, ROOT_PASSWORD).await
    }
}

/// Agency with one point and a staff member per agency role, created through the API.
pub struct TenantFixture {
    pub agency_id: String,
    pub point_id: String,
    pub global_admin: String,
    pub point_admin: String,
    pub operator: String,
    pub operator_id: String,
}

fn id_of(reply: &Reply) -> anyhow::Result<String> {
    anyhow::ensure!(reply.status == StatusCode::CREATED, "unexpected status {}: {}", reply.status, reply.body);
    reply.body["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("reply without id"))
}

pub async fn create_staff(
    app: &TestApp,
    root: &str,
    role: &str,
    agency_id: &str,
    point_id: Option<&str>,
) -> anyhow::Result<(String, String)> {
    let email = format!("{}-{}@travel.test", role.to_lowercase(), Uuid::new_v4());
    let reply = app
        .post("/api/SuperAdmin/users", root, json!({
            "email": email,
            "password": PASSWORD,
            "firstName": "Test",
            "lastName": role,
            "role": role,
            "agencyId": agency_id,
            "agencyPointId": point_id,
        }))
        .await?;
    Ok((id_of(&reply)?, email))
}

pub async fn seed_tenant(app: &TestApp, root: &str, name: &str) -> anyhow::Result<TenantFixture> {
    let agency = app
        .post("/api/SuperAdmin/agencies", root, json!({
            "name": name,
            "address": "1 Harbour Rd",
            "phone": "+100",
            "email": format!("info@{}.test", name.to_lowercase()),
        }))
        .await?;
    let agency_id = id_of(&agency)?;
    let point = app
        .post("/api/SuperAdmin/agency-points", root, json!({
            "agencyId": agency_id,
            "name": "Main",
            "address": "2 Harbour Rd",
            "phone": "+101",
        }))
        .await?;
    let point_id = id_of(&point)?;

    let (_, ga_email) = create_staff(app, root, "AgencyGlobalAdmin", &agency_id, None).await?;
    let (_, pa_email) = create_staff(app, root, "AgencyPointAdmin", &agency_id, Some(&point_id)).await?;
    let (operator_id, op_email) = create_staff(app, root, "AgencyOperator", &agency_id, Some(&point_id)).await?;

    Ok(TenantFixture {
        global_admin: app.login(&ga_email, PASSWORD).await?,
        point_admin: app.login(&pa_email, PASSWORD).await?,
        operator: app.login(&op_email, PASSWORD).await?,
        operator_id,
        agency_id,
        point_id,
    })
}

pub fn travel_body(seats: i32, point_id: Option<&str>) -> Value {
    json!({
        "departure": "Dakar",
        "destination": "Lisbon",
        "departureDate": "2031-05-01T08:00:00Z",
        "arrivalDate": "2031-05-01T14:30:00Z",
        "priceCents": 45_000,
        "availableSeats": seats,
        "agencyPointId": point_id,
    })
}
