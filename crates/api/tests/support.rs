#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use lexsync_api::{router, AppContext};
use lexsync_domain::{
    Config, DatabaseConfig, GoogleConfig, Integration, IntegrationSettings, Member, Membership,
    ProviderKind, Role, ServerConfig, SyncConfig, TokenState,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::MockServer;

pub const CRON_SECRET: &str = "cron-s3cret";

/// Application wired against a temporary database and a mock Google server.
pub struct TestApp {
    pub ctx: Arc<AppContext>,
    pub server: MockServer,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let server = MockServer::start().await;
        let db_path = temp_dir.path().join("lexsync-api-test.db");

        let config = Config {
            database: DatabaseConfig { path: db_path.to_string_lossy().into_owned(), pool_size: 4 },
            sync: SyncConfig::default(),
            google: GoogleConfig {
                client_id: "client-id".to_string(),
                client_secret: "client-secret".to_string(),
                api_base: format!("{}/calendar/v3", server.uri()),
                token_endpoint: format!("{}/token", server.uri()),
            },
            server: ServerConfig {
                cron_secret: Some(CRON_SECRET.to_string()),
                ..ServerConfig::default()
            },
        };

        let ctx = Arc::new(AppContext::new(config).expect("context should build"));
        Self { ctx, server, _temp_dir: temp_dir }
    }

    pub fn router(&self) -> Router {
        router(Arc::clone(&self.ctx))
    }

    /// Store a member holding `memberships` under `api_token`.
    pub async fn seed_member(&self, api_token: &str, memberships: &[(&str, Role)]) {
        let member = Member {
            id: format!("member-{api_token}"),
            email: format!("{api_token}@escritorio.example"),
            memberships: memberships
                .iter()
                .map(|(tenant_id, role)| Membership {
                    tenant_id: (*tenant_id).to_string(),
                    role: *role,
                })
                .collect(),
        };
        self.ctx.members.insert_member(&member, api_token).await.expect("member stored");
    }

    pub async fn seed_integration(&self, tenant_id: &str) {
        self.ctx.integrations.upsert(&integration(tenant_id)).await.expect("integration stored");
    }
}

/// Integration with an access token that stays valid for the test run.
pub fn integration(tenant_id: &str) -> Integration {
    Integration {
        id: format!("int-{tenant_id}"),
        tenant_id: tenant_id.to_string(),
        provider: ProviderKind::Google,
        enabled: true,
        tokens: TokenState {
            access_token: Some(format!("access-{tenant_id}")),
            refresh_token: Some(format!("refresh-{tenant_id}")),
            expires_at: Some(Utc::now() + Duration::hours(1)),
            scope: Some("https://www.googleapis.com/auth/calendar".to_string()),
        },
        settings: IntegrationSettings::default(),
    }
}

pub fn post(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("POST").uri(uri)
}

/// Send a request through the router and decode the JSON body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router should respond");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body should be readable");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be json")
    };
    (status, body)
}
