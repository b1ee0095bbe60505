use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};
use server_panel::ServerPanel;
use server_panel::api::auth::Authentication;
use server_panel::api::handlers;
use server_panel::config::{ApiConfig, AuthConfig, BearerAuthConfig, Config};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn panel_in(dir: &Path) -> ServerPanel {
    ServerPanel::new(Config {
        servers_root: dir.join("servers"),
        registry_file: dir.join("servers.json"),
        api: None,
    })
}

fn api_config(token: Option<&str>) -> ApiConfig {
    ApiConfig {
        address: "127.0.0.1".to_string(),
        port: 5010,
        workers: Some(1),
        authenticate: token.map(|token| AuthConfig {
            bearer: Some(BearerAuthConfig {
                token: token.to_string(),
            }),
        }),
    }
}

macro_rules! test_app {
    ($panel:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($panel))
                .wrap(Authentication::new(Arc::new($config)))
                .route("/api/servers", web::get().to(handlers::list_servers))
                .route("/api/servers", web::post().to(handlers::create_server))
                .route(
                    "/api/servers/{name}/start",
                    web::post().to(handlers::start_server),
                )
                .route(
                    "/api/servers/{name}/status",
                    web::get().to(handlers::server_status),
                )
                .route(
                    "/api/servers/{name}/logs",
                    web::get().to(handlers::console_logs),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn test_missing_token_is_unauthorized() {
    let dir = TempDir::new().unwrap();
    let app = test_app!(panel_in(dir.path()), api_config(Some("secret")));

    let req = test::TestRequest::get().uri("/api/servers").to_request();
    let err = test::try_call_service(&app, req)
        .await
        .err()
        .expect("request without token should be rejected");
    assert_eq!(
        err.as_response_error().status_code(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_wrong_token_is_unauthorized() {
    let dir = TempDir::new().unwrap();
    let app = test_app!(panel_in(dir.path()), api_config(Some("secret")));

    let req = test::TestRequest::get()
        .uri("/api/servers")
        .insert_header(("Authorization", "Bearer wrong"))
        .to_request();
    let err = test::try_call_service(&app, req)
        .await
        .err()
        .expect("request with wrong token should be rejected");
    assert_eq!(
        err.as_response_error().status_code(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_list_servers_with_valid_token() {
    let dir = TempDir::new().unwrap();
    let app = test_app!(panel_in(dir.path()), api_config(Some("secret")));

    let req = test::TestRequest::get()
        .uri("/api/servers")
        .insert_header(("Authorization", "Bearer secret"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn test_create_and_list_server() {
    let dir = TempDir::new().unwrap();
    let app = test_app!(panel_in(dir.path()), api_config(None));

    let req = test::TestRequest::post()
        .uri("/api/servers")
        .set_json(json!({
            "name": "alpha",
            "port": 9001,
            "serverType": "flask"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/api/servers").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body[0]["name"], "alpha");
    assert_eq!(body[0]["port"], 9001);
    assert_eq!(body[0]["status"], "stopped");
    // Host defaults to all interfaces when the request omits it.
    assert_eq!(body[0]["host"], "0.0.0.0");
}

#[actix_web::test]
async fn test_custom_server_without_command_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = test_app!(panel_in(dir.path()), api_config(None));

    let req = test::TestRequest::post()
        .uri("/api/servers")
        .set_json(json!({
            "name": "alpha",
            "port": 9001,
            "serverType": "custom"
        }))
        .to_request();
    let err = test::try_call_service(&app, req)
        .await
        .err()
        .expect("custom server without command should be rejected");
    assert_eq!(
        err.as_response_error().status_code(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn test_start_unknown_server_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = test_app!(panel_in(dir.path()), api_config(None));

    let req = test::TestRequest::post()
        .uri("/api/servers/ghost/start")
        .to_request();
    let err = test::try_call_service(&app, req)
        .await
        .err()
        .expect("starting an unknown server should fail");
    assert_eq!(err.as_response_error().status_code(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_status_of_unknown_server_is_reported_in_body() {
    let dir = TempDir::new().unwrap();
    let app = test_app!(panel_in(dir.path()), api_config(None));

    let req = test::TestRequest::get()
        .uri("/api/servers/ghost/status")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "not_found");
}

#[actix_web::test]
async fn test_logs_endpoint_returns_tail() {
    let dir = TempDir::new().unwrap();
    let panel = panel_in(dir.path());
    let app = test_app!(panel.clone(), api_config(None));

    panel
        .add_server("alpha", "127.0.0.1", 9001, "sleep 30")
        .await
        .unwrap();
    panel.run_command("alpha", "echo hi").await.unwrap();

    let req = test::TestRequest::get()
        .uri("/api/servers/alpha/logs?lines=10")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let logs = body["logs"].as_array().expect("logs should be an array");
    assert!(
        logs.iter()
            .any(|l| l.as_str().unwrap_or("").contains("$ echo hi")),
        "logs: {:?}",
        logs
    );
}
