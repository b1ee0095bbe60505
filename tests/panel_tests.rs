use assert_fs::TempDir;
use assert_fs::prelude::*;
use server_panel::config::Config;
use server_panel::error::{Error, Result};
use server_panel::{ServerPanel, ServerStatus, ServerType};
use std::path::Path;

fn panel_in(dir: &Path) -> ServerPanel {
    ServerPanel::new(Config {
        servers_root: dir.join("servers"),
        registry_file: dir.join("servers.json"),
        api: None,
    })
}

#[tokio::test]
async fn test_create_server_provisions_directory_and_app_file() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let panel = panel_in(dir.path());

    panel
        .create_server("alpha", "0.0.0.0", 9001, ServerType::Flask)
        .await?;

    let app_file = dir.child("servers/alpha/app.py");
    assert!(app_file.path().is_file(), "app file should be rendered");
    let contents = std::fs::read_to_string(app_file.path()).unwrap();
    assert!(contents.contains("alpha"));

    let record = panel.server_record("alpha").await?;
    assert_eq!(record.command, "python3 app.py");
    assert_eq!(record.status, ServerStatus::Stopped);
    assert_eq!(record.server_type, ServerType::Flask);

    Ok(())
}

#[tokio::test]
async fn test_created_server_survives_panel_restart() -> Result<()> {
    let dir = TempDir::new().unwrap();

    {
        let panel = panel_in(dir.path());
        panel
            .create_server("alpha", "0.0.0.0", 9001, ServerType::PythonHttp)
            .await?;
    }

    // A fresh panel over the same paths sees the persisted record.
    let panel = panel_in(dir.path());
    let record = panel.server_record("alpha").await?;
    assert_eq!(record.port, 9001);
    assert_eq!(record.server_type, ServerType::PythonHttp);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_create_is_rejected() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let panel = panel_in(dir.path());

    panel
        .create_server("alpha", "0.0.0.0", 9001, ServerType::Flask)
        .await?;
    let result = panel
        .create_server("alpha", "0.0.0.0", 9002, ServerType::Flask)
        .await;
    assert!(matches!(result, Err(Error::ConfigInvalid(_))));

    Ok(())
}

#[tokio::test]
async fn test_path_like_names_are_rejected() {
    let dir = TempDir::new().unwrap();
    let panel = panel_in(dir.path());

    let result = panel
        .create_server("../evil", "0.0.0.0", 9001, ServerType::Flask)
        .await;
    assert!(matches!(result, Err(Error::ConfigInvalid(_))));
}

#[tokio::test]
async fn test_delete_server_removes_directory_and_record() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let panel = panel_in(dir.path());

    panel
        .create_server("alpha", "0.0.0.0", 9001, ServerType::Flask)
        .await?;
    panel.delete_server("alpha").await?;

    assert!(!dir.child("servers/alpha").path().exists());
    assert!(panel.list_servers().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_delete_running_server_stops_it_first() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let panel = panel_in(dir.path());

    panel.add_server("alpha", "127.0.0.1", 9001, "sleep 30").await?;
    panel.start_server("alpha").await?;
    let record = panel.server_record("alpha").await?;
    let pid = record.pid.expect("running server should have a pid");

    panel.delete_server("alpha").await?;

    assert!(panel.list_servers().await.is_empty());
    assert!(!dir.child("servers/alpha").path().exists());
    // Allow a moment for the monitor task to reap the killed child.
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    let alive = std::process::Command::new("sh")
        .arg("-c")
        .arg(format!("kill -0 {}", pid))
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    assert!(!alive, "deleted server's process should be gone");

    Ok(())
}

#[tokio::test]
async fn test_delete_unknown_server_is_not_found() {
    let dir = TempDir::new().unwrap();
    let panel = panel_in(dir.path());

    let result = panel.delete_server("ghost").await;
    assert!(matches!(result, Err(Error::ServerNotFound(_))));
}

#[tokio::test]
async fn test_panel_starts_empty_on_corrupt_registry() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("servers.json"), "{ corrupt").unwrap();

    let panel = panel_in(dir.path());
    assert!(panel.list_servers().await.is_empty());
}
