//! Tests for the command-line interface

use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use std::fs;
use tempfile::TempDir;

use visited_places::config::{Config, GeocoderKind};
use visited_places::mock::sample_countries;

fn cli() -> Command {
    Command::cargo_bin("visited_places").expect("Failed to find visited_places binary")
}

/// Write a config pointing at `api_base_url`, with the sample boundaries on disk
fn write_config(temp_dir: &TempDir, api_base_url: &str) -> Result<std::path::PathBuf, Box<dyn Error>> {
    let dataset_path = temp_dir.path().join("countries.geojson");
    fs::write(&dataset_path, sample_countries().to_string())?;

    let config = Config {
        api_base_url: api_base_url.to_string(),
        geocoder: GeocoderKind::Mock,
        boundary_dataset: format!("file:{}", dataset_path.display()),
        ..Config::default()
    };
    let config_path = temp_dir.path().join("config.yaml");
    config.save_to_file(&config_path)?;

    Ok(config_path)
}

#[test]
fn test_init_creates_config() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("config.yaml");

    cli().arg("init")
        .current_dir(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));

    let content = fs::read_to_string(&config_path)?;
    assert!(content.contains("api_base_url"), "Config should contain api_base_url");
    assert!(content.contains("boundary_dataset"), "Config should contain boundary_dataset");

    Ok(())
}

#[test]
fn test_init_does_not_overwrite_without_force() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("config.yaml");
    let initial_content = "api_base_url: http://example.com\n";
    fs::write(&config_path, initial_content)?;

    cli().arg("init")
        .current_dir(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Config file already exists"));
    assert_eq!(fs::read_to_string(&config_path)?, initial_content);

    cli().arg("init")
        .arg("--force")
        .current_dir(temp_dir.path())
        .assert()
        .success();
    assert_ne!(fs::read_to_string(&config_path)?, initial_content);

    Ok(())
}

#[test]
fn test_missing_config_error() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let nonexistent_path = temp_dir.path().join("does_not_exist.yaml");

    cli().arg("list")
        .arg("--config")
        .arg(&nonexistent_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));

    Ok(())
}

#[test]
fn test_highlight_from_file_dataset() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let config_path = write_config(&temp_dir, "http://localhost:5000")?;

    cli().arg("highlight")
        .arg("Georgia")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Georgia highlights 2 feature(s)"))
        .stdout(predicate::str::contains("South Georgia and the Islands"));

    Ok(())
}

#[test]
fn test_list_against_backend() -> Result<(), Box<dyn Error>> {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/locations")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"id": 1, "name": "France", "lat": 46.2, "lon": 2.2, "type": "country", "visitDate": "2023-07-14"},
                {"id": 2, "name": "Paris", "lat": 48.9, "lon": 2.35, "type": "cities", "visitDate": "2023-07-15"}
            ]"#,
        )
        .create();

    let temp_dir = TempDir::new()?;
    let config_path = write_config(&temp_dir, &server.url())?;

    cli().arg("list")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[2] Paris (city) - Visited: July 15, 2023"))
        .stdout(predicate::str::contains("Countries: 1  Regions: 0  Cities: 1"))
        .stdout(predicate::str::contains("Highlighted countries: France"));

    Ok(())
}

#[test]
fn test_add_with_mock_geocoder() -> Result<(), Box<dyn Error>> {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/locations")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create();
    let create = server
        .mock("POST", "/api/locations")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"name": "London", "type": "city", "visitDate": "2022-05-06"}"#.to_string(),
        ))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id": 3, "name": "London", "lat": 51.5, "lon": -0.12,
                "type": "city", "visitDate": "2022-05-06"}"#,
        )
        .create();

    let temp_dir = TempDir::new()?;
    let config_path = write_config(&temp_dir, &server.url())?;

    cli().args(["add", "--lat", "51.5", "--lon", "-0.12", "--kind", "city", "--date", "2022-05-06"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added London (city) #3"));

    create.assert();

    Ok(())
}

#[test]
fn test_add_rejects_unknown_kind() -> Result<(), Box<dyn Error>> {
    cli().args(["add", "--lat", "1", "--lon", "1", "--kind", "planet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown location type"));

    Ok(())
}
