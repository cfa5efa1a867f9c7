use mediashrink_config::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[tokio::test]
async fn test_load_from_file_toml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("mediashrink.toml");

    let toml_content = r#"
[server]
host = "0.0.0.0"
port = 9000

[workspace]
scratch_root = "/srv/shrink/tmp"

[video]
transcoder_path = "/usr/local/bin/ffmpeg"
crf = 32
preset = "veryfast"

[pdf]
size_policy = "prefer_smaller"
"#;

    fs::write(&config_path, toml_content).unwrap();

    let loader = ConfigLoader::new();
    let config = loader.load_file(&config_path).await.unwrap();

    assert_eq!(config.bind_address(), "0.0.0.0:9000");
    assert_eq!(config.workspace.scratch_root, PathBuf::from("/srv/shrink/tmp"));
    assert_eq!(config.video.crf, 32);
    assert_eq!(config.video.preset, "veryfast");
    assert_eq!(config.video.audio_codec, "aac");
    assert_eq!(config.pdf.size_policy, PdfSizePolicySetting::PreferSmaller);
}

#[tokio::test]
async fn test_load_from_file_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("mediashrink.yml");

    let yaml_content = r#"
image:
  jpeg_quality: 70
  png_quality: 90
archive:
  max_entries: 500
observability:
  log_format: json
"#;

    fs::write(&config_path, yaml_content).unwrap();

    let config = ConfigLoader::new().load_file(&config_path).await.unwrap();
    assert_eq!(config.image.jpeg_quality, 70);
    assert_eq!(config.image.png_quality, 90);
    assert_eq!(config.archive.max_entries, 500);
    assert_eq!(config.archive.compression_level, 9);
    assert_eq!(config.observability.log_format, "json");
}

#[tokio::test]
async fn test_load_from_file_json() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("mediashrink.json");

    fs::write(&config_path, r#"{"video": {"timeout_secs": 60}}"#).unwrap();

    let config = ConfigLoader::new().load_file(&config_path).await.unwrap();
    assert_eq!(config.video.timeout_secs, 60);
}

#[tokio::test]
async fn test_missing_file() {
    let loader = ConfigLoader::new();
    let result = loader.load_file("/nonexistent/mediashrink.toml").await;
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[tokio::test]
async fn test_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("mediashrink.ini");
    fs::write(&config_path, "port=1").unwrap();

    let result = ConfigLoader::new().load_file(&config_path).await;
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_invalid_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("mediashrink.toml");
    fs::write(&config_path, "[video]\ncrf = 60\n").unwrap();

    let result = ConfigLoader::new().load_file(&config_path).await;
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[tokio::test]
async fn test_malformed_file_is_a_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("mediashrink.toml");
    fs::write(&config_path, "[server\nport = ").unwrap();

    let result = ConfigLoader::new().load_file(&config_path).await;
    assert!(matches!(result, Err(ConfigError::TomlParseError(_))));
}

#[tokio::test]
async fn test_defaults_without_file() {
    let config = ConfigLoader::without_validation()
        .load_with_overrides(None)
        .await
        .unwrap();
    assert_eq!(config.image.jpeg_quality, 50);
    assert_eq!(config.archive.max_extracted_bytes, 2 * 1024 * 1024 * 1024);
}

#[test]
fn test_overrides_then_validate() {
    let loader = ConfigLoader::new();
    let mut config = Config::default();
    loader
        .apply_overrides_from(&mut config, |key| {
            (key == "MEDIASHRINK_TRANSCODE_TIMEOUT_SECS").then(|| "0".to_string())
        })
        .unwrap();

    assert_eq!(config.video.timeout_secs, 0);
    assert!(config.validate().is_err());
}
