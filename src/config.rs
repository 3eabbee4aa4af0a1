//! Uploader configuration module.
//!
//! Handles loading, validating, and layering the `photo-upload.toml` file.
//! Stock defaults are the base layer, the user's file is merged on top, and
//! command-line overrides (such as `--endpoint`) are merged last.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compression]
//! capture_quality = 80      # Quality applied when a photo is captured or picked
//! upload_quality = 100      # Quality of the payload sent to the store
//!
//! [upload]
//! endpoint = "http://localhost:9000/photos"
//! key_prefix = "images"     # Objects land at <prefix>/<uuid>/<name>.jpg
//! timeout_secs = 30
//! # public_base_url = "https://cdn.example.com/photos"
//! # auth_token = "secret"
//!
//! [messages]
//! network_error = "No internet connection."
//! # ... one entry per error kind
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::classify::ErrorKind;
use crate::imaging::Quality;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Uploader configuration.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploaderConfig {
    /// Encoding qualities for acquisition and upload.
    pub compression: CompressionConfig,
    /// Where and how images are uploaded.
    pub upload: UploadConfig,
    /// User-facing text for each error kind.
    pub messages: MessagesConfig,
}

impl UploaderConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, quality) in [
            ("compression.capture_quality", self.compression.capture_quality),
            ("compression.upload_quality", self.compression.upload_quality),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(ConfigError::Validation(format!("{key} must be 1-100")));
            }
        }
        let endpoint = self.upload.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "upload.endpoint must be an http:// or https:// URL".into(),
            ));
        }
        if self.upload.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "upload.timeout_secs must be non-zero".into(),
            ));
        }
        let prefix = &self.upload.key_prefix;
        if prefix.starts_with('/') || prefix.ends_with('/') {
            return Err(ConfigError::Validation(
                "upload.key_prefix must not start or end with '/'".into(),
            ));
        }
        Ok(())
    }
}

/// Encoding qualities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// JPEG quality applied when a photo enters the pipeline (1 = worst, 100 = best).
    pub capture_quality: u32,
    /// JPEG quality of the bytes handed to the store.
    pub upload_quality: u32,
}

impl CompressionConfig {
    pub fn capture(&self) -> Quality {
        Quality::new(self.capture_quality)
    }

    pub fn upload(&self) -> Quality {
        Quality::new(self.upload_quality)
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            capture_quality: Quality::CAPTURE.value(),
            upload_quality: Quality::UPLOAD.value(),
        }
    }
}

/// Object store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Base URL objects are `PUT` under.
    pub endpoint: String,
    /// Leading path segment of every destination key.
    pub key_prefix: String,
    /// Whole-request timeout for a single upload.
    pub timeout_secs: u64,
    /// Base URL used to build the returned link when the store sends no
    /// `Location` header. Defaults to `endpoint`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
    /// Bearer token sent with each upload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000/photos".to_string(),
            key_prefix: "images".to_string(),
            timeout_secs: 30,
            public_base_url: None,
            auth_token: None,
        }
    }
}

/// Display text for each [`ErrorKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessagesConfig {
    pub client_error: String,
    pub server_error: String,
    pub http_error: String,
    pub network_error: String,
    pub timeout_error: String,
    pub unknown_error: String,
}

impl MessagesConfig {
    /// Look up the display text for an error kind.
    pub fn message_for(&self, kind: ErrorKind) -> &str {
        match kind {
            ErrorKind::ClientError => &self.client_error,
            ErrorKind::ServerError => &self.server_error,
            ErrorKind::HttpError => &self.http_error,
            ErrorKind::NetworkError => &self.network_error,
            ErrorKind::TimeoutError => &self.timeout_error,
            ErrorKind::UnknownError => &self.unknown_error,
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            client_error: "The upload was rejected. Check the image and try again.".to_string(),
            server_error: "The server had a problem. Try again later.".to_string(),
            http_error: "The server sent an unexpected response.".to_string(),
            network_error: "No internet connection.".to_string(),
            timeout_error: "The upload timed out.".to_string(),
            unknown_error: "Something went wrong.".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(UploaderConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays in order onto the stock defaults, then deserialize and validate.
pub fn resolve_config(
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<UploaderConfig, ConfigError> {
    let merged = overlays
        .into_iter()
        .fold(stock_defaults_value(), merge_toml);
    let config: UploaderConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<UploaderConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-upload configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# JPEG quality applied when a photo is captured or picked (1-100).
capture_quality = 80

# JPEG quality of the payload sent to the store (1-100).
upload_quality = 100

# ---------------------------------------------------------------------------
# Upload
# ---------------------------------------------------------------------------
[upload]
# Objects are PUT to <endpoint>/<key>.
endpoint = "http://localhost:9000/photos"

# Keys look like <key_prefix>/<random id>/<file name>.jpg
key_prefix = "images"

# Whole-request timeout in seconds.
timeout_secs = 30

# Base URL for the returned link when the store sends no Location header.
# public_base_url = "https://cdn.example.com/photos"

# Bearer token sent with each upload.
# auth_token = "secret"

# ---------------------------------------------------------------------------
# Error messages shown when an upload fails
# ---------------------------------------------------------------------------
[messages]
client_error = "The upload was rejected. Check the image and try again."
server_error = "The server had a problem. Try again later."
http_error = "The server sent an unexpected response."
network_error = "No internet connection."
timeout_error = "The upload timed out."
unknown_error = "Something went wrong."
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = UploaderConfig::default();
        assert_eq!(config.compression.capture_quality, 80);
        assert_eq!(config.compression.upload_quality, 100);
        assert_eq!(config.upload.key_prefix, "images");
        assert_eq!(config.upload.timeout_secs, 30);
        assert!(config.upload.auth_token.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[upload]
endpoint = "https://store.example.com/bucket"
"#;
        let config: UploaderConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.upload.endpoint, "https://store.example.com/bucket");
        // Defaults preserved
        assert_eq!(config.upload.key_prefix, "images");
        assert_eq!(config.compression.capture_quality, 80);
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r#"
[compression]
captur_quality = 70
"#;
        assert!(toml::from_str::<UploaderConfig>(toml).is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_quality() {
        let mut config = UploaderConfig::default();
        config.compression.upload_quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("upload_quality"));

        let mut config = UploaderConfig::default();
        config.compression.capture_quality = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_endpoint() {
        let mut config = UploaderConfig::default();
        config.upload.endpoint = "ftp://example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = UploaderConfig::default();
        config.upload.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_slashed_prefix() {
        let mut config = UploaderConfig::default();
        config.upload.key_prefix = "/images".into();
        assert!(config.validate().is_err());
        config.upload.key_prefix = "images/".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn messages_cover_every_kind() {
        let messages = MessagesConfig::default();
        for kind in ErrorKind::ALL {
            assert!(!messages.message_for(kind).is_empty(), "{kind:?}");
        }
        assert_eq!(
            messages.message_for(ErrorKind::NetworkError),
            "No internet connection."
        );
    }

    #[test]
    fn merge_overlay_wins() {
        let overlay: toml::Value = toml::from_str(
            r#"
[upload]
timeout_secs = 5
"#,
        )
        .unwrap();
        let config = resolve_config([overlay]).unwrap();
        assert_eq!(config.upload.timeout_secs, 5);
        assert_eq!(config.upload.key_prefix, "images");
    }

    #[test]
    fn later_overlays_override_earlier() {
        let file: toml::Value = toml::from_str("[upload]\nendpoint = \"http://a.test\"").unwrap();
        let cli: toml::Value = toml::from_str("[upload]\nendpoint = \"http://b.test\"").unwrap();
        let config = resolve_config([file, cli]).unwrap();
        assert_eq!(config.upload.endpoint, "http://b.test");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("photo-upload.toml")).unwrap();
        assert_eq!(config.compression.upload_quality, 100);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo-upload.toml");
        fs::write(
            &path,
            r#"
[compression]
capture_quality = 60

[messages]
network_error = "Offline"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.compression.capture(), Quality::new(60));
        assert_eq!(config.messages.network_error, "Offline");
        assert_eq!(config.messages.timeout_error, "The upload timed out.");
    }

    #[test]
    fn load_config_validates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo-upload.toml");
        fs::write(&path, "[compression]\nupload_quality = 500\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: UploaderConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = UploaderConfig::default();
        assert_eq!(config.compression.capture_quality, defaults.compression.capture_quality);
        assert_eq!(config.upload.endpoint, defaults.upload.endpoint);
        assert_eq!(config.messages, defaults.messages);
    }
}
