//! Configuration management for Scrawl Server

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::ocr::OcrProvider;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub ocr: OcrConfig,
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the auth provider. Without it every caller is a guest.
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Providers tried in order
    pub providers: Vec<OcrProvider>,
    pub language: String,
    pub timeout_secs: u64,
    pub tesseract_path: String,
    pub ollama_url: String,
    pub ollama_model: String,
}

impl OcrConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    /// Bearer token expected on `POST /api/cleanup`
    pub secret_token: Option<String>,
    /// Run the cleanup job in-process every N seconds
    pub interval_secs: Option<u64>,
}

pub const DEFAULT_BUCKET: &str = "temp-uploads";

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig {
                endpoint: "http://localhost:9000".to_string(),
                bucket: DEFAULT_BUCKET.to_string(),
                access_key: "admin".to_string(),
                secret_key: "password123".to_string(),
                region: Some("us-east-1".to_string()),
            },
            database: DatabaseConfig {
                url: "sqlite:./scrawl.db".to_string(),
            },
            auth: AuthConfig { jwt_secret: None },
            ocr: OcrConfig::default(),
            cleanup: CleanupConfig {
                secret_token: None,
                interval_secs: None,
            },
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            providers: vec![OcrProvider::Tesseract],
            language: "eng".to_string(),
            timeout_secs: 30,
            tesseract_path: "tesseract".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llava".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let ocr_defaults = OcrConfig::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            storage: StorageConfig {
                endpoint: env::var("S3_ENDPOINT")?,
                bucket: env::var("S3_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
                access_key: env::var("S3_ACCESS_KEY")?,
                secret_key: env::var("S3_SECRET_KEY")?,
                region: env::var("S3_REGION").ok(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./scrawl.db".to_string()),
            },
            auth: AuthConfig {
                jwt_secret: non_empty_var("AUTH_JWT_SECRET"),
            },
            ocr: OcrConfig {
                providers: env::var("OCR_PROVIDERS")
                    .map(|v| parse_providers(&v))
                    .unwrap_or(ocr_defaults.providers),
                language: env::var("OCR_LANGUAGE").unwrap_or(ocr_defaults.language),
                timeout_secs: env::var("OCR_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(ocr_defaults.timeout_secs),
                tesseract_path: env::var("TESSERACT_PATH").unwrap_or(ocr_defaults.tesseract_path),
                ollama_url: env::var("OLLAMA_URL").unwrap_or(ocr_defaults.ollama_url),
                ollama_model: env::var("OLLAMA_MODEL").unwrap_or(ocr_defaults.ollama_model),
            },
            cleanup: CleanupConfig {
                secret_token: non_empty_var("CLEANUP_SECRET_TOKEN"),
                interval_secs: env::var("CLEANUP_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|secs| *secs > 0),
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a comma-separated provider list, skipping unknown names
fn parse_providers(value: &str) -> Vec<OcrProvider> {
    value
        .split(',')
        .filter_map(|name| match name.trim().to_lowercase().as_str() {
            "tesseract" => Some(OcrProvider::Tesseract),
            "ollama" => Some(OcrProvider::Ollama),
            "" => None,
            other => {
                tracing::warn!("Ignoring unknown OCR provider: {}", other);
                None
            }
        })
        .collect()
}
