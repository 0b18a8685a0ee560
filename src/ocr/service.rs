//! OCR Service
//!
//! Orchestrates OCR providers and bounds each recognition with a timeout.

use std::sync::Arc;
use std::time::Duration;

use super::{
    provider::{OcrProviderTrait, OllamaProvider, TesseractProvider},
    types::{OcrError, OcrProvider, OcrResult},
};
use crate::config::OcrConfig;

/// OCR service for uploaded images
#[derive(Clone)]
pub struct OcrService {
    providers: Vec<Arc<dyn OcrProviderTrait>>,
    language: String,
    timeout: Duration,
}

impl OcrService {
    /// Create a service with the providers named in the configuration
    pub fn from_config(config: &OcrConfig) -> Self {
        let providers = config
            .providers
            .iter()
            .map(|provider| -> Arc<dyn OcrProviderTrait> {
                match provider {
                    OcrProvider::Tesseract => Arc::new(TesseractProvider::new(&config.tesseract_path)),
                    OcrProvider::Ollama => {
                        Arc::new(OllamaProvider::new(&config.ollama_url, &config.ollama_model))
                    }
                }
            })
            .collect();

        Self::with_providers(providers, &config.language, config.timeout())
    }

    /// Create a service over explicit providers
    pub fn with_providers(
        providers: Vec<Arc<dyn OcrProviderTrait>>,
        language: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            providers,
            language: language.to_string(),
            timeout,
        }
    }

    /// Get available providers
    pub async fn available_providers(&self) -> Vec<OcrProvider> {
        let mut available = Vec::new();
        for provider in &self.providers {
            if provider.is_available().await {
                available.push(provider.provider_type());
            }
        }
        available
    }

    /// Recognize text in an image, giving up after the configured timeout
    pub async fn recognize(&self, image_data: &[u8]) -> Result<OcrResult, OcrError> {
        match tokio::time::timeout(self.timeout, self.recognize_with_fallback(image_data)).await {
            Ok(result) => result,
            Err(_) => Err(OcrError::Timeout(self.timeout.as_secs())),
        }
    }

    async fn recognize_with_fallback(&self, image_data: &[u8]) -> Result<OcrResult, OcrError> {
        let mut last_error = None;

        // Try providers in order
        for provider in &self.providers {
            if !provider.is_available().await {
                tracing::debug!("OCR provider {:?} is not available", provider.provider_type());
                continue;
            }

            tracing::debug!(
                provider = ?provider.provider_type(),
                bytes = image_data.len(),
                "Starting OCR processing"
            );

            match provider.recognize(image_data, &self.language).await {
                Ok(result) => {
                    tracing::debug!(
                        provider = ?result.provider,
                        chars = result.text.len(),
                        "OCR processing completed"
                    );
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(
                        "OCR provider {:?} failed: {}, trying next",
                        provider.provider_type(),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            OcrError::ProviderNotAvailable("No OCR providers available".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::provider::MockProvider;

    fn mock(provider: OcrProvider, available: bool, outcome: Result<&str, &str>) -> Arc<dyn OcrProviderTrait> {
        Arc::new(MockProvider {
            provider,
            available,
            outcome: outcome.map(str::to_string).map_err(str::to_string),
            delay: None,
        })
    }

    #[test]
    fn test_from_config_builds_configured_providers() {
        let config = OcrConfig {
            providers: vec![OcrProvider::Ollama, OcrProvider::Tesseract],
            ..OcrConfig::default()
        };
        let service = OcrService::from_config(&config);

        let kinds: Vec<_> = service.providers.iter().map(|p| p.provider_type()).collect();
        assert_eq!(kinds, vec![OcrProvider::Ollama, OcrProvider::Tesseract]);
        assert_eq!(service.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_skips_unavailable_provider() {
        let service = OcrService::with_providers(
            vec![
                mock(OcrProvider::Tesseract, false, Ok("wrong")),
                mock(OcrProvider::Ollama, true, Ok("hello")),
            ],
            "eng",
            Duration::from_secs(5),
        );

        let result = service.recognize(b"img").await.unwrap();
        assert_eq!(result.text, "hello");
        assert_eq!(result.provider, OcrProvider::Ollama);
        assert_eq!(service.available_providers().await, vec![OcrProvider::Ollama]);
    }

    #[tokio::test]
    async fn test_falls_back_after_failure() {
        let service = OcrService::with_providers(
            vec![
                mock(OcrProvider::Tesseract, true, Err("bad image")),
                mock(OcrProvider::Ollama, true, Ok("second try")),
            ],
            "eng",
            Duration::from_secs(5),
        );

        assert_eq!(service.recognize(b"img").await.unwrap().text, "second try");
    }

    #[tokio::test]
    async fn test_reports_last_failure() {
        let service = OcrService::with_providers(
            vec![mock(OcrProvider::Tesseract, true, Err("bad image"))],
            "eng",
            Duration::from_secs(5),
        );

        let err = service.recognize(b"img").await.unwrap_err();
        assert!(matches!(err, OcrError::ProcessingError(ref m) if m == "bad image"));
    }

    #[tokio::test]
    async fn test_no_providers() {
        let service = OcrService::with_providers(vec![], "eng", Duration::from_secs(5));
        let err = service.recognize(b"img").await.unwrap_err();
        assert!(matches!(err, OcrError::ProviderNotAvailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let slow: Arc<dyn OcrProviderTrait> = Arc::new(MockProvider {
            provider: OcrProvider::Tesseract,
            available: true,
            outcome: Ok("too late".to_string()),
            delay: Some(Duration::from_secs(60)),
        });
        let service = OcrService::with_providers(vec![slow], "eng", Duration::from_secs(30));

        let err = service.recognize(b"img").await.unwrap_err();
        assert!(matches!(err, OcrError::Timeout(30)));
    }
}
