//! OCR module
//!
//! The OCR engine is a collaborator: it takes an already preprocessed roster
//! photo and returns newline separated text. Engines implement [`OcrEngine`];
//! a Tesseract engine (via leptess) is available behind the `tesseract`
//! feature, and `llm_bridge` provides a vision model engine.

use anyhow::Result;
use async_trait::async_trait;

/// Language hint for mixed Arabic/Latin rosters, in Tesseract notation
pub const LANGUAGE_HINT: &str = "ara+eng";

/// A text recognizer for roster images
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Transcribe an encoded image (PNG, JPEG, ...) into raw text
    ///
    /// # Arguments
    /// * `image` - Encoded image bytes
    /// * `languages` - Language hint such as [`LANGUAGE_HINT`]
    async fn recognize(&self, image: &[u8], languages: &str) -> Result<String>;
}

#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;

#[cfg(feature = "tesseract")]
mod tesseract {
    use super::OcrEngine;
    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use leptess::LepTess;
    use tracing::debug;

    /// Tesseract OCR through leptess
    ///
    /// Requires the Tesseract language data for every language in the hint
    /// (`ara.traineddata` and `eng.traineddata` for the default). leptess is
    /// blocking, so recognition runs on tokio's blocking thread pool and
    /// must be called from within a tokio runtime.
    #[derive(Debug, Clone, Default)]
    pub struct TesseractEngine {
        /// Tessdata directory; `None` uses the system default
        pub data_path: Option<String>,
    }

    impl TesseractEngine {
        pub fn new(data_path: Option<String>) -> Self {
            Self { data_path }
        }
    }

    fn run_tesseract(data_path: Option<&str>, image: &[u8], languages: &str) -> Result<String> {
        let mut tesseract = LepTess::new(data_path, languages)
            .context("Failed to initialize Tesseract. Is Tesseract installed?")?;

        tesseract
            .set_image_from_mem(image)
            .context("Failed to load image into Tesseract")?;

        tesseract
            .get_utf8_text()
            .context("Tesseract failed to extract text from image")
    }

    #[async_trait]
    impl OcrEngine for TesseractEngine {
        async fn recognize(&self, image: &[u8], languages: &str) -> Result<String> {
            let data_path = self.data_path.clone();
            let image = image.to_vec();
            let hint = languages.to_string();

            let text = tokio::task::spawn_blocking(move || {
                run_tesseract(data_path.as_deref(), &image, &hint)
            })
            .await
            .context("Tesseract worker panicked")??;

            debug!(chars = text.len(), languages, "tesseract finished");
            Ok(text)
        }
    }
}
