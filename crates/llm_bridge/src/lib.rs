//! LLM Bridge for Ollama integration
//!
//! Provides a vision-model OCR engine backed by a local Ollama server, as an
//! alternative to Tesseract for reading roster photos.
//!
//! Copyright (c) 2025 Michael A Wright

pub mod ollama;
pub mod vision;

pub use ollama::{OllamaClient, OllamaConfig};
pub use vision::VisionOcr;
