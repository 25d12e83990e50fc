//! Locally hosted model servers.
//!
//! Stable Diffusion checkpoints are served through the AUTOMATIC1111 WebUI
//! API and vision models through Ollama, so the pipeline can run without
//! any hosted provider.

mod ollama;
mod stable_diffusion;

pub use ollama::{DEFAULT_OLLAMA_MODEL, OLLAMA_BASE_URL, OllamaVision};
pub use stable_diffusion::{STABLE_DIFFUSION_BASE_URL, StableDiffusionClient, Txt2ImgRequest};
