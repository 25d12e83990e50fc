//! Clarifai integration, proxying OpenAI's DALL·E 3, GPT-4 Vision and TTS
//! community models.

mod client;
mod dto;

pub use client::{CLARIFAI_BASE_URL, ClarifaiClient, ClarifaiModel};
pub use dto::{
    ClarifaiData, ClarifaiInput, ClarifaiMedia, ClarifaiOutput, ClarifaiRequest, ClarifaiResponse,
    ClarifaiStatus, ClarifaiText,
};
