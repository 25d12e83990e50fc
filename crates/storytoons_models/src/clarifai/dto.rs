//! Clarifai `outputs` endpoint payloads.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status code Clarifai uses for a successful prediction.
pub(crate) const STATUS_SUCCESS: u32 = 10000;

/// Text payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ClarifaiText {
    /// Raw text
    #[serde(default)]
    raw: String,
}

/// Base64 media payload (image or audio).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ClarifaiMedia {
    /// Base64-encoded bytes
    #[serde(default)]
    base64: String,
}

/// Data attached to an input or output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ClarifaiData {
    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<ClarifaiText>,
    /// Image content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<ClarifaiMedia>,
    /// Audio content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio: Option<ClarifaiMedia>,
}

/// One prediction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ClarifaiInput {
    /// Input data
    data: ClarifaiData,
}

impl ClarifaiInput {
    /// A text input.
    pub fn text(raw: impl Into<String>) -> Self {
        Self {
            data: ClarifaiData {
                text: Some(ClarifaiText { raw: raw.into() }),
                ..ClarifaiData::default()
            },
        }
    }
}

/// Prediction request with inference parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct ClarifaiRequest {
    /// Inputs to predict on
    inputs: Vec<ClarifaiInput>,
    /// Model version overrides carrying the inference params
    model: Value,
}

impl ClarifaiRequest {
    /// A single text input with the given inference params.
    pub fn text(raw: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            inputs: vec![ClarifaiInput::text(raw)],
            model: serde_json::json!({
                "model_version": {
                    "output_info": {
                        "params": params,
                    }
                }
            }),
        }
    }

    /// Inference params carried by the request.
    pub fn params(&self) -> Option<&Map<String, Value>> {
        self.model
            .pointer("/model_version/output_info/params")
            .and_then(Value::as_object)
    }
}

/// API status block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ClarifaiStatus {
    /// Numeric status code
    code: u32,
    /// Short description
    #[serde(default)]
    description: String,
    /// Longer details, when present
    #[serde(default)]
    details: Option<String>,
}

impl ClarifaiStatus {
    /// Whether the prediction succeeded.
    pub fn is_success(&self) -> bool {
        self.code == STATUS_SUCCESS
    }

    /// Codes in the 11xxx range report account and credential problems.
    pub fn is_authorization(&self) -> bool {
        (11000..12000).contains(&self.code)
    }

    /// Description plus details, for error messages.
    pub fn message(&self) -> String {
        match &self.details {
            Some(details) if !details.is_empty() => {
                format!("{} ({}): {}", self.description, self.code, details)
            }
            _ => format!("{} ({})", self.description, self.code),
        }
    }
}

/// One prediction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ClarifaiOutput {
    /// Per-output status
    #[serde(default)]
    status: Option<ClarifaiStatus>,
    /// Output data
    #[serde(default)]
    data: ClarifaiData,
}

/// Prediction response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ClarifaiResponse {
    /// Request-level status
    status: ClarifaiStatus,
    /// Outputs, one per input
    #[serde(default)]
    outputs: Vec<ClarifaiOutput>,
}

impl ClarifaiResponse {
    /// Data of the first output.
    pub fn first_data(&self) -> Option<&ClarifaiData> {
        self.outputs.first().map(ClarifaiOutput::data)
    }
}
