use serde::{Deserialize, Serialize};

/// Frame message published to the inference service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMessage {
    #[serde(rename = "type")]
    pub kind: String,
    /// Base64 data URI of the JPEG frame (`data:image/jpeg;base64,...`)
    pub image: String,
    /// Epoch milliseconds at capture-loop tick time
    pub timestamp: i64,
}

impl FrameMessage {
    pub fn new(image: String, timestamp: i64) -> Self {
        Self {
            kind: "frame".to_string(),
            image,
            timestamp,
        }
    }
}

/// Detection event received from the inference service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DetectionMessage {
    /// A classified punch. The label is kept as a string on the wire;
    /// unknown labels are dropped at aggregation time, not parse time.
    #[serde(rename = "punch")]
    Punch {
        #[serde(rename = "punchType")]
        punch_type: String,
        confidence: f32,
    },

    /// Frame processed, nothing detected
    #[serde(rename = "no_punch")]
    NoPunch {
        #[serde(default)]
        timestamp: Option<i64>,
    },
}
