use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub camera: CameraProfile,
    pub inference: InferenceConfig,
    pub match_timer: MatchTimerConfig,
    pub leaderboard: LeaderboardConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Target capture profile for the camera device.
///
/// Ideal values are requested first; the backend may fall back as far as the
/// minimums before reporting the device as unusable.
#[derive(Debug, Clone, Deserialize)]
pub struct CameraProfile {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub ideal_frame_rate: u32,
    pub min_width: u32,
    pub min_height: u32,
    pub min_frame_rate: u32,
    /// JPEG quality (0-100) applied by the capture backend
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    pub nats_url: String,
    /// Subject prefix; frames go to `<prefix>.frames.<session_id>`,
    /// detections arrive on `<prefix>.detections.<session_id>`
    pub subject_prefix: String,
    pub frame_interval_ms: u64,
    pub confidence_threshold: f32,
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchTimerConfig {
    pub default_duration_secs: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardConfig {
    pub subject_prefix: String,
    pub top_limit: usize,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
