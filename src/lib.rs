pub mod camera;
pub mod config;
pub mod http;
pub mod inference;
pub mod save;
pub mod session;
pub mod stats;
pub mod timer;

pub use camera::{CameraBackend, CameraFactory, CameraSource, SyntheticCamera, VideoFrame};
pub use config::Config;
pub use http::{create_router, AppState};
pub use inference::{ConnectionState, DetectionMessage, FrameMessage, FrameTransport, NatsTransport};
pub use save::{LeaderboardEntry, NatsScoreStore, SaveWorkflow, ScoreStore};
pub use session::{SessionConfig, SessionController, SessionEnd, SessionSnapshot, SessionStatus};
pub use stats::{PunchCategory, PunchStats, StatsAggregator};
pub use timer::{MatchTimer, TimerSnapshot};
