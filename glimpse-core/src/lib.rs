pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod session;

pub use client::{
    ApiError, CollectorBackend, EndGameRequest, HttpCollectorClient, RecordTurnRequest,
    StartGameResponse,
};
pub use config::GlimpseConfig;
pub use error::GlimpseError;
pub use models::belief::{Belief, NUM_CLASSES};
pub use models::puzzle::{Mask, PixelGrid};
pub use models::turn::{Trajectory, TurnRecord};
pub use session::{GameSession, Phase, SessionController};
