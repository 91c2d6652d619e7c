use thiserror::Error;

use crate::session::Phase;

#[derive(Error, Debug)]
pub enum GlimpseError {
    #[error("Malformed puzzle: {pixels} pixels is not a non-empty square grid")]
    MalformedPuzzle { pixels: usize },

    #[error("Cell ({row}, {col}) is outside the {side}x{side} grid")]
    OutOfBounds { row: usize, col: usize, side: usize },

    #[error("Cell ({row}, {col}) is already revealed")]
    AlreadyRevealed { row: usize, col: usize },

    #[error("No pixel selected")]
    NoSelection,

    #[error("Reasoning text is empty")]
    EmptyReasoning,

    #[error("Unknown digit class {class}")]
    UnknownClass { class: usize },

    #[error("Weight {value} is not a finite value in [0, 1]")]
    InvalidWeight { value: f64 },

    #[error("Edit would zero out every belief weight")]
    ZeroBelief,

    #[error("Operation requires the {expected:?} phase, session is {actual:?}")]
    Phase { expected: Phase, actual: Phase },

    #[error("Collection service error: {0}")]
    Api(#[from] crate::client::ApiError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
