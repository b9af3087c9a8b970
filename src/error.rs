use thiserror::Error;

/// Rejected board configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Board side length must be at least 1.
    #[error("board size must be at least 1")]
    SizeZero,
    /// Seeding density must lie in [0, 1].
    #[error("density {0} is outside [0, 1]")]
    DensityOutOfRange(f64),
    /// Delay between generations must be non-zero.
    #[error("delay between generations must be non-zero")]
    DelayZero,
}

/// Failures while loading a pattern file.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern file could not be read.
    #[error("unreadable pattern: {0}")]
    Unreadable(#[from] std::io::Error),
    /// The pattern does not fit on the configured board.
    #[error("pattern needs a {required}x{required} board, only got {size}x{size}")]
    TooLarge { required: usize, size: usize },
}
