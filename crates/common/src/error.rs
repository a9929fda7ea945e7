/// Configuration errors raised while building planners, pools and clocks.
///
/// These are construction-time failures: the object being built is never
/// returned in a half-valid state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("options length {options} must match weights length {weights}")]
    LengthMismatch { options: usize, weights: usize },
    #[error("invalid weight {token:?} at position {position}")]
    InvalidWeight { token: String, position: usize },
    #[error("weights sum to zero; nothing can be chosen")]
    EmptyPool,
    #[error("weights sum to {total}, above the limit of {max}")]
    WeightTooLarge { total: u64, max: u64 },
    #[error("{name} must be at least {min}, got {value}")]
    InvalidDimension {
        name: &'static str,
        value: usize,
        min: usize,
    },
    #[error("{name} must be positive and finite")]
    NonPositive { name: &'static str },
}
