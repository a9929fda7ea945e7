use road_common::ConfigError;
use road_stream::StreamError;

/// Errors raised while loading a scene or building its session.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scene file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("world {world:?}: {source}")]
    Stream {
        world: String,
        #[source]
        source: StreamError,
    },
}
