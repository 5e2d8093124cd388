use futures::task::SpawnError;
use scrollwise::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The host executor refused the fetch task (typically because it is shutting down).
    #[error("failed to spawn page fetch: {0}")]
    Spawn(#[from] SpawnError),
}
