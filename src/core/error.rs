use thiserror::Error;

#[derive(Error, Debug)]
pub enum TacticsError {
    #[error("Definition not found: {0}")]
    DefinitionNotFound(String),

    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TacticsError>;
