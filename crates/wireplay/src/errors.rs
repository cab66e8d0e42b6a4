use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireplayError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("record predicate error: {0}")]
    Predicate(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("mock server error: {0}")]
    Server(String),
    #[error("lifecycle hook error: {0}")]
    Hook(String),
}
