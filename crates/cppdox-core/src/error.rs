/// Unified error type for cppdox.
#[derive(Debug, thiserror::Error)]
pub enum CppdoxError {
    #[error("Compilation database error: {0}")]
    CompileDb(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
