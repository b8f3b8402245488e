#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("missing form field: {0}")]
    MissingField(&'static str),
}
