#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// No usable rendering context. The component degrades to drawing nothing.
    #[error("rendering surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("window error: {0}")]
    Window(String),

    #[error("logger setup failed: {0}")]
    Logger(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<minifb::Error> for FieldError {
    fn from(err: minifb::Error) -> Self {
        FieldError::Window(err.to_string())
    }
}

impl From<log::SetLoggerError> for FieldError {
    fn from(err: log::SetLoggerError) -> Self {
        FieldError::Logger(err.to_string())
    }
}
