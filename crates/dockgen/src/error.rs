/// Failure categories of a dockgen run.
///
/// Every stage maps its failures into one variant; the entry point reports
/// them all the same way.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Fetch(_) => "fetch",
            Error::Generation(_) => "generation",
            Error::Io(_) => "io",
        }
    }
}
