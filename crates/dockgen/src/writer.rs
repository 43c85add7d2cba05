use crate::prelude::*;
use std::path::Path;

/// Default output path, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "Dockerfile";

/// Write the artifact to `path`, replacing whatever was there
pub async fn write_artifact(path: &Path, artifact: &str) -> Result<(), Error> {
    tokio::fs::write(path, artifact).await?;
    log::debug!("Wrote {} bytes to {}", artifact.len(), path.display());
    Ok(())
}
