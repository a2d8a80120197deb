use std::path::Path;
use crate::errors::FairwayError;

/// Write to a temp file, then rename, so readers never see a partial file.
pub async fn atomic_write(path: &Path, content: &[u8]) -> Result<(), FairwayError> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
