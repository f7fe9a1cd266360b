use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use crate::provider::UpdateError;

const CHUNK_SIZE: usize = 64 * 1024;

/// SHA-256 of a file's content as 64 lower-case hex characters.
///
/// The file is streamed in fixed-size chunks. Cancellation is observed
/// between chunks and while waiting on a read.
pub async fn sha256_file(path: &Path, cancel: &CancellationToken) -> Result<String, UpdateError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| UpdateError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0_u8; CHUNK_SIZE];

    loop {
        let read = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(UpdateError::Cancelled),
            read = file.read(&mut buffer) => read.map_err(|e| UpdateError::io(path, e))?,
        };
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
