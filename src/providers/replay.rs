//! File-backed record source

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::file::{FileReader, ScanStats, Scanned};
use crate::provider::RecordSource;

/// Records decoded between cooperative yields to the runtime.
const YIELD_EVERY: usize = 256;

/// Replays a record or MMI file through the [`RecordSource`] interface.
pub struct FileSource {
    reader: FileReader,
    path: PathBuf,
    emitted: usize,
}

impl FileSource {
    /// Read `path` asynchronously and prepare it for scanning.
    ///
    /// The file family is taken from `config.profile`.
    pub async fn open<P: AsRef<Path>>(path: P, config: ScanConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data =
            tokio::fs::read(&path).await.map_err(|e| Error::file_error(path.clone(), e))?;
        info!(
            path = %path.display(),
            bytes = data.len(),
            profile = ?config.profile,
            "Opened file source"
        );
        Ok(Self { reader: FileReader::from_bytes(data, config), path, emitted: 0 })
    }

    /// Scan an in-memory buffer.
    pub fn from_bytes(data: impl Into<Vec<u8>>, config: ScanConfig) -> Self {
        Self {
            reader: FileReader::from_bytes(data, config),
            path: PathBuf::from("<memory>"),
            emitted: 0,
        }
    }

    pub fn stats(&self) -> ScanStats {
        self.reader.stats()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl RecordSource for FileSource {
    async fn next_record(&mut self) -> Result<Option<Scanned>> {
        if self.emitted > 0 && self.emitted % YIELD_EVERY == 0 {
            tokio::task::yield_now().await;
        }

        let item = self.reader.next_item()?;
        match &item {
            Some(_) => self.emitted += 1,
            None => {
                debug!(path = %self.path.display(), stats = ?self.stats(), "File source exhausted")
            }
        }
        Ok(item)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
