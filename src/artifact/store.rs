//! Artifact store - persists each iteration's code as its own file.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;

use crate::error::{AutocoderError, Result};

/// Durable, append-only storage for generated programs
pub trait ArtifactStore: Send + Sync {
    /// Start a new run. Artifacts saved afterwards never collide with an
    /// earlier run's artifacts.
    fn begin_run(&self) {}

    /// Persist `code` as the artifact for iteration `index` and return its location.
    ///
    /// Never overwrites an earlier artifact.
    fn save(&self, code: &str, index: u32) -> Result<PathBuf>;
}

/// Where the next artifact goes
#[derive(Debug, Clone, PartialEq, Eq)]
enum RunDir {
    /// No run started; write straight into the root directory
    Root,
    /// A run started but has not saved yet
    Pending,
    Claimed(PathBuf),
}

/// Writes `{prefix}_{index}.{extension}` files.
///
/// Each run gets its own `run_{timestamp}` directory under the root, claimed
/// on its first save, so rerunning into the same output directory is safe.
#[derive(Debug)]
pub struct FileArtifactStore {
    root: PathBuf,
    prefix: String,
    extension: String,
    run: Mutex<RunDir>,
}

impl FileArtifactStore {
    /// The directory is not touched until the first save.
    pub fn new(dir: impl AsRef<Path>, prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            root: dir.as_ref().to_path_buf(),
            prefix: prefix.into(),
            extension: extension.into(),
            run: Mutex::new(RunDir::Root),
        }
    }

    /// File name of the artifact for iteration `index`
    fn file_name(&self, index: u32) -> String {
        if self.extension.is_empty() {
            format!("{}_{}", self.prefix, index)
        } else {
            format!("{}_{}.{}", self.prefix, index, self.extension.trim_start_matches('.'))
        }
    }

    /// Directory for the current save, claiming a fresh run directory if needed
    fn target_dir(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|e| {
            AutocoderError::Persistence(format!("cannot create {}: {}", self.root.display(), e))
        })?;

        let mut run = self.run.lock().unwrap_or_else(|e| e.into_inner());
        match &*run {
            RunDir::Root => Ok(self.root.clone()),
            RunDir::Claimed(dir) => Ok(dir.clone()),
            RunDir::Pending => {
                let dir = claim_run_dir(&self.root)?;
                log::info!("Saving this run's artifacts under {}", dir.display());
                *run = RunDir::Claimed(dir.clone());
                Ok(dir)
            }
        }
    }
}

/// Create `run_{timestamp}` under `root`, adding a counter if it is taken
fn claim_run_dir(root: &Path) -> Result<PathBuf> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    for n in 1u32.. {
        let name = match n {
            1 => format!("run_{}", stamp),
            n => format!("run_{}_{}", stamp, n),
        };
        let dir = root.join(name);
        match fs::create_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(AutocoderError::Persistence(format!("cannot create {}: {}", dir.display(), e)));
            }
        }
    }
    Err(AutocoderError::Persistence(format!("no free run directory in {}", root.display())))
}

impl ArtifactStore for FileArtifactStore {
    fn begin_run(&self) {
        *self.run.lock().unwrap_or_else(|e| e.into_inner()) = RunDir::Pending;
    }

    fn save(&self, code: &str, index: u32) -> Result<PathBuf> {
        let path = self.target_dir()?.join(self.file_name(index));
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| AutocoderError::Persistence(format!("cannot create {}: {}", path.display(), e)))?;

        file.write_all(code.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| AutocoderError::Persistence(format!("cannot write {}: {}", path.display(), e)))?;

        log::info!("Saved iteration {} to {}", index, path.display());
        Ok(path)
    }
}
