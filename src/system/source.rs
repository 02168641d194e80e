use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use super::error::SampleError;

/// Byte-level access to the kernel's counter files.
///
/// Paths are relative to the source root, e.g. `"stat"` or `"1234/statm"`.
pub trait CounterSource {
    fn read(&self, relative: &str) -> Result<String, SampleError>;

    /// Numeric entries of the root directory, i.e. the live process ids.
    fn list_pids(&self) -> Result<Vec<u32>, SampleError>;
}

impl<T: CounterSource + ?Sized> CounterSource for Box<T> {
    fn read(&self, relative: &str) -> Result<String, SampleError> {
        (**self).read(relative)
    }

    fn list_pids(&self) -> Result<Vec<u32>, SampleError> {
        (**self).list_pids()
    }
}

/// The real `/proc` filesystem, or any directory laid out like it.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl CounterSource for ProcFs {
    fn read(&self, relative: &str) -> Result<String, SampleError> {
        let path = self.root.join(relative);
        fs::read_to_string(&path).map_err(|source| SampleError::SourceUnavailable { path, source })
    }

    fn list_pids(&self) -> Result<Vec<u32>, SampleError> {
        let entries = fs::read_dir(&self.root).map_err(|source| SampleError::ProcessListing {
            path: self.root.clone(),
            source,
        })?;

        let mut pids: Vec<u32> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }
}

/// In-memory counter files, for replaying captured `/proc` content.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    files: HashMap<String, String>,
    pids: Option<Vec<u32>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, relative: &str, content: &str) -> Self {
        self.files.insert(relative.to_string(), content.to_string());
        self
    }

    /// Without a pid list, listing fails as if the process root were unreadable.
    pub fn with_pids(mut self, pids: &[u32]) -> Self {
        self.pids = Some(pids.to_vec());
        self
    }
}

impl CounterSource for StaticSource {
    fn read(&self, relative: &str) -> Result<String, SampleError> {
        self.files
            .get(relative)
            .cloned()
            .ok_or_else(|| SampleError::SourceUnavailable {
                path: PathBuf::from(relative),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }

    fn list_pids(&self) -> Result<Vec<u32>, SampleError> {
        self.pids.clone().ok_or_else(|| SampleError::ProcessListing {
            path: PathBuf::from("<static>"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}
