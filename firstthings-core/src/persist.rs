//! Persistence boundary
//!
//! The core never touches the filesystem. It hands a complete serialized
//! graph to a `Persistence` implementation and reads one back.

use std::io;

/// Stores and retrieves the whole data graph as one opaque blob
pub trait Persistence {
    /// Read the stored blob, `None` when nothing has been saved yet
    fn read_blob(&self) -> io::Result<Option<String>>;

    /// Replace the stored blob with `blob`
    fn write_blob(&mut self, blob: &str) -> io::Result<()>;
}

/// In-memory persistence for tests and embedding
#[derive(Debug, Default, Clone)]
pub struct MemoryPersistence {
    blob: Option<String>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-existing blob
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            ..Self::default()
        }
    }

    /// Make every write fail, for exercising error paths
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Persistence for MemoryPersistence {
    fn read_blob(&self) -> io::Result<Option<String>> {
        Ok(self.blob.clone())
    }

    fn write_blob(&mut self, blob: &str) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::other("write rejected"));
        }
        self.blob = Some(blob.to_string());
        self.writes += 1;
        Ok(())
    }
}
