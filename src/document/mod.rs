//! The single CAD document a server instance works on.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::dispatch::{self, Command, CommandError};
use crate::kernel::{GeometryKernel, MemoryKernel};
use crate::models::DocumentState;

/// Shared handle to one document and the kernel that owns it.
///
/// Cloning is cheap and every clone sees the same document. Commands are
/// serialized: each one holds the lock from resolution through mutation.
#[derive(Clone)]
pub struct Document {
    kernel: Arc<Mutex<Box<dyn GeometryKernel>>>,
}

impl Document {
    pub fn new(kernel: impl GeometryKernel + 'static) -> Self {
        let kernel: Box<dyn GeometryKernel> = Box::new(kernel);
        Self {
            kernel: Arc::new(Mutex::new(kernel)),
        }
    }

    /// Fresh in-memory document.
    pub fn open_memory() -> Self {
        Self::new(MemoryKernel::new())
    }

    /// Fresh in-memory document exporting relative STL paths under `dir`.
    pub fn with_export_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(MemoryKernel::with_export_dir(dir))
    }

    /// Kernel mutations are atomic; a panicked command leaves the last
    /// committed document, which later commands keep using.
    fn lock(&self) -> MutexGuard<'_, Box<dyn GeometryKernel>> {
        self.kernel.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovering document lock after a panicked command");
            self.kernel.clear_poison();
            PoisonError::into_inner(poisoned)
        })
    }

    pub fn execute(&self, command: &Command) -> Result<String, CommandError> {
        let mut kernel = self.lock();
        dispatch::dispatch(&mut **kernel, command)
    }

    pub fn execute_json(&self, value: Value) -> Result<String, CommandError> {
        let command = Command::from_json(value)?;
        self.execute(&command)
    }

    /// Parse and execute a raw request body.
    pub fn execute_bytes(&self, body: &[u8]) -> Result<String, CommandError> {
        let command = Command::from_slice(body)?;
        self.execute(&command)
    }

    /// Copy of the current document contents.
    pub fn snapshot(&self) -> DocumentState {
        self.lock().state().clone()
    }
}
