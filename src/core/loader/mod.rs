//=========================================================================
// Resource Loading Contract
//=========================================================================
//
// What the engine core needs from an asset loader: asynchronous loads that
// hand back a handle immediately, and byte-level progress that the owner
// thread can poll without blocking.
//
// Architecture:
//   LoaderFactory ──create(namespace)──> Arc<dyn ResourceLoader>
//                                          ├─ load(request) → ResourceHandle
//                                          └─ progress()    → LoaderProgress
//
// Every engine context gets a fresh loader scoped to its scene; the swap
// protocol treats `bytes_read == bytes_total` as "resources are in".
//
// Components:
// - `file_loader`: background-thread loader reading from a directory
//
//=========================================================================

//=== Module Declarations =================================================

mod file_loader;

//=== External Dependencies ===============================================

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

//=== Public API ==========================================================

pub use file_loader::{FileLoader, FileLoaderFactory};

//=== ResourceKind ========================================================

/// Broad category of a resource, used by loaders for routing and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Model,
    Texture,
    Audio,
    Shader,
    Font,
    Raw,
}

//=== ResourceRequest =====================================================

/// A resource to load, relative to the loader's root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRequest {
    pub kind: ResourceKind,
    pub path: PathBuf,
}

impl ResourceRequest {
    pub fn new(kind: ResourceKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

//=== LoaderProgress ======================================================

/// Byte counters of a loader.
///
/// `bytes_total` grows as requests are accepted; `bytes_read` catches up
/// as they finish (successfully or not).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderProgress {
    pub bytes_read: u64,
    pub bytes_total: u64,
}

impl LoaderProgress {
    /// True once every accepted byte has been accounted for.
    pub fn is_complete(&self) -> bool {
        self.bytes_read == self.bytes_total
    }

    /// Completion in `[0, 1]`; an idle loader reports `1.0`.
    pub fn fraction(&self) -> f64 {
        if self.bytes_total == 0 {
            1.0
        } else {
            self.bytes_read as f64 / self.bytes_total as f64
        }
    }
}

//=== LoadError ===========================================================

/// Why a resource failed to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Reading the file failed.
    Io {
        path: PathBuf,
        kind: io::ErrorKind,
        message: String,
    },

    /// The loader's worker is gone; the request was never processed.
    WorkerStopped(PathBuf),
}

impl LoadError {
    pub(crate) fn io(path: &Path, err: &io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message, .. } => {
                write!(f, "Failed to read {}: {}", path.display(), message)
            }
            Self::WorkerStopped(path) => {
                write!(f, "Loader worker stopped before {} was read", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {}

//=== ResourceHandle ======================================================

#[derive(Debug)]
enum HandleState {
    Loading,
    Ready(Arc<[u8]>),
    Failed(LoadError),
}

#[derive(Debug)]
struct HandleInner {
    request: ResourceRequest,
    state: RwLock<HandleState>,
}

/// Shared view of an in-flight or finished load.
///
/// Cloning is cheap; every clone observes the same completion.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    inner: Arc<HandleInner>,
}

impl ResourceHandle {
    /// A handle in the loading state. Loaders complete it with
    /// [`ResourceHandle::fulfill`] or [`ResourceHandle::fail`].
    pub fn pending(request: ResourceRequest) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                request,
                state: RwLock::new(HandleState::Loading),
            }),
        }
    }

    pub fn request(&self) -> &ResourceRequest {
        &self.inner.request
    }

    //--- Completion -------------------------------------------------------

    pub fn fulfill(&self, bytes: Vec<u8>) {
        *self.inner.state.write() = HandleState::Ready(bytes.into());
    }

    pub fn fail(&self, error: LoadError) {
        *self.inner.state.write() = HandleState::Failed(error);
    }

    //--- Queries ----------------------------------------------------------

    /// Loaded successfully and usable.
    pub fn is_ready(&self) -> bool {
        matches!(*self.inner.state.read(), HandleState::Ready(_))
    }

    /// No longer loading, whatever the outcome.
    pub fn is_finished(&self) -> bool {
        !matches!(*self.inner.state.read(), HandleState::Loading)
    }

    /// The loaded bytes, once ready.
    pub fn bytes(&self) -> Option<Arc<[u8]>> {
        match &*self.inner.state.read() {
            HandleState::Ready(bytes) => Some(Arc::clone(bytes)),
            _ => None,
        }
    }

    /// The failure, if the load failed.
    pub fn error(&self) -> Option<LoadError> {
        match &*self.inner.state.read() {
            HandleState::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }
}

//=== Loader Traits =======================================================

/// Asynchronous, progress-reporting resource cache.
pub trait ResourceLoader: Send + Sync {
    /// Name this loader's cache is scoped to (the scene identifier).
    fn namespace(&self) -> &str;

    /// Current byte counters. Must not block on I/O.
    fn progress(&self) -> LoaderProgress;

    /// Starts loading `request` and returns immediately.
    fn load(&self, request: ResourceRequest) -> ResourceHandle;
}

/// Builds a fresh loader for each engine context.
pub trait LoaderFactory: Send + Sync {
    fn create(&self, namespace: &str) -> Arc<dyn ResourceLoader>;
}

//=========================================================================
// Unit Tests
//=========================================================================
