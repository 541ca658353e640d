//=========================================================================
// File Loader
//=========================================================================
//
// Directory-backed `ResourceLoader` with one background worker thread.
//
// Architecture:
// ```text
//  Caller thread                         Worker thread
//  load(request)                         for job in jobs:
//    ├─ cache hit → clone handle           stat file, bytes_total += size
//    ├─ in_flight += 1                     fs::read(root/path)
//    └─ jobs.send(job) ───channel────►     handle.fulfill / fail
//                                          bytes_read += size
//                                          in_flight -= 1
// ```
//
// `load` never touches the filesystem. A job counts as in flight from the
// moment its handle enters the cache until the worker has finished it and
// settled both byte counters, and `progress()` reports one outstanding
// byte per in-flight job. A complete progress report therefore implies
// every handle handed out so far is finished. Dropping the loader closes
// the channel; the worker drains what is queued and exits.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, SendError, Sender};
use log::{debug, trace, warn};
use parking_lot::Mutex;

//=== Internal Dependencies ===============================================

use super::{
    LoadError, LoaderFactory, LoaderProgress, ResourceHandle, ResourceLoader, ResourceRequest,
};

//=== Internal Types ======================================================

struct Job {
    path: PathBuf,
    handle: ResourceHandle,
}

#[derive(Default)]
struct Counters {
    read: AtomicU64,
    total: AtomicU64,
    in_flight: AtomicU64,
}

//=== FileLoader ==========================================================

/// Loads files under a root directory on a background thread.
pub struct FileLoader {
    namespace: String,
    root: PathBuf,
    cache: Mutex<HashMap<ResourceRequest, ResourceHandle>>,
    counters: Arc<Counters>,
    jobs: Sender<Job>,
}

impl FileLoader {
    /// Creates a loader for `namespace` reading from `root` and starts its
    /// worker thread.
    pub fn new(namespace: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let (loader, receiver) = Self::unstarted(namespace, root);

        {
            let counters = Arc::clone(&loader.counters);
            let namespace = loader.namespace.clone();
            thread::spawn(move || Self::worker(&namespace, receiver, &counters));
        }

        debug!(target: "loader", "File loader '{}' started", loader.namespace);
        loader
    }

    /// Builds the loader and its job queue without a worker attached.
    fn unstarted(namespace: impl Into<String>, root: impl Into<PathBuf>) -> (Self, Receiver<Job>) {
        let (jobs, receiver) = unbounded();
        let loader = Self {
            namespace: namespace.into(),
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
            counters: Arc::new(Counters::default()),
            jobs,
        };
        (loader, receiver)
    }

    fn worker(namespace: &str, receiver: Receiver<Job>, counters: &Counters) {
        for job in receiver.iter() {
            Self::run_job(namespace, &job, counters);
            counters.in_flight.fetch_sub(1, Ordering::AcqRel);
        }

        debug!(target: "loader", "File loader '{}' worker exiting", namespace);
    }

    fn run_job(namespace: &str, job: &Job, counters: &Counters) {
        let expected = match fs::metadata(&job.path) {
            Ok(meta) => meta.len(),
            Err(err) => {
                Self::fail_io(namespace, job, &err);
                return;
            }
        };
        counters.total.fetch_add(expected, Ordering::AcqRel);

        match fs::read(&job.path) {
            Ok(bytes) => {
                trace!(
                    target: "loader",
                    "[{}] Read {} ({} bytes)",
                    namespace,
                    job.path.display(),
                    bytes.len()
                );
                job.handle.fulfill(bytes);
            }
            Err(err) => Self::fail_io(namespace, job, &err),
        }
        counters.read.fetch_add(expected, Ordering::AcqRel);
    }

    fn fail_io(namespace: &str, job: &Job, err: &std::io::Error) {
        let error = LoadError::io(&job.path, err);
        warn!(target: "loader", "[{}] {}", namespace, error);
        job.handle.fail(error);
    }

    fn resolve(&self, request: &ResourceRequest) -> PathBuf {
        self.root.join(&request.path)
    }
}

impl ResourceLoader for FileLoader {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn progress(&self) -> LoaderProgress {
        // In-flight first: once it reads zero, every earlier job has
        // settled both counters. Read before total keeps read <= total.
        let in_flight = self.counters.in_flight.load(Ordering::Acquire);
        let bytes_read = self.counters.read.load(Ordering::Acquire);
        let bytes_total = self.counters.total.load(Ordering::Acquire);
        LoaderProgress {
            bytes_read,
            bytes_total: bytes_total.max(bytes_read) + in_flight,
        }
    }

    fn load(&self, request: ResourceRequest) -> ResourceHandle {
        let mut cache = self.cache.lock();
        if let Some(handle) = cache.get(&request) {
            return handle.clone();
        }

        let path = self.resolve(&request);
        let handle = ResourceHandle::pending(request.clone());
        cache.insert(request, handle.clone());
        self.counters.in_flight.fetch_add(1, Ordering::AcqRel);
        drop(cache);

        let job = Job {
            path,
            handle: handle.clone(),
        };
        if let Err(SendError(job)) = self.jobs.send(job) {
            warn!(target: "loader", "[{}] Worker gone, dropping {}", self.namespace, job.path.display());
            job.handle.fail(LoadError::WorkerStopped(job.path.clone()));
            self.counters.in_flight.fetch_sub(1, Ordering::AcqRel);
        }

        handle
    }
}

//=== FileLoaderFactory ===================================================

/// Creates one [`FileLoader`] per context, all reading from `root`.
#[derive(Debug, Clone)]
pub struct FileLoaderFactory {
    root: PathBuf,
}

impl FileLoaderFactory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LoaderFactory for FileLoaderFactory {
    fn create(&self, namespace: &str) -> Arc<dyn ResourceLoader> {
        Arc::new(FileLoader::new(namespace, self.root.clone()))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
