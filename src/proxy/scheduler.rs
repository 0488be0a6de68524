//! Owns the fixed-width thread pool that fans accepted connections out to
//! [`RequestHandler`]. Grounded on
//! `original_source/assign7/scheduler.cc`: the scheduler's only job is to
//! hand each accepted connection to the request handler and make sure a
//! failure in that call never takes down the accept loop.

use std::io::{Read, Write};
use std::sync::Arc;

use crate::pool::ThreadPool;
use crate::proxy::request_handler::RequestHandler;

/// Default worker count, matching the width used throughout the spec.
pub const DEFAULT_WORKERS: usize = 64;

/// Fans accepted connections out across a fixed pool of workers.
pub struct Scheduler {
    pool: ThreadPool,
    handler: Arc<RequestHandler>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").field("pool", &self.pool).finish()
    }
}

impl Scheduler {
    /// Builds a scheduler backed by a pool of `workers` threads.
    pub fn new(handler: Arc<RequestHandler>, workers: usize) -> Self {
        Scheduler {
            pool: ThreadPool::new(workers),
            handler,
        }
    }

    /// Configures an upstream proxy on the underlying request handler.
    /// Must be called before accepting traffic.
    pub fn set_proxy(&self, host: impl Into<String>, port: u16) {
        self.handler.set_proxy(host, port);
    }

    /// Submits one accepted connection as a single unit of work. Any
    /// panic inside request servicing is caught so it can never take a
    /// worker thread down; the connection is simply dropped.
    pub fn schedule_request<S>(&self, mut stream: S, client_ip: String)
    where
        S: Read + Write + Send + 'static,
    {
        let handler = Arc::clone(&self.handler);
        self.pool.schedule(move || {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler.service_request(&mut stream, &client_ip);
            }));
            if result.is_err() {
                tracing::error!(client = client_ip.as_str(), "request handler panicked");
            }
        });
    }

    /// Blocks until every currently-scheduled connection has finished.
    pub fn wait(&self) {
        self.pool.wait();
    }
}
