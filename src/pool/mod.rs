//! A bounded, fixed-width thread pool built from a dispatcher/worker split.
//!
//! One dispatcher thread owns the job queue and hands each job off to an
//! idle worker; workers never contend on the queue themselves. This keeps
//! wake-ups targeted — one worker per job — and makes the quiescence
//! predicate a simple conjunction: queue empty and every slot available.
//!
//! Grounded on the C++ `ThreadPool` in the original assignment
//! (`thread-pool.h`/`thread-pool.cc`): same dispatcher/worker split, same
//! three-condvar protocol (`jobsLock`/`cvJobs`, `availableWorkersLock`/
//! `cvWorkers`, a per-worker signal), same wait-lock serializing
//! concurrent `wait()` callers against `schedule()`. The per-worker
//! signal is a bounded-1 `crossbeam_channel` here rather than a
//! hand-rolled semaphore, carrying either a job or a terminate sentinel.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};

/// A zero-argument, no-return unit of deferred work.
pub type Thunk = Box<dyn FnOnce() + Send + 'static>;

enum SlotMessage {
    Job(Thunk),
    Terminate,
}

struct Shared {
    jobs: Mutex<VecDeque<Thunk>>,
    jobs_cv: Condvar,
    available: Mutex<Vec<bool>>,
    workers_cv: Condvar,
    wait_lock: Mutex<()>,
    exit: AtomicBool,
    slots: Vec<Sender<SlotMessage>>,
}

impl Shared {
    fn available_count(available: &[bool]) -> usize {
        available.iter().filter(|a| **a).count()
    }
}

/// A fixed-width pool of worker threads fed by a single dispatcher.
pub struct ThreadPool {
    shared: Arc<Shared>,
    dispatcher: Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("size", &self.workers.len())
            .finish()
    }
}

impl ThreadPool {
    /// Constructs a pool with `size` worker threads. `size` must be at least 1.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "ThreadPool requires at least one worker");

        let mut slots = Vec::with_capacity(size);
        let mut receivers = Vec::with_capacity(size);
        for _ in 0..size {
            let (tx, rx) = bounded::<SlotMessage>(1);
            slots.push(tx);
            receivers.push(rx);
        }

        let shared = Arc::new(Shared {
            jobs: Mutex::new(VecDeque::new()),
            jobs_cv: Condvar::new(),
            available: Mutex::new(vec![true; size]),
            workers_cv: Condvar::new(),
            wait_lock: Mutex::new(()),
            exit: AtomicBool::new(false),
            slots,
        });

        let dispatcher = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("pool-dispatcher".into())
                .spawn(move || dispatcher_loop(shared))
                .expect("failed to spawn dispatcher thread")
        };

        let workers = receivers
            .into_iter()
            .enumerate()
            .map(|(id, rx)| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("pool-worker-{id}"))
                    .spawn(move || worker_loop(id, rx, shared))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        ThreadPool {
            shared,
            dispatcher: Some(dispatcher),
            workers,
        }
    }

    /// Enqueues `job` for execution on the next available worker. Returns
    /// immediately; never blocks on a worker being free.
    pub fn schedule(&self, job: impl FnOnce() + Send + 'static) {
        let _wait_guard = self.shared.wait_lock.lock().unwrap();
        let mut jobs = self.shared.jobs.lock().unwrap();
        jobs.push_back(Box::new(job));
        self.shared.jobs_cv.notify_all();
    }

    /// Blocks until the job queue is empty and every worker is idle.
    /// Concurrent calls to `wait()` are serialized against each other and
    /// against `schedule()`, so a submission that completes before `wait()`
    /// is called is guaranteed to be observed.
    pub fn wait(&self) {
        let _wait_guard = self.shared.wait_lock.lock().unwrap();

        let jobs = self.shared.jobs.lock().unwrap();
        let _jobs = self
            .jobs_cv_wait_empty(jobs)
            .expect("jobs mutex poisoned");

        let available = self.shared.available.lock().unwrap();
        let _available = self
            .shared
            .workers_cv
            .wait_while(available, |a| Shared::available_count(a) != a.len())
            .expect("available mutex poisoned");
    }

    fn jobs_cv_wait_empty<'a>(
        &'a self,
        jobs: std::sync::MutexGuard<'a, VecDeque<Thunk>>,
    ) -> Result<std::sync::MutexGuard<'a, VecDeque<Thunk>>, ()> {
        self.shared
            .jobs_cv
            .wait_while(jobs, |j| !j.is_empty())
            .map_err(|_| ())
    }

    /// Number of worker slots in this pool.
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.wait();
        self.shared.exit.store(true, Ordering::SeqCst);
        self.shared.jobs_cv.notify_all();
        for slot in &self.shared.slots {
            let _ = slot.send(SlotMessage::Terminate);
        }

        if let Some(handle) = self.dispatcher.take() {
            let _ = handle.join();
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn dispatcher_loop(shared: Arc<Shared>) {
    loop {
        {
            let jobs = shared.jobs.lock().unwrap();
            let jobs = shared
                .jobs_cv
                .wait_while(jobs, |j| j.is_empty() && !shared.exit.load(Ordering::SeqCst))
                .expect("jobs mutex poisoned");

            if jobs.is_empty() {
                return; // exit flag set, queue drained
            }

            // The job is left in the queue here, not popped. A single
            // dispatcher thread is the only consumer of `jobs`, so it is
            // still there once a slot has been reserved below. Leaving it
            // queued keeps `jobs.is_empty()` false for as long as this job
            // is unassigned, so `wait()` can never observe an empty queue
            // and every slot available while a job is still in flight
            // between being noticed here and handed to a worker.
        }

        let slot_id = {
            let available = shared.available.lock().unwrap();
            let mut available = shared
                .workers_cv
                .wait_while(available, |a| Shared::available_count(a) == 0)
                .expect("available mutex poisoned");

            let idx = available
                .iter()
                .position(|a| *a)
                .expect("at least one slot must be available here");
            available[idx] = false;
            idx
        };

        let job = {
            let mut jobs = shared.jobs.lock().unwrap();
            jobs.pop_front()
                .expect("job observed above is still queued: dispatcher is its only consumer")
        };

        // A closed receiver means that worker has already been told to
        // terminate during shutdown; drop the job rather than panic.
        let _ = shared.slots[slot_id].send(SlotMessage::Job(job));
    }
}

fn worker_loop(id: usize, receiver: Receiver<SlotMessage>, shared: Arc<Shared>) {
    while let Ok(message) = receiver.recv() {
        match message {
            SlotMessage::Terminate => return,
            SlotMessage::Job(job) => {
                // A panicking thunk must not poison the pool: catch it so
                // this worker always reaches the availability update below.
                let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job));

                let mut available = shared.available.lock().unwrap();
                available[id] = true;
                shared.workers_cv.notify_all();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;

    #[test]
    fn s1_every_scheduled_thunk_runs_exactly_once_in_order_independent_set() {
        let pool = ThreadPool::new(8);
        let log = Arc::new(StdMutex::new(Vec::new()));

        for i in 0..1000 {
            let log = Arc::clone(&log);
            pool.schedule(move || {
                log.lock().unwrap().push(i);
            });
        }

        pool.wait();

        let mut seen = log.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn s2_reentrant_scheduling_completes_before_wait_returns() {
        let pool = ThreadPool::new(4);
        let count = Arc::new(AtomicUsize::new(0));

        let pool_ref = Arc::new(pool);
        let inner_pool = Arc::clone(&pool_ref);
        let inner_count = Arc::clone(&count);
        pool_ref.schedule(move || {
            inner_count.fetch_add(1, Ordering::SeqCst);
            let c1 = Arc::clone(&inner_count);
            let c2 = Arc::clone(&inner_count);
            inner_pool.schedule(move || {
                c1.fetch_add(1, Ordering::SeqCst);
            });
            inner_pool.schedule(move || {
                c2.fetch_add(1, Ordering::SeqCst);
            });
        });

        pool_ref.wait();
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn panicking_thunk_does_not_poison_the_pool() {
        let pool = ThreadPool::new(2);
        pool.schedule(|| panic!("boom"));
        pool.wait();

        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = Arc::clone(&ran);
        pool.schedule(move || {
            ran2.fetch_add(1, Ordering::SeqCst);
        });
        pool.wait();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn wait_returns_immediately_on_an_idle_pool() {
        let pool = ThreadPool::new(3);
        pool.wait();
    }
}
