use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use uuid::Uuid;

use crate::models::{SearchLimit, SessionResult, StopReason};
use crate::session::{self, SearchOptions};
use crate::source::ListingSource;

/// Opaque handle for one submitted search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started,
    /// Running count of accepted addresses.
    Progress(usize),
    Completed(SessionResult),
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub session_id: SessionId,
    pub event: SessionEvent,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    /// Per-request ceiling on accepted addresses. Unbounded requests are
    /// clamped to this too; the remote caller never gets an open-ended walk.
    pub max_addresses: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            data_dir: PathBuf::from("data/bot"),
            max_addresses: 100,
        }
    }
}

struct Job {
    id: SessionId,
    term: String,
    limit: SearchLimit,
}

/// Out-of-process trigger for the search pipeline. Requests go into a FIFO
/// queue served by one worker thread, one run at a time; progress and
/// completion come back as `Notification`s on the channel handed out at
/// startup. The transport in front of this (a chat bot) is not this
/// crate's concern.
pub struct SearchService {
    jobs: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    pending: Arc<AtomicUsize>,
}

impl SearchService {
    pub fn start<S>(source: Arc<S>, config: ServiceConfig) -> (Self, Receiver<Notification>)
    where
        S: ListingSource + Send + Sync + 'static,
    {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (event_tx, event_rx) = mpsc::channel::<Notification>();
        let pending = Arc::new(AtomicUsize::new(0));

        let worker_pending = Arc::clone(&pending);
        let worker = thread::spawn(move || {
            worker_loop(&*source, &config, job_rx, event_tx, worker_pending);
        });

        let service = SearchService {
            jobs: Some(job_tx),
            worker: Some(worker),
            pending,
        };
        (service, event_rx)
    }

    /// Enqueue a search and return immediately. The limit is clamped by the
    /// service configuration before the run starts.
    pub fn submit_search(&self, term: &str, limit: SearchLimit) -> SessionId {
        let id = SessionId::new();
        self.pending.fetch_add(1, Ordering::SeqCst);
        if let Some(jobs) = &self.jobs {
            // A send failure means the worker is gone; the caller sees no
            // notifications for this id, same as an aborted queue.
            let _ = jobs.send(Job {
                id,
                term: term.to_string(),
                limit,
            });
        }
        id
    }

    /// Number of submitted searches not yet started.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Stop accepting jobs and wait for the in-flight one to finish.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for SearchService {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

fn clamp_limit(limit: SearchLimit, max_addresses: usize) -> SearchLimit {
    match limit {
        SearchLimit::All => SearchLimit::Count(max_addresses),
        SearchLimit::Count(n) => SearchLimit::Count(n.clamp(1, max_addresses)),
    }
}

fn worker_loop<S: ListingSource>(
    source: &S,
    config: &ServiceConfig,
    jobs: Receiver<Job>,
    events: Sender<Notification>,
    pending: Arc<AtomicUsize>,
) {
    while let Ok(job) = jobs.recv() {
        pending.fetch_sub(1, Ordering::SeqCst);

        let notify = |event: SessionEvent| {
            let _ = events.send(Notification {
                session_id: job.id,
                event,
            });
        };
        notify(SessionEvent::Started);

        let limit = clamp_limit(job.limit, config.max_addresses);
        let options = SearchOptions::new(&job.term, limit, &config.data_dir);
        let progress_events = events.clone();
        let progress_id = job.id;

        let outcome = session::run_search(source, &options, |accepted| {
            let _ = progress_events.send(Notification {
                session_id: progress_id,
                event: SessionEvent::Progress(accepted),
            });
        });

        match outcome {
            Ok(result) => match &result.reason {
                StopReason::SourceError(_) => notify(SessionEvent::Aborted(result.reason.to_string())),
                _ => notify(SessionEvent::Completed(result)),
            },
            Err(e) => notify(SessionEvent::Aborted(e.to_string())),
        }
    }
}
