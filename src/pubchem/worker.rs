//! Background fetch thread.
//!
//! Keeps network latency off the caller's thread. Requests go in over an
//! `mpsc` channel and completed outcomes come back over another, each
//! tagged with the [`Ticket`] issued at submission. When several requests
//! queue up while a fetch is running, only the newest is started once the
//! thread is free; the rest are already superseded. Requests that are
//! already on the wire are never cancelled, so the consumer must still
//! compare tickets (see [`FetchWorker::is_current`]).

use std::sync::mpsc;
use std::time::Duration;

use super::fetcher::{FetchOutcome, Fetcher};
use super::transport::HttpTransport;
use crate::error::MolviewError;
use crate::identifier::ResolvedIdentifier;
use crate::ticket::Ticket;

/// A finished fetch and the submission it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Completed {
    /// Ticket issued when the request was submitted.
    pub ticket: Ticket,
    /// What the fetch produced.
    pub outcome: FetchOutcome,
}

enum WorkerRequest {
    Fetch {
        ticket: Ticket,
        identifier: ResolvedIdentifier,
    },
    Shutdown,
}

/// Background thread that runs [`Fetcher::fetch`] calls in submission
/// order.
pub struct FetchWorker {
    request_tx: mpsc::Sender<WorkerRequest>,
    result_rx: mpsc::Receiver<Completed>,
    latest: Option<Ticket>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl FetchWorker {
    /// Spawn the fetch thread.
    ///
    /// # Errors
    ///
    /// Returns [`MolviewError::ThreadSpawn`] if the thread fails to spawn.
    pub fn new<T>(fetcher: Fetcher<T>) -> Result<Self, MolviewError>
    where
        T: HttpTransport + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<WorkerRequest>();
        let (result_tx, result_rx) = mpsc::channel::<Completed>();

        let thread = std::thread::Builder::new()
            .name("pubchem-fetch".into())
            .spawn(move || {
                Self::thread_loop(&fetcher, &request_rx, &result_tx);
            })
            .map_err(MolviewError::ThreadSpawn)?;

        Ok(Self {
            request_tx,
            result_rx,
            latest: None,
            thread: Some(thread),
        })
    }

    /// Queue a fetch (non-blocking) and return its ticket.
    ///
    /// # Errors
    ///
    /// Returns [`MolviewError::WorkerStopped`] if the fetch thread has
    /// exited. No ticket is issued in that case.
    pub fn submit(
        &mut self,
        identifier: ResolvedIdentifier,
    ) -> Result<Ticket, MolviewError> {
        let ticket = self.latest.map_or_else(Ticket::default, Ticket::next);
        log::info!("submitting {} as {ticket}", identifier.identifier());
        if self
            .request_tx
            .send(WorkerRequest::Fetch { ticket, identifier })
            .is_err()
        {
            log::error!("cannot submit {ticket}: fetch thread has exited");
            return Err(MolviewError::WorkerStopped);
        }
        self.latest = Some(ticket);
        Ok(ticket)
    }

    /// Ticket of the most recent submission, if any.
    #[must_use]
    pub fn latest(&self) -> Option<Ticket> {
        self.latest
    }

    /// Whether `ticket` belongs to the most recent submission.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest == Some(ticket)
    }

    /// Non-blocking check for a completed fetch.
    pub fn try_recv(&self) -> Option<Completed> {
        self.result_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for a completed fetch.
    ///
    /// # Errors
    ///
    /// [`mpsc::RecvTimeoutError::Timeout`] if nothing arrived in time,
    /// [`mpsc::RecvTimeoutError::Disconnected`] if the fetch thread has
    /// exited and nothing is left to receive.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<Completed, mpsc::RecvTimeoutError> {
        self.result_rx.recv_timeout(timeout)
    }

    /// Shut down the background thread and wait for it to finish.
    ///
    /// A fetch that is currently on the wire is allowed to complete first.
    pub fn shutdown(&mut self) {
        let _ = self.request_tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    fn thread_loop<T: HttpTransport>(
        fetcher: &Fetcher<T>,
        request_rx: &mpsc::Receiver<WorkerRequest>,
        result_tx: &mpsc::Sender<Completed>,
    ) {
        while let Ok(request) = request_rx.recv() {
            match drain_latest(request, request_rx) {
                WorkerRequest::Shutdown => break,
                WorkerRequest::Fetch { ticket, identifier } => {
                    let outcome = fetcher.fetch(&identifier);
                    if result_tx.send(Completed { ticket, outcome }).is_err()
                    {
                        break;
                    }
                }
            }
        }
        log::debug!("fetch thread exiting");
    }
}

impl Drop for FetchWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Collapse everything already queued behind `first` down to the newest
/// request. A queued shutdown always wins.
fn drain_latest(
    first: WorkerRequest,
    rx: &mpsc::Receiver<WorkerRequest>,
) -> WorkerRequest {
    let mut latest = first;
    while let Ok(next) = rx.try_recv() {
        if let WorkerRequest::Fetch { ticket, .. } = &latest {
            log::debug!("dropping queued fetch {ticket}: superseded");
        }
        latest = next;
        if matches!(latest, WorkerRequest::Shutdown) {
            break;
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::identifier::{resolve, IdentifierKind};
    use crate::pubchem::fetcher::tests::{
        MockTransport, BENZENE_PROPS, BENZENE_SDF,
    };
    use crate::pubchem::transport::{HttpResponse, TransportError};

    const WAIT: Duration = Duration::from_secs(5);

    /// Holds every request until the test releases it.
    struct GatedTransport {
        inner: MockTransport,
        started: Mutex<mpsc::Sender<String>>,
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl HttpTransport for GatedTransport {
        fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            if let Ok(started) = self.started.lock() {
                let _ = started.send(url.to_owned());
            }
            if let Ok(gate) = self.gate.lock() {
                let _ = gate.recv();
            }
            self.inner.get(url)
        }
    }

    fn two_molecules() -> MockTransport {
        let _ = env_logger::builder().is_test(true).try_init();
        let ethanol_props =
            r#"{"PropertyTable":{"Properties":[{"CID":702}]}}"#;
        MockTransport::default()
            .route("/name/benzene/SDF", 200, BENZENE_SDF)
            .route("/name/benzene/property/", 200, BENZENE_PROPS)
            .route("/name/ethanol/SDF", 200, BENZENE_SDF)
            .route("/name/ethanol/property/", 200, ethanol_props)
    }

    fn name(value: &str) -> ResolvedIdentifier {
        resolve(value, IdentifierKind::Name).unwrap()
    }

    fn cid_of(completed: &Completed) -> u64 {
        match &completed.outcome {
            FetchOutcome::Success(data) => data.properties.cid,
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn results_carry_their_ticket() {
        let fetcher = Fetcher::with_transport(two_molecules(), "http://x");
        let mut worker = FetchWorker::new(fetcher).unwrap();

        let ticket = worker.submit(name("benzene")).unwrap();
        let done = worker.recv_timeout(WAIT).unwrap();
        assert_eq!(done.ticket, ticket);
        assert!(worker.is_current(done.ticket));
        assert_eq!(cid_of(&done), 241);
    }

    #[test]
    fn tickets_increase_per_submission() {
        let fetcher = Fetcher::with_transport(two_molecules(), "http://x");
        let mut worker = FetchWorker::new(fetcher).unwrap();
        assert_eq!(worker.latest(), None);
        let a = worker.submit(name("benzene")).unwrap();
        let b = worker.submit(name("ethanol")).unwrap();
        assert!(b > a);
        assert_eq!(worker.latest(), Some(b));
        assert!(!worker.is_current(a));
    }

    #[test]
    fn in_flight_result_is_marked_stale_after_newer_submission() {
        let (started_tx, started_rx) = mpsc::channel();
        let (gate_tx, gate_rx) = mpsc::channel();
        let transport = GatedTransport {
            inner: two_molecules(),
            started: Mutex::new(started_tx),
            gate: Mutex::new(gate_rx),
        };
        let fetcher = Fetcher::with_transport(transport, "http://x");
        let mut worker = FetchWorker::new(fetcher).unwrap();

        let first = worker.submit(name("benzene")).unwrap();
        // Both benzene requests are on the wire before the second submit.
        let _ = started_rx.recv_timeout(WAIT).unwrap();
        let _ = started_rx.recv_timeout(WAIT).unwrap();
        let second = worker.submit(name("ethanol")).unwrap();

        for _ in 0..4 {
            gate_tx.send(()).unwrap();
        }

        let a = worker.recv_timeout(WAIT).unwrap();
        assert_eq!(a.ticket, first);
        assert!(!worker.is_current(a.ticket));
        assert_eq!(cid_of(&a), 241);

        let b = worker.recv_timeout(WAIT).unwrap();
        assert_eq!(b.ticket, second);
        assert!(worker.is_current(b.ticket));
        assert_eq!(cid_of(&b), 702);
    }

    #[test]
    fn submit_after_shutdown_reports_stopped_worker() {
        let fetcher = Fetcher::with_transport(two_molecules(), "http://x");
        let mut worker = FetchWorker::new(fetcher).unwrap();
        let first = worker.submit(name("benzene")).unwrap();
        worker.shutdown();

        let err = worker.submit(name("ethanol")).unwrap_err();
        assert!(matches!(err, MolviewError::WorkerStopped));
        assert_eq!(worker.latest(), Some(first));
    }

    #[test]
    fn recv_reports_disconnect_after_shutdown() {
        let fetcher = Fetcher::with_transport(two_molecules(), "http://x");
        let mut worker = FetchWorker::new(fetcher).unwrap();
        worker.shutdown();
        assert_eq!(
            worker.recv_timeout(WAIT).unwrap_err(),
            mpsc::RecvTimeoutError::Disconnected
        );
    }

    #[test]
    fn shutdown_is_idempotent() {
        let fetcher = Fetcher::with_transport(two_molecules(), "http://x");
        let mut worker = FetchWorker::new(fetcher).unwrap();
        worker.shutdown();
        worker.shutdown();
        assert!(worker.try_recv().is_none());
    }
}
