use crate::api::client::{ApiClient, ApiError};
use crate::api::models::Queue;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// The closed set of bulk actions. Each maps to exactly one endpoint per
/// queue; a pairing with no endpoint is simply not offered for that queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Approve,
    Reject,
    Delete,
}

impl BatchAction {
    pub fn verb(&self) -> &'static str {
        match self {
            BatchAction::Approve => "approve",
            BatchAction::Reject => "reject",
            BatchAction::Delete => "delete",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BatchAction::Approve => "Approve",
            BatchAction::Reject => "Reject",
            BatchAction::Delete => "Delete",
        }
    }

    pub fn endpoint(&self, queue: Queue) -> Option<&'static str> {
        match (queue, self) {
            (Queue::Membership, BatchAction::Approve) => {
                Some("/api/membership-applications/batch-approve")
            }
            (Queue::Membership, BatchAction::Reject) => {
                Some("/api/membership-applications/batch-reject")
            }
            (Queue::Beneficiaries, BatchAction::Delete) => Some("/api/beneficiaries/batch-delete"),
            _ => None,
        }
    }

    pub fn success_message(&self, count: usize) -> String {
        match self {
            BatchAction::Approve => format!("Approved {count} record(s)"),
            BatchAction::Reject => format!("Rejected {count} record(s)"),
            BatchAction::Delete => format!("Deleted {count} record(s)"),
        }
    }
}

/// Seam between the executor and the network, so tests can substitute a
/// mock transport and count dispatches.
pub trait BatchDispatch: Send + Sync {
    fn dispatch(&self, endpoint: &str, ids: &[u64]) -> Result<usize, ApiError>;
}

impl BatchDispatch for ApiClient {
    fn dispatch(&self, endpoint: &str, ids: &[u64]) -> Result<usize, ApiError> {
        self.batch(endpoint, ids)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("nothing selected")]
    EmptySelection,
    #[error("a batch action is already running")]
    Busy,
    #[error("action not available for this queue")]
    Unsupported,
}

/// Settled result of one batch invocation. Errors are carried as the
/// human-readable message shown to the operator.
#[derive(Debug)]
pub struct BatchOutcome {
    pub action: BatchAction,
    pub result: Result<usize, String>,
}

/// Runs at most one batch action at a time. The request itself runs on a
/// worker thread so the draw loop stays responsive; the owning view polls
/// for the outcome every tick. Re-entrant starts are rejected while a
/// request is in flight, which serializes batch actions per view without
/// any locking.
pub struct Executor {
    dispatch: Arc<dyn BatchDispatch>,
    loading: bool,
    error: Option<String>,
    in_flight: Option<BatchAction>,
    rx: Option<Receiver<BatchOutcome>>,
}

impl Executor {
    pub fn new(dispatch: Arc<dyn BatchDispatch>) -> Self {
        Self {
            dispatch,
            loading: false,
            error: None,
            in_flight: None,
            rx: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Kick off one batch action over an id snapshot. Fails fast without
    /// touching the network when the snapshot is empty or another action is
    /// still in flight.
    pub fn start(
        &mut self,
        queue: Queue,
        action: BatchAction,
        ids: Vec<u64>,
    ) -> Result<(), ExecError> {
        if self.loading {
            return Err(ExecError::Busy);
        }
        if ids.is_empty() {
            return Err(ExecError::EmptySelection);
        }
        let Some(endpoint) = action.endpoint(queue) else {
            return Err(ExecError::Unsupported);
        };

        self.error = None;
        self.loading = true;
        self.in_flight = Some(action);

        let (tx, rx) = mpsc::channel();
        self.rx = Some(rx);

        let dispatch = Arc::clone(&self.dispatch);
        thread::spawn(move || {
            tracing::info!(action = action.verb(), count = ids.len(), "running batch action");
            let result = dispatch.dispatch(endpoint, &ids).map_err(|e| e.to_string());
            if let Err(message) = &result {
                tracing::warn!(action = action.verb(), message = %message, "batch action failed");
            }
            // The receiver is gone if the view was torn down mid-flight;
            // there is no state left to update in that case.
            let _ = tx.send(BatchOutcome { action, result });
        });

        Ok(())
    }

    /// Drain the outcome of the in-flight action, if it has settled. Clears
    /// the loading flag exactly once per invocation.
    pub fn poll(&mut self) -> Option<BatchOutcome> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(outcome) => {
                self.loading = false;
                self.in_flight = None;
                self.rx = None;
                if let Err(message) = &outcome.result {
                    self.error = Some(message.clone());
                }
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                let action = self.in_flight.take().unwrap_or(BatchAction::Approve);
                self.loading = false;
                self.rx = None;
                let message = "batch worker terminated unexpectedly".to_string();
                self.error = Some(message.clone());
                Some(BatchOutcome {
                    action,
                    result: Err(message),
                })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    /// Mock transport recording every dispatch.
    pub(crate) struct MockDispatch {
        calls: AtomicUsize,
        last_endpoint: Mutex<String>,
        last_ids: Mutex<Vec<u64>>,
        fail_with: Option<String>,
    }

    impl MockDispatch {
        pub(crate) fn succeeding() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_endpoint: Mutex::new(String::new()),
                last_ids: Mutex::new(Vec::new()),
                fail_with: None,
            })
        }

        pub(crate) fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_endpoint: Mutex::new(String::new()),
                last_ids: Mutex::new(Vec::new()),
                fail_with: Some(message.to_string()),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn last_endpoint(&self) -> String {
            self.last_endpoint.lock().unwrap().clone()
        }

        pub(crate) fn last_ids(&self) -> Vec<u64> {
            self.last_ids.lock().unwrap().clone()
        }
    }

    impl BatchDispatch for MockDispatch {
        fn dispatch(&self, endpoint: &str, ids: &[u64]) -> Result<usize, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_endpoint.lock().unwrap() = endpoint.to_string();
            *self.last_ids.lock().unwrap() = ids.to_vec();
            match &self.fail_with {
                Some(message) => Err(ApiError::ServerRejected {
                    message: message.clone(),
                }),
                None => Ok(ids.len()),
            }
        }
    }

    pub(crate) fn settle(executor: &mut Executor) -> BatchOutcome {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(outcome) = executor.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "batch action did not settle");
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{MockDispatch, settle};
    use super::*;

    #[test]
    fn test_empty_selection_short_circuits() {
        let mock = MockDispatch::succeeding();
        let mut executor = Executor::new(mock.clone());

        let result = executor.start(Queue::Membership, BatchAction::Approve, vec![]);
        assert_eq!(result, Err(ExecError::EmptySelection));
        assert_eq!(mock.calls(), 0);
        assert!(!executor.is_loading());
    }

    #[test]
    fn test_second_start_while_loading_is_rejected() {
        let mock = MockDispatch::succeeding();
        let mut executor = Executor::new(mock.clone());

        executor
            .start(Queue::Membership, BatchAction::Approve, vec![1, 2])
            .unwrap();
        assert!(executor.is_loading());

        // Loading stays set until the outcome is polled, so the second call
        // must be rejected even if the worker has already finished.
        let second = executor.start(Queue::Membership, BatchAction::Approve, vec![3]);
        assert_eq!(second, Err(ExecError::Busy));

        let outcome = settle(&mut executor);
        assert_eq!(outcome.result, Ok(2));
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn test_unsupported_action_is_rejected() {
        let mock = MockDispatch::succeeding();
        let mut executor = Executor::new(mock.clone());

        let result = executor.start(Queue::Beneficiaries, BatchAction::Approve, vec![1]);
        assert_eq!(result, Err(ExecError::Unsupported));
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn test_success_reports_affected_count() {
        let mock = MockDispatch::succeeding();
        let mut executor = Executor::new(mock.clone());

        executor
            .start(Queue::Membership, BatchAction::Reject, vec![5, 6, 7])
            .unwrap();
        let outcome = settle(&mut executor);

        assert_eq!(outcome.action, BatchAction::Reject);
        assert_eq!(outcome.result, Ok(3));
        assert_eq!(
            mock.last_endpoint(),
            "/api/membership-applications/batch-reject"
        );
        assert_eq!(mock.last_ids(), vec![5, 6, 7]);
        assert!(!executor.is_loading());
        assert!(executor.error().is_none());
    }

    #[test]
    fn test_failure_sets_error_and_clears_loading() {
        let mock = MockDispatch::failing("DB locked");
        let mut executor = Executor::new(mock.clone());

        executor
            .start(Queue::Membership, BatchAction::Approve, vec![1])
            .unwrap();
        let outcome = settle(&mut executor);

        assert_eq!(outcome.result, Err("DB locked".to_string()));
        assert_eq!(executor.error(), Some("DB locked"));
        assert!(!executor.is_loading());
    }

    #[test]
    fn test_retry_after_failure_clears_error() {
        let mock = MockDispatch::failing("DB locked");
        let mut executor = Executor::new(mock.clone());

        executor
            .start(Queue::Membership, BatchAction::Approve, vec![1])
            .unwrap();
        settle(&mut executor);
        assert!(executor.error().is_some());

        executor
            .start(Queue::Membership, BatchAction::Approve, vec![1])
            .unwrap();
        assert!(executor.error().is_none());
        settle(&mut executor);
        assert_eq!(mock.calls(), 2);
    }

    #[test]
    fn test_endpoint_mapping() {
        assert_eq!(
            BatchAction::Approve.endpoint(Queue::Membership),
            Some("/api/membership-applications/batch-approve")
        );
        assert_eq!(
            BatchAction::Reject.endpoint(Queue::Membership),
            Some("/api/membership-applications/batch-reject")
        );
        assert_eq!(
            BatchAction::Delete.endpoint(Queue::Beneficiaries),
            Some("/api/beneficiaries/batch-delete")
        );
        assert_eq!(BatchAction::Delete.endpoint(Queue::Membership), None);
        assert_eq!(BatchAction::Approve.endpoint(Queue::Beneficiaries), None);
    }
}
