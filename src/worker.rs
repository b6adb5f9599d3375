use std::marker::PhantomData;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use tokio::sync::oneshot;
use tracing::debug;

use crate::error::SqlGatewayError;

/// A queued pairing of fallible computation and completion sink.
///
/// `abort` delivers a closed-lane error through the sink without running the
/// computation; running it off-lane would let driver calls overlap.
trait UnitOfWork: Send {
    fn run(self: Box<Self>);
    fn abort(self: Box<Self>);
}

struct Operation<T, W, D> {
    work: W,
    deliver: D,
    _result: PhantomData<fn() -> T>,
}

impl<T, W, D> UnitOfWork for Operation<T, W, D>
where
    W: FnOnce() -> Result<T, SqlGatewayError> + Send,
    D: FnOnce(Result<T, SqlGatewayError>) + Send,
{
    fn run(self: Box<Self>) {
        (self.deliver)((self.work)());
    }

    fn abort(self: Box<Self>) {
        (self.deliver)(Err(lane_closed()));
    }
}

/// Single-concurrency execution lane guarding one driver connection.
///
/// One dedicated thread drains an `mpsc` queue of units of work, so the
/// connection never sees overlapping calls and off-lane submissions keep
/// their FIFO order. Work submitted from the lane itself runs in place,
/// before the outer unit resumes, so a transaction body never deadlocks
/// waiting on its own lane.
pub(crate) struct SerialWorker<C> {
    sender: Sender<Box<dyn UnitOfWork>>,
    lane_thread: ThreadId,
    conn: Arc<Mutex<C>>,
}

impl<C: Send + 'static> SerialWorker<C> {
    pub(crate) fn spawn(conn: C) -> Result<Self, SqlGatewayError> {
        let (sender, receiver) = mpsc::channel::<Box<dyn UnitOfWork>>();
        let handle = thread::Builder::new()
            .name("sql-gateway-lane".into())
            .spawn(move || run_lane(&receiver))
            .map_err(|err| {
                SqlGatewayError::ConnectionError(format!(
                    "failed to spawn worker lane thread: {err}"
                ))
            })?;

        Ok(Self {
            sender,
            lane_thread: handle.thread().id(),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn on_lane(&self) -> bool {
        thread::current().id() == self.lane_thread
    }

    /// Canonical submission primitive: run `work` on the lane and hand its
    /// outcome to `deliver`. On-lane callers get both in place,
    /// synchronously. Delivery is guaranteed: a closed queue aborts the
    /// unit through the same sink.
    pub(crate) fn submit<T, W, D>(&self, work: W, deliver: D)
    where
        T: 'static,
        W: FnOnce() -> Result<T, SqlGatewayError> + Send + 'static,
        D: FnOnce(Result<T, SqlGatewayError>) + Send + 'static,
    {
        let operation: Box<dyn UnitOfWork> = Box::new(Operation {
            work,
            deliver,
            _result: PhantomData,
        });
        if self.on_lane() {
            operation.run();
            return;
        }
        if let Err(mpsc::SendError(operation)) = self.sender.send(operation) {
            operation.abort();
        }
    }

    /// Block the calling thread until `work` completes on the lane.
    pub(crate) fn run_blocking<T, W>(&self, work: W) -> Result<T, SqlGatewayError>
    where
        T: Send + 'static,
        W: FnOnce() -> Result<T, SqlGatewayError> + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        self.submit(work, move |outcome| {
            let _ = tx.send(outcome);
        });
        rx.recv().map_err(|_| {
            SqlGatewayError::ConnectionError(
                "worker lane dropped the operation before replying".into(),
            )
        })?
    }

    /// Run `work` on the lane and invoke `completion` there with the outcome.
    pub(crate) fn run_with_callback<T, W, D>(&self, work: W, completion: D)
    where
        T: 'static,
        W: FnOnce() -> Result<T, SqlGatewayError> + Send + 'static,
        D: FnOnce(Result<T, SqlGatewayError>) + Send + 'static,
    {
        self.submit(work, completion);
    }

    /// Suspend the calling task until `work` completes on the lane. No
    /// thread is blocked while waiting.
    pub(crate) async fn run<T, W>(&self, work: W) -> Result<T, SqlGatewayError>
    where
        T: Send + 'static,
        W: FnOnce() -> Result<T, SqlGatewayError> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.submit(work, move |outcome| {
            let _ = tx.send(outcome);
        });
        rx.await.map_err(|_| {
            SqlGatewayError::ConnectionError(
                "worker lane dropped the operation before replying".into(),
            )
        })?
    }

    /// Lock-scoped access to the connection for work already on the lane.
    /// The lock spans a single driver call; units must not hold it across a
    /// reentrant submission.
    pub(crate) fn with_conn<T, F>(&self, f: F) -> Result<T, SqlGatewayError>
    where
        F: FnOnce(&mut C) -> Result<T, SqlGatewayError>,
    {
        with_locked(&self.conn, f)
    }

    pub(crate) fn conn_handle(&self) -> ConnHandle<C> {
        ConnHandle {
            conn: Arc::clone(&self.conn),
        }
    }
}

/// Non-owning entry to the lane's connection slot, captured by units of
/// work so they can lock per driver call.
pub(crate) struct ConnHandle<C> {
    conn: Arc<Mutex<C>>,
}

impl<C> ConnHandle<C> {
    pub(crate) fn with<T, F>(&self, f: F) -> Result<T, SqlGatewayError>
    where
        F: FnOnce(&mut C) -> Result<T, SqlGatewayError>,
    {
        with_locked(&self.conn, f)
    }
}

fn with_locked<C, T, F>(conn: &Mutex<C>, f: F) -> Result<T, SqlGatewayError>
where
    F: FnOnce(&mut C) -> Result<T, SqlGatewayError>,
{
    let mut guard = conn.lock().map_err(|err| {
        SqlGatewayError::ConnectionError(format!("connection mutex poisoned: {err}"))
    })?;
    f(&mut guard)
}

fn lane_closed() -> SqlGatewayError {
    SqlGatewayError::ConnectionError("worker lane closed".into())
}

// Once every sender is gone the queue still hands over buffered units, so
// pending work drains before the lane exits.
fn run_lane(receiver: &Receiver<Box<dyn UnitOfWork>>) {
    debug!("worker lane started");
    while let Ok(operation) = receiver.recv() {
        operation.run();
    }
    debug!("worker lane drained, exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_lane_submissions_keep_fifo_order() {
        let worker = SerialWorker::spawn(()).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..16 {
            let log = Arc::clone(&log);
            worker.run_with_callback(
                move || Ok::<_, SqlGatewayError>(i),
                move |outcome| log.lock().unwrap().push(outcome.unwrap()),
            );
        }
        // The blocking sentinel queues behind all sixteen callbacks.
        let last = worker.run_blocking(|| Ok::<_, SqlGatewayError>(99)).unwrap();
        assert_eq!(last, 99);
        assert_eq!(*log.lock().unwrap(), (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn on_lane_submission_runs_in_place_without_deadlock() {
        let worker = Arc::new(SerialWorker::spawn(()).unwrap());
        let inner = Arc::clone(&worker);
        let nested = worker
            .run_blocking(move || inner.run_blocking(|| Ok::<_, SqlGatewayError>(7)))
            .unwrap();
        assert_eq!(nested, 7);
    }

    #[test]
    fn on_lane_callback_completes_before_submit_returns() {
        let worker = Arc::new(SerialWorker::spawn(()).unwrap());
        let inner = Arc::clone(&worker);
        let observed = worker
            .run_blocking(move || {
                let flag = Arc::new(Mutex::new(false));
                let seen = Arc::clone(&flag);
                inner.run_with_callback(
                    || Ok::<_, SqlGatewayError>(()),
                    move |_| *seen.lock().unwrap() = true,
                );
                Ok(*flag.lock().unwrap())
            })
            .unwrap();
        assert!(observed);
    }

    #[test]
    fn connection_state_is_reachable_through_handles() {
        let worker = SerialWorker::spawn(0_i32).unwrap();
        let conn = worker.conn_handle();
        let bumped = worker
            .run_blocking(move || {
                conn.with(|c| {
                    *c += 1;
                    Ok(*c)
                })
            })
            .unwrap();
        assert_eq!(bumped, 1);
    }

    #[test]
    fn work_failures_are_delivered_not_fatal() {
        let worker = SerialWorker::spawn(()).unwrap();
        let failed: Result<(), _> = worker.run_blocking(|| {
            Err(SqlGatewayError::ExecutionError("boom".into()))
        });
        assert!(failed.is_err());
        // The lane survives a failed unit.
        let ok = worker.run_blocking(|| Ok::<_, SqlGatewayError>(1)).unwrap();
        assert_eq!(ok, 1);
    }
}
