use std::sync::Arc;

use tracing::error;

use crate::driver::DriverConnection;
use crate::error::SqlGatewayError;
use crate::statement::PreparedStatement;
use crate::tx_outcome::{TxOutcome, TxVerdict};
use crate::worker::SerialWorker;

/// Serializing front door to one driver connection.
///
/// The gateway owns the connection and a single-concurrency worker lane;
/// every statement and transaction entry point, in each of the three
/// calling conventions, is funnelled through that lane. Handles are cheap
/// to clone and share one lane; the connection is torn down when the last
/// clone drops, after already-queued work has drained.
pub struct Gateway<C: DriverConnection> {
    worker: Arc<SerialWorker<C>>,
}

impl<C: DriverConnection> Clone for Gateway<C> {
    fn clone(&self) -> Self {
        Self {
            worker: Arc::clone(&self.worker),
        }
    }
}

impl<C: DriverConnection> Gateway<C> {
    /// Wrap an established driver connection.
    ///
    /// # Errors
    /// Returns [`SqlGatewayError::ConnectionError`] if the worker lane
    /// thread cannot be spawned.
    pub fn new(conn: C) -> Result<Self, SqlGatewayError> {
        Ok(Self {
            worker: Arc::new(SerialWorker::spawn(conn)?),
        })
    }

    /// Prepare a statement, suspending until the driver replies.
    ///
    /// The gateway does no SQL validation; empty or malformed text surfaces
    /// as the driver's own error.
    ///
    /// # Errors
    /// Propagates the driver's preparation failure, or a
    /// [`SqlGatewayError::ConnectionError`] if the lane is gone.
    pub async fn prepare(&self, sql: &str) -> Result<PreparedStatement<C>, SqlGatewayError> {
        let sql = Arc::new(sql.to_owned());
        let conn = self.worker.conn_handle();
        let work = {
            let sql = Arc::clone(&sql);
            move || conn.with(|c| c.prepare(&sql))
        };
        let statement = self.worker.run(work).await?;
        Ok(PreparedStatement::new(
            Arc::downgrade(&self.worker),
            Arc::new(statement),
            sql,
        ))
    }

    /// Prepare a statement, blocking the calling thread. Safe to call from
    /// inside a transaction body: on-lane submissions run in place.
    ///
    /// # Errors
    /// Same conditions as [`prepare`](Gateway::prepare).
    pub fn prepare_blocking(&self, sql: &str) -> Result<PreparedStatement<C>, SqlGatewayError> {
        let sql = Arc::new(sql.to_owned());
        let conn = self.worker.conn_handle();
        let work = {
            let sql = Arc::clone(&sql);
            move || conn.with(|c| c.prepare(&sql))
        };
        let statement = self.worker.run_blocking(work)?;
        Ok(PreparedStatement::new(
            Arc::downgrade(&self.worker),
            Arc::new(statement),
            sql,
        ))
    }

    /// Prepare a statement and deliver the handle to `completion` on the
    /// worker lane (synchronously in place when called from the lane).
    pub fn prepare_with<F>(&self, sql: &str, completion: F)
    where
        F: FnOnce(Result<PreparedStatement<C>, SqlGatewayError>) + Send + 'static,
    {
        let sql = Arc::new(sql.to_owned());
        let conn = self.worker.conn_handle();
        let worker = Arc::downgrade(&self.worker);
        let work = {
            let sql = Arc::clone(&sql);
            move || conn.with(|c| c.prepare(&sql))
        };
        self.worker.run_with_callback(work, move |outcome| {
            completion(
                outcome.map(|statement| PreparedStatement::new(worker, Arc::new(statement), sql)),
            );
        });
    }

    /// Run `body` inside a transaction, suspending until the whole unit
    /// completes.
    ///
    /// The unit begins a transaction, invokes `body(&gateway)` synchronously
    /// on the worker lane, then commits or rolls back per the body's
    /// [`TxVerdict`]. Statement calls the body makes on this gateway run in
    /// place, strictly inside the transaction window; nothing submitted
    /// from outside can interleave between begin and commit/rollback.
    ///
    /// # Errors
    /// Begin, commit, and rollback failures are propagated. A begin failure
    /// aborts the unit before `body` runs.
    pub async fn transaction<F, V>(&self, body: F) -> Result<TxOutcome, SqlGatewayError>
    where
        F: FnOnce(&Gateway<C>) -> V + Send + 'static,
        V: TxVerdict,
    {
        self.worker.run(transaction_unit(self.clone(), body)).await
    }

    /// Blocking form of [`transaction`](Gateway::transaction); waits until
    /// the whole unit has finished.
    ///
    /// # Errors
    /// Same conditions as [`transaction`](Gateway::transaction).
    pub fn transaction_blocking<F, V>(&self, body: F) -> Result<TxOutcome, SqlGatewayError>
    where
        F: FnOnce(&Gateway<C>) -> V + Send + 'static,
        V: TxVerdict,
    {
        self.worker.run_blocking(transaction_unit(self.clone(), body))
    }

    /// Callback form of [`transaction`](Gateway::transaction); `completion`
    /// runs on the worker lane once the unit has finished.
    pub fn transaction_with<F, V, D>(&self, body: F, completion: D)
    where
        F: FnOnce(&Gateway<C>) -> V + Send + 'static,
        V: TxVerdict,
        D: FnOnce(Result<TxOutcome, SqlGatewayError>) + Send + 'static,
    {
        self.worker
            .run_with_callback(transaction_unit(self.clone(), body), completion);
    }

    /// Fire-and-forget form of [`transaction`](Gateway::transaction).
    ///
    /// There is no result channel, so bracketing failures are logged at
    /// error level instead of being propagated.
    pub fn spawn_transaction<F, V>(&self, body: F)
    where
        F: FnOnce(&Gateway<C>) -> V + Send + 'static,
        V: TxVerdict,
    {
        self.worker
            .run_with_callback(transaction_unit(self.clone(), body), |outcome| {
                if let Err(err) = outcome {
                    error!("unable to finish transaction: {err}");
                }
            });
    }
}

/// One worker-lane unit bracketing `body` between begin and
/// commit/rollback. A begin failure aborts the unit before the body runs;
/// the bracket calls lock the connection one driver call at a time, so the
/// body's reentrant submissions never observe a held lock.
fn transaction_unit<C, F, V>(
    gateway: Gateway<C>,
    body: F,
) -> impl FnOnce() -> Result<TxOutcome, SqlGatewayError> + Send + 'static
where
    C: DriverConnection,
    F: FnOnce(&Gateway<C>) -> V + Send + 'static,
    V: TxVerdict,
{
    move || {
        gateway.worker.with_conn(|c| c.begin_transaction())?;
        if body(&gateway).should_commit() {
            gateway.worker.with_conn(|c| c.commit_transaction())?;
            Ok(TxOutcome::Committed)
        } else {
            gateway.worker.with_conn(|c| c.rollback_transaction())?;
            Ok(TxOutcome::RolledBack)
        }
    }
}
