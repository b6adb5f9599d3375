use std::sync::{Arc, Weak};

use crate::driver::DriverConnection;
use crate::error::SqlGatewayError;
use crate::rows::Rows;
use crate::types::SqlValue;
use crate::worker::SerialWorker;

/// Handle to a prepared statement, bound to the gateway that prepared it.
///
/// The handle does not keep the gateway alive. It carries a non-owning
/// reference that is resolved before every execution; once the owning
/// gateway has been released, execution fails with
/// [`SqlGatewayError::HandleInvalidated`].
pub struct PreparedStatement<C: DriverConnection> {
    worker: Weak<SerialWorker<C>>,
    statement: Arc<C::Statement>,
    sql: Arc<String>,
}

impl<C: DriverConnection> Clone for PreparedStatement<C> {
    fn clone(&self) -> Self {
        Self {
            worker: Weak::clone(&self.worker),
            statement: Arc::clone(&self.statement),
            sql: Arc::clone(&self.sql),
        }
    }
}

impl<C: DriverConnection> PreparedStatement<C> {
    pub(crate) fn new(
        worker: Weak<SerialWorker<C>>,
        statement: Arc<C::Statement>,
        sql: Arc<String>,
    ) -> Self {
        Self {
            worker,
            statement,
            sql,
        }
    }

    /// Execute with positional arguments, suspending until the rows arrive.
    ///
    /// Argument position corresponds to `$1`, `$2`, … placeholders in the
    /// prepared text.
    ///
    /// # Errors
    /// [`SqlGatewayError::HandleInvalidated`] when the owning gateway is
    /// gone; otherwise whatever the driver reports.
    pub async fn execute(&self, args: &[SqlValue]) -> Result<Rows, SqlGatewayError> {
        let worker = self.worker()?;
        let conn = worker.conn_handle();
        let statement = Arc::clone(&self.statement);
        let args = args.to_vec();
        worker
            .run(move || conn.with(|c| c.execute(&statement, &args)))
            .await
    }

    /// Execute with positional arguments, blocking the calling thread. Safe
    /// inside a transaction body: on-lane submissions run in place.
    ///
    /// # Errors
    /// Same conditions as [`execute`](PreparedStatement::execute).
    pub fn execute_blocking(&self, args: &[SqlValue]) -> Result<Rows, SqlGatewayError> {
        let worker = self.worker()?;
        let conn = worker.conn_handle();
        let statement = Arc::clone(&self.statement);
        let args = args.to_vec();
        worker.run_blocking(move || conn.with(|c| c.execute(&statement, &args)))
    }

    /// Execute with positional arguments and deliver the rows to
    /// `completion` on the worker lane (synchronously in place when called
    /// from the lane).
    pub fn execute_with<F>(&self, args: &[SqlValue], completion: F)
    where
        F: FnOnce(Result<Rows, SqlGatewayError>) + Send + 'static,
    {
        match self.worker() {
            Ok(worker) => {
                let conn = worker.conn_handle();
                let statement = Arc::clone(&self.statement);
                let args = args.to_vec();
                worker.run_with_callback(
                    move || conn.with(|c| c.execute(&statement, &args)),
                    completion,
                );
            }
            Err(err) => completion(Err(err)),
        }
    }

    /// The SQL text this handle was prepared from.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    fn worker(&self) -> Result<Arc<SerialWorker<C>>, SqlGatewayError> {
        self.worker.upgrade().ok_or_else(|| {
            SqlGatewayError::HandleInvalidated(format!(
                "gateway owning `{}` has been released",
                self.sql
            ))
        })
    }
}
