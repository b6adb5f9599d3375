use crate::error::SqlGatewayError;
use crate::rows::Rows;
use crate::types::SqlValue;

/// Contract for the session a [`Gateway`](crate::Gateway) owns.
///
/// Implementations are not expected to tolerate concurrent use; the gateway
/// funnels every call through one worker lane so calls never overlap. The
/// gateway performs no SQL validation of its own; malformed statement text
/// surfaces as whatever error the driver reports.
pub trait DriverConnection: Send + 'static {
    /// Prepared statement produced by [`prepare`](DriverConnection::prepare).
    ///
    /// Statement handles share it across threads, so it must be `Sync`.
    type Statement: Send + Sync + 'static;

    fn prepare(&mut self, sql: &str) -> Result<Self::Statement, SqlGatewayError>;

    /// Execute a prepared statement with positional arguments.
    fn execute(
        &mut self,
        statement: &Self::Statement,
        args: &[SqlValue],
    ) -> Result<Rows, SqlGatewayError>;

    fn begin_transaction(&mut self) -> Result<(), SqlGatewayError>;

    fn commit_transaction(&mut self) -> Result<(), SqlGatewayError>;

    fn rollback_transaction(&mut self) -> Result<(), SqlGatewayError>;
}
