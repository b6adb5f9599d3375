#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use sql_gateway::{DriverConnection, Rows, SqlGatewayError, SqlValue};

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Scripted driver standing in for a live server.
///
/// Every call is recorded with paired `>`/`<` markers around an optional
/// delay, so tests can assert both call order and that no two calls were in
/// flight at once. `execute` echoes its arguments back as a single row with
/// columns `c0`, `c1`, …
pub struct RecordingConnection {
    log: CallLog,
    delay: Duration,
    fail_begin: bool,
    fail_commit: bool,
    fail_rollback: bool,
    fail_prepare: bool,
}

pub struct RecordedStatement {
    sql: String,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
            fail_begin: false,
            fail_commit: false,
            fail_rollback: false,
            fail_prepare: false,
        }
    }

    pub fn log(&self) -> CallLog {
        Arc::clone(&self.log)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_on_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    pub fn fail_on_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    pub fn fail_on_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    pub fn fail_on_prepare(mut self) -> Self {
        self.fail_prepare = true;
        self
    }

    fn touch(&mut self, label: &str) {
        self.log.lock().unwrap().push(format!(">{label}"));
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.log.lock().unwrap().push(format!("<{label}"));
    }
}

impl DriverConnection for RecordingConnection {
    type Statement = RecordedStatement;

    fn prepare(&mut self, sql: &str) -> Result<Self::Statement, SqlGatewayError> {
        if self.fail_prepare {
            return Err(SqlGatewayError::ExecutionError(format!(
                "syntax error in `{sql}`"
            )));
        }
        self.touch(&format!("prepare:{sql}"));
        Ok(RecordedStatement {
            sql: sql.to_owned(),
        })
    }

    fn execute(
        &mut self,
        statement: &Self::Statement,
        args: &[SqlValue],
    ) -> Result<Rows, SqlGatewayError> {
        self.touch(&format!("execute:{}", statement.sql));
        let columns = (0..args.len()).map(|i| format!("c{i}")).collect();
        Ok(Rows::new(columns, vec![Ok(args.to_vec())]))
    }

    fn begin_transaction(&mut self) -> Result<(), SqlGatewayError> {
        if self.fail_begin {
            return Err(SqlGatewayError::ExecutionError(
                "cannot begin transaction".into(),
            ));
        }
        self.touch("begin");
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<(), SqlGatewayError> {
        if self.fail_commit {
            return Err(SqlGatewayError::ExecutionError(
                "cannot commit transaction".into(),
            ));
        }
        self.touch("commit");
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<(), SqlGatewayError> {
        if self.fail_rollback {
            return Err(SqlGatewayError::ExecutionError(
                "cannot roll back transaction".into(),
            ));
        }
        self.touch("rollback");
        Ok(())
    }
}

/// Calls the driver finished, in completion order.
pub fn completed_ops(log: &CallLog) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|entry| entry.strip_prefix('<').map(str::to_owned))
        .collect()
}

/// Assert that no driver call began while another was still in flight.
pub fn assert_no_overlap(log: &CallLog) {
    let entries = log.lock().unwrap().clone();
    let mut in_flight: Option<String> = None;
    for entry in entries {
        if let Some(label) = entry.strip_prefix('>') {
            assert!(
                in_flight.is_none(),
                "driver call `{label}` began while `{in_flight:?}` was in flight"
            );
            in_flight = Some(label.to_owned());
        } else if let Some(label) = entry.strip_prefix('<') {
            assert_eq!(in_flight.as_deref(), Some(label), "mismatched call exit");
            in_flight = None;
        }
    }
    assert!(in_flight.is_none(), "driver call never finished");
}
