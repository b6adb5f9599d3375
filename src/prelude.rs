//! Convenient imports for common functionality.

pub use crate::{
    Config, Credential, DriverConnection, Gateway, Password, PgConnection, PgGateway,
    PreparedStatement, Row, Rows, SqlGatewayError, SqlValue, TxOutcome, TxVerdict,
};
