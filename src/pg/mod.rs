// PostgreSQL backing for the gateway.
//
// - params: gateway value -> wire parameter conversion
// - query: decoding driver rows into gateway rows

pub mod params;
pub mod query;

use postgres::{Client, NoTls};

use crate::config::Config;
use crate::driver::DriverConnection;
use crate::error::SqlGatewayError;
use crate::gateway::Gateway;
use crate::rows::Rows;
use crate::types::SqlValue;

/// Driver session over a blocking `postgres` client.
///
/// The client is a stateful, non-reentrant session; it is only ever touched
/// from the owning gateway's worker lane.
pub struct PgConnection {
    client: Client,
}

impl PgConnection {
    /// Open the session described by `config`. Connections are made without
    /// TLS.
    ///
    /// # Errors
    /// Returns [`SqlGatewayError::ConfigError`] for invalid settings and
    /// [`SqlGatewayError::PostgresError`] when session establishment fails.
    pub fn connect(config: &Config) -> Result<Self, SqlGatewayError> {
        let pg_config = build_pg_config(config)?;
        let client = pg_config.connect(NoTls)?;
        Ok(Self { client })
    }
}

fn build_pg_config(config: &Config) -> Result<postgres::Config, SqlGatewayError> {
    if config.host.is_empty() {
        return Err(SqlGatewayError::ConfigError("host is required".to_string()));
    }

    let mut pg_config = postgres::Config::new();
    pg_config.host(&config.host);
    pg_config.port(config.port);
    if let Some(database) = &config.database {
        pg_config.dbname(database);
    }
    if let Some(credential) = &config.credential {
        if credential.user.is_empty() {
            return Err(SqlGatewayError::ConfigError(
                "credential user is required".to_string(),
            ));
        }
        pg_config.user(&credential.user);
        if let Some(password) = &credential.password {
            pg_config.password(password.secret());
        }
    }

    Ok(pg_config)
}

impl DriverConnection for PgConnection {
    type Statement = postgres::Statement;

    fn prepare(&mut self, sql: &str) -> Result<Self::Statement, SqlGatewayError> {
        Ok(self.client.prepare(sql)?)
    }

    fn execute(
        &mut self,
        statement: &Self::Statement,
        args: &[SqlValue],
    ) -> Result<Rows, SqlGatewayError> {
        let params = params::as_sql_refs(args);
        let rows = self.client.query(statement, &params)?;
        Ok(query::decode_rows(statement, &rows))
    }

    fn begin_transaction(&mut self) -> Result<(), SqlGatewayError> {
        Ok(self.client.batch_execute("BEGIN")?)
    }

    fn commit_transaction(&mut self) -> Result<(), SqlGatewayError> {
        Ok(self.client.batch_execute("COMMIT")?)
    }

    fn rollback_transaction(&mut self) -> Result<(), SqlGatewayError> {
        Ok(self.client.batch_execute("ROLLBACK")?)
    }
}

impl Gateway<PgConnection> {
    /// Connect to a server and wrap the session in a gateway in one step.
    ///
    /// # Errors
    /// Same conditions as [`PgConnection::connect`] plus
    /// [`SqlGatewayError::ConnectionError`] if the worker lane cannot be
    /// spawned.
    pub fn connect(config: &Config) -> Result<Self, SqlGatewayError> {
        Gateway::new(PgConnection::connect(config)?)
    }
}
