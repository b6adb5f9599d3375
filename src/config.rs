/// Connection settings for a gateway-owned session.
///
/// Defaults match a local server: host `::1`, port 5432, no database name,
/// no credential.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
    pub credential: Option<Credential>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "::1".to_owned(),
            port: 5432,
            database: None,
            credential: None,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }
}

/// User identity presented during session establishment.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user: String,
    pub password: Option<Password>,
}

impl Credential {
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: None,
        }
    }

    #[must_use]
    pub fn with_password(mut self, password: Password) -> Self {
        self.password = Some(password);
        self
    }
}

/// Password material for [`Credential`].
///
/// Both forms hand the secret to the driver's authentication negotiation;
/// `Md5` records that the password is intended for the MD5 flow.
#[derive(Debug, Clone)]
pub enum Password {
    Cleartext(String),
    Md5(String),
}

impl Password {
    pub(crate) fn secret(&self) -> &str {
        match self {
            Password::Cleartext(secret) | Password::Md5(secret) => secret,
        }
    }
}
