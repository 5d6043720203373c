use crate::{AskDbError, Result};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default)]
pub enum SslMode {
    Disable,
    Allow,
    #[default]
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Allow => "allow",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        }
    }

    /// Modes that refuse to talk to the server without TLS. Connections are
    /// made without a TLS connector, so these can never succeed.
    pub fn requires_tls(&self) -> bool {
        matches!(self, SslMode::Require | SslMode::VerifyCa | SslMode::VerifyFull)
    }

    /// The value tokio-postgres understands. It has no notion of `allow` or
    /// the verifying modes, so those collapse onto the closest setting.
    fn driver_value(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Allow | SslMode::Prefer => "prefer",
            SslMode::Require | SslMode::VerifyCa | SslMode::VerifyFull => "require",
        }
    }
}

impl FromStr for SslMode {
    type Err = AskDbError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "disable" => Ok(SslMode::Disable),
            "allow" => Ok(SslMode::Allow),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            "verify-ca" => Ok(SslMode::VerifyCa),
            "verify-full" => Ok(SslMode::VerifyFull),
            _ => Err(AskDbError::InvalidSslMode(s.to_string())),
        }
    }
}

impl Display for SslMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how to connect to the database being described.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: SslMode,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub const DEFAULT_PORT: u16 = 5432;
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(host: &str, database: &str, user: &str, password: &str) -> Self {
        DatabaseConfig {
            host: host.to_string(),
            port: Self::DEFAULT_PORT,
            database: database.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            ssl_mode: SslMode::default(),
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn validate(&self) -> Result {
        let required = [
            ("host", &self.host),
            ("database", &self.database),
            ("user", &self.user),
            ("password", &self.password),
        ];

        for (name, value) in required {
            if value.is_empty() {
                return Err(AskDbError::InvalidConfig(format!("{} must not be empty", name)));
            }
        }

        if self.port == 0 {
            return Err(AskDbError::InvalidConfig("port must be between 1 and 65535".to_string()));
        }

        if self.ssl_mode.requires_tls() {
            return Err(AskDbError::InvalidConfig(format!(
                "ssl mode '{}' needs TLS, which is not supported. Use disable, allow or prefer",
                self.ssl_mode
            )));
        }

        Ok(())
    }

    pub fn to_connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={} sslmode={} connect_timeout={}",
            quote_connection_value(&self.host),
            self.port,
            quote_connection_value(&self.user),
            quote_connection_value(&self.password),
            quote_connection_value(&self.database),
            self.ssl_mode.driver_value(),
            self.connect_timeout.as_secs().max(1),
        )
    }

    /// The connection target without credentials, suitable for logs.
    pub fn describe(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

fn quote_connection_value(value: &str) -> String {
    if !value.is_empty() && !value.contains([' ', '\'', '\\']) {
        return value.to_string();
    }

    let mut s = String::with_capacity(value.len() + 2);
    s.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            s.push('\\');
        }
        s.push(c);
    }
    s.push('\'');
    s
}
