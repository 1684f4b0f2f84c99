use anyhow::bail;
use chrono::Duration;
use clap::Parser;
use core::fmt;

/// Runtime configuration for the `roster-tonic-server` binary.
///
/// Every setting can come from a CLI flag or an environment variable; a
/// `.env` file in the working directory is loaded first.
#[derive(Parser, Clone)]
#[command(
    name = "roster-tonic-server",
    version,
    about = "A gRPC service for employee records"
)]
pub struct CliArgs {
    /// Address to listen on (TCP or Unix socket path; use --uds for Unix socket).
    ///
    /// Example: "0.0.0.0:50051" or "/tmp/roster.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:50051"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be a file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,

    /// HMAC secret used to sign and verify bearer tokens. Required.
    ///
    /// Environment variable: `JWT_SECRET`
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Lifetime of an issued token, in seconds.
    ///
    /// Environment variable: `JWT_EXPIRATION_SECS`
    #[arg(long, env = "JWT_EXPIRATION_SECS", default_value_t = 86_400)]
    pub jwt_expiration_secs: i64,

    /// Value of the `iss` claim stamped on and required of every token.
    ///
    /// Environment variable: `JWT_ISSUER`
    #[arg(long, env = "JWT_ISSUER", default_value_t = String::from("roster"))]
    pub jwt_issuer: String,

    /// PostgreSQL connection string. When unset, records live in memory and
    /// are lost on restart.
    ///
    /// Environment variable: `DATABASE_URL`
    #[cfg(feature = "postgres")]
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Upper bound on pooled database connections.
    ///
    /// Environment variable: `DB_MAX_CONNECTIONS`
    #[cfg(feature = "postgres")]
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub db_max_connections: u32,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub uds: bool,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub jwt_issuer: String,
    #[cfg(feature = "postgres")]
    pub database_url: Option<String>,
    #[cfg(feature = "postgres")]
    pub db_max_connections: u32,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        if args.jwt_expiration_secs <= 0 {
            bail!(
                "JWT_EXPIRATION_SECS must be greater than 0 (got {})",
                args.jwt_expiration_secs
            );
        }

        let Some(jwt_ttl) = Duration::try_seconds(args.jwt_expiration_secs) else {
            bail!(
                "JWT_EXPIRATION_SECS ({}) is out of range",
                args.jwt_expiration_secs
            );
        };

        if args.jwt_issuer.trim().is_empty() {
            bail!("JWT_ISSUER must not be empty");
        }

        #[cfg(feature = "postgres")]
        if args.db_max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be greater than 0");
        }

        Ok(Self {
            server_addr: args.server_addr,
            uds: args.uds,
            jwt_secret: args.jwt_secret,
            jwt_ttl,
            jwt_issuer: args.jwt_issuer,
            #[cfg(feature = "postgres")]
            database_url: args.database_url,
            #[cfg(feature = "postgres")]
            db_max_connections: args.db_max_connections,
        })
    }
}

impl fmt::Debug for CliArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("CliArgs");
        s.field("server_addr", &self.server_addr)
            .field("uds", &self.uds)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_issuer", &self.jwt_issuer);
        #[cfg(feature = "postgres")]
        s.field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("db_max_connections", &self.db_max_connections);
        s.finish()
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ServerConfig");
        s.field("server_addr", &self.server_addr)
            .field("uds", &self.uds)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl_secs", &self.jwt_ttl.num_seconds())
            .field("jwt_issuer", &self.jwt_issuer);
        #[cfg(feature = "postgres")]
        s.field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("db_max_connections", &self.db_max_connections);
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> anyhow::Result<ServerConfig> {
        let args = ["roster-tonic-server", "--jwt-secret", "s3cr3t"]
            .into_iter()
            .chain(extra.iter().copied());
        ServerConfig::try_from(CliArgs::try_parse_from(args)?)
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:50051");
        assert!(!config.uds);
        assert_eq!(config.jwt_ttl, Duration::hours(24));
        assert_eq!(config.jwt_issuer, "roster");
    }

    #[test]
    fn rejects_blank_secret() {
        let args = CliArgs::try_parse_from(["roster-tonic-server", "--jwt-secret", "  "]).unwrap();
        let err = ServerConfig::try_from(args).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn rejects_non_positive_expiration() {
        for flag in ["--jwt-expiration-secs=0", "--jwt-expiration-secs=-5"] {
            let err = parse(&[flag]).unwrap_err();
            assert!(err.to_string().contains("JWT_EXPIRATION_SECS"));
        }
    }

    #[test]
    fn debug_redacts_secret() {
        let config = parse(&["--jwt-issuer", "payroll"]).unwrap();
        let rendered = format!("{config:?}");
        assert!(rendered.contains("payroll"));
        assert!(!rendered.contains("s3cr3t"));
    }
}
