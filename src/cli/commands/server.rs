use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

pub const DEFAULT_PORT: u16 = 3001;

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_RECORD_URL: &str = "record-url";
pub const ARG_RECORD_KEY: &str = "record-key";
pub const ARG_TOKEN_SECRET: &str = "token-secret";

#[must_use]
pub fn command() -> Command {
    Command::new("server")
        .about("Run the HTTP API")
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on (falls back to PORT, then 3001)")
                .env("ACCESO_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long("dsn")
                .help("PostgreSQL connection string for the credential store")
                .long_help(
                    "PostgreSQL connection string for the credential store. Without it users are kept in memory and lost on restart.",
                )
                .env("ACCESO_DSN"),
        )
        .arg(
            Arg::new(ARG_RECORD_URL)
                .long("record-url")
                .help("URL of the remote JSON document served at GET /")
                .env("ACCESO_RECORD_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_RECORD_KEY)
                .long("record-key")
                .help("Access key sent upstream as X-Master-Key")
                .env("ACCESO_RECORD_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long("token-secret")
                .help("HMAC secret for session tokens (random per process when unset)")
                .env("ACCESO_TOKEN_SECRET")
                .hide_env_values(true),
        )
}

#[derive(Debug)]
pub struct Options {
    pub port: u16,
    pub dsn: Option<String>,
    pub record_url: Url,
    pub record_key: SecretString,
    pub token_secret: Option<SecretString>,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing or the record URL is invalid.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let port = matches
            .get_one::<u16>(ARG_PORT)
            .copied()
            .or_else(|| std::env::var("PORT").ok()?.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let record_url = matches
            .get_one::<String>(ARG_RECORD_URL)
            .context("missing required argument: --record-url")?;
        let record_url = Url::parse(record_url).context("invalid ACCESO_RECORD_URL")?;

        let record_key = matches
            .get_one::<String>(ARG_RECORD_KEY)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --record-key")?;

        let token_secret = matches
            .get_one::<String>(ARG_TOKEN_SECRET)
            .filter(|secret| !secret.is_empty())
            .cloned()
            .map(SecretString::from);

        Ok(Self {
            port,
            dsn: matches.get_one::<String>(ARG_DSN).cloned(),
            record_url,
            record_key,
            token_secret,
        })
    }
}
