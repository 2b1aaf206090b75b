//! Maps parsed subcommands to the action that runs them.

use crate::cli::{
    actions::{
        server::Args,
        session::{LoginArgs, RegisterArgs},
        Action,
    },
    commands::{server, session},
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("server", sub)) => {
            let opts = server::Options::parse(sub)?;
            Ok(Action::Server(Args {
                port: opts.port,
                dsn: opts.dsn,
                record_url: opts.record_url,
                record_key: opts.record_key,
                token_secret: opts.token_secret,
            }))
        }
        Some(("login", sub)) => Ok(Action::Login(LoginArgs {
            backend_url: required(sub, session::ARG_BACKEND_URL)?,
            email: required(sub, session::ARG_EMAIL)?,
            password: SecretString::from(required(sub, session::ARG_PASSWORD)?),
            cookie_jar: sub
                .get_one::<String>(session::ARG_COOKIE_JAR)
                .map(std::path::PathBuf::from),
        })),
        Some(("register", sub)) => Ok(Action::Register(RegisterArgs {
            backend_url: required(sub, session::ARG_BACKEND_URL)?,
            email: required(sub, session::ARG_EMAIL)?,
            password: SecretString::from(required(sub, session::ARG_PASSWORD)?),
            nombres: required(sub, session::ARG_NOMBRES)?,
            apellidos: required(sub, session::ARG_APELLIDOS)?,
        })),
        Some((name, _)) => Err(anyhow!("unknown subcommand: {name}")),
        None => Err(anyhow!("no subcommand given")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn server_action() {
        temp_env::with_vars(
            [
                ("ACCESO_PORT", None::<&str>),
                ("PORT", None),
                ("ACCESO_DSN", None),
                ("ACCESO_TOKEN_SECRET", None),
                ("ACCESO_RECORD_URL", Some("https://records.local/b/1")),
                ("ACCESO_RECORD_KEY", Some("master-key")),
            ],
            || {
                let matches = commands::new().get_matches_from(vec!["acceso", "server"]);
                let Action::Server(args) = handler(&matches).unwrap() else {
                    panic!("expected server action");
                };
                assert_eq!(args.port, 3001);
                assert!(args.dsn.is_none());
                assert_eq!(args.record_key.expose_secret(), "master-key");
            },
        );
    }

    #[test]
    fn login_action() {
        temp_env::with_vars(
            [
                ("ACCESO_BACKEND_URL", Some("http://api.local:3001")),
                ("ACCESO_PASSWORD", Some("secret1")),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "acceso",
                    "login",
                    "--email",
                    "ana@x.com",
                    "--cookie-jar",
                    "/tmp/acceso.cookies",
                ]);
                let Action::Login(args) = handler(&matches).unwrap() else {
                    panic!("expected login action");
                };
                assert_eq!(args.backend_url, "http://api.local:3001");
                assert_eq!(args.email, "ana@x.com");
                assert_eq!(args.password.expose_secret(), "secret1");
                assert_eq!(
                    args.cookie_jar,
                    Some(std::path::PathBuf::from("/tmp/acceso.cookies"))
                );
            },
        );
    }

    #[test]
    fn register_action() {
        temp_env::with_vars([("ACCESO_PASSWORD", Some("secret1"))], || {
            let matches = commands::new().get_matches_from(vec![
                "acceso",
                "register",
                "--email",
                "ana@x.com",
                "--nombres",
                "Ana",
                "--apellidos",
                "Pérez",
            ]);
            let Action::Register(args) = handler(&matches).unwrap() else {
                panic!("expected register action");
            };
            assert_eq!(args.nombres, "Ana");
            assert_eq!(args.apellidos, "Pérez");
        });
    }
}
