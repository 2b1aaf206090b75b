use crate::client::DEFAULT_BACKEND_URL;
use clap::{Arg, Command};

pub const ARG_BACKEND_URL: &str = "backend-url";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_NOMBRES: &str = "nombres";
pub const ARG_APELLIDOS: &str = "apellidos";
pub const ARG_COOKIE_JAR: &str = "cookie-jar";

fn with_common_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BACKEND_URL)
                .long("backend-url")
                .help("Base URL of the acceso API")
                .env("ACCESO_BACKEND_URL")
                .default_value(DEFAULT_BACKEND_URL),
        )
        .arg(
            Arg::new(ARG_EMAIL)
                .short('e')
                .long("email")
                .help("Account email")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .long("password")
                .help("Account password")
                .env("ACCESO_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}

#[must_use]
pub fn login_command() -> Command {
    with_common_args(Command::new("login").about("Sign in and store the session cookies")).arg(
        Arg::new(ARG_COOKIE_JAR)
            .long("cookie-jar")
            .help("File to write the session cookies to"),
    )
}

#[must_use]
pub fn register_command() -> Command {
    with_common_args(Command::new("register").about("Create an account"))
        .arg(
            Arg::new(ARG_NOMBRES)
                .long("nombres")
                .help("Given name(s)")
                .required(true),
        )
        .arg(
            Arg::new(ARG_APELLIDOS)
                .long("apellidos")
                .help("Surname(s)")
                .required(true),
        )
}
