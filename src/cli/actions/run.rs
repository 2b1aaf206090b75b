use crate::cli::actions::{server, session, Action};
use anyhow::Result;

/// Execute the provided action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::execute(args).await,
        Action::Login(args) => session::login(args).await,
        Action::Register(args) => session::register(args).await,
    }
}
