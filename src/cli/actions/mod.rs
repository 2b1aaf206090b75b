pub mod server;
pub mod session;

// Single dispatch point for `Action`, kept apart so this file stays small.
mod run;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    Login(session::LoginArgs),
    Register(session::RegisterArgs),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
