use std::sync::Arc;

use crate::api::ApiClient;
use crate::cli::utils::prompt_confirm;
use crate::config::AppConfig;
use crate::guard::{Navigator, Route};
use crate::records::{Confirm, RecordsManager};
use crate::session::{FileStorage, SessionStore};

/// Everything a command needs, wired from configuration
pub struct CliContext {
    pub session: Arc<SessionStore>,
    pub records: RecordsManager,
}

impl CliContext {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = ApiClient::from_config(config)?;
        let storage = FileStorage::new(config.session_path()?);
        tracing::debug!(
            api = client.base_url(),
            session = %storage.path().display(),
            "cli context ready"
        );

        let session = Arc::new(SessionStore::new(client, storage));
        let records = RecordsManager::new(session.clone(), Arc::new(TerminalNavigator));

        Ok(Self { session, records })
    }
}

/// Terminal stand-in for a page redirect: tell the operator where to go next.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, route: Route) {
        match route {
            Route::Login => eprintln!("→ Session ended. Log in again with `useradmin auth login <email>`."),
            Route::Register => eprintln!("→ Create an account with `useradmin auth register`."),
            Route::Dashboard => eprintln!("→ Continue with `useradmin users list`."),
        }
    }
}

/// Interactive y/N prompt, or an automatic yes for `--yes`
pub struct TerminalConfirm {
    pub assume_yes: bool,
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        prompt_confirm(prompt).unwrap_or(false)
    }
}
