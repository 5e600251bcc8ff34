use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::{GameStore, IdentityStore, StudyStore};

/// Shared application state: immutable configuration plus the store
/// handles, injected into every handler and the credential verifier.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn IdentityStore>,
    pub games: Arc<dyn GameStore>,
    pub studies: Arc<dyn StudyStore>,
}
