use std::sync::atomic::{AtomicU64, Ordering};

use crate::services::user_service::UserService;

use super::builder::ServerStateBuilder;
use super::deployment_environment::DeploymentEnvironment;

pub struct ServerState {
    pub(crate) app_name_version: String,
    pub(crate) server_start_time: tokio::time::Instant,
    pub(crate) responses_handled: AtomicU64,
    pub(crate) deployment_environment: DeploymentEnvironment,
    pub(crate) user_service: UserService,
}

impl ServerState {
    pub fn builder() -> ServerStateBuilder {
        ServerStateBuilder::default()
    }

    pub fn get_app_name_version(&self) -> String {
        self.app_name_version.clone()
    }

    pub fn get_uptime(&self) -> tokio::time::Duration {
        self.server_start_time.elapsed()
    }

    pub fn get_deployment_environment(&self) -> DeploymentEnvironment {
        self.deployment_environment
    }

    pub fn get_user_service(&self) -> &UserService {
        &self.user_service
    }

    pub fn get_responses_handled(&self) -> u64 {
        self.responses_handled.load(Ordering::SeqCst)
    }

    pub fn add_responses_handled(&self) {
        self.responses_handled.fetch_add(1, Ordering::SeqCst);
    }
}
