use std::sync::atomic::AtomicU64;

use crate::services::user_service::UserService;

use super::deployment_environment::DeploymentEnvironment;
use super::server_state::ServerState;

#[derive(Default)]
pub struct ServerStateBuilder {
    app_name_version: Option<String>,
    server_start_time: Option<tokio::time::Instant>,
    deployment_environment: Option<DeploymentEnvironment>,
    user_service: Option<UserService>,
}

impl ServerStateBuilder {
    pub fn app_name_version(mut self, app_name_version: String) -> Self {
        self.app_name_version = Some(app_name_version);
        self
    }

    pub fn server_start_time(mut self, server_start_time: tokio::time::Instant) -> Self {
        self.server_start_time = Some(server_start_time);
        self
    }

    pub fn deployment_environment(mut self, deployment_environment: DeploymentEnvironment) -> Self {
        self.deployment_environment = Some(deployment_environment);
        self
    }

    pub fn user_service(mut self, user_service: UserService) -> Self {
        self.user_service = Some(user_service);
        self
    }

    pub fn build(self) -> anyhow::Result<ServerState> {
        Ok(ServerState {
            app_name_version: self
                .app_name_version
                .ok_or_else(|| anyhow::anyhow!("app_name_version is required"))?,
            server_start_time: self
                .server_start_time
                .ok_or_else(|| anyhow::anyhow!("server_start_time is required"))?,
            responses_handled: AtomicU64::new(0u64),
            deployment_environment: self
                .deployment_environment
                .ok_or_else(|| anyhow::anyhow!("deployment_environment is required"))?,
            user_service: self
                .user_service
                .ok_or_else(|| anyhow::anyhow!("user_service is required"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::user_service::tests::unconnected_service;

    #[tokio::test]
    async fn missing_field_is_reported_by_name() {
        let err = ServerState::builder()
            .app_name_version("cr-user-backend 0.1.0".to_string())
            .server_start_time(tokio::time::Instant::now())
            .deployment_environment(DeploymentEnvironment::Local)
            .build()
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "user_service is required");

        let state = ServerState::builder()
            .app_name_version("cr-user-backend 0.1.0".to_string())
            .server_start_time(tokio::time::Instant::now())
            .deployment_environment(DeploymentEnvironment::Local)
            .user_service(unconnected_service())
            .build()
            .unwrap();
        assert_eq!(state.get_responses_handled(), 0);
        state.add_responses_handled();
        assert_eq!(state.get_responses_handled(), 1);
    }
}
