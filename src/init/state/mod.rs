pub mod builder;
pub mod deployment_environment;
pub mod server_state;

pub use builder::ServerStateBuilder;
pub use deployment_environment::DeploymentEnvironment;
pub use server_state::ServerState;
