use std::net::IpAddr;

use anyhow::anyhow;

use super::state::DeploymentEnvironment;

const DEFAULT_PG_PORT: u16 = 5432;
const DEFAULT_HOST_IP: &str = "0.0.0.0";
const DEFAULT_HOST_PORT: u16 = 3000;
const DEFAULT_LOGS_DIR: &str = "./logs";

#[derive(Debug, PartialEq, Eq)]
pub struct DbConfig {
    db_host: String,
    db_port: Option<u16>,
    db_username: String,
    db_password: String,
    db_name: String,
}

impl DbConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let is_socket_path = std::env::var("DB_HOST")
            .ok()
            .is_some_and(|host| host.starts_with('/'));

        if !is_socket_path {
            if let Ok(db_url) = std::env::var("DB_URL") {
                return Self::from_url(&db_url);
            }
        }

        let db_host = std::env::var("DB_HOST")
            .map_err(|_| anyhow!("Environment variable DB_HOST not found"))?;

        let db_port = if db_host.starts_with('/') {
            None
        } else {
            Some(
                std::env::var("DB_PORT")
                    .map_err(|_| anyhow!("Environment variable DB_PORT not found"))?
                    .parse::<u16>()?,
            )
        };

        let db_username = std::env::var("DB_USERNAME")
            .map_err(|_| anyhow!("Environment variable DB_USERNAME not found"))?;

        let db_password = std::env::var("DB_PASSWORD")
            .map_err(|_| anyhow!("Environment variable DB_PASSWORD not found"))?;

        let db_name = std::env::var("DB_NAME")
            .map_err(|_| anyhow!("Environment variable DB_NAME not found"))?;

        Ok(DbConfig {
            db_host,
            db_port,
            db_username,
            db_password,
            db_name,
        })
    }

    pub fn from_url(url: &str) -> anyhow::Result<Self> {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| anyhow!("Invalid URL format"))?;

        match scheme.trim().to_lowercase().as_ref() {
            "postgres" | "psql" | "postgresql" | "pg" => (),
            _ => {
                return Err(anyhow!(
                    "Unsupported DB; only postgreSQL is supported for now."
                ));
            }
        };

        let (credentials, host_and_path) = rest
            .rsplit_once('@')
            .ok_or_else(|| anyhow!("Missing credentials"))?;

        let (db_username, db_password) = match credentials.split_once(':') {
            Some((user, pw)) => (user.to_string(), pw.to_string()),
            None => (credentials.to_string(), String::new()),
        };

        let (host_and_port, db_name) = match host_and_path.split_once('/') {
            Some((host_and_port, db_name)) => (host_and_port, db_name.to_string()),
            None => (host_and_path, String::new()),
        };

        if host_and_port.is_empty() {
            return Err(anyhow!("Missing host"));
        }

        let (db_host, db_port) = match host_and_port.split_once(':') {
            Some((host, port_str)) => (host, port_str.parse::<u16>()?),
            None => (host_and_port, DEFAULT_PG_PORT),
        };

        Ok(DbConfig {
            db_host: db_host.to_owned(),
            db_port: Some(db_port),
            db_username,
            db_password,
            db_name,
        })
    }

    pub fn to_url(&self) -> String {
        // Unix socket
        if self.db_host.starts_with('/') {
            return format!(
                "postgres://{user}:{pw}@/{db}?host={host}",
                user = self.db_username,
                pw = self.db_password,
                db = self.db_name,
                host = self.db_host
            );
        }

        format!(
            "postgres://{user}:{pw}@{host}{port}/{db}",
            user = self.db_username,
            pw = self.db_password,
            host = self.db_host,
            port = match self.db_port {
                Some(port) => format!(":{port}"),
                None => String::new(),
            },
            db = self.db_name
        )
    }
}

pub struct ServerConfig {
    pub host_ip: IpAddr,
    pub host_port: u16,
    pub deployment_environment: DeploymentEnvironment,
    pub logs_dir: String,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host_ip = std::env::var("HOST_IP")
            .unwrap_or_else(|_| DEFAULT_HOST_IP.to_string())
            .parse::<IpAddr>()
            .map_err(|e| anyhow!("HOST_IP is not a valid IP address: {e}"))?;

        let host_port = match std::env::var("HOST_PORT") {
            Ok(port) => port
                .parse::<u16>()
                .map_err(|e| anyhow!("HOST_PORT is not a valid port: {e}"))?,
            Err(_) => DEFAULT_HOST_PORT,
        };

        let deployment_environment =
            DeploymentEnvironment::from_env_value(std::env::var("CURR_ENV").ok().as_deref());

        let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| DEFAULT_LOGS_DIR.to_string());

        Ok(ServerConfig {
            host_ip,
            host_port,
            deployment_environment,
            logs_dir,
        })
    }

    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.host_ip, self.host_port)
    }
}
