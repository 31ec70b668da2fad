//! Fleet model
//!
//! Roles, host descriptors, and the fleet built from configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use super::error::HostError;
use crate::config::{Config, validate_host_address};

/// Logical function of a host in the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Routes traffic in front of blue and green
    Proxy,
    /// Runs the baseline version
    Blue,
    /// Runs the candidate version
    Green,
    /// Hosts the configuration-management tooling (Jenkins, ansible)
    ConfigServer,
}

impl Role {
    /// All roles, in fleet order
    pub const ALL: [Role; 4] = [Role::Proxy, Role::Blue, Role::Green, Role::ConfigServer];

    /// VM name registered with the hypervisor
    pub fn vm_name(self) -> &'static str {
        match self {
            Role::Proxy => "proxy-srv",
            Role::Blue => "blue-srv",
            Role::Green => "green-srv",
            Role::ConfigServer => "config-srv",
        }
    }

    /// Upper-case label used in progress output
    pub fn label(self) -> &'static str {
        match self {
            Role::Proxy => "PROXY",
            Role::Blue => "BLUE",
            Role::Green => "GREEN",
            Role::ConfigServer => "CONFIG",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Proxy => write!(f, "proxy"),
            Role::Blue => write!(f, "blue"),
            Role::Green => write!(f, "green"),
            Role::ConfigServer => write!(f, "config-server"),
        }
    }
}

/// One machine of the fleet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub role: Role,
    pub address: IpAddr,
    /// Login user for ssh/scp
    pub user: String,
    /// Path to SSH identity file (private key)
    pub identity_file: Option<String>,
}

impl Host {
    pub fn new(role: Role, address: IpAddr, user: impl Into<String>) -> Self {
        Self {
            role,
            address,
            user: user.into(),
            identity_file: None,
        }
    }

    /// Builder pattern: set identity file
    pub fn with_identity_file(mut self, path: impl Into<String>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// Remote-shell identity: `user@address`
    pub fn identity(&self) -> String {
        format!("{}@{}", self.user, self.address)
    }

    /// scp destination for `remote_path`
    ///
    /// IPv6 addresses are bracketed so the path separator stays unambiguous.
    pub fn scp_target(&self, remote_path: &str) -> String {
        match self.address {
            IpAddr::V4(addr) => format!("{}@{}:{}", self.user, addr, remote_path),
            IpAddr::V6(addr) => format!("{}@[{}]:{}", self.user, addr, remote_path),
        }
    }
}

/// The four role hosts of one deployment
///
/// Construction guarantees every role has a distinct address, so two
/// provisioning steps can never claim the same IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    proxy: Host,
    blue: Host,
    green: Host,
    config_server: Host,
}

impl Fleet {
    /// Build the fleet from configured addresses and login settings
    pub fn from_config(config: &Config) -> Result<Self, HostError> {
        let mut seen: HashMap<IpAddr, Role> = HashMap::new();
        let mut build = |role: Role, raw: &str| -> Result<Host, HostError> {
            let address = validate_host_address(raw)
                .map_err(|reason| HostError::InvalidAddress { role, reason })?;

            if let Some(existing) = seen.insert(address, role) {
                return Err(HostError::DuplicateAddress {
                    address,
                    first: existing,
                    second: role,
                });
            }

            let mut host = Host::new(role, address, config.ssh_user.clone());
            host.identity_file = config.identity_file.clone();
            Ok(host)
        };

        if config.ssh_user.trim().is_empty() {
            return Err(HostError::InvalidConfig(
                "ssh_user must not be empty".to_string(),
            ));
        }

        Ok(Self {
            proxy: build(Role::Proxy, &config.proxy_address)?,
            blue: build(Role::Blue, &config.blue_address)?,
            green: build(Role::Green, &config.green_address)?,
            config_server: build(Role::ConfigServer, &config.config_server_address)?,
        })
    }

    /// Override the SSH identity of every host
    ///
    /// `None` keeps whatever the configuration provided.
    pub fn with_identity_file(mut self, path: Option<&str>) -> Self {
        if let Some(path) = path {
            for host in [
                &mut self.proxy,
                &mut self.blue,
                &mut self.green,
                &mut self.config_server,
            ] {
                host.identity_file = Some(path.to_string());
            }
        }
        self
    }

    pub fn host(&self, role: Role) -> &Host {
        match role {
            Role::Proxy => &self.proxy,
            Role::Blue => &self.blue,
            Role::Green => &self.green,
            Role::ConfigServer => &self.config_server,
        }
    }

    /// Hosts in fleet order
    pub fn hosts(&self) -> [&Host; 4] {
        Role::ALL.map(|role| self.host(role))
    }
}
