//! Configuration schema for canary-deploy
//!
//! Defines the structure and defaults for the config.json file. The defaults
//! describe the stock local fleet (bakerx VMs on the 192.168.33.0/24 host-only
//! network) so a missing config file still yields a usable setup.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Main configuration structure for canary-deploy
///
/// Serialized to/from `~/.config/canary-deploy/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Config file version for migrations
    pub version: u32,

    /// Address of the proxy host (default: 192.168.33.1)
    #[serde(default = "default_proxy_address")]
    pub proxy_address: String,

    /// Address of the blue host (default: 192.168.33.2)
    #[serde(default = "default_blue_address")]
    pub blue_address: String,

    /// Address of the green host (default: 192.168.33.3)
    #[serde(default = "default_green_address")]
    pub green_address: String,

    /// Address of the configuration server (default: 192.168.33.20)
    #[serde(default = "default_config_server_address")]
    pub config_server_address: String,

    /// Login user on every provisioned VM (default: "vagrant")
    #[serde(default = "default_ssh_user")]
    pub ssh_user: String,

    /// SSH private key used to reach the VMs (default: None, ssh agent/defaults)
    #[serde(default)]
    pub identity_file: Option<String>,

    /// Seconds ssh/scp wait for the TCP connection (default: 30)
    ///
    /// Only bounds connection setup. Remote commands themselves run unbounded.
    #[serde(default = "default_ssh_connect_timeout")]
    pub ssh_connect_timeout: u32,

    /// bakerx image for blue/green/proxy hosts (default: "queues")
    #[serde(default = "default_canary_image")]
    pub canary_image: String,

    /// bakerx image for the configuration server (default: "focal")
    #[serde(default = "default_config_server_image")]
    pub config_server_image: String,

    /// Pass `--sync` to bakerx so existing VMs are reconciled, not recreated
    #[serde(default = "default_provision_sync")]
    pub provision_sync: bool,

    /// Repository cloned onto the blue and green hosts
    #[serde(default = "default_repo_url")]
    pub repo_url: String,

    /// Checkout directory on the blue and green hosts
    ///
    /// Must be absolute: it is quoted for the remote shell, so `~` does not expand.
    #[serde(default = "default_app_dir")]
    pub app_dir: String,

    /// Directory holding the configuration-management scripts on the config server
    ///
    /// Must be absolute, like `app_dir`.
    #[serde(default = "default_cm_dir")]
    pub cm_dir: String,

    /// NAT port forward added to the configuration server
    #[serde(default)]
    pub port_forward: PortForwardConfig,

    /// Cloud provisioning settings for the `prod` command
    #[serde(default)]
    pub cloud: CloudConfig,
}

/// VirtualBox NAT port-forwarding rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PortForwardConfig {
    /// Rule name (default: "jenkins")
    #[serde(default = "default_forward_name")]
    pub name: String,

    /// Protocol, "tcp" or "udp" (default: "tcp")
    #[serde(default = "default_forward_protocol")]
    pub protocol: String,

    /// Port on the workstation (default: 9000)
    #[serde(default = "default_forward_port")]
    pub host_port: u16,

    /// Port inside the VM (default: 9000)
    #[serde(default = "default_forward_port")]
    pub guest_port: u16,
}

/// Cloud provider settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CloudConfig {
    /// API base URL (default: DigitalOcean v2)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Region slug (default: "nyc1")
    #[serde(default = "default_region")]
    pub region: String,

    /// Droplet size slug (default: "s-1vcpu-1gb")
    #[serde(default = "default_size")]
    pub size: String,

    /// Image slug (default: "debian-10-x64")
    #[serde(default = "default_image")]
    pub image: String,

    /// Services that each get one instance
    #[serde(default = "default_services")]
    pub services: Vec<String>,

    /// SSH key fingerprints installed on new instances
    ///
    /// When empty, the `FINGERPRINT` environment variable is consulted.
    #[serde(default)]
    pub ssh_key_fingerprints: Vec<String>,
}

fn default_proxy_address() -> String {
    "192.168.33.1".to_string()
}

fn default_blue_address() -> String {
    "192.168.33.2".to_string()
}

fn default_green_address() -> String {
    "192.168.33.3".to_string()
}

fn default_config_server_address() -> String {
    "192.168.33.20".to_string()
}

fn default_ssh_user() -> String {
    "vagrant".to_string()
}

fn default_ssh_connect_timeout() -> u32 {
    30
}

fn default_canary_image() -> String {
    "queues".to_string()
}

fn default_config_server_image() -> String {
    "focal".to_string()
}

fn default_provision_sync() -> bool {
    true
}

fn default_repo_url() -> String {
    "https://github.com/chrisparnin/checkbox.io-micro-preview".to_string()
}

fn default_app_dir() -> String {
    "/home/vagrant/checkbox.io-micro-preview".to_string()
}

fn default_cm_dir() -> String {
    "/bakerx/cm".to_string()
}

fn default_forward_name() -> String {
    "jenkins".to_string()
}

fn default_forward_protocol() -> String {
    "tcp".to_string()
}

fn default_forward_port() -> u16 {
    9000
}

fn default_api_base_url() -> String {
    "https://api.digitalocean.com/v2".to_string()
}

fn default_region() -> String {
    "nyc1".to_string()
}

fn default_size() -> String {
    "s-1vcpu-1gb".to_string()
}

fn default_image() -> String {
    "debian-10-x64".to_string()
}

fn default_services() -> Vec<String> {
    vec![
        "checkbox".to_string(),
        "iTrust".to_string(),
        "monitoring".to_string(),
    ]
}

/// Validate and parse a host address string
///
/// Accepts IPv4, IPv6 and bracketed IPv6 ("[fd00::2]"). Host names are
/// rejected because bakerx assigns host-only addresses by IP.
pub fn validate_host_address(addr: &str) -> Result<IpAddr, String> {
    let trimmed = addr.trim();

    let stripped = if trimmed.starts_with('[') && trimmed.ends_with(']') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    stripped
        .parse::<IpAddr>()
        .map_err(|_| format!("Invalid host address: '{addr}'. Use an IPv4 or IPv6 address"))
}

impl Default for PortForwardConfig {
    fn default() -> Self {
        Self {
            name: default_forward_name(),
            protocol: default_forward_protocol(),
            host_port: default_forward_port(),
            guest_port: default_forward_port(),
        }
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            region: default_region(),
            size: default_size(),
            image: default_image(),
            services: default_services(),
            ssh_key_fingerprints: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            proxy_address: default_proxy_address(),
            blue_address: default_blue_address(),
            green_address: default_green_address(),
            config_server_address: default_config_server_address(),
            ssh_user: default_ssh_user(),
            identity_file: None,
            ssh_connect_timeout: default_ssh_connect_timeout(),
            canary_image: default_canary_image(),
            config_server_image: default_config_server_image(),
            provision_sync: default_provision_sync(),
            repo_url: default_repo_url(),
            app_dir: default_app_dir(),
            cm_dir: default_cm_dir(),
            port_forward: PortForwardConfig::default(),
            cloud: CloudConfig::default(),
        }
    }
}

impl Config {
    /// Path of the config-server bootstrap script
    pub fn init_script(&self) -> String {
        format!("{}/server-init.sh", self.cm_dir.trim_end_matches('/'))
    }

    /// Path of the ansible wrapper script
    pub fn ansible_script(&self) -> String {
        format!("{}/run-ansible.sh", self.cm_dir.trim_end_matches('/'))
    }

    /// Path of the playbook handed to the ansible wrapper
    pub fn playbook_path(&self) -> String {
        format!("{}/playbook.yml", self.cm_dir.trim_end_matches('/'))
    }

    /// Path of the inventory handed to the ansible wrapper
    pub fn inventory_path(&self) -> String {
        format!("{}/inventory.ini", self.cm_dir.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.proxy_address, "192.168.33.1");
        assert_eq!(config.blue_address, "192.168.33.2");
        assert_eq!(config.green_address, "192.168.33.3");
        assert_eq!(config.config_server_address, "192.168.33.20");
        assert_eq!(config.ssh_user, "vagrant");
        assert!(config.identity_file.is_none());
        assert!(config.provision_sync);
        assert_eq!(config.port_forward.host_port, 9000);
        assert_eq!(config.cloud.region, "nyc1");
        assert_eq!(config.cloud.services, vec!["checkbox", "iTrust", "monitoring"]);
    }

    #[test]
    fn test_deserialize_with_missing_optional_fields() {
        let json = r#"{"version": 1}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_deserialize_partial_nested_section() {
        let json = r#"{"version": 1, "cloud": {"region": "sfo3"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.cloud.region, "sfo3");
        assert_eq!(config.cloud.image, "debian-10-x64");
        assert_eq!(config.cloud.services.len(), 3);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut config = Config::default();
        config.identity_file = Some("~/.bakerx/insecure_private_key".to_string());
        config.cloud.ssh_key_fingerprints = vec!["aa:bb".to_string()];
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_reject_unknown_fields() {
        let json = r#"{"version": 1, "api_token": "secret"}"#;
        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_reject_unknown_nested_fields() {
        let json = r#"{"version": 1, "port_forward": {"name": "x", "bogus": true}}"#;
        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_script_paths_follow_cm_dir() {
        let mut config = Config::default();
        assert_eq!(config.init_script(), "/bakerx/cm/server-init.sh");
        assert_eq!(config.playbook_path(), "/bakerx/cm/playbook.yml");

        config.cm_dir = "/opt/cm/".to_string();
        assert_eq!(config.ansible_script(), "/opt/cm/run-ansible.sh");
        assert_eq!(config.inventory_path(), "/opt/cm/inventory.ini");
    }

    #[test]
    fn test_validate_host_address_ipv4() {
        let ip = validate_host_address("192.168.33.2").unwrap();
        assert_eq!(ip.to_string(), "192.168.33.2");
    }

    #[test]
    fn test_validate_host_address_bracketed_ipv6() {
        let ip = validate_host_address("[fd00::2]").unwrap();
        assert_eq!(ip.to_string(), "fd00::2");
    }

    #[test]
    fn test_validate_host_address_rejects_hostname() {
        let err = validate_host_address("blue.local").unwrap_err();
        assert!(err.contains("blue.local"));
    }
}
