//! Host-specific error types
//!
//! Errors raised while building the fleet from configuration.

use std::net::IpAddr;

use thiserror::Error;

use super::schema::Role;

/// Errors that can occur while assembling fleet hosts
#[derive(Error, Debug)]
pub enum HostError {
    /// A role address could not be parsed
    #[error("Invalid address for {role} host: {reason}")]
    InvalidAddress { role: Role, reason: String },

    /// Two roles were configured with the same address
    #[error("Address {address} is assigned to both the {first} and {second} hosts")]
    DuplicateAddress {
        address: IpAddr,
        first: Role,
        second: Role,
    },

    /// Invalid host configuration
    #[error("Invalid host configuration: {0}")]
    InvalidConfig(String),
}
