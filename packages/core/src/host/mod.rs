//! Fleet hosts and the collaborators that act on them
//!
//! - Role/host model and fleet construction from configuration
//! - Remote command execution over ssh
//! - VM provisioning through bakerx/VBoxManage
//! - File transfer over scp

mod copy;
mod error;
mod provision;
mod schema;
mod ssh;

// Public exports
pub use copy::{FileTransfer, ScpTransfer};
pub use error::HostError;
pub use provision::{BakerxProvisioner, HostProvisioner};
pub use schema::{Fleet, Host, Role};
pub use ssh::{RemoteExecutor, SshExecutor};
