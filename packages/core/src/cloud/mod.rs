//! Cloud instance provisioning for the prod scenario
//!
//! - Prod plan builder and the best-effort creation loop
//! - DigitalOcean droplet client
//! - Cloud-specific error types

mod digitalocean;
mod error;
mod provision;

pub use digitalocean::DigitalOceanClient;
pub use error::CloudError;
pub use provision::{
    ApiToken, CloudProvider, InstanceEvent, InstanceId, InstanceRequest, ProdParams, ProdPlan,
    ProvisionReport, build_prod_plan, provision_all,
};
