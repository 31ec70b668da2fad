//! Version information for canary-deploy

/// Get the current version string
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get the long version string with build information
///
/// Falls back to "unknown" when the build metadata variables were not set.
pub fn get_version_long() -> String {
    let version = get_version();

    let git_hash = option_env!("CANARY_DEPLOY_GIT_HASH").unwrap_or("unknown");
    let build_date = option_env!("CANARY_DEPLOY_BUILD_DATE").unwrap_or("unknown");

    format!("{version} (git: {git_hash}, built: {build_date})")
}
