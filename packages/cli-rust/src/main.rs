//! canary-deploy binary entry point

fn main() {
    if let Err(err) = canary_deploy::run() {
        std::process::exit(canary_deploy::report_error(&err));
    }
}
