//! Plan listings for `--dry-run`

use canary_deploy_core::cloud::ProdPlan;
use canary_deploy_core::deploy::ScenarioPlan;
use canary_deploy_core::host::Role;
use comfy_table::{Cell, Color, Table};

/// Table of the steps in a scenario plan
///
/// Commands are rendered through `Display`, so secret arguments stay masked.
pub fn scenario_table(plan: &ScenarioPlan) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Kind", "Host", "Step", "Action"]);

    for (index, step) in plan.steps().iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(step.kind().to_string()),
            Cell::new(format!("{} ({})", step.target().role, step.target().address))
                .fg(role_color(step.target().role)),
            Cell::new(step.description()),
            Cell::new(step.payload().to_string()),
        ]);
    }

    table
}

fn role_color(role: Role) -> Color {
    match role {
        Role::Blue => Color::Blue,
        Role::Green => Color::Green,
        Role::Proxy => Color::Red,
        Role::ConfigServer => Color::Cyan,
    }
}

/// Print a scenario plan without running it
pub fn print_scenario_plan(plan: &ScenarioPlan) {
    println!("{}", scenario_table(plan));
    println!();
    println!("{} plan: {} steps (dry run, nothing executed)", plan.scenario(), plan.len());
}

/// Table of the instance creation requests in a prod plan
pub fn prod_table(plan: &ProdPlan) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Name", "Region", "Size", "Image", "SSH keys"]);

    for (index, request) in plan.requests().iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&request.name),
            Cell::new(&request.region),
            Cell::new(&request.size),
            Cell::new(&request.image),
            Cell::new(if request.ssh_keys.is_empty() {
                "(none)".to_string()
            } else {
                request.ssh_keys.join(", ")
            }),
        ]);
    }

    table
}

/// Print a prod plan without sending any request
pub fn print_prod_plan(plan: &ProdPlan) {
    println!("{}", prod_table(plan));
    println!();
    println!(
        "'{}': {} instances (dry run, token {})",
        plan.name(),
        plan.requests().len(),
        plan.token().preview()
    );
}
