//! When steps for rollback BDD scenarios.

use super::world::{RollbackWorld, run_async};
use emaj_gateway::catalog::domain::{GroupSelection, MarkName};
use emaj_gateway::rollback::domain::RollbackRequest;
use rstest_bdd_macros::when;

fn request(group: &str, mark: &str) -> Result<RollbackRequest, eyre::Report> {
    Ok(RollbackRequest::new(
        GroupSelection::parse([group])?,
        MarkName::new(mark)?,
    ))
}

#[when(r#"the group "{group}" is rolled back to "{mark}""#)]
fn rolled_back(world: &mut RollbackWorld, group: String, mark: String) -> Result<(), eyre::Report> {
    let request = request(&group, &mark)?;
    let orchestrator = world.orchestrator();
    world.last_rollback = Some(run_async(orchestrator.rollback(&request)));
    Ok(())
}

#[when(r#"the group "{group}" is submitted for asynchronous rollback to "{mark}""#)]
fn submitted_async(
    world: &mut RollbackWorld,
    group: String,
    mark: String,
) -> Result<(), eyre::Report> {
    let request = request(&group, &mark)?;
    let orchestrator = world.orchestrator();
    world.last_submission = Some(run_async(orchestrator.submit_async(&request)));
    Ok(())
}
