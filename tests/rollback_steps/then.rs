//! Then steps for rollback BDD scenarios.

use super::world::RollbackWorld;
use emaj_gateway::catalog::domain::StalePrecondition;
use emaj_gateway::rollback::RollbackError;
use emaj_gateway::session::AccessError;
use rstest_bdd_macros::then;

fn rollback_error(world: &RollbackWorld) -> Result<&RollbackError, eyre::Report> {
    match world.last_rollback.as_ref() {
        Some(Err(err)) => Ok(err),
        Some(Ok(count)) => Err(eyre::eyre!("rollback unexpectedly processed {count} relations")),
        None => Err(eyre::eyre!("no rollback was attempted")),
    }
}

#[then("the rollback reports {count:usize} processed tables and sequences")]
fn rollback_reports(world: &RollbackWorld, count: usize) -> Result<(), eyre::Report> {
    let expected = i64::try_from(count)?;
    match world.last_rollback.as_ref() {
        Some(Ok(processed)) if *processed == expected => Ok(()),
        Some(Ok(processed)) => Err(eyre::eyre!("expected {expected} relations, got {processed}")),
        Some(Err(err)) => Err(eyre::eyre!("rollback failed: {err}")),
        None => Err(eyre::eyre!("no rollback was attempted")),
    }
}

#[then("the rollback is refused because the mark is no longer active")]
fn refused_stale_mark(world: &RollbackWorld) -> Result<(), eyre::Report> {
    let err = rollback_error(world)?;
    if matches!(
        err,
        RollbackError::StalePrecondition(StalePrecondition::MarkNotActive(_))
    ) {
        Ok(())
    } else {
        Err(eyre::eyre!("expected a stale mark error, got {err}"))
    }
}

#[then("the rollback is refused because administrator rights are required")]
fn refused_viewer(world: &RollbackWorld) -> Result<(), eyre::Report> {
    let err = rollback_error(world)?;
    if matches!(err, RollbackError::Access(AccessError::AdminRequired)) {
        Ok(())
    } else {
        Err(eyre::eyre!("expected an access error, got {err}"))
    }
}

#[then("the submission is refused because asynchronous rollback is unavailable")]
fn refused_async(world: &RollbackWorld) -> Result<(), eyre::Report> {
    match world.last_submission.as_ref() {
        Some(Err(RollbackError::AsyncUnavailable)) => {}
        Some(Err(err)) => return Err(eyre::eyre!("expected async unavailability, got {err}")),
        Some(Ok(ticket)) => {
            return Err(eyre::eyre!(
                "submission unexpectedly issued rollback {}",
                ticket.rollback_id
            ));
        }
        None => return Err(eyre::eyre!("no submission was attempted")),
    }
    if world.launcher.launched().is_empty() {
        Ok(())
    } else {
        Err(eyre::eyre!("a client was launched"))
    }
}
