//! Given steps for rollback BDD scenarios.

use super::world::RollbackWorld;
use emaj_gateway::database::adapters::Reply;
use emaj_gateway::database::ports::Row;
use emaj_gateway::dialect::SqlParam;
use rstest_bdd_macros::given;

fn installed(world: &mut RollbackWorld, version: &str) {
    world.executor = world
        .executor
        .clone()
        .on_value("pg_namespace WHERE nspname", "schema_name", "emaj")
        .on_value("AS param_table", "param_table", "emaj_visible_param")
        .on_value("'emaj_version'", "version", version);
}

#[given(r#"an installed extension at version "{version}" administered by the session"#)]
fn administered_extension(world: &mut RollbackWorld, version: String) {
    installed(world, &version);
    world.executor = world
        .executor
        .clone()
        .on_value("rolsuper", "is_superuser", true);
}

#[given(r#"an installed extension at version "{version}" viewed by the session"#)]
fn viewed_extension(world: &mut RollbackWorld, version: String) {
    installed(world, &version);
    world.executor = world
        .executor
        .clone()
        .on_value("rolsuper", "is_superuser", false)
        .on_dynamic("pg_has_role", |statement| {
            let viewer = statement.params().contains(&SqlParam::from("emaj_viewer"));
            Ok(Reply::Rows(vec![Row::new().with("has_role", viewer)]))
        });
}

fn logging_group(world: &mut RollbackWorld, group: &str, active_marks: i64) {
    world.executor = world
        .executor
        .clone()
        .on(
            "group_name = ANY(",
            vec![
                Row::new()
                    .with("group_name", group)
                    .with("group_is_rollbackable", true)
                    .with("group_is_logging", true),
            ],
        )
        .on_value("AS mark_count", "mark_count", active_marks);
}

#[given(r#"the group "{group}" is logging with the active mark "{mark}""#)]
fn logging_with_mark(world: &mut RollbackWorld, group: String, mark: String) {
    let _ = mark;
    logging_group(world, &group, 1);
}

#[given(r#"the group "{group}" is logging without the mark "{mark}""#)]
fn logging_without_mark(world: &mut RollbackWorld, group: String, mark: String) {
    let _ = mark;
    logging_group(world, &group, 0);
}

#[given("the extension processes {count:usize} tables and sequences")]
fn extension_processes(world: &mut RollbackWorld, count: usize) -> Result<(), eyre::Report> {
    let processed = i64::try_from(count)?;
    world.executor = world
        .executor
        .clone()
        .on_value("AS nbtblseq", "nbtblseq", processed);
    Ok(())
}
