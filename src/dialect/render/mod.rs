//! Per-concern statement renderers.

pub(super) mod definition;
pub(super) mod groups;
pub(super) mod marks;
pub(super) mod rollback;
pub(super) mod stats;

use super::StatementBuilder;
use crate::catalog::domain::GroupSelection;

/// Appends the call to the single-group or the multi-group variant of an
/// extension function, binding the group list as its first argument.
///
/// Leaves the argument list open so callers can bind further arguments.
fn push_group_call(
    builder: &mut StatementBuilder,
    schema: &str,
    single_function: &str,
    multi_function: &str,
    groups: &GroupSelection,
) {
    builder.push(schema).push(".");
    match groups.as_single() {
        Some(group) => {
            builder.push(single_function).push_bind("(", group.as_str());
        }
        None => {
            builder
                .push(multi_function)
                .push_bind("(", groups.to_names())
                .push("::text[]");
        }
    }
}
