//! Domain model for rollback operations.

mod error;
mod operation;
mod status;

pub use error::{ParseRollbackStatusError, RollbackDomainError};
pub use operation::{
    AsyncRollbackTicket, RollbackEstimate, RollbackId, RollbackOperation, RollbackProgress,
    RollbackRequest,
};
pub use status::RollbackStatus;
