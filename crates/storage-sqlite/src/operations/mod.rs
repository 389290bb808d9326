//! SQLite storage implementation for the operation log.

mod model;
mod repository;

pub use model::{NewOperationDB, OperationDB};
pub use repository::OperationRepository;
pub(crate) use repository::insert_operation_in;
