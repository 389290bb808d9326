//! Operations module - the global log of fund movements.

mod operations_model;
mod operations_service;
mod operations_traits;

pub use operations_model::{
    sort_for_display, MovementStatus, NewOperation, Operation, OperationType,
};
pub use operations_service::OperationService;
pub use operations_traits::{OperationRepositoryTrait, OperationServiceTrait};
