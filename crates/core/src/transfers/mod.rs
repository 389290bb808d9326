//! Transfers module - scheduled deposits into goals and loan payments.

mod transfers_service;
mod transfers_service_tests;
mod transfers_traits;

pub use transfers_service::TransferService;
pub use transfers_traits::TransferServiceTrait;
