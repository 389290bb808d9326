//! SQLite storage implementation for accounts and their transactions.

mod model;
mod repository;

pub use model::{AccountDB, NewAccountDB, NewTransactionDB, TransactionDB};
pub use repository::AccountRepository;
pub(crate) use repository::{append_transaction_in, load_account};
