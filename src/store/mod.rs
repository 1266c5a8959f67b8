//! Persistence module split across logical submodules: the raw key-value
//! medium and the roster store layered on top of it.

mod kv;
mod students;

pub use kv::{data_dir, KvStore};
pub use students::{StoreError, StudentStore, STORE_KEY};
