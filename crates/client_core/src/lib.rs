pub mod controller;
pub mod error;
pub mod events;
pub mod sequence;
pub mod store;

pub use controller::{ListController, ListView};
pub use error::{ListError, StoreError, StoreOperation, StoreUrlError};
pub use events::{ListAction, ListEvent, Notice, NoticeLevel};
pub use store::{HttpTaskStore, TaskStore, DEFAULT_STORE_URL};
