pub mod import;
mod snapshot;
mod store;

pub use import::{ImportError, ImportSummary, RecipientRecord, import_recipients, parse_recipients};
pub use snapshot::{Snapshot, SnapshotError};
pub use store::{META_DIR, Store, init};
