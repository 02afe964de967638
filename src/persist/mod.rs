pub mod snapshot;
pub mod storage;
pub mod store;

pub use snapshot::{PersistedSnapshot, SNAPSHOT_VERSION, SnapshotError};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
pub use storage::{MemoryStorage, Storage};
pub use store::{PersistenceStore, Restoration};
