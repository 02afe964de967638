pub mod config;
pub mod controller;
pub mod core;
pub mod error;
pub mod persist;
pub mod query;
pub mod runtime;
pub mod state;
pub mod validation;

pub use config::FormConfig;
pub use controller::FormController;
pub use core::{Field, FieldKind, FormDefinition, FormModel, RawValue, SelectedFile, StepModel};
pub use error::{FormError, StorageError, SubmitError};
pub use persist::{MemoryStorage, PersistedSnapshot, PersistenceStore, Storage};
#[cfg(not(target_arch = "wasm32"))]
pub use persist::FileStorage;
pub use query::QueryParams;
pub use runtime::{Clock, FormSignal, ManualClock, SystemClock};
pub use state::{NavigationState, StepCursor, ValidationState};
pub use validation::{Messages, RuleRegistry, StepValidator, ValidationResult};
