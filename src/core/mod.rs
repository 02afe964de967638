pub mod field;
pub mod form;
pub mod value;

pub use field::{Field, FieldId, FieldKind, SelectedFile};
pub use form::{FieldDefinition, FormDefinition, FormModel, StepDefinition, StepModel};
pub use value::RawValue;
