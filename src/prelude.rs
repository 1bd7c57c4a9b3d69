pub use crate::contracts::{Disableable, FieldLike};
pub use crate::controller::{
    FieldKey, FieldMeta, FormBuilder, FormController, FormError, FormId, FormResult, FormSnapshot,
    SubmitError, SubmitState,
};
pub use crate::props::FieldProps;
pub use crate::rules::{Message, Rule};
pub use crate::validation::{FieldLens, FormModel};
pub use crate::value::FieldValue;
pub use steadyform_derive::FormModel;
