mod contracts;
mod controller;
mod props;
mod rules;
mod validation;
mod value;

pub mod prelude;


pub use contracts::{Disableable, FieldLike};
pub use controller::{
    FieldKey, FieldMeta, FormBuilder, FormController, FormError, FormId, FormResult, FormSnapshot,
    SubmitError, SubmitState,
};
pub use props::FieldProps;
pub use rules::{Message, Rule};
pub use steadyform_derive::FormModel;
pub use validation::{FieldLens, FormModel};
pub use value::FieldValue;
