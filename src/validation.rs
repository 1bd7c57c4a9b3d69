use std::collections::BTreeMap;

use crate::controller::{
    FieldKey, FormController, FormResult, first_error_key, read_lock, write_lock,
};
use crate::rules::Message;

pub trait FieldLens<T>: Copy + Send + Sync + 'static {
    type Value: Clone + PartialEq + Send + Sync + 'static;

    fn key(self) -> FieldKey;
    fn get<'a>(self, model: &'a T) -> &'a Self::Value;
    fn set(self, model: &mut T, value: Self::Value);
}

pub trait FormModel: Clone + Send + Sync + 'static {
    type Fields;

    fn fields() -> Self::Fields;
    fn field_keys() -> &'static [FieldKey];
}

impl<T> FormController<T>
where
    T: FormModel,
{
    pub fn set<L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        let touched = {
            let mut state = write_lock(&self.state, "writing form model")?;
            lens.set(&mut state.model, value);
            let is_dirty = lens.get(&state.model) != lens.get(&state.initial_model);
            if is_dirty {
                state.dirty_fields.insert(key);
            } else {
                state.dirty_fields.remove(&key);
            }
            let meta = state.ensure_meta(key);
            meta.dirty = is_dirty;
            meta.touched
        };

        // Editing an untouched field stays silent until its first blur.
        if touched {
            let _ = self.validate_field_by_key(key)?;
        }
        Ok(())
    }

    pub fn touch<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        {
            let mut state = write_lock(&self.state, "touching field")?;
            state.ensure_meta(key).touched = true;
        }
        let _ = self.validate_field_by_key(key)?;
        Ok(())
    }

    pub fn validate_field<L>(&self, lens: L) -> FormResult<bool>
    where
        L: FieldLens<T>,
    {
        self.validate_field_by_key(lens.key())
    }

    pub fn validate_form(&self) -> FormResult<bool> {
        let model = {
            read_lock(&self.state, "reading model for form validation")?
                .model
                .clone()
        };

        let mut field_errors = BTreeMap::<FieldKey, Option<Message>>::new();
        for key in self.field_keys {
            let error = self.rules.get(key).and_then(|entry| (entry.check)(&model));
            field_errors.insert(*key, error);
        }

        let mut state = write_lock(&self.state, "applying form validation result")?;
        let mut all_valid = true;
        for (key, error) in field_errors {
            all_valid &= error.is_none();
            state.ensure_meta(key).error = error;
        }
        state.first_error = first_error_key(&state.field_meta);
        Ok(all_valid)
    }

    pub(crate) fn validate_field_by_key(&self, key: FieldKey) -> FormResult<bool> {
        let model = {
            read_lock(&self.state, "reading model for field validation")?
                .model
                .clone()
        };
        let error = self.rules.get(&key).and_then(|entry| (entry.check)(&model));

        let mut state = write_lock(&self.state, "writing field validation result")?;
        let passed = error.is_none();
        state.ensure_meta(key).error = error;
        state.first_error = first_error_key(&state.field_meta);
        Ok(passed)
    }
}
