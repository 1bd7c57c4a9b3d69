use crate::contracts::{Disableable, FieldLike};
use crate::controller::{FieldKey, FormController, FormResult, read_lock};
use crate::rules::Message;
use crate::validation::{FieldLens, FormModel};

pub struct FieldProps<T, L>
where
    T: FormModel,
    L: FieldLens<T>,
{
    controller: FormController<T>,
    lens: L,
    value: L::Value,
    error: Option<Message>,
}

impl<T, L> FieldProps<T, L>
where
    T: FormModel,
    L: FieldLens<T>,
{
    pub fn value(&self) -> &L::Value {
        &self.value
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn change(&self, value: L::Value) -> FormResult<()> {
        self.controller.set(self.lens, value)
    }

    pub fn blur(&self) -> FormResult<()> {
        self.controller.touch(self.lens)
    }
}

impl<T> FormController<T>
where
    T: FormModel,
{
    pub fn display_error<L>(&self, lens: L) -> FormResult<Option<Message>>
    where
        L: FieldLens<T>,
    {
        self.display_error_by_key(lens.key())
    }

    pub fn field_props<L>(&self, lens: L) -> FormResult<FieldProps<T, L>>
    where
        L: FieldLens<T>,
    {
        let (value, error) = {
            let state = read_lock(&self.state, "projecting field props")?;
            let value = lens.get(&state.model).clone();
            let error = state
                .field_meta
                .get(&lens.key())
                .and_then(|meta| meta.display_error().cloned());
            (value, error)
        };
        Ok(FieldProps {
            controller: self.clone(),
            lens,
            value,
            error,
        })
    }

    pub fn is_required<L>(&self, lens: L) -> bool
    where
        L: FieldLens<T>,
    {
        self.rules
            .get(&lens.key())
            .is_some_and(|entry| entry.required)
    }

    pub fn decorate_field<L, C>(&self, lens: L, component: C) -> FormResult<C>
    where
        L: FieldLens<T>,
        C: FieldLike,
    {
        let mut component = component;
        if self.is_required(lens) {
            component = component.required(true);
        }
        if let Some(error) = self.display_error(lens)? {
            component = component.error(error);
        }
        Ok(component)
    }

    pub fn decorate_submit_control<C>(&self, component: C) -> FormResult<C>
    where
        C: Disableable,
    {
        Ok(component.disabled(self.is_submitting()?))
    }

    fn display_error_by_key(&self, key: FieldKey) -> FormResult<Option<Message>> {
        let state = read_lock(&self.state, "reading display error")?;
        Ok(state
            .field_meta
            .get(&key)
            .and_then(|meta| meta.display_error().cloned()))
    }
}
