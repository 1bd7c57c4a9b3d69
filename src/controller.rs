use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::rules::{Message, Rule};
use crate::validation::{FieldLens, FormModel};
use crate::value::FieldValue;

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldMeta {
    pub dirty: bool,
    pub touched: bool,
    pub error: Option<Message>,
}

impl FieldMeta {
    pub fn display_error(&self) -> Option<&Message> {
        if self.touched { self.error.as_ref() } else { None }
    }
}

#[derive(Clone, Debug)]
pub struct FormSnapshot<T> {
    pub model: T,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub field_meta: BTreeMap<FieldKey, FieldMeta>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    InvalidStateTransition { from: SubmitState, to: SubmitState },
    AlreadySubmitting,
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::InvalidStateTransition { from, to } => {
                write!(f, "invalid submit state transition: {from:?} -> {to:?}")
            }
            FormError::AlreadySubmitting => f.write_str("form submit is already in progress"),
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

pub type SubmitError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub(crate) type BoxSubmitFuture =
    Pin<Box<dyn Future<Output = Result<(), SubmitError>> + Send + 'static>>;

pub(crate) type RuleCheckFn<T> = Arc<dyn Fn(&T) -> Option<Message> + Send + Sync>;

pub(crate) struct RuleEntry<T> {
    pub(crate) required: bool,
    pub(crate) check: RuleCheckFn<T>,
}

pub(crate) enum SubmitHandler<T> {
    Sync(Arc<dyn Fn(&T) -> Result<(), SubmitError> + Send + Sync>),
    Async(Arc<dyn Fn(T) -> BoxSubmitFuture + Send + Sync>),
}

impl<T> Clone for SubmitHandler<T> {
    fn clone(&self) -> Self {
        match self {
            SubmitHandler::Sync(handler) => SubmitHandler::Sync(handler.clone()),
            SubmitHandler::Async(handler) => SubmitHandler::Async(handler.clone()),
        }
    }
}

pub(crate) struct FormState<T> {
    pub(crate) id: FormId,
    pub(crate) initial_model: T,
    pub(crate) model: T,
    pub(crate) submit_state: SubmitState,
    pub(crate) submit_count: u32,
    pub(crate) dirty_fields: BTreeSet<FieldKey>,
    pub(crate) field_meta: BTreeMap<FieldKey, FieldMeta>,
    pub(crate) first_error: Option<FieldKey>,
}

impl<T> FormState<T> {
    pub(crate) fn ensure_meta(&mut self, key: FieldKey) -> &mut FieldMeta {
        self.field_meta.entry(key).or_default()
    }
}

pub struct FormBuilder<T>
where
    T: FormModel,
{
    initial: T,
    rules: BTreeMap<FieldKey, RuleEntry<T>>,
    on_submit: Option<SubmitHandler<T>>,
}

impl<T> FormBuilder<T>
where
    T: FormModel,
{
    pub fn rule<L>(mut self, lens: L, rule: Rule<L::Value>) -> Self
    where
        L: FieldLens<T>,
        L::Value: FieldValue,
    {
        let required = rule.is_required();
        let check: RuleCheckFn<T> = Arc::new(move |model: &T| rule.evaluate(lens.get(model)));
        self.rules.insert(lens.key(), RuleEntry { required, check });
        self
    }

    pub fn on_submit<F>(mut self, handler: F) -> Self
    where
        F: Fn(&T) -> Result<(), SubmitError> + Send + Sync + 'static,
    {
        self.on_submit = Some(SubmitHandler::Sync(Arc::new(handler)));
        self
    }

    pub fn on_submit_async<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SubmitError>> + Send + 'static,
    {
        self.on_submit = Some(SubmitHandler::Async(Arc::new(move |model: T| {
            Box::pin(handler(model)) as BoxSubmitFuture
        })));
        self
    }

    pub fn build(self) -> FormController<T> {
        FormController {
            state: Arc::new(RwLock::new(FormState {
                id: FormId::next(),
                initial_model: self.initial.clone(),
                model: self.initial,
                submit_state: SubmitState::Idle,
                submit_count: 0,
                dirty_fields: BTreeSet::new(),
                field_meta: BTreeMap::new(),
                first_error: None,
            })),
            rules: Arc::new(self.rules),
            on_submit: self.on_submit,
            field_keys: T::field_keys(),
        }
    }
}

#[derive(Clone)]
pub struct FormController<T>
where
    T: FormModel,
{
    pub(crate) state: Arc<RwLock<FormState<T>>>,
    pub(crate) rules: Arc<BTreeMap<FieldKey, RuleEntry<T>>>,
    pub(crate) on_submit: Option<SubmitHandler<T>>,
    pub(crate) field_keys: &'static [FieldKey],
}

impl<T> FormController<T>
where
    T: FormModel,
{
    pub fn builder(initial: T) -> FormBuilder<T> {
        FormBuilder {
            initial,
            rules: BTreeMap::new(),
            on_submit: None,
        }
    }

    pub fn new(initial: T) -> Self {
        Self::builder(initial).build()
    }

    pub fn form_id(&self) -> FormResult<FormId> {
        Ok(read_lock(&self.state, "reading form id")?.id)
    }

    pub fn is_submitting(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading submit state")?.submit_state == SubmitState::Submitting)
    }

    pub fn first_error(&self) -> FormResult<Option<FieldKey>> {
        Ok(read_lock(&self.state, "reading first error key")?.first_error)
    }

    pub async fn submit(&self) -> FormResult<SubmitState> {
        {
            let mut state = write_lock(&self.state, "preparing submit")?;
            if state.submit_state == SubmitState::Submitting {
                return Err(FormError::AlreadySubmitting);
            }
            transition_submit_state(&mut state, SubmitState::Validating)?;
            state.submit_count = state.submit_count.saturating_add(1);
            for key in self.field_keys {
                state.ensure_meta(*key).touched = true;
            }
        }

        let is_valid = self.validate_form()?;
        if !is_valid {
            let mut state = write_lock(&self.state, "handling submit validation failure")?;
            transition_submit_state(&mut state, SubmitState::Failed)?;
            tracing::debug!(form = state.id.0, "submit blocked by validation errors");
            return Ok(SubmitState::Failed);
        }

        let model = {
            let mut state = write_lock(&self.state, "moving submit state to submitting")?;
            transition_submit_state(&mut state, SubmitState::Submitting)?;
            state.model.clone()
        };
        let result = match &self.on_submit {
            Some(SubmitHandler::Sync(handler)) => handler(&model),
            Some(SubmitHandler::Async(handler)) => handler(model).await,
            None => Ok(()),
        };

        let mut state = write_lock(&self.state, "completing submit")?;
        match result {
            Ok(()) => transition_submit_state(&mut state, SubmitState::Succeeded)?,
            Err(error) => {
                tracing::error!(form = state.id.0, %error, "form submission failed");
                transition_submit_state(&mut state, SubmitState::Failed)?;
            }
        }
        Ok(state.submit_state)
    }

    pub fn reset_to_initial(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form")?;
        state.model = state.initial_model.clone();
        state.dirty_fields.clear();
        state.first_error = None;
        if state.submit_state != SubmitState::Submitting {
            state.submit_state = SubmitState::Idle;
        }
        for meta in state.field_meta.values_mut() {
            meta.dirty = false;
            meta.touched = false;
            meta.error = None;
        }
        Ok(())
    }

    pub fn reset_field<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        let mut state = write_lock(&self.state, "resetting field")?;
        let initial_value = lens.get(&state.initial_model).clone();
        lens.set(&mut state.model, initial_value);
        state.dirty_fields.remove(&key);
        let meta = state.ensure_meta(key);
        meta.dirty = false;
        meta.touched = false;
        meta.error = None;
        state.first_error = first_error_key(&state.field_meta);
        Ok(())
    }

    pub fn clear_errors(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "clearing all field errors")?;
        for meta in state.field_meta.values_mut() {
            meta.error = None;
        }
        state.first_error = None;
        Ok(())
    }

    pub fn clear_field_errors<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        let mut state = write_lock(&self.state, "clearing field errors")?;
        if let Some(meta) = state.field_meta.get_mut(&key) {
            meta.error = None;
        }
        state.first_error = first_error_key(&state.field_meta);
        Ok(())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<T>> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        let is_valid = state.field_meta.values().all(|meta| meta.error.is_none());
        Ok(FormSnapshot {
            model: state.model.clone(),
            submit_state: state.submit_state,
            submit_count: state.submit_count,
            is_dirty: !state.dirty_fields.is_empty(),
            is_valid,
            field_meta: state.field_meta.clone(),
        })
    }

    pub fn field_meta<L>(&self, lens: L) -> FormResult<Option<FieldMeta>>
    where
        L: FieldLens<T>,
    {
        Ok(read_lock(&self.state, "reading field meta")?
            .field_meta
            .get(&lens.key())
            .cloned())
    }
}

pub(crate) fn transition_submit_state<T>(
    state: &mut FormState<T>,
    next: SubmitState,
) -> FormResult<()> {
    let current = state.submit_state;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Validating)
            | (SubmitState::Validating, SubmitState::Submitting)
            | (SubmitState::Validating, SubmitState::Failed)
            | (SubmitState::Submitting, SubmitState::Succeeded)
            | (SubmitState::Submitting, SubmitState::Failed)
            | (SubmitState::Succeeded, SubmitState::Validating)
            | (SubmitState::Failed, SubmitState::Validating)
            | (_, SubmitState::Idle)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    state.submit_state = next;
    Ok(())
}

pub(crate) fn first_error_key(field_meta: &BTreeMap<FieldKey, FieldMeta>) -> Option<FieldKey> {
    field_meta
        .iter()
        .find_map(|(key, meta)| meta.error.is_some().then_some(*key))
}

pub(crate) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
