use std::borrow::Cow;
use std::sync::Arc;

use regex::Regex;
use rust_decimal::Decimal;

use crate::value::FieldValue;

pub type Message = Cow<'static, str>;

type CustomCheck<V> = Arc<dyn Fn(&V) -> Result<(), Message> + Send + Sync>;

pub struct Rule<V> {
    required: Option<Message>,
    min_length: Option<(usize, Message)>,
    max_length: Option<(usize, Message)>,
    min: Option<(Decimal, Message)>,
    max: Option<(Decimal, Message)>,
    pattern: Option<(Regex, Message)>,
    custom: Option<CustomCheck<V>>,
}

impl<V> Default for Rule<V> {
    fn default() -> Self {
        Self {
            required: None,
            min_length: None,
            max_length: None,
            min: None,
            max: None,
            pattern: None,
            custom: None,
        }
    }
}

impl<V> Rule<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self) -> Self {
        self.required_with("this field is required")
    }

    pub fn required_with(mut self, message: impl Into<Message>) -> Self {
        self.required = Some(message.into());
        self
    }

    pub fn min_length(self, limit: usize) -> Self {
        let message = format!("must be at least {limit} characters");
        self.min_length_with(limit, message)
    }

    pub fn min_length_with(mut self, limit: usize, message: impl Into<Message>) -> Self {
        self.min_length = Some((limit, message.into()));
        self
    }

    pub fn max_length(self, limit: usize) -> Self {
        let message = format!("must be at most {limit} characters");
        self.max_length_with(limit, message)
    }

    pub fn max_length_with(mut self, limit: usize, message: impl Into<Message>) -> Self {
        self.max_length = Some((limit, message.into()));
        self
    }

    pub fn min(self, limit: impl Into<Decimal>) -> Self {
        let limit = limit.into();
        let message = format!("must be at least {limit}");
        self.min_with(limit, message)
    }

    pub fn min_with(mut self, limit: impl Into<Decimal>, message: impl Into<Message>) -> Self {
        self.min = Some((limit.into(), message.into()));
        self
    }

    pub fn max(self, limit: impl Into<Decimal>) -> Self {
        let limit = limit.into();
        let message = format!("must be at most {limit}");
        self.max_with(limit, message)
    }

    pub fn max_with(mut self, limit: impl Into<Decimal>, message: impl Into<Message>) -> Self {
        self.max = Some((limit.into(), message.into()));
        self
    }

    pub fn pattern(self, pattern: Regex) -> Self {
        self.pattern_with(pattern, "invalid format")
    }

    pub fn pattern_with(mut self, pattern: Regex, message: impl Into<Message>) -> Self {
        self.pattern = Some((pattern, message.into()));
        self
    }

    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(&V) -> Result<(), Message> + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(check));
        self
    }

    pub fn is_required(&self) -> bool {
        self.required.is_some()
    }
}

impl<V> Rule<V>
where
    V: FieldValue,
{
    // Checks run in declaration order below; the first failure wins and
    // later checks are not evaluated.
    pub fn evaluate(&self, value: &V) -> Option<Message> {
        if let Some(message) = &self.required
            && value.is_missing()
        {
            return Some(message.clone());
        }
        if let Some((limit, message)) = &self.min_length
            && let Some(text) = value.as_text()
            && text.chars().count() < *limit
        {
            return Some(message.clone());
        }
        if let Some((limit, message)) = &self.max_length
            && let Some(text) = value.as_text()
            && text.chars().count() > *limit
        {
            return Some(message.clone());
        }
        if let Some((limit, message)) = &self.min
            && let Some(number) = value.as_number()
            && number < *limit
        {
            return Some(message.clone());
        }
        if let Some((limit, message)) = &self.max
            && let Some(number) = value.as_number()
            && number > *limit
        {
            return Some(message.clone());
        }
        if let Some((pattern, message)) = &self.pattern
            && let Some(text) = value.as_text()
            && !pattern.is_match(text)
        {
            return Some(message.clone());
        }
        if let Some(check) = &self.custom
            && let Err(message) = check(value)
        {
            return Some(message);
        }
        None
    }
}
