use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

pub trait FieldValue {
    fn as_text(&self) -> Option<&str> {
        None
    }

    fn as_number(&self) -> Option<Decimal> {
        None
    }

    fn is_missing(&self) -> bool {
        false
    }
}

impl FieldValue for String {
    fn as_text(&self) -> Option<&str> {
        Some(self)
    }

    fn is_missing(&self) -> bool {
        self.is_empty()
    }
}

// `false` is a real value, not an absent one.
impl FieldValue for bool {}

impl FieldValue for Decimal {
    fn as_number(&self) -> Option<Decimal> {
        Some(*self)
    }
}

macro_rules! impl_integer_field_value {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn as_number(&self) -> Option<Decimal> {
                    Some(Decimal::from(*self))
                }
            }
        )*
    };
}

impl_integer_field_value!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FieldValue for f32 {
    fn as_number(&self) -> Option<Decimal> {
        Decimal::from_f32(*self)
    }
}

impl FieldValue for f64 {
    fn as_number(&self) -> Option<Decimal> {
        Decimal::from_f64(*self)
    }
}

impl<V> FieldValue for Option<V>
where
    V: FieldValue,
{
    fn as_text(&self) -> Option<&str> {
        self.as_ref().and_then(FieldValue::as_text)
    }

    fn as_number(&self) -> Option<Decimal> {
        self.as_ref().and_then(FieldValue::as_number)
    }

    fn is_missing(&self) -> bool {
        self.as_ref().is_none_or(FieldValue::is_missing)
    }
}

impl<V> FieldValue for Vec<V> {
    fn is_missing(&self) -> bool {
        self.is_empty()
    }
}
