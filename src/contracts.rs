use crate::rules::Message;

pub trait FieldLike: Sized {
    fn error(self, message: impl Into<Message>) -> Self;
    fn required(self, value: bool) -> Self;
}

pub trait Disableable: Sized {
    fn disabled(self, value: bool) -> Self;
}
