use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("There is no default settings for {0:?}")]
    UnrecognizedProperty(String),

    #[error("Invalid value for {name}: expected {expected}")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
    },
}
