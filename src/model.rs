//! Entity shapes stored by the service.
//!
//! Structural only: the rules enforced here are the presence of the required
//! fields and their cast to text, everything else is accepted as sent.
mod id;
mod note;
mod user;

pub use id::*;
pub use note::*;
pub use user::*;

use serde_json::Value;

/// A text field of a request could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Path `{path}` is required.")]
    Required { path: &'static str },

    #[error("Cast to string failed for value `{value}` at path `{path}`")]
    Cast { path: &'static str, value: String },
}

/// Cast a loosely typed request field to text.
///
/// Numbers and booleans become their literal text, arrays and objects are
/// rejected. `null` counts as absent.
pub fn cast_string(
    path: &'static str,
    value: Option<Value>,
) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(value @ (Value::Array(_) | Value::Object(_))) => Err(ValidationError::Cast {
            path,
            value: value.to_string(),
        }),
    }
}

/// Cast a required field, failing when it is absent.
fn required_string(
    path: &'static str,
    value: Option<Value>,
) -> Result<String, ValidationError> {
    cast_string(path, value)?.ok_or(ValidationError::Required { path })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cast_string() {
        assert_eq!(cast_string("name", Some(json!("bob"))), Ok(Some("bob".into())));
        assert_eq!(cast_string("name", Some(json!(123))), Ok(Some("123".into())));
        assert_eq!(cast_string("name", Some(json!(1.5))), Ok(Some("1.5".into())));
        assert_eq!(cast_string("name", Some(json!(false))), Ok(Some("false".into())));
        assert_eq!(cast_string("name", Some(Value::Null)), Ok(None));
        assert_eq!(cast_string("name", None), Ok(None));

        let err = cast_string("content", Some(json!(["a"]))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cast to string failed for value `[\"a\"]` at path `content`"
        );
        assert!(cast_string("content", Some(json!({ "a": 1 }))).is_err());
    }
}
