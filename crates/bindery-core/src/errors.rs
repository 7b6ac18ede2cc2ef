use rhai::{Dynamic, EvalAltResult, Map, Position};
use thiserror::Error;

/// Failures surfaced across the script/native boundary.
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("Type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("{kind} object is already bound to a native resource")]
    AlreadyBound { kind: &'static str },
    #[error("{kind} object used after its native resource was released")]
    UseAfterFree { kind: &'static str },
    #[error("Native operation failed: {0}")]
    NativeOperation(String),
}

impl BindingError {
    pub fn native(msg: impl Into<String>) -> Self {
        BindingError::NativeOperation(msg.into())
    }

    /// The error class name scripts see in `err.kind`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            BindingError::TypeMismatch { .. } => "TypeMismatchError",
            BindingError::AlreadyBound { .. } => "AlreadyBoundError",
            BindingError::UseAfterFree { .. } => "UseAfterFreeError",
            BindingError::NativeOperation(_) => "NativeOperationError",
        }
    }

    /// Builds the `#{ kind, message }` map thrown into scripts.
    pub fn to_script_value(&self) -> Dynamic {
        let mut map = Map::new();
        map.insert("kind".into(), self.kind_name().into());
        map.insert("message".into(), self.to_string().into());
        map.into()
    }
}

impl From<anyhow::Error> for BindingError {
    fn from(err: anyhow::Error) -> Self {
        BindingError::NativeOperation(format!("{err:#}"))
    }
}

impl From<std::io::Error> for BindingError {
    fn from(err: std::io::Error) -> Self {
        BindingError::NativeOperation(err.to_string())
    }
}

impl From<BindingError> for Box<EvalAltResult> {
    fn from(err: BindingError) -> Self {
        Box::new(EvalAltResult::ErrorRuntime(
            err.to_script_value(),
            Position::NONE,
        ))
    }
}

pub type Result<T, E = BindingError> = std::result::Result<T, E>;

/// Recovers the binding error class from an uncaught script error.
///
/// Looks through nested function-call frames; `None` for Rhai's own errors.
pub fn script_error_kind(err: &EvalAltResult) -> Option<String> {
    match err {
        EvalAltResult::ErrorRuntime(value, _) => value
            .read_lock::<Map>()
            .and_then(|map| map.get("kind").cloned())
            .and_then(|kind| kind.into_string().ok()),
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _)
        | EvalAltResult::ErrorInModule(_, inner, _) => script_error_kind(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_value_carries_kind_and_message() {
        let err = BindingError::UseAfterFree { kind: "Image" };
        let map = err.to_script_value().cast::<Map>();
        assert_eq!(
            map["kind"].clone().into_string().unwrap(),
            "UseAfterFreeError"
        );
        assert!(map["message"]
            .clone()
            .into_string()
            .unwrap()
            .contains("after its native resource was released"));
    }

    #[test]
    fn converts_into_runtime_error() {
        let boxed: Box<EvalAltResult> = BindingError::native("bad png").into();
        match *boxed {
            EvalAltResult::ErrorRuntime(value, _) => {
                let map = value.cast::<Map>();
                assert_eq!(
                    map["kind"].clone().into_string().unwrap(),
                    "NativeOperationError"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn kind_survives_function_frames() {
        let inner: Box<EvalAltResult> = BindingError::TypeMismatch {
            expected: "Image",
            found: "i64".into(),
        }
        .into();
        let wrapped = EvalAltResult::ErrorInFunctionCall(
            "insert".into(),
            String::new(),
            inner,
            Position::NONE,
        );
        assert_eq!(
            script_error_kind(&wrapped).as_deref(),
            Some("TypeMismatchError")
        );
        let plain = EvalAltResult::ErrorRuntime("boom".into(), Position::NONE);
        assert_eq!(script_error_kind(&plain), None);
    }
}
