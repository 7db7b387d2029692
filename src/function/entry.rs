use std::any::{Any, type_name};
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::function::error::{FunctionError, RegistryError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub String);

impl FunctionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FunctionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type TypedFn<I, O> = Arc<dyn Fn(I) -> Result<O, FunctionError> + Send + Sync>;
type JsonFn = Arc<dyn Fn(Value) -> Result<Value, RegistryError> + Send + Sync>;

/// A registered transformation.
///
/// The same body is reachable two ways: through a typed handle recovered
/// with [`FunctionEntry::typed`], and through the JSON form used by hosts
/// that only see wire payloads.
#[derive(Clone)]
pub struct FunctionEntry {
    id: FunctionId,
    input_type: String,
    output_type: String,
    typed: Arc<dyn Any + Send + Sync>,
    json: JsonFn,
}

impl FunctionEntry {
    pub fn new<I, O, F>(id: FunctionId, f: F) -> Self
    where
        I: DeserializeOwned + 'static,
        O: Serialize + 'static,
        F: Fn(I) -> Result<O, FunctionError> + Send + Sync + 'static,
    {
        let typed: TypedFn<I, O> = Arc::new(f);

        let json_id = id.clone();
        let body = Arc::clone(&typed);
        let json: JsonFn = Arc::new(move |input: Value| {
            let input: I =
                serde_json::from_value(input).map_err(|source| RegistryError::InvalidInput {
                    id: json_id.0.clone(),
                    source,
                })?;
            let output = body(input).map_err(|source| RegistryError::Function {
                id: json_id.0.clone(),
                source,
            })?;
            serde_json::to_value(output).map_err(|source| RegistryError::Serialize {
                id: json_id.0.clone(),
                source,
            })
        });

        Self {
            id,
            input_type: short_type_name(type_name::<I>()),
            output_type: short_type_name(type_name::<O>()),
            typed: Arc::new(typed),
            json,
        }
    }

    pub fn id(&self) -> &FunctionId {
        &self.id
    }

    pub fn input_type(&self) -> &str {
        &self.input_type
    }

    pub fn output_type(&self) -> &str {
        &self.output_type
    }

    /// Recover the typed body, if `I` and `O` match the registered types.
    pub fn typed<I, O>(&self) -> Result<TypedFunction<I, O>, RegistryError>
    where
        I: 'static,
        O: 'static,
    {
        self.typed
            .downcast_ref::<TypedFn<I, O>>()
            .map(|body| TypedFunction {
                id: self.id.clone(),
                body: Arc::clone(body),
                _marker: PhantomData,
            })
            .ok_or_else(|| RegistryError::TypeMismatch {
                id: self.id.0.clone(),
                actual: format!("{} -> {}", self.input_type, self.output_type),
                requested: format!(
                    "{} -> {}",
                    short_type_name(type_name::<I>()),
                    short_type_name(type_name::<O>())
                ),
            })
    }

    pub fn invoke_json(&self, input: Value) -> Result<Value, RegistryError> {
        (self.json)(input)
    }
}

impl fmt::Debug for FunctionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionEntry")
            .field("id", &self.id)
            .field("input_type", &self.input_type)
            .field("output_type", &self.output_type)
            .finish_non_exhaustive()
    }
}

/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
        } else {
            out.push(c);
            if !(c.is_alphanumeric() || c == '_') {
                segment_start = out.len();
            }
        }
    }
    out
}

/// Typed handle to a registered function.
pub struct TypedFunction<I, O> {
    id: FunctionId,
    body: TypedFn<I, O>,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O> TypedFunction<I, O> {
    pub fn id(&self) -> &FunctionId {
        &self.id
    }

    pub fn call(&self, input: I) -> Result<O, FunctionError> {
        (self.body)(input)
    }
}

impl<I, O> Clone for TypedFunction<I, O> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            body: Arc::clone(&self.body),
            _marker: PhantomData,
        }
    }
}

impl<I, O> fmt::Debug for TypedFunction<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedFunction")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
