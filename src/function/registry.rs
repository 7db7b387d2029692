use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::function::entry::{FunctionEntry, FunctionId, TypedFunction};
use crate::function::error::{FunctionError, RegistryError};

/// Separator between identifiers in a composed definition, e.g. `a|b`.
pub const COMPOSITION_DELIMITER: char = '|';

/// Mapping from identifiers to functions. Filled at startup, read-only after.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    entries: HashMap<FunctionId, FunctionEntry>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an infallible function.
    pub fn register<I, O, F>(&mut self, id: &str, f: F) -> Result<(), RegistryError>
    where
        I: DeserializeOwned + 'static,
        O: Serialize + 'static,
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        self.register_fallible(id, move |input: I| Ok(f(input)))
    }

    /// Register a function whose body can fail with [`FunctionError`].
    pub fn register_fallible<I, O, F>(&mut self, id: &str, f: F) -> Result<(), RegistryError>
    where
        I: DeserializeOwned + 'static,
        O: Serialize + 'static,
        F: Fn(I) -> Result<O, FunctionError> + Send + Sync + 'static,
    {
        let key = FunctionId::new(id);
        match self.entries.entry(key) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyRegistered(id.to_string())),
            Entry::Vacant(slot) => {
                let entry = FunctionEntry::new(slot.key().clone(), f);
                tracing::debug!(
                    "registered function {id}: {} -> {}",
                    entry.input_type(),
                    entry.output_type()
                );
                slot.insert(entry);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, id: &str) -> Result<&FunctionEntry, RegistryError> {
        self.entries.get(id).ok_or_else(|| {
            tracing::debug!("function lookup miss: {id}");
            RegistryError::NotFound(id.to_string())
        })
    }

    pub fn lookup_typed<I, O>(&self, id: &str) -> Result<TypedFunction<I, O>, RegistryError>
    where
        I: 'static,
        O: 'static,
    {
        self.lookup(id)?.typed()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Resolve every segment of a definition such as `uppercase|uppercase`.
    pub fn resolve(&self, definition: &str) -> Result<Vec<&FunctionEntry>, RegistryError> {
        definition
            .split(COMPOSITION_DELIMITER)
            .map(str::trim)
            .map(|segment| {
                if segment.is_empty() {
                    Err(RegistryError::NotFound(definition.to_string()))
                } else {
                    self.lookup(segment)
                }
            })
            .collect()
    }

    /// Input type name of the first function in `definition`.
    pub fn input_type_of(&self, definition: &str) -> Result<&str, RegistryError> {
        let chain = self.resolve(definition)?;
        Ok(chain
            .first()
            .map(|entry| entry.input_type())
            .unwrap_or("unknown"))
    }

    /// Apply `definition` left to right through the JSON form of each function.
    pub fn invoke_json(&self, definition: &str, input: Value) -> Result<Value, RegistryError> {
        self.resolve(definition)?
            .into_iter()
            .try_fold(input, |value, entry| entry.invoke_json(value))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(FunctionId::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        registry
            .register("reverse", |s: String| s.chars().rev().collect::<String>())
            .unwrap();
        registry
            .register("len", |s: String| s.chars().count())
            .unwrap();
        registry
    }

    #[test]
    fn lookup_unknown_is_not_found() {
        let err = registry().lookup("missing").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(ref id) if id == "missing"));
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let mut registry = registry();
        let err = registry
            .register("reverse", |s: String| s)
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(_)));

        let f = registry.lookup_typed::<String, String>("reverse").unwrap();
        assert_eq!(f.call("abc".to_string()).unwrap(), "cba");
    }

    #[test]
    fn composition_applies_left_to_right() {
        let out = registry()
            .invoke_json("reverse | len", json!("héllo"))
            .unwrap();
        assert_eq!(out, json!(5));
    }

    #[test]
    fn composition_with_unknown_or_empty_segment_fails() {
        let registry = registry();
        assert!(matches!(
            registry.invoke_json("reverse|nope", json!("x")),
            Err(RegistryError::NotFound(ref id)) if id == "nope"
        ));
        assert!(matches!(
            registry.invoke_json("reverse||len", json!("x")),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn composition_type_errors_surface_as_invalid_input() {
        let err = registry().invoke_json("len|reverse", json!("abc")).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidInput { ref id, .. } if id == "reverse"));
    }

    #[test]
    fn names_are_sorted() {
        let registry = registry();
        assert_eq!(registry.names(), vec!["len", "reverse"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("len"));
        assert!(!FunctionRegistry::new().contains("len"));
        assert!(FunctionRegistry::new().is_empty());
    }

    #[test]
    fn input_type_of_first_segment() {
        let registry = registry();
        assert_eq!(
            registry.input_type_of("reverse|len").unwrap(),
            "String"
        );
    }
}
