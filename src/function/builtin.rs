//! Functions shipped with the host.

use crate::function::error::{FunctionError, RegistryError};
use crate::function::registry::FunctionRegistry;
use crate::model::person::Person;

pub const UPPERCASE: &str = "uppercase";
pub const UPPERCASE_PERSON: &str = "uppercasePerson";

pub fn uppercase(input: String) -> String {
    input.to_uppercase()
}

pub fn uppercase_person(person: Person) -> Result<Person, FunctionError> {
    let name = person.name.ok_or(FunctionError::MissingField("name"))?;
    let mut out = Person::default();
    out.set_id(person.id);
    out.set_name(name.to_uppercase());
    Ok(out)
}

/// Register every built-in not named in `disabled`.
pub fn register_all(
    registry: &mut FunctionRegistry,
    disabled: &[String],
) -> Result<(), RegistryError> {
    let enabled = |id: &str| {
        let on = !disabled.iter().any(|name| name == id);
        if on {
            tracing::info!("==> CREATING '{id}' FUNCTION");
        } else {
            tracing::info!("skipping disabled function '{id}'");
        }
        on
    };

    if enabled(UPPERCASE) {
        registry.register(UPPERCASE, uppercase)?;
    }
    if enabled(UPPERCASE_PERSON) {
        registry.register_fallible(UPPERCASE_PERSON, uppercase_person)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercase_hello() {
        assert_eq!(uppercase("hello".to_string()), "HELLO");
    }

    #[test]
    fn uppercase_follows_unicode_case_mapping() {
        for s in ["", "MiXeD 123", "straße", "ǆemal", "ünïcödé", "日本"] {
            assert_eq!(uppercase(s.to_string()), s.to_uppercase());
        }
        assert_eq!(uppercase("straße".to_string()), "STRASSE");
    }

    #[test]
    fn uppercase_person_copies_id() {
        let out = uppercase_person(Person::new(1, "ana")).unwrap();
        assert_eq!(out, Person::new(1, "ANA"));
    }

    #[test]
    fn uppercase_person_without_name_fails() {
        let person = Person {
            id: 9,
            name: None,
        };
        assert_eq!(
            uppercase_person(person),
            Err(FunctionError::MissingField("name"))
        );
    }

    #[test]
    fn register_all_skips_disabled() {
        let mut registry = FunctionRegistry::new();
        register_all(&mut registry, &[UPPERCASE_PERSON.to_string()]).unwrap();
        assert_eq!(registry.names(), vec![UPPERCASE]);
    }

    #[test]
    fn register_all_twice_is_rejected() {
        let mut registry = FunctionRegistry::new();
        register_all(&mut registry, &[]).unwrap();
        assert!(matches!(
            register_all(&mut registry, &[]),
            Err(RegistryError::AlreadyRegistered(_))
        ));
    }
}
