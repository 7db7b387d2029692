use serde::{Deserialize, Serialize};

/// A person record as carried by the `uppercasePerson` function.
///
/// `name` is optional so an absent or `null` name survives deserialization
/// and can be rejected explicitly by the function instead of by serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub name: Option<String>,
}

impl Person {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }
}
