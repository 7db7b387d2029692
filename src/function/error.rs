/// Failure raised by a function body itself.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FunctionError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("function not found: {0}")]
    NotFound(String),
    #[error("function already registered: {0}")]
    AlreadyRegistered(String),
    #[error("function {id} is {actual}, requested {requested}")]
    TypeMismatch {
        id: String,
        actual: String,
        requested: String,
    },
    #[error("invalid input for {id}")]
    InvalidInput {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("function {id} failed")]
    Function {
        id: String,
        #[source]
        source: FunctionError,
    },
    #[error("cannot serialize output of {id}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("no converter could handle {0}")]
    Unsupported(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GlobalError {
    #[error("function registry already installed")]
    AlreadyInstalled,
    #[error("function registry not installed")]
    NotInstalled,
}
