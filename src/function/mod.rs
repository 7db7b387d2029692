pub mod builtin;
pub mod converter;
pub mod entry;
pub mod error;
pub mod global;
pub mod registry;

pub use converter::{ConverterChain, MessageConverter};
pub use entry::{FunctionEntry, FunctionId, TypedFunction};
pub use error::{ConversionError, FunctionError, GlobalError, RegistryError};
pub use registry::FunctionRegistry;
