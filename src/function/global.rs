//! The process-wide registry.
//!
//! Lifecycle: build a [`FunctionRegistry`] during startup, hand it to
//! [`install`], read it anywhere through [`get`], and call [`shutdown`]
//! before exit. Handles obtained from [`get`] stay valid after shutdown
//! until they are dropped.

use std::sync::{Arc, PoisonError, RwLock};

use crate::function::error::GlobalError;
use crate::function::registry::FunctionRegistry;

static REGISTRY: RwLock<Option<Arc<FunctionRegistry>>> = RwLock::new(None);

pub fn install(registry: FunctionRegistry) -> Result<Arc<FunctionRegistry>, GlobalError> {
    let mut slot = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        return Err(GlobalError::AlreadyInstalled);
    }

    let registry = Arc::new(registry);
    tracing::info!("function registry installed: {} functions", registry.len());
    *slot = Some(Arc::clone(&registry));
    Ok(registry)
}

pub fn get() -> Result<Arc<FunctionRegistry>, GlobalError> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(GlobalError::NotInstalled)
}

pub fn shutdown() -> Option<Arc<FunctionRegistry>> {
    let taken = REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if taken.is_some() {
        tracing::info!("function registry shut down");
    }
    taken
}
