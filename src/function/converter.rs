use serde_json::Value;

use crate::function::error::ConversionError;
use crate::model::message::{APPLICATION_JSON, CONTENT_TYPE, Headers, Message};

/// Translates between wire messages and JSON values.
///
/// Returning `None` means "not handled here"; a [`ConverterChain`] then asks
/// the next converter.
pub trait MessageConverter: Send + Sync {
    fn name(&self) -> &str;

    fn to_message(&self, payload: &Value, headers: &Headers) -> Option<Message>;

    fn from_message(&self, message: &Message, target_type: &str) -> Option<Value>;
}

/// Placeholder converter. Never converts anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMessageConverter;

impl MessageConverter for NoopMessageConverter {
    fn name(&self) -> &str {
        "noop"
    }

    fn to_message(&self, _payload: &Value, _headers: &Headers) -> Option<Message> {
        tracing::trace!("noop converter: to_message not implemented");
        None
    }

    fn from_message(&self, _message: &Message, target_type: &str) -> Option<Value> {
        tracing::trace!("noop converter: from_message to {target_type} not implemented");
        None
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonMessageConverter;

impl JsonMessageConverter {
    fn accepts(message: &Message) -> bool {
        match message.content_type() {
            None => true,
            Some(content_type) => content_type
                .split(';')
                .next()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(APPLICATION_JSON)),
        }
    }
}

impl MessageConverter for JsonMessageConverter {
    fn name(&self) -> &str {
        "json"
    }

    fn to_message(&self, payload: &Value, headers: &Headers) -> Option<Message> {
        let bytes = serde_json::to_vec(payload).ok()?;
        let mut message = Message::new(bytes);
        message.headers = headers.clone();
        Some(message.with_header(CONTENT_TYPE, APPLICATION_JSON))
    }

    fn from_message(&self, message: &Message, target_type: &str) -> Option<Value> {
        if !Self::accepts(message) {
            return None;
        }

        match serde_json::from_slice(&message.payload) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!("json converter: cannot read payload as {target_type}: {err}");
                None
            }
        }
    }
}

/// Ordered converters; the first one to produce a result wins.
#[derive(Default)]
pub struct ConverterChain {
    converters: Vec<Box<dyn MessageConverter>>,
}

impl ConverterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// A custom no-op converter ahead of the JSON default.
    pub fn with_defaults() -> Self {
        Self::new()
            .with(NoopMessageConverter)
            .with(JsonMessageConverter)
    }

    pub fn with(mut self, converter: impl MessageConverter + 'static) -> Self {
        self.converters.push(Box::new(converter));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.converters.iter().map(|c| c.name()).collect()
    }

    pub fn to_message(&self, payload: &Value, headers: &Headers) -> Result<Message, ConversionError> {
        self.converters
            .iter()
            .find_map(|converter| converter.to_message(payload, headers))
            .ok_or_else(|| ConversionError::Unsupported("payload".to_string()))
    }

    pub fn from_message(
        &self,
        message: &Message,
        target_type: &str,
    ) -> Result<Value, ConversionError> {
        self.converters
            .iter()
            .find_map(|converter| converter.from_message(message, target_type))
            .ok_or_else(|| ConversionError::Unsupported(target_type.to_string()))
    }
}

impl std::fmt::Debug for ConverterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterChain")
            .field("converters", &self.names())
            .finish()
    }
}
