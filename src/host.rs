use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;

use crate::function::{ConverterChain, FunctionRegistry};
use crate::model::message::{APPLICATION_JSON, CONTENT_TYPE, Message};
use crate::msg::Request;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Line(String),
    Error(String),
    Nothing,
    Quit,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HostStats {
    pub handled: usize,
    pub failed: usize,
}

/// Line-oriented invocation boundary in front of a [`FunctionRegistry`].
#[derive(Debug)]
pub struct Host {
    registry: Arc<FunctionRegistry>,
    converters: ConverterChain,
    default_definition: String,
}

impl Host {
    pub fn new(
        registry: Arc<FunctionRegistry>,
        converters: ConverterChain,
        default_definition: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            converters,
            default_definition: default_definition.into(),
        }
    }

    /// Serve requests until `:quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<HostStats> {
        let mut stats = HostStats::default();
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let reply = match decode_line(&buf) {
                Ok(line) => self.handle(Request::parse(line)),
                Err(err) => {
                    tracing::warn!("line {line_no}: {err}");
                    Reply::Error(format!("line {line_no} is not valid UTF-8: {err}"))
                }
            };

            match reply {
                Reply::Line(text) => {
                    stats.handled += 1;
                    writeln!(output, "{text}")?;
                }
                Reply::Error(err) => {
                    stats.handled += 1;
                    stats.failed += 1;
                    writeln!(output, "error: {err}")?;
                }
                Reply::Nothing => {}
                Reply::Quit => break,
            }
            output.flush()?;
        }

        tracing::info!(
            "host finished: {} requests, {} failed",
            stats.handled,
            stats.failed
        );
        Ok(stats)
    }

    pub fn handle(&self, request: Request) -> Reply {
        match request {
            Request::Empty => Reply::Nothing,
            Request::Quit => Reply::Quit,
            Request::List => Reply::Line(format!("functions: {}", self.registry.names().join(", "))),
            Request::Invoke {
                definition,
                payload,
            } => {
                let definition = definition.as_deref().unwrap_or(self.default_definition.as_str());
                match self.invoke(definition, payload.into_bytes()) {
                    Ok(bytes) => Reply::Line(String::from_utf8_lossy(&bytes).into_owned()),
                    Err(err) => {
                        tracing::warn!("invocation of {definition} failed: {err:#}");
                        Reply::Error(format!("{err:#}"))
                    }
                }
            }
        }
    }

    /// Decode `payload`, apply `definition`, and encode the result.
    pub fn invoke(&self, definition: &str, payload: Vec<u8>) -> Result<Vec<u8>> {
        let target_type = self.registry.input_type_of(definition)?;
        let request = Message::new(payload).with_header(CONTENT_TYPE, APPLICATION_JSON);

        let input = self.converters.from_message(&request, target_type)?;
        tracing::debug!("invoking {definition}");
        let output = self.registry.invoke_json(definition, input)?;

        let reply = self.converters.to_message(&output, &request.headers)?;
        Ok(reply.payload)
    }
}

/// Strip the line terminator (`\n` or `\r\n`) and check the encoding.
fn decode_line(raw: &[u8]) -> Result<&str, std::str::Utf8Error> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    std::str::from_utf8(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::builtin;

    fn host() -> Host {
        let mut registry = FunctionRegistry::new();
        builtin::register_all(&mut registry, &[]).unwrap();
        Host::new(
            Arc::new(registry),
            ConverterChain::with_defaults(),
            builtin::UPPERCASE,
        )
    }

    #[test]
    fn default_definition_applies_to_bare_payload() {
        assert_eq!(
            host().handle(Request::parse("\"hello\"")),
            Reply::Line("\"HELLO\"".to_string())
        );
    }

    #[test]
    fn unknown_function_is_an_error_line() {
        assert_eq!(
            host().handle(Request::parse("lowercase \"X\"")),
            Reply::Error("function not found: lowercase".to_string())
        );
    }

    #[test]
    fn missing_name_reports_cause() {
        let reply = host().handle(Request::parse("uppercasePerson {\"id\": 2}"));
        assert_eq!(
            reply,
            Reply::Error("function uppercasePerson failed: missing field: name".to_string())
        );
    }

    #[test]
    fn empty_payload_is_unsupported() {
        let Reply::Error(err) = host().handle(Request::parse("uppercase")) else {
            panic!("expected an error reply");
        };
        assert_eq!(err, "no converter could handle String");
    }

    #[test]
    fn decode_line_strips_terminators() {
        assert_eq!(decode_line(b"\"a\"\r\n").unwrap(), "\"a\"");
        assert_eq!(decode_line(b"\"a\"").unwrap(), "\"a\"");
        assert!(decode_line(b"uppercase \"\xff\"\n").is_err());
    }

    #[test]
    fn spaced_composition_reaches_registry() {
        assert_eq!(
            host().handle(Request::parse("uppercase | uppercase \"x\"")),
            Reply::Line("\"X\"".to_string())
        );
    }

    #[test]
    fn list_names_functions() {
        assert_eq!(
            host().handle(Request::List),
            Reply::Line("functions: uppercase, uppercasePerson".to_string())
        );
    }
}
