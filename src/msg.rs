use crate::function::registry::COMPOSITION_DELIMITER;

/// One parsed line of host input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `None` definition means the configured default.
    Invoke {
        definition: Option<String>,
        payload: String,
    },
    List,
    Quit,
    Empty,
}

impl Request {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Request::Empty;
        }

        match line {
            ":list" => return Request::List,
            ":quit" => return Request::Quit,
            _ => {}
        }

        if looks_like_json(line) {
            return Request::Invoke {
                definition: None,
                payload: line.to_string(),
            };
        }

        let (definition, payload) = split_definition(line);

        Request::Invoke {
            definition: Some(definition),
            payload: payload.to_string(),
        }
    }
}

/// Split `a | b {...}` into the normalized definition `a|b` and the payload.
/// Whitespace-separated tokens stay in the definition while a `|` joins them.
fn split_definition(line: &str) -> (String, &str) {
    let token_end = |start: usize| {
        line[start..]
            .find(char::is_whitespace)
            .map_or(line.len(), |offset| start + offset)
    };

    let mut end = token_end(0);
    loop {
        let after = line[end..].trim_start();
        let joined = line[..end].ends_with(COMPOSITION_DELIMITER)
            || after.starts_with(COMPOSITION_DELIMITER);
        if after.is_empty() || !joined {
            break;
        }
        end = token_end(line.len() - after.len());
    }

    let definition = line[..end]
        .split(COMPOSITION_DELIMITER)
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("|");
    (definition, line[end..].trim())
}

// Keyword literals only match as a whole line so identifiers such as
// `flatten` still parse as a definition.
fn looks_like_json(line: &str) -> bool {
    match line.as_bytes()[0] {
        b'{' | b'[' | b'"' | b'-' | b'0'..=b'9' => true,
        _ => matches!(line, "true" | "false" | "null"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoke(definition: Option<&str>, payload: &str) -> Request {
        Request::Invoke {
            definition: definition.map(str::to_string),
            payload: payload.to_string(),
        }
    }

    #[test]
    fn parses_commands_and_blank_lines() {
        assert_eq!(Request::parse(":list"), Request::List);
        assert_eq!(Request::parse("  :quit \n"), Request::Quit);
        assert_eq!(Request::parse("   "), Request::Empty);
    }

    #[test]
    fn definition_then_payload() {
        assert_eq!(
            Request::parse("uppercasePerson {\"id\": 1, \"name\": \"ana\"}"),
            invoke(Some("uppercasePerson"), "{\"id\": 1, \"name\": \"ana\"}")
        );
        assert_eq!(
            Request::parse("uppercase|uppercase   \"hi\""),
            invoke(Some("uppercase|uppercase"), "\"hi\"")
        );
        assert_eq!(
            Request::parse("uppercase | uppercase \"x\""),
            invoke(Some("uppercase|uppercase"), "\"x\"")
        );
        assert_eq!(
            Request::parse("a |b| c {\"k\": \"v w\"}"),
            invoke(Some("a|b|c"), "{\"k\": \"v w\"}")
        );
        assert_eq!(
            Request::parse("a| b"),
            invoke(Some("a|b"), "")
        );
    }

    #[test]
    fn bare_payload_uses_default_definition() {
        assert_eq!(Request::parse("\"hello\""), invoke(None, "\"hello\""));
        assert_eq!(Request::parse("-3"), invoke(None, "-3"));
        assert_eq!(Request::parse("null"), invoke(None, "null"));
    }

    #[test]
    fn definition_without_payload() {
        assert_eq!(Request::parse("uppercase"), invoke(Some("uppercase"), ""));
    }
}
