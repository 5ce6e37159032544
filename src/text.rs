//! Memcached text protocol: ASCII, CRLF-delimited, space-separated.
//!
//! The proxy only needs enough of the grammar to find the boundary of a
//! request: the payload length on storage commands, and the key list on
//! retrieval commands (so their multi-`VALUE` response can be framed).
use crate::error::{ProxyError, Result};

pub const EOL: &[u8] = b"\r\n";
pub const END_LINE: &[u8] = b"END\r\n";

/// A parsed text protocol command line, discriminated by verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRequest {
    Storage {
        raw: Vec<u8>,
        command: String,
        key: String,
        bytes: u32,
        noreply: bool,
    },
    Retrieval {
        raw: Vec<u8>,
        command: String,
        keys: Vec<String>,
    },
    DeleteTouch {
        raw: Vec<u8>,
        command: String,
        key: String,
        noreply: bool,
    },
    IncrDecr {
        raw: Vec<u8>,
        command: String,
        key: String,
        value: u64,
        noreply: bool,
    },
}

impl TextRequest {
    pub fn command(&self) -> &str {
        match self {
            Self::Storage { command, .. }
            | Self::Retrieval { command, .. }
            | Self::DeleteTouch { command, .. }
            | Self::IncrDecr { command, .. } => command,
        }
    }

    /// Storage commands with `noreply` set get no response from the
    /// backend; the text framer must not attempt to read one.
    pub fn expects_response(&self) -> bool {
        match self {
            Self::Storage { noreply, .. }
            | Self::DeleteTouch { noreply, .. }
            | Self::IncrDecr { noreply, .. } => !noreply,
            Self::Retrieval { .. } => true,
        }
    }

    pub fn is_retrieval(&self) -> bool {
        matches!(self, Self::Retrieval { .. })
    }
}

const STORAGE_VERBS: &[&str] = &["set", "cas", "add", "replace", "append", "prepend"];
const RETRIEVAL_VERBS: &[&str] = &["get", "gets"];
const DELETE_TOUCH_VERBS: &[&str] = &["delete", "touch"];
const INCR_DECR_VERBS: &[&str] = &["incr", "decr"];

/// Parse one CRLF-terminated command line (`line_bytes` includes the
/// trailing CRLF) into a [`TextRequest`].
pub fn parse_request_line(line_bytes: &[u8]) -> Result<TextRequest> {
    let line = std::str::from_utf8(line_bytes)
        .map_err(|e| ProxyError::MalformedHeader(format!("non-utf8 command line: {e}")))?
        .trim_end_matches(['\r', '\n']);
    let tokens: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();
    let verb = *tokens
        .first()
        .ok_or_else(|| ProxyError::MalformedHeader("empty command line".into()))?;
    let noreply = tokens.last().map(|t| *t == "noreply").unwrap_or(false);
    let raw = line_bytes.to_vec();

    if STORAGE_VERBS.contains(&verb) {
        let key = token(&tokens, 1, "key")?;
        let bytes = token(&tokens, 4, "bytes")?
            .parse::<u32>()
            .map_err(|_| ProxyError::MalformedHeader("bytes field not numeric".into()))?;
        Ok(TextRequest::Storage {
            raw,
            command: verb.to_string(),
            key: key.to_string(),
            bytes,
            noreply,
        })
    } else if RETRIEVAL_VERBS.contains(&verb) {
        let keys: Vec<String> = tokens[1..].iter().map(|t| t.to_string()).collect();
        if keys.is_empty() {
            return Err(ProxyError::MalformedHeader("retrieval command with no keys".into()));
        }
        Ok(TextRequest::Retrieval {
            raw,
            command: verb.to_string(),
            keys,
        })
    } else if DELETE_TOUCH_VERBS.contains(&verb) {
        let key = token(&tokens, 1, "key")?;
        Ok(TextRequest::DeleteTouch {
            raw,
            command: verb.to_string(),
            key: key.to_string(),
            noreply,
        })
    } else if INCR_DECR_VERBS.contains(&verb) {
        let key = token(&tokens, 1, "key")?;
        let value = token(&tokens, 2, "value")?
            .parse::<u64>()
            .map_err(|_| ProxyError::MalformedHeader("value field not numeric".into()))?;
        Ok(TextRequest::IncrDecr {
            raw,
            command: verb.to_string(),
            key: key.to_string(),
            value,
            noreply,
        })
    } else {
        Err(ProxyError::UnknownCommand(verb.to_string()))
    }
}

fn token<'a>(tokens: &[&'a str], index: usize, name: &'static str) -> Result<&'a str> {
    tokens
        .get(index)
        .copied()
        .ok_or_else(|| ProxyError::MalformedHeader(format!("missing {name} token")))
}

/// Extract the `bytes` quantity (4th token: `VALUE key flags bytes`) from a
/// retrieval response's `VALUE` header line.
pub fn value_line_bytes(line: &[u8]) -> Result<u32> {
    let line = std::str::from_utf8(line)
        .map_err(|e| ProxyError::MalformedHeader(format!("non-utf8 VALUE line: {e}")))?
        .trim_end_matches(['\r', '\n']);
    let tokens: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();
    token(&tokens, 3, "bytes")?
        .parse::<u32>()
        .map_err(|_| ProxyError::MalformedHeader("VALUE bytes field not numeric".into()))
}
