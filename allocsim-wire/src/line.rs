//! ## allocsim-wire::line
//! Parser for the line-oriented event format.
//!
//! Line shapes:
//! - `m:<addr>,<size>,<label...>`: allocate
//! - `f:<addr>,<label...>`: free
//! - `c:<addr>,...`: corruption marker (trailing fields ignored)
//! - `used`: collision retry diagnostic, not an event
//!
//! Hex fields are unprefixed lowercase. Labels may themselves contain commas,
//! so everything after the fixed fields is rejoined with `,`.

use allocsim_core::events::COLLISION_LINE;
use allocsim_core::AllocEvent;
use thiserror::Error;

/// Errors that can occur while parsing a stream line.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WireParseError {
    #[error("missing ':' separator")]
    MissingSeparator,
    #[error("unknown event type: {0:?}")]
    UnknownType(String),
    #[error("missing address field")]
    MissingAddress,
    #[error("missing size field")]
    MissingSize,
    #[error("invalid hex field: {0:?}")]
    InvalidHex(String),
}

/// One parsed line of the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// A real allocator event.
    Event(AllocEvent),
    /// The `used` retry diagnostic.
    Collision,
}

fn parse_hex(field: &str) -> Result<u64, WireParseError> {
    u64::from_str_radix(field, 16).map_err(|_| WireParseError::InvalidHex(field.to_string()))
}

/// Parses a single line (trailing newline accepted).
pub fn parse_line(line: &str) -> Result<Line, WireParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line == COLLISION_LINE {
        return Ok(Line::Collision);
    }

    let (kind, data) = line
        .split_once(':')
        .ok_or(WireParseError::MissingSeparator)?;
    let mut fields = data.split(',');
    let addr_field = fields
        .next()
        .filter(|field| !field.is_empty())
        .ok_or(WireParseError::MissingAddress)?;
    let addr = parse_hex(addr_field)?;

    match kind {
        "m" => {
            let size_field = fields.next().ok_or(WireParseError::MissingSize)?;
            let size = parse_hex(size_field)?;
            let label = fields.collect::<Vec<_>>().join(",");
            Ok(Line::Event(AllocEvent::Malloc { addr, size, label }))
        }
        "f" => {
            let label = fields.collect::<Vec<_>>().join(",");
            Ok(Line::Event(AllocEvent::Free { addr, label }))
        }
        "c" => Ok(Line::Event(AllocEvent::Corrupt { addr })),
        other => Err(WireParseError::UnknownType(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_malloc_line() {
        let line = parse_line("m:bb8,2bc,aa").unwrap();
        assert_eq!(
            line,
            Line::Event(AllocEvent::Malloc {
                addr: 3000,
                size: 700,
                label: "aa".to_string(),
            })
        );
    }

    #[test]
    fn parses_free_line() {
        let line = parse_line("f:1f3a0,aaa\n").unwrap();
        assert_eq!(
            line,
            Line::Event(AllocEvent::Free {
                addr: 0x1f3a0,
                label: "aaa".to_string(),
            })
        );
    }

    #[test]
    fn corrupt_line_ignores_trailing_fields() {
        let line = parse_line("c:2a,aa,whatever").unwrap();
        assert_eq!(line, Line::Event(AllocEvent::Corrupt { addr: 42 }));
    }

    #[test]
    fn label_may_contain_commas() {
        let line = parse_line("m:1,10,main,alloc,0").unwrap();
        assert_eq!(
            line,
            Line::Event(AllocEvent::Malloc {
                addr: 1,
                size: 16,
                label: "main,alloc,0".to_string(),
            })
        );
    }

    #[test]
    fn recognizes_collision_diagnostic() {
        assert_eq!(parse_line("used").unwrap(), Line::Collision);
        assert_eq!(parse_line("used\n").unwrap(), Line::Collision);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_line("garbage"), Err(WireParseError::MissingSeparator));
        assert_eq!(
            parse_line("x:1,2,aa"),
            Err(WireParseError::UnknownType("x".to_string()))
        );
        assert_eq!(parse_line("m:"), Err(WireParseError::MissingAddress));
        assert_eq!(parse_line("m:ff"), Err(WireParseError::MissingSize));
        assert_eq!(
            parse_line("m:zz,10,aa"),
            Err(WireParseError::InvalidHex("zz".to_string()))
        );
        assert_eq!(
            parse_line("f:0x10,aaa"),
            Err(WireParseError::InvalidHex("0x10".to_string()))
        );
    }

    #[test]
    fn rendered_events_parse_back() {
        for event in [
            AllocEvent::malloc(0, 16),
            AllocEvent::malloc(199_999, 1024),
            AllocEvent::free(77),
            AllocEvent::Corrupt { addr: 0x30d3f },
        ] {
            let parsed = parse_line(&event.to_string()).unwrap();
            assert_eq!(parsed, Line::Event(event));
        }
    }
}
