//! Announce handshake - publishing the control socket before it opens.
//!
//! The manager emits a single JSON line on stdout telling its
//! supervisor (and any command-line tool scraping it) where the
//! control socket lives and which catalog version it speaks. A client
//! parses the line and refuses to connect across a catalog version
//! mismatch - both ends of a channel must run identical schema tables.
//!
//! # Important
//!
//! - **stdout**: the announce line only
//! - **stderr**: logs (never parsed)
//!
//! # Example
//!
//! ```
//! use ctlwire::control::{build_announce_message, parse_announce_message};
//!
//! let line = build_announce_message("/run/proxy/mgmt.sock");
//! let announce = parse_announce_message(&line).unwrap();
//! assert_eq!(announce.socket, "/run/proxy/mgmt.sock");
//! ```

use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ControlError, Result};
use crate::protocol::CATALOG_VERSION;

/// Protocol version string carried in the announce message.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Parsed announce parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announce {
    /// Filesystem path of the control socket.
    pub socket: String,
    /// Catalog version the manager speaks.
    pub catalog_version: u32,
    /// Protocol semver.
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    method: String,
    params: Announce,
}

/// Build the `$announce` JSON line for a manager binding `socket_path`.
pub fn build_announce_message(socket_path: &str) -> String {
    let msg = json!({
        "method": "$announce",
        "params": {
            "socket": socket_path,
            "catalog_version": CATALOG_VERSION,
            "version": PROTOCOL_VERSION,
        }
    });

    msg.to_string()
}

/// Parse an `$announce` line and enforce catalog agreement.
///
/// # Errors
///
/// `Json` for a malformed line, `InvalidValue` for a different method,
/// `CatalogVersion` when the peer's schema tables are not ours.
pub fn parse_announce_message(line: &str) -> Result<Announce> {
    let envelope: Envelope = serde_json::from_str(line)?;

    if envelope.method != "$announce" {
        return Err(ControlError::InvalidValue(format!(
            "expected $announce, got {}",
            envelope.method
        )));
    }

    if envelope.params.catalog_version != CATALOG_VERSION {
        return Err(ControlError::CatalogVersion {
            ours: CATALOG_VERSION,
            theirs: envelope.params.catalog_version,
        });
    }

    Ok(envelope.params)
}

/// Write a line to stdout and flush.
///
/// Uses an explicit `\n` so the supervisor sees exactly one line, and
/// flushes immediately - the peer waits for the complete line before
/// connecting.
pub fn write_stdout_line(line: &str) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(line.as_bytes())?;
    handle.write_all(b"\n")?;
    handle.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_announce_round_trip() {
        let line = build_announce_message("/run/proxy/mgmt.sock");
        let announce = parse_announce_message(&line).unwrap();

        assert_eq!(announce.socket, "/run/proxy/mgmt.sock");
        assert_eq!(announce.catalog_version, CATALOG_VERSION);
        assert_eq!(announce.version, PROTOCOL_VERSION);
    }

    #[test]
    fn test_announce_shape() {
        let line = build_announce_message("/tmp/t.sock");
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed["method"], "$announce");
        assert_eq!(parsed["params"]["socket"], "/tmp/t.sock");
        assert_eq!(parsed["params"]["catalog_version"], CATALOG_VERSION);
    }

    #[test]
    fn test_wrong_method_rejected() {
        let line = r#"{"method":"$init","params":{"socket":"/s","catalog_version":1,"version":"1.0.0"}}"#;
        let err = parse_announce_message(line).unwrap_err();
        assert!(matches!(err, ControlError::InvalidValue(_)));
    }

    #[test]
    fn test_catalog_version_mismatch_rejected() {
        let line = format!(
            r#"{{"method":"$announce","params":{{"socket":"/s","catalog_version":{},"version":"1.0.0"}}}}"#,
            CATALOG_VERSION + 1
        );
        let err = parse_announce_message(&line).unwrap_err();
        assert!(matches!(err, ControlError::CatalogVersion { .. }));
    }

    #[test]
    fn test_malformed_line_is_json_error() {
        let err = parse_announce_message("not json at all").unwrap_err();
        assert!(matches!(err, ControlError::Json(_)));
    }

    #[test]
    fn test_write_stdout_line_does_not_panic() {
        assert!(write_stdout_line(r#"{"test": true}"#).is_ok());
    }
}
