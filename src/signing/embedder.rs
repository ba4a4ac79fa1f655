//! Embedded signature block stored at the end of a contract's `content`.
//!
//! ```text
//! <contract body text...>
//!
//! [EMBEDDED_SIGNATURES]<JSON array of SignatureEntry>[/EMBEDDED_SIGNATURES]
//! ```
//!
//! Extraction anchors on the last open marker. Reserialization strips every
//! complete block before appending a fresh one, and marker text inside JSON
//! string values is written with a `\u005b` escape so a signer name can never
//! close the block early.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

pub const OPEN_MARKER: &str = "[EMBEDDED_SIGNATURES]";
pub const CLOSE_MARKER: &str = "[/EMBEDDED_SIGNATURES]";

const ESCAPED_OPEN_MARKER: &str = "\\u005bEMBEDDED_SIGNATURES]";
const ESCAPED_CLOSE_MARKER: &str = "\\u005b/EMBEDDED_SIGNATURES]";

/// Field id reserved for the admin countersignature.
pub const ADMIN_FIELD_ID: i64 = 999;
pub const ADMIN_ORIGIN: &str = "admin-portal";
pub const MEMBER_ORIGIN: &str = "member-portal";

/// Who applied a signature. Used as the dedup key when merging.
///
/// Unknown roles found in stored content are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignerRole {
    Admin,
    Member,
    Other(String),
}

impl From<String> for SignerRole {
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => SignerRole::Admin,
            "member" => SignerRole::Member,
            _ => SignerRole::Other(value),
        }
    }
}

impl From<SignerRole> for String {
    fn from(role: SignerRole) -> Self {
        match role {
            SignerRole::Admin => "admin".to_string(),
            SignerRole::Member => "member".to_string(),
            SignerRole::Other(other) => other,
        }
    }
}

impl fmt::Display for SignerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerRole::Admin => f.write_str("admin"),
            SignerRole::Member => f.write_str("member"),
            SignerRole::Other(other) => f.write_str(other),
        }
    }
}

/// One signature inside the embedded block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureEntry {
    pub field_id: i64,
    /// Drawn-signature data URL or typed text.
    pub signature_data: String,
    /// Display date, e.g. `10/18/2026`.
    #[serde(default)]
    pub date_signed: String,
    /// ISO 8601 timestamp of the signing.
    #[serde(default)]
    pub timestamp: String,
    /// Where the signature came from (`admin-portal`, `member-portal`, ...).
    #[serde(default)]
    pub ip_address: String,
    #[serde(rename = "signerType")]
    pub signer_role: SignerRole,
    #[serde(default)]
    pub signer_name: String,
}

/// Read the signatures embedded in `content`.
///
/// Missing or unparseable blocks yield an empty list: content is free text and
/// may have been edited by hand.
pub fn extract_signatures(content: &str) -> Vec<SignatureEntry> {
    let Some(payload) = block_payload(content) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<SignatureEntry>>(payload) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Ignoring unparseable embedded signature block");
            Vec::new()
        }
    }
}

/// Replace any entry from the same signer role with `entry`, appended last.
pub fn merge_signature(existing: Vec<SignatureEntry>, entry: SignatureEntry) -> Vec<SignatureEntry> {
    let mut merged: Vec<SignatureEntry> = existing
        .into_iter()
        .filter(|e| e.signer_role != entry.signer_role)
        .collect();
    merged.push(entry);
    merged
}

/// Rebuild `content` with a single block holding `entries` at the end.
pub fn reserialize(content: &str, entries: &[SignatureEntry]) -> Result<String, serde_json::Error> {
    let body = contract_body(content);
    let payload = serde_json::to_string(entries)?
        .replace(OPEN_MARKER, ESCAPED_OPEN_MARKER)
        .replace(CLOSE_MARKER, ESCAPED_CLOSE_MARKER);

    if body.is_empty() {
        return Ok(format!("{OPEN_MARKER}{payload}{CLOSE_MARKER}"));
    }
    Ok(format!("{body}\n\n{OPEN_MARKER}{payload}{CLOSE_MARKER}"))
}

/// Extract, merge and reserialize in one step.
pub fn embed_signature(content: &str, entry: SignatureEntry) -> Result<String, serde_json::Error> {
    let merged = merge_signature(extract_signatures(content), entry);
    reserialize(content, &merged)
}

/// The human-readable part of `content`, with every signature block removed.
///
/// Stripping repeats until nothing changes, so nested blocks such as
/// `[A][A][/A][/A]` leave no complete block behind.
pub fn contract_body(content: &str) -> String {
    let mut body = strip_blocks(content);
    loop {
        let next = strip_blocks(&body);
        if next == body {
            return body;
        }
        body = next;
    }
}

fn strip_blocks(content: &str) -> String {
    let mut body = String::with_capacity(content.len());
    let mut rest = content;

    // Pair each close marker with the nearest open marker before it; stray
    // close markers stay in the text.
    while let Some(close) = rest.find(CLOSE_MARKER) {
        let end = close + CLOSE_MARKER.len();
        match rest[..close].rfind(OPEN_MARKER) {
            Some(open) => body.push_str(&rest[..open]),
            None => body.push_str(&rest[..end]),
        }
        rest = &rest[end..];
    }
    body.push_str(rest);

    body.trim_end().to_string()
}

fn block_payload(content: &str) -> Option<&str> {
    let open = content.rfind(OPEN_MARKER)?;
    let start = open + OPEN_MARKER.len();
    let len = content[start..].find(CLOSE_MARKER)?;
    Some(&content[start..start + len])
}
