// Vessel context <-> MMSI token.
//
// Only contexts of the exact form `vessels.urn:mrn:imo:mmsi:<digits>` are
// compacted. Anything else stays in `context` untouched so expansion can
// always rebuild the original string from the token.

/// URN template prefix rebuilt in front of the MMSI token on expansion.
pub const VESSEL_URN_PREFIX: &str = "vessels.urn:mrn:imo:mmsi:";

/// Extract the MMSI token from a recognized vessel context.
pub fn mmsi_of(context: &str) -> Option<&str> {
    let token = context.strip_prefix(VESSEL_URN_PREFIX)?;
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        Some(token)
    } else {
        None
    }
}

/// Rebuild the full vessel context from an MMSI token.
pub fn context_for(mmsi: &str) -> String {
    format!("{VESSEL_URN_PREFIX}{mmsi}")
}
