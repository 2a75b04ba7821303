#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TimecodeError {
    #[error("invalid timestamp {0:?}, expected HH:MM:SS")]
    Malformed(String),
}

/// Parses an `H:MM:SS` / `HH:MM:SS` timestamp into whole seconds.
///
/// Hours may carry one or more digits, minutes and seconds exactly two.
/// An absent or empty value means "unspecified" and is not an error;
/// anything else malformed is rejected before any download starts.
pub fn parse_timecode(value: Option<&str>) -> Result<Option<u64>, TimecodeError> {
    let raw = match value {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => return Ok(None),
    };

    let malformed = || TimecodeError::Malformed(raw.to_string());

    let mut parts = raw.split(':');
    let (h, m, s) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(s), None) => (h, m, s),
        _ => return Err(malformed()),
    };

    if h.is_empty() || m.len() != 2 || s.len() != 2 {
        return Err(malformed());
    }
    for field in [h, m, s] {
        if !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
    }

    let h: u64 = h.parse().map_err(|_| malformed())?;
    let m: u64 = m.parse().map_err(|_| malformed())?;
    let s: u64 = s.parse().map_err(|_| malformed())?;

    Ok(Some(h * 3600 + m * 60 + s))
}
