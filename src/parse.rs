//! Line parser for device responses
//!
//! Converts one raw line from the board into a typed classification. The
//! distinction between ignorable protocol chatter ([`ParsedLine::Status`])
//! and malformed numeric data ([`ParsedLine::Malformed`]) is kept in the
//! interface so the recorder can skip the former while counting the latter
//! as a data-quality signal.

use crate::device::protocol::StatusToken;
use crate::types::Sample;

/// Result of classifying one line from the device
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// A valid sensor reading, stamped at parse time
    Reading(Sample),
    /// A protocol acknowledgement ("ON"/"OFF"), not an error and not a sample
    Status(StatusToken),
    /// Neither a status token nor a parseable number
    Malformed,
}

impl ParsedLine {
    /// Check whether this line carried a reading
    pub fn is_reading(&self) -> bool {
        matches!(self, ParsedLine::Reading(_))
    }
}

/// Classify one raw line from the device
///
/// Leading/trailing whitespace (including the newline terminator) is
/// stripped here, so callers may hand over lines straight off the wire.
/// No state is kept between calls.
pub fn parse_line(raw: &str) -> ParsedLine {
    let trimmed = raw.trim();

    if let Some(token) = StatusToken::from_line(trimmed) {
        return ParsedLine::Status(token);
    }

    match trimmed.parse::<f64>() {
        Ok(value) => ParsedLine::Reading(Sample::now(value)),
        Err(_) => ParsedLine::Malformed,
    }
}
