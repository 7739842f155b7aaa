//! Block marker recognition
//!
//! A block is opened by `===<Name> Start===` and closed by `===<Name> End===`.
//! Recognition is exact: no whitespace tolerance around the literal framing.

const MARKER_PREFIX: &str = "===";
const START_SUFFIX: &str = " Start===";
const END_SUFFIX: &str = " End===";

/// Extract the name between the prefix and the given suffix.
///
/// Empty names are rejected so that every container gets a non-empty name.
fn framed_name<'a>(line: &'a str, suffix: &str) -> Option<&'a str> {
    line.strip_prefix(MARKER_PREFIX)?
        .strip_suffix(suffix)
        .filter(|name| !name.is_empty())
}

/// True iff the line is exactly `===<Name> Start===`.
pub fn is_block_start(line: &str) -> bool {
    framed_name(line, START_SUFFIX).is_some()
}

/// True iff the line is exactly `===<Name> End===`.
pub fn is_block_end(line: &str) -> bool {
    framed_name(line, END_SUFFIX).is_some()
}

/// Name carried by a start or end marker, verbatim.
///
/// Returns `None` for lines that are not markers.
pub fn marker_name(line: &str) -> Option<&str> {
    framed_name(line, START_SUFFIX).or_else(|| framed_name(line, END_SUFFIX))
}

/// True iff the line is an end marker for exactly `expected_name`.
///
/// A closer for any other name does not terminate the block.
pub fn closes(line: &str, expected_name: &str) -> bool {
    framed_name(line, END_SUFFIX) == Some(expected_name)
}

/// True iff the line is a start marker for exactly `name`.
pub fn opens(line: &str, name: &str) -> bool {
    framed_name(line, START_SUFFIX) == Some(name)
}
