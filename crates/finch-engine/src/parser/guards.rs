//! Parser guards against stack overflow

/// Maximum nesting depth of statements and expressions before the parser
/// rejects the input.
///
/// Each level costs a dozen native frames in the expression descent, so the
/// limit stays well inside a test thread's stack in debug builds.
pub const MAX_PARSE_DEPTH: usize = 48;
