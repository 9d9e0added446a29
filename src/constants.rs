//! Format tokens and decoder defaults.

// ============================================================================
// Tokens
// ============================================================================

/// Starts an integer (`i42e`).
pub const INTEGER_START: u8 = b'i';

/// Starts a list (`l...e`).
pub const LIST_START: u8 = b'l';

/// Starts a dictionary (`d...e`).
pub const DICT_START: u8 = b'd';

/// Closes integers, lists and dictionaries.
pub const END: u8 = b'e';

/// Separates a byte string's length from its payload.
pub const STRING_SEPARATOR: u8 = b':';

/// Sign prefix of a negative integer.
pub const MINUS: u8 = b'-';

// ============================================================================
// Decoder limits
// ============================================================================

/// Default maximum number of nested lists and dictionaries.
///
/// Real-world metadata (torrent files, DHT messages) rarely goes beyond a
/// handful of levels; the limit keeps adversarial input from exhausting the
/// call stack.
pub const DEFAULT_MAX_DEPTH: usize = 64;
