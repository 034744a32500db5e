pub mod cursor;

// Re-export for convenience
pub use cursor::{Cursor, ScanError};

/// Leading byte of a device identifier (`F12`).
pub const DEVICE_MARKER: u8 = b'F';
/// Leading byte of a logical node identifier (`g345`).
pub const NODE_MARKER: u8 = b'g';
