//! Construction-time failure modes (§7(d)). Every other error kind in the
//! spec is a recoverable runtime condition surfaced through flags, booleans,
//! or result codes, not through this type.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionError {
    /// `history-buffer-size` is nonzero but too small to ever hold an item.
    HistoryBufferTooSmall,
    /// `cmd-buffer-size` is below the 2-byte minimum for any useful input.
    CommandBufferTooSmall,
    /// `max-binding-count` leaves no room for the internal `help` binding.
    BindingCapacityIsZero,
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConstructionError::HistoryBufferTooSmall => {
                "history buffer is too small to hold any item"
            }
            ConstructionError::CommandBufferTooSmall => {
                "command buffer must hold at least 2 bytes"
            }
            ConstructionError::BindingCapacityIsZero => {
                "binding capacity leaves no room for the internal help binding"
            }
        };
        f.write_str(msg)
    }
}
