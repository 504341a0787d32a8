#![no_std]

pub const DEFAULT_INVITATION: &str = "> ";
pub const DEFAULT_RX_BUFFER_SIZE: usize = 64;
pub const DEFAULT_CMD_BUFFER_SIZE: usize = 64;
pub const DEFAULT_HISTORY_BUFFER_SIZE: usize = 128;
pub const DEFAULT_MAX_BINDING_COUNT: usize = 8;
pub const INTERNAL_BINDING_COUNT: usize = 1; // the built-in `help` binding
pub const MAX_HEXSTR_LEN: usize = 64;
pub const ERROR_BUFFER_SIZE: usize = 32;

/// Byte count needed for a caller-supplied arena sized for the given capacities.
///
/// Mirrors the sizing function mandated by the spec's external-interfaces
/// section: a pure function of the construction configuration, honoring the
/// alignment of the widest field (`usize`) the way the arena carve-up would.
pub const fn required_size(
    rx_buffer_size: usize,
    cmd_buffer_size: usize,
    history_buffer_size: usize,
    max_binding_count: usize,
) -> usize {
    const ALIGN: usize = core::mem::align_of::<usize>();
    let raw = rx_buffer_size
        + cmd_buffer_size
        + history_buffer_size
        + (max_binding_count + INTERNAL_BINDING_COUNT) * core::mem::size_of::<usize>();
    (raw + ALIGN - 1) / ALIGN * ALIGN
}
