//! C9: lifecycle and arena layout, expressed as a by-value aggregate whose
//! sub-components are all const-generic-sized fields (§9, "a construction-
//! time aggregate that owns all subcomponents by value").

use crate::binding::BindingTable;
use crate::config::EngineConfig;
use crate::error::ConstructionError;
use crate::history::History;
use crate::output::OutputSink;
use crate::ring::RingBuffer;

/// Named lifecycle/editor flags, replacing the source's packed bitfield
/// (§9, "Flag word on the engine"). These are all main-context-only state —
/// see [`Engine::overflow`] for the one flag that must be reachable from the
/// ingest side too.
#[derive(Default)]
pub(crate) struct Flags {
    pub init_done: bool,
    pub in_escape_mode: bool,
    pub in_direct_print: bool,
}

/// The terminal-emulation and dispatch engine.
///
/// Capacities are const generics rather than runtime fields:
/// - `RXN`: ring buffer (C1) capacity.
/// - `CMDN`: command buffer capacity; must be >= 2.
/// - `HTC`: history arena (C2) capacity; 0 disables history.
/// - `BINDCAP`: *total* binding table capacity, including the internal
///   `help` binding installed at index 0 — i.e. `BINDCAP = max_user_bindings + 1`.
///
/// `H` is the opaque handle type forwarded to handlers and to the
/// `post_command` hook; `W` is the host's [`OutputSink`].
pub struct Engine<'a, W, H, const RXN: usize, const CMDN: usize, const HTC: usize, const BINDCAP: usize>
where
    W: OutputSink,
    H: Copy,
{
    pub(crate) invitation: &'a str,
    pub(crate) output: W,
    pub(crate) ring: RingBuffer<RXN>,
    pub(crate) cmd_buf: [u8; CMDN],
    pub(crate) cmd_size: usize,
    pub(crate) bindings: BindingTable<H, BINDCAP>,
    pub(crate) history: History<HTC>,
    pub(crate) input_line_length: usize,
    pub(crate) last_byte: u8,
    pub(crate) flags: Flags,
    /// Set by [`Engine::receive_char`] (possibly from interrupt context) when
    /// the ring buffer is full; consumed and cleared by `process` on the
    /// main context. An `AtomicBool` rather than a plain field of [`Flags`]
    /// because it is the one piece of engine state touched from both sides
    /// of the producer/consumer split (§5, "Cross-context safety").
    pub(crate) overflow: core::sync::atomic::AtomicBool,
    pub(crate) enable_auto_complete: bool,
    pub(crate) on_command: Option<fn(handle: H, name: &str, args: Option<&str>) -> u8>,
    pub(crate) post_command: Option<fn(handle: H, result_code: u8)>,
}

fn help_handler<H: Copy>(_handle: H, _args: Option<&str>, _context: *mut ()) -> u8 {
    // Replaced at dispatch time: `help` is recognized by name before the
    // binding-table handler is ever invoked (§9, Design Note (c):
    // "give internal handlers a distinguished signature"). This stub only
    // occupies the slot so the table's capacity accounting and iteration
    // (autocompletion, `help` with no args) see a real entry.
    0
}

impl<'a, W, H, const RXN: usize, const CMDN: usize, const HTC: usize, const BINDCAP: usize>
    Engine<'a, W, H, RXN, CMDN, HTC, BINDCAP>
where
    W: OutputSink,
    H: Copy,
{
    pub fn new(output: W, config: EngineConfig<'a>) -> Result<Self, ConstructionError> {
        if CMDN < 2 {
            return Err(ConstructionError::CommandBufferTooSmall);
        }
        if HTC != 0 && HTC < 2 {
            return Err(ConstructionError::HistoryBufferTooSmall);
        }
        if BINDCAP == 0 {
            return Err(ConstructionError::BindingCapacityIsZero);
        }

        let mut bindings = BindingTable::new();
        bindings.add(crate::binding::Binding {
            name: "help",
            help: Some("list available commands, or describe one"),
            tokenize_args: false,
            context: core::ptr::null_mut(),
            handler: help_handler::<H>,
        });

        Ok(Self {
            invitation: config.invitation,
            output,
            ring: RingBuffer::new(),
            cmd_buf: [0; CMDN],
            cmd_size: 0,
            bindings,
            history: History::new(),
            input_line_length: 0,
            last_byte: 0,
            flags: Flags::default(),
            overflow: core::sync::atomic::AtomicBool::new(false),
            enable_auto_complete: config.enable_auto_complete,
            on_command: None,
            post_command: None,
        })
    }

    pub fn set_on_command(
        &mut self,
        hook: fn(handle: H, name: &str, args: Option<&str>) -> u8,
    ) {
        self.on_command = Some(hook);
    }

    pub fn set_post_command(&mut self, hook: fn(handle: H, result_code: u8)) {
        self.post_command = Some(hook);
    }

    /// Registers a user command. Returns `false` when the table is full.
    pub fn add_binding(&mut self, binding: crate::binding::Binding<H>) -> bool {
        self.bindings.add(binding)
    }

    pub fn overflow_occurred(&self) -> bool {
        self.overflow.load(core::sync::atomic::Ordering::Relaxed)
    }

    /// Ingests one byte, typically called from the transport's receive
    /// interrupt. Safe to call concurrently with `process` on another
    /// context: it only touches the ring buffer (C1) and the atomic
    /// overflow flag (§5).
    pub fn receive_char(&self, byte: u8) {
        if !self.ring.push(byte) {
            self.overflow
                .store(true, core::sync::atomic::Ordering::Relaxed);
        }
    }

    pub fn command_buffer(&self) -> &str {
        core::str::from_utf8(&self.cmd_buf[..self.cmd_size]).unwrap_or("")
    }

    pub fn history(&self) -> &History<HTC> {
        &self.history
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }
}

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
impl<'a, W, H, const RXN: usize, const CMDN: usize, const HTC: usize, const BINDCAP: usize>
    Engine<'a, W, H, RXN, CMDN, HTC, BINDCAP>
where
    W: OutputSink,
    H: Copy,
{
    /// Same construction as [`Engine::new`], but the (large) aggregate is
    /// placed behind a single heap allocation rather than on the stack —
    /// the "single heap allocation" alternative from §6/§9.
    pub fn boxed_new(
        output: W,
        config: EngineConfig<'a>,
    ) -> Result<alloc::boxed::Box<Self>, ConstructionError> {
        Self::new(output, config).map(alloc::boxed::Box::new)
    }
}
