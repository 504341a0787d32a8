//! C7: splits a finalized command line into name + args, looks up C4,
//! invokes the handler, and routes the unmatched-command fallback.

use core::fmt::Write;

use crate::engine::Engine;
use crate::output::{write_line_break, OutputSink};

/// Writes into a fixed-capacity byte slice, truncating silently past
/// capacity. Used only to format the unknown-command message without an
/// allocator.
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> Write for SliceWriter<'a> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buf.len() - self.len;
        let n = bytes.len().min(remaining);
        self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        Ok(())
    }
}

impl<'a, W, H, const RXN: usize, const CMDN: usize, const HTC: usize, const BINDCAP: usize>
    Engine<'a, W, H, RXN, CMDN, HTC, BINDCAP>
where
    W: OutputSink,
    H: Copy,
{
    /// Submits the current command buffer in REPL mode: inserted into
    /// history, with the unmatched-command fallback active.
    pub(crate) fn dispatch_line(&mut self, handle: H) {
        self.dispatch_core(handle, true);
    }

    /// Programmatic submission (§6, `parse-direct-command`): skips history
    /// insertion and the fallback path. Returns the handler's result code,
    /// or `-1` when nothing matched — the distinguished code called for by
    /// the direct-mode open question in the design notes, since the silent
    /// `1` the source returns would be indistinguishable from a handler
    /// that legitimately reports failure.
    pub fn parse_direct_command(&mut self, bytes: &[u8], handle: H) -> i32 {
        let capacity = self.cmd_buf.len().saturating_sub(2);
        let len = bytes.len().min(capacity);
        self.cmd_buf[..len].copy_from_slice(&bytes[..len]);
        self.cmd_buf[len] = 0;
        self.cmd_size = len;
        self.dispatch_core(handle, false)
    }

    fn dispatch_core(&mut self, handle: H, repl: bool) -> i32 {
        let len = self.cmd_size;
        let full = core::str::from_utf8(&self.cmd_buf[..len]).unwrap_or("");
        if full.trim().is_empty() {
            return 0;
        }

        if repl {
            self.history.put(full);
        }

        let mut split_at = len;
        for i in 0..len {
            if self.cmd_buf[i] == b' ' {
                split_at = i;
                break;
            }
        }
        self.cmd_buf[split_at] = 0;
        let name = core::str::from_utf8(&self.cmd_buf[..split_at]).unwrap_or("");

        let mut args_start = split_at + 1;
        while args_start < len && self.cmd_buf[args_start] == b' ' {
            args_start += 1;
        }
        if len + 1 < self.cmd_buf.len() {
            self.cmd_buf[len + 1] = 0;
        }
        let has_args = args_start < len;

        if name == "help" {
            let args = if has_args {
                core::str::from_utf8(&self.cmd_buf[args_start..len]).ok()
            } else {
                None
            };
            let was_already_direct = self.flags.in_direct_print;
            self.flags.in_direct_print = true;
            let result = self.dispatch_help(args);
            if !was_already_direct {
                self.flags.in_direct_print = false;
            }
            if let Some(hook) = self.post_command {
                hook(handle, result);
            }
            return result as i32;
        }

        if let Some(binding) = self.bindings.find(name).copied() {
            let args: Option<&str> = if has_args {
                if binding.tokenize_args {
                    let args_len = len - args_start;
                    let tokenized_len =
                        crate::tokenizer::tokenize_args(&mut self.cmd_buf[args_start..], args_len);
                    core::str::from_utf8(&self.cmd_buf[args_start..args_start + tokenized_len + 2])
                        .ok()
                } else {
                    core::str::from_utf8(&self.cmd_buf[args_start..len]).ok()
                }
            } else {
                None
            };

            let was_already_direct = self.flags.in_direct_print;
            self.flags.in_direct_print = true;
            let result = (binding.handler)(handle, args, binding.context);
            if !was_already_direct {
                self.flags.in_direct_print = false;
            }
            if let Some(hook) = self.post_command {
                hook(handle, result);
            }
            return result as i32;
        }

        if !repl {
            return -1;
        }

        if let Some(on_command) = self.on_command {
            let args = if has_args {
                core::str::from_utf8(&self.cmd_buf[args_start..len]).ok()
            } else {
                None
            };
            let was_already_direct = self.flags.in_direct_print;
            self.flags.in_direct_print = true;
            on_command(handle, name, args);
            if !was_already_direct {
                self.flags.in_direct_print = false;
            }
            0
        } else {
            self.emit_unknown_command(name);
            if let Some(hook) = self.post_command {
                hook(handle, 1);
            }
            1
        }
    }

    /// Internal `help` (§4.9). Kept out of the generic binding-handler path
    /// entirely — the table's `help` entry exists only so autocompletion and
    /// capacity accounting see it — rather than recovering the engine from a
    /// handler argument by a pointer cast (§9, "give internal handlers a
    /// distinguished signature").
    fn dispatch_help(&mut self, args: Option<&str>) -> u8 {
        match args {
            None => {
                for binding in self.bindings.iter() {
                    self.output.write_str(" * ");
                    self.output.write_str(binding.name);
                    self.output.write_char(b'\n');
                    if let Some(help) = binding.help {
                        self.output.write_char(b'\t');
                        self.output.write_str(help);
                        self.output.write_char(b'\n');
                    }
                }
                0
            }
            Some(arg) => {
                let mut words = arg.split_whitespace();
                match (words.next(), words.next()) {
                    (None, _) => 0,
                    (Some(name), None) => {
                        if let Some(binding) = self.bindings.find(name) {
                            match binding.help {
                                Some(help) => {
                                    self.output.write_str(help);
                                    write_line_break(&mut self.output);
                                    0
                                }
                                None => {
                                    self.output.write_str("Help is not available");
                                    write_line_break(&mut self.output);
                                    1
                                }
                            }
                        } else {
                            self.emit_unknown_command(name);
                            1
                        }
                    }
                    _ => {
                        self.output
                            .write_str("Command \"help\" receives one or zero arguments");
                        write_line_break(&mut self.output);
                        0
                    }
                }
            }
        }
    }

    fn emit_unknown_command(&mut self, name: &str) {
        let mut buf = [0u8; 96];
        let written = {
            let mut writer = SliceWriter { buf: &mut buf, len: 0 };
            let _ = write!(
                writer,
                "Unknown command: \"{}\". Write \"help\" for a list of available commands",
                name
            );
            writer.len
        };
        self.output.write_str(core::str::from_utf8(&buf[..written]).unwrap_or(""));
        write_line_break(&mut self.output);
    }
}

#[cfg(test)]
mod tests {
    use crate::binding::Binding;
    use crate::config::EngineConfig;
    use crate::output::test_support::RecordingSink;
    use crate::Engine;

    type TestEngine = Engine<'static, RecordingSink<1024>, (), 16, 64, 64, 4>;

    fn new_engine() -> TestEngine {
        Engine::new(RecordingSink::new(), EngineConfig::new("> ")).unwrap()
    }

    fn noop(_h: (), _args: Option<&str>, _ctx: *mut ()) -> u8 {
        0
    }

    /// Captures the tokenized args by copying bytes into the buffer pointed
    /// at by `context`, sidestepping the lifetime `context`'s type erasure
    /// would otherwise hide from the handler signature.
    fn args_capture(_h: (), args: Option<&str>, ctx: *mut ()) -> u8 {
        let slot = ctx as *mut [u8; 32];
        let bytes = args.unwrap_or("").as_bytes();
        let n = bytes.len().min(32);
        // SAFETY: test-only; `ctx` always points at a live `[u8; 32]` local
        // for the duration of the call.
        unsafe {
            (*slot)[..n].copy_from_slice(&bytes[..n]);
        }
        0
    }

    #[test]
    fn unknown_command_emits_message_and_post_command() {
        let mut engine = new_engine();
        static mut LAST_CODE: Option<u8> = None;
        engine.set_post_command(|_h, code| unsafe { LAST_CODE = Some(code) });
        let result = engine.parse_direct_command(b"nope", ());
        assert_eq!(result, 1);
        assert!(engine.output_mut().as_str().contains("Unknown command: \"nope\""));
    }

    #[test]
    fn direct_mode_unmatched_returns_distinguished_code() {
        let mut engine = new_engine();
        let result = engine.parse_direct_command(b"nope", ());
        assert_eq!(result, -1);
    }

    #[test]
    fn matched_binding_runs_handler_and_returns_code() {
        let mut engine = new_engine();
        engine.add_binding(Binding {
            name: "set",
            help: None,
            tokenize_args: false,
            context: core::ptr::null_mut(),
            handler: noop,
        });
        let result = engine.parse_direct_command(b"set foo", ());
        assert_eq!(result, 0);
    }

    #[test]
    fn tokenized_args_split_into_tokens() {
        let mut captured = [0u8; 32];
        let mut engine = new_engine();
        engine.add_binding(Binding {
            name: "set",
            help: None,
            tokenize_args: true,
            context: (&mut captured) as *mut [u8; 32] as *mut (),
            handler: args_capture,
        });
        engine.parse_direct_command(b"set foo bar", ());
        assert_eq!(crate::tokenizer::get_token(&captured, 1), Some(&b"foo"[..]));
        assert_eq!(crate::tokenizer::get_token(&captured, 2), Some(&b"bar"[..]));
        assert_eq!(crate::tokenizer::count_tokens(&captured), 2);
    }

    #[test]
    fn help_with_no_args_lists_every_binding() {
        let mut engine = new_engine();
        engine.add_binding(Binding {
            name: "get-led",
            help: Some("reads the LED state"),
            tokenize_args: false,
            context: core::ptr::null_mut(),
            handler: noop,
        });
        engine.parse_direct_command(b"help", ());
        let out = engine.output_mut().as_str();
        assert!(out.contains(" * help"));
        assert!(out.contains(" * get-led"));
        assert!(out.contains("reads the LED state"));
    }

    #[test]
    fn help_with_unknown_name_reports_unknown() {
        let mut engine = new_engine();
        let result = engine.parse_direct_command(b"help bogus", ());
        assert_eq!(result, 1);
        assert!(engine.output_mut().as_str().contains("Unknown command: \"bogus\""));
    }

    #[test]
    fn help_with_too_many_args_is_rejected() {
        let mut engine = new_engine();
        let result = engine.parse_direct_command(b"help a b", ());
        assert_eq!(result, 0);
        assert!(engine
            .output_mut()
            .as_str()
            .contains("Command \"help\" receives one or zero arguments"));
    }
}
