//! C6 (line editor) and C8 (output interleaving), plus the `process` drive
//! loop that ties C1's ring buffer to the rest of the state machine.

use crate::engine::Engine;
use crate::output::{clear_line, erase_one_glyph, write_line_break, OutputSink};

const ESC: u8 = 0x1B;

impl<'a, W, H, const RXN: usize, const CMDN: usize, const HTC: usize, const BINDCAP: usize>
    Engine<'a, W, H, RXN, CMDN, HTC, BINDCAP>
where
    W: OutputSink,
    H: Copy,
{
    /// Drains C1 and advances the editor/dispatcher for every queued byte.
    /// The very first call emits the invitation before consuming anything
    /// (§4.6, "Initialization policy").
    pub fn process(&mut self, handle: H) {
        if !self.flags.init_done {
            self.flags.init_done = true;
            let invitation = self.invitation;
            self.output.write_str(invitation);
        }

        while !self.ring.is_empty() {
            let byte = self.ring.pop();
            self.step_byte(byte, handle);
        }

        if self.overflow.swap(false, core::sync::atomic::Ordering::AcqRel) {
            self.cmd_size = 0;
            self.cmd_buf[0] = 0;
        }
    }

    fn step_byte(&mut self, byte: u8, handle: H) {
        let prev = self.last_byte;
        let mut consumed_as_escape = false;

        if self.flags.in_escape_mode {
            if (0x40..=0x7E).contains(&byte) {
                self.flags.in_escape_mode = false;
                match byte {
                    b'A' => self.navigate(true),
                    b'B' => self.navigate(false),
                    _ => {}
                }
            }
            consumed_as_escape = true;
        } else if byte == ESC {
            consumed_as_escape = true;
        } else if byte == b'[' && prev == ESC {
            self.flags.in_escape_mode = true;
            consumed_as_escape = true;
        }

        if !consumed_as_escape {
            match byte {
                b'\r' | b'\n' => self.handle_newline(byte, prev, handle),
                0x08 | 0x7F => self.handle_backspace(),
                0x09 => self.on_autocomplete_request(),
                0x20..=0x7E => self.handle_displayable(byte),
                _ => {}
            }
        }

        self.last_byte = byte;
        if self.enable_auto_complete {
            self.print_live_autocompletion();
        }
    }

    fn handle_newline(&mut self, byte: u8, prev: u8, handle: H) {
        let collapses_pair = (byte == b'\n' && prev == b'\r') || (byte == b'\r' && prev == b'\n');
        if collapses_pair {
            return;
        }

        self.on_autocomplete_request();
        write_line_break(&mut self.output);

        if self.cmd_size > 0 {
            self.dispatch_line(handle);
        }

        self.cmd_size = 0;
        self.cmd_buf[0] = 0;
        self.history.set_current(0);
        self.input_line_length = 0;
        let invitation = self.invitation;
        self.output.write_str(invitation);
    }

    fn handle_backspace(&mut self) {
        if self.cmd_size > 0 {
            erase_one_glyph(&mut self.output);
            self.cmd_size -= 1;
            self.cmd_buf[self.cmd_size] = 0;
        }
    }

    fn handle_displayable(&mut self, byte: u8) {
        if self.cmd_size + 2 < self.cmd_buf.len() {
            self.cmd_buf[self.cmd_size] = byte;
            self.cmd_size += 1;
            self.cmd_buf[self.cmd_size] = 0;
            self.output.write_char(byte);
        }
    }

    /// Recomputes autocompletion after every consumed byte and repaints the
    /// live suffix, erasing a now-too-long stale suffix when needed (§4.6).
    fn print_live_autocompletion(&mut self) {
        let prefix = core::str::from_utf8(&self.cmd_buf[..self.cmd_size]).unwrap_or("");
        let result = crate::autocomplete::compute(&mut self.bindings, prefix);

        let new_len = if result.candidate_count == 1 {
            let name = result.first_candidate.unwrap_or("");
            let suffix = &name[self.cmd_size.min(name.len())..];
            self.output.write_str(suffix);
            result.autocompleted_len as usize
        } else {
            self.cmd_size
        };

        if self.input_line_length > new_len {
            let stale = self.input_line_length - new_len;
            for _ in 0..stale {
                self.output.write_char(b' ');
            }
            self.output.write_char(b'\r');
            let invitation = self.invitation;
            self.output.write_str(invitation);
            let cmd = core::str::from_utf8(&self.cmd_buf[..self.cmd_size]).unwrap_or("");
            self.output.write_str(cmd);
        }

        self.input_line_length = new_len.max(self.cmd_size);
    }

    /// Tab-triggered (and enter-triggered "snap") autocompletion (§4.6).
    fn on_autocomplete_request(&mut self) {
        let prefix = core::str::from_utf8(&self.cmd_buf[..self.cmd_size]).unwrap_or("");
        let result = crate::autocomplete::compute(&mut self.bindings, prefix);

        if result.candidate_count == 0 {
            return;
        }

        let extends = result.candidate_count == 1 || (result.autocompleted_len as usize) > self.cmd_size;
        if extends {
            let mut new_len = result.autocompleted_len as usize;
            if let Some(name) = result.first_candidate {
                let bytes = name.as_bytes();
                for i in self.cmd_size..new_len.min(bytes.len()) {
                    self.cmd_buf[i] = bytes[i];
                }
            }
            if result.candidate_count == 1 {
                self.cmd_buf[new_len] = b' ';
                new_len += 1;
            }
            self.cmd_buf[new_len] = 0;

            let echoed = core::str::from_utf8(&self.cmd_buf[self.cmd_size..new_len]).unwrap_or("");
            self.output.write_str(echoed);
            self.cmd_size = new_len;
            self.input_line_length = new_len;
            return;
        }

        // Ambiguous and nothing new to extend: list every candidate, then
        // repaint the prompt and buffer.
        clear_line(&mut self.output, self.invitation.len() + self.input_line_length);
        write_line_break(&mut self.output);
        for (index, binding) in self.bindings.iter().enumerate() {
            if self.bindings.is_candidate(index) {
                self.output.write_str(binding.name);
                write_line_break(&mut self.output);
            }
        }
        let invitation = self.invitation;
        self.output.write_str(invitation);
        let cmd = core::str::from_utf8(&self.cmd_buf[..self.cmd_size]).unwrap_or("");
        self.output.write_str(cmd);
        self.input_line_length = self.cmd_size;
    }

    /// History navigation triggered by `ESC [ A` (up) / `ESC [ B` (down).
    fn navigate(&mut self, up: bool) {
        let items_count = self.history.items_count();
        let current = self.history.current();
        if items_count == 0 || (up && current == items_count) || (!up && current == 0) {
            return;
        }

        clear_line(&mut self.output, self.invitation.len() + self.input_line_length);
        let invitation = self.invitation;
        self.output.write_str(invitation);

        let new_current = if up { current + 1 } else { current - 1 };
        self.history.set_current(new_current);
        let text = self.history.get(new_current).unwrap_or("");
        let len = text.len().min(self.cmd_buf.len().saturating_sub(2));
        self.cmd_buf[..len].copy_from_slice(&text.as_bytes()[..len]);
        self.cmd_buf[len] = 0;
        self.cmd_size = len;

        let cmd = core::str::from_utf8(&self.cmd_buf[..len]).unwrap_or("");
        self.output.write_str(cmd);
        self.input_line_length = len;
        self.print_live_autocompletion();
    }

    /// C8: interleave an asynchronous message without corrupting the
    /// in-progress input line.
    pub fn print(&mut self, s: &str) {
        if self.flags.in_direct_print {
            self.output.write_str(s);
            write_line_break(&mut self.output);
            return;
        }

        clear_line(&mut self.output, self.invitation.len() + self.input_line_length);
        self.output.write_str(s);
        write_line_break(&mut self.output);

        let invitation = self.invitation;
        self.output.write_str(invitation);
        let cmd = core::str::from_utf8(&self.cmd_buf[..self.cmd_size]).unwrap_or("");
        self.output.write_str(cmd);
        self.input_line_length = self.cmd_size;
        self.print_live_autocompletion();
    }
}

#[cfg(test)]
mod tests {
    use crate::binding::Binding;
    use crate::config::EngineConfig;
    use crate::output::test_support::RecordingSink;
    use crate::Engine;

    fn new_engine() -> Engine<'static, RecordingSink<512>, (), 16, 32, 64, 4> {
        Engine::new(RecordingSink::new(), EngineConfig::new("> ")).unwrap()
    }

    fn noop(_h: (), _args: Option<&str>, _ctx: *mut ()) -> u8 {
        0
    }

    fn feed(engine: &mut Engine<'static, RecordingSink<512>, (), 16, 32, 64, 4>, s: &str) {
        for byte in s.bytes() {
            engine.receive_char(byte);
        }
        engine.process(());
    }

    #[test]
    fn first_process_emits_invitation() {
        let mut engine = new_engine();
        engine.process(());
        assert_eq!(engine.output_mut().as_str(), "> ");
    }

    #[test]
    fn typing_echoes_bytes() {
        let mut engine = new_engine();
        feed(&mut engine, "ab");
        assert_eq!(engine.command_buffer(), "ab");
        assert!(engine.output_mut().as_str().ends_with("ab"));
    }

    #[test]
    fn backspace_on_empty_buffer_is_noop() {
        let mut engine = new_engine();
        feed(&mut engine, "\x08");
        assert_eq!(engine.command_buffer(), "");
    }

    #[test]
    fn backspace_removes_last_char() {
        let mut engine = new_engine();
        feed(&mut engine, "ab\x08");
        assert_eq!(engine.command_buffer(), "a");
    }

    #[test]
    fn crlf_pair_submits_single_command() {
        let mut engine = new_engine();
        engine.add_binding(Binding {
            name: "set",
            help: None,
            tokenize_args: false,
            context: core::ptr::null_mut(),
            handler: noop,
        });
        feed(&mut engine, "set\r\n");
        assert_eq!(engine.command_buffer(), "");
        assert_eq!(engine.history().items_count(), 1);
    }

    #[test]
    fn overflow_discards_buffer_after_process() {
        let mut engine = new_engine();
        for byte in core::iter::repeat(b'a').take(20) {
            engine.receive_char(byte);
        }
        engine.process(());
        assert!(engine.overflow_occurred() == false); // cleared by process
        assert_eq!(engine.command_buffer(), "");
    }

    #[test]
    fn tab_autocompletes_unique_candidate_with_trailing_space() {
        let mut engine = new_engine();
        engine.add_binding(Binding {
            name: "get-led",
            help: None,
            tokenize_args: false,
            context: core::ptr::null_mut(),
            handler: noop,
        });
        feed(&mut engine, "get-l\t");
        assert_eq!(engine.command_buffer(), "get-led ");
    }

    #[test]
    fn all_space_submission_does_not_grow_history() {
        let mut engine = new_engine();
        feed(&mut engine, "   \r");
        assert_eq!(engine.history().items_count(), 0);
    }

    #[test]
    fn tab_lists_every_candidate_when_prefix_cannot_extend() {
        let mut engine = new_engine();
        engine.add_binding(Binding {
            name: "get-led",
            help: None,
            tokenize_args: false,
            context: core::ptr::null_mut(),
            handler: noop,
        });
        engine.add_binding(Binding {
            name: "get-adc",
            help: None,
            tokenize_args: false,
            context: core::ptr::null_mut(),
            handler: noop,
        });
        // "get-" is already the longest common prefix of both candidates, so
        // there is nothing left to extend; Tab should list both names.
        feed(&mut engine, "get-\t");
        let out = engine.output_mut().as_str();
        assert!(out.contains("get-led"));
        assert!(out.contains("get-adc"));
        assert_eq!(engine.command_buffer(), "get-");
    }
}
