//! Hosted demo: drives a [`ucli::Engine`] over the process's own stdin/stdout,
//! the way a target board would drive it over a UART.

use std::io::{Read, Write};

use ucli::{Binding, ConstructionError, Engine, EngineConfig, OutputSink};
use ucli_logger::log_info;

/// Raw-mode terminal guard: disables line buffering and local echo so the
/// engine's own line editor is the only thing drawing to the screen.
struct RawMode {
    #[cfg(unix)]
    original: termios::Termios,
    #[cfg(windows)]
    original_mode: u32,
}

impl RawMode {
    #[cfg(unix)]
    fn new() -> Self {
        use termios::*;
        let original = Termios::from_fd(0).expect("read terminal attributes");
        let mut raw = original;
        raw.c_lflag &= !(ICANON | ECHO);
        tcsetattr(0, TCSANOW, &raw).expect("set raw terminal attributes");
        RawMode { original }
    }

    #[cfg(windows)]
    fn new() -> Self {
        use winapi::um::{
            consoleapi::{GetConsoleMode, SetConsoleMode},
            handleapi::INVALID_HANDLE_VALUE,
            processenv::GetStdHandle,
            winbase::STD_INPUT_HANDLE,
            wincon::{ENABLE_ECHO_INPUT, ENABLE_LINE_INPUT},
        };
        unsafe {
            let handle = GetStdHandle(STD_INPUT_HANDLE);
            assert!(handle != INVALID_HANDLE_VALUE);
            let mut mode = 0;
            assert!(GetConsoleMode(handle, &mut mode) != 0);
            let original_mode = mode;
            mode &= !(ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT);
            assert!(SetConsoleMode(handle, mode) != 0);
            RawMode { original_mode }
        }
    }
}

impl Drop for RawMode {
    #[cfg(unix)]
    fn drop(&mut self) {
        use termios::*;
        let _ = tcsetattr(0, TCSANOW, &self.original);
    }

    #[cfg(windows)]
    fn drop(&mut self) {
        use winapi::um::consoleapi::SetConsoleMode;
        use winapi::um::handleapi::INVALID_HANDLE_VALUE;
        use winapi::um::processenv::GetStdHandle;
        use winapi::um::winbase::STD_INPUT_HANDLE;
        unsafe {
            let handle = GetStdHandle(STD_INPUT_HANDLE);
            if handle != INVALID_HANDLE_VALUE {
                SetConsoleMode(handle, self.original_mode);
            }
        }
    }
}

/// Writes straight to stdout, flushing per write so echoed keystrokes show
/// up immediately under raw mode.
struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_char(&mut self, byte: u8) {
        let _ = std::io::stdout().write_all(&[byte]);
        let _ = std::io::stdout().flush();
    }

    fn write_str(&mut self, s: &str) {
        let _ = std::io::stdout().write_all(s.as_bytes());
        let _ = std::io::stdout().flush();
    }
}

fn led_handler(_handle: (), args: Option<&str>, _context: *mut ()) -> u8 {
    match args {
        Some("on") => {
            log_info!("led | ON");
            0
        }
        Some("off") => {
            log_info!("led | OFF");
            0
        }
        _ => 1,
    }
}

fn echo_handler(_handle: (), args: Option<&str>, _context: *mut ()) -> u8 {
    log_info!("echo | {}", args.unwrap_or(""));
    0
}

fn set_handler(_handle: (), args: Option<&str>, _context: *mut ()) -> u8 {
    let tokenized = args.unwrap_or("").as_bytes();
    let name = ucli::get_token(tokenized, 1);
    let value = ucli::get_token(tokenized, 2);
    log_info!("set | {:?} = {:?}", name, value);
    0
}

type DemoEngine = Engine<'static, StdoutSink, (), 64, 128, 256, 4>;

fn build_engine() -> Result<DemoEngine, ConstructionError> {
    let mut engine = Engine::new(StdoutSink, EngineConfig::new("ucli> "))?;

    engine.add_binding(Binding {
        name: "led",
        help: Some("led <on|off> - toggles the demo LED"),
        tokenize_args: false,
        context: std::ptr::null_mut(),
        handler: led_handler,
    });
    engine.add_binding(Binding {
        name: "echo",
        help: Some("echo <text> - prints text back"),
        tokenize_args: false,
        context: std::ptr::null_mut(),
        handler: echo_handler,
    });
    engine.add_binding(Binding {
        name: "set",
        help: Some("set <name> <value> - assigns a demo variable"),
        tokenize_args: true,
        context: std::ptr::null_mut(),
        handler: set_handler,
    });

    Ok(engine)
}

fn main() {
    ucli_logger::init_logger(ucli_logger::LoggerConfig::default());

    let mut engine = build_engine().expect("engine construction");
    let _raw_mode = RawMode::new();

    let stdin = std::io::stdin();
    let mut byte = [0u8; 1];
    let mut handle = stdin.lock();
    loop {
        match handle.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                engine.receive_char(byte[0]);
                engine.process(());
            }
            Err(_) => break,
        }
    }
}
