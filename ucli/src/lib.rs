#![no_std]
//! Terminal-emulation and command-dispatch engine for byte-oriented duplex
//! transports (e.g. a UART): line editing with live echo, autocompletion,
//! history, an in-place tokenizer, and a command dispatcher, all built on
//! statically-sized storage so the engine never allocates after
//! construction (unless built via [`Engine::boxed_new`] behind the `alloc`
//! feature).

mod autocomplete;
mod binding;
mod dispatcher;
mod editor;
mod engine;
mod history;
mod output;
mod ring;
mod tokenizer;

pub mod config;
pub mod error;

pub use autocomplete::AutocompleteResult;
pub use binding::{Binding, BindingTable};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::ConstructionError;
pub use history::History;
pub use output::OutputSink;
pub use ring::RingBuffer;
pub use tokenizer::{count_tokens, find_token, get_token, tokenize_args};
