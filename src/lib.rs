//! # kitty-echo
//! The smallest possible kitty keyboard protocol demo
//!
//! Requests the [kitty keyboard protocol](https://sw.kovidgoyal.net/kitty/keyboard-protocol/)
//! from the attached terminal, then echoes every input byte back until `q`
//! is typed or input ends. The key event sequences the terminal starts
//! sending are not decoded, they are echoed like any other byte.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kitty_echo::EchoLoop;
//! use std::io;
//!
//! let summary = EchoLoop::new()
//!     .run(io::stdin().lock(), io::stdout().lock())
//!     .unwrap();
//! eprintln!("stopped: {}", summary.termination);
//! ```
//!
//! By default the terminal is left in the enhanced mode once the loop ends.
//! Use [`EchoLoop::with_restore_on_exit`] to pop the keyboard flags again.

mod result;
pub use result::{EchoError, EchoErrorVariants, Result};

mod echo;
pub use echo::{EchoLoop, EchoSummary, Termination, QUIT_BYTE};

mod terminal_extensions;
pub use terminal_extensions::kitty::{
    ActivateEventVisualization, KittyProtocolGuard, DISABLE_SEQUENCE, ENABLE_SEQUENCE,
    EVENT_VISUALIZATION_SEQUENCE,
};
pub use terminal_extensions::kitty_protocol_available;
