use std::io::{Read, Write};

use strum::Display;
use tracing::debug;

use crate::{terminal_extensions::kitty::KittyProtocolGuard, Result};

/// Input byte that ends the loop without being echoed
pub const QUIT_BYTE: u8 = b'q';

/// Why [`EchoLoop::run`] stopped reading
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum Termination {
    /// [`QUIT_BYTE`] was read
    Quit,
    /// The input stream closed, or failed to deliver another byte
    EndOfInput,
}

/// Outcome of one [`EchoLoop::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoSummary {
    /// Why the loop stopped
    pub termination: Termination,
    /// Number of bytes written back after the startup sequences
    pub echoed: usize,
}

/// Switches the terminal into the kitty keyboard protocol, then copies input
/// to output one byte at a time until [`QUIT_BYTE`] or end of input.
///
/// ```rust
/// use kitty_echo::{EchoLoop, Termination};
///
/// let mut output = Vec::new();
/// let summary = EchoLoop::new().run(&b"hiqx"[..], &mut output).unwrap();
///
/// assert_eq!(summary.termination, Termination::Quit);
/// assert!(output.ends_with(b"hi"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct EchoLoop {
    restore_on_exit: bool,
}

impl EchoLoop {
    /// Loop that leaves the terminal in the enhanced keyboard mode on exit
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the keyboard enhancement flags again once the loop ends
    #[must_use]
    pub fn with_restore_on_exit(mut self, restore: bool) -> Self {
        self.restore_on_exit = restore;
        self
    }

    /// Whether the pop sequence is written when the loop ends
    pub fn restore_on_exit(&self) -> bool {
        self.restore_on_exit
    }

    /// Run the loop to completion
    ///
    /// `input` is read one byte per call, so pass something buffered (such as
    /// a locked stdin) when reading from a real stream. Read failures end the
    /// loop like end of input does; write failures are returned.
    pub fn run<R: Read, W: Write>(&self, input: R, mut output: W) -> Result<EchoSummary> {
        let mut mode = KittyProtocolGuard::default();
        mode.set_restore(self.restore_on_exit);
        mode.enter(&mut output)?;

        let mut echoed = 0;
        let mut termination = Termination::EndOfInput;
        for byte in input.bytes() {
            let byte = match byte {
                Ok(byte) => byte,
                Err(err) => {
                    debug!(%err, "input failed, treating as end of input");
                    break;
                }
            };
            if byte == QUIT_BYTE {
                termination = Termination::Quit;
                break;
            }
            output.write_all(&[byte])?;
            echoed += 1;
        }

        mode.exit(&mut output)?;
        output.flush()?;

        debug!(%termination, echoed, "echo loop finished");
        Ok(EchoSummary {
            termination,
            echoed,
        })
    }
}
