use std::{fmt, io::Write};

use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    queue, Command,
};
use tracing::debug;

use crate::{EchoError, Result};

/// Bytes written by [`PushKeyboardEnhancementFlags`] with only
/// [`KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES`] set
///
/// Both startup sequences open with `ESC [` (CSI), as the C demo this
/// program reproduces prints them (`"\e[>1u"`, `"\e[=\b10;1u"`).
pub const ENABLE_SEQUENCE: &[u8] = b"\x1b[>1u";

/// Bytes written by [`ActivateEventVisualization`]
///
/// The `0x08` (backspace) after `=` is kept verbatim. A well formed
/// `CSI = flags ; mode u` request would not carry it, so terminals will most
/// likely reject or misread this sequence.
pub const EVENT_VISUALIZATION_SEQUENCE: &[u8] = EVENT_VISUALIZATION.as_bytes();

const EVENT_VISUALIZATION: &str = "\x1b[=\x0810;1u";

/// Bytes written by [`PopKeyboardEnhancementFlags`]
pub const DISABLE_SEQUENCE: &[u8] = b"\x1b[<1u";

/// A [`Command`] that asks the terminal to visualize reported key events
///
/// Writes [`EVENT_VISUALIZATION_SEQUENCE`] as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivateEventVisualization;

impl Command for ActivateEventVisualization {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str(EVENT_VISUALIZATION)
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "event visualization is only available through ANSI sequences",
        ))
    }

    #[cfg(windows)]
    fn is_ansi_code_supported(&self) -> bool {
        true
    }
}

/// Helper managing setup and (optional) teardown of the kitty keyboard enhancement protocol
///
/// Unlike a drop guard, nothing is written when this goes out of scope: the
/// terminal stays in the enhanced mode unless [`KittyProtocolGuard::exit`] is
/// called with restoration enabled.
///
/// Note that, currently, only the following support this protocol:
/// * [kitty terminal](https://sw.kovidgoyal.net/kitty/)
/// * [foot terminal](https://codeberg.org/dnkl/foot/issues/319)
/// * [WezTerm terminal](https://wezfurlong.org/wezterm/config/lua/config/enable_kitty_keyboard.html)
///
/// Refer to <https://sw.kovidgoyal.net/kitty/keyboard-protocol/> if you're curious.
#[derive(Debug, Default)]
pub struct KittyProtocolGuard {
    restore: bool,
    active: bool,
}

impl KittyProtocolGuard {
    /// Whether [`KittyProtocolGuard::exit`] pops the keyboard flags again
    pub fn set_restore(&mut self, restore: bool) {
        self.restore = restore;
    }

    /// Whether the enabling sequences have been written
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Queue both startup sequences on `out`
    ///
    /// Does nothing if the mode is already active.
    pub fn enter<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if self.active {
            return Ok(());
        }

        queue!(
            out,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .map_err(|err| EchoError::mode_sequence("keyboard enhancement", err))?;
        queue!(out, ActivateEventVisualization)
            .map_err(|err| EchoError::mode_sequence("event visualization", err))?;

        self.active = true;
        debug!(restore = self.restore, "kitty keyboard protocol requested");
        Ok(())
    }

    /// Queue the pop sequence on `out` if restoration was requested
    pub fn exit<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if self.active && self.restore {
            queue!(out, PopKeyboardEnhancementFlags)
                .map_err(|err| EchoError::mode_sequence("keyboard restore", err))?;
            self.active = false;
            debug!("kitty keyboard flags popped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;

    fn startup_bytes() -> Vec<u8> {
        [ENABLE_SEQUENCE, EVENT_VISUALIZATION_SEQUENCE].concat()
    }

    #[test]
    fn enter_writes_both_sequences_in_order() {
        let mut out = Vec::new();
        let mut guard = KittyProtocolGuard::default();

        guard.enter(&mut out).unwrap();

        assert_eq!(out, startup_bytes());
        assert!(guard.is_active());
    }

    #[test]
    fn visualization_sequence_keeps_the_backspace() {
        assert_eq!(
            EVENT_VISUALIZATION_SEQUENCE,
            &[0x1b, b'[', b'=', 0x08, b'1', b'0', b';', b'1', b'u']
        );
        let mut ansi = String::new();
        ActivateEventVisualization.write_ansi(&mut ansi).unwrap();
        assert_eq!(ansi.as_bytes(), EVENT_VISUALIZATION_SEQUENCE);
    }

    #[test]
    fn startup_sequences_open_with_csi() {
        assert_eq!(ENABLE_SEQUENCE, &[0x1b, b'[', b'>', b'1', b'u']);
        assert!(EVENT_VISUALIZATION_SEQUENCE.starts_with(b"\x1b["));
    }

    #[test]
    fn enter_is_a_noop_when_already_active() {
        let mut out = Vec::new();
        let mut guard = KittyProtocolGuard::default();

        guard.enter(&mut out).unwrap();
        guard.enter(&mut out).unwrap();

        assert_eq!(out, startup_bytes());
    }

    #[test]
    fn exit_without_restore_leaves_mode_alone() {
        let mut out = Vec::new();
        let mut guard = KittyProtocolGuard::default();

        guard.enter(&mut out).unwrap();
        guard.exit(&mut out).unwrap();

        assert_eq!(out, startup_bytes());
        assert!(guard.is_active());
    }

    #[test]
    fn exit_with_restore_pops_flags_once() {
        let mut out = Vec::new();
        let mut guard = KittyProtocolGuard::default();
        guard.set_restore(true);

        guard.enter(&mut out).unwrap();
        guard.exit(&mut out).unwrap();
        guard.exit(&mut out).unwrap();

        assert_eq!(out, [startup_bytes().as_slice(), DISABLE_SEQUENCE].concat());
        assert!(!guard.is_active());
    }

    #[test]
    fn exit_before_enter_writes_nothing() {
        let mut out = Vec::new();
        let mut guard = KittyProtocolGuard::default();
        guard.set_restore(true);

        guard.exit(&mut out).unwrap();

        assert!(out.is_empty());
    }

    struct ClosedPipe;

    impl io::Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn enter_reports_the_failing_sequence() {
        let mut guard = KittyProtocolGuard::default();

        let err = guard.enter(&mut ClosedPipe).unwrap_err();

        assert!(err.is_broken_pipe());
        assert!(err.to_string().contains("keyboard enhancement"));
        assert!(!guard.is_active());
    }
}
