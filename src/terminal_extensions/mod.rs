use crossterm::tty::IsTty;

pub(crate) mod kitty;

/// Return if the terminal supports the kitty keyboard enhancement protocol
///
/// Read more: <https://sw.kovidgoyal.net/kitty/keyboard-protocol/>
///
/// SIDE EFFECT: Touches the terminal file descriptors and may consume
/// pending input while waiting for the terminal's answer
///
/// The query goes out on stdout, so a redirected stdout always answers `false`
/// without writing anything.
pub fn kitty_protocol_available() -> bool {
    if !std::io::stdout().is_tty() {
        return false;
    }
    crossterm::terminal::supports_keyboard_enhancement().unwrap_or_default()
}
