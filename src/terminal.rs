//! Raw-mode session setup and teardown.
//!
//! Every step of `enter` is recorded as it succeeds, and `restore` undoes exactly those
//! steps. Teardown is attempted even when an earlier teardown step fails.

use std::io::{self, Write};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use tracing::{debug, warn};

pub struct TerminalGuard<W: Write> {
    out: W,
    raw_mode: bool,
    alternate_screen: bool,
    cursor_hidden: bool,
    enhanced_keys: bool,
}

impl<W: Write> TerminalGuard<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            raw_mode: false,
            alternate_screen: false,
            cursor_hidden: false,
            enhanced_keys: false,
        }
    }

    /// Switches to raw mode on the alternate screen with the cursor hidden, and asks for
    /// key release events where the terminal supports them.
    ///
    /// Returns whether key releases will be reported.
    pub fn enter(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        self.raw_mode = true;
        self.out.execute(EnterAlternateScreen)?;
        self.alternate_screen = true;
        self.out.execute(Hide)?;
        self.cursor_hidden = true;

        let reports_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if reports_release {
            self.out.execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
            self.enhanced_keys = true;
        }
        debug!(reports_release, "terminal ready");
        Ok(reports_release)
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// Undoes whatever `enter` managed to set up, in reverse order.
    ///
    /// Returns the first error hit; later steps still run. Calling it again is a no-op.
    pub fn restore(&mut self) -> io::Result<()> {
        let mut first_err = None;
        if std::mem::take(&mut self.enhanced_keys) {
            keep_first(&mut first_err, self.out.execute(PopKeyboardEnhancementFlags).map(drop));
        }
        if std::mem::take(&mut self.cursor_hidden) {
            keep_first(&mut first_err, self.out.execute(Show).map(drop));
        }
        if std::mem::take(&mut self.alternate_screen) {
            keep_first(&mut first_err, self.out.execute(LeaveAlternateScreen).map(drop));
        }
        if std::mem::take(&mut self.raw_mode) {
            keep_first(&mut first_err, terminal::disable_raw_mode());
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!(%err, "terminal restore failed");
        }
    }
}

fn keep_first(slot: &mut Option<io::Error>, result: io::Result<()>) {
    if let Err(err) = result {
        if slot.is_none() {
            *slot = Some(err);
        } else {
            warn!(%err, "terminal restore step failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entered<W: Write>(out: W) -> TerminalGuard<W> {
        // Raw mode stays off: the tests run without a tty.
        TerminalGuard {
            out,
            raw_mode: false,
            alternate_screen: true,
            cursor_hidden: true,
            enhanced_keys: true,
        }
    }

    struct BrokenPipe {
        attempts: usize,
    }

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.attempts += 1;
            Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("write {}", self.attempts),
            ))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn restore_undoes_setup_in_reverse_order() {
        let mut term = entered(Vec::new());
        term.restore().unwrap();

        let written = String::from_utf8(term.out().clone()).unwrap();
        assert_eq!(written, "\x1b[<1u\x1b[?25h\x1b[?1049l");
    }

    #[test]
    fn second_restore_writes_nothing() {
        let mut term = entered(Vec::new());
        term.restore().unwrap();
        term.out().clear();
        term.restore().unwrap();
        assert!(term.out().is_empty());
    }

    #[test]
    fn fresh_guard_touches_nothing() {
        let mut term = TerminalGuard::new(Vec::new());
        term.restore().unwrap();
        assert!(term.out().is_empty());
    }

    #[test]
    fn failed_step_does_not_skip_the_rest() {
        let mut term = entered(BrokenPipe { attempts: 0 });
        let err = term.restore().unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(err.to_string(), "write 1");
        assert_eq!(term.out().attempts, 3);
        assert!(!term.alternate_screen && !term.cursor_hidden && !term.enhanced_keys);
    }

    #[test]
    fn drop_restores_the_terminal() {
        let mut buf = Vec::new();
        drop(entered(&mut buf));
        assert_eq!(buf, b"\x1b[<1u\x1b[?25h\x1b[?1049l");
    }
}
