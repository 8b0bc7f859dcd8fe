//! Terminal capability probing.
//!
//! Probing never fails: when a capability cannot be determined the renderer
//! falls back to a simpler glyph set or an unbounded width.

use crate::render::Glyphs;
use std::ffi::CStr;
use std::io::IsTerminal;
use terminfo::capability as cap;
use tracing::debug;

/// Width used for terminals that report no column count at all.
pub const FALLBACK_COLUMNS: usize = 80;

/// What the output device can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCaps {
    /// Standard output is a terminal.
    pub is_terminal: bool,
    /// Column count, when the terminal reports one.
    pub columns: Option<usize>,
    /// Writing the last column wraps immediately, so a newline after a full
    /// line would produce an empty one (`am` without `xenl`).
    pub newline_hazard: bool,
    /// The locale is UTF-8 and encodes every Unicode connector faithfully.
    pub unicode_glyphs: bool,
}

impl TerminalCaps {
    /// Capabilities of a pipe or file: no terminal, no width.
    pub fn not_a_terminal() -> Self {
        TerminalCaps {
            is_terminal: false,
            columns: None,
            newline_hazard: false,
            unicode_glyphs: locale_carries_unicode_glyphs(),
        }
    }

    /// Probe standard output.
    pub fn detect() -> Self {
        if !std::io::stdout().is_terminal() {
            let caps = Self::not_a_terminal();
            debug!(unicode_glyphs = caps.unicode_glyphs, "stdout is not a terminal");
            return caps;
        }

        let database = terminfo::Database::from_env().ok();
        if database.is_none() {
            debug!("no terminfo entry for $TERM");
        }

        let columns = window_columns()
            .or_else(|| {
                database
                    .as_ref()
                    .and_then(|db| db.get::<cap::Columns>())
                    .and_then(|c| usize::try_from(c.0).ok())
                    .filter(|&c| c > 0)
            })
            .or_else(|| {
                std::env::var("COLUMNS")
                    .ok()
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .filter(|&c| c > 0)
            });

        let newline_hazard = database.as_ref().is_some_and(|db| {
            let auto_margin = db.get::<cap::AutoRightMargin>().is_some_and(|c| c.0);
            let eats_newline = db.get::<cap::EatNewlineGlitch>().is_some_and(|c| c.0);
            auto_margin && !eats_newline
        });

        let caps = TerminalCaps {
            is_terminal: true,
            columns,
            newline_hazard,
            unicode_glyphs: locale_carries_unicode_glyphs(),
        };
        debug!(
            columns = ?caps.columns,
            newline_hazard = caps.newline_hazard,
            unicode_glyphs = caps.unicode_glyphs,
            "probed terminal"
        );
        caps
    }

    /// Width limit for output lines, if any.
    ///
    /// Only terminals are limited, and never in long mode. A terminal that
    /// cannot report its size gets [`FALLBACK_COLUMNS`].
    pub fn line_width(&self, long: bool) -> Option<usize> {
        if long || !self.is_terminal {
            return None;
        }
        Some(self.columns.unwrap_or(FALLBACK_COLUMNS))
    }
}

/// Column count from the kernel's window size for stdout.
fn window_columns() -> Option<usize> {
    // SAFETY: TIOCGWINSZ only writes into the winsize we pass in.
    let mut size: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) };
    if rc == 0 && size.ws_col > 0 {
        Some(usize::from(size.ws_col))
    } else {
        None
    }
}

extern "C" {
    fn wctomb(s: *mut libc::c_char, wc: libc::wchar_t) -> libc::c_int;
    fn mbtowc(pwc: *mut libc::wchar_t, s: *const libc::c_char, n: libc::size_t) -> libc::c_int;
}

/// Adopt the environment's character-type locale and report whether the
/// Unicode connectors can be written in it.
fn locale_carries_unicode_glyphs() -> bool {
    // SAFETY: called from the single main thread before any other locale use;
    // nl_langinfo returns a pointer to a static NUL-terminated string.
    let utf8 = unsafe {
        if libc::setlocale(libc::LC_CTYPE, c"".as_ptr()).is_null() {
            return false;
        }
        let codeset = libc::nl_langinfo(libc::CODESET);
        !codeset.is_null() && is_utf8_codeset(&CStr::from_ptr(codeset).to_string_lossy())
    };
    let faithful = Glyphs::UNICODE.connectors().into_iter().all(round_trips);
    debug!(utf8, faithful, "checked locale for unicode connectors");
    utf8 && faithful
}

/// `c` converts to a multibyte sequence in the current locale and back to
/// the same wide character.
fn round_trips(c: char) -> bool {
    // Longer than any MB_CUR_MAX.
    let mut buffer: [libc::c_char; 16] = [0; 16];
    let wide = c as libc::wchar_t;
    // SAFETY: wctomb writes at most MB_CUR_MAX bytes into the buffer, and
    // mbtowc reads only the `size` bytes that were written.
    unsafe {
        let size = wctomb(buffer.as_mut_ptr(), wide);
        let Ok(size) = usize::try_from(size) else {
            return false;
        };
        let mut back: libc::wchar_t = 0;
        mbtowc(&mut back, buffer.as_ptr(), size) >= 0 && back == wide
    }
}

fn is_utf8_codeset(codeset: &str) -> bool {
    let normalized: String = codeset
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect();
    normalized.eq_ignore_ascii_case("utf8")
}
