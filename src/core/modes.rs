//! Terminal mode flags
//!
//! The mode register holds every boolean/enum switch that a set/reset mode
//! sequence can flip. Screen switching (`altbuf`) is recorded here but the
//! grid swap itself is performed by [`super::Screen`].

use serde::{Deserialize, Serialize};

/// Which of the two grids is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScreenKind {
    #[default]
    Primary,
    Alternate,
}

impl ScreenKind {
    /// Index into per-screen arrays (save slots)
    pub fn index(self) -> usize {
        match self {
            ScreenKind::Primary => 0,
            ScreenKind::Alternate => 1,
        }
    }
}

/// Mouse reporting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseMode {
    /// No mouse reporting
    #[default]
    Off,
    /// X10 compatibility mode - report button press only (DECSET 9)
    X10,
    /// Normal tracking mode - report press and release (DECSET 1000)
    Normal,
    /// Button-event tracking - also motion while a button is held (DECSET 1002)
    ButtonEvent,
    /// Any-event tracking - report all motion (DECSET 1003)
    AnyEvent,
}

impl MouseMode {
    fn code(self) -> u8 {
        match self {
            MouseMode::Off => 0,
            MouseMode::X10 => 1,
            MouseMode::Normal => 2,
            MouseMode::ButtonEvent => 3,
            MouseMode::AnyEvent => 4,
        }
    }
}

/// Mouse coordinate encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseExt {
    /// Default X10 byte encoding (limited to 223 columns/rows)
    #[default]
    Default,
    /// UTF-8 encoded coordinates (DECSET 1005)
    Utf8,
    /// SGR encoding, CSI < ... M/m (DECSET 1006)
    Sgr,
    /// URXVT decimal encoding (DECSET 1015)
    Urxvt,
}

impl MouseExt {
    fn code(self) -> u8 {
        match self {
            MouseExt::Default => 0,
            MouseExt::Utf8 => 1,
            MouseExt::Sgr => 2,
            MouseExt::Urxvt => 3,
        }
    }
}

/// Result of a DEC private mode change that the screen has to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEffect {
    /// Only the register changed
    None,
    /// DECSET/DECRST 47, 1047 or 1049
    AltScreen { mode: u16, enable: bool },
    /// DECSET/DECRST 1048
    SaveRestoreCursor { save: bool },
    /// DECOM changed; the cursor homes
    Origin,
    /// DECSET/DECRST 25 or 12 (cursor presentation)
    CursorVisible(bool),
    CursorBlink(bool),
    /// The mode number is not known
    Unknown,
}

/// Terminal mode flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    /// Alternate screen buffer active
    pub altbuf: bool,
    /// Mouse reporting mode
    pub mouse_mode: MouseMode,
    /// Mouse coordinate encoding
    pub mouse_ext: MouseExt,
    /// Bracketed paste mode (DECSET 2004)
    pub bracketed_paste: bool,
    /// DECAWM - auto wrap at the right margin
    pub autowrap: bool,
    /// DECOM - cursor addressing relative to the scroll region
    pub origin: bool,
    /// IRM - insert instead of overwrite
    pub insert: bool,
    /// LNM - LF also performs CR
    pub linefeed_newline: bool,
    /// DECCKM - application cursor keys
    pub app_cursor_keys: bool,
    /// DECKPAM/DECKPNM - application keypad
    pub app_keypad: bool,
    /// DECSCNM - reverse video
    pub reverse_video: bool,
    /// Focus in/out reporting (DECSET 1004)
    pub focus_reporting: bool,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            altbuf: false,
            mouse_mode: MouseMode::Off,
            mouse_ext: MouseExt::Default,
            bracketed_paste: false,
            autowrap: true,
            origin: false,
            insert: false,
            linefeed_newline: false,
            app_cursor_keys: false,
            app_keypad: false,
            reverse_video: false,
            focus_reporting: false,
        }
    }
}

impl Modes {
    /// Create new default modes
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all modes to default values
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The screen selected by `altbuf`
    pub fn active_screen(&self) -> ScreenKind {
        if self.altbuf {
            ScreenKind::Alternate
        } else {
            ScreenKind::Primary
        }
    }

    /// Set or reset a DEC private mode (CSI ? Ps h / CSI ? Ps l).
    ///
    /// Alternate-screen modes are reported back rather than applied, since
    /// flipping `altbuf` without swapping grids would desynchronise them.
    pub fn set_dec_mode(&mut self, mode: u16, enable: bool) -> ModeEffect {
        match mode {
            1 => self.app_cursor_keys = enable,
            5 => self.reverse_video = enable,
            6 => {
                self.origin = enable;
                return ModeEffect::Origin;
            }
            7 => self.autowrap = enable,
            9 => self.set_mouse_mode(MouseMode::X10, enable),
            12 => return ModeEffect::CursorBlink(enable),
            25 => return ModeEffect::CursorVisible(enable),
            47 | 1047 | 1049 => return ModeEffect::AltScreen { mode, enable },
            66 => self.app_keypad = enable,
            1000 => self.set_mouse_mode(MouseMode::Normal, enable),
            1002 => self.set_mouse_mode(MouseMode::ButtonEvent, enable),
            1003 => self.set_mouse_mode(MouseMode::AnyEvent, enable),
            1004 => self.focus_reporting = enable,
            1005 => self.set_mouse_ext(MouseExt::Utf8, enable),
            1006 => self.set_mouse_ext(MouseExt::Sgr, enable),
            1015 => self.set_mouse_ext(MouseExt::Urxvt, enable),
            1048 => return ModeEffect::SaveRestoreCursor { save: enable },
            2004 => self.bracketed_paste = enable,
            _ => return ModeEffect::Unknown,
        }
        ModeEffect::None
    }

    /// Set or reset an ANSI mode (CSI Ps h / CSI Ps l).
    /// Returns false if the mode is not recognized.
    pub fn set_ansi_mode(&mut self, mode: u16, enable: bool) -> bool {
        match mode {
            4 => self.insert = enable,
            20 => self.linefeed_newline = enable,
            _ => return false,
        }
        true
    }

    /// Current value of a DEC private mode for DECRQM; `None` if unknown.
    /// Cursor presentation modes are answered by the caller.
    pub fn dec_mode(&self, mode: u16) -> Option<bool> {
        let value = match mode {
            1 => self.app_cursor_keys,
            5 => self.reverse_video,
            6 => self.origin,
            7 => self.autowrap,
            9 => self.mouse_mode == MouseMode::X10,
            47 | 1047 | 1049 => self.altbuf,
            66 => self.app_keypad,
            1000 => self.mouse_mode == MouseMode::Normal,
            1002 => self.mouse_mode == MouseMode::ButtonEvent,
            1003 => self.mouse_mode == MouseMode::AnyEvent,
            1004 => self.focus_reporting,
            1005 => self.mouse_ext == MouseExt::Utf8,
            1006 => self.mouse_ext == MouseExt::Sgr,
            1015 => self.mouse_ext == MouseExt::Urxvt,
            2004 => self.bracketed_paste,
            _ => return None,
        };
        Some(value)
    }

    /// Current value of an ANSI mode for DECRQM; `None` if unknown
    pub fn ansi_mode(&self, mode: u16) -> Option<bool> {
        match mode {
            4 => Some(self.insert),
            20 => Some(self.linefeed_newline),
            _ => None,
        }
    }

    // Resetting any tracking mode turns reporting off, like xterm does.
    fn set_mouse_mode(&mut self, mode: MouseMode, enable: bool) {
        self.mouse_mode = if enable { mode } else { MouseMode::Off };
    }

    fn set_mouse_ext(&mut self, ext: MouseExt, enable: bool) {
        if enable {
            self.mouse_ext = ext;
        } else if self.mouse_ext == ext {
            self.mouse_ext = MouseExt::Default;
        }
    }

    pub(crate) fn fingerprint(&self) -> [u8; 12] {
        [
            self.altbuf as u8,
            self.mouse_mode.code(),
            self.mouse_ext.code(),
            self.bracketed_paste as u8,
            self.autowrap as u8,
            self.origin as u8,
            self.insert as u8,
            self.linefeed_newline as u8,
            self.app_cursor_keys as u8,
            self.app_keypad as u8,
            self.reverse_video as u8,
            self.focus_reporting as u8,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_default() {
        let modes = Modes::new();
        assert!(modes.autowrap);
        assert!(!modes.origin);
        assert!(!modes.insert);
        assert!(!modes.altbuf);
        assert!(!modes.bracketed_paste);
        assert_eq!(modes.mouse_mode, MouseMode::Off);
        assert_eq!(modes.mouse_ext, MouseExt::Default);
        assert_eq!(modes.active_screen(), ScreenKind::Primary);
    }

    #[test]
    fn test_dec_mode_set_reset() {
        let mut modes = Modes::new();
        assert_eq!(modes.set_dec_mode(2004, true), ModeEffect::None);
        assert!(modes.bracketed_paste);
        assert_eq!(modes.dec_mode(2004), Some(true));

        modes.set_dec_mode(2004, false);
        assert!(!modes.bracketed_paste);
        assert_eq!(modes.dec_mode(2004), Some(false));
    }

    #[test]
    fn test_mode_set_is_idempotent() {
        let mut modes = Modes::new();
        modes.set_dec_mode(1002, true);
        let before = modes.clone();
        modes.set_dec_mode(1002, true);
        assert_eq!(modes, before);
    }

    #[test]
    fn test_mouse_modes() {
        let mut modes = Modes::new();

        modes.set_dec_mode(9, true);
        assert_eq!(modes.mouse_mode, MouseMode::X10);

        modes.set_dec_mode(1000, true);
        assert_eq!(modes.mouse_mode, MouseMode::Normal);

        modes.set_dec_mode(1002, true);
        assert_eq!(modes.mouse_mode, MouseMode::ButtonEvent);

        modes.set_dec_mode(1003, true);
        assert_eq!(modes.mouse_mode, MouseMode::AnyEvent);

        modes.set_dec_mode(1000, false);
        assert_eq!(modes.mouse_mode, MouseMode::Off);
    }

    #[test]
    fn test_mouse_ext() {
        let mut modes = Modes::new();

        modes.set_dec_mode(1006, true);
        assert_eq!(modes.mouse_ext, MouseExt::Sgr);

        // Resetting a different encoding leaves SGR alone
        modes.set_dec_mode(1005, false);
        assert_eq!(modes.mouse_ext, MouseExt::Sgr);

        modes.set_dec_mode(1006, false);
        assert_eq!(modes.mouse_ext, MouseExt::Default);
    }

    #[test]
    fn test_alt_screen_is_deferred() {
        let mut modes = Modes::new();
        assert_eq!(
            modes.set_dec_mode(1049, true),
            ModeEffect::AltScreen {
                mode: 1049,
                enable: true
            }
        );
        assert!(!modes.altbuf);
    }

    #[test]
    fn test_ansi_modes() {
        let mut modes = Modes::new();
        assert!(modes.set_ansi_mode(4, true));
        assert!(modes.insert);
        assert!(modes.set_ansi_mode(4, false));
        assert!(!modes.insert);
        assert!(!modes.set_ansi_mode(99, true));
    }

    #[test]
    fn test_unknown_mode() {
        let mut modes = Modes::new();
        assert_eq!(modes.set_dec_mode(9999, true), ModeEffect::Unknown);
        assert_eq!(modes.dec_mode(9999), None);
        assert_eq!(modes, Modes::new());
    }
}
