//! Parser actions
//!
//! Completed units of input handed to the dispatcher. Escape and OSC
//! sequences are decoded here; CSI sequences stay raw (final byte plus
//! parameters) since their meaning depends on screen state.

use super::params::Params;

/// A terminal action produced by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print a character to the screen
    Print(char),
    /// Execute a C0 control character
    Control(ControlCode),
    /// A complete CSI sequence
    Csi(CsiAction),
    /// A complete non-CSI escape sequence
    Esc(EscAction),
    /// A complete OSC string
    Osc(OscAction),
    /// A DCS, SOS, PM or APC string was consumed and discarded
    IgnoredString(StringKind),
}

/// C0 control codes the engine acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    /// BEL - Bell
    Bell,
    /// BS - Backspace
    Backspace,
    /// HT - Horizontal Tab
    Tab,
    /// LF - Line Feed
    LineFeed,
    /// VT - Vertical Tab (treated as LF)
    VerticalTab,
    /// FF - Form Feed (treated as LF)
    FormFeed,
    /// CR - Carriage Return
    CarriageReturn,
    /// SO - Shift Out (invoke G1)
    ShiftOut,
    /// SI - Shift In (invoke G0)
    ShiftIn,
}

impl ControlCode {
    /// Map a C0 byte; NUL and controls without an effect give `None`
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x07 => ControlCode::Bell,
            0x08 => ControlCode::Backspace,
            0x09 => ControlCode::Tab,
            0x0A => ControlCode::LineFeed,
            0x0B => ControlCode::VerticalTab,
            0x0C => ControlCode::FormFeed,
            0x0D => ControlCode::CarriageReturn,
            0x0E => ControlCode::ShiftOut,
            0x0F => ControlCode::ShiftIn,
            _ => return None,
        })
    }
}

/// CSI (Control Sequence Introducer) sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsiAction {
    /// The final byte that identifies the command
    pub final_byte: u8,
    pub params: Params,
    /// Intermediate bytes (0x20-0x2F), at most two
    pub intermediates: Vec<u8>,
    /// Private marker (`?`, `>`, `<` or `=`)
    pub private_marker: Option<u8>,
}

impl CsiAction {
    pub fn new(final_byte: u8) -> Self {
        Self {
            final_byte,
            params: Params::new(),
            intermediates: Vec::new(),
            private_marker: None,
        }
    }

    /// Parameter at index, with 0 and missing both meaning `default`
    pub fn param_or(&self, index: usize, default: u16) -> u16 {
        self.params.get_or(index, default)
    }

    /// The first intermediate byte, if any
    pub fn intermediate(&self) -> Option<u8> {
        self.intermediates.first().copied()
    }
}

/// ESC sequence actions (non-CSI)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscAction {
    /// ESC 7 - Save cursor (DECSC)
    SaveCursor,
    /// ESC 8 - Restore cursor (DECRC)
    RestoreCursor,
    /// ESC D - Index (IND)
    Index,
    /// ESC E - Next Line (NEL)
    NextLine,
    /// ESC M - Reverse Index (RI)
    ReverseIndex,
    /// ESC H - Horizontal Tab Set (HTS)
    TabSet,
    /// ESC c - Full Reset (RIS)
    FullReset,
    /// ESC = - Application Keypad Mode (DECKPAM)
    ApplicationKeypad,
    /// ESC > - Normal Keypad Mode (DECKPNM)
    NormalKeypad,
    /// ESC \ - String Terminator outside a string
    StringTerminator,
    /// ESC ( F, ESC ) F, ESC * F, ESC + F
    DesignateCharset { slot: u8, designator: u8 },
    /// ESC # 8 - Screen Alignment Test (DECALN)
    ScreenAlignment,
    /// Anything else
    Unknown {
        intermediate: Option<u8>,
        final_byte: u8,
    },
}

impl EscAction {
    pub(crate) fn decode(intermediates: &[u8], final_byte: u8) -> Self {
        match (intermediates, final_byte) {
            ([], b'7') => EscAction::SaveCursor,
            ([], b'8') => EscAction::RestoreCursor,
            ([], b'D') => EscAction::Index,
            ([], b'E') => EscAction::NextLine,
            ([], b'M') => EscAction::ReverseIndex,
            ([], b'H') => EscAction::TabSet,
            ([], b'c') => EscAction::FullReset,
            ([], b'=') => EscAction::ApplicationKeypad,
            ([], b'>') => EscAction::NormalKeypad,
            ([], b'\\') => EscAction::StringTerminator,
            ([b'#'], b'8') => EscAction::ScreenAlignment,
            ([slot @ b'('..=b'+'], designator) => EscAction::DesignateCharset {
                slot: slot - b'(',
                designator,
            },
            _ => EscAction::Unknown {
                intermediate: intermediates.first().copied(),
                final_byte,
            },
        }
    }
}

/// OSC (Operating System Command) actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OscAction {
    /// OSC 0 - icon name and window title
    SetIconAndTitle(String),
    /// OSC 1
    SetIconName(String),
    /// OSC 2
    SetTitle(String),
    /// Unknown/unsupported OSC; `command` is `None` when not numeric
    Unknown { command: Option<u16> },
}

impl OscAction {
    pub(crate) fn decode(payload: &[u8]) -> Self {
        let (command, data) = match payload.iter().position(|&b| b == b';') {
            Some(i) => (&payload[..i], &payload[i + 1..]),
            None => (payload, &payload[payload.len()..]),
        };
        let command = std::str::from_utf8(command)
            .ok()
            .and_then(|s| s.parse::<u16>().ok());
        let text = || String::from_utf8_lossy(data).into_owned();
        match command {
            Some(0) => OscAction::SetIconAndTitle(text()),
            Some(1) => OscAction::SetIconName(text()),
            Some(2) => OscAction::SetTitle(text()),
            command => OscAction::Unknown { command },
        }
    }
}

/// Control strings the engine consumes without acting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Dcs,
    Sos,
    Pm,
    Apc,
}
