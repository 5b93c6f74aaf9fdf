//! Parser State Machine
//!
//! Implements a VT500-series compatible parser state machine.
//! The parser handles arbitrary chunk boundaries and produces
//! semantic actions for the screen dispatcher.
//!
//! # State Machine
//!
//! The parser follows the state machine model described in:
//! - "A parser for DEC's ANSI-compatible video terminals" by Paul Williams
//! - https://vt100.net/emu/dec_ansi_parser
//!
//! Every byte is classified, then [`transition`] maps the current state
//! and byte to an action and an optional next state. Entering a state runs
//! its entry action (clearing collected intermediates, parameters or the
//! OSC buffer) before the byte's own action is performed.
//!
//! DCS, SOS, PM and APC strings are consumed without interpretation.

use super::action::{Action, ControlCode, CsiAction, EscAction, OscAction, StringKind};
use super::params::Params;
use super::utf8::{Utf8Decoder, Utf8Result, REPLACEMENT};

/// OSC payload bytes kept; the rest of an oversized string is dropped
pub const MAX_OSC_LEN: usize = 4096;
/// Intermediate bytes kept for escape and CSI sequences
const MAX_INTERMEDIATES: usize = 2;

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Ground,
    Escape,
    EscapeIntermediate,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    OscString,
    /// Inside a DCS, SOS, PM or APC string
    StringIgnore,
}

/// Byte classes the transition table is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteClass {
    /// C0 controls other than BEL, CAN, SUB and ESC
    Execute,
    Bell,
    /// CAN or SUB
    Cancel,
    Escape,
    /// 0x20-0x2F
    Intermediate,
    Digit,
    Colon,
    Semicolon,
    /// `<`, `=`, `>` or `?`
    Marker,
    /// 0x40-0x5F
    Upper,
    /// 0x60-0x7E
    Lower,
    Delete,
    /// 0x80 and above
    High,
}

impl ByteClass {
    fn of(byte: u8) -> Self {
        match byte {
            0x07 => ByteClass::Bell,
            0x18 | 0x1A => ByteClass::Cancel,
            0x1B => ByteClass::Escape,
            0x00..=0x1F => ByteClass::Execute,
            0x20..=0x2F => ByteClass::Intermediate,
            0x30..=0x39 => ByteClass::Digit,
            b':' => ByteClass::Colon,
            b';' => ByteClass::Semicolon,
            0x3C..=0x3F => ByteClass::Marker,
            0x40..=0x5F => ByteClass::Upper,
            0x60..=0x7E => ByteClass::Lower,
            0x7F => ByteClass::Delete,
            _ => ByteClass::High,
        }
    }
}

/// What to do with a byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Act {
    Ignore,
    Print,
    Utf8,
    Execute,
    Collect,
    EscDispatch,
    Param,
    Marker,
    CsiDispatch,
    OscPut,
    OscEnd,
    StringStart,
    StringEnd,
}

/// The transition table
fn transition(state: ParserState, byte: u8) -> (Act, Option<ParserState>) {
    use ByteClass as B;
    use ParserState as S;

    let class = ByteClass::of(byte);
    match (state, class) {
        // Strings see most bytes as payload
        (S::OscString, B::Bell) => (Act::OscEnd, Some(S::Ground)),
        (S::OscString, B::Escape) => (Act::OscEnd, Some(S::Escape)),
        (S::OscString, B::Cancel) => (Act::Ignore, Some(S::Ground)),
        (S::OscString, B::Execute | B::Delete) => (Act::Ignore, None),
        (S::OscString, _) => (Act::OscPut, None),
        (S::StringIgnore, B::Escape) => (Act::StringEnd, Some(S::Escape)),
        (S::StringIgnore, B::Cancel) => (Act::Ignore, Some(S::Ground)),
        (S::StringIgnore, _) => (Act::Ignore, None),

        // Everywhere else
        (_, B::Cancel) => (Act::Ignore, Some(S::Ground)),
        (_, B::Escape) => (Act::Ignore, Some(S::Escape)),
        (_, B::Execute | B::Bell) => (Act::Execute, None),
        (_, B::Delete) => (Act::Ignore, None),

        (S::Ground, B::High) => (Act::Utf8, None),
        (S::Ground, _) => (Act::Print, None),

        (S::Escape, B::Intermediate) => (Act::Collect, Some(S::EscapeIntermediate)),
        (S::Escape, B::High) => (Act::Ignore, Some(S::Ground)),
        (S::Escape, _) => match byte {
            b'[' => (Act::Ignore, Some(S::CsiEntry)),
            b']' => (Act::Ignore, Some(S::OscString)),
            b'P' | b'X' | b'^' | b'_' => (Act::StringStart, Some(S::StringIgnore)),
            _ => (Act::EscDispatch, Some(S::Ground)),
        },

        (S::EscapeIntermediate, B::Intermediate) => (Act::Collect, None),
        (S::EscapeIntermediate, B::High) => (Act::Ignore, Some(S::Ground)),
        (S::EscapeIntermediate, _) => (Act::EscDispatch, Some(S::Ground)),

        (S::CsiEntry, B::Marker) => (Act::Marker, Some(S::CsiParam)),
        (
            S::CsiEntry | S::CsiParam,
            B::Digit | B::Colon | B::Semicolon,
        ) => (Act::Param, Some(S::CsiParam)),
        (S::CsiParam, B::Marker) => (Act::Ignore, Some(S::CsiIgnore)),
        (
            S::CsiEntry | S::CsiParam | S::CsiIntermediate,
            B::Intermediate,
        ) => (Act::Collect, Some(S::CsiIntermediate)),
        (
            S::CsiIntermediate,
            B::Digit | B::Colon | B::Semicolon | B::Marker,
        ) => (Act::Ignore, Some(S::CsiIgnore)),
        (
            S::CsiEntry | S::CsiParam | S::CsiIntermediate,
            B::Upper | B::Lower,
        ) => (Act::CsiDispatch, Some(S::Ground)),
        (S::CsiIgnore, B::Upper | B::Lower) => (Act::Ignore, Some(S::Ground)),
        (S::CsiEntry | S::CsiParam | S::CsiIntermediate | S::CsiIgnore, _) => {
            (Act::Ignore, None)
        }
    }
}

/// The terminal parser
#[derive(Debug, Clone)]
pub struct Parser {
    state: ParserState,
    /// Intermediate bytes collected during parsing
    intermediates: Vec<u8>,
    /// Parameters for CSI sequences
    params: Params,
    private_marker: Option<u8>,
    /// OSC string payload
    osc: Vec<u8>,
    string_kind: StringKind,
    utf8: Utf8Decoder,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in the ground state
    pub fn new() -> Self {
        Self {
            state: ParserState::Ground,
            intermediates: Vec::with_capacity(MAX_INTERMEDIATES),
            params: Params::new(),
            private_marker: None,
            osc: Vec::with_capacity(256),
            string_kind: StringKind::Dcs,
            utf8: Utf8Decoder::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Reset the parser to initial state, dropping any partial sequence
    pub fn reset(&mut self) {
        self.state = ParserState::Ground;
        self.intermediates.clear();
        self.params = Params::new();
        self.private_marker = None;
        self.osc.clear();
        self.utf8.reset();
    }

    /// Process a chunk of bytes, handing each completed action to `emit`
    pub fn parse<F: FnMut(Action)>(&mut self, data: &[u8], mut emit: F) {
        for &byte in data {
            self.advance(byte, &mut emit);
        }
    }

    /// Process a chunk of bytes, returning actions
    pub fn parse_collect(&mut self, data: &[u8]) -> Vec<Action> {
        let mut actions = Vec::new();
        self.parse(data, |action| actions.push(action));
        actions
    }

    /// Process a single byte
    pub fn advance<F: FnMut(Action)>(&mut self, byte: u8, emit: &mut F) {
        // A 7-bit byte cuts any partial UTF-8 sequence short
        if byte < 0x80 && self.utf8.is_pending() {
            self.utf8.reset();
            emit(Action::Print(REPLACEMENT));
        }

        let (act, next) = transition(self.state, byte);
        if let Some(next) = next {
            self.enter(next);
        }
        self.perform(act, byte, emit);
    }

    fn enter(&mut self, state: ParserState) {
        match state {
            ParserState::Escape => self.intermediates.clear(),
            ParserState::CsiEntry => {
                self.intermediates.clear();
                self.params = Params::new();
                self.private_marker = None;
            }
            ParserState::OscString => self.osc.clear(),
            _ => {}
        }
        self.state = state;
    }

    fn perform<F: FnMut(Action)>(&mut self, act: Act, byte: u8, emit: &mut F) {
        match act {
            Act::Ignore => {}
            Act::Print => emit(Action::Print(char::from(byte))),
            Act::Utf8 => match self.utf8.feed(byte) {
                Utf8Result::Pending => {}
                Utf8Result::Char(c) => emit(Action::Print(c)),
                Utf8Result::Invalid { reprocess } => {
                    emit(Action::Print(REPLACEMENT));
                    if reprocess {
                        self.advance(byte, emit);
                    }
                }
            },
            Act::Execute => {
                if let Some(code) = ControlCode::from_byte(byte) {
                    emit(Action::Control(code));
                }
            }
            Act::Collect => {
                if self.intermediates.len() < MAX_INTERMEDIATES {
                    self.intermediates.push(byte);
                } else if self.state == ParserState::CsiIntermediate {
                    self.state = ParserState::CsiIgnore;
                }
            }
            Act::EscDispatch => {
                emit(Action::Esc(EscAction::decode(&self.intermediates, byte)));
            }
            Act::Param => self.params.push(byte),
            Act::Marker => self.private_marker = Some(byte),
            Act::CsiDispatch => {
                let mut params = std::mem::take(&mut self.params);
                params.finish();
                emit(Action::Csi(CsiAction {
                    final_byte: byte,
                    params,
                    intermediates: std::mem::take(&mut self.intermediates),
                    private_marker: self.private_marker.take(),
                }));
            }
            Act::OscPut => {
                if self.osc.len() < MAX_OSC_LEN {
                    self.osc.push(byte);
                }
            }
            Act::OscEnd => {
                emit(Action::Osc(OscAction::decode(&self.osc)));
                self.osc.clear();
            }
            Act::StringStart => {
                self.string_kind = match byte {
                    b'P' => StringKind::Dcs,
                    b'X' => StringKind::Sos,
                    b'^' => StringKind::Pm,
                    _ => StringKind::Apc,
                };
            }
            Act::StringEnd => emit(Action::IgnoredString(self.string_kind)),
        }
    }
}
