//! Action dispatch
//!
//! Applies parser actions to the screen and collects reply bytes. Nothing
//! here can fail: sequences the engine does not implement are logged and
//! dropped.

use tracing::{debug, trace};

use super::sgr::parse_sgr;
use crate::core::{Charset, CursorShape, Screen};
use crate::parser::{Action, ControlCode, CsiAction, EscAction, OscAction};

/// Primary device attributes: VT420 class with 132 columns, selective
/// erase, soft character set, user-defined keys, national replacement
/// character sets, ANSI colour and horizontal scrolling
const DA1_REPLY: &[u8] = b"\x1b[?64;1;9;15;18;21;22c";
/// Secondary device attributes: VT420 reporting firmware 285
const DA2_REPLY: &[u8] = b"\x1b[>41;285;0c";

/// Everything a byte stream can change, apart from the parser itself
#[derive(Debug, Clone)]
pub(crate) struct Dispatcher {
    pub(crate) screen: Screen,
    pub(crate) title: Option<String>,
    pub(crate) icon_name: Option<String>,
    /// Reply bytes not yet drained by the PTY writer
    pub(crate) write_buffer: Vec<u8>,
    pub(crate) bell_count: u64,
}

impl Dispatcher {
    pub(crate) fn new(screen: Screen) -> Self {
        Self {
            screen,
            title: None,
            icon_name: None,
            write_buffer: Vec::new(),
            bell_count: 0,
        }
    }

    pub(crate) fn dispatch(&mut self, action: Action) {
        match action {
            Action::Print(c) => self.screen.print(c),
            Action::Control(code) => self.execute(code),
            Action::Csi(csi) => self.csi(&csi),
            Action::Esc(esc) => self.esc(esc),
            Action::Osc(osc) => self.osc(osc),
            Action::IgnoredString(kind) => debug!(?kind, "control string ignored"),
        }
    }

    fn reply(&mut self, bytes: &[u8]) {
        self.write_buffer.extend_from_slice(bytes);
    }

    fn execute(&mut self, code: ControlCode) {
        match code {
            ControlCode::Bell => {
                self.bell_count += 1;
                trace!(count = self.bell_count, "bell");
            }
            ControlCode::Backspace => self.screen.backspace(),
            ControlCode::Tab => self.screen.tab(1),
            ControlCode::LineFeed | ControlCode::VerticalTab | ControlCode::FormFeed => {
                self.screen.linefeed()
            }
            ControlCode::CarriageReturn => self.screen.carriage_return(),
            ControlCode::ShiftOut => self.screen.cursor_mut().charsets.invoke(1),
            ControlCode::ShiftIn => self.screen.cursor_mut().charsets.invoke(0),
        }
    }

    fn csi(&mut self, csi: &CsiAction) {
        match (csi.private_marker, csi.intermediates.as_slice(), csi.final_byte) {
            (None, [], _) => self.csi_plain(csi),
            (Some(b'?'), [], b'h') => self.set_dec_modes(csi, true),
            (Some(b'?'), [], b'l') => self.set_dec_modes(csi, false),
            (Some(b'?'), [], b'n') if csi.params.raw(0) == 6 => {
                // DECXCPR
                let (row, col) = self.screen.report_position();
                self.reply(format!("\x1b[?{};{}R", row, col).as_bytes());
            }
            (Some(b'?'), [b'$'], b'p') => {
                let mode = csi.params.raw(0);
                let value = self.screen.dec_mode(mode);
                self.report_mode(Some(b'?'), mode, value);
            }
            (None, [b'$'], b'p') => {
                let mode = csi.params.raw(0);
                let value = self.screen.modes().ansi_mode(mode);
                self.report_mode(None, mode, value);
            }
            (Some(b'>'), [], b'c') if csi.params.raw(0) == 0 => self.reply(DA2_REPLY),
            (None, [b' '], b'q') => self.set_cursor_style(csi.params.raw(0)),
            (None, [b'!'], b'p') => {
                self.screen.soft_reset();
                trace!("soft reset");
            }
            _ => self.unhandled(csi),
        }
    }

    /// CSI sequences without private marker or intermediates
    fn csi_plain(&mut self, csi: &CsiAction) {
        let n = || usize::from(csi.param_or(0, 1));
        let screen = &mut self.screen;

        match csi.final_byte {
            // Cursor movement
            b'A' => screen.move_up(n()),
            b'B' | b'e' => screen.move_down(n()),
            b'C' | b'a' => screen.move_forward(n()),
            b'D' => screen.move_backward(n()),
            b'E' => {
                screen.move_down(n());
                screen.carriage_return();
            }
            b'F' => {
                screen.move_up(n());
                screen.carriage_return();
            }
            b'G' | b'`' => screen.set_col(n() - 1),
            b'H' | b'f' => {
                let row = usize::from(csi.param_or(0, 1)) - 1;
                let col = usize::from(csi.param_or(1, 1)) - 1;
                screen.move_to(row, col);
            }
            b'd' => screen.set_row(n() - 1),
            b'I' => screen.tab(n()),
            b'Z' => screen.back_tab(n()),

            // Erasing and editing
            b'J' => screen.erase_in_display(csi.params.raw(0)),
            b'K' => screen.erase_in_line(csi.params.raw(0)),
            b'X' => screen.erase_chars(n()),
            b'@' => screen.insert_chars(n()),
            b'P' => screen.delete_chars(n()),
            b'L' => screen.insert_lines(n()),
            b'M' => screen.delete_lines(n()),
            b'b' => screen.repeat_last(n()),

            // Scrolling
            b'S' => screen.scroll_up(n()),
            b'T' => screen.scroll_down(n()),
            b'r' => {
                let rows = screen.rows();
                let top = usize::from(csi.param_or(0, 1)) - 1;
                let bottom = usize::from(csi.params.get(1).unwrap_or(0))
                    .checked_sub(1)
                    .unwrap_or(rows - 1)
                    .min(rows - 1);
                screen.set_scroll_region(top, bottom);
            }

            b'm' => {
                let attrs = &mut screen.cursor_mut().attrs;
                for attr in parse_sgr(&csi.params) {
                    attr.apply(attrs);
                }
            }

            b'g' => match csi.params.raw(0) {
                0 => screen.clear_tab_stop(),
                3 => screen.clear_all_tab_stops(),
                _ => self.unhandled(csi),
            },

            // SCOSC / SCORC
            b's' => screen.save_cursor(),
            b'u' => screen.restore_cursor(),

            b'h' | b'l' => {
                let enable = csi.final_byte == b'h';
                for mode in csi.params.iter() {
                    if !screen.modes_mut().set_ansi_mode(mode, enable) {
                        debug!(mode, enable, "unknown ANSI mode");
                    }
                }
            }

            b'n' => match csi.params.raw(0) {
                5 => self.reply(b"\x1b[0n"),
                6 => {
                    let (row, col) = screen.report_position();
                    self.reply(format!("\x1b[{};{}R", row, col).as_bytes());
                }
                _ => self.unhandled(csi),
            },
            b'c' if csi.params.raw(0) == 0 => self.reply(DA1_REPLY),
            b't' if csi.params.raw(0) == 18 => {
                let (rows, cols) = (screen.rows(), screen.cols());
                self.reply(format!("\x1b[8;{};{}t", rows, cols).as_bytes());
            }

            _ => self.unhandled(csi),
        }
    }

    fn set_dec_modes(&mut self, csi: &CsiAction, enable: bool) {
        for mode in csi.params.iter() {
            if self.screen.set_dec_mode(mode, enable) {
                trace!(mode, enable, "DEC mode");
            } else {
                debug!(mode, enable, "unknown DEC mode");
            }
        }
    }

    /// DECRPM: 1 set, 2 reset, 0 not recognized
    fn report_mode(&mut self, marker: Option<u8>, mode: u16, value: Option<bool>) {
        let state = match value {
            Some(true) => 1,
            Some(false) => 2,
            None => 0,
        };
        let marker = if marker.is_some() { "?" } else { "" };
        self.reply(format!("\x1b[{}{};{}$y", marker, mode, state).as_bytes());
    }

    /// DECSCUSR
    fn set_cursor_style(&mut self, style: u16) {
        let (shape, blinking) = match style {
            0 | 1 => (CursorShape::Block, true),
            2 => (CursorShape::Block, false),
            3 => (CursorShape::Underline, true),
            4 => (CursorShape::Underline, false),
            5 => (CursorShape::Bar, true),
            6 => (CursorShape::Bar, false),
            _ => {
                debug!(style, "unknown cursor style");
                return;
            }
        };
        let cursor = self.screen.cursor_mut();
        cursor.shape = shape;
        cursor.blinking = blinking;
    }

    fn unhandled(&self, csi: &CsiAction) {
        debug!(
            final_byte = %char::from(csi.final_byte),
            marker = ?csi.private_marker.map(char::from),
            intermediates = ?csi.intermediates,
            params = ?csi.params.iter().collect::<Vec<_>>(),
            "unhandled CSI"
        );
    }

    fn esc(&mut self, esc: EscAction) {
        let screen = &mut self.screen;
        match esc {
            EscAction::SaveCursor => screen.save_cursor(),
            EscAction::RestoreCursor => screen.restore_cursor(),
            EscAction::Index => screen.index(),
            EscAction::NextLine => screen.next_line(),
            EscAction::ReverseIndex => screen.reverse_index(),
            EscAction::TabSet => screen.set_tab_stop(),
            EscAction::FullReset => {
                screen.hard_reset();
                self.title = None;
                self.icon_name = None;
                trace!("full reset");
            }
            EscAction::ApplicationKeypad => screen.modes_mut().app_keypad = true,
            EscAction::NormalKeypad => screen.modes_mut().app_keypad = false,
            EscAction::StringTerminator => {}
            EscAction::DesignateCharset { slot, designator } => {
                let charset = Charset::from_designator(designator);
                trace!(slot, ?charset, "designate charset");
                screen.cursor_mut().charsets.designate(slot, charset);
            }
            EscAction::ScreenAlignment => screen.screen_alignment(),
            EscAction::Unknown {
                intermediate,
                final_byte,
            } => debug!(
                intermediate = ?intermediate.map(char::from),
                final_byte = %char::from(final_byte),
                "unhandled ESC"
            ),
        }
    }

    fn osc(&mut self, osc: OscAction) {
        match osc {
            OscAction::SetIconAndTitle(text) => {
                trace!(%text, "set icon and title");
                self.icon_name = Some(text.clone());
                self.title = Some(text);
            }
            OscAction::SetIconName(text) => {
                trace!(%text, "set icon name");
                self.icon_name = Some(text);
            }
            OscAction::SetTitle(text) => {
                trace!(%text, "set title");
                self.title = Some(text);
            }
            OscAction::Unknown { command } => debug!(?command, "unhandled OSC"),
        }
    }
}
