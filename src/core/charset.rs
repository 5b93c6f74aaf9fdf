//! Character set designation and translation
//!
//! Only the sets that still matter in practice are modelled: US ASCII,
//! DEC Special Graphics (line drawing) and the UK national set. G0-G3 can
//! be designated; SI/SO invoke G0/G1 into GL.

use serde::{Deserialize, Serialize};

/// A 94-character graphic set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Charset {
    #[default]
    Ascii,
    DecSpecialGraphics,
    Uk,
}

impl Charset {
    /// Map the final byte of an `ESC ( F` style designation to a set.
    /// Unknown sets fall back to ASCII.
    pub fn from_designator(final_byte: u8) -> Self {
        match final_byte {
            b'0' | b'2' => Charset::DecSpecialGraphics,
            b'A' => Charset::Uk,
            _ => Charset::Ascii,
        }
    }

    pub fn translate(self, c: char) -> char {
        match self {
            Charset::Ascii => c,
            Charset::Uk if c == '#' => '£',
            Charset::Uk => c,
            Charset::DecSpecialGraphics => dec_special_graphics(c),
        }
    }
}

/// Designated sets plus the one currently invoked into GL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charsets {
    slots: [Charset; 4],
    gl: u8,
}

impl Charsets {
    /// Designate `charset` into G`slot` (0-3); other slots are ignored
    pub fn designate(&mut self, slot: u8, charset: Charset) {
        if let Some(s) = self.slots.get_mut(slot as usize) {
            *s = charset;
        }
    }

    /// SI (`slot == 0`) / SO (`slot == 1`)
    pub fn invoke(&mut self, slot: u8) {
        if slot < 2 {
            self.gl = slot;
        }
    }

    pub fn active(&self) -> Charset {
        self.slots[self.gl as usize]
    }

    pub fn translate(&self, c: char) -> char {
        if c.is_ascii() {
            self.active().translate(c)
        } else {
            c
        }
    }

    pub(crate) fn fingerprint(&self) -> [u8; 5] {
        let code = |c: Charset| match c {
            Charset::Ascii => 0u8,
            Charset::DecSpecialGraphics => 1,
            Charset::Uk => 2,
        };
        [
            code(self.slots[0]),
            code(self.slots[1]),
            code(self.slots[2]),
            code(self.slots[3]),
            self.gl,
        ]
    }
}

fn dec_special_graphics(c: char) -> char {
    match c {
        '`' => '◆',
        'a' => '▒',
        'b' => '␉',
        'c' => '␌',
        'd' => '␍',
        'e' => '␊',
        'f' => '°',
        'g' => '±',
        'h' => '␤',
        'i' => '␋',
        'j' => '┘',
        'k' => '┐',
        'l' => '┌',
        'm' => '└',
        'n' => '┼',
        'o' => '⎺',
        'p' => '⎻',
        'q' => '─',
        'r' => '⎼',
        's' => '⎽',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'x' => '│',
        'y' => '≤',
        'z' => '≥',
        '{' => 'π',
        '|' => '≠',
        '}' => '£',
        '~' => '·',
        _ => c,
    }
}
