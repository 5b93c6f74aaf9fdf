//! SGR (Select Graphic Rendition) decoding
//!
//! Extended colours come in two spellings: the legacy semicolon form
//! (`38;5;n`, `38;2;r;g;b`) where the colour spans several parameters, and
//! the ITU colon form (`38:5:n`, `38:2::r:g:b`) where it is carried in the
//! sub-parameters of a single one.

use crate::core::{CellAttrs, Color};
use crate::parser::Params;

/// A single decoded SGR attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrAttribute {
    Reset,
    Bold,
    Faint,
    Italic,
    Underline,
    Blink,
    Inverse,
    Hidden,
    Strikethrough,
    /// 21: bold off
    NotBold,
    /// 22: neither bold nor faint
    NormalIntensity,
    NotItalic,
    NotUnderlined,
    NotBlinking,
    NotInverse,
    NotHidden,
    NotStrikethrough,
    Foreground(Color),
    Background(Color),
}

impl SgrAttribute {
    /// Apply to the attributes used for newly written cells
    pub fn apply(self, attrs: &mut CellAttrs) {
        match self {
            SgrAttribute::Reset => attrs.reset(),
            SgrAttribute::Bold => attrs.style.bold = true,
            SgrAttribute::Faint => attrs.style.faint = true,
            SgrAttribute::Italic => attrs.style.italic = true,
            SgrAttribute::Underline => attrs.style.underline = true,
            SgrAttribute::Blink => attrs.style.blink = true,
            SgrAttribute::Inverse => attrs.style.inverse = true,
            SgrAttribute::Hidden => attrs.style.hidden = true,
            SgrAttribute::Strikethrough => attrs.style.strikethrough = true,
            SgrAttribute::NotBold => attrs.style.bold = false,
            SgrAttribute::NormalIntensity => {
                attrs.style.bold = false;
                attrs.style.faint = false;
            }
            SgrAttribute::NotItalic => attrs.style.italic = false,
            SgrAttribute::NotUnderlined => attrs.style.underline = false,
            SgrAttribute::NotBlinking => attrs.style.blink = false,
            SgrAttribute::NotInverse => attrs.style.inverse = false,
            SgrAttribute::NotHidden => attrs.style.hidden = false,
            SgrAttribute::NotStrikethrough => attrs.style.strikethrough = false,
            SgrAttribute::Foreground(color) => attrs.fg = color,
            SgrAttribute::Background(color) => attrs.bg = color,
        }
    }
}

/// Decode an SGR parameter list. An empty list means reset.
pub fn parse_sgr(params: &Params) -> Vec<SgrAttribute> {
    if params.is_empty() {
        return vec![SgrAttribute::Reset];
    }

    let values: Vec<u16> = params.iter().collect();
    let mut attrs = Vec::with_capacity(values.len());
    let mut i = 0;

    while i < values.len() {
        let param = values[i];
        let attr = match param {
            0 => Some(SgrAttribute::Reset),
            1 => Some(SgrAttribute::Bold),
            2 => Some(SgrAttribute::Faint),
            3 => Some(SgrAttribute::Italic),
            4 => Some(SgrAttribute::Underline),
            5 | 6 => Some(SgrAttribute::Blink),
            7 => Some(SgrAttribute::Inverse),
            8 => Some(SgrAttribute::Hidden),
            9 => Some(SgrAttribute::Strikethrough),
            21 => Some(SgrAttribute::NotBold),
            22 => Some(SgrAttribute::NormalIntensity),
            23 => Some(SgrAttribute::NotItalic),
            24 => Some(SgrAttribute::NotUnderlined),
            25 => Some(SgrAttribute::NotBlinking),
            27 => Some(SgrAttribute::NotInverse),
            28 => Some(SgrAttribute::NotHidden),
            29 => Some(SgrAttribute::NotStrikethrough),
            30..=37 => Some(SgrAttribute::Foreground(Color::Indexed((param - 30) as u8))),
            39 => Some(SgrAttribute::Foreground(Color::Default)),
            40..=47 => Some(SgrAttribute::Background(Color::Indexed((param - 40) as u8))),
            49 => Some(SgrAttribute::Background(Color::Default)),
            90..=97 => Some(SgrAttribute::Foreground(Color::Indexed((param - 90 + 8) as u8))),
            100..=107 => Some(SgrAttribute::Background(Color::Indexed(
                (param - 100 + 8) as u8,
            ))),
            38 | 48 => {
                let subparams = params.subparams(i);
                let color = if subparams.is_empty() {
                    match extended_color(&values[i + 1..]) {
                        Some((color, used)) => {
                            i += used;
                            Some(color)
                        }
                        None => {
                            // Incomplete: the rest of the list belongs to it
                            i = values.len();
                            None
                        }
                    }
                } else {
                    colon_color(subparams)
                };
                color.map(|c| {
                    if param == 38 {
                        SgrAttribute::Foreground(c)
                    } else {
                        SgrAttribute::Background(c)
                    }
                })
            }
            _ => {
                tracing::trace!(param, "unknown SGR parameter");
                None
            }
        };
        attrs.extend(attr);
        i += 1;
    }

    attrs
}

/// Semicolon form. Returns the colour and how many parameters it used.
fn extended_color(rest: &[u16]) -> Option<(Color, usize)> {
    match rest {
        [5, n, ..] => Some((Color::Indexed(clamp_u8(*n)), 2)),
        [2, r, g, b, ..] => Some((Color::Rgb(clamp_u8(*r), clamp_u8(*g), clamp_u8(*b)), 4)),
        _ => None,
    }
}

/// Colon form; the colour space id in `2:id:r:g:b` is skipped
fn colon_color(subparams: &[u16]) -> Option<Color> {
    match subparams {
        [5, n, ..] => Some(Color::Indexed(clamp_u8(*n))),
        [2, _, r, g, b, ..] | [2, r, g, b] => {
            Some(Color::Rgb(clamp_u8(*r), clamp_u8(*g), clamp_u8(*b)))
        }
        _ => None,
    }
}

fn clamp_u8(value: u16) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sgr(input: &str) -> Vec<SgrAttribute> {
        parse_sgr(&Params::parse(input.as_bytes()))
    }

    #[test]
    fn test_empty_is_reset() {
        assert_eq!(sgr(""), vec![SgrAttribute::Reset]);
    }

    #[test]
    fn test_basic_styles() {
        assert_eq!(
            sgr("1;3;4;22"),
            vec![
                SgrAttribute::Bold,
                SgrAttribute::Italic,
                SgrAttribute::Underline,
                SgrAttribute::NormalIntensity,
            ]
        );
    }

    #[test]
    fn test_standard_colors() {
        assert_eq!(
            sgr("31;44;91;103;39;49"),
            vec![
                SgrAttribute::Foreground(Color::RED),
                SgrAttribute::Background(Color::BLUE),
                SgrAttribute::Foreground(Color::Indexed(9)),
                SgrAttribute::Background(Color::Indexed(11)),
                SgrAttribute::Foreground(Color::Default),
                SgrAttribute::Background(Color::Default),
            ]
        );
    }

    #[test]
    fn test_256_and_truecolor() {
        assert_eq!(
            sgr("38;5;196;48;2;10;20;30;1"),
            vec![
                SgrAttribute::Foreground(Color::Indexed(196)),
                SgrAttribute::Background(Color::Rgb(10, 20, 30)),
                SgrAttribute::Bold,
            ]
        );
    }

    #[test]
    fn test_colon_forms() {
        assert_eq!(
            sgr("38:2::255:128:0;48:5:17;4"),
            vec![
                SgrAttribute::Foreground(Color::Rgb(255, 128, 0)),
                SgrAttribute::Background(Color::Indexed(17)),
                SgrAttribute::Underline,
            ]
        );
        assert_eq!(
            sgr("38:2:1:2:3"),
            vec![SgrAttribute::Foreground(Color::Rgb(1, 2, 3))]
        );
    }

    #[test]
    fn test_incomplete_extended_color() {
        assert_eq!(sgr("1;38;2;10"), vec![SgrAttribute::Bold]);
        assert_eq!(sgr("38;5;300"), vec![SgrAttribute::Foreground(Color::Indexed(255))]);
    }

    #[test]
    fn test_apply() {
        let mut attrs = CellAttrs::default();
        for attr in sgr("1;7;31") {
            attr.apply(&mut attrs);
        }
        assert!(attrs.style.bold);
        assert!(attrs.style.inverse);
        assert_eq!(attrs.fg, Color::RED);

        SgrAttribute::Reset.apply(&mut attrs);
        assert_eq!(attrs, CellAttrs::default());
    }
}
