//! CSI parameter collection
//!
//! Parameters are accumulated one byte at a time as the parser sees them.
//! `;` separates parameters, `:` attaches a sub-parameter to the current
//! one. Values saturate at 65535 and parameters past the 32nd are dropped.

/// Maximum number of parameters we'll track
const MAX_PARAMS: usize = 32;
/// Maximum sub-parameters per parameter
const MAX_SUBPARAMS: usize = 8;

/// CSI parameters
#[derive(Debug, Clone, Default)]
pub struct Params {
    /// Parameter values (0 means default/unspecified)
    values: Vec<u16>,
    /// Colon-separated values following each parameter
    subparams: Vec<Vec<u16>>,
    current: u16,
    started: bool,
    in_subparam: bool,
    full: bool,
}

impl Params {
    /// Create empty params
    pub fn new() -> Self {
        Self::default()
    }

    /// Create params from a slice
    pub fn from_slice(values: &[u16]) -> Self {
        Self {
            values: values.iter().copied().take(MAX_PARAMS).collect(),
            subparams: vec![Vec::new(); values.len().min(MAX_PARAMS)],
            ..Self::default()
        }
    }

    /// Parse a complete parameter string such as `1;38:2:10:20:30`
    pub fn parse(bytes: &[u8]) -> Self {
        let mut params = Self::new();
        for &byte in bytes {
            params.push(byte);
        }
        params.finish();
        params
    }

    /// Feed one parameter byte (`0-9`, `;` or `:`)
    pub(crate) fn push(&mut self, byte: u8) {
        self.started = true;
        match byte {
            b'0'..=b'9' => {
                self.current = self
                    .current
                    .saturating_mul(10)
                    .saturating_add(u16::from(byte - b'0'));
            }
            b';' => {
                self.commit();
                self.in_subparam = false;
            }
            b':' => {
                self.commit();
                self.in_subparam = true;
            }
            _ => {}
        }
    }

    /// Close the parameter list at the final byte
    pub(crate) fn finish(&mut self) {
        if self.started {
            self.commit();
            self.started = false;
        }
        self.in_subparam = false;
    }

    fn commit(&mut self) {
        let value = std::mem::take(&mut self.current);
        if self.in_subparam {
            if self.full {
                return;
            }
            if let Some(last) = self.subparams.last_mut() {
                if last.len() < MAX_SUBPARAMS {
                    last.push(value);
                }
            }
        } else if self.values.len() < MAX_PARAMS {
            self.values.push(value);
            self.subparams.push(Vec::new());
        } else {
            self.full = true;
        }
    }

    /// Parameter at index, `None` if missing or 0
    pub fn get(&self, index: usize) -> Option<u16> {
        self.values.get(index).copied().filter(|&v| v != 0)
    }

    /// Parameter at index with default value
    pub fn get_or(&self, index: usize, default: u16) -> u16 {
        self.get(index).unwrap_or(default)
    }

    /// Raw value at index (0 if not present)
    pub fn raw(&self, index: usize) -> u16 {
        self.values.get(index).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sub-parameters of the parameter at index
    pub fn subparams(&self, index: usize) -> &[u16] {
        self.subparams.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.values.iter().copied()
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.subparams == other.subparams
    }
}

impl Eq for Params {}
