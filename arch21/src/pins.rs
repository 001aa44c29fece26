//!
//! # Pin Paths & Ranges
//!
//! Addresses of the pins a [crate::Connection] wires together.
//!
//! Textual forms:
//!
//! | Text | Meaning |
//! |---|---|
//! | `port` | a port of the owning component |
//! | `alias.port` | a port on every instance of reference `alias` |
//! | `alias[2].port` | a port on instance 2 of reference `alias` |
//! | `...[3]` | bit 3 of any of the above |
//! | `...[0:4]` | bits `[0, 4)` of any of the above |
//!

// Std-Lib
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

// Local imports
use crate::{validate_name, ArchError, ArchResult};

/// # Instance Selector
/// Reference alias, plus an optional index into an arrayed reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceSelector {
    pub alias: String,
    pub index: Option<usize>,
}
impl fmt::Display for InstanceSelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.index {
            Some(idx) => write!(f, "{}[{}]", self.alias, idx),
            None => write!(f, "{}", self.alias),
        }
    }
}
impl FromStr for InstanceSelector {
    type Err = ArchError;
    fn from_str(txt: &str) -> ArchResult<Self> {
        let (alias, index) = match split_suffix(txt)? {
            (alias, Some(idx)) => (alias, Some(parse_index(txt, idx)?)),
            (alias, None) => (alias, None),
        };
        validate_name("reference", alias)?;
        Ok(Self {
            alias: alias.to_string(),
            index,
        })
    }
}

///
/// # Pin Path
///
/// Names a port, either of the owning component, or through one of its references.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinPath {
    /// Reference through which the port is reached. `None` for the owner's own ports.
    pub reference: Option<InstanceSelector>,
    /// Port name
    pub port: String,
}
impl PinPath {
    /// Path to the owner's own port `port`
    pub fn port(port: impl Into<String>) -> Self {
        Self {
            reference: None,
            port: port.into(),
        }
    }
    /// Path to `port` on every instance of reference `alias`
    pub fn on(alias: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            reference: Some(InstanceSelector {
                alias: alias.into(),
                index: None,
            }),
            port: port.into(),
        }
    }
    /// Path to `port` on instance `index` of reference `alias`
    pub fn at(alias: impl Into<String>, index: usize, port: impl Into<String>) -> Self {
        Self {
            reference: Some(InstanceSelector {
                alias: alias.into(),
                index: Some(index),
            }),
            port: port.into(),
        }
    }
    /// Alias of our reference, if we have one
    pub fn alias(&self) -> Option<&str> {
        self.reference.as_ref().map(|r| r.alias.as_str())
    }
}
impl fmt::Display for PinPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.reference {
            Some(r) => write!(f, "{}.{}", r, self.port),
            None => write!(f, "{}", self.port),
        }
    }
}
impl FromStr for PinPath {
    type Err = ArchError;
    fn from_str(txt: &str) -> ArchResult<Self> {
        let parts: Vec<&str> = txt.split('.').collect();
        let (reference, port) = match parts.as_slice() {
            [port] => (None, *port),
            [inst, port] => (Some(inst.parse::<InstanceSelector>()?), *port),
            _ => {
                return Err(ArchError::value(format!(
                    "invalid pin path \"{}\": expected `port`, `alias.port` or `alias[index].port`",
                    txt
                )))
            }
        };
        validate_name("port", port)?;
        Ok(Self {
            reference,
            port: port.to_string(),
        })
    }
}

///
/// # Pin Range
///
/// A contiguous slice `[start, end)` of the pins named by a [PinPath].
/// An absent `range` selects the whole port.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinRange {
    pub path: PinPath,
    pub range: Option<Range<usize>>,
}
impl PinRange {
    /// Create a [PinRange] over pins `range` of `path`.
    /// Fails if `range.start > range.end`.
    pub fn new(path: PinPath, range: Range<usize>) -> ArchResult<Self> {
        let this = Self {
            path,
            range: Some(range),
        };
        this.check_order()?;
        Ok(this)
    }
    /// Create a single-bit [PinRange]
    pub fn bit(path: PinPath, bit: usize) -> ArchResult<Self> {
        let end = bit
            .checked_add(1)
            .ok_or_else(|| ArchError::Range(format!("bit index {} of \"{}\" is too large", bit, path)))?;
        Ok(Self {
            path,
            range: Some(bit..end),
        })
    }
    fn check_order(&self) -> ArchResult<()> {
        match &self.range {
            Some(r) if r.start > r.end => Err(ArchError::Range(format!(
                "invalid pin range \"{}\": start {} is beyond end {}",
                self, r.start, r.end
            ))),
            _ => Ok(()),
        }
    }
    /// Check we fit within a port of width `n_pins`
    pub fn check_bounds(&self, n_pins: usize) -> ArchResult<()> {
        self.check_order()?;
        match &self.range {
            Some(r) if r.end > n_pins => Err(ArchError::Range(format!(
                "pin range \"{}\" exceeds the {}-pin width of port \"{}\"",
                self, n_pins, self.path.port
            ))),
            _ => Ok(()),
        }
    }
    /// Our pins, on a port of width `n_pins`
    pub fn bits(&self, n_pins: usize) -> Range<usize> {
        self.range.clone().unwrap_or(0..n_pins)
    }
}
impl From<PinPath> for PinRange {
    fn from(path: PinPath) -> Self {
        Self { path, range: None }
    }
}
impl fmt::Display for PinRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.range {
            Some(r) => write!(f, "{}[{}:{}]", self.path, r.start, r.end),
            None => write!(f, "{}", self.path),
        }
    }
}
impl FromStr for PinRange {
    type Err = ArchError;
    fn from_str(txt: &str) -> ArchResult<Self> {
        let (path, suffix) = split_suffix(txt)?;
        let path: PinPath = path.parse()?;
        let suffix = match suffix {
            None => return Ok(path.into()),
            Some(s) => s,
        };
        match suffix.split_once(':') {
            Some((start, end)) => {
                let start = parse_index(txt, start)?;
                let end = parse_index(txt, end)?;
                PinRange::new(path, start..end)
            }
            None => {
                let bit = parse_index(txt, suffix)?;
                PinRange::bit(path, bit)
            }
        }
    }
}

/// Split a trailing `[...]` suffix from `txt`, if it has one.
/// Only a suffix after the last `.` counts, so `a[1].p` has none.
fn split_suffix(txt: &str) -> ArchResult<(&str, Option<&str>)> {
    let last = match txt.rsplit_once('.') {
        Some((_, last)) => last,
        None => txt,
    };
    if !last.ends_with(']') {
        return Ok((txt, None));
    }
    let body = &txt[..txt.len() - 1];
    match body.rfind('[') {
        Some(open) if open >= txt.len() - last.len() => Ok((&body[..open], Some(&body[open + 1..]))),
        _ => Err(ArchError::value(format!("unbalanced brackets in \"{}\"", txt))),
    }
}

fn parse_index(txt: &str, idx: &str) -> ArchResult<usize> {
    idx.trim()
        .parse::<usize>()
        .map_err(|_| ArchError::value(format!("invalid index \"{}\" in \"{}\"", idx, txt)))
}
