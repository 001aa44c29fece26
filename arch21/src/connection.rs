//!
//! # Connections
//!
//! The connection algebra: which combinations of sources and sinks each
//! [ConnectionKind] accepts, and how their widths must agree.
//! Pin ranges are resolved to widths by the owning [crate::Module] before any of these checks run.
//!

// Std-Lib
use std::fmt;
use std::ops::Range;

// Local imports
use crate::utils::enumstr;
use crate::{ArchError, ArchResult, FanInPolicy, PinRange};

enumstr!(
    /// # Connection Kind
    ConnectionKind {
        Direct: "DIRECT" | "d",
        Concat: "CONCAT" | "cat",
        Mux: "MUX" | "m",
        Complete: "COMPLETE" | "c",
    }
);
impl ConnectionKind {
    /// Check the arity and width rules for sources of widths `sources`, and sinks of widths `sinks`.
    /// Sequences are most-significant first.
    pub fn check(&self, sources: &[usize], sinks: &[usize]) -> ArchResult<()> {
        let (n, m) = (sources.len(), sinks.len());
        let arity_ok = match self {
            Self::Direct => n == 1 && m == 1,
            Self::Concat | Self::Mux => n >= 2 && m == 1,
            Self::Complete => n >= 1 && m >= 1,
        };
        if !arity_ok {
            let expected = match self {
                Self::Direct => "exactly one source and one sink",
                Self::Concat | Self::Mux => "at least two sources and exactly one sink",
                Self::Complete => "at least one source and at least one sink",
            };
            return Err(ArchError::value(format!(
                "{} connection requires {}, found {} source(s) and {} sink(s)",
                self, expected, n, m
            )));
        }
        match self {
            Self::Direct if sources[0] != sinks[0] => Err(ArchError::WidthMismatch(format!(
                "DIRECT source width {} does not match sink width {}",
                sources[0], sinks[0]
            ))),
            Self::Concat => {
                let total = sources
                    .iter()
                    .try_fold(0usize, |acc, w| acc.checked_add(*w))
                    .ok_or_else(|| {
                        ArchError::Range(format!("CONCAT source widths {:?} overflow", sources))
                    })?;
                if total != sinks[0] {
                    return Err(ArchError::WidthMismatch(format!(
                        "CONCAT source widths {:?} sum to {}, sink width is {}",
                        sources, total, sinks[0]
                    )));
                }
                Ok(())
            }
            Self::Mux => match sources.iter().position(|w| *w != sinks[0]) {
                Some(idx) => Err(ArchError::WidthMismatch(format!(
                    "MUX source #{} width {} does not match sink width {}",
                    idx, sources[idx], sinks[0]
                ))),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

///
/// # Connection
///
/// A typed wiring rule from an ordered list of source [PinRange]s to an ordered list of sinks.
/// Only created by a [crate::Module], after its pins resolve and its widths satisfy its kind.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub(crate) kind: ConnectionKind,
    pub(crate) sources: Vec<PinRange>,
    pub(crate) sinks: Vec<PinRange>,
    pub(crate) source_widths: Vec<usize>,
    pub(crate) sink_widths: Vec<usize>,
}
impl Connection {
    pub fn kind(&self) -> ConnectionKind {
        self.kind
    }
    pub fn sources(&self) -> &[PinRange] {
        &self.sources
    }
    pub fn sinks(&self) -> &[PinRange] {
        &self.sinks
    }
    /// Resolved width of each source
    pub fn source_widths(&self) -> &[usize] {
        &self.source_widths
    }
    /// Resolved width of each sink
    pub fn sink_widths(&self) -> &[usize] {
        &self.sink_widths
    }
    /// The sink-relative pins driven by each source.
    /// For [ConnectionKind::Concat], the first source occupies the most-significant pins.
    /// Every other kind drives `0..width` from each source.
    pub fn source_slices(&self) -> Vec<Range<usize>> {
        match self.kind {
            ConnectionKind::Concat => {
                let mut hi: usize = self.source_widths.iter().sum();
                self.source_widths
                    .iter()
                    .map(|w| {
                        let slice = hi - w..hi;
                        hi -= w;
                        slice
                    })
                    .collect()
            }
            _ => self.source_widths.iter().map(|w| 0..*w).collect(),
        }
    }
    /// Whether any source or sink satisfies `pred`
    pub(crate) fn any_pin(&self, pred: impl Fn(&PinRange) -> bool) -> bool {
        self.sources.iter().chain(self.sinks.iter()).any(pred)
    }
    /// Apply `f` to every source and sink
    pub(crate) fn for_each_pin(&mut self, mut f: impl FnMut(&mut PinRange)) {
        self.sources.iter_mut().chain(self.sinks.iter_mut()).for_each(|p| f(p));
    }
}

/// # Resolved Pin Slice
///
/// Contiguous pins of a single port instance: the owner's own port when `instance` is `None`,
/// otherwise `port` on instance `(alias, index)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PinSlice {
    pub instance: Option<(String, usize)>,
    pub port: String,
    pub bits: Range<usize>,
}
impl PinSlice {
    /// Whether `self` and `other` drive any of the same pins, at the granularity of `policy`
    pub fn conflicts(&self, other: &PinSlice, policy: FanInPolicy) -> bool {
        if self.instance != other.instance || self.port != other.port {
            return false;
        }
        match policy {
            FanInPolicy::Port => true,
            FanInPolicy::Bit => self.bits.start < other.bits.end && other.bits.start < self.bits.end,
        }
    }
}
impl fmt::Display for PinSlice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some((alias, idx)) = &self.instance {
            write!(f, "{}[{}].", alias, idx)?;
        }
        write!(f, "{}[{}:{}]", self.port, self.bits.start, self.bits.end)
    }
}
