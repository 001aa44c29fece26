//!
//! # Ports
//!

// Std-Lib
use std::ops::Range;

// Local imports
use crate::utils::enumstr;
use crate::{ArchError, ArchResult, PinPath, PinRange};

enumstr!(
    /// # Port Direction
    PortKind {
        Input: "INPUT" | "in" | "i",
        Output: "OUTPUT" | "out" | "o",
    }
);
enumstr!(
    /// # Port Class
    ///
    /// Advisory tag naming a port's role for downstream tools.
    /// Never affects wiring checks.
    PortClass {
        Clock: "CLOCK" | "clk",
        LutIn: "LUT_IN",
        LutOut: "LUT_OUT",
        LatchIn: "LATCH_IN" | "ff_in",
        LatchOut: "LATCH_OUT" | "ff_out",
    }
);

///
/// # Port
///
/// A named, directed bit-vector terminal of a [crate::Component].
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    /// Port Name
    pub name: String,
    /// Direction
    pub kind: PortKind,
    /// Width, in bits
    pub n_pins: usize,
    /// Optional advisory class
    pub class: Option<PortClass>,
}
impl Port {
    /// Create a single-bit [Port]
    pub fn new(name: impl Into<String>, kind: PortKind) -> Self {
        Self {
            name: name.into(),
            kind,
            n_pins: 1,
            class: None,
        }
    }
    /// Set our width to `n_pins`. Consumes and returns `self` to enable chaining.
    pub fn with_pins(mut self, n_pins: usize) -> Self {
        self.n_pins = n_pins;
        self
    }
    /// Set our class. Consumes and returns `self` to enable chaining.
    pub fn with_class(mut self, class: PortClass) -> Self {
        self.class = Some(class);
        self
    }
    /// Check our name and width
    pub fn validate(&self) -> ArchResult<()> {
        validate_name("port", &self.name)?;
        if self.n_pins == 0 {
            return Err(ArchError::value(format!(
                "port \"{}\" must have at least one pin",
                self.name
            )));
        }
        Ok(())
    }
    /// Select pins `range` of this port, as a [PinRange] on the owner's own port
    pub fn select(&self, range: Range<usize>) -> ArchResult<PinRange> {
        let pins = PinRange::new(PinPath::port(&self.name), range)?;
        pins.check_bounds(self.n_pins)?;
        Ok(pins)
    }
    /// Select all pins of this port
    pub fn pins(&self) -> PinRange {
        PinRange::from(PinPath::port(&self.name))
    }
}

/// Check `name` is usable as a port, reference-alias or component name.
/// Names must be non-empty, and must not contain path punctuation `.`, `[` or `]`.
pub fn validate_name(kind: &str, name: &str) -> ArchResult<()> {
    if name.is_empty() {
        return Err(ArchError::value(format!("{} name must not be empty", kind)));
    }
    if let Some(c) = name.chars().find(|c| matches!(c, '.' | '[' | ']')) {
        return Err(ArchError::value(format!(
            "invalid {} name \"{}\": contains '{}'",
            kind, name, c
        )));
    }
    Ok(())
}
