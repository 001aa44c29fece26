//!
//! # Arch21 Hierarchical Architecture Netlists
//!
//! Structural models of hardware architectures:
//! [Component]s made of [Port]s, instances of other components ([ComponentRef]s),
//! and typed [Connection]s between groups of pins.
//!
//! All of a design's components live in a [Module], which owns them,
//! performs every structural check as items are added,
//! and round-trips through JSON, YAML and TOML documents (see [data]).
//!
//! ```rust
//! use arch21::{Module, Component, Port, PortKind, ConnectionKind, PinRange};
//!
//! let mut m = Module::new("fabric");
//! let lut = m.add_component(&Component::new("lut2"))?;
//! m.edit(lut)?
//!     .add_port(Port::new("in", PortKind::Input).with_pins(2))?
//!     .add_port(Port::new("out", PortKind::Output))?;
//! let top = m.add_component(&Component::new("top"))?;
//! m.edit(top)?
//!     .add_port(Port::new("a", PortKind::Input).with_pins(2))?
//!     .add_port(Port::new("y", PortKind::Output))?
//!     .add_reference(lut, None, 1)?
//!     .connect("a".parse()?, "lut2.in".parse()?)?
//!     .add_connection(ConnectionKind::Direct, &["lut2.out".parse::<PinRange>()?], &["y".parse::<PinRange>()?])?;
//! assert_eq!(m.component(top)?.connections().len(), 2);
//! # Ok::<(), arch21::ArchError>(())
//! ```
//!

// Crates.io
use slotmap::new_key_type;

// Internal modules & re-exports
pub use arch21utils as utils;

pub mod error;
pub use error::*;

pub mod config;
pub use config::*;

pub mod port;
pub use port::*;

pub mod pins;
pub use pins::*;

pub mod reference;
pub use reference::*;

pub mod connection;
pub use connection::*;

pub mod component;
pub use component::*;

pub mod module;
pub use module::*;

pub mod data;
mod convert;

#[cfg(test)]
mod tests;

new_key_type! {
    /// Keys for [Component] entries in a [Module]
    pub struct ComponentKey;
}
