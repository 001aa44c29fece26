//!
//! # Components
//!

// Local imports
use crate::utils::enumstr;
use crate::{validate_name, ArchError, ArchResult, ComponentRef, Connection, Port};

enumstr!(
    /// # Component Class
    ComponentClass {
        Lut: "LUT",
        Latch: "LATCH" | "ff",
    }
);

///
/// # Component
///
/// A named definition owning [Port]s, [ComponentRef]s to other definitions, and [Connection]s among them.
/// Ports and reference aliases share a single namespace.
///
/// Standalone [Component]s serve as templates for [crate::Module::add_component],
/// which copies them into the module and re-checks each of their items.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub(crate) name: String,
    pub(crate) class: Option<ComponentClass>,
    pub(crate) ports: Vec<Port>,
    pub(crate) references: Vec<ComponentRef>,
    pub(crate) connections: Vec<Connection>,
}
impl Component {
    /// Create a new and empty [Component]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: None,
            ports: Vec::new(),
            references: Vec::new(),
            connections: Vec::new(),
        }
    }
    /// Set our name, typically on a template copied from an existing component.
    /// Consumes and returns `self` to enable chaining.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
    /// Set our class. Consumes and returns `self` to enable chaining.
    pub fn with_class(mut self, class: ComponentClass) -> Self {
        self.class = Some(class);
        self
    }
    /// Add a [Port] to a template. Consumes and returns `self` to enable chaining.
    pub fn with_port(mut self, port: Port) -> ArchResult<Self> {
        self.add_port(port)?;
        Ok(self)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn class(&self) -> Option<ComponentClass> {
        self.class
    }
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }
    pub fn references(&self) -> &[ComponentRef] {
        &self.references
    }
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }
    /// Get the [Port] named `name`
    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }
    /// Get the [ComponentRef] with alias `alias`
    pub fn reference(&self, alias: &str) -> Option<&ComponentRef> {
        self.references.iter().find(|r| r.alias == alias)
    }
    /// Add a [Port], checking its name, width and uniqueness
    pub fn add_port(&mut self, port: Port) -> ArchResult<()> {
        port.validate()?;
        self.check_free(&port.name)?;
        self.ports.push(port);
        Ok(())
    }
    /// Fail if `name` is taken by a port or reference alias
    pub(crate) fn check_free(&self, name: &str) -> ArchResult<()> {
        let kind = if self.port(name).is_some() {
            "port"
        } else if self.reference(name).is_some() {
            "reference"
        } else {
            return Ok(());
        };
        Err(ArchError::DuplicateName {
            kind,
            name: name.to_string(),
            scope: format!("component \"{}\"", self.name),
        })
    }
    /// Check `name` is valid and free for a new port or reference
    pub(crate) fn check_new_name(&self, kind: &str, name: &str) -> ArchResult<()> {
        validate_name(kind, name)?;
        self.check_free(name)
    }
}
