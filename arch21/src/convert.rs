//!
//! # Document Import & Export
//!
//! Converts between [Module]s and their serializable [ModuleDoc]s.
//! The two differ mainly in how they refer to components:
//! in-memory [ComponentKey]s versus names.
//!
//! Import runs every item back through the [Module]'s checked operations,
//! so documents are held to exactly the same rules as programmatic construction.
//!

// Std-Lib
use std::collections::HashMap;

// Crates.io
use log::trace;

// Local imports
use crate::data::{
    ComponentDoc, ConnectionDoc, ModuleDoc, OrderedMap, PinRangeDoc, PortDoc, ReferenceDoc,
};
use crate::utils::{ErrorContext, ErrorHelper, Unwrapper};
use crate::{
    ArchConfig, ArchError, ArchResult, Component, ComponentKey, Connection, Module, PinPath,
    PinRange, Port,
};

/// # Document Exporter
#[derive(Debug)]
pub(crate) struct Exporter<'m> {
    module: &'m Module,
    ctx_stack: Vec<ErrorContext>,
}
impl<'m> Exporter<'m> {
    pub(crate) fn export(module: &'m Module) -> ArchResult<ModuleDoc> {
        Self {
            module,
            ctx_stack: Vec::new(),
        }
        .export_module()
    }
    fn export_module(&mut self) -> ArchResult<ModuleDoc> {
        let module = self.module;
        self.ctx_stack
            .push(ErrorContext::Module(module.name().to_string()));
        let mut components = OrderedMap::new();
        for (_, comp) in module.components() {
            components.insert(comp.name(), self.export_component(comp)?);
        }
        self.ctx_stack.pop();
        Ok(ModuleDoc {
            name: module.name().to_string(),
            components,
        })
    }
    fn export_component(&mut self, comp: &Component) -> ArchResult<ComponentDoc> {
        trace!("exporting component \"{}\"", comp.name());
        self.ctx_stack
            .push(ErrorContext::Component(comp.name().to_string()));
        let mut doc = ComponentDoc {
            class: comp.class(),
            ..Default::default()
        };
        for port in comp.ports() {
            doc.ports.insert(
                port.name.clone(),
                PortDoc {
                    kind: port.kind,
                    n_pins: port.n_pins,
                    class: port.class,
                },
            );
        }
        for r in comp.references() {
            self.ctx_stack
                .push(ErrorContext::Reference(r.alias().to_string()));
            let def = self
                .module
                .get(r.component())
                .unwrapper(&*self, "reference to a component outside this module")?;
            doc.references.insert(
                r.alias(),
                ReferenceDoc {
                    component: def.name().to_string(),
                    n_instances: r.n_instances(),
                },
            );
            self.ctx_stack.pop();
        }
        doc.connections = comp.connections().iter().map(export_connection).collect();
        self.ctx_stack.pop();
        Ok(doc)
    }
}
impl ErrorHelper for Exporter<'_> {
    type Error = ArchError;
    fn err(&self, msg: impl Into<String>) -> ArchError {
        ArchError::Export {
            message: msg.into(),
            stack: self.ctx_stack.clone(),
        }
    }
}
fn export_connection(conn: &Connection) -> ConnectionDoc {
    ConnectionDoc {
        kind: conn.kind(),
        sources: conn.sources().iter().map(export_pins).collect(),
        sinks: conn.sinks().iter().map(export_pins).collect(),
    }
}
fn export_pins(pins: &PinRange) -> PinRangeDoc {
    match &pins.range {
        None => PinRangeDoc::Path(pins.path.to_string()),
        Some(r) => PinRangeDoc::Range {
            path: pins.path.to_string(),
            start: r.start,
            end: r.end,
        },
    }
}

/// # Document Importer
///
/// Adds every component, then every reference, then every connection,
/// so documents may refer to components defined after their use.
#[derive(Debug)]
pub(crate) struct Importer {
    module: Module,
    keys: HashMap<String, ComponentKey>,
    ctx_stack: Vec<ErrorContext>,
}
impl Importer {
    pub(crate) fn import(doc: &ModuleDoc, config: ArchConfig) -> ArchResult<Module> {
        let mut this = Self {
            module: Module::with_config(doc.name.clone(), config),
            keys: HashMap::new(),
            ctx_stack: Vec::new(),
        };
        this.import_module(doc)?;
        Ok(this.module)
    }
    fn import_module(&mut self, doc: &ModuleDoc) -> ArchResult<()> {
        self.ctx_stack.push(ErrorContext::Module(doc.name.clone()));
        for (name, cdoc) in doc.components.iter() {
            self.ctx_stack.push(ErrorContext::Component(name.clone()));
            self.import_ports(name, cdoc)?;
            self.ctx_stack.pop();
        }
        for (name, cdoc) in doc.components.iter() {
            self.ctx_stack.push(ErrorContext::Component(name.clone()));
            self.import_references(name, cdoc)?;
            self.ctx_stack.pop();
        }
        for (name, cdoc) in doc.components.iter() {
            self.ctx_stack.push(ErrorContext::Component(name.clone()));
            let key = self.key(name)?;
            for (idx, conn) in cdoc.connections.iter().enumerate() {
                self.ctx_stack.push(ErrorContext::Connection(idx));
                self.import_connection(key, conn)?;
                self.ctx_stack.pop();
            }
            self.ctx_stack.pop();
        }
        self.ctx_stack.pop();
        Ok(())
    }
    /// Create component `name`, with its class and ports
    fn import_ports(&mut self, name: &str, cdoc: &ComponentDoc) -> ArchResult<()> {
        trace!("importing component \"{}\"", name);
        let mut template = Component::new(name);
        template.class = cdoc.class;
        let added = self.module.add_component(&template);
        let key = self.check(added)?;
        self.keys.insert(name.to_string(), key);
        for (pname, pdoc) in cdoc.ports.iter() {
            self.ctx_stack.push(ErrorContext::Port(pname.clone()));
            let port = Port {
                name: pname.clone(),
                kind: pdoc.kind,
                n_pins: pdoc.n_pins,
                class: pdoc.class,
            };
            let added = self.module.add_port(key, port);
            self.check(added)?;
            self.ctx_stack.pop();
        }
        Ok(())
    }
    fn import_references(&mut self, name: &str, cdoc: &ComponentDoc) -> ArchResult<()> {
        let owner = self.key(name)?;
        for (alias, rdoc) in cdoc.references.iter() {
            self.ctx_stack.push(ErrorContext::Reference(alias.clone()));
            let def = self.key(&rdoc.component)?;
            let added =
                self.module
                    .add_reference(owner, def, Some(alias.as_str()), rdoc.n_instances);
            self.check(added)?;
            self.ctx_stack.pop();
        }
        Ok(())
    }
    fn import_connection(&mut self, owner: ComponentKey, conn: &ConnectionDoc) -> ArchResult<()> {
        let mut sources = Vec::with_capacity(conn.sources.len());
        for (idx, pdoc) in conn.sources.iter().enumerate() {
            self.ctx_stack.push(ErrorContext::Source(idx));
            sources.push(self.import_pins(pdoc)?);
            self.ctx_stack.pop();
        }
        let mut sinks = Vec::with_capacity(conn.sinks.len());
        for (idx, pdoc) in conn.sinks.iter().enumerate() {
            self.ctx_stack.push(ErrorContext::Sink(idx));
            sinks.push(self.import_pins(pdoc)?);
            self.ctx_stack.pop();
        }
        let added = self
            .module
            .add_connection(owner, conn.kind, &sources, &sinks);
        self.check(added)?;
        Ok(())
    }
    fn import_pins(&self, pdoc: &PinRangeDoc) -> ArchResult<PinRange> {
        let pins = match pdoc {
            PinRangeDoc::Path(txt) => txt.parse::<PinRange>(),
            PinRangeDoc::Range { path, start, end } => path
                .parse::<PinPath>()
                .and_then(|path| PinRange::new(path, *start..*end)),
        };
        self.check(pins)
    }
    /// Get the key of component `name`
    fn key(&self, name: &str) -> ArchResult<ComponentKey> {
        let key = self.keys.get(name).copied();
        self.unwrap(key, format!("component \"{}\" is not defined", name))
    }
    /// Attach our context to any model error in `res`
    fn check<T>(&self, res: ArchResult<T>) -> ArchResult<T> {
        res.map_err(|e| ArchError::Decode {
            message: e.to_string(),
            stack: self.ctx_stack.clone(),
            cause: Some(Box::new(e)),
        })
    }
}
impl ErrorHelper for Importer {
    type Error = ArchError;
    fn err(&self, msg: impl Into<String>) -> ArchError {
        ArchError::Decode {
            message: msg.into(),
            stack: self.ctx_stack.clone(),
            cause: None,
        }
    }
}
