//!
//! # Modules
//!
//! The top-level namespace of [Component]s, and home of every check which spans more than one of them:
//! instancing cycles, pin resolution through references, and multiple drivers.
//!

// Std-Lib
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

// Crates.io
use log::debug;
use slotmap::SlotMap;

// Local imports
use crate::connection::PinSlice;
use crate::convert::{Exporter, Importer};
use crate::data::ModuleDoc;
use crate::utils::{self, DepOrder, DepOrderer, SerializationFormat};
use crate::{
    validate_name, ArchConfig, ArchError, ArchResult, Component, ComponentClass, ComponentKey,
    ComponentRef, Connection, ConnectionKind, PinRange, Port,
};

/// # Module Identifier
/// Unique per [Module] instance, including clones.
/// Tags each [ComponentRef] with the module whose keys it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(u64);
impl ModuleId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

///
/// # Module
///
/// Owns a set of [Component]s, in insertion order, keyed by [ComponentKey].
/// All mutation runs through the checked operations here,
/// each of which either succeeds completely or leaves the module unchanged.
/// A [Module] is therefore always valid, and always serializable.
///
#[derive(Debug)]
pub struct Module {
    id: ModuleId,
    name: String,
    config: ArchConfig,
    components: SlotMap<ComponentKey, Component>,
    order: Vec<ComponentKey>,
    names: HashMap<String, ComponentKey>,
}
impl Module {
    /// Create a new and empty [Module], with the default [ArchConfig]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, ArchConfig::default())
    }
    /// Create a new and empty [Module] checked according to `config`
    pub fn with_config(name: impl Into<String>, config: ArchConfig) -> Self {
        Self {
            id: ModuleId::next(),
            name: name.into(),
            config,
            components: SlotMap::with_key(),
            order: Vec::new(),
            names: HashMap::new(),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn id(&self) -> ModuleId {
        self.id
    }
    /// Set our name. Module names are free-form, and may be empty.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        debug!("renamed module \"{}\" to \"{}\"", self.name, name);
        self.name = name;
    }
    pub fn config(&self) -> &ArchConfig {
        &self.config
    }
    /// Number of components
    pub fn len(&self) -> usize {
        self.order.len()
    }
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
    /// Get the [Component] at `key`, if it exists
    pub fn get(&self, key: ComponentKey) -> Option<&Component> {
        self.components.get(key)
    }
    /// Get the [Component] at `key`, or fail with [ArchError::UnresolvedReference]
    pub fn component(&self, key: ComponentKey) -> ArchResult<&Component> {
        self.components
            .get(key)
            .ok_or_else(|| self.unresolved_key(key))
    }
    fn component_mut(&mut self, key: ComponentKey) -> ArchResult<&mut Component> {
        if !self.components.contains_key(key) {
            return Err(self.unresolved_key(key));
        }
        Ok(&mut self.components[key])
    }
    fn unresolved_key(&self, key: ComponentKey) -> ArchError {
        ArchError::UnresolvedReference(format!(
            "component {:?} not found in module \"{}\"",
            key, self.name
        ))
    }
    /// Find the key of the component named `name`
    pub fn find(&self, name: &str) -> Option<ComponentKey> {
        self.names.get(name).copied()
    }
    /// Component keys, in insertion order
    pub fn keys(&self) -> impl Iterator<Item = ComponentKey> + '_ {
        self.order.iter().copied()
    }
    /// Components and their keys, in insertion order
    pub fn components(&self) -> impl Iterator<Item = (ComponentKey, &Component)> + '_ {
        self.order.iter().map(move |k| (*k, &self.components[*k]))
    }
    /// Get a short-lived [ComponentHandle] for chained edits of component `key`
    pub fn edit(&mut self, key: ComponentKey) -> ArchResult<ComponentHandle<'_>> {
        self.component(key)?;
        Ok(ComponentHandle { module: self, key })
    }

    /// Insert a copy of `template`.
    ///
    /// Its ports, references and connections are re-added through the checked operations.
    /// Template references must have been created in *this* module,
    /// typically by copying one of its components;
    /// references from any other module fail with [ArchError::UnresolvedReference].
    /// If any item fails, the new component is removed and the failure returned.
    pub fn add_component(&mut self, template: &Component) -> ArchResult<ComponentKey> {
        validate_name("component", &template.name)?;
        if self.names.contains_key(&template.name) {
            return Err(ArchError::DuplicateName {
                kind: "component",
                name: template.name.clone(),
                scope: format!("module \"{}\"", self.name),
            });
        }
        let mut comp = Component::new(template.name.clone());
        comp.class = template.class;
        let key = self.components.insert(comp);
        self.order.push(key);
        self.names.insert(template.name.clone(), key);

        if let Err(e) = self.replay(key, template) {
            self.discard(key);
            return Err(e);
        }
        debug!(
            "added component \"{}\" to module \"{}\"",
            template.name, self.name
        );
        Ok(key)
    }
    fn replay(&mut self, key: ComponentKey, template: &Component) -> ArchResult<()> {
        for port in template.ports.iter() {
            self.add_port(key, port.clone())?;
        }
        for r in template.references.iter() {
            if r.module != self.id {
                return Err(ArchError::UnresolvedReference(format!(
                    "reference \"{}\" of template \"{}\" names a component of another module",
                    r.alias, template.name
                )));
            }
            self.add_reference(key, r.component, Some(&r.alias), r.n_instances)?;
        }
        for c in template.connections.iter() {
            self.add_connection(key, c.kind, &c.sources, &c.sinks)?;
        }
        Ok(())
    }
    /// Remove a component which nothing references
    fn discard(&mut self, key: ComponentKey) {
        if let Some(comp) = self.components.remove(key) {
            self.names.remove(&comp.name);
        }
        self.order.retain(|k| *k != key);
    }
    /// Set or clear the class of component `key`
    pub fn set_class(&mut self, key: ComponentKey, class: Option<ComponentClass>) -> ArchResult<()> {
        self.component_mut(key)?.class = class;
        Ok(())
    }
    /// Add `port` to component `owner`
    pub fn add_port(&mut self, owner: ComponentKey, port: Port) -> ArchResult<()> {
        let comp = self.component_mut(owner)?;
        let name = port.name.clone();
        comp.add_port(port)?;
        debug!("added port \"{}\" to component \"{}\"", name, comp.name);
        Ok(())
    }
    /// Add a reference to `component` inside `owner`, with `n_instances` instances.
    /// The alias defaults to the referenced component's name. Returns the resolved alias.
    pub fn add_reference(
        &mut self,
        owner: ComponentKey,
        component: ComponentKey,
        alias: Option<&str>,
        n_instances: usize,
    ) -> ArchResult<String> {
        let def = self.component(component)?;
        let owner_comp = self.component(owner)?;
        if n_instances == 0 {
            return Err(ArchError::value(format!(
                "reference to \"{}\" in \"{}\" must have at least one instance",
                def.name, owner_comp.name
            )));
        }
        let alias = alias.unwrap_or(&def.name).to_string();
        owner_comp.check_new_name("reference", &alias)?;
        if self.depends_on(component, owner)? {
            return Err(ArchError::CyclicReference {
                component: def.name.clone(),
                owner: owner_comp.name.clone(),
            });
        }
        debug!(
            "added reference \"{}\" ({} x \"{}\") to component \"{}\"",
            alias, n_instances, def.name, owner_comp.name
        );
        self.components[owner].references.push(ComponentRef {
            alias: alias.clone(),
            component,
            n_instances,
            module: self.id,
        });
        Ok(alias)
    }
    /// Whether component `from` is, or transitively instances, component `to`
    fn depends_on(&self, from: ComponentKey, to: ComponentKey) -> ArchResult<bool> {
        if from == to {
            return Ok(true);
        }
        Ok(Instancing(self).order(&[from])?.contains(&to))
    }
    /// All components, ordered such that each follows every component it references
    pub fn dependency_order(&self) -> ArchResult<Vec<ComponentKey>> {
        Instancing(self).order(&self.order)
    }
    /// Every `(owner, alias)` pair referencing component `key`
    pub fn instances_of(&self, key: ComponentKey) -> Vec<(ComponentKey, String)> {
        self.components()
            .flat_map(|(owner, comp)| {
                comp.references
                    .iter()
                    .filter(move |r| r.component == key)
                    .map(move |r| (owner, r.alias.clone()))
            })
            .collect()
    }

    /// Add a [Connection] of kind `kind` to component `owner`.
    ///
    /// Every pin range must resolve against `owner`, the widths must satisfy `kind`,
    /// and no sink may overlap another sink, whether of this or any existing connection,
    /// at the granularity of our [crate::FanInPolicy].
    /// Returns the new connection's index.
    pub fn add_connection(
        &mut self,
        owner: ComponentKey,
        kind: ConnectionKind,
        sources: &[PinRange],
        sinks: &[PinRange],
    ) -> ArchResult<usize> {
        let comp = self.component(owner)?;
        let policy = self.config.fan_in;

        let mut source_widths = Vec::with_capacity(sources.len());
        for pins in sources.iter() {
            source_widths.push(self.resolve(comp, pins)?.0);
        }
        let mut sink_widths = Vec::with_capacity(sinks.len());
        let mut driven: Vec<PinSlice> = Vec::new();
        for pins in sinks.iter() {
            let (width, slices) = self.resolve(comp, pins)?;
            sink_widths.push(width);
            driven.extend(slices);
        }
        kind.check(&source_widths, &sink_widths)?;

        for (idx, a) in driven.iter().enumerate() {
            if let Some(b) = driven[idx + 1..].iter().find(|b| a.conflicts(b, policy)) {
                return Err(ArchError::MultipleDriver(format!(
                    "pin \"{}\" is driven twice by a new {} connection in component \"{}\"",
                    b, kind, comp.name
                )));
            }
        }
        for existing in comp.connections.iter() {
            for pins in existing.sinks.iter() {
                let (_, slices) = self.resolve(comp, pins)?;
                for new in driven.iter() {
                    if slices.iter().any(|s| new.conflicts(s, policy)) {
                        return Err(ArchError::MultipleDriver(format!(
                            "pin \"{}\" is already driven in component \"{}\"",
                            new, comp.name
                        )));
                    }
                }
            }
        }

        let conn = Connection {
            kind,
            sources: sources.to_vec(),
            sinks: sinks.to_vec(),
            source_widths,
            sink_widths,
        };
        debug!("added {} connection to component \"{}\"", kind, comp.name);
        let comp = &mut self.components[owner];
        comp.connections.push(conn);
        Ok(comp.connections.len() - 1)
    }
    /// Add a [ConnectionKind::Direct] connection from `source` to `sink`
    pub fn connect(
        &mut self,
        owner: ComponentKey,
        source: PinRange,
        sink: PinRange,
    ) -> ArchResult<usize> {
        self.add_connection(owner, ConnectionKind::Direct, &[source], &[sink])
    }
    /// Resolve `pins` against component `owner`.
    /// Returns its total width, and the per-instance slices it covers.
    pub(crate) fn resolve(
        &self,
        owner: &Component,
        pins: &PinRange,
    ) -> ArchResult<(usize, Vec<PinSlice>)> {
        let sel = match &pins.path.reference {
            None => {
                let port = owner.port(&pins.path.port).ok_or_else(|| {
                    ArchError::UnresolvedReference(format!(
                        "port \"{}\" not found in component \"{}\"",
                        pins.path.port, owner.name
                    ))
                })?;
                pins.check_bounds(port.n_pins)?;
                let bits = pins.bits(port.n_pins);
                let slice = PinSlice {
                    instance: None,
                    port: port.name.clone(),
                    bits: bits.clone(),
                };
                return Ok((bits.len(), vec![slice]));
            }
            Some(sel) => sel,
        };
        let r = owner.reference(&sel.alias).ok_or_else(|| {
            ArchError::UnresolvedReference(format!(
                "reference \"{}\" not found in component \"{}\"",
                sel.alias, owner.name
            ))
        })?;
        let def = self.component(r.component)?;
        let port = def.port(&pins.path.port).ok_or_else(|| {
            ArchError::UnresolvedReference(format!(
                "port \"{}\" not found on reference \"{}\" to component \"{}\"",
                pins.path.port, r.alias, def.name
            ))
        })?;
        pins.check_bounds(port.n_pins)?;
        let bits = pins.bits(port.n_pins);
        let instances = match sel.index {
            Some(index) if index >= r.n_instances => {
                return Err(ArchError::IndexOutOfRange {
                    alias: r.alias.clone(),
                    index,
                    n_instances: r.n_instances,
                })
            }
            Some(index) => index..index + 1,
            None => 0..r.n_instances,
        };
        let slices: Vec<PinSlice> = instances
            .map(|idx| PinSlice {
                instance: Some((r.alias.clone(), idx)),
                port: port.name.clone(),
                bits: bits.clone(),
            })
            .collect();
        let width = bits.len().checked_mul(slices.len()).ok_or_else(|| {
            ArchError::Range(format!(
                "width of pin range \"{}\" across {} instances of \"{}\" overflows",
                pins,
                slices.len(),
                r.alias
            ))
        })?;
        Ok((width, slices))
    }

    /// Rename component `key`. Aliases of existing references to it are unchanged.
    pub fn rename_component(&mut self, key: ComponentKey, name: &str) -> ArchResult<()> {
        let old = self.component(key)?.name.clone();
        if old == name {
            return Ok(());
        }
        validate_name("component", name)?;
        if self.names.contains_key(name) {
            return Err(ArchError::DuplicateName {
                kind: "component",
                name: name.to_string(),
                scope: format!("module \"{}\"", self.name),
            });
        }
        self.names.remove(&old);
        self.names.insert(name.to_string(), key);
        self.components[key].name = name.to_string();
        debug!("renamed component \"{}\" to \"{}\"", old, name);
        Ok(())
    }
    /// Rename port `old` of component `owner` to `new`,
    /// rewriting connections to it in `owner` and in every component instancing `owner`.
    pub fn rename_port(&mut self, owner: ComponentKey, old: &str, new: &str) -> ArchResult<()> {
        let comp = self.component(owner)?;
        let idx = port_index(comp, old)?;
        if old == new {
            return Ok(());
        }
        comp.check_new_name("port", new)?;
        let instancers = self.instances_of(owner);

        let comp = &mut self.components[owner];
        comp.ports[idx].name = new.to_string();
        for conn in comp.connections.iter_mut() {
            conn.for_each_pin(|p| {
                if p.path.reference.is_none() && p.path.port == old {
                    p.path.port = new.to_string();
                }
            });
        }
        for (key, alias) in instancers {
            for conn in self.components[key].connections.iter_mut() {
                conn.for_each_pin(|p| {
                    if p.path.alias() == Some(alias.as_str()) && p.path.port == old {
                        p.path.port = new.to_string();
                    }
                });
            }
        }
        debug!("renamed port \"{}\" to \"{}\"", old, new);
        Ok(())
    }
    /// Rename reference `old` of component `owner` to `new`, rewriting `owner`'s connections through it
    pub fn rename_reference(&mut self, owner: ComponentKey, old: &str, new: &str) -> ArchResult<()> {
        let comp = self.component(owner)?;
        let idx = reference_index(comp, old)?;
        if old == new {
            return Ok(());
        }
        comp.check_new_name("reference", new)?;

        let comp = &mut self.components[owner];
        comp.references[idx].alias = new.to_string();
        for conn in comp.connections.iter_mut() {
            conn.for_each_pin(|p| {
                if let Some(sel) = p.path.reference.as_mut() {
                    if sel.alias == old {
                        sel.alias = new.to_string();
                    }
                }
            });
        }
        debug!("renamed reference \"{}\" to \"{}\"", old, new);
        Ok(())
    }
    /// Remove port `name` from component `owner`.
    /// Fails with [ArchError::InUse] while any connection, here or in an instancing component, uses it.
    pub fn remove_port(&mut self, owner: ComponentKey, name: &str) -> ArchResult<Port> {
        let comp = self.component(owner)?;
        let idx = port_index(comp, name)?;
        if comp
            .connections
            .iter()
            .any(|c| c.any_pin(|p| p.path.reference.is_none() && p.path.port == name))
        {
            return Err(ArchError::InUse(format!(
                "port \"{}\" of component \"{}\" is used by a connection",
                name, comp.name
            )));
        }
        for (key, alias) in self.instances_of(owner) {
            let user = &self.components[key];
            let used = user.connections.iter().any(|c| {
                c.any_pin(|p| p.path.alias() == Some(alias.as_str()) && p.path.port == name)
            });
            if used {
                return Err(ArchError::InUse(format!(
                    "port \"{}\" of component \"{}\" is used by a connection in component \"{}\"",
                    name, comp.name, user.name
                )));
            }
        }
        let port = self.components[owner].ports.remove(idx);
        debug!("removed port \"{}\"", name);
        Ok(port)
    }
    /// Remove reference `alias` from component `owner`.
    /// Fails with [ArchError::InUse] while any of `owner`'s connections use it.
    pub fn remove_reference(&mut self, owner: ComponentKey, alias: &str) -> ArchResult<ComponentRef> {
        let comp = self.component(owner)?;
        let idx = reference_index(comp, alias)?;
        if comp
            .connections
            .iter()
            .any(|c| c.any_pin(|p| p.path.alias() == Some(alias)))
        {
            return Err(ArchError::InUse(format!(
                "reference \"{}\" of component \"{}\" is used by a connection",
                alias, comp.name
            )));
        }
        let r = self.components[owner].references.remove(idx);
        debug!("removed reference \"{}\"", alias);
        Ok(r)
    }

    /// Convert to the serializable [ModuleDoc]
    pub fn to_doc(&self) -> ArchResult<ModuleDoc> {
        Exporter::export(self)
    }
    /// Create from a [ModuleDoc], with the default [ArchConfig]
    pub fn from_doc(doc: &ModuleDoc) -> ArchResult<Self> {
        Self::from_doc_with(doc, ArchConfig::default())
    }
    /// Create from a [ModuleDoc], checked according to `config`
    pub fn from_doc_with(doc: &ModuleDoc, config: ArchConfig) -> ArchResult<Self> {
        Importer::import(doc, config)
    }
    /// Encode to a compact string in `fmt`
    pub fn encode(&self, fmt: SerializationFormat) -> ArchResult<String> {
        Ok(fmt.to_string(&self.to_doc()?)?)
    }
    /// Encode to an indented string in `fmt`
    pub fn encode_pretty(&self, fmt: SerializationFormat) -> ArchResult<String> {
        Ok(fmt.to_string_pretty(&self.to_doc()?)?)
    }
    /// Decode from `fmt`-format string `txt`
    pub fn decode(fmt: SerializationFormat, txt: &str) -> ArchResult<Self> {
        Self::decode_with(fmt, txt, ArchConfig::default())
    }
    /// Decode from `fmt`-format string `txt`, checked according to `config`
    pub fn decode_with(fmt: SerializationFormat, txt: &str, config: ArchConfig) -> ArchResult<Self> {
        let doc: ModuleDoc = fmt
            .from_str(txt)
            .map_err(|e| ArchError::decode(e.into()))?;
        Self::from_doc_with(&doc, config)
    }
    /// Save in `fmt`-format to file `fname`
    pub fn save(&self, fmt: SerializationFormat, fname: impl AsRef<Path>) -> ArchResult<()> {
        Ok(fmt.save(&self.to_doc()?, fname)?)
    }
    /// Open from `fmt`-format file `fname`
    pub fn open(fname: impl AsRef<Path>, fmt: SerializationFormat) -> ArchResult<Self> {
        let doc: ModuleDoc = fmt.open(fname).map_err(|e| match e {
            utils::ser::Error::Io(_) => ArchError::Serialization(e),
            _ => ArchError::decode(e.into()),
        })?;
        Self::from_doc(&doc)
    }
}
/// Clones are independent modules, with their own [ModuleId].
/// Keys into the original remain valid in the clone.
impl Clone for Module {
    fn clone(&self) -> Self {
        let id = ModuleId::next();
        let mut components = self.components.clone();
        for (_, comp) in components.iter_mut() {
            for r in comp.references.iter_mut() {
                r.module = id;
            }
        }
        Self {
            id,
            name: self.name.clone(),
            config: self.config,
            components,
            order: self.order.clone(),
            names: self.names.clone(),
        }
    }
}
/// Structural equality: names, order, and contents of every component,
/// with references compared by the names of their definitions rather than keys.
impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.len() == other.len()
            && self
                .components()
                .zip(other.components())
                .all(|((_, a), (_, b))| {
                    a.name == b.name
                        && a.class == b.class
                        && a.ports == b.ports
                        && a.connections == b.connections
                        && a.references.len() == b.references.len()
                        && a.references.iter().zip(b.references.iter()).all(|(x, y)| {
                            x.alias == y.alias
                                && x.n_instances == y.n_instances
                                && self.get(x.component).map(|c| &c.name)
                                    == other.get(y.component).map(|c| &c.name)
                        })
                })
    }
}
impl Eq for Module {}

fn port_index(comp: &Component, name: &str) -> ArchResult<usize> {
    comp.ports.iter().position(|p| p.name == name).ok_or_else(|| {
        ArchError::UnresolvedReference(format!(
            "port \"{}\" not found in component \"{}\"",
            name, comp.name
        ))
    })
}
fn reference_index(comp: &Component, alias: &str) -> ArchResult<usize> {
    comp.references
        .iter()
        .position(|r| r.alias == alias)
        .ok_or_else(|| {
            ArchError::UnresolvedReference(format!(
                "reference \"{}\" not found in component \"{}\"",
                alias, comp.name
            ))
        })
}

/// Instancing-graph processor for [DepOrder]
struct Instancing<'m>(&'m Module);
impl DepOrder for Instancing<'_> {
    type Item = ComponentKey;
    type Error = ArchError;

    fn process(&self, item: &ComponentKey, orderer: &mut DepOrderer<Self>) -> ArchResult<()> {
        for r in self.0.component(*item)?.references.iter() {
            orderer.push(&r.component)?;
        }
        Ok(())
    }
    fn fail(&self, item: &ComponentKey) -> ArchError {
        let name = self
            .0
            .get(*item)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        ArchError::CyclicReference {
            component: name.clone(),
            owner: name,
        }
    }
}

///
/// # Component Handle
///
/// Short-lived exclusive borrow of a [Module], for chaining edits to one of its components.
/// Typically used as `module.edit(key)?.add_port(p)?.connect(a, b)?`.
///
pub struct ComponentHandle<'m> {
    module: &'m mut Module,
    key: ComponentKey,
}
impl<'m> ComponentHandle<'m> {
    pub fn key(&self) -> ComponentKey {
        self.key
    }
    /// The component being edited
    pub fn component(&self) -> &Component {
        &self.module.components[self.key]
    }
    pub fn set_class(&mut self, class: Option<ComponentClass>) -> ArchResult<&mut Self> {
        self.module.set_class(self.key, class)?;
        Ok(self)
    }
    pub fn add_port(&mut self, port: Port) -> ArchResult<&mut Self> {
        self.module.add_port(self.key, port)?;
        Ok(self)
    }
    pub fn add_reference(
        &mut self,
        component: ComponentKey,
        alias: Option<&str>,
        n_instances: usize,
    ) -> ArchResult<&mut Self> {
        self.module
            .add_reference(self.key, component, alias, n_instances)?;
        Ok(self)
    }
    pub fn add_connection(
        &mut self,
        kind: ConnectionKind,
        sources: &[PinRange],
        sinks: &[PinRange],
    ) -> ArchResult<&mut Self> {
        self.module.add_connection(self.key, kind, sources, sinks)?;
        Ok(self)
    }
    pub fn connect(&mut self, source: PinRange, sink: PinRange) -> ArchResult<&mut Self> {
        self.module.connect(self.key, source, sink)?;
        Ok(self)
    }
}
