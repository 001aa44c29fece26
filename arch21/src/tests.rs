//!
//! # arch21 unit tests
//!

use super::*;
use crate::utils::SerializationFormat::{self, Json, Toml, Yaml};

/// The fabric fixture, in YAML
const FABRIC: &str = include_str!("../resources/fabric.yaml");

/// Parse pin-range text `txt`
fn p(txt: &str) -> PinRange {
    txt.parse().unwrap()
}

/// Grab the full path of a temporary file `fname`
fn tmp(fname: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("arch21_{}", fname))
}

/// Create a module with components `c1..c4`, in which `c1` instances each of the others,
/// and `c3`'s two-bit input is driven bit-by-bit by `c2` and `c4`.
fn scenario() -> ArchResult<Module> {
    use PortKind::{Input, Output};
    let mut m = Module::new("scenario");
    let c1 = m.add_component(&Component::new("c1"))?;
    let c2 = m.add_component(&Component::new("c2"))?;
    let c3 = m.add_component(&Component::new("c3"))?;
    let c4 = m.add_component(&Component::new("c4"))?;
    m.add_port(c1, Port::new("a", Input))?;
    m.add_port(c2, Port::new("a", Input))?;
    m.add_port(c2, Port::new("y", Output))?;
    m.add_port(c3, Port::new("d", Input).with_pins(2))?;
    m.add_port(c4, Port::new("y", Output))?;
    m.add_reference(c1, c2, None, 1)?;
    m.add_reference(c1, c3, None, 1)?;
    m.add_reference(c1, c4, None, 1)?;

    m.connect(c1, "a".parse()?, "c2.a".parse()?)?;
    m.connect(c1, "c2.y".parse()?, "c3.d[0]".parse()?)?;
    m.connect(c1, "c4.y".parse()?, "c3.d[1]".parse()?)?;
    Ok(m)
}

/// Create a module with a 4-bit component `x` and a component `top` with assorted ports
fn widths() -> ArchResult<(Module, ComponentKey)> {
    use PortKind::{Input, Output};
    let mut m = Module::new("widths");
    let x = m.add_component(&Component::new("x"))?;
    m.add_port(x, Port::new("d", Input).with_pins(4))?;
    let top = m.add_component(&Component::new("top"))?;
    m.edit(top)?
        .add_port(Port::new("a", Input).with_pins(2))?
        .add_port(Port::new("b", Input).with_pins(2))?
        .add_port(Port::new("w3", Input).with_pins(3))?
        .add_port(Port::new("w4", Input).with_pins(4))?
        .add_port(Port::new("y", Output).with_pins(4))?
        .add_reference(x, None, 1)?;
    Ok((m, top))
}

#[test]
fn end_to_end_scenario() -> ArchResult<()> {
    let m = scenario()?;
    let c1 = m.find("c1").unwrap();
    assert_eq!(m.component(c1)?.connections().len(), 3);

    let json = m.encode(Json)?;
    let m1 = Module::decode(Json, &json)?;
    let yaml = m1.encode(Yaml)?;
    let m2 = Module::decode(Yaml, &yaml)?;

    assert_eq!(m2, m);
    assert_eq!(m2.len(), 4);
    let c1 = m2.component(m2.find("c1").unwrap())?;
    assert_eq!(c1.connections(), m.component(m.find("c1").unwrap())?.connections());
    for name in ["c1", "c2", "c3", "c4"] {
        let before = m.component(m.find(name).unwrap())?.ports();
        let after = m2.component(m2.find(name).unwrap())?.ports();
        assert_eq!(
            before.iter().map(|p| p.n_pins).collect::<Vec<_>>(),
            after.iter().map(|p| p.n_pins).collect::<Vec<_>>()
        );
    }
    Ok(())
}

#[test]
fn roundtrip_every_format() -> ArchResult<()> {
    let fabric = Module::decode(Yaml, FABRIC)?;
    let fmts = [Json, Yaml, Toml];
    for fmt in fmts {
        assert_eq!(Module::decode(fmt, &fabric.encode(fmt)?)?, fabric);
        assert_eq!(Module::decode(fmt, &fabric.encode_pretty(fmt)?)?, fabric);
        assert_eq!(Module::decode(fmt, &scenario()?.encode(fmt)?)?, scenario()?);
    }
    // And transitively, across each pair of formats
    for from in fmts {
        for to in fmts {
            let once = Module::decode(from, &fabric.encode(from)?)?;
            let twice = Module::decode(to, &once.encode(to)?)?;
            assert_eq!(twice, fabric);
            assert_eq!(twice.to_doc()?, fabric.to_doc()?);
        }
    }
    Ok(())
}

#[test]
fn fabric_fixture() -> ArchResult<()> {
    let m = Module::decode(Yaml, FABRIC)?;
    assert_eq!(m.name(), "fabric");
    let names: Vec<&str> = m.components().map(|(_, c)| c.name()).collect();
    assert_eq!(names, vec!["lut4", "dff", "ble", "clb"]);

    let dff = m.component(m.find("dff").unwrap())?;
    assert_eq!(dff.class(), Some(ComponentClass::Latch));
    assert_eq!(dff.port("clk").unwrap().class, Some(PortClass::Clock));
    assert_eq!(dff.port("q").unwrap().kind, PortKind::Output);

    let ble = m.component(m.find("ble").unwrap())?;
    let concat = &ble.connections()[3];
    assert_eq!(concat.kind(), ConnectionKind::Concat);
    assert_eq!(concat.source_slices(), vec![1..2, 0..1]);

    let clb = m.component(m.find("clb").unwrap())?;
    let r = clb.reference("ble").unwrap();
    assert_eq!(r.n_instances(), 2);
    assert!(r.is_array());
    // Arrayed references addressed without an index span every instance
    assert_eq!(clb.connections()[1].sink_widths(), &[2]);
    assert_eq!(clb.connections()[2].source_widths(), &[4]);
    assert_eq!(clb.connections()[3].source_widths(), &[2, 2]);

    // Canonical enumeration strings on the way out
    let yaml = m.encode(Yaml)?;
    assert!(yaml.contains("LATCH"));
    assert!(yaml.contains("CONCAT"));
    assert!(!yaml.contains("ff_out"));
    Ok(())
}

#[test]
fn dependency_order() -> ArchResult<()> {
    let m = Module::decode(Yaml, FABRIC)?;
    let order: Vec<&str> = m
        .dependency_order()?
        .into_iter()
        .map(|k| m.get(k).unwrap().name())
        .collect();
    let pos = |name: &str| order.iter().position(|n| *n == name).unwrap();
    assert_eq!(order.len(), 4);
    assert!(pos("lut4") < pos("ble"));
    assert!(pos("dff") < pos("ble"));
    assert!(pos("ble") < pos("clb"));

    let ble = m.find("ble").unwrap();
    assert_eq!(m.instances_of(ble), vec![(m.find("clb").unwrap(), "ble".to_string())]);
    assert!(m.instances_of(m.find("clb").unwrap()).is_empty());
    Ok(())
}

#[test]
fn duplicate_names() -> ArchResult<()> {
    let mut m = Module::new("m");
    let c1 = m.add_component(&Component::new("c1"))?;
    let c2 = m.add_component(&Component::new("c2"))?;
    m.add_port(c1, Port::new("a", PortKind::Input))?;

    let e = m.add_port(c1, Port::new("a", PortKind::Output)).unwrap_err();
    assert!(matches!(e, ArchError::DuplicateName { .. }));
    assert_eq!(e.to_string(), r#"port "a" already exists in component "c1""#);

    // Reference aliases share the port namespace
    let e = m.add_reference(c1, c2, Some("a"), 1).unwrap_err();
    assert!(matches!(e, ArchError::DuplicateName { .. }));
    m.add_reference(c1, c2, None, 1)?;
    let e = m.add_reference(c1, c2, None, 1).unwrap_err();
    assert!(matches!(e, ArchError::DuplicateName { kind: "reference", .. }));
    let e = m.add_port(c1, Port::new("c2", PortKind::Input)).unwrap_err();
    assert!(matches!(e, ArchError::DuplicateName { kind: "reference", .. }));

    let e = m.add_component(&Component::new("c2")).unwrap_err();
    assert!(matches!(e, ArchError::DuplicateName { kind: "component", .. }));
    assert_eq!(m.len(), 2);
    Ok(())
}

#[test]
fn invalid_values() -> ArchResult<()> {
    let mut m = Module::new("m");
    let c1 = m.add_component(&Component::new("c1"))?;
    let c2 = m.add_component(&Component::new("c2"))?;
    let e = m.add_port(c1, Port::new("d", PortKind::Input).with_pins(0));
    assert!(matches!(e, Err(ArchError::Value(_))));
    let e = m.add_reference(c1, c2, None, 0);
    assert!(matches!(e, Err(ArchError::Value(_))));
    let e = m.add_reference(c1, c2, Some("u.v"), 1);
    assert!(matches!(e, Err(ArchError::Value(_))));
    let e = m.add_component(&Component::new("a[0]"));
    assert!(matches!(e, Err(ArchError::Value(_))));
    assert!(m.component(c1)?.ports().is_empty());
    assert!(m.component(c1)?.references().is_empty());
    Ok(())
}

#[test]
fn unnamed_modules() -> ArchResult<()> {
    let mut m = Module::new("");
    for fmt in [Json, Yaml, Toml] {
        assert_eq!(Module::decode(fmt, &m.encode(fmt)?)?, m);
    }
    let c = m.add_component(&Component::new("c"))?;
    m.add_port(c, Port::new("a", PortKind::Input))?;
    let mut named = m.clone();
    named.set_name("named");
    named.set_name("");
    assert_eq!(named, m);
    assert_eq!(Module::decode(Json, &named.encode(Json)?)?, m);
    Ok(())
}

#[test]
fn width_rules() -> ArchResult<()> {
    let (mut m, top) = widths()?;
    let e = m.connect(top, "w4".parse()?, "w3".parse()?);
    assert!(matches!(e, Err(ArchError::WidthMismatch(_))));
    assert!(m.component(top)?.connections().is_empty());

    let idx = m.add_connection(
        top,
        ConnectionKind::Concat,
        &[p("a"), p("b")],
        &[p("y")],
    )?;
    let conn = &m.component(top)?.connections()[idx];
    assert_eq!(conn.source_slices(), vec![2..4, 0..2]);
    assert_eq!(conn.sink_widths(), &[4]);

    let e = m.add_connection(top, ConnectionKind::Mux, &[p("a")], &[p("x.d[0:2]")]);
    assert!(matches!(e, Err(ArchError::Value(_))));
    let e = m.add_connection(
        top,
        ConnectionKind::Mux,
        &[p("a"), p("w3")],
        &[p("x.d[0:2]")],
    );
    assert!(matches!(e, Err(ArchError::WidthMismatch(_))));
    m.add_connection(
        top,
        ConnectionKind::Mux,
        &[p("a"), p("b")],
        &[p("x.d[0:2]")],
    )?;
    assert_eq!(m.component(top)?.connections().len(), 2);
    Ok(())
}

#[test]
fn pin_resolution() -> ArchResult<()> {
    let (mut m, top) = widths()?;
    let e = m.connect(top, "a".parse()?, "x.d[3:5]".parse()?);
    assert!(matches!(e, Err(ArchError::Range(_))));
    let e = m.connect(top, "a".parse()?, "x[1].d[0:2]".parse()?);
    assert!(matches!(
        e,
        Err(ArchError::IndexOutOfRange {
            index: 1,
            n_instances: 1,
            ..
        })
    ));
    let e = m.connect(top, "nope".parse()?, "x.d[0:2]".parse()?);
    assert!(matches!(e, Err(ArchError::UnresolvedReference(_))));
    let e = m.connect(top, "a".parse()?, "u.d[0:2]".parse()?);
    assert!(matches!(e, Err(ArchError::UnresolvedReference(_))));
    let e = m.connect(top, "a".parse()?, "x.q".parse()?);
    assert!(matches!(e, Err(ArchError::UnresolvedReference(_))));
    m.connect(top, "a".parse()?, "x[0].d[2:4]".parse()?)?;

    let p = m.component(top)?.port("w4").unwrap().select(0..2)?;
    m.connect(top, p, "x.d[0:2]".parse()?)?;
    Ok(())
}

#[test]
fn cyclic_references() -> ArchResult<()> {
    let mut m = Module::new("m");
    let a = m.add_component(&Component::new("a"))?;
    let b = m.add_component(&Component::new("b"))?;
    let c = m.add_component(&Component::new("c"))?;

    let e = m.add_reference(a, a, None, 1);
    assert!(matches!(e, Err(ArchError::CyclicReference { .. })));

    m.add_reference(b, a, None, 1)?;
    m.add_reference(c, a, None, 1)?;
    let e = m.add_reference(a, b, None, 1);
    assert!(matches!(e, Err(ArchError::CyclicReference { .. })));

    // Longer cycles too: c -> b -> a, then a -> c
    m.add_reference(c, b, None, 3)?;
    let e = m.add_reference(a, c, Some("cc"), 1).unwrap_err();
    assert_eq!(
        e.to_string(),
        r#"component "c" cannot be instanced in "a": the instancing graph would contain a cycle"#
    );
    assert!(m.component(a)?.references().is_empty());
    assert_eq!(m.instances_of(a).len(), 2);
    Ok(())
}

#[test]
fn fan_in() -> ArchResult<()> {
    let (mut m, top) = widths()?;
    m.connect(top, "a".parse()?, "x.d[0:2]".parse()?)?;
    let e = m.connect(top, "b".parse()?, "x.d[1:3]".parse()?);
    assert!(matches!(e, Err(ArchError::MultipleDriver(_))));
    m.connect(top, "b".parse()?, "x.d[2:4]".parse()?)?;
    let e = m.connect(top, "w4".parse()?, "x.d".parse()?);
    assert!(matches!(e, Err(ArchError::MultipleDriver(_))));

    // Sinks of a single connection may not overlap one another
    let e = m.add_connection(
        top,
        ConnectionKind::Complete,
        &[p("x.d")],
        &[p("y[0:2]"), p("y[1:3]")],
    );
    assert!(matches!(e, Err(ArchError::MultipleDriver(_))));
    // Fan-out is unrestricted
    m.add_connection(
        top,
        ConnectionKind::Complete,
        &[p("x.d")],
        &[p("y[0:2]"), p("y[2:4]")],
    )?;
    assert_eq!(m.component(top)?.connections().len(), 3);
    Ok(())
}

#[test]
fn fan_in_port_policy() -> ArchResult<()> {
    let mut m = Module::with_config("m", ArchConfig::new(FanInPolicy::Port));
    let x = m.add_component(&Component::new("x"))?;
    m.add_port(x, Port::new("d", PortKind::Input).with_pins(4))?;
    m.add_port(x, Port::new("a", PortKind::Input).with_pins(2))?;
    m.add_port(x, Port::new("b", PortKind::Input).with_pins(2))?;
    m.connect(x, "a".parse()?, "d[0:2]".parse()?)?;
    let e = m.connect(x, "b".parse()?, "d[2:4]".parse()?);
    assert!(matches!(e, Err(ArchError::MultipleDriver(_))));

    // A document valid at bit granularity fails at port granularity
    let mut bits = Module::new("m2");
    let y = bits.add_component(&Component::new("y"))?;
    bits.add_port(y, Port::new("d", PortKind::Input).with_pins(2))?;
    bits.add_port(y, Port::new("s", PortKind::Input))?;
    bits.connect(y, "s".parse()?, "d[0]".parse()?)?;
    bits.connect(y, "s".parse()?, "d[1]".parse()?)?;
    let yaml = bits.encode(Yaml)?;
    Module::decode(Yaml, &yaml)?;
    let e = Module::decode_with(Yaml, &yaml, ArchConfig::new(FanInPolicy::Port)).unwrap_err();
    assert!(matches!(e.root_cause(), ArchError::MultipleDriver(_)));
    Ok(())
}

#[test]
fn arrayed_references() -> ArchResult<()> {
    let mut m = Module::new("m");
    let cell = m.add_component(&Component::new("cell"))?;
    m.add_port(cell, Port::new("q", PortKind::Output).with_pins(2))?;
    let top = m.add_component(&Component::new("top"))?;
    m.edit(top)?
        .add_port(Port::new("bus", PortKind::Output).with_pins(8))?
        .add_port(Port::new("one", PortKind::Output).with_pins(2))?
        .add_reference(cell, Some("cells"), 4)?;

    let idx = m.connect(top, "cells.q".parse()?, "bus".parse()?)?;
    assert_eq!(m.component(top)?.connections()[idx].source_widths(), &[8]);
    m.connect(top, "cells[3].q".parse()?, "one".parse()?)?;
    let e = m.connect(top, "cells[4].q".parse()?, "one".parse()?);
    assert!(matches!(e, Err(ArchError::IndexOutOfRange { index: 4, .. })));
    Ok(())
}

#[test]
fn component_templates() -> ArchResult<()> {
    let m = scenario()?;
    let c1 = m.find("c1").unwrap();

    // Copy-on-insert: the copy is independent of its template
    let mut copy = m.clone();
    let template = copy.component(c1)?.clone().with_name("c1b");
    let c1b = copy.add_component(&template)?;
    assert_eq!(copy.component(c1b)?.connections(), m.component(c1)?.connections());
    copy.rename_port(c1b, "a", "a2")?;
    assert!(copy.component(c1)?.port("a").is_some());
    assert_eq!(copy.instances_of(copy.find("c3").unwrap()).len(), 2);

    // Clones are separate modules, so templates from the original do not carry over
    let e = copy.add_component(&m.component(c1)?.clone().with_name("c1c"));
    assert!(matches!(e, Err(ArchError::UnresolvedReference(_))));
    assert!(copy.find("c1c").is_none());

    // Nor into a module whose components happen to share the original's keys and ports
    let mut other = Module::new("other");
    for name in ["p", "q", "r", "s"] {
        other.add_component(&Component::new(name))?;
    }
    let q = other.find("q").unwrap();
    other.add_port(q, Port::new("a", PortKind::Input))?;
    other.add_port(q, Port::new("y", PortKind::Output))?;
    other.add_port(other.find("r").unwrap(), Port::new("d", PortKind::Input).with_pins(2))?;
    other.add_port(other.find("s").unwrap(), Port::new("y", PortKind::Output))?;
    let before = other.clone();
    let e = other.add_component(&m.component(c1)?.clone().with_name("t"));
    assert!(matches!(e, Err(ArchError::UnresolvedReference(_))));
    assert!(other.find("t").is_none());
    assert_eq!(other.len(), 4);
    assert_eq!(other, before);

    // Templates built from scratch are checked as they are added
    let lut = Component::new("lut")
        .with_class(ComponentClass::Lut)
        .with_port(Port::new("in", PortKind::Input).with_pins(4))?;
    let k = other.add_component(&lut)?;
    assert_eq!(other.component(k)?, &lut);
    Ok(())
}

#[test]
fn renames() -> ArchResult<()> {
    let mut m = scenario()?;
    let c1 = m.find("c1").unwrap();
    let c2 = m.find("c2").unwrap();
    let c3 = m.find("c3").unwrap();

    // Renaming a port rewrites connections in every instancing component
    m.rename_port(c3, "d", "din")?;
    let sinks: Vec<String> = m.component(c1)?.connections()[1..]
        .iter()
        .map(|c| c.sinks()[0].to_string())
        .collect();
    assert_eq!(sinks, vec!["c3.din[0:1]", "c3.din[1:2]"]);
    m.rename_port(c1, "a", "x")?;
    assert_eq!(m.component(c1)?.connections()[0].sources()[0].to_string(), "x");
    let e = m.rename_port(c2, "a", "y");
    assert!(matches!(e, Err(ArchError::DuplicateName { .. })));
    let e = m.rename_port(c2, "zz", "q");
    assert!(matches!(e, Err(ArchError::UnresolvedReference(_))));

    m.rename_reference(c1, "c2", "u2")?;
    assert_eq!(m.component(c1)?.connections()[0].sinks()[0].to_string(), "u2.a");
    let e = m.rename_reference(c1, "u2", "c3");
    assert!(matches!(e, Err(ArchError::DuplicateName { .. })));
    let e = m.rename_reference(c1, "u2", "x");
    assert!(matches!(e, Err(ArchError::DuplicateName { kind: "port", .. })));

    // Component renames keep existing aliases
    m.rename_component(c2, "buffer")?;
    assert_eq!(m.find("buffer"), Some(c2));
    assert!(m.find("c2").is_none());
    assert!(m.component(c1)?.reference("u2").is_some());
    let e = m.rename_component(c2, "c4");
    assert!(matches!(e, Err(ArchError::DuplicateName { .. })));
    m.set_name("renamed");

    // And everything still round-trips
    assert_eq!(Module::decode(Toml, &m.encode(Toml)?)?, m);
    Ok(())
}

#[test]
fn removals() -> ArchResult<()> {
    let mut m = scenario()?;
    let c1 = m.find("c1").unwrap();
    let c2 = m.find("c2").unwrap();
    let c4 = m.find("c4").unwrap();

    let e = m.remove_port(c4, "y");
    assert!(matches!(e, Err(ArchError::InUse(_))));
    let e = m.remove_port(c1, "a");
    assert!(matches!(e, Err(ArchError::InUse(_))));
    let e = m.remove_reference(c1, "c4");
    assert!(matches!(e, Err(ArchError::InUse(_))));
    assert_eq!(m.component(c4)?.ports().len(), 1);

    // Unused items go quietly
    m.add_port(c2, Port::new("spare", PortKind::Output))?;
    let spare = m.remove_port(c2, "spare")?;
    assert_eq!(spare.name, "spare");
    let c5 = m.add_component(&Component::new("c5"))?;
    m.add_reference(c1, c5, None, 2)?;
    let r = m.remove_reference(c1, "c5")?;
    assert_eq!(r.component(), c5);
    assert!(m.instances_of(c5).is_empty());
    let e = m.remove_reference(c1, "c5");
    assert!(matches!(e, Err(ArchError::UnresolvedReference(_))));
    Ok(())
}

#[test]
fn component_handles() -> ArchResult<()> {
    let mut m = Module::new("m");
    let leaf = m.add_component(&Component::new("leaf"))?;
    m.edit(leaf)?
        .set_class(Some(ComponentClass::Latch))?
        .add_port(Port::new("d", PortKind::Input))?
        .add_port(Port::new("q", PortKind::Output))?;
    let top = m.add_component(&Component::new("top"))?;
    let mut handle = m.edit(top)?;
    handle
        .add_port(Port::new("i", PortKind::Input))?
        .add_reference(leaf, Some("l"), 1)?
        .connect("i".parse()?, "l.d".parse()?)?;
    assert_eq!(handle.key(), top);
    assert_eq!(handle.component().connections().len(), 1);
    assert!(handle.add_port(Port::new("i", PortKind::Output)).is_err());

    assert_eq!(m.component(leaf)?.class(), Some(ComponentClass::Latch));
    Ok(())
}

#[test]
fn decode_errors() {
    let e = Module::decode(Yaml, "name: [").unwrap_err();
    assert!(matches!(e.root_cause(), ArchError::Serialization(_)));
    let e = Module::decode(Json, r#"{"name": "m", "components": {"c": {"ports": {"p": {"kind": "INOUT"}}}}}"#)
        .unwrap_err();
    assert!(matches!(e, ArchError::Decode { .. }));

    let cyclic = r#"
        name: m
        components:
          a:
            references:
              b: { component: b }
          b:
            references:
              a: { component: a }
    "#;
    let e = Module::decode(Yaml, cyclic).unwrap_err();
    assert!(matches!(e.root_cause(), ArchError::CyclicReference { .. }));
    assert!(e.to_string().contains(r#"component "b""#));

    let duplicate = r#"
        name = "m"
        [components.a.ports.p]
        kind = "INPUT"
        [components.a.references.p]
        component = "b"
        [components.b]
    "#;
    let e = Module::decode(Toml, duplicate).unwrap_err();
    assert!(matches!(e.root_cause(), ArchError::DuplicateName { .. }));

    let width = r#"
        name: m
        components:
          a:
            ports:
              i: { kind: i, n_pins: 2 }
              o: { kind: o, n_pins: 3 }
            connections:
              - { kind: DIRECT, sources: [i], sinks: [o] }
    "#;
    let e = Module::decode(Yaml, width).unwrap_err();
    assert!(matches!(e.root_cause(), ArchError::WidthMismatch(_)));
}

#[test]
fn oversized_widths() {
    // Port widths which overflow once multiplied by the instance count
    let arrayed = r#"
        name: m
        components:
          leaf:
            ports:
              q: { kind: OUTPUT, n_pins: 9223372036854775808 }
          top:
            ports:
              y: { kind: OUTPUT }
            references:
              l: { component: leaf, n_instances: 2 }
            connections:
              - { kind: DIRECT, sources: [l.q], sinks: [y] }
    "#;
    let e = Module::decode(Yaml, arrayed).unwrap_err();
    assert!(matches!(e.root_cause(), ArchError::Range(_)));

    // And concatenations whose total width overflows
    let concat = r#"
        name: m
        components:
          top:
            ports:
              a: { kind: INPUT, n_pins: 18446744073709551615 }
              b: { kind: INPUT, n_pins: 2 }
              y: { kind: OUTPUT, n_pins: 4 }
            connections:
              - { kind: CONCAT, sources: [a, b], sinks: [y] }
    "#;
    let e = Module::decode(Yaml, concat).unwrap_err();
    assert!(matches!(e.root_cause(), ArchError::Range(_)));

    let bit = format!(
        r#"{{"name": "m", "components": {{"top": {{"ports": {{"a": {{"kind": "INPUT"}}}},
        "connections": [{{"kind": "DIRECT", "sources": ["a[{}]"], "sinks": ["a"]}}]}}}}}}"#,
        usize::MAX
    );
    let e = Module::decode(Json, &bit).unwrap_err();
    assert!(matches!(e.root_cause(), ArchError::Range(_)));
}

#[test]
fn save_and_open() -> ArchResult<()> {
    let fabric = Module::decode(Yaml, FABRIC)?;
    for (fmt, ext) in [(Json, "json"), (Yaml, "yaml"), (Toml, "toml")] {
        let path = tmp(&format!("fabric.{}", ext));
        fabric.save(fmt, &path)?;
        assert_eq!(SerializationFormat::from_path(&path)?, fmt);
        assert_eq!(Module::open(&path, fmt)?, fabric);
    }
    let e = Module::open(tmp("does_not_exist.json"), Json).unwrap_err();
    assert!(matches!(e, ArchError::Serialization(_)));

    let path = tmp("garbage.json");
    std::fs::write(&path, "{ not json").unwrap();
    let e = Module::open(&path, Json).unwrap_err();
    assert!(matches!(e, ArchError::Decode { .. }));
    Ok(())
}

#[test]
fn modules_are_send_and_sync() -> ArchResult<()> {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}
    let m = Module::decode(Yaml, FABRIC)?;
    assert_send_sync(&m);
    let m = &m;

    // Independent readers in parallel
    let encoded = std::thread::scope(|s| {
        let handles: Vec<_> = [Json, Yaml, Toml]
            .into_iter()
            .map(|fmt| s.spawn(move || m.encode(fmt)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<ArchResult<Vec<String>>>()
    })?;
    assert_eq!(encoded.len(), 3);
    Ok(())
}
