//! Integration tests for end-to-end definition loading.
//!
//! These tests go through the full front-end:
//! Register definitions → Load → Resolve references → Instantiate → Check

use mindc::ast::error::ErrorKind;
use mindc::{
    Binding, Component, DefId, Definition, DefinitionReference, Endpoint, Frontend,
    Interface, LoadResult, Loader, StaticIdlSignatures, TypeArgumentValue, Value,
    CompilationContext,
};
use mindc_tests::TestHarness;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

fn server_primitive(name: &str, server: Interface) -> Definition {
    Definition::primitive(name)
        .with_interface(server)
        .with_source(format!("{}.c", name))
}

fn client_primitive(name: &str, client: Interface) -> Definition {
    Definition::primitive(name)
        .with_interface(client)
        .with_source(format!("{}.c", name))
}

/// `composite demo.Top { a: demo.Cl; b: demo.Sv; bindings... }`
fn wired(client: Interface, server: Interface, bindings: Vec<Binding>) -> Vec<Definition> {
    let mut top = Definition::composite("demo.Top")
        .with_component(Component::new("a", DefinitionReference::new("demo.Cl")))
        .with_component(Component::new("b", DefinitionReference::new("demo.Sv")));
    for binding in bindings {
        top = top.with_binding(binding);
    }
    vec![
        client_primitive("demo.Cl", client),
        server_primitive("demo.Sv", server),
        top,
    ]
}

fn bind(from: Endpoint, to: Endpoint) -> Binding {
    Binding::new(from, to)
}

/// Counts the loads that miss the definition cache.
struct CountingLoader {
    next: Box<dyn Loader>,
    loads: Rc<RefCell<HashMap<String, usize>>>,
}

impl Loader for CountingLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        *self.loads.borrow_mut().entry(name.to_string()).or_default() += 1;
        self.next.load(name, fe, ctx)
    }
}

#[test]
fn test_definition_cache_identity() {
    let mut harness = TestHarness::new([server_primitive(
        "demo.P",
        Interface::server("s", "demo.I"),
    )]);

    let first = harness.load("demo.P").unwrap();
    let second = harness.load("demo.P").unwrap();
    assert_eq!(first, second);

    let resolved = harness.resolve(DefinitionReference::new("demo.P")).unwrap();
    assert_eq!(resolved, Some(first));
    let again = harness.resolve(DefinitionReference::new("demo.P")).unwrap();
    assert_eq!(again, Some(first));
}

#[test]
fn test_diamond_extends_loads_shared_parent_once() {
    let loads = Rc::new(RefCell::new(HashMap::new()));
    let counter = loads.clone();
    let fe = Frontend::builder()
        .stage(move |next| Box::new(CountingLoader { next, loads: counter }))
        .build();

    let definitions = [
        server_primitive("demo.D", Interface::server("s", "demo.I")),
        Definition::primitive("demo.B").with_extends(DefinitionReference::new("demo.D")),
        Definition::primitive("demo.C").with_extends(DefinitionReference::new("demo.D")),
        Definition::primitive("demo.A")
            .with_extends(DefinitionReference::new("demo.B"))
            .with_extends(DefinitionReference::new("demo.C")),
    ];
    let mut harness = TestHarness::with_frontend(fe, definitions);

    let a = harness.load_ok("demo.A").clone();
    assert_eq!(loads.borrow()["demo.D"], 1);
    assert_eq!(loads.borrow()["demo.A"], 1);

    // The interface and source reached through both parents are kept once.
    assert_eq!(a.interfaces.len(), 1);
    assert_eq!(a.sources.len(), 1);
    assert!(harness.error_kinds().is_empty());

    // Loading again yields the same merged definition.
    assert_eq!(harness.load_ok("demo.A"), &a);
}

fn template_definitions() -> Vec<Definition> {
    vec![
        Definition::composite("demo.Template")
            .with_type_parameter("P", None)
            .with_component(Component::placeholder("x", "P")),
        Definition::primitive("demo.Foo")
            .with_parameter("value")
            .with_attribute("size", "int", Some(Value::Reference("value".into())))
            .with_source("foo.c"),
        server_primitive("demo.Bar", Interface::server("s", "demo.I")),
    ]
}

fn template_of(bound: DefinitionReference) -> DefinitionReference {
    DefinitionReference::new("demo.Template").type_arg(TypeArgumentValue::Definition(bound))
}

#[test]
fn test_template_instances_cached_and_distinct() {
    let mut harness = TestHarness::new(template_definitions());

    let foo = harness
        .resolve(template_of(DefinitionReference::new("demo.Foo")))
        .unwrap()
        .unwrap();
    let foo_again = harness
        .resolve(template_of(DefinitionReference::new("demo.Foo")))
        .unwrap()
        .unwrap();
    let bar = harness
        .resolve(template_of(DefinitionReference::new("demo.Bar")))
        .unwrap()
        .unwrap();

    assert_eq!(foo, foo_again);
    assert_ne!(foo, bar);

    let foo_instance = harness.get(foo);
    let bar_instance = harness.get(bar);
    assert_eq!(foo_instance.name, "demo.Template<demo.Foo>");
    assert_eq!(bar_instance.name, "demo.Template<demo.Bar>");
    assert_eq!(
        foo_instance.components[0].resolved.as_ref().unwrap().name,
        "demo.Foo"
    );
    assert_eq!(
        bar_instance.components[0].resolved.as_ref().unwrap().name,
        "demo.Bar"
    );
    // The generic itself is left untouched.
    let generic = harness.context().cached("demo.Template").unwrap();
    assert!(harness.get(generic).components[0].is_placeholder());
    assert!(harness.error_kinds().is_empty());
}

#[test]
fn test_template_exposes_bound_parameters() {
    let mut harness = TestHarness::new(template_definitions());

    let instance = harness
        .resolve(template_of(DefinitionReference::new("demo.Foo")))
        .unwrap()
        .unwrap();
    let def = harness.get(instance);
    assert!(def.formal_parameter("P$value").is_some());
    let x = &def.components[0];
    assert!(!x.is_placeholder());
    assert_eq!(
        x.definition.as_ref().unwrap().arguments[0].value,
        Value::Reference("P$value".into())
    );

    // `Template<Foo(value=3)>` hoists the argument and substitutes it.
    let substituted = harness
        .resolve(template_of(
            DefinitionReference::new("demo.Foo").named_arg("value", Value::Number(3)),
        ))
        .unwrap()
        .unwrap();
    let def = harness.get(substituted);
    assert_eq!(def.name, "demo.Template<demo.Foo>(P$value=3)");
    let x = def.components[0].resolved_id().unwrap();
    assert_eq!(harness.get(x).name, "demo.Foo(value=3)");
    assert_eq!(
        harness.get(x).attribute("size").unwrap().value,
        Some(Value::Number(3))
    );
    assert!(harness.error_kinds().is_empty());
}

fn d1() -> Definition {
    Definition::primitive("demo.D1")
        .with_parameter("value")
        .with_attribute("size", "int", Some(Value::Reference("value".into())))
        .with_source("d1.c")
}

#[test]
fn test_parametric_arguments() {
    let mut harness = TestHarness::new([d1()]);

    let ordinal = harness
        .resolve(DefinitionReference::new("demo.D1").arg(Value::Number(10)))
        .unwrap()
        .unwrap();
    let def = harness.get(ordinal);
    assert_eq!(def.name, "demo.D1(value=10)");
    assert_eq!(def.attribute("size").unwrap().value, Some(Value::Number(10)));
    assert!(def.formal_parameters.is_empty());

    let named = harness
        .resolve(DefinitionReference::new("demo.D1").named_arg("value", Value::Number(10)))
        .unwrap();
    assert_eq!(named, Some(ordinal));
    assert!(harness.error_kinds().is_empty());

    let too_many = harness
        .resolve(
            DefinitionReference::new("demo.D1")
                .arg(Value::Number(10))
                .arg(Value::Number(20)),
        )
        .unwrap();
    assert_eq!(too_many, None);
    assert_eq!(harness.error_kinds(), [ErrorKind::TooManyArguments]);

    let too_few = harness.resolve(DefinitionReference::new("demo.D1")).unwrap();
    assert_eq!(too_few, None);
    assert_eq!(
        harness.error_kinds(),
        [ErrorKind::TooManyArguments, ErrorKind::MissingArgument]
    );
}

#[test]
fn test_single_to_collection_binding_rejected() {
    let mut harness = TestHarness::new(wired(
        Interface::client("c", "demo.I"),
        Interface::server("s", "demo.I").collection(Some(2)),
        vec![bind(Endpoint::new("a", "c"), Endpoint::new("b", "s"))],
    ));
    harness.load_ok("demo.Top");
    assert_eq!(harness.error_kinds(), [ErrorKind::BindingCardinality]);
}

#[test]
fn test_collection_binding_expansion() {
    let mut harness = TestHarness::new(wired(
        Interface::client("c", "demo.I").collection(Some(3)),
        Interface::server("s", "demo.I").collection(Some(3)),
        vec![bind(Endpoint::new("a", "c"), Endpoint::new("b", "s"))],
    ));
    let top = harness.load_ok("demo.Top").clone();

    let indices: Vec<_> = top
        .bindings
        .iter()
        .map(|b| (b.from.index, b.to.index))
        .collect();
    assert_eq!(
        indices,
        [(Some(0), Some(0)), (Some(1), Some(1)), (Some(2), Some(2))]
    );
    assert!(harness.error_kinds().is_empty());
}

#[test]
fn test_unbound_mandatory_client() {
    let mut harness = TestHarness::new(wired(
        Interface::client("c", "demo.I"),
        Interface::server("s", "demo.I"),
        Vec::new(),
    ));
    let (kind, message) = harness.load_fatal("demo.Top");
    assert_eq!(kind, ErrorKind::UnboundInterface);
    assert!(message.contains("'a.c'"));
    assert!(harness.error_kinds().is_empty());
}

#[test]
fn test_single_binding_satisfies_client() {
    let mut harness = TestHarness::new(wired(
        Interface::client("c", "demo.I"),
        Interface::server("s", "demo.I"),
        vec![bind(Endpoint::new("a", "c"), Endpoint::new("b", "s"))],
    ));
    harness.load_ok("demo.Top");
    assert!(harness.error_kinds().is_empty());

    let mut harness = TestHarness::new(wired(
        Interface::client("c", "demo.I").collection(Some(1)),
        Interface::server("s", "demo.I"),
        vec![bind(Endpoint::indexed("a", "c", 0), Endpoint::new("b", "s"))],
    ));
    harness.load_ok("demo.Top");
    assert!(harness.error_kinds().is_empty());
}

#[test]
fn test_unimplemented_interface() {
    let mut harness = TestHarness::new([
        Definition::composite("demo.C").with_interface(Interface::server("s", "demo.I")),
        Definition::composite("demo.Abstract")
            .with_interface(Interface::server("s", "demo.I"))
            .abstract_definition(),
    ]);

    let (kind, message) = harness.load_fatal("demo.C");
    assert_eq!(kind, ErrorKind::UnimplementedInterface);
    assert!(message.contains("s are not implemented"));

    harness.load_ok("demo.Abstract");
}

#[test]
fn test_cyclic_extends_terminates() {
    let mut harness = TestHarness::new([
        Definition::composite("demo.A").with_extends(DefinitionReference::new("demo.B")),
        Definition::composite("demo.B").with_extends(DefinitionReference::new("demo.A")),
    ]);

    assert!(harness.load("demo.A").is_ok());
    assert_eq!(harness.error_kinds(), [ErrorKind::CyclicDependency]);
}

fn signature_harness(client_sig: &str, server_sig: &str) -> TestHarness {
    let fe = Frontend::builder()
        .idl(StaticIdlSignatures::new().with("demo.J", "demo.I"))
        .build();
    TestHarness::with_frontend(
        fe,
        wired(
            Interface::client("c", client_sig),
            Interface::server("s", server_sig),
            vec![bind(Endpoint::new("a", "c"), Endpoint::new("b", "s"))],
        ),
    )
}

#[test]
fn test_derived_server_signature_requires_cast() {
    let mut harness = signature_harness("demo.I", "demo.J");
    let top = harness.load_ok("demo.Top").clone();

    assert!(harness.error_kinds().is_empty());
    assert!(top.bindings[0].cast_required);

    let mut harness = signature_harness("demo.I", "demo.I");
    let top = harness.load_ok("demo.Top").clone();
    assert!(!top.bindings[0].cast_required);
}

#[test]
fn test_unrelated_signatures_rejected() {
    let mut harness = signature_harness("demo.J", "demo.I");
    let top = harness.load_ok("demo.Top").clone();

    assert_eq!(harness.error_kinds(), [ErrorKind::IncompatibleSignature]);
    assert!(!top.bindings[0].cast_required);

    let mut harness = signature_harness("demo.I", "demo.K");
    harness.load_ok("demo.Top");
    assert_eq!(harness.error_kinds(), [ErrorKind::IncompatibleSignature]);
}
