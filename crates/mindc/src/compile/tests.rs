use super::*;
use crate::ast::Interface;
use crate::resolve::Parser;
use std::fs;
use tempfile::tempdir;

/// Accepts `primitive` or `composite`, with an optional `server <name>`.
struct KeywordParser;

impl Parser for KeywordParser {
    fn parse(&self, name: &str, text: &str, file_id: u16) -> Result<Definition, CompileError> {
        let span = Span::new(file_id, 0, text.len() as u32, 1);
        let mut words = text.split_whitespace();
        let definition = match words.next() {
            Some("primitive") => Definition::primitive(name).with_source("impl.c"),
            Some("composite") => Definition::composite(name),
            _ => {
                return Err(CompileError::new(
                    ErrorKind::Syntax,
                    Span::new(file_id, 0, 1, 1),
                    "expected 'primitive' or 'composite'".to_string(),
                ))
            }
        };
        match (words.next(), words.next()) {
            (Some("server"), Some(itf)) => {
                Ok(definition.with_interface(Interface::server(itf, "demo.I")).at(span))
            }
            _ => Ok(definition.at(span)),
        }
    }
}

fn kinds(errors: &[CompileError]) -> Vec<ErrorKind> {
    errors.iter().map(|e| e.kind).collect()
}

#[test]
fn test_fs_locator_maps_paths() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("demo/sub")).unwrap();
    fs::write(dir.path().join("demo/sub/Top.adl"), "composite").unwrap();
    fs::write(dir.path().join("demo/notes.txt"), "not a definition").unwrap();
    fs::write(dir.path().join("demo/bad.name.adl"), "primitive").unwrap();

    let locator = FsSourceLocator::scan([dir.path()], "adl").unwrap();
    assert_eq!(locator.names().collect::<Vec<_>>(), ["demo.sub.Top"]);
    assert!(locator.exists("demo.sub.Top"));
    assert!(!locator.exists("demo.notes"));

    let located = locator.locate("demo.sub.Top").unwrap();
    assert_eq!(located.text, "composite");
    assert!(located.path.ends_with("demo/sub/Top.adl"));
}

#[test]
fn test_fs_locator_first_root_wins() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("P.adl"), "primitive").unwrap();
    fs::write(second.path().join("P.adl"), "composite").unwrap();

    let locator = FsSourceLocator::scan([first.path(), second.path()], "adl").unwrap();
    assert_eq!(locator.len(), 1);
    assert_eq!(locator.locate("P").unwrap().text, "primitive");
}

#[test]
fn test_compile_from_directory() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("demo")).unwrap();
    fs::write(dir.path().join("demo/P.adl"), "primitive server s").unwrap();

    let fe = Frontend::builder()
        .parser(KeywordParser)
        .locator(FsSourceLocator::scan([dir.path()], "adl").unwrap())
        .build();
    let compiled = compile(&fe, &["demo.P"], CompilerOptions::default()).unwrap();

    let def = compiled.definition("demo.P").unwrap();
    assert!(def.is_primitive());
    assert_eq!(def.interfaces[0].name, "s");
    assert_eq!(compiled.roots().count(), 1);
}

#[test]
fn test_missing_definition() {
    let errors = compile(&Frontend::default(), &["demo.Missing"], CompilerOptions::default())
        .unwrap_err();
    assert_eq!(kinds(&errors), [ErrorKind::DefinitionNotFound]);
}

#[test]
fn test_every_root_reported() {
    let fe = Frontend::builder().parser(KeywordParser).build();
    let outcome = compile_with_sources(
        &fe,
        [("demo.A", "nonsense"), ("demo.B", "composite server s")],
        &["demo.A", "demo.B"],
        CompilerOptions::default(),
    );

    let errors = outcome.result.unwrap_err();
    assert_eq!(
        kinds(&errors),
        [ErrorKind::Syntax, ErrorKind::UnimplementedInterface]
    );
    // The syntax error points into the dumped copy of the registered text.
    let formatted = format_errors(&errors[..1], &outcome.sources);
    assert!(formatted.contains("error: syntax error"));
    assert!(formatted.contains("nonsense"));
}

#[test]
fn test_fail_fast_stops_at_first_error() {
    let fe = Frontend::builder().parser(KeywordParser).build();
    let options = CompilerOptions {
        error_policy: crate::resolve::ErrorPolicy::FailFast,
        ..CompilerOptions::default()
    };
    let outcome = compile_with_sources(
        &fe,
        [("demo.A", "nonsense"), ("demo.B", "composite server s")],
        &["demo.A", "demo.B"],
        options,
    );
    assert_eq!(kinds(&outcome.result.unwrap_err()), [ErrorKind::Syntax]);
}

#[test]
fn test_serialized_definitions_reload() {
    let definitions = vec![
        Definition::primitive("demo.P")
            .with_interface(Interface::server("s", "demo.I"))
            .with_source("demo/p.c"),
    ];
    let compiled = compile_definitions(
        &Frontend::default(),
        definitions,
        &["demo.P"],
        CompilerOptions::default(),
    )
    .unwrap();

    let bytes = serialize_definitions(&compiled.definitions()).unwrap();
    let reloaded = deserialize_definitions(&bytes).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].name, "demo.P");
    assert_eq!(reloaded[0].interfaces, compiled.definitions()[0].interfaces);

    // A bundle feeds a fresh compilation as is.
    let again = compile_definitions(
        &Frontend::default(),
        reloaded,
        &["demo.P"],
        CompilerOptions::default(),
    );
    assert!(again.is_ok());
}
