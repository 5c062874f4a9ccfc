//! Qualify simple names through imports and the current package.

use super::Resolver;
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::Frontend;
use mindc_ast::{DefId, Definition, DefinitionReference, TypeArgumentValue};
use tracing::trace;

/// Rewrites a simple name to a fully qualified one before delegating.
///
/// Lookup order for a simple name `N` in definition `a.b.X`:
///
/// 1. a single-type import `import p.N;`
/// 2. the same package: `a.b.N`, if such a definition exists
/// 3. on-demand imports `import p.*;`, first one where `p.N` exists
///
/// Names containing a dot are already qualified. Nested type arguments are
/// qualified the same way, and a bare type argument naming a type parameter
/// of the encapsulating definition becomes a type parameter reference.
pub struct ImportResolver {
    next: Box<dyn Resolver>,
}

impl ImportResolver {
    pub fn new(next: Box<dyn Resolver>) -> Self {
        Self { next }
    }
}

impl Resolver for ImportResolver {
    fn resolve(
        &self,
        reference: &mut DefinitionReference,
        encapsulating: Option<DefId>,
        fe: &Frontend,
        ctx: &mut CompilationContext,
    ) -> LoadResult<Option<DefId>> {
        if let Some(scope) = encapsulating {
            qualify_reference(reference, ctx.get(scope), fe, ctx);
        }
        self.next.resolve(reference, encapsulating, fe, ctx)
    }
}

fn qualify_reference(
    reference: &mut DefinitionReference,
    scope: &Definition,
    fe: &Frontend,
    ctx: &CompilationContext,
) {
    let qualified = qualify(&reference.name, scope, fe, ctx);
    if qualified != reference.name {
        trace!(from = %reference.name, to = %qualified, "qualified reference");
        reference.name = qualified;
    }

    for type_arg in &mut reference.type_arguments {
        let param = match &mut type_arg.value {
            TypeArgumentValue::Definition(inner)
                if inner.arguments.is_empty()
                    && inner.type_arguments.is_empty()
                    && scope.formal_type_parameter(&inner.name).is_some() =>
            {
                inner.name.clone()
            }
            TypeArgumentValue::Definition(inner) => {
                qualify_reference(inner, scope, fe, ctx);
                continue;
            }
            TypeArgumentValue::TypeParameter(_) => continue,
        };
        type_arg.value = TypeArgumentValue::TypeParameter(param);
    }
}

fn qualify(name: &str, scope: &Definition, fe: &Frontend, ctx: &CompilationContext) -> String {
    if name.contains('.') {
        return name.to_string();
    }

    let single = scope
        .imports
        .iter()
        .filter(|import| !import.is_on_demand())
        .find_map(|import| import.qualify(name));
    if let Some(qualified) = single {
        return qualified;
    }

    if let Some(package) = package_of(&scope.name) {
        let candidate = format!("{}.{}", package, name);
        if fe.definition_exists(&candidate, ctx) {
            return candidate;
        }
    }

    scope
        .imports
        .iter()
        .filter(|import| import.is_on_demand())
        .filter_map(|import| import.qualify(name))
        .find(|candidate| fe.definition_exists(candidate, ctx))
        .unwrap_or_else(|| name.to_string())
}

/// Package of a definition name, ignoring any instance or substitution suffix.
fn package_of(name: &str) -> Option<&str> {
    let base = name.split(['<', '(']).next().unwrap_or(name);
    base.rsplit_once('.').map(|(package, _)| package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindc_ast::Import;

    fn setup() -> (Frontend, CompilationContext) {
        let mut ctx = CompilationContext::default();
        ctx.register_definition("a.b.Local", Definition::primitive("a.b.Local"));
        ctx.register_definition("lib.Shared", Definition::primitive("lib.Shared"));
        ctx.register_definition("other.Shared", Definition::primitive("other.Shared"));
        (Frontend::default(), ctx)
    }

    #[test]
    fn test_package_of_strips_suffixes() {
        assert_eq!(package_of("a.b.X"), Some("a.b"));
        assert_eq!(package_of("a.G<a.Foo>"), Some("a"));
        assert_eq!(package_of("a.D(size=1)"), Some("a"));
        assert_eq!(package_of("X"), None);
    }

    #[test]
    fn test_lookup_order() {
        let (fe, ctx) = setup();
        let scope = Definition::composite("a.b.Top")
            .with_import(Import::new("lib.*"))
            .with_import(Import::new("x.y.Single"));

        assert_eq!(qualify("Single", &scope, &fe, &ctx), "x.y.Single");
        assert_eq!(qualify("Local", &scope, &fe, &ctx), "a.b.Local");
        assert_eq!(qualify("Shared", &scope, &fe, &ctx), "lib.Shared");
        assert_eq!(qualify("Unknown", &scope, &fe, &ctx), "Unknown");
        assert_eq!(qualify("q.Qualified", &scope, &fe, &ctx), "q.Qualified");
    }

    #[test]
    fn test_type_arguments_qualified_and_parameters_detected() {
        let (fe, ctx) = setup();
        let scope = Definition::composite("a.b.Top").with_type_parameter("P", None);
        let mut reference = DefinitionReference::new("G")
            .type_arg(TypeArgumentValue::Definition(DefinitionReference::new("Local")))
            .type_arg(TypeArgumentValue::Definition(DefinitionReference::new("P")));

        qualify_reference(&mut reference, &scope, &fe, &ctx);
        assert_eq!(reference.to_string(), "G<a.b.Local, P>");
        assert_eq!(
            reference.type_arguments[1].value,
            TypeArgumentValue::TypeParameter("P".into())
        );
    }
}
