//! Binding compatibility.

use super::{endpoint_interface, EndpointInterface};
use crate::context::CompilationContext;
use crate::error::LoadResult;
use crate::frontend::{Frontend, IdlSignatures};
use crate::loader::{rewrite, Loader};
use mindc_ast::error::{CompileError, ErrorKind};
use mindc_ast::{Binding, Cardinality, DefId, Definition, Endpoint, Interface, Span};

/// One end of a binding: the interface as seen from inside the binding's
/// scope, and the element index if one is given.
#[derive(Debug, Clone)]
pub struct BoundEnd<'i> {
    pub label: String,
    pub interface: &'i Interface,
    pub index: Option<u32>,
}

impl<'i> BoundEnd<'i> {
    pub fn new(label: impl Into<String>, interface: &'i Interface, index: Option<u32>) -> Self {
        Self {
            label: label.into(),
            interface,
            index,
        }
    }

    /// Whether this end designates a single interface instance.
    fn is_single(&self) -> bool {
        self.interface.is_singleton() || (self.interface.is_collection() && self.index.is_some())
    }
}

/// Checks whether a client interface may be bound to a server interface.
pub struct BindingChecker<'a> {
    idl: &'a dyn IdlSignatures,
}

impl<'a> BindingChecker<'a> {
    pub fn new(idl: &'a dyn IdlSignatures) -> Self {
        Self { idl }
    }

    /// Check `from → to`.
    ///
    /// Returns whether the server signature is a strict subtype of the
    /// client signature (a cast is then required), or every problem found.
    pub fn check(
        &self,
        from: &BoundEnd<'_>,
        to: &BoundEnd<'_>,
        span: Span,
    ) -> Result<bool, Vec<CompileError>> {
        let mut errors = Vec::new();
        let mut error = |kind: ErrorKind, message: String| {
            errors.push(CompileError::new(kind, span, message));
        };

        if !from.interface.is_client() {
            error(
                ErrorKind::InvalidBinding,
                format!("'{}' is not a client interface and cannot be bound from", from.label),
            );
        }
        if !to.interface.is_server() {
            error(
                ErrorKind::InvalidBinding,
                format!("'{}' is not a server interface and cannot be bound to", to.label),
            );
        }

        for end in [from, to] {
            match (end.index, end.interface.cardinality) {
                (Some(_), Cardinality::Singleton) => error(
                    ErrorKind::InvalidBinding,
                    format!("'{}' is not a collection interface", end.label),
                ),
                (Some(index), Cardinality::Collection(Some(size))) if index >= size => error(
                    ErrorKind::InvalidBinding,
                    format!("index {} is out of bounds of '{}' (size {})", index, end.label, size),
                ),
                _ => {}
            }
        }

        if from.interface.is_mandatory() && to.interface.is_optional() {
            error(
                ErrorKind::MandatoryToOptional,
                format!(
                    "mandatory interface '{}' cannot be bound to optional interface '{}'",
                    from.label, to.label
                ),
            );
        }

        let describe = |end: &BoundEnd<'_>| if end.is_single() { "single" } else { "collection" };
        if from.is_single() != to.is_single() {
            error(
                ErrorKind::BindingCardinality,
                format!(
                    "cannot bind {} interface '{}' to {} interface '{}'",
                    describe(from),
                    from.label,
                    describe(to),
                    to.label
                ),
            );
        } else if !from.is_single() && from.interface.is_mandatory() {
            let (emitted, received) =
                (from.interface.number_of_elements(), to.interface.number_of_elements());
            if emitted >= 0 && received >= 0 && emitted > received {
                error(
                    ErrorKind::BindingCardinality,
                    format!(
                        "'{}' has {} elements but '{}' only {}",
                        from.label, emitted, to.label, received
                    ),
                );
            }
        }

        let mut cast_required = false;
        let (client_sig, server_sig) = (&from.interface.signature, &to.interface.signature);
        if client_sig != server_sig {
            if self.idl.extends(server_sig, client_sig) {
                cast_required = true;
            } else {
                error(
                    ErrorKind::IncompatibleSignature,
                    format!(
                        "'{}' requires {} but '{}' provides {}",
                        from.label, client_sig, to.label, server_sig
                    ),
                );
            }
        }

        if errors.is_empty() {
            Ok(cast_required)
        } else {
            Err(errors)
        }
    }
}

fn lookup(
    def: &Definition,
    endpoint: &Endpoint,
    span: Span,
    ctx: &CompilationContext,
) -> Result<Option<Interface>, CompileError> {
    match endpoint_interface(def, endpoint, ctx) {
        EndpointInterface::Found(itf) => Ok(Some(itf)),
        EndpointInterface::Unresolved => Ok(None),
        EndpointInterface::UnknownComponent => Err(CompileError::new(
            ErrorKind::InvalidBinding,
            span,
            format!("'{}' has no sub-component named '{}'", def.name, endpoint.component),
        )),
        EndpointInterface::UnknownInterface => Err(CompileError::new(
            ErrorKind::InvalidBinding,
            span,
            format!("no interface named '{}' on '{}'", endpoint.interface, endpoint.component),
        )),
    }
}

fn check_binding(
    def: &Definition,
    binding: &Binding,
    checker: &BindingChecker<'_>,
    ctx: &CompilationContext,
) -> Result<bool, Vec<CompileError>> {
    let from = lookup(def, &binding.from, binding.span, ctx);
    let to = lookup(def, &binding.to, binding.span, ctx);
    let (from, to) = match (from, to) {
        (Ok(Some(from)), Ok(Some(to))) => (from, to),
        (Err(a), Err(b)) => return Err(vec![a, b]),
        (Err(e), _) | (_, Err(e)) => return Err(vec![e]),
        _ => return Ok(false),
    };
    checker.check(
        &BoundEnd::new(binding.from.to_string(), &from, binding.from.index),
        &BoundEnd::new(binding.to.to_string(), &to, binding.to.index),
        binding.span,
    )
}

/// Checks every binding and records which ones need a cast.
pub struct BindingCheckerLoader {
    next: Box<dyn Loader>,
}

impl BindingCheckerLoader {
    pub fn new(next: Box<dyn Loader>) -> Self {
        Self { next }
    }
}

impl Loader for BindingCheckerLoader {
    fn load(&self, name: &str, fe: &Frontend, ctx: &mut CompilationContext) -> LoadResult<DefId> {
        let id = self.next.load(name, fe, ctx)?;
        if ctx.get(id).bindings.is_empty() {
            return Ok(id);
        }

        rewrite(id, ctx, |def, ctx| {
            let checker = fe.binding_checker();
            let (view, scope): (&Definition, &CompilationContext) = (def, ctx);
            let results: Vec<_> = view
                .bindings
                .iter()
                .map(|binding| check_binding(view, binding, &checker, scope))
                .collect();
            for (binding, result) in def.bindings.iter_mut().zip(results) {
                match result {
                    Ok(cast_required) => binding.cast_required = cast_required,
                    Err(errors) => {
                        for error in errors {
                            ctx.errors.log(error)?;
                        }
                    }
                }
            }
            Ok(())
        })?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::StaticIdlSignatures;

    fn check(
        from: &Interface,
        from_index: Option<u32>,
        to: &Interface,
        to_index: Option<u32>,
    ) -> Result<bool, Vec<ErrorKind>> {
        let idl = StaticIdlSignatures::new().with("demo.Derived", "demo.I");
        BindingChecker::new(&idl)
            .check(
                &BoundEnd::new("a.c", from, from_index),
                &BoundEnd::new("b.s", to, to_index),
                Span::generated(),
            )
            .map_err(|errors| errors.into_iter().map(|e| e.kind).collect())
    }

    #[test]
    fn test_compatible_binding() {
        let client = Interface::client("c", "demo.I");
        let server = Interface::server("s", "demo.I");
        assert_eq!(check(&client, None, &server, None), Ok(false));
    }

    #[test]
    fn test_subtype_requires_cast() {
        let client = Interface::client("c", "demo.I");
        let server = Interface::server("s", "demo.Derived");
        assert_eq!(check(&client, None, &server, None), Ok(true));
        let narrow = Interface::client("c", "demo.Derived");
        let wide = Interface::server("s", "demo.I");
        assert_eq!(
            check(&narrow, None, &wide, None),
            Err(vec![ErrorKind::IncompatibleSignature])
        );
    }

    #[test]
    fn test_roles() {
        let server = Interface::server("s", "demo.I");
        assert_eq!(
            check(&server, None, &server, None),
            Err(vec![ErrorKind::InvalidBinding])
        );
    }

    #[test]
    fn test_mandatory_to_optional() {
        let client = Interface::client("c", "demo.I");
        let optional = Interface::server("s", "demo.I").optional();
        assert_eq!(
            check(&client, None, &optional, None),
            Err(vec![ErrorKind::MandatoryToOptional])
        );
        let optional_client = Interface::client("c", "demo.I").optional();
        assert_eq!(check(&optional_client, None, &optional, None), Ok(false));
    }

    #[test]
    fn test_cardinality() {
        let single = Interface::client("c", "demo.I");
        let collection = Interface::server("s", "demo.I").collection(Some(2));
        assert_eq!(
            check(&single, None, &collection, None),
            Err(vec![ErrorKind::BindingCardinality])
        );
        assert_eq!(check(&single, None, &collection, Some(1)), Ok(false));
        assert_eq!(
            check(&single, None, &collection, Some(2)),
            Err(vec![ErrorKind::InvalidBinding])
        );
    }

    #[test]
    fn test_collection_sizes() {
        let big = Interface::client("c", "demo.I").collection(Some(4));
        let small = Interface::server("s", "demo.I").collection(Some(2));
        assert_eq!(
            check(&big, None, &small, None),
            Err(vec![ErrorKind::BindingCardinality])
        );
        assert_eq!(check(&small.dual(), None, &big.dual(), None), Ok(false));
    }
}
