//! Instantiation of function expressions (§15.2.5, §15.5.4, §15.6.4, §15.8.4).
//!
//! All four species share one protocol: an optional self-reference scope,
//! OrdinaryFunctionCreate against the species prototype, SetFunctionName,
//! the species-specific finishing step, then initialization of the
//! self-reference binding.

use super::context::ExecutionContext;
use super::environment::Environment;
use super::function::{Closure, FunctionName, ThisMode, ordinary_function_create};
use super::heap::Heap;
use super::object::PropertyDescriptor;
use crate::ast::{FunctionDefinition, Species};
use crate::error::Result;
use crate::keys;
use crate::types::{JsObject, JsValue};
use std::rc::Rc;

/// What happens to a closure after it has been named.
enum Finish {
    /// MakeConstructor with `%Object.prototype%` as the parent of the new
    /// `prototype` object.
    Constructor(JsObject),
    /// A fresh instance prototype inheriting from the given object.
    InstancePrototype(JsObject),
    Plain,
}

/// `[[ThisMode]]` for a function expression of `definition` evaluated in
/// `context`.
///
/// Generators additionally pick up the strictness of the surrounding program;
/// the other species only look at their own body.
pub fn this_mode_for(definition: &FunctionDefinition, context: &ExecutionContext) -> ThisMode {
    let strict = match definition.species {
        Species::Generator => definition.strict || context.is_strict(),
        Species::Ordinary | Species::Async | Species::AsyncGenerator => definition.strict,
    };
    if strict {
        ThisMode::Strict
    } else {
        ThisMode::Global
    }
}

pub fn instantiate_function_expression(
    heap: &mut Heap,
    context: &ExecutionContext,
    definition: &Rc<FunctionDefinition>,
) -> Result<Closure> {
    let name = definition.binding_name();
    let scope = context.lexical_environment();

    let func_env = if name.is_empty() {
        None
    } else {
        let env = Environment::new_declarative(Some(scope.clone()));
        env.borrow_mut().create_immutable_binding(name, false)?;
        Some(env)
    };

    let intrinsics = context.intrinsics();
    let (function_prototype, finish) = match definition.species {
        Species::Ordinary => (
            intrinsics.function_prototype,
            Finish::Constructor(intrinsics.object_prototype),
        ),
        Species::Async => (intrinsics.async_function_prototype, Finish::Plain),
        Species::Generator => (
            intrinsics.generator_function_prototype,
            Finish::InstancePrototype(intrinsics.generator_prototype),
        ),
        Species::AsyncGenerator => (
            intrinsics.async_generator_function_prototype,
            Finish::InstancePrototype(intrinsics.async_generator_prototype),
        ),
    };

    let this_mode = this_mode_for(definition, context);
    tracing::debug!(
        function = name,
        species = ?definition.species,
        ?this_mode,
        self_binding = func_env.is_some(),
        "instantiate function expression"
    );

    let closure = ordinary_function_create(
        heap,
        function_prototype,
        definition,
        this_mode,
        func_env.clone().unwrap_or_else(|| scope.clone()),
        context.private_environment().cloned(),
        context.realm(),
    )?;

    closure.set_function_name(FunctionName::from(name), None)?;

    match finish {
        Finish::Constructor(object_prototype) => closure.make_constructor(heap, object_prototype)?,
        Finish::InstancePrototype(parent) => {
            let (prototype, _) = heap.ordinary_object_create(Some(parent))?;
            closure.define_property_or_throw(
                &keys::PROTOTYPE,
                PropertyDescriptor::data(JsValue::Object(prototype), true, false, false),
            )?;
        }
        Finish::Plain => {}
    }

    if let Some(env) = func_env {
        debug_assert!(
            env.borrow().has_binding(name) && !env.borrow().is_initialized(name),
            "self-reference binding must be created and still uninitialized"
        );
        env.borrow_mut().initialize_binding(name, closure.value())?;
    }

    Ok(closure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expression, Literal, Pattern, Statement};
    use crate::error::Error;
    use crate::interpreter::environment::{PrivateEnvironment, resolve_binding};
    use crate::interpreter::realm::Realm;
    use proptest::prelude::*;

    struct Fixture {
        heap: Heap,
        realm: Rc<Realm>,
        context: ExecutionContext,
    }

    impl Fixture {
        fn new(script_strict: bool) -> Self {
            let mut heap = Heap::new();
            let realm = Realm::create(&mut heap).unwrap();
            let context = ExecutionContext::for_script(realm.clone(), script_strict);
            Self {
                heap,
                realm,
                context,
            }
        }

        fn instantiate(&mut self, def: &Rc<FunctionDefinition>) -> Result<Closure> {
            instantiate_function_expression(&mut self.heap, &self.context, def)
        }

        fn proto_of(&self, obj: JsObject) -> Option<JsObject> {
            let o = self.heap.get(obj).unwrap();
            let data = o.borrow();
            data.prototype.as_ref().and_then(|p| p.borrow().object())
        }
    }

    fn def(name: Option<&str>, species: Species) -> Rc<FunctionDefinition> {
        Rc::new(FunctionDefinition::new(
            name.map(str::to_string),
            vec![],
            vec![],
            species.is_async(),
            species.is_generator(),
        ))
    }

    fn strict_def(name: Option<&str>, species: Species) -> Rc<FunctionDefinition> {
        let body = vec![Statement::Expression(Expression::Literal(Literal::String(
            "use strict".into(),
        )))];
        Rc::new(FunctionDefinition::new(
            name.map(str::to_string),
            vec![],
            body,
            species.is_async(),
            species.is_generator(),
        ))
    }

    const ALL_SPECIES: [Species; 4] = [
        Species::Ordinary,
        Species::Async,
        Species::Generator,
        Species::AsyncGenerator,
    ];

    #[test]
    fn anonymous_ordinary_function() {
        let mut fx = Fixture::new(false);
        let closure = fx.instantiate(&def(None, Species::Ordinary)).unwrap();
        assert_eq!(closure.name(), "");
        assert!(closure.is_constructor());
        assert!(Rc::ptr_eq(closure.environment(), fx.context.lexical_environment()));
        assert_eq!(closure.get_prototype_of(), Some(fx.realm.intrinsics().function_prototype));
        assert_eq!(closure.length(), 0.0);
    }

    #[test]
    fn named_async_function_binds_itself() {
        let mut fx = Fixture::new(false);
        let closure = fx.instantiate(&def(Some("f"), Species::Async)).unwrap();

        assert_eq!(closure.name(), "f");
        assert!(!closure.is_constructor());
        assert!(closure.prototype_property().is_none());
        assert_eq!(
            closure.get_prototype_of(),
            Some(fx.realm.intrinsics().async_function_prototype)
        );

        let inside = resolve_binding(closure.environment(), "f", false).unwrap();
        assert_eq!(inside.as_object(), Some(closure.object()));
        assert_eq!(
            resolve_binding(fx.context.lexical_environment(), "f", false).unwrap_err(),
            Error::UnresolvableReference("f".into())
        );

        // the self-reference scope sits directly on top of the enclosing one
        let outer = closure.environment().borrow().outer().unwrap();
        assert!(Rc::ptr_eq(&outer, fx.context.lexical_environment()));
    }

    #[test]
    fn generator_instances_get_distinct_prototypes() {
        let mut fx = Fixture::new(false);
        let g = def(Some("g"), Species::Generator);
        let first = fx.instantiate(&g).unwrap();
        let second = fx.instantiate(&g).unwrap();

        assert_ne!(first.object(), second.object());
        let p1 = first.prototype_property().unwrap();
        let p2 = second.prototype_property().unwrap();
        assert_ne!(p1, p2);

        let base = fx.realm.intrinsics().generator_prototype;
        assert_eq!(fx.proto_of(p1), Some(base));
        assert_eq!(fx.proto_of(p2), Some(base));

        for closure in [&first, &second] {
            assert!(!closure.is_constructor());
            assert_eq!(closure.name(), "g");
            let desc = closure.own_property("prototype").unwrap();
            assert_eq!(
                (desc.writable, desc.enumerable, desc.configurable),
                (Some(true), Some(false), Some(false))
            );
            // instance prototypes carry no constructor back-link
            let proto = fx.heap.get(closure.prototype_property().unwrap()).unwrap();
            assert!(!proto.borrow().has_own_property("constructor"));
        }
    }

    #[test]
    fn async_generator_mirrors_generator_wiring() {
        let mut fx = Fixture::new(false);
        let ag = def(Some("ag"), Species::AsyncGenerator);
        let a = fx.instantiate(&ag).unwrap();
        let b = fx.instantiate(&ag).unwrap();
        let intrinsics = *fx.realm.intrinsics();

        assert!(!a.is_constructor());
        assert_eq!(a.get_prototype_of(), Some(intrinsics.async_generator_function_prototype));
        let (pa, pb) = (a.prototype_property().unwrap(), b.prototype_property().unwrap());
        assert_ne!(pa, pb);
        assert_eq!(fx.proto_of(pa), Some(intrinsics.async_generator_prototype));
        assert_eq!(fx.proto_of(pb), Some(intrinsics.async_generator_prototype));
    }

    #[test]
    fn duplicate_self_binding_is_rejected() {
        let fx = Fixture::new(false);
        let env = Environment::new_declarative(Some(fx.context.lexical_environment().clone()));
        env.borrow_mut().create_immutable_binding("f", false).unwrap();
        assert_eq!(
            env.borrow_mut().create_immutable_binding("f", false),
            Err(Error::DuplicateBinding("f".into()))
        );
        assert!(!env.borrow().is_initialized("f"));
    }

    #[test]
    fn failed_instantiation_allocates_nothing() {
        let fx = Fixture::new(false);
        // the realm's intrinsics are not in this heap
        let mut empty = Heap::new();
        let result = instantiate_function_expression(
            &mut empty,
            &fx.context,
            &def(Some("f"), Species::Ordinary),
        );
        assert!(matches!(result, Err(Error::ObjectModel(_))));
        assert!(empty.is_empty());
        assert!(!fx.context.lexical_environment().borrow().has_binding("f"));
    }

    #[test]
    fn constructor_eligibility_by_species() {
        let mut fx = Fixture::new(false);
        for species in ALL_SPECIES {
            let closure = fx.instantiate(&def(None, species)).unwrap();
            assert_eq!(closure.is_constructor(), species == Species::Ordinary, "{species:?}");
            assert_eq!(closure.species(), species);
            assert_eq!(closure.data().borrow().class_name, species.class_name());
        }
    }

    #[test]
    fn this_mode_follows_definition_strictness() {
        let mut fx = Fixture::new(false);
        for species in ALL_SPECIES {
            let sloppy = fx.instantiate(&def(None, species)).unwrap();
            assert_eq!(sloppy.this_mode(), ThisMode::Global, "{species:?}");
            let strict = fx.instantiate(&strict_def(None, species)).unwrap();
            assert_eq!(strict.this_mode(), ThisMode::Strict, "{species:?}");
            assert!(strict.is_strict());
        }
    }

    #[test]
    fn only_generators_inherit_global_strictness() {
        let mut fx = Fixture::new(true);
        for species in ALL_SPECIES {
            let closure = fx.instantiate(&def(None, species)).unwrap();
            let expected = if species == Species::Generator {
                ThisMode::Strict
            } else {
                ThisMode::Global
            };
            assert_eq!(closure.this_mode(), expected, "{species:?}");
            assert!(!closure.is_strict());
        }
    }

    #[test]
    fn private_environment_is_captured() {
        let mut fx = Fixture::new(false);
        let private = PrivateEnvironment::new(None);
        fx.context = fx.context.with_private_environment(Some(private.clone()));
        let closure = fx.instantiate(&def(Some("m"), Species::Ordinary)).unwrap();
        assert!(Rc::ptr_eq(closure.private_environment().unwrap(), &private));
        assert!(Rc::ptr_eq(closure.realm(), &fx.realm));
    }

    #[test]
    fn ordinary_prototype_points_back() {
        let mut fx = Fixture::new(false);
        let closure = fx.instantiate(&def(Some("C"), Species::Ordinary)).unwrap();
        let proto = closure.prototype_property().unwrap();
        assert_eq!(fx.proto_of(proto), Some(fx.realm.intrinsics().object_prototype));
        let proto = fx.heap.get(proto).unwrap();
        assert_eq!(
            proto.borrow().get_property_value("constructor").and_then(|v| v.as_object()),
            Some(closure.object())
        );
    }

    #[test]
    fn self_binding_is_immutable() {
        let mut fx = Fixture::new(false);
        let closure = fx.instantiate(&def(Some("f"), Species::Ordinary)).unwrap();
        let env = closure.environment().clone();
        env.borrow_mut()
            .set_mutable_binding("f", JsValue::Number(1.0), false)
            .unwrap();
        assert_eq!(
            resolve_binding(&env, "f", false).unwrap().as_object(),
            Some(closure.object())
        );
        assert_eq!(
            env.borrow_mut().set_mutable_binding("f", JsValue::Null, true),
            Err(Error::ImmutableBinding("f".into()))
        );
    }

    #[test]
    fn sibling_closures_share_enclosing_scope() {
        let mut fx = Fixture::new(false);
        let a = fx.instantiate(&def(None, Species::Ordinary)).unwrap();
        let b = fx.instantiate(&def(Some("b"), Species::Generator)).unwrap();
        let b_outer = b.environment().borrow().outer().unwrap();
        assert!(Rc::ptr_eq(a.environment(), &b_outer));
    }

    #[test]
    fn length_counts_leading_simple_parameters() {
        let mut fx = Fixture::new(false);
        let params = vec![
            Pattern::Identifier("a".into()),
            Pattern::Rest(Box::new(Pattern::Identifier("rest".into()))),
        ];
        let definition = Rc::new(FunctionDefinition::new(Some("h".into()), params, vec![], false, true));
        let closure = fx.instantiate(&definition).unwrap();
        assert_eq!(closure.length(), 1.0);
    }

    fn species_strategy() -> impl Strategy<Value = Species> {
        prop_oneof![
            Just(Species::Ordinary),
            Just(Species::Async),
            Just(Species::Generator),
            Just(Species::AsyncGenerator),
        ]
    }

    proptest! {
        #[test]
        fn prop_self_reference_visible_only_inside(
            name in "[a-zA-Z_$][a-zA-Z0-9_$]{0,12}",
            species in species_strategy(),
            script_strict in any::<bool>(),
        ) {
            prop_assume!(name != "undefined");
            let mut fx = Fixture::new(script_strict);
            let closure = fx.instantiate(&def(Some(&name), species)).unwrap();
            let inside = resolve_binding(closure.environment(), &name, true).unwrap();
            prop_assert_eq!(inside.as_object(), Some(closure.object()));
            prop_assert!(resolve_binding(fx.context.lexical_environment(), &name, true).is_err());
            prop_assert_eq!(closure.name().to_rust_string(), name);
        }

        #[test]
        fn prop_anonymous_captures_enclosing_scope(
            species in species_strategy(),
            depth in 0usize..4,
        ) {
            let mut fx = Fixture::new(false);
            for _ in 0..depth {
                let block = Environment::new_declarative(Some(fx.context.lexical_environment().clone()));
                fx.context = fx.context.with_lexical_environment(block);
            }
            let closure = fx.instantiate(&def(None, species)).unwrap();
            prop_assert!(Rc::ptr_eq(closure.environment(), fx.context.lexical_environment()));
        }
    }
}
