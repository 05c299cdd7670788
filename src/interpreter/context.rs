use super::environment::{EnvRef, PrivateEnvRef};
use super::realm::{Intrinsics, Realm};
use std::rc::Rc;

/// §9.4 Execution Context, restricted to the state closure instantiation reads.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    realm: Rc<Realm>,
    lexical_environment: EnvRef,
    private_environment: Option<PrivateEnvRef>,
    strict: bool,
}

impl ExecutionContext {
    pub fn new(
        realm: Rc<Realm>,
        lexical_environment: EnvRef,
        private_environment: Option<PrivateEnvRef>,
        strict: bool,
    ) -> Self {
        Self {
            realm,
            lexical_environment,
            private_environment,
            strict,
        }
    }

    /// Context for top-level script code of `realm`.
    pub fn for_script(realm: Rc<Realm>, strict: bool) -> Self {
        let env = realm.global_env().clone();
        Self::new(realm, env, None, strict)
    }

    /// Same realm and strictness, different lexical environment. Blocks and
    /// function bodies enter new scopes this way.
    pub fn with_lexical_environment(&self, env: EnvRef) -> Self {
        Self {
            lexical_environment: env,
            ..self.clone()
        }
    }

    pub fn with_private_environment(&self, env: Option<PrivateEnvRef>) -> Self {
        Self {
            private_environment: env,
            ..self.clone()
        }
    }

    pub fn realm(&self) -> &Rc<Realm> {
        &self.realm
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        self.realm.intrinsics()
    }

    pub fn lexical_environment(&self) -> &EnvRef {
        &self.lexical_environment
    }

    pub fn private_environment(&self) -> Option<&PrivateEnvRef> {
        self.private_environment.as_ref()
    }

    /// Whether the surrounding program is strict mode code.
    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

/// The interpreter's call stack of execution contexts. Closure instantiation
/// only ever looks at the top.
#[derive(Debug, Default)]
pub struct ExecutionContextStack {
    contexts: Vec<ExecutionContext>,
}

impl ExecutionContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, context: ExecutionContext) {
        self.contexts.push(context);
    }

    pub fn pop(&mut self) -> Option<ExecutionContext> {
        self.contexts.pop()
    }

    /// The running execution context.
    pub fn running(&self) -> Option<&ExecutionContext> {
        self.contexts.last()
    }

    pub fn depth(&self) -> usize {
        self.contexts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::environment::{Environment, PrivateEnvironment};
    use crate::interpreter::heap::Heap;

    #[test]
    fn running_context_is_top_of_stack() {
        let mut heap = Heap::new();
        let realm = Realm::create(&mut heap).unwrap();
        let mut stack = ExecutionContextStack::new();
        assert!(stack.running().is_none());

        let script = ExecutionContext::for_script(realm.clone(), false);
        assert!(Rc::ptr_eq(script.lexical_environment(), realm.global_env()));
        stack.push(script.clone());

        let block = Environment::new_declarative(Some(script.lexical_environment().clone()));
        let private = PrivateEnvironment::new(None);
        let inner = script
            .with_lexical_environment(block.clone())
            .with_private_environment(Some(private.clone()));
        stack.push(inner);

        let running = stack.running().unwrap();
        assert!(Rc::ptr_eq(running.lexical_environment(), &block));
        assert!(Rc::ptr_eq(running.private_environment().unwrap(), &private));
        assert_eq!(stack.depth(), 2);

        stack.pop();
        assert!(stack.running().unwrap().private_environment().is_none());
    }
}
