use crate::ast::*;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::types::JsValue;
use std::rc::Rc;

mod context;
mod environment;
mod eval;
mod function;
mod function_expression;
mod heap;
mod object;
mod realm;

pub use context::{ExecutionContext, ExecutionContextStack};
pub use eval::Completion;
pub use environment::{
    EnvRef, Environment, PrivateEnvRef, PrivateEnvironment, PrivateName, get_identifier_reference,
    resolve_binding, resolve_private_identifier,
};
pub use function::{Closure, FunctionName, FunctionSlots, ThisMode, ordinary_function_create};
pub use function_expression::{instantiate_function_expression, this_mode_for};
pub use heap::Heap;
pub use object::{JsObjectData, ObjRef, PropertyDescriptor, set_prototype_of};
pub use realm::{Intrinsics, Realm, reparent_intrinsic};

pub struct Interpreter {
    heap: Heap,
    realm: Rc<Realm>,
    execution_contexts: ExecutionContextStack,
}

impl Interpreter {
    pub fn new() -> Result<Self> {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Result<Self> {
        let mut heap = Heap::new();
        let realm = Realm::create(&mut heap)?;
        let mut execution_contexts = ExecutionContextStack::new();
        execution_contexts.push(ExecutionContext::for_script(realm.clone(), config.script_strict));
        Ok(Self {
            heap,
            realm,
            execution_contexts,
        })
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn realm(&self) -> &Rc<Realm> {
        &self.realm
    }

    pub fn global_env(&self) -> &EnvRef {
        self.realm.global_env()
    }

    pub fn running_context(&self) -> Result<&ExecutionContext> {
        self.execution_contexts.running().ok_or(Error::NoRunningContext)
    }

    pub fn push_context(&mut self, context: ExecutionContext) {
        self.execution_contexts.push(context);
    }

    pub fn pop_context(&mut self) -> Option<ExecutionContext> {
        self.execution_contexts.pop()
    }

    /// Pushes a context whose lexical environment is a fresh block scope
    /// nested in the running one.
    pub fn enter_block_scope(&mut self) -> Result<EnvRef> {
        let running = self.running_context()?;
        let env = Environment::new_declarative(Some(running.lexical_environment().clone()));
        let context = running.with_lexical_environment(env.clone());
        self.execution_contexts.push(context);
        Ok(env)
    }

    pub fn closure(&self, value: &JsValue) -> Option<Closure> {
        Closure::from_value(&self.heap, value)
    }

    /// Evaluates a function expression in the running execution context.
    pub fn instantiate_function_expression(
        &mut self,
        definition: &Rc<FunctionDefinition>,
    ) -> Result<Closure> {
        let context = self
            .execution_contexts
            .running()
            .ok_or(Error::NoRunningContext)?;
        instantiate_function_expression(&mut self.heap, context, definition)
    }
}
