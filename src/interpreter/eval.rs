use super::*;
use crate::types::JsString;

/// Outcome of running a statement list.
#[derive(Debug, Clone)]
pub enum Completion {
    Normal(JsValue),
    Return(JsValue),
}

impl Interpreter {
    pub fn eval_expr(&mut self, expr: &Expression) -> Result<JsValue> {
        match expr {
            Expression::Literal(lit) => Ok(eval_literal(lit)),
            Expression::Identifier(name) => {
                let context = self.running_context()?;
                resolve_binding(context.lexical_environment(), name, context.is_strict())
            }
            Expression::Function(definition) => {
                Ok(self.instantiate_function_expression(definition)?.value())
            }
        }
    }

    pub fn exec_statements(&mut self, statements: &[Statement]) -> Result<Completion> {
        let mut last = JsValue::Undefined;
        for statement in statements {
            match self.exec_statement(statement)? {
                Completion::Normal(value) => last = value,
                ret @ Completion::Return(_) => return Ok(ret),
            }
        }
        Ok(Completion::Normal(last))
    }

    fn exec_statement(&mut self, statement: &Statement) -> Result<Completion> {
        match statement {
            Statement::Empty => Ok(Completion::Normal(JsValue::Undefined)),
            Statement::Expression(expr) => Ok(Completion::Normal(self.eval_expr(expr)?)),
            Statement::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr)?,
                    None => JsValue::Undefined,
                };
                Ok(Completion::Return(value))
            }
            Statement::Block(body) => {
                self.enter_block_scope()?;
                let result = self.exec_statements(body);
                self.pop_context();
                result
            }
        }
    }

    /// Runs a closure's body to completion in a fresh function scope nested
    /// in its captured environment. Parameters are bound to `undefined`;
    /// default initializers are not evaluated and nothing suspends.
    pub fn evaluate_body(&mut self, closure: &Closure) -> Result<JsValue> {
        let env = Environment::new_declarative(Some(closure.environment().clone()));
        {
            let mut scope = env.borrow_mut();
            for name in closure.definition().parameter_names() {
                if !scope.has_binding(&name) {
                    scope.create_mutable_binding(&name, false)?;
                    scope.initialize_binding(&name, JsValue::Undefined)?;
                }
            }
        }
        self.push_context(ExecutionContext::new(
            closure.realm().clone(),
            env,
            closure.private_environment().cloned(),
            closure.is_strict(),
        ));
        let result = self.exec_statements(&closure.definition().body);
        self.pop_context();
        match result? {
            Completion::Normal(_) => Ok(JsValue::Undefined),
            Completion::Return(value) => Ok(value),
        }
    }
}

fn eval_literal(lit: &Literal) -> JsValue {
    match lit {
        Literal::Null => JsValue::Null,
        Literal::Boolean(b) => JsValue::Boolean(*b),
        Literal::Number(n) => JsValue::Number(*n),
        Literal::String(s) => JsValue::String(JsString::from_str(s)),
    }
}
