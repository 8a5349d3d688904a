//! Environment: a chain of lexical scopes.
//!
//! Each [`Environment`] is a node holding its own bindings plus a link to
//! its enclosing scope. The global environment is the root (`enclosing =
//! None`). A block opens a fresh child pointing at the evaluator's
//! currently active environment; scopes are owned via `Rc<RefCell<_>>` so a
//! child can hold a live reference to its parent without the evaluator
//! needing to juggle lifetimes while walking the tree. Environments never
//! form cycles and a child never outlives the scope that created it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::diagnostics::RuntimeError;
use crate::interpreter::RuntimeValue;
use crate::token::Token;

struct Scope {
    values: HashMap<String, RuntimeValue>,
    enclosing: Option<Environment>,
}

/// A handle to a scope node. Cheap to clone — clones share the same
/// underlying bindings.
#[derive(Clone)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    /// Creates a new global (root) environment with no enclosing scope.
    pub fn new_global() -> Self {
        Environment(Rc::new(RefCell::new(Scope { values: HashMap::new(), enclosing: None })))
    }

    /// Creates a child scope enclosed by `self`.
    pub fn child(&self) -> Self {
        Environment(Rc::new(RefCell::new(Scope {
            values: HashMap::new(),
            enclosing: Some(self.clone()),
        })))
    }

    /// Unconditionally writes into this (innermost) scope, shadowing any
    /// outer binding of the same name.
    pub fn define(&self, name: impl Into<String>, value: RuntimeValue) {
        self.0.borrow_mut().values.insert(name.into(), value);
    }

    /// Searches innermost-first for `name`. Raises `Undefined variable
    /// <lexeme>.` if no ancestor defines it.
    pub fn get(&self, name: &Token) -> Result<RuntimeValue, RuntimeError> {
        let scope = self.0.borrow();
        if let Some(value) = scope.values.get(&name.lexeme) {
            return Ok(value.clone());
        }
        match &scope.enclosing {
            Some(parent) => parent.get(name),
            None => Err(RuntimeError::undefined_variable(name.line, &name.lexeme)),
        }
    }

    /// Searches innermost-first for `name` and mutates the first scope that
    /// defines it. Never creates a new binding; raises the same
    /// undefined-variable error as [`Environment::get`] if none defines it.
    pub fn assign(&self, name: &Token, value: RuntimeValue) -> Result<(), RuntimeError> {
        let mut scope = self.0.borrow_mut();
        if scope.values.contains_key(&name.lexeme) {
            scope.values.insert(name.lexeme.clone(), value);
            return Ok(());
        }
        match &scope.enclosing {
            Some(parent) => {
                let parent = parent.clone();
                drop(scope);
                parent.assign(name, value)
            }
            None => Err(RuntimeError::undefined_variable(name.line, &name.lexeme)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn tok(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, None, 1)
    }

    #[test]
    fn define_then_get_round_trips() {
        let env = Environment::new_global();
        env.define("a", RuntimeValue::Number(1.0));
        assert_eq!(env.get(&tok("a")).unwrap(), RuntimeValue::Number(1.0));
    }

    #[test]
    fn get_searches_enclosing_scopes() {
        let global = Environment::new_global();
        global.define("a", RuntimeValue::Number(1.0));
        let block = global.child();
        assert_eq!(block.get(&tok("a")).unwrap(), RuntimeValue::Number(1.0));
    }

    #[test]
    fn shadowing_in_inner_scope_does_not_touch_outer() {
        let global = Environment::new_global();
        global.define("a", RuntimeValue::Number(1.0));
        let block = global.child();
        block.define("a", RuntimeValue::Number(2.0));
        assert_eq!(block.get(&tok("a")).unwrap(), RuntimeValue::Number(2.0));
        assert_eq!(global.get(&tok("a")).unwrap(), RuntimeValue::Number(1.0));
    }

    #[test]
    fn assign_mutates_the_defining_scope() {
        let global = Environment::new_global();
        global.define("a", RuntimeValue::Number(1.0));
        let block = global.child();
        block.assign(&tok("a"), RuntimeValue::Number(9.0)).unwrap();
        assert_eq!(global.get(&tok("a")).unwrap(), RuntimeValue::Number(9.0));
    }

    #[test]
    fn assign_to_undefined_name_errors_without_creating_binding() {
        let env = Environment::new_global();
        let err = env.assign(&tok("ghost"), RuntimeValue::Nil).unwrap_err();
        assert_eq!(err.message, "Undefined variable ghost.");
        assert!(env.get(&tok("ghost")).is_err());
    }

    #[test]
    fn get_undefined_is_runtime_error() {
        let env = Environment::new_global();
        let err = env.get(&tok("missing")).unwrap_err();
        assert_eq!(err.message, "Undefined variable missing.");
    }
}
