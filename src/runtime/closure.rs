use std::{cell::RefCell, fmt, rc::Rc};

use crate::{runtime::environment::Environment, syntax::FunctionLiteral};

/// Function literal paired with the environment its body resolves free
/// names in.
///
/// The environment starts as the one the literal was evaluated in and is
/// replaced every time the closure is assigned to a binding, so a closure
/// stored under `f` sees `f` itself (and bindings declared before it in the
/// same step) when called.
pub struct Closure {
    pub function: Rc<FunctionLiteral>,
    env: RefCell<Environment>,
}

impl Closure {
    pub fn new(function: Rc<FunctionLiteral>, env: Environment) -> Self {
        Self {
            function,
            env: RefCell::new(env),
        }
    }

    pub fn environment(&self) -> Environment {
        self.env.borrow().clone()
    }

    pub fn rebind(&self, env: Environment) {
        *self.env.borrow_mut() = env;
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("parameters", &self.function.parameters)
            .field("env", &*self.env.borrow())
            .finish()
    }
}
