//! Environment protocol shared by every evaluation step.
//!
//! An [`Environment`] is a persistent singly linked chain of bindings:
//! extending it never changes the chain other holders see, and several
//! chains may share a tail. Each binding names a cell in the interpreter's
//! [`BindingStore`]; assignment writes that cell in place, which is how a
//! mutation becomes visible to every chain (and every closure) that reaches
//! the binding.
//!
//! Evaluation hands back an [`Evaluated`] pair: the expression's value and
//! the continuation environment later expressions must be evaluated in.

use std::{fmt, rc::Rc};

use crate::runtime::value::Value;

/// Index of a binding cell in a [`BindingStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Arena of binding cells.
///
/// Cells are allocated stack-wise. The interpreter truncates the arena back
/// to its height at the start of a call or scope once nothing created inside
/// can still reach the newer cells.
#[derive(Debug, Default)]
pub struct BindingStore {
    cells: Vec<Value>,
}

impl BindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, value: Value) -> SlotId {
        self.cells.push(value);
        SlotId(self.cells.len() - 1)
    }

    /// `None` when `slot` was reclaimed or belongs to another store.
    pub fn get(&self, slot: SlotId) -> Option<&Value> {
        self.cells.get(slot.0)
    }

    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut Value> {
        self.cells.get_mut(slot.0)
    }

    /// Drops every cell allocated after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.cells.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

struct Node {
    name: Rc<str>,
    slot: SlotId,
    next: Environment,
}

#[derive(Clone, Default)]
pub struct Environment(Option<Rc<Node>>);

impl Environment {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Returns a new chain with `name` bound in front of `self`.
    pub fn bind(&self, name: Rc<str>, slot: SlotId) -> Self {
        Self(Some(Rc::new(Node {
            name,
            slot,
            next: self.clone(),
        })))
    }

    /// Finds the innermost binding for `name`.
    pub fn find(&self, name: &str) -> Option<SlotId> {
        self.iter()
            .find(|(bound, _)| *bound == name)
            .map(|(_, slot)| slot)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            current: self.0.as_deref(),
        }
    }

    /// Bound names, innermost first. Shadowed names appear once per binding.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|(name, _)| name.to_string()).collect()
    }

    pub fn depth(&self) -> usize {
        self.iter().count()
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        match (&self.0, &other.0) {
            (Some(l), Some(r)) => Rc::ptr_eq(l, r),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|(name, _)| name)).finish()
    }
}

// Chains grow by one node per binding, so a long-running loop can build a
// chain far deeper than the call stack; unlink iteratively.
impl Drop for Environment {
    fn drop(&mut self) {
        let mut current = self.0.take();
        while let Some(node) = current {
            match Rc::try_unwrap(node) {
                Ok(mut node) => current = node.next.0.take(),
                Err(_) => break,
            }
        }
    }
}

pub struct Iter<'a> {
    current: Option<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, SlotId);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = node.next.0.as_deref();
        Some((&*node.name, node.slot))
    }
}

/// Value of an evaluation step plus the environment to continue from.
#[derive(Debug, Clone)]
pub struct Evaluated {
    pub value: Value,
    pub env: Environment,
}

impl Evaluated {
    pub fn new(value: Value, env: Environment) -> Self {
        Self { value, env }
    }
}
