use std::collections::HashMap;

/// Where a name resolved during code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSlot {
    /// Slot index in the frame being generated.
    Local(usize),
    /// Declared by an enclosing function's frame.
    Enclosing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SlotBinding {
    name: String,
    initial: Option<i32>,
}

/// Compile-time activation frame: an ordered list of slots, one per
/// declaration, plus the frame of the enclosing function.
///
/// Slot indices are handed out monotonically from 0. Redeclaring a name
/// allocates a new slot and later lookups see the newest one.
#[derive(Debug, Clone, Default)]
pub struct EFrame {
    pub outer: Option<Box<EFrame>>,
    slots: Vec<SlotBinding>,
    store: HashMap<String, usize>,
}

impl EFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_enclosed(outer: EFrame) -> Self {
        Self {
            outer: Some(Box::new(outer)),
            ..Self::default()
        }
    }

    /// Allocates the next slot for `name`. `initial` is the tagged constant
    /// most recently lowered when the declaration was made, if any.
    pub fn declare(&mut self, name: &str, initial: Option<i32>) -> usize {
        let index = self.slots.len();
        self.slots.push(SlotBinding {
            name: name.to_string(),
            initial,
        });
        self.store.insert(name.to_string(), index);
        index
    }

    pub fn resolve(&self, name: &str) -> Option<FrameSlot> {
        match self.store.get(name) {
            Some(index) => Some(FrameSlot::Local(*index)),
            None => self
                .outer
                .as_ref()
                .and_then(|outer| outer.resolve(name))
                .map(|_| FrameSlot::Enclosing),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn initial_constant(&self, slot: usize) -> Option<i32> {
        self.slots.get(slot).and_then(|binding| binding.initial)
    }

    /// Slot names in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|binding| binding.name.as_str())
    }

    /// LLVM type of this frame, `{%eframe*, i32, [N x i32]}`.
    pub fn llvm_type(&self) -> String {
        format!("{{%eframe*, i32, [{} x i32]}}", self.slot_count())
    }

    pub fn into_outer(self) -> Option<EFrame> {
        self.outer.map(|outer| *outer)
    }
}
