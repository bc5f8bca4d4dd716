//! Retained handles into VM state
//!
//! A [`ScriptHandle`] keeps a script value (or a call signature) alive
//! across host calls until it is released. Handles are tokens, not
//! references: they are tied to the VM that issued them, cannot be cloned,
//! and are consumed by release, so a handle is released at most once. The
//! VM releases whatever is still outstanding when it is dropped.

use super::value::Value;

/// Opaque retained reference issued by a [`crate::Vm`].
#[must_use = "a retained handle must be released with Vm::release_handle"]
#[derive(Debug, PartialEq, Eq)]
pub struct ScriptHandle {
    vm_id: u64,
    index: u32,
    generation: u32,
}

/// What a handle refers to.
pub(crate) enum HandleEntry {
    /// A retained value
    Value(Value),
    /// A method signature to invoke with [`crate::Vm::call`]
    Call {
        signature: String,
        arity: usize,
    },
}

struct HandleSlot {
    generation: u32,
    entry: Option<HandleEntry>,
}

/// Generation-checked slab of handle entries.
pub(crate) struct HandleTable {
    vm_id: u64,
    slots: Vec<HandleSlot>,
    free: Vec<u32>,
    live: usize,
}

impl HandleTable {
    pub(crate) fn new(vm_id: u64) -> Self {
        Self {
            vm_id,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn acquire(&mut self, entry: HandleEntry) -> ScriptHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return ScriptHandle {
                vm_id: self.vm_id,
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(HandleSlot {
            generation: 0,
            entry: Some(entry),
        });
        ScriptHandle {
            vm_id: self.vm_id,
            index,
            generation: 0,
        }
    }

    pub(crate) fn get(&self, handle: &ScriptHandle) -> Option<&HandleEntry> {
        if handle.vm_id != self.vm_id {
            return None;
        }
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    pub(crate) fn release(&mut self, handle: ScriptHandle) -> Option<HandleEntry> {
        if handle.vm_id != self.vm_id {
            return None;
        }
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(entry)
    }

    /// Number of handles not yet released.
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Drop every outstanding entry.
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.entry = None;
        }
        self.live = 0;
    }
}
