//! Slot arrays exchanged with native code

use finch_sdk::frame::out_of_range;
use finch_sdk::{AbiResult, CallFrame, ForeignRef, HostValue, NativeError, SlotType};

use super::value::Value;

/// Slot array backing a [`CallFrame`].
///
/// The VM uses one for every foreign call (receiver plus arguments) and
/// keeps one more for the embedding API.
#[derive(Debug, Default)]
pub struct Slots {
    values: Vec<Value>,
}

impl Slots {
    /// Slots for a foreign call: receiver in slot 0, arguments after it.
    pub(crate) fn for_call(receiver: Value, args: Vec<Value>) -> Self {
        let mut values = Vec::with_capacity(args.len() + 1);
        values.push(receiver);
        values.extend(args);
        Self { values }
    }

    pub(crate) fn value(&self, slot: usize) -> AbiResult<&Value> {
        self.values
            .get(slot)
            .ok_or_else(|| out_of_range(slot, self.values.len()))
    }

    pub(crate) fn set(&mut self, slot: usize, value: Value) -> AbiResult<()> {
        let count = self.values.len();
        let entry = self.values.get_mut(slot).ok_or_else(|| out_of_range(slot, count))?;
        *entry = value;
        Ok(())
    }

    /// Values in slots `from..from + count`.
    pub(crate) fn range(&self, from: usize, count: usize) -> AbiResult<Vec<Value>> {
        let end = from + count;
        if end > self.values.len() {
            return Err(out_of_range(end.saturating_sub(1), self.values.len()));
        }
        Ok(self.values[from..end].to_vec())
    }

    /// The call's result: whatever slot 0 holds.
    pub(crate) fn into_return(mut self) -> Value {
        if self.values.is_empty() {
            Value::Null
        } else {
            self.values.swap_remove(0)
        }
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
    }
}

impl CallFrame for Slots {
    fn slot_count(&self) -> usize {
        self.values.len()
    }

    fn ensure_slots(&mut self, count: usize) {
        if self.values.len() < count {
            self.values.resize(count, Value::Null);
        }
    }

    fn slot_type(&self, slot: usize) -> AbiResult<SlotType> {
        Ok(self.value(slot)?.slot_type())
    }

    fn get_value(&self, slot: usize) -> AbiResult<HostValue> {
        let value = self.value(slot)?;
        value.to_host().ok_or(NativeError::Unmarshalable {
            slot,
            got: value.slot_type(),
        })
    }

    fn set_value(&mut self, slot: usize, value: HostValue) -> AbiResult<()> {
        self.set(slot, Value::from_host(value))
    }

    fn get_foreign(&self, slot: usize) -> AbiResult<ForeignRef> {
        match self.value(slot)? {
            Value::Foreign(instance) => Ok(instance.object.clone()),
            other => Err(NativeError::TypeMismatch {
                slot,
                expected: SlotType::Foreign,
                got: other.slot_type(),
            }),
        }
    }
}
