//! Slot-indexed call frames
//!
//! Every native invocation receives a [`CallFrame`]. Slot 0 holds the
//! receiver on entry (the class for static methods, the instance otherwise)
//! and whatever slot 0 holds on exit becomes the call's return value.
//! Slots 1..N hold the positional arguments.

use crate::error::{AbiResult, NativeError};
use crate::foreign::ForeignRef;
use crate::value::{HandleId, HostValue, SlotType};

/// Slot access for one native call.
///
/// Reads fail with [`NativeError::TypeMismatch`] when the slot holds another
/// type and with [`NativeError::SlotOutOfRange`] past the current capacity.
/// Writes past the capacity fail too; call [`CallFrame::ensure_slots`] first.
pub trait CallFrame {
    /// Current number of slots.
    fn slot_count(&self) -> usize;

    /// Grow the frame to at least `count` slots. New slots hold null.
    fn ensure_slots(&mut self, count: usize);

    /// Type of the value in `slot`.
    fn slot_type(&self, slot: usize) -> AbiResult<SlotType>;

    /// Copy out the value in `slot`.
    fn get_value(&self, slot: usize) -> AbiResult<HostValue>;

    /// Store a host value into `slot`.
    fn set_value(&mut self, slot: usize, value: HostValue) -> AbiResult<()>;

    /// Storage of the foreign instance in `slot`.
    fn get_foreign(&self, slot: usize) -> AbiResult<ForeignRef>;

    // ------------------------------------------------------------------------
    // Typed accessors
    // ------------------------------------------------------------------------

    /// Read a number.
    fn get_num(&self, slot: usize) -> AbiResult<f64> {
        read_typed(self, slot, SlotType::Num, |v| v.as_num())
    }

    /// Read a boolean.
    fn get_bool(&self, slot: usize) -> AbiResult<bool> {
        read_typed(self, slot, SlotType::Bool, |v| v.as_bool())
    }

    /// Read a string.
    fn get_str(&self, slot: usize) -> AbiResult<String> {
        read_typed(self, slot, SlotType::Str, |v| match v {
            HostValue::Str(s) => Some(s),
            _ => None,
        })
    }

    /// Read an opaque handle.
    fn get_handle(&self, slot: usize) -> AbiResult<HandleId> {
        read_typed(self, slot, SlotType::Handle, |v| v.as_handle())
    }

    /// Read a list.
    fn get_list(&self, slot: usize) -> AbiResult<Vec<HostValue>> {
        read_typed(self, slot, SlotType::List, |v| match v {
            HostValue::List(items) => Some(items),
            _ => None,
        })
    }

    /// Write a number.
    fn set_num(&mut self, slot: usize, value: f64) -> AbiResult<()> {
        self.set_value(slot, HostValue::Num(value))
    }

    /// Write a boolean.
    fn set_bool(&mut self, slot: usize, value: bool) -> AbiResult<()> {
        self.set_value(slot, HostValue::Bool(value))
    }

    /// Write a string.
    fn set_str(&mut self, slot: usize, value: &str) -> AbiResult<()> {
        self.set_value(slot, HostValue::Str(value.to_string()))
    }

    /// Write an opaque handle.
    fn set_handle(&mut self, slot: usize, value: HandleId) -> AbiResult<()> {
        self.set_value(slot, HostValue::Handle(value))
    }

    /// Write null.
    fn set_null(&mut self, slot: usize) -> AbiResult<()> {
        self.set_value(slot, HostValue::Null)
    }

    /// Write the call's return value (slot 0).
    fn ret(&mut self, value: HostValue) -> AbiResult<()> {
        self.set_value(0, value)
    }
}

fn read_typed<F, T>(
    frame: &F,
    slot: usize,
    expected: SlotType,
    extract: impl FnOnce(HostValue) -> Option<T>,
) -> AbiResult<T>
where
    F: CallFrame + ?Sized,
{
    let got = frame.slot_type(slot)?;
    if got != expected {
        return Err(mismatch(slot, expected, got));
    }
    extract(frame.get_value(slot)?).ok_or_else(|| mismatch(slot, expected, got))
}

fn mismatch(slot: usize, expected: SlotType, got: SlotType) -> NativeError {
    NativeError::TypeMismatch { slot, expected, got }
}

/// Out-of-range error for `slot` in a frame of `count` slots.
pub fn out_of_range(slot: usize, count: usize) -> NativeError {
    NativeError::SlotOutOfRange { slot, count }
}

// ============================================================================
// HostFrame
// ============================================================================

/// One slot of a [`HostFrame`].
#[derive(Debug, Clone)]
pub enum HostSlot {
    /// Plain value
    Value(HostValue),
    /// Foreign instance
    Foreign(ForeignRef),
}

/// In-memory [`CallFrame`] with no interpreter behind it.
///
/// Used to drive handlers directly, e.g. from unit tests or when the host
/// invokes a binding on its own behalf.
#[derive(Debug, Clone, Default)]
pub struct HostFrame {
    slots: Vec<HostSlot>,
}

impl HostFrame {
    /// Frame whose slot 0 is null and whose arguments follow in order.
    pub fn with_args(args: impl IntoIterator<Item = HostValue>) -> Self {
        let mut slots = vec![HostSlot::Value(HostValue::Null)];
        slots.extend(args.into_iter().map(HostSlot::Value));
        Self { slots }
    }

    /// Frame whose receiver is a foreign instance.
    pub fn with_receiver(receiver: ForeignRef, args: impl IntoIterator<Item = HostValue>) -> Self {
        let mut frame = Self::with_args(args);
        frame.slots[0] = HostSlot::Foreign(receiver);
        frame
    }

    /// Store a foreign instance into `slot`.
    pub fn set_foreign(&mut self, slot: usize, object: ForeignRef) -> AbiResult<()> {
        let count = self.slots.len();
        let entry = self.slots.get_mut(slot).ok_or_else(|| out_of_range(slot, count))?;
        *entry = HostSlot::Foreign(object);
        Ok(())
    }

    /// Value left in slot 0.
    pub fn return_value(&self) -> HostValue {
        match self.slots.first() {
            Some(HostSlot::Value(v)) => v.clone(),
            _ => HostValue::Null,
        }
    }

    fn slot(&self, slot: usize) -> AbiResult<&HostSlot> {
        self.slots
            .get(slot)
            .ok_or_else(|| out_of_range(slot, self.slots.len()))
    }
}

impl CallFrame for HostFrame {
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn ensure_slots(&mut self, count: usize) {
        if self.slots.len() < count {
            self.slots.resize(count, HostSlot::Value(HostValue::Null));
        }
    }

    fn slot_type(&self, slot: usize) -> AbiResult<SlotType> {
        Ok(match self.slot(slot)? {
            HostSlot::Value(v) => v.slot_type(),
            HostSlot::Foreign(_) => SlotType::Foreign,
        })
    }

    fn get_value(&self, slot: usize) -> AbiResult<HostValue> {
        match self.slot(slot)? {
            HostSlot::Value(v) => Ok(v.clone()),
            HostSlot::Foreign(_) => Err(NativeError::Unmarshalable {
                slot,
                got: SlotType::Foreign,
            }),
        }
    }

    fn set_value(&mut self, slot: usize, value: HostValue) -> AbiResult<()> {
        let count = self.slots.len();
        let entry = self.slots.get_mut(slot).ok_or_else(|| out_of_range(slot, count))?;
        *entry = HostSlot::Value(value);
        Ok(())
    }

    fn get_foreign(&self, slot: usize) -> AbiResult<ForeignRef> {
        match self.slot(slot)? {
            HostSlot::Foreign(obj) => Ok(obj.clone()),
            HostSlot::Value(v) => Err(mismatch(slot, SlotType::Foreign, v.slot_type())),
        }
    }
}
