use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::{SignalRef, Value};

/// A reactive cell. Writes mark it dirty until the host clears it.
#[derive(Debug)]
pub struct Signal {
    value: Value,
    dirty: bool,
}

impl Signal {
    pub fn get(&self) -> &Value {
        &self.value
    }

    pub fn set(&mut self, value: Value) {
        self.value = value;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Runtime-wide list of every live signal.
///
/// Entries are weak: a signal lives as long as the slot or value holding it.
#[derive(Debug, Default)]
pub struct SignalRegistry {
    signals: Vec<Weak<RefCell<Signal>>>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, value: Value) -> SignalRef {
        self.signals.retain(|s| s.strong_count() > 0);
        let signal = Rc::new(RefCell::new(Signal {
            value,
            dirty: false,
        }));
        self.signals.push(Rc::downgrade(&signal));
        signal
    }

    pub fn has_dirty(&self) -> bool {
        self.live().any(|s| s.borrow().dirty)
    }

    pub fn clear_dirty(&self) {
        for signal in self.live() {
            signal.borrow_mut().dirty = false;
        }
    }

    /// Number of signals still alive.
    pub fn len(&self) -> usize {
        self.live().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live(&self) -> impl Iterator<Item = SignalRef> + '_ {
        self.signals.iter().filter_map(Weak::upgrade)
    }
}
