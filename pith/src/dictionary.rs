use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::{Block, DictRef, Value};

/// A named binding inside a dictionary.
///
/// Code slots re-run `body` on every read; cached slots return `cached`.
#[derive(Debug, Clone)]
pub struct Slot {
    pub name: Rc<str>,
    pub body: Block,
    pub cached: Option<Value>,
}

impl Slot {
    pub fn code(name: &str, body: Block) -> Self {
        Self {
            name: Rc::from(name),
            body,
            cached: None,
        }
    }

    pub fn cached(name: &str, value: Value) -> Self {
        Self {
            name: Rc::from(name),
            body: Block::default(),
            cached: Some(value),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// The dictionary this slot caches, if any.
    pub fn cached_dict(&self) -> Option<&DictRef> {
        self.cached.as_ref().and_then(Value::as_dict)
    }
}

/// A prototype-style namespace: ordered slots plus one fallback parent.
pub struct Dictionary {
    name: Option<String>,
    parent: Option<Weak<RefCell<Dictionary>>>,
    slots: Vec<Slot>,
}

impl Dictionary {
    pub fn new(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            parent: None,
            slots: Vec::new(),
        }
    }

    pub fn new_ref(name: Option<&str>) -> DictRef {
        Rc::new(RefCell::new(Self::new(name)))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<DictRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn set_parent(&mut self, parent: Option<&DictRef>) {
        self.parent = parent.map(Rc::downgrade);
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn local(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| &*s.name == name)
    }

    fn local_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| &*s.name == name)
    }

    /// Appends a code slot.
    pub fn add_slot(&mut self, name: &str, body: Block) {
        self.slots.push(Slot::code(name, body));
    }

    /// Stores `slot`, replacing a local slot of the same name.
    pub fn define(&mut self, slot: Slot) {
        match self.local_mut(&slot.name) {
            Some(existing) => *existing = slot,
            None => self.slots.push(slot),
        }
    }

    /// Caches `value` in the local slot `name`, creating it if needed.
    pub fn set_value(&mut self, name: &str, value: Value) {
        match self.local_mut(name) {
            Some(slot) => slot.cached = Some(value),
            None => self.slots.push(Slot::cached(name, value)),
        }
    }

    pub fn remove_slot(&mut self, name: &str) -> bool {
        let before = self.slots.len();
        self.slots.retain(|s| &*s.name != name);
        self.slots.len() != before
    }

    /// Shallow copy: same name and parent, slot values cloned.
    pub fn copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            parent: self.parent.clone(),
            slots: self.slots.clone(),
        }
    }

    /// Standalone data copy: cached slots only, sanitized recursively, no parent.
    pub fn sanitize(&self) -> Self {
        let mut copy = Self::new(self.name());
        for slot in &self.slots {
            if let Some(value) = &slot.cached {
                copy.set_value(&slot.name, value.sanitize());
            }
        }
        copy
    }
}

impl std::fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.slots.iter().map(|s| &*s.name).collect();
        f.debug_struct("Dictionary")
            .field("name", &self.name)
            .field("has_parent", &self.parent().is_some())
            .field("slots", &names)
            .finish()
    }
}

// ───────────────────────────────────────────────────────────────────
// Lookup
// ───────────────────────────────────────────────────────────────────

/// used to find and break cycles
struct VisitedLink<'a> {
    prev: Option<&'a VisitedLink<'a>>,
    dict: *const RefCell<Dictionary>,
}

impl VisitedLink<'_> {
    fn contains(&self, dict: *const RefCell<Dictionary>) -> bool {
        let mut link = Some(self);
        while let Some(current) = link {
            if current.dict == dict {
                return true;
            }
            link = current.prev;
        }
        false
    }
}

/// Resolves `name` in `dict`, then along its parent chain.
pub fn lookup(dict: &DictRef, name: &str) -> Option<Slot> {
    lookup_chained(dict, name, None)
}

fn lookup_chained(dict: &DictRef, name: &str, chain: Option<&VisitedLink>) -> Option<Slot> {
    let ptr = Rc::as_ptr(dict);
    if chain.is_some_and(|link| link.contains(ptr)) {
        log::warn!("parent cycle while looking up '{name}'");
        return None;
    }

    let parent = {
        let d = dict.borrow();
        if let Some(slot) = d.local(name) {
            return Some(slot.clone());
        }
        d.parent()?
    };

    let link = VisitedLink { prev: chain, dict: ptr };
    lookup_chained(&parent, name, Some(&link))
}

/// Finds the root-level dictionary called `name`.
pub fn find_dict(root: &DictRef, name: &str) -> Option<DictRef> {
    root.borrow().local(name)?.cached_dict().cloned()
}

/// True when making `parent` the parent of `child` would close a cycle.
pub fn would_cycle(child: &DictRef, parent: &DictRef) -> bool {
    let mut seen: Vec<*const RefCell<Dictionary>> = Vec::new();
    let mut current = Some(parent.clone());
    while let Some(dict) = current {
        if Rc::ptr_eq(&dict, child) {
            return true;
        }
        let ptr = Rc::as_ptr(&dict);
        // an existing cycle further up never reaches `child`
        if seen.contains(&ptr) {
            return false;
        }
        seen.push(ptr);
        current = dict.borrow().parent();
    }
    false
}
