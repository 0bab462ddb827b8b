//! Type-tag dispatch table.
//!
//! Maps each of the 256 possible type tags to an optional decoder target.
//! A tag without a target is rejected by the decoder with
//! [`FrameError::NoDecoderForType`](crate::FrameError::NoDecoderForType).

const SLOTS: usize = u8::MAX as usize + 1;

/// Fixed mapping from type tag to decoder target.
#[derive(Debug, Clone)]
pub struct DispatchTable<D> {
    slots: Vec<Option<D>>,
}

impl<D> DispatchTable<D> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_slot(mut self, tag: u8, target: D) -> Self {
        self.insert(tag, target);
        self
    }

    /// Register `target` for `tag`, returning the previous target if any.
    pub fn insert(&mut self, tag: u8, target: D) -> Option<D> {
        let idx = usize::from(tag);
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        self.slots[idx].replace(target)
    }

    /// Unregister the target for `tag`.
    pub fn remove(&mut self, tag: u8) -> Option<D> {
        self.slots.get_mut(usize::from(tag)).and_then(Option::take)
    }

    pub fn get(&self, tag: u8) -> Option<&D> {
        self.slots.get(usize::from(tag)).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, tag: u8) -> Option<&mut D> {
        self.slots.get_mut(usize::from(tag)).and_then(Option::as_mut)
    }

    pub fn contains(&self, tag: u8) -> bool {
        self.get(tag).is_some()
    }

    /// Tags with a registered target, in ascending order.
    pub fn tags(&self) -> impl Iterator<Item = u8> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(idx, _)| idx as u8)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<D> Default for DispatchTable<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a table from an ordered sequence indexed by tag.
///
/// Entries past index 255 can never be addressed by a tag and are dropped.
impl<D> From<Vec<Option<D>>> for DispatchTable<D> {
    fn from(mut slots: Vec<Option<D>>) -> Self {
        slots.truncate(SLOTS);
        Self { slots }
    }
}

impl<D> FromIterator<(u8, D)> for DispatchTable<D> {
    fn from_iter<I: IntoIterator<Item = (u8, D)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (tag, target) in iter {
            table.insert(tag, target);
        }
        table
    }
}
