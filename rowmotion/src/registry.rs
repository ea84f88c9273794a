use crate::key::KeyMap;
use crate::{AnimationHandle, ElementTag};

struct Entry<A> {
    generation: u64,
    handle: A,
}

/// Position → active animation handle, at most one entry per position.
///
/// Every entry remembers the bind generation of the element it was started on. Removal through
/// [`AnimationRegistry::end_for_tag`] only succeeds when the tag's generation matches, which
/// keeps a recycled element from ending an animation that now belongs to another element.
pub struct AnimationRegistry<A> {
    entries: KeyMap<usize, Entry<A>>,
}

impl<A: AnimationHandle> AnimationRegistry<A> {
    pub fn new() -> Self {
        Self {
            entries: KeyMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, position: usize) -> bool {
        self.entries.contains_key(&position)
    }

    pub fn get(&self, position: usize) -> Option<&A> {
        self.entries.get(&position).map(|e| &e.handle)
    }

    /// Returns the generation recorded for `position`, if any.
    pub fn generation(&self, position: usize) -> Option<u64> {
        self.entries.get(&position).map(|e| e.generation)
    }

    /// Registers `handle` under `tag.position`.
    ///
    /// Any previous entry for the position is ended and removed first.
    pub fn insert(&mut self, tag: ElementTag, handle: A) {
        self.end_position(tag.position);
        rtrace!(
            position = tag.position,
            generation = tag.generation,
            "AnimationRegistry::insert"
        );
        self.entries.insert(
            tag.position,
            Entry {
                generation: tag.generation,
                handle,
            },
        );
    }

    /// Ends and removes the entry registered through `tag`.
    ///
    /// Returns `false` when there is no entry at the tag's position, or the entry there was
    /// registered by a different bind.
    pub fn end_for_tag(&mut self, tag: ElementTag) -> bool {
        let Some(entry) = self.entries.get(&tag.position) else {
            return false;
        };
        if entry.generation != tag.generation {
            rdebug!(
                position = tag.position,
                expected = tag.generation,
                found = entry.generation,
                "AnimationRegistry: stale tag, entry belongs to another element"
            );
            return false;
        }
        self.end_position(tag.position)
    }

    /// Ends and removes whatever is registered at `position`.
    pub fn end_position(&mut self, position: usize) -> bool {
        let Some(mut entry) = self.entries.remove(&position) else {
            return false;
        };
        rtrace!(position, "AnimationRegistry::end_position");
        entry.handle.end();
        true
    }

    /// Ends and removes every entry.
    pub fn end_all(&mut self) {
        for (_, mut entry) in core::mem::take(&mut self.entries) {
            entry.handle.end();
        }
    }

    /// Drops entries whose handle already ended or was cancelled.
    ///
    /// Returns the number of entries removed.
    pub fn prune_finished(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.handle.state().is_finished());
        before - self.entries.len()
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }
}

impl<A: AnimationHandle> Default for AnimationRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> core::fmt::Debug for AnimationRegistry<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnimationRegistry")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}
