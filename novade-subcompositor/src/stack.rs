//! Per-parent paint order of subsurfaces.
//!
//! A [`StackOrder`] lists a parent surface and its direct children from bottom
//! to top. The parent itself is part of the sequence so that children can be
//! placed below it; everything after the parent's own entry paints above it.

use crate::error::SubsurfaceError;
use crate::surface::SurfaceId;

/// Where a reordered surface ends up relative to its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Above,
    Below,
}

/// A reorder staged by `wl_subsurface.place_above` / `place_below`, applied
/// when the requesting subsurface's state is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackRequest {
    pub reference: SurfaceId,
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOrder {
    owner: SurfaceId,
    entries: Vec<SurfaceId>,
}

impl StackOrder {
    /// Creates the stack of `owner`, containing only the owner itself.
    pub fn new(owner: SurfaceId) -> Self {
        Self {
            owner,
            entries: vec![owner],
        }
    }

    pub fn owner(&self) -> SurfaceId {
        self.owner
    }

    /// Returns `true` if `id` is the owner or one of its children.
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.entries.contains(&id)
    }

    pub fn has_child(&self, id: SurfaceId) -> bool {
        id != self.owner && self.contains(id)
    }

    /// Children from bottom to top, without the owner.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = SurfaceId> + '_ {
        let owner = self.owner;
        self.entries.iter().copied().filter(move |id| *id != owner)
    }

    pub fn child_count(&self) -> usize {
        self.entries.len() - 1
    }

    /// Puts `child` on top of the stack.
    pub fn insert_top(&mut self, child: SurfaceId) {
        debug_assert_ne!(child, self.owner, "a surface cannot stack itself as a child");
        self.entries.retain(|id| *id != child);
        self.entries.push(child);
    }

    /// Removes `child`; returns `false` if it was not a child. The owner entry
    /// is never removed.
    pub fn remove(&mut self, child: SurfaceId) -> bool {
        if child == self.owner {
            return false;
        }
        let before = self.entries.len();
        self.entries.retain(|id| *id != child);
        before != self.entries.len()
    }

    /// Moves `child` directly above or below `reference`.
    ///
    /// `reference` may be a sibling or the owner. Returns `Ok(true)` if the
    /// order changed and `Ok(false)` if `child` already sat there.
    pub fn reorder(
        &mut self,
        child: SurfaceId,
        reference: SurfaceId,
        placement: Placement,
    ) -> Result<bool, SubsurfaceError> {
        if !self.has_child(child) {
            return Err(SubsurfaceError::NotASubsurface(child));
        }
        if reference == child || !self.contains(reference) {
            return Err(SubsurfaceError::InvalidSibling {
                surface: child,
                sibling: reference,
            });
        }

        let before = self.entries.clone();
        self.entries.retain(|id| *id != child);
        // Present, checked above.
        let ref_index = self
            .entries
            .iter()
            .position(|id| *id == reference)
            .unwrap_or(self.entries.len());
        let insert_at = match placement {
            Placement::Above => ref_index + 1,
            Placement::Below => ref_index,
        };
        self.entries.insert(insert_at.min(self.entries.len()), child);
        Ok(self.entries != before)
    }

    /// Bottom-to-top order including the owner.
    pub fn snapshot(&self) -> Vec<SurfaceId> {
        self.entries.clone()
    }

    pub fn as_slice(&self) -> &[SurfaceId] {
        &self.entries
    }
}
