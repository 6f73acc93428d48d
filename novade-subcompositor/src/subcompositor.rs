//! # Subcompositor Logic
//!
//! Core logic behind `wl_subcompositor` and `wl_subsurface`: creating the
//! subsurface role, positioning, stacking requests and the sync/desync switch.
//! The protocol binding calls into these functions and turns the returned
//! [`SubsurfaceError`]s into protocol errors.

use tracing::{debug, trace};

use crate::commit::{self, CommitReport};
use crate::config::SubcompositorConfig;
use crate::error::SubsurfaceError;
use crate::registry::SurfaceRegistry;
use crate::stack::{Placement, StackRequest};
use crate::surface::{PendingState, RoleKind, SurfaceId};

/// Defines the synchronization behavior of a subsurface relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Commits are cached and applied when the parent's state is applied.
    #[default]
    Synchronized,
    /// Commits apply on their own, unless a synchronized ancestor gates them.
    Desynchronized,
}

/// State committed by a subsurface that is still waiting for an ancestor.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CachedState {
    #[default]
    Empty,
    Cached(PendingState),
}

impl CachedState {
    pub fn is_cached(&self) -> bool {
        matches!(self, CachedState::Cached(_))
    }

    pub fn get(&self) -> Option<&PendingState> {
        match self {
            CachedState::Cached(state) => Some(state),
            CachedState::Empty => None,
        }
    }

    /// Folds `state` over whatever is already cached.
    pub fn stash(&mut self, state: PendingState) {
        *self = match std::mem::take(self) {
            CachedState::Empty => CachedState::Cached(state),
            CachedState::Cached(mut cached) => {
                cached.merge(state);
                CachedState::Cached(cached)
            }
        };
    }

    /// Empties the cache, returning its content.
    pub fn take(&mut self) -> Option<PendingState> {
        match std::mem::take(self) {
            CachedState::Cached(state) => Some(state),
            CachedState::Empty => None,
        }
    }
}

/// The `wl_subsurface` role of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsurfaceRole {
    parent: Option<SurfaceId>,
    position: (i32, i32),
    sync_mode: SyncMode,
    pub(crate) cached: CachedState,
}

impl SubsurfaceRole {
    fn new(parent: SurfaceId) -> Self {
        Self {
            parent: Some(parent),
            position: (0, 0),
            sync_mode: SyncMode::default(),
            cached: CachedState::Empty,
        }
    }

    /// The parent, or `None` once the parent has been destroyed.
    pub fn parent(&self) -> Option<SurfaceId> {
        self.parent
    }

    /// Applied offset relative to the parent's origin.
    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    pub fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    pub fn cached(&self) -> &CachedState {
        &self.cached
    }

    pub(crate) fn set_applied_position(&mut self, position: (i32, i32)) {
        self.position = position;
    }

    /// Cuts the link to a destroyed parent. Whatever was cached can never be
    /// released any more, so it is dropped as well.
    pub(crate) fn detach(&mut self) {
        self.parent = None;
        self.cached = CachedState::Empty;
    }
}

/// The `wl_subcompositor` global as seen by one client binding.
///
/// It only creates roles; destroying it leaves every role it created intact.
#[derive(Debug, Clone)]
pub struct Subcompositor {
    max_tree_depth: usize,
}

impl Subcompositor {
    pub fn new(config: &SubcompositorConfig) -> Self {
        Self {
            max_tree_depth: config.max_tree_depth,
        }
    }

    pub fn max_tree_depth(&self) -> usize {
        self.max_tree_depth
    }

    /// `wl_subcompositor.get_subsurface`.
    ///
    /// Makes `surface` a synchronized subsurface of `parent`, placed on top of
    /// the parent's stack at offset `(0, 0)`. Nothing is modified on error.
    pub fn get_subsurface(
        &self,
        registry: &mut SurfaceRegistry,
        surface: SurfaceId,
        parent: SurfaceId,
    ) -> Result<(), SubsurfaceError> {
        // A role is assigned at most once, even after its object is destroyed.
        if registry.surface(surface)?.role.is_some() {
            return Err(SubsurfaceError::InvalidRole { surface });
        }
        registry.surface(parent)?;

        if surface == parent || registry.is_ancestor(surface, parent) {
            return Err(SubsurfaceError::InvalidHierarchy { surface, parent });
        }

        let depth = registry.ancestors(parent).len() + 1 + registry.subtree_height(surface);
        if depth > self.max_tree_depth {
            return Err(SubsurfaceError::DepthLimitExceeded {
                limit: self.max_tree_depth,
            });
        }

        let child = registry.surface_mut(surface)?;
        child.role = Some(RoleKind::Subsurface);
        child.subsurface = Some(SubsurfaceRole::new(parent));
        registry.surface_mut(parent)?.stack.insert_top(surface);

        debug!(%surface, %parent, depth, "subsurface created");
        Ok(())
    }

    /// `wl_subcompositor.destroy`.
    pub fn destroy(self) {
        trace!("subcompositor destroyed, existing subsurfaces stay valid");
    }
}

fn role_mut(
    registry: &mut SurfaceRegistry,
    id: SurfaceId,
) -> Result<&mut SubsurfaceRole, SubsurfaceError> {
    registry
        .surface_mut(id)?
        .subsurface
        .as_mut()
        .ok_or(SubsurfaceError::NotASubsurface(id))
}

/// `wl_subsurface.set_position`. Takes effect with the subsurface's next
/// applied commit.
pub fn set_position(
    registry: &mut SurfaceRegistry,
    id: SurfaceId,
    x: i32,
    y: i32,
) -> Result<(), SubsurfaceError> {
    role_mut(registry, id)?;
    registry.surface_mut(id)?.pending.position = Some((x, y));
    Ok(())
}

fn stage_placement(
    registry: &mut SurfaceRegistry,
    id: SurfaceId,
    sibling: SurfaceId,
    placement: Placement,
) -> Result<(), SubsurfaceError> {
    let parent = role_mut(registry, id)?
        .parent()
        .ok_or(SubsurfaceError::NotASubsurface(id))?;
    let valid = sibling != id
        && registry
            .get(parent)
            .map_or(false, |p| p.stack.contains(sibling));
    if !valid {
        return Err(SubsurfaceError::InvalidSibling {
            surface: id,
            sibling,
        });
    }

    registry.surface_mut(id)?.pending.stack_requests.push(StackRequest {
        reference: sibling,
        placement,
    });
    trace!(%id, %sibling, ?placement, "stack request staged");
    Ok(())
}

/// `wl_subsurface.place_above`. `sibling` may be a sibling or the parent.
pub fn place_above(
    registry: &mut SurfaceRegistry,
    id: SurfaceId,
    sibling: SurfaceId,
) -> Result<(), SubsurfaceError> {
    stage_placement(registry, id, sibling, Placement::Above)
}

/// `wl_subsurface.place_below`. `sibling` may be a sibling or the parent.
pub fn place_below(
    registry: &mut SurfaceRegistry,
    id: SurfaceId,
    sibling: SurfaceId,
) -> Result<(), SubsurfaceError> {
    stage_placement(registry, id, sibling, Placement::Below)
}

/// `wl_subsurface.set_sync` / `set_desync`.
///
/// The mode is not double-buffered. Going desynchronized releases the cached
/// state right away when no synchronized ancestor still holds it back; the
/// returned report lists what was applied.
pub fn set_sync_mode(
    registry: &mut SurfaceRegistry,
    id: SurfaceId,
    mode: SyncMode,
) -> Result<CommitReport, SubsurfaceError> {
    let role = role_mut(registry, id)?;
    let previous = std::mem::replace(&mut role.sync_mode, mode);
    let mut report = CommitReport::new(id);
    debug!(%id, ?previous, ?mode, "sync mode changed");

    if previous == SyncMode::Synchronized
        && mode == SyncMode::Desynchronized
        && role.cached.is_cached()
        && !commit::is_effectively_synchronized(registry, id)
    {
        commit::flush_cached(registry, id, &mut report);
    }
    Ok(report)
}

/// `wl_subsurface.destroy`.
///
/// The surface leaves its parent's stack and unmaps but stays alive. Its
/// role kind stays `Subsurface`, so it can never take another role. A no-op
/// for surfaces without a role object.
pub fn destroy_subsurface_role(
    registry: &mut SurfaceRegistry,
    id: SurfaceId,
) -> Result<(), SubsurfaceError> {
    let surface = registry.surface_mut(id)?;
    let Some(role) = surface.subsurface.take() else {
        return Ok(());
    };
    let _ = surface.pending.take_role_state();

    if let Some(parent) = role.parent() {
        if let Some(parent_surface) = registry.get_mut(parent) {
            parent_surface.stack.remove(id);
        }
    }
    debug!(%id, "subsurface role destroyed");
    Ok(())
}
