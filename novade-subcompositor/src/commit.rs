//! Commit propagation.
//!
//! A commit either applies a surface's pending state or, for a subsurface that
//! is synchronized (itself or through an ancestor), parks it in the role's
//! [`CachedState`](crate::subcompositor::CachedState). Whenever a surface's
//! state is applied, cached children are released depth-first.
//!
//! The cascade walks an explicit worklist of [`SurfaceId`]s and re-resolves
//! every id before touching it, so the walk never holds a reference into the
//! registry across steps.

use tracing::{debug, trace, warn};

use crate::error::SubsurfaceError;
use crate::registry::SurfaceRegistry;
use crate::subcompositor::SyncMode;
use crate::surface::{PendingState, StateChanges, SurfaceId};

/// What a commit (or a sync-mode switch) did to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    /// The surface whose request triggered this report.
    pub surface: SurfaceId,
    /// `true` if the triggering surface's state went into its cache.
    pub cached: bool,
    /// Surfaces whose state was applied, in application order.
    pub applied: Vec<(SurfaceId, StateChanges)>,
}

impl CommitReport {
    pub(crate) fn new(surface: SurfaceId) -> Self {
        Self {
            surface,
            cached: false,
            applied: Vec::new(),
        }
    }

    pub fn was_applied(&self, id: SurfaceId) -> bool {
        self.applied.iter().any(|(applied, _)| *applied == id)
    }

    pub fn changes_for(&self, id: SurfaceId) -> Option<StateChanges> {
        self.applied
            .iter()
            .find(|(applied, _)| *applied == id)
            .map(|(_, changes)| *changes)
    }
}

/// Whether commits of `id` currently wait for an ancestor.
///
/// True when `id` is a synchronized subsurface or when any subsurface above
/// it is. Surfaces without a subsurface role, and subsurfaces whose parent is
/// gone, are never synchronized.
pub fn is_effectively_synchronized(registry: &SurfaceRegistry, id: SurfaceId) -> bool {
    let mut cursor = Some(id);
    let mut steps = 0;
    while let Some(current) = cursor {
        let Some(role) = registry.get(current).and_then(|s| s.subsurface()) else {
            return false;
        };
        if role.parent().is_none() {
            return false;
        }
        if role.sync_mode() == SyncMode::Synchronized {
            return true;
        }
        cursor = role.parent();
        steps += 1;
        if steps > registry.len() {
            return false;
        }
    }
    false
}

/// `wl_surface.commit`.
///
/// On error nothing changes and the pending state is kept.
pub fn commit(registry: &mut SurfaceRegistry, id: SurfaceId) -> Result<CommitReport, SubsurfaceError> {
    registry.surface(id)?.validate_pending()?;

    let synchronized = is_effectively_synchronized(registry, id);
    let surface = registry.surface_mut(id)?;
    let candidate = std::mem::take(&mut surface.pending);
    let mut report = CommitReport::new(id);

    if synchronized {
        if let Some(role) = surface.subsurface.as_mut() {
            trace!(%id, changes = ?candidate.changes(), "commit cached");
            role.cached.stash(candidate);
            report.cached = true;
            return Ok(report);
        }
    }

    // Anything still cached is older than this commit; the candidate wins
    // field by field.
    let state = match surface.subsurface.as_mut().and_then(|role| role.cached.take()) {
        Some(mut cached) => {
            cached.merge(candidate);
            cached
        }
        None => candidate,
    };

    let changes = apply_state(registry, id, state);
    report.applied.push((id, changes));
    cascade(registry, id, &mut report);
    debug!(%id, applied = report.applied.len(), "commit applied");
    Ok(report)
}

/// Applies the cached state of `id`, if any, and releases its children.
pub(crate) fn flush_cached(registry: &mut SurfaceRegistry, id: SurfaceId, report: &mut CommitReport) {
    let Some(state) = take_cached(registry, id) else {
        return;
    };
    let changes = apply_state(registry, id, state);
    report.applied.push((id, changes));
    cascade(registry, id, report);
}

fn take_cached(registry: &mut SurfaceRegistry, id: SurfaceId) -> Option<PendingState> {
    registry
        .get_mut(id)?
        .subsurface
        .as_mut()?
        .cached
        .take()
}

/// Depth-first release of cached children below `root`, whose own state has
/// just been applied.
fn cascade(registry: &mut SurfaceRegistry, root: SurfaceId, report: &mut CommitReport) {
    let mut work = children_top_first(registry, root);
    while let Some(child) = work.pop() {
        // A child that did not commit keeps holding back its own subtree.
        let Some(state) = take_cached(registry, child) else {
            continue;
        };
        let changes = apply_state(registry, child, state);
        trace!(%child, ?changes, "cached state released");
        report.applied.push((child, changes));
        work.extend(children_top_first(registry, child));
    }
}

/// Children of `id` reversed, so that popping visits them bottom first.
fn children_top_first(registry: &SurfaceRegistry, id: SurfaceId) -> Vec<SurfaceId> {
    registry
        .get(id)
        .map(|surface| surface.stack().children().rev().collect())
        .unwrap_or_default()
}

/// Makes `state` current for `id`, including the subsurface offset and any
/// staged reorders in the parent's stack.
fn apply_state(registry: &mut SurfaceRegistry, id: SurfaceId, mut state: PendingState) -> StateChanges {
    let (position, stack_requests) = state.take_role_state();
    let Some(surface) = registry.get_mut(id) else {
        return StateChanges::empty();
    };

    let mut changes = surface.current.apply(state);
    let parent = match surface.subsurface.as_mut() {
        Some(role) => {
            if let Some(position) = position {
                role.set_applied_position(position);
                changes |= StateChanges::POSITION;
            }
            role.parent()
        }
        None => None,
    };

    if stack_requests.is_empty() {
        return changes;
    }
    let Some(parent_surface) = parent.and_then(|parent| registry.get_mut(parent)) else {
        debug!(%id, dropped = stack_requests.len(), "stack requests dropped, no parent");
        return changes;
    };
    for request in stack_requests {
        match parent_surface
            .stack
            .reorder(id, request.reference, request.placement)
        {
            Ok(true) => changes |= StateChanges::STACK,
            Ok(false) => {}
            Err(err) => warn!(%id, %err, "stale stack request dropped"),
        }
    }
    changes
}
