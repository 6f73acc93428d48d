use novade_subcompositor::{
    BufferFormat, BufferId, BufferRef, Compositor, CompositorConfig, RoleKind, SubsurfaceError,
    SurfaceId, SyncMode,
};
use pretty_assertions::assert_eq;

fn buffer(id: u64) -> BufferRef {
    BufferRef::new(BufferId::new(id), 16, 16, BufferFormat::Argb8888)
}

fn compositor() -> Compositor {
    Compositor::new(CompositorConfig::default())
}

fn current_buffer(compositor: &Compositor, id: SurfaceId) -> Option<BufferRef> {
    compositor.surface(id).unwrap().current().buffer
}

fn painted(compositor: &Compositor) -> Vec<SurfaceId> {
    compositor.snapshot().iter().map(|e| e.surface).collect()
}

#[test]
fn second_get_subsurface_is_invalid_role() {
    let mut c = compositor();
    let parent = c.create_surface();
    let other = c.create_surface();
    let child = c.create_surface();
    c.get_subsurface(child, parent).unwrap();

    for candidate in [parent, other] {
        assert_eq!(
            c.get_subsurface(child, candidate),
            Err(SubsurfaceError::InvalidRole { surface: child })
        );
    }
}

#[test]
fn descendant_as_parent_is_invalid_hierarchy() {
    let mut c = compositor();
    let a = c.create_surface();
    let b = c.create_surface();
    let d = c.create_surface();
    c.get_subsurface(b, a).unwrap();
    c.get_subsurface(d, b).unwrap();

    let before: Vec<_> = [a, b, d]
        .iter()
        .map(|id| (c.surface(*id).unwrap().stack().snapshot(), c.surface(*id).unwrap().role()))
        .collect();
    assert_eq!(
        c.get_subsurface(a, d),
        Err(SubsurfaceError::InvalidHierarchy { surface: a, parent: d })
    );
    let after: Vec<_> = [a, b, d]
        .iter()
        .map(|id| (c.surface(*id).unwrap().stack().snapshot(), c.surface(*id).unwrap().role()))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn synchronized_child_revealed_by_parent_commit() {
    let mut c = compositor();
    let p = c.create_surface();
    let child = c.create_surface();
    c.get_subsurface(child, p).unwrap();

    c.attach(child, Some(buffer(1)), 0, 0).unwrap();
    c.commit(child).unwrap();
    assert_eq!(current_buffer(&c, child), None);

    c.commit(p).unwrap();
    assert_eq!(current_buffer(&c, child), Some(buffer(1)));
}

#[test]
fn desynchronized_child_applies_on_own_commit() {
    let mut c = compositor();
    let p = c.create_surface();
    let child = c.create_surface();
    c.get_subsurface(child, p).unwrap();
    c.set_sync_mode(child, SyncMode::Desynchronized).unwrap();

    c.attach(child, Some(buffer(2)), 0, 0).unwrap();
    c.commit(child).unwrap();
    assert_eq!(current_buffer(&c, child), Some(buffer(2)));
}

#[test]
fn switching_to_desync_flushes_cached_state() {
    let mut c = compositor();
    let p = c.create_surface();
    let child = c.create_surface();
    c.get_subsurface(child, p).unwrap();

    c.attach(child, Some(buffer(3)), 0, 0).unwrap();
    c.commit(child).unwrap();
    c.set_sync_mode(child, SyncMode::Desynchronized).unwrap();
    assert_eq!(current_buffer(&c, child), Some(buffer(3)));
}

#[test]
fn reorder_is_atomic_with_content() {
    let mut c = compositor();
    let p = c.create_surface();
    let child = c.create_surface();
    let sibling = c.create_surface();
    c.set_role(p, RoleKind::Toplevel).unwrap();
    c.get_subsurface(child, p).unwrap();
    c.get_subsurface(sibling, p).unwrap();
    c.set_sync_mode(child, SyncMode::Desynchronized).unwrap();
    c.set_sync_mode(sibling, SyncMode::Desynchronized).unwrap();

    for id in [p, child, sibling] {
        c.attach(id, Some(buffer(id.as_raw())), 0, 0).unwrap();
        c.commit(id).unwrap();
    }
    assert_eq!(painted(&c), vec![p, child, sibling]);

    c.place_above(child, sibling).unwrap();
    c.attach(child, Some(buffer(99)), 0, 0).unwrap();
    assert_eq!(painted(&c), vec![p, child, sibling]);
    assert_eq!(current_buffer(&c, child), Some(buffer(child.as_raw())));

    c.commit(child).unwrap();
    assert_eq!(painted(&c), vec![p, sibling, child]);
    assert_eq!(current_buffer(&c, child), Some(buffer(99)));
}

#[test]
fn three_level_chain_needs_every_commit() {
    let mut c = compositor();
    let root = c.create_surface();
    let a = c.create_surface();
    let b = c.create_surface();
    c.get_subsurface(a, root).unwrap();
    c.get_subsurface(b, a).unwrap();

    c.attach(b, Some(buffer(5)), 0, 0).unwrap();
    c.commit(b).unwrap();
    c.commit(root).unwrap();
    assert_eq!(current_buffer(&c, b), None);

    c.commit(a).unwrap();
    c.commit(root).unwrap();
    assert_eq!(current_buffer(&c, b), Some(buffer(5)));
}

#[test]
fn destroying_parent_unmaps_child() {
    let mut c = compositor();
    let p = c.create_surface();
    let child = c.create_surface();
    c.get_subsurface(child, p).unwrap();
    c.attach(child, Some(buffer(1)), 0, 0).unwrap();
    c.commit(child).unwrap();
    c.attach(p, Some(buffer(2)), 0, 0).unwrap();
    c.commit(p).unwrap();
    assert!(c.is_mapped(child));
    assert_eq!(painted(&c), vec![p, child]);

    c.destroy_surface(p);
    assert!(!c.is_mapped(child));
    assert!(c.surface(child).unwrap().parent().is_none());
    assert!(painted(&c).is_empty());
}

#[test]
fn null_buffer_unmaps() {
    let mut c = compositor();
    let s = c.create_surface();
    c.attach(s, Some(buffer(1)), 0, 0).unwrap();
    c.commit(s).unwrap();
    assert!(c.is_mapped(s));

    c.attach(s, None, 0, 0).unwrap();
    c.commit(s).unwrap();
    assert!(!c.is_mapped(s));
}

#[test]
fn positions_at_the_i32_edge_do_not_overflow() {
    let mut c = compositor();
    let root = c.create_surface();
    let a = c.create_surface();
    let b = c.create_surface();
    c.get_subsurface(a, root).unwrap();
    c.get_subsurface(b, a).unwrap();
    for id in [a, b] {
        c.set_sync_mode(id, SyncMode::Desynchronized).unwrap();
    }
    c.set_position(a, i32::MAX, 0).unwrap();
    c.set_position(b, 1, 0).unwrap();
    for id in [root, a, b] {
        c.attach(id, Some(buffer(id.as_raw())), 0, 0).unwrap();
        c.commit(id).unwrap();
    }

    let scene = c.snapshot();
    assert_eq!(scene.len(), 3);
    assert_eq!(scene[2].position, (i32::MAX, 0));
    assert_eq!(
        c.surface_at((i32::MAX as f64 + 2.0, 5.0)),
        Some((b, (2.0, 5.0)))
    );
}

#[test]
fn destroyed_subsurface_role_cannot_be_recreated() {
    let mut c = compositor();
    let p = c.create_surface();
    let child = c.create_surface();
    c.get_subsurface(child, p).unwrap();
    c.destroy_subsurface_role(child).unwrap();
    assert_eq!(
        c.get_subsurface(child, p),
        Err(SubsurfaceError::InvalidRole { surface: child })
    );
}
