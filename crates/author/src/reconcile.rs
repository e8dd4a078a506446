//! Post-edit refresh of derived state.
//!
//! For every affected object, in order: a waypoint handle writes its
//! position back into its vehicle's path, the vehicle's path line is
//! rebuilt, bounds are recomputed, and the property panel refreshes if the
//! object is selected. The gizmo is then reattached to the selection.

use crate::host::EditContext;
use crate::resolve::resolve;
use crate::snapshot::{PathState, TransformState};
use tracing::trace;
use worldedit_kernel::ObjectKey;

pub fn reconcile(ctx: &mut EditContext<'_>, keys: &[ObjectKey]) {
    for &key in keys {
        let Some(obj) = ctx.host.scene().get(key) else {
            continue;
        };
        let handle = obj.handle;
        let position = obj.transform.position;
        let is_vehicle = obj.is_vehicle();

        if let Some(handle) = handle {
            if let Some(path) = ctx
                .host
                .scene_mut()
                .get_mut(handle.vehicle)
                .and_then(|vehicle| vehicle.path.as_mut())
            {
                if let Some(node) = path.get_mut(handle.index) {
                    *node = position;
                }
            }
        }

        let vehicle = match handle {
            Some(handle) => Some(handle.vehicle),
            None if is_vehicle => Some(key),
            None => None,
        };
        if let Some(vehicle) = vehicle {
            ctx.host.rebuild_path_visual(vehicle);
        }

        ctx.host.recompute_bounds(key);
        if let Some(handle) = handle {
            ctx.host.recompute_bounds(handle.vehicle);
        }

        if ctx.selection.contains(key) {
            ctx.host.on_properties_changed(key);
        }
    }
    ctx.selection.refresh(ctx.host);
}

/// Write each resolvable state back onto its live object, then reconcile.
pub fn apply_transform_snapshot(ctx: &mut EditContext<'_>, states: &[TransformState]) {
    let mut touched = Vec::with_capacity(states.len());
    for state in states {
        let Some(key) = resolve(ctx.host.scene(), &state.object_uuid) else {
            continue;
        };
        if ctx.host.scene_mut().set_transform(key, state.transform()) {
            touched.push(key);
        }
    }
    trace!(requested = states.len(), applied = touched.len(), "transform snapshot");
    reconcile(ctx, &touched);
}

/// Replace each resolvable vehicle's whole path, then reconcile.
pub fn apply_path_snapshot(ctx: &mut EditContext<'_>, states: &[PathState]) {
    let mut touched = Vec::with_capacity(states.len());
    for state in states {
        let Some(key) = resolve(ctx.host.scene(), &state.car_uuid) else {
            continue;
        };
        let Some(vehicle) = ctx.host.scene_mut().get_mut(key) else {
            continue;
        };
        if vehicle.path.is_some() {
            vehicle.path = Some(state.nodes());
            touched.push(key);
        }
    }
    trace!(requested = states.len(), applied = touched.len(), "path snapshot");
    reconcile(ctx, &touched);
}
