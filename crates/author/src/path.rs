//! Waypoint editing on vehicle paths.
//!
//! Each operation snapshots every affected vehicle's path before and after,
//! reconciles the path visuals before returning, and records one undo unit
//! covering the whole batch, or nothing if no path changed.

use crate::command::PathEditCommand;
use crate::config::EditorConfig;
use crate::history::History;
use crate::host::EditContext;
use crate::reconcile::reconcile;
use crate::snapshot::capture_paths;
use tracing::{debug, warn};
use worldedit_kernel::ObjectKey;

/// Add one node per targeted vehicle.
///
/// A vehicle or its last handle appends after the last node (or after the
/// vehicle when the path is empty). Any other handle inserts directly after
/// itself. Vehicles already at the node cap are skipped. The new handles
/// become the selection.
pub fn add_waypoint(
    ctx: &mut EditContext<'_>,
    history: &mut History,
    targets: &[ObjectKey],
    config: &EditorConfig,
) -> Vec<ObjectKey> {
    // vehicle -> node to insert after; None appends
    let mut plan: Vec<(ObjectKey, Option<usize>)> = Vec::new();
    for &key in targets {
        if ctx.scene().get(key).is_some_and(|obj| obj.is_vehicle()) {
            upsert(&mut plan, key, None);
        }
    }
    for &key in targets {
        if let Some(handle) = ctx.scene().get(key).and_then(|obj| obj.handle) {
            upsert(&mut plan, handle.vehicle, Some(handle.index));
        }
    }
    if plan.is_empty() {
        return Vec::new();
    }

    let vehicles: Vec<ObjectKey> = plan.iter().map(|(vehicle, _)| *vehicle).collect();
    let before = capture_paths(ctx.scene(), &vehicles);
    let mut inserted: Vec<(ObjectKey, usize)> = Vec::new();
    for (vehicle, after) in plan {
        let Some(obj) = ctx.host.scene_mut().get_mut(vehicle) else {
            continue;
        };
        let origin = obj.transform.position;
        let id = obj.id;
        let Some(path) = obj.path.as_mut() else {
            continue;
        };
        if path.len() >= config.max_waypoints {
            warn!(vehicle = %id, max = config.max_waypoints, "max waypoints reached");
            continue;
        }
        let count = path.len();
        let (at, reference) = match after {
            Some(index) if index + 1 < count => (index + 1, path[index]),
            _ => (count, path.last().copied().unwrap_or(origin)),
        };
        path.insert(at, reference + config.waypoint_offset);
        debug!(vehicle = %id, index = at, "waypoint added");
        inserted.push((vehicle, at));
    }
    if inserted.is_empty() {
        return Vec::new();
    }

    let changed: Vec<ObjectKey> = inserted.iter().map(|(vehicle, _)| *vehicle).collect();
    reconcile(ctx, &changed);
    let after = capture_paths(ctx.scene(), &vehicles);
    history.push(PathEditCommand::new(before, after).with_description("Add waypoint"));

    let handles: Vec<ObjectKey> = inserted
        .iter()
        .filter_map(|(vehicle, index)| ctx.scene().waypoint_handle(*vehicle, *index))
        .collect();
    if !handles.is_empty() {
        ctx.selection.replace_all(ctx.host, handles.iter().copied());
    }
    handles
}

/// Pop the last node of every targeted vehicle. Empty paths are left alone.
pub fn remove_last_waypoint(
    ctx: &mut EditContext<'_>,
    history: &mut History,
    targets: &[ObjectKey],
) -> bool {
    let mut vehicles: Vec<ObjectKey> = Vec::new();
    for &key in targets {
        if ctx.scene().get(key).is_some_and(|obj| obj.is_vehicle()) && !vehicles.contains(&key) {
            vehicles.push(key);
        }
    }
    let before = capture_paths(ctx.scene(), &vehicles);

    let mut changed = Vec::new();
    for &vehicle in &vehicles {
        let popped = ctx
            .host
            .scene_mut()
            .get_mut(vehicle)
            .and_then(|obj| obj.path.as_mut())
            .and_then(|path| path.pop());
        if popped.is_some() {
            changed.push(vehicle);
        }
    }
    if changed.is_empty() {
        return false;
    }

    reconcile(ctx, &changed);
    let after = capture_paths(ctx.scene(), &vehicles);
    history.push(PathEditCommand::new(before, after).with_description("Remove waypoint"));
    true
}

/// Delete the nodes behind the given handles, grouped per vehicle.
///
/// Indices are removed highest first so earlier ones stay valid. Remaining
/// nodes keep their relative order.
pub fn delete_waypoints(
    ctx: &mut EditContext<'_>,
    history: &mut History,
    handles: &[ObjectKey],
) -> bool {
    let mut groups: Vec<(ObjectKey, Vec<usize>)> = Vec::new();
    for &key in handles {
        let Some(handle) = ctx.scene().get(key).and_then(|obj| obj.handle) else {
            continue;
        };
        match groups.iter_mut().find(|(vehicle, _)| *vehicle == handle.vehicle) {
            Some((_, indices)) => indices.push(handle.index),
            None => groups.push((handle.vehicle, vec![handle.index])),
        }
    }
    if groups.is_empty() {
        return false;
    }

    let vehicles: Vec<ObjectKey> = groups.iter().map(|(vehicle, _)| *vehicle).collect();
    let before = capture_paths(ctx.scene(), &vehicles);
    let mut changed = false;
    for (vehicle, mut indices) in groups {
        let Some(path) = ctx
            .host
            .scene_mut()
            .get_mut(vehicle)
            .and_then(|obj| obj.path.as_mut())
        else {
            continue;
        };
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();
        for index in indices {
            if index < path.len() {
                path.remove(index);
                changed = true;
            }
        }
    }

    reconcile(ctx, &vehicles);
    if !changed {
        return false;
    }
    let after = capture_paths(ctx.scene(), &vehicles);
    history.push(PathEditCommand::new(before, after).with_description("Delete waypoint"));
    true
}

fn upsert(plan: &mut Vec<(ObjectKey, Option<usize>)>, vehicle: ObjectKey, after: Option<usize>) {
    match plan.iter_mut().find(|(key, _)| *key == vehicle) {
        Some(entry) => entry.1 = after,
        None => plan.push((vehicle, after)),
    }
}
