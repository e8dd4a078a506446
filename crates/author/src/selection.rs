use crate::host::SceneHost;
use worldedit_kernel::ObjectKey;

/// The ordered set of selected objects.
///
/// Replaced wholesale by every selection-changing operation. Each change
/// reattaches (or detaches) the gizmo to the whole set and notifies the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    items: Vec<ObjectKey>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[ObjectKey] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.items.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.items.contains(&key)
    }

    /// Select exactly `target`, or nothing.
    pub fn select_one(&mut self, host: &mut dyn SceneHost, target: Option<ObjectKey>) {
        self.commit(host, target.into_iter().collect());
    }

    /// Add `key` if absent, remove it if present. Other entries keep their order.
    pub fn toggle(&mut self, host: &mut dyn SceneHost, key: ObjectKey) {
        let mut next = self.items.clone();
        match next.iter().position(|k| *k == key) {
            Some(index) => {
                next.remove(index);
            }
            None => next.push(key),
        }
        self.commit(host, next);
    }

    /// Pointer-style selection: shift toggles, a plain click replaces, and
    /// clicking nothing clears.
    pub fn select(&mut self, host: &mut dyn SceneHost, target: Option<ObjectKey>, additive: bool) {
        match (target, additive) {
            (Some(key), true) => self.toggle(host, key),
            (target, _) => self.select_one(host, target),
        }
    }

    /// Replace the whole set, e.g. with the objects a command just produced.
    pub fn replace_all(&mut self, host: &mut dyn SceneHost, keys: impl IntoIterator<Item = ObjectKey>) {
        self.commit(host, keys.into_iter().collect());
    }

    pub fn clear(&mut self, host: &mut dyn SceneHost) {
        self.commit(host, Vec::new());
    }

    /// Drop entries whose objects no longer exist and reattach the gizmo.
    /// The UI is only notified if something was dropped.
    pub fn refresh(&mut self, host: &mut dyn SceneHost) {
        let before = self.items.len();
        self.items.retain(|key| host.scene().contains(*key));
        attach(host, &self.items);
        if self.items.len() != before {
            host.on_selection_changed(&self.items);
        }
    }

    fn commit(&mut self, host: &mut dyn SceneHost, keys: Vec<ObjectKey>) {
        let mut items: Vec<ObjectKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if host.scene().contains(key) && !items.contains(&key) {
                items.push(key);
            }
        }
        self.items = items;
        attach(host, &self.items);
        host.on_selection_changed(&self.items);
    }
}

fn attach(host: &mut dyn SceneHost, items: &[ObjectKey]) {
    if items.is_empty() {
        host.detach_gizmo();
    } else {
        host.attach_gizmo(items);
    }
}
