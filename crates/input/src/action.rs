use tracing::trace;
use worldedit_kernel::ObjectKey;

/// A high-level editor action.
///
/// Pointer picks and keyboard shortcuts both end up here, so the editing
/// core never sees raw input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Replace the selection with one object.
    Select(ObjectKey),
    /// Add the object to the selection, or remove it if already selected.
    ToggleSelect(ObjectKey),
    /// Clear the selection.
    Deselect,
    Undo,
    Redo,
    Copy,
    Paste,
    Duplicate,
    /// Delete the selection (objects and waypoint handles).
    Delete,
    /// Add a path node to the selected vehicles or after the selected handles.
    AddWaypoint,
    /// Remove the last path node of the selected vehicles.
    RemoveWaypoint,
    /// Unbound input.
    Noop,
}

impl Action {
    /// Action for a pointer click that hit `target` (or empty space).
    pub fn pick(target: Option<ObjectKey>, shift: bool) -> Self {
        match (target, shift) {
            (Some(key), false) => Self::Select(key),
            (Some(key), true) => Self::ToggleSelect(key),
            (None, false) => Self::Deselect,
            // Shift-clicking empty space keeps the selection.
            (None, true) => Self::Noop,
        }
    }
}

/// A physical key, reduced to what the editor binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Delete,
    Backspace,
    Escape,
    Insert,
}

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: Key,
    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyChord {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            ctrl: true,
            shift: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// The editor action bound to this chord.
    pub fn action(&self) -> Action {
        let action = match (self.key, self.ctrl, self.shift) {
            (Key::Char(c), true, shift) => match (c.to_ascii_lowercase(), shift) {
                ('z', false) => Action::Undo,
                ('z', true) | ('y', false) => Action::Redo,
                ('c', false) => Action::Copy,
                ('v', false) => Action::Paste,
                ('d', false) => Action::Duplicate,
                _ => Action::Noop,
            },
            (Key::Delete | Key::Backspace, false, _) => Action::Delete,
            (Key::Escape, false, _) => Action::Deselect,
            (Key::Insert, false, false) => Action::AddWaypoint,
            (Key::Insert, false, true) => Action::RemoveWaypoint,
            _ => Action::Noop,
        };
        if action == Action::Noop {
            trace!(chord = ?self, "unbound key chord");
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_shortcuts() {
        assert_eq!(KeyChord::ctrl(Key::Char('z')).action(), Action::Undo);
        assert_eq!(KeyChord::ctrl(Key::Char('Z')).with_shift().action(), Action::Redo);
        assert_eq!(KeyChord::ctrl(Key::Char('y')).action(), Action::Redo);
    }

    #[test]
    fn clipboard_shortcuts() {
        assert_eq!(KeyChord::ctrl(Key::Char('c')).action(), Action::Copy);
        assert_eq!(KeyChord::ctrl(Key::Char('v')).action(), Action::Paste);
        assert_eq!(KeyChord::ctrl(Key::Char('d')).action(), Action::Duplicate);
    }

    #[test]
    fn delete_and_backspace_delete() {
        assert_eq!(KeyChord::plain(Key::Delete).action(), Action::Delete);
        assert_eq!(KeyChord::plain(Key::Backspace).action(), Action::Delete);
        assert_eq!(KeyChord::ctrl(Key::Delete).action(), Action::Noop);
    }

    #[test]
    fn waypoint_shortcuts() {
        assert_eq!(KeyChord::plain(Key::Insert).action(), Action::AddWaypoint);
        assert_eq!(
            KeyChord::plain(Key::Insert).with_shift().action(),
            Action::RemoveWaypoint
        );
    }

    #[test]
    fn plain_letters_are_unbound() {
        assert_eq!(KeyChord::plain(Key::Char('z')).action(), Action::Noop);
        assert_eq!(KeyChord::plain(Key::Escape).action(), Action::Deselect);
    }

    #[test]
    fn empty_click_deselects_unless_shift() {
        assert_eq!(Action::pick(None, false), Action::Deselect);
        assert_eq!(Action::pick(None, true), Action::Noop);
    }
}
