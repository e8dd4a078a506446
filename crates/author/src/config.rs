use glam::Vec3;

/// Tunables for one editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Most nodes a vehicle path may hold. Adds past this are skipped.
    pub max_waypoints: usize,
    /// Offset of a new node from the node (or vehicle) it follows.
    pub waypoint_offset: Vec3,
    /// Oldest undo entries are evicted past this many. `None` is unbounded.
    pub history_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_waypoints: 10,
            waypoint_offset: Vec3::new(10.0, 0.0, 0.0),
            history_limit: None,
        }
    }
}
