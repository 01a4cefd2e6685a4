pub const META: &str = "meta";
pub const SETTINGS: &str = "settings";
pub const STATS: &str = "stats";
pub const POSTURE: &str = "posture";
