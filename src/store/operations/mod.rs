pub mod posture;
pub mod settings;
pub mod stats;
