pub mod misc;
pub mod variant;
