pub mod model;
pub mod options;
pub mod orchestrator;
pub mod progress;
pub mod source;
pub mod timecode;
