pub mod background_store;
pub mod diff_engine;
pub mod frame_cache;
pub mod motion_gate;
pub mod pixel;
pub mod utils;
