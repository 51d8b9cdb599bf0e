pub mod analyzer;
pub mod app;
pub mod audio;
pub mod bucket;
pub mod clock;
pub mod config;
pub mod disk;
pub mod feed;
pub mod gradient;
pub mod jet;
pub mod params;
pub mod sim;
pub mod starfield;
pub mod wav;
