pub mod bitmap;
pub mod blur;
pub mod composite;
pub mod compositor;
pub mod surface;
pub mod text;
pub mod visualizer;
