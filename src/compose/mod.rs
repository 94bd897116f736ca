pub mod compositor;
pub mod detect;
pub mod downsample;
pub mod hash;
