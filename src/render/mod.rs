//! Watermark compositing on the CPU.

pub mod anchor;
pub mod blur;
pub mod composite;
pub mod compositor;
pub mod output;
pub mod text;
