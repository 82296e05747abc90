//! Resource definitions consumed by the forward passes.

pub mod material;

pub use material::{Material, TextureRef, TextureSlot, displacement_bias};
