//! Nitro intermediate model data.
//!
//! Nitro is the SDK used for many Nintendo DS games. Its converter takes
//! `.imd` models (plus `.ica`/`.ita`/`.itp` animations) and textures in a
//! TGA variant carrying pre-converted NDS texel data. These modules hold the
//! model as it will be written, and the GPU-level details it depends on.

pub mod encode;
pub mod gpu_cmds;
pub mod model;
pub mod texture_format;
pub mod tga;

pub use self::model::Model;
