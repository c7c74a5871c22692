//! Transpalentor: mark raster regions transparent by colour proximity
//! (chroma key) or by circular erase strokes.
//!
//! The pixel engines live in [`ops`] and depend only on [`raster`]. The other
//! modules are the collaborators around them: decoding, validation, session
//! storage, configuration, logging and the command-line front end.

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod logger;
pub mod ops;
pub mod raster;
pub mod storage;
pub mod validation;

pub use error::{Result, TranspalentorError};
pub use ops::{
    BrushDiameter, Stroke, TargetColor, TargetColorSet, Threshold, erase_at_coordinates,
    make_transparent,
};
pub use raster::{RasterImage, normalize};
