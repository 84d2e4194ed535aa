//! Export options.
//!
//! Settings come from three places, lowest priority first: the defaults
//! here, the scene file's `"settings"` object, and command-line flags.

use errors::{ErrorKind, Result};
use scene::Settings;
use std::f64;

string_enum! {
    /// How the node tree may be reduced by the converter that reads the
    /// `.imd`. We only pass it along.
    pub enum CompressNodes {
        None => "none",
        Cull => "cull",
        Merge => "merge",
        Unite => "unite",
        UniteCombine => "unite_combine",
    }
}

/// Which files to write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Formats {
    pub imd: bool,
    pub ita: bool,
    pub ica: bool,
    pub itp: bool,
}

impl Formats {
    pub fn all() -> Formats {
        Formats { imd: true, ita: true, ica: true, itp: true }
    }

    pub fn none(&self) -> bool {
        !(self.imd || self.ita || self.ica || self.itp)
    }
}

/// Animation sample decimation and the range below which a channel counts as
/// constant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tolerances {
    pub scale: f64,
    /// Degrees.
    pub rotate: f64,
    pub translate: f64,
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub pretty_print: bool,
    pub magnification: f64,
    pub use_primitive_strip: bool,
    pub compress_nodes: CompressNodes,
    pub formats: Formats,
    /// Keep every 1st, 2nd or 4th animation sample.
    pub frame_step: u32,
    pub node_tolerance: Tolerances,
    pub tex_tolerance: Tolerances,
    pub generate_log: bool,
}

impl Default for ExportOptions {
    fn default() -> ExportOptions {
        let tolerance = Tolerances { scale: 0.1, rotate: 0.1, translate: 0.01 };
        ExportOptions {
            pretty_print: false,
            magnification: 0.0625,
            use_primitive_strip: true,
            compress_nodes: CompressNodes::UniteCombine,
            formats: Formats::all(),
            frame_step: 1,
            node_tolerance: tolerance,
            tex_tolerance: tolerance,
            generate_log: false,
        }
    }
}

impl ExportOptions {
    /// Overrides options with the ones in a scene's settings.
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<()> {
        if let Some(x) = settings.pretty_print { self.pretty_print = x; }
        if let Some(x) = settings.magnification { self.magnification = x; }
        if let Some(x) = settings.use_primitive_strip { self.use_primitive_strip = x; }
        if let Some(ref s) = settings.compress_nodes {
            self.compress_nodes = parse_compress_nodes(s)?;
        }
        if let Some(x) = settings.frame_step { self.frame_step = x; }
        if let Some(x) = settings.scale_tolerance { self.node_tolerance.scale = x; }
        if let Some(x) = settings.rotate_tolerance { self.node_tolerance.rotate = x; }
        if let Some(x) = settings.translate_tolerance { self.node_tolerance.translate = x; }
        if let Some(x) = settings.tex_scale_tolerance { self.tex_tolerance.scale = x; }
        if let Some(x) = settings.tex_rotate_tolerance { self.tex_tolerance.rotate = x; }
        if let Some(x) = settings.tex_translate_tolerance { self.tex_tolerance.translate = x; }
        Ok(())
    }

    /// Checks everything that can be checked before touching the scene.
    pub fn validate(&self) -> Result<()> {
        if !self.magnification.is_finite() || self.magnification <= 0.0 {
            bail!(ErrorKind::Configuration(format!(
                "magnification must be positive, got {}", self.magnification)));
        }
        match self.frame_step {
            1 | 2 | 4 => (),
            n => bail!(ErrorKind::Configuration(format!(
                "frame step must be 1, 2, or 4, got {}", n))),
        }
        check_tolerances("node", &self.node_tolerance)?;
        check_tolerances("texture", &self.tex_tolerance)?;
        Ok(())
    }
}

pub fn parse_compress_nodes(s: &str) -> Result<CompressNodes> {
    match CompressNodes::from_str(s) {
        Some(mode) => Ok(mode),
        None => bail!(ErrorKind::Configuration(format!(
            "unknown compress_nodes mode {:?}, expected one of: {}",
            s, CompressNodes::choices().join(" ")))),
    }
}

/// Nitro frame counts are 16-bit.
pub const MAX_FRAMES: i64 = 0xffff;

/// The playback range has to contain at least one frame and no more than
/// `MAX_FRAMES`.
pub fn check_frame_range(frame_start: i32, frame_end: i32) -> Result<()> {
    if frame_end < frame_start {
        bail!(ErrorKind::Configuration(format!(
            "frame range {}..{} ends before it starts", frame_start, frame_end)));
    }
    let len = frame_end as i64 - frame_start as i64 + 1;
    if len > MAX_FRAMES {
        bail!(ErrorKind::Configuration(format!(
            "frame range {}..{} has {} frames, at most {} are allowed",
            frame_start, frame_end, len, MAX_FRAMES)));
    }
    Ok(())
}

fn check_tolerances(what: &str, t: &Tolerances) -> Result<()> {
    let named = [("scale", t.scale), ("rotate", t.rotate), ("translate", t.translate)];
    for &(name, x) in &named {
        if x.is_nan() || x < 0.0 {
            bail!(ErrorKind::Configuration(format!(
                "{} {} tolerance must be a non-negative number, got {}", what, name, x)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let opts = ExportOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.magnification, 0.0625);
        assert_eq!(opts.compress_nodes, CompressNodes::UniteCombine);
        assert_eq!(opts.node_tolerance.translate, 0.01);
        assert!(!opts.formats.none());
    }

    #[test]
    fn settings_override_defaults() {
        let mut opts = ExportOptions::default();
        let settings = Settings {
            magnification: Some(1.0),
            compress_nodes: Some("cull".to_string()),
            tex_rotate_tolerance: Some(0.5),
            ..Settings::default()
        };
        opts.apply_settings(&settings).unwrap();
        assert_eq!(opts.magnification, 1.0);
        assert_eq!(opts.compress_nodes, CompressNodes::Cull);
        assert_eq!(opts.tex_tolerance.rotate, 0.5);
        assert_eq!(opts.node_tolerance.rotate, 0.1);
    }

    #[test]
    fn bad_options_are_configuration_errors() {
        let is_config_err = |opts: &ExportOptions| match opts.validate() {
            Err(e) => match *e.kind() {
                ErrorKind::Configuration(_) => true,
                _ => false,
            },
            Ok(()) => false,
        };

        let mut opts = ExportOptions::default();
        opts.node_tolerance.scale = -1.0;
        assert!(is_config_err(&opts));

        let mut opts = ExportOptions::default();
        opts.tex_tolerance.translate = f64::NAN;
        assert!(is_config_err(&opts));

        let mut opts = ExportOptions::default();
        opts.magnification = 0.0;
        assert!(is_config_err(&opts));

        let mut opts = ExportOptions::default();
        opts.frame_step = 3;
        assert!(is_config_err(&opts));

        assert!(parse_compress_nodes("squash").is_err());
        assert!(check_frame_range(5, 4).is_err());
        assert!(check_frame_range(4, 4).is_ok());
        assert!(check_frame_range(0, 0xfffe).is_ok());
        assert!(check_frame_range(0, 0xffff).is_err());
        assert!(check_frame_range(0, i32::max_value()).is_err());
        assert!(check_frame_range(i32::min_value(), i32::max_value()).is_err());
    }
}
