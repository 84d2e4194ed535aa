//! Scene snapshot: the objects, meshes, bones, materials, and animation
//! curves handed to us by the authoring tool.
//!
//! Everything here is in the authoring tool's units and conventions (radians,
//! linear colors, UVs with the origin in the bottom-left). Conversion to Nitro
//! conventions happens during collection.

mod read;

pub use self::read::read_scene;
#[cfg(test)]
pub use self::read::parse_scene;

use cgmath::{Matrix4, Point3, Vector3};
use std::path::PathBuf;
use util::transform::TRS;

pub struct Scene {
    pub frame_start: i32,
    pub frame_end: i32,
    /// Axis conversion applied on top of the magnification.
    pub global_matrix: Matrix4<f64>,
    pub settings: Settings,
    pub materials: Vec<Material>,
    pub objects: Vec<Object>,
}

impl Scene {
    /// Indices of the objects whose parent is `parent` (or the top-level
    /// objects for `None`), in scene order.
    pub fn children_of(&self, parent: Option<&str>) -> Vec<usize> {
        self.objects.iter().enumerate()
            .filter(|&(_, obj)| obj.parent.as_ref().map(|s| s.as_str()) == parent)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn object_by_name(&self, name: &str) -> Option<usize> {
        self.objects.iter().position(|obj| obj.name == name)
    }
}

/// Export options stored in the scene file. Anything left out falls back to
/// the defaults (or command-line flags).
#[derive(Default, Debug, Clone)]
pub struct Settings {
    pub pretty_print: Option<bool>,
    pub magnification: Option<f64>,
    pub use_primitive_strip: Option<bool>,
    pub compress_nodes: Option<String>,
    pub frame_step: Option<u32>,
    pub scale_tolerance: Option<f64>,
    pub rotate_tolerance: Option<f64>,
    pub translate_tolerance: Option<f64>,
    pub tex_scale_tolerance: Option<f64>,
    pub tex_rotate_tolerance: Option<f64>,
    pub tex_translate_tolerance: Option<f64>,
}

string_enum! {
    pub enum ObjectKind {
        Mesh => "mesh",
        Armature => "armature",
        Empty => "empty",
    }
}

string_enum! {
    pub enum Billboard {
        Off => "off",
        On => "on",
        YOn => "y_on",
    }
}

pub struct Object {
    pub name: String,
    pub kind: ObjectKind,
    pub parent: Option<String>,
    pub location: Vector3<f64>,
    /// XYZ euler angles, radians.
    pub rotation: Vector3<f64>,
    pub scale: Vector3<f64>,
    pub visible: bool,
    pub billboard: Billboard,
    /// Index into `Scene::materials` for each slot; `None` for an empty slot.
    pub material_slots: Vec<Option<usize>>,
    pub mesh: Option<Mesh>,
    /// Only for armatures.
    pub bones: Vec<Bone>,
}

impl Object {
    pub fn trs(&self) -> TRS {
        TRS {
            scale: self.scale,
            rotation: self.rotation,
            translation: self.location,
        }
    }

    pub fn local_matrix(&self) -> Matrix4<f64> {
        Matrix4::from(&self.trs())
    }
}

pub struct Mesh {
    pub vertices: Vec<Point3<f64>>,
    /// Vertex group indices for each vertex (may be empty).
    pub vertex_groups: Vec<Vec<usize>>,
    /// Vertex group index -> bone name.
    pub group_names: Vec<String>,
    pub has_colors: bool,
    pub has_uvs: bool,
    pub faces: Vec<Face>,
}

/// A mesh polygon. Per-corner attributes are parallel to `vertices`.
pub struct Face {
    pub vertices: Vec<usize>,
    /// Material slot on the owning object.
    pub material: usize,
    pub normals: Vec<Vector3<f64>>,
    pub uvs: Vec<[f64; 2]>,
    /// Linear RGB in [0, 1].
    pub colors: Vec<[f64; 3]>,
}

pub struct Bone {
    pub name: String,
    pub parent: Option<String>,
    /// Rest pose in armature space.
    pub matrix: Matrix4<f64>,
    /// Channels `scale_x` .. `translate_z`, relative to the parent bone
    /// (rotations in radians).
    pub animation: Channels,
}

string_enum! {
    pub enum MaterialType {
        Df => "df",
        DfNr => "df_nr",
        Vc => "vc",
        TxDf => "tx_df",
        TxVc => "tx_vc",
        TxNrDf => "tx_nr_df",
    }
}

impl MaterialType {
    pub fn has_texture(self) -> bool {
        match self {
            MaterialType::TxDf | MaterialType::TxVc | MaterialType::TxNrDf => true,
            _ => false,
        }
    }

    pub fn has_vertex_color(self) -> bool {
        match self {
            MaterialType::Vc | MaterialType::TxVc => true,
            _ => false,
        }
    }

    pub fn has_normals(self) -> bool {
        match self {
            MaterialType::DfNr | MaterialType::TxNrDf => true,
            _ => false,
        }
    }
}

string_enum! {
    pub enum DisplayFace {
        Front => "front",
        Back => "back",
        Both => "both",
    }
}

string_enum! {
    pub enum PolygonMode {
        Modulate => "modulate",
        Decal => "decal",
        ToonHighlight => "toon_highlight",
        Shadow => "shadow",
    }
}

string_enum! {
    pub enum TexGenMode {
        None => "none",
        Tex => "tex",
        Nrm => "nrm",
        Pos => "pos",
    }
}

string_enum! {
    pub enum TexGenStSrc {
        Polygon => "polygon",
        Material => "material",
    }
}

string_enum! {
    pub enum Tiling {
        Repeat => "repeat",
        Flip => "flip",
        Clamp => "clamp",
    }
}

pub struct Material {
    pub name: String,
    pub kind: MaterialType,
    pub lights: [bool; 4],
    pub shininess_table: bool,
    pub fog: bool,
    pub wireframe: bool,
    pub depth_test_decal: bool,
    pub translucent_update_depth: bool,
    pub render_1_pixel: bool,
    pub far_clipping: bool,
    pub polygon_id: u32,
    pub face: DisplayFace,
    pub polygon_mode: PolygonMode,
    /// 0-31
    pub alpha: u32,
    /// Linear RGB.
    pub diffuse: [f64; 3],
    pub ambient: [f64; 3],
    pub specular: [f64; 3],
    pub emission: [f64; 3],
    /// Nitro TGA file.
    pub image: Option<PathBuf>,
    pub tex_gen_mode: TexGenMode,
    pub tex_gen_st_src: TexGenStSrc,
    pub tex_tiling: [Tiling; 2],
    pub tex_scale: [f64; 2],
    /// Radians.
    pub tex_rotate: f64,
    pub tex_translate: [f64; 2],
    /// Rows of the 2x4 effect matrix, used with texgen.
    pub tex_effect_mtx: [f64; 8],
    /// Channels `tex_scale_s`, `tex_scale_t`, `tex_rotate` (radians),
    /// `tex_translate_s`, `tex_translate_t`.
    pub animation: Channels,
    /// Image switches for texture pattern animation: (frame, image).
    pub pattern: Vec<(f64, PathBuf)>,
}

impl Material {
    pub fn any_light(&self) -> bool {
        self.lights.iter().any(|&on| on)
    }
}

/// An animation curve for one channel, keyed in frames.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    // Never keyed; sampling gives the caller's default.
    None,

    // A single key holds for all time.
    Constant(f64),

    // Two or more (frame, value) keys, sorted by frame. Values hold before
    // the first and after the last key, and are linearly interpolated in
    // between.
    Keys(Vec<(f64, f64)>),
}

static NO_CURVE: Curve = Curve::None;

impl Curve {
    pub fn from_keys(mut keys: Vec<(f64, f64)>) -> Curve {
        match keys.len() {
            0 => Curve::None,
            1 => Curve::Constant(keys[0].1),
            _ => {
                keys.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(::std::cmp::Ordering::Equal));
                Curve::Keys(keys)
            }
        }
    }

    pub fn sample_at(&self, default: f64, frame: f64) -> f64 {
        match *self {
            Curve::None => default,
            Curve::Constant(v) => v,
            Curve::Keys(ref keys) => {
                let (first_frame, first_value) = keys[0];
                let (last_frame, last_value) = keys[keys.len() - 1];
                if frame <= first_frame { return first_value; }
                if frame >= last_frame { return last_value; }

                let hi = keys.iter().position(|&(f, _)| f > frame).unwrap_or(keys.len() - 1);
                let (f0, v0) = keys[hi - 1];
                let (f1, v1) = keys[hi];
                if f1 == f0 {
                    return v1;
                }
                let lam = (frame - f0) / (f1 - f0);
                v0 * (1.0 - lam) + v1 * lam
            }
        }
    }
}

/// Named animation channels.
#[derive(Debug, Clone, Default)]
pub struct Channels {
    pub curves: Vec<(String, Curve)>,
}

impl Channels {
    pub fn get(&self, name: &str) -> &Curve {
        self.curves.iter()
            .find(|&&(ref n, _)| n == name)
            .map(|&(_, ref curve)| curve)
            .unwrap_or(&NO_CURVE)
    }

    pub fn is_empty(&self) -> bool {
        self.curves.iter().all(|&(_, ref curve)| *curve == Curve::None)
    }
}
