//! In-memory `.imd` model.
//!
//! Tables are filled in traversal order by the collector. Every `find_*`
//! method returns the index of an existing entry or appends a new one, so an
//! index is stable as soon as it is handed out.

use cgmath::Vector3;
use errors::{ErrorKind, Result};
use nitro::gpu_cmds::GpuCmd;
use nitro::texture_format::TextureFormat;
use nitro::tga::{self, NitroTga};
use primitives::PrimType;
use scene::Billboard;
use std::path::{Path, PathBuf};
use util::tree::{NodeIdx, Tree};

pub struct Model {
    pub pos_scale: u32,
    pub box_test: BoxTest,
    pub textures: Vec<Texture>,
    pub palettes: Vec<Palette>,
    pub materials: Vec<Material>,
    pub matrices: Vec<Matrix>,
    pub polygons: Vec<Polygon>,
    pub nodes: Tree<Node>,
    /// Totals over every polygon, for `output_info`.
    pub stats: Stats,
    /// The first texture that failed to load, as (path, message). Formats
    /// that need textures refuse to write the model when this is set.
    pub texture_error: Option<(String, String)>,
}

/// Bounding box in shifted fx32 units.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxTest {
    pub pos_scale: u32,
    pub xyz: [i64; 3],
    pub whd: [i64; 3],
}

pub struct Texture {
    pub name: String,
    pub path: PathBuf,
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
    pub color0_transparent: bool,
    /// Texels as a hex dump, and the number of elements in it.
    pub bitmap: (String, usize),
    pub tex4x4_palette_idx: Option<(String, usize)>,
    pub palette_name: Option<String>,
    pub palette_idx: i32,
}

pub struct Palette {
    pub name: String,
    pub data: String,
    pub color_size: usize,
}

pub struct Material {
    /// Index into the scene's materials.
    pub source: usize,
    pub name: String,
    pub image_idx: i32,
    pub palette_idx: i32,
}

pub struct Matrix {
    pub node_idx: NodeIdx,
    pub weight: u32,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub vertex_size: usize,
    pub polygon_size: usize,
    pub triangle_size: usize,
    pub quad_size: usize,
}

impl Stats {
    pub fn add(&mut self, other: &Stats) {
        self.vertex_size += other.vertex_size;
        self.polygon_size += other.polygon_size;
        self.triangle_size += other.triangle_size;
        self.quad_size += other.quad_size;
    }
}

pub struct Polygon {
    pub name: String,
    pub use_nrm: bool,
    pub use_clr: bool,
    pub use_tex: bool,
    /// Size of the bound texture, for converting UVs to texels.
    pub tex_size: (u32, u32),
    pub mtx_prims: Vec<MtxPrim>,
    pub stats: Stats,
}

impl Polygon {
    /// The mtx_prim drawing with model matrix `matrix_idx`.
    pub fn find_mtx_prim(&mut self, matrix_idx: usize) -> usize {
        if let Some(i) = self.mtx_prims.iter().position(|m| m.mtx_list == [matrix_idx]) {
            return i;
        }
        self.mtx_prims.push(MtxPrim { mtx_list: vec![matrix_idx], primitives: vec![] });
        self.mtx_prims.len() - 1
    }
}

pub struct MtxPrim {
    /// Model matrix indices. `mtx` commands index into this list.
    pub mtx_list: Vec<usize>,
    pub primitives: Vec<Primitive>,
}

impl MtxPrim {
    /// The primitive that a raw primitive of type `prim_type` should be
    /// encoded into. Separate triangles and quads all share one primitive;
    /// every strip gets its own.
    pub fn primitive_for(&mut self, prim_type: PrimType) -> &mut Primitive {
        let existing = if prim_type.is_strip() {
            None
        } else {
            self.primitives.iter().position(|p| p.prim_type == prim_type)
        };
        let idx = match existing {
            Some(i) => i,
            None => {
                self.primitives.push(Primitive::new(prim_type));
                self.primitives.len() - 1
            }
        };
        &mut self.primitives[idx]
    }
}

pub struct Primitive {
    pub prim_type: PrimType,
    pub stats: Stats,
    pub commands: Vec<GpuCmd>,
    /// Position of the last vertex sent, for relative position commands.
    pub last_position: Option<[i64; 3]>,
}

impl Primitive {
    pub fn new(prim_type: PrimType) -> Primitive {
        Primitive {
            prim_type,
            stats: Stats::default(),
            commands: vec![],
            last_position: None,
        }
    }
}

string_enum! {
    pub enum NodeKind {
        Null => "null",
        Mesh => "mesh",
        Joint => "joint",
    }
}

pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub scale: Vector3<f64>,
    /// Degrees.
    pub rotate: Vector3<f64>,
    pub translate: Vector3<f64>,
    pub visible: bool,
    pub billboard: Billboard,
    pub displays: Vec<Display>,
    pub stats: Stats,
}

impl Node {
    pub fn new(name: String, kind: NodeKind) -> Node {
        Node {
            name,
            kind,
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotate: Vector3::new(0.0, 0.0, 0.0),
            translate: Vector3::new(0.0, 0.0, 0.0),
            visible: true,
            billboard: Billboard::Off,
            displays: vec![],
            stats: Stats::default(),
        }
    }

    /// Links `polygon` to the node's display for `material`.
    pub fn set_display(&mut self, material: usize, polygon: usize) {
        match self.displays.iter().position(|d| d.material == material) {
            Some(i) => self.displays[i].polygon = polygon,
            None => self.displays.push(Display { material, polygon, priority: 0 }),
        }
    }
}

pub struct Display {
    pub material: usize,
    pub polygon: usize,
    pub priority: u32,
}

impl Model {
    pub fn new(pos_scale: u32, box_test: BoxTest) -> Model {
        Model {
            pos_scale,
            box_test,
            textures: vec![],
            palettes: vec![],
            materials: vec![],
            matrices: vec![],
            polygons: vec![],
            nodes: Tree::new(),
            stats: Stats::default(),
            texture_error: None,
        }
    }

    pub fn find_node(&self, name: &str) -> Option<NodeIdx> {
        self.nodes.node_idxs().find(|&i| self.nodes[i].name == name)
    }

    /// Adds a node. Node names have to be unique.
    pub fn add_node(&mut self, node: Node) -> Result<NodeIdx> {
        if self.find_node(&node.name).is_some() {
            bail!(ErrorKind::Scene(format!("duplicate node name {}", node.name)));
        }
        Ok(self.nodes.add_node(node))
    }

    pub fn find_matrix(&mut self, node_idx: NodeIdx) -> usize {
        if let Some(i) = self.matrices.iter().position(|m| m.node_idx == node_idx) {
            return i;
        }
        self.matrices.push(Matrix { node_idx, weight: 1 });
        self.matrices.len() - 1
    }

    pub fn find_polygon(&mut self, name: &str) -> usize {
        if let Some(i) = self.polygons.iter().position(|p| p.name == name) {
            return i;
        }
        self.polygons.push(Polygon {
            name: name.to_string(),
            use_nrm: false,
            use_clr: false,
            use_tex: false,
            tex_size: (1, 1),
            mtx_prims: vec![],
            stats: Stats::default(),
        });
        self.polygons.len() - 1
    }

    /// `name` is only used when the material is new.
    pub fn find_material(&mut self, source: usize, name: &str) -> usize {
        if let Some(i) = self.materials.iter().position(|m| m.source == source) {
            return i;
        }
        self.materials.push(Material {
            source,
            name: name.to_string(),
            image_idx: -1,
            palette_idx: -1,
        });
        self.materials.len() - 1
    }

    /// Loads the Nitro TGA at `path` unless it was already loaded. Its
    /// palette, if it has one, is registered too.
    pub fn find_texture(&mut self, path: &Path) -> Result<usize> {
        if let Some(i) = self.textures.iter().position(|t| t.path == path) {
            return Ok(i);
        }
        let tga = tga::read_tga(path)?;
        let texture = self.make_texture(path, tga);
        self.textures.push(texture);
        Ok(self.textures.len() - 1)
    }

    fn make_texture(&mut self, path: &Path, tga: NitroTga) -> Texture {
        let name = path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = truncate_name(&name);

        let element_size = tga.format.texel_element_size();
        let bitmap = (
            tga::hex_string(&tga.texels, element_size),
            tga.texels.len() / element_size,
        );
        let tex4x4_palette_idx = match tga.palette_idx {
            Some(ref idx) if tga.format.is_tex4x4() => {
                Some((tga::hex_string(idx, 2), idx.len() / 2))
            }
            _ => None,
        };

        let mut palette_name = None;
        let mut palette_idx = -1;
        if tga.format.desc().requires_palette {
            if let (Some(ref pname), Some(ref pcol)) = (tga.palette_name, tga.palette) {
                let pname = truncate_name(pname);
                palette_idx = self.find_palette(&pname, pcol) as i32;
                palette_name = Some(pname);
            }
        }

        Texture {
            name,
            path: path.to_path_buf(),
            format: tga.format,
            width: tga.width as u32,
            height: tga.height as u32,
            original_width: tga.width as u32,
            original_height: tga.height as u32,
            color0_transparent: tga.color0_transparent,
            bitmap,
            tex4x4_palette_idx,
            palette_name,
            palette_idx,
        }
    }

    /// Palettes are shared by name; the first one seen wins.
    pub fn find_palette(&mut self, name: &str, colors: &[u8]) -> usize {
        if let Some(i) = self.palettes.iter().position(|p| p.name == name) {
            return i;
        }
        self.palettes.push(Palette {
            name: name.to_string(),
            data: tga::hex_string(colors, 2),
            color_size: colors.len() / 2,
        });
        self.palettes.len() - 1
    }

    /// Orders the primitives of each mtx_prim, puts the initial `mtx`
    /// command in front of them, and totals up the statistics of polygons,
    /// nodes, and the whole model.
    pub fn finish(&mut self) {
        for polygon in &mut self.polygons {
            let mut stats = Stats::default();
            for mtx_prim in &mut polygon.mtx_prims {
                mtx_prim.primitives.sort_by_key(|p| p.prim_type.sort_key());
                if let Some(first) = mtx_prim.primitives.first_mut() {
                    first.commands.insert(0, GpuCmd::Mtx { idx: 0 });
                }
                for prim in &mtx_prim.primitives {
                    stats.add(&prim.stats);
                }
            }
            stats.polygon_size = stats.triangle_size + stats.quad_size;
            polygon.stats = stats;
        }

        let polygons = &self.polygons;
        for node in self.nodes.values_mut() {
            let mut stats = Stats::default();
            for display in &node.displays {
                stats.add(&polygons[display.polygon].stats);
            }
            node.stats = stats;
        }

        let mut stats = Stats::default();
        for polygon in polygons {
            stats.add(&polygon.stats);
        }
        self.stats = stats;
    }
}

/// Names in the `.imd` are at most 15 characters.
pub fn truncate_name(name: &str) -> String {
    name.chars().take(15).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use nitro::tga::build_tga;
    use std::env;
    use std::fs;
    use std::process;

    fn empty_model() -> Model {
        Model::new(0, BoxTest { pos_scale: 0, xyz: [0; 3], whd: [0; 3] })
    }

    #[test]
    fn lookups_append_on_miss() {
        let mut model = empty_model();
        assert_eq!(model.find_matrix(0), 0);
        assert_eq!(model.find_matrix(3), 1);
        assert_eq!(model.find_matrix(0), 0);
        assert_eq!(model.find_material(7, "a"), 0);
        assert_eq!(model.find_material(2, "b"), 1);
        assert_eq!(model.find_material(7, "ignored"), 0);
        assert_eq!(model.materials[0].name, "a");
        assert_eq!(model.find_polygon("x_0"), 0);
        assert_eq!(model.find_polygon("x_0"), 0);
        assert_eq!(model.find_palette("pal", &[1, 0]), 0);
        assert_eq!(model.find_palette("pal", &[2, 0, 3, 0]), 0);
        assert_eq!(model.palettes[0].color_size, 1);
    }

    #[test]
    fn duplicate_node_names_are_rejected() {
        let mut model = empty_model();
        model.add_node(Node::new("root".into(), NodeKind::Null)).unwrap();
        model.add_node(Node::new("a".into(), NodeKind::Mesh)).unwrap();
        assert!(model.add_node(Node::new("a".into(), NodeKind::Joint)).is_err());
        assert_eq!(model.find_node("a"), Some(1));
    }

    #[test]
    fn separate_prims_are_shared_but_strips_are_not() {
        let mut mtx_prim = MtxPrim { mtx_list: vec![0], primitives: vec![] };
        mtx_prim.primitive_for(PrimType::Triangles);
        mtx_prim.primitive_for(PrimType::TriangleStrip);
        mtx_prim.primitive_for(PrimType::Triangles);
        mtx_prim.primitive_for(PrimType::TriangleStrip);
        assert_eq!(mtx_prim.primitives.len(), 3);
    }

    #[test]
    fn finish_sorts_and_counts() {
        let mut model = empty_model();
        let root = model.add_node(Node::new("root".into(), NodeKind::Null)).unwrap();
        let p = model.find_polygon("poly");
        {
            let polygon = &mut model.polygons[p];
            let m = polygon.find_mtx_prim(0);
            let mtx_prim = &mut polygon.mtx_prims[m];
            {
                let tris = mtx_prim.primitive_for(PrimType::Triangles);
                tris.stats = Stats { vertex_size: 3, polygon_size: 0, triangle_size: 1, quad_size: 0 };
            }
            let strip = mtx_prim.primitive_for(PrimType::QuadStrip);
            strip.stats = Stats { vertex_size: 6, polygon_size: 0, triangle_size: 0, quad_size: 2 };
        }
        model.nodes[root].set_display(0, p);
        model.finish();

        let mtx_prim = &model.polygons[p].mtx_prims[0];
        assert_eq!(mtx_prim.primitives[0].prim_type, PrimType::QuadStrip);
        assert_eq!(mtx_prim.primitives[0].commands[0], GpuCmd::Mtx { idx: 0 });
        assert!(mtx_prim.primitives[1].commands.is_empty());
        let expected = Stats { vertex_size: 9, polygon_size: 3, triangle_size: 1, quad_size: 2 };
        assert_eq!(model.polygons[p].stats, expected);
        assert_eq!(model.nodes[root].stats, expected);
        assert_eq!(model.stats, expected);
    }

    #[test]
    fn textures_are_loaded_once_and_register_palettes() {
        let dir = env::temp_dir().join(format!("nitro-export-tex-{}", process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("a_texture_with_a_long_name.tga");
        let buf = build_tga(4, 4, &[
            (b"nns_frmt", b"palette4"),
            (b"nns_txel", &[0x11, 0x22, 0x33, 0x44]),
            (b"nns_pnam", b"a_texture_with_a_long_name_pl"),
            (b"nns_pcol", &[0xff, 0x7f, 0x00, 0x00]),
            (b"nns_endb", &[]),
        ]);
        fs::write(&path, &buf).unwrap();

        let mut model = empty_model();
        assert_eq!(model.find_texture(&path).unwrap(), 0);
        assert_eq!(model.find_texture(&path).unwrap(), 0);
        assert_eq!(model.textures.len(), 1);
        assert_eq!(model.palettes.len(), 1);

        let tex = &model.textures[0];
        assert_eq!(tex.name, "a_texture_with_");
        assert_eq!(tex.bitmap, ("2211 4433".to_string(), 2));
        assert_eq!(tex.palette_idx, 0);
        assert_eq!(model.palettes[0].name, "a_texture_with_");
        assert_eq!(model.palettes[0].data, "7fff 0000");

        let missing = dir.join("missing.tga");
        match model.find_texture(&missing) {
            Err(e) => match *e.kind() {
                ErrorKind::Resource(..) => (),
                _ => panic!("expected a resource error"),
            },
            Ok(_) => panic!("expected an error"),
        }
        let _ = fs::remove_dir_all(&dir);
    }
}
