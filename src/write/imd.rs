//! `.imd` model document.

use errors::Result;
use nitro::gpu_cmds::GpuCmd;
use nitro::model::{Model, Node, Polygon, Stats, Texture};
use options::ExportOptions;
use scene::{Material, Scene};
use super::xml::{f6, join, on_off, Element};
use super::{check_textures, document};
use util::fixed::{fx10_to_float, fx32_to_float};
use util::tree::NodeIdx;

pub fn imd(model: &Model, scene: &Scene, opts: &ExportOptions) -> Result<Element> {
    check_textures(model)?;

    let mut body = Element::new("body");
    body.push(model_info(model, scene, opts));
    body.push(Element::new("box_test")
        .attr("pos_scale", model.box_test.pos_scale)
        .attr("xyz", join(&model.box_test.xyz))
        .attr("whd", join(&model.box_test.whd)));

    let mut images = Element::new("tex_image_array").attr("size", model.textures.len());
    for (i, tex) in model.textures.iter().enumerate() {
        images.push(tex_image(i, tex));
    }
    body.push(images);

    let mut palettes = Element::new("tex_palette_array").attr("size", model.palettes.len());
    for (i, pal) in model.palettes.iter().enumerate() {
        palettes.push(Element::new("tex_palette")
            .attr("index", i)
            .attr("name", &pal.name)
            .attr("color_size", pal.color_size)
            .text(&pal.data));
    }
    body.push(palettes);

    let mut materials = Element::new("material_array").attr("size", model.materials.len());
    for (i, mat) in model.materials.iter().enumerate() {
        let source = &scene.materials[mat.source];
        materials.push(material(i, &mat.name, source, mat.image_idx, mat.palette_idx));
    }
    body.push(materials);

    let mut matrices = Element::new("matrix_array").attr("size", model.matrices.len());
    for (i, m) in model.matrices.iter().enumerate() {
        matrices.push(Element::new("matrix")
            .attr("index", i)
            .attr("mtx_weight", m.weight)
            .attr("node_idx", m.node_idx));
    }
    body.push(matrices);

    let mut polygons = Element::new("polygon_array").attr("size", model.polygons.len());
    for (i, polygon) in model.polygons.iter().enumerate() {
        polygons.push(polygon_element(i, polygon));
    }
    body.push(polygons);

    let mut nodes = Element::new("node_array").attr("size", model.nodes.node_count());
    for idx in model.nodes.node_idxs() {
        nodes.push(node_element(model, idx, &model.nodes[idx]));
    }
    body.push(nodes);

    body.push(stats(Element::new("output_info"), &model.stats));

    Ok(document("imd", "Model Data for NINTENDO NITRO-System", body))
}

fn model_info(model: &Model, scene: &Scene, opts: &ExportOptions) -> Element {
    let node_size = model.nodes.node_count();
    let material_size = model.materials.len();
    Element::new("model_info")
        .attr("pos_scale", model.pos_scale)
        .attr("scaling_rule", "standard")
        .attr("vertex_style", "direct")
        .attr("magnify", f6(opts.magnification))
        .attr("tool_start_frame", scene.frame_start)
        .attr("tex_matrix_mode", "maya")
        .attr("compress_node", opts.compress_nodes.as_str())
        .attr("node_size", join(&[node_size, node_size]))
        .attr("compress_material", "off")
        .attr("material_size", join(&[material_size, material_size]))
        .attr("output_texture", "used")
        .attr("force_full_weight", "on")
        .attr("use_primitive_strip", on_off(opts.use_primitive_strip))
}

fn tex_image(index: usize, tex: &Texture) -> Element {
    let mut e = Element::new("tex_image")
        .attr("index", index)
        .attr("name", &tex.name)
        .attr("width", tex.width)
        .attr("height", tex.height)
        .attr("original_width", tex.original_width)
        .attr("original_height", tex.original_height)
        .attr("format", tex.format.name());
    if tex.format.has_color0_mode() {
        e = e.attr("color0_mode", if tex.color0_transparent { "transparent" } else { "color" });
    }
    if let Some(ref name) = tex.palette_name {
        e = e.attr("palette_name", name);
    }
    e = e.attr("path", tex.path.display());

    e = e.child(Element::new("bitmap")
        .attr("size", tex.bitmap.1)
        .text(&tex.bitmap.0));
    if let Some((ref data, size)) = tex.tex4x4_palette_idx {
        e = e.child(Element::new("tex4x4_palette_idx")
            .attr("size", size)
            .text(data));
    }
    e
}

/// Linear to sRGB, then to 5 bits.
fn color5(c: &[f64; 3]) -> String {
    let lin2s = |x: f64| {
        let x = x.max(0.0).min(1.0);
        if x <= 0.0031308 {
            12.92 * x
        } else {
            1.055 * x.powf(1.0 / 2.4) - 0.055
        }
    };
    // The epsilon keeps lin2s(1.0) = 0.99999.. from truncating to 30.
    join(c.iter().map(|&x| ((lin2s(x) * 31.0 + 1e-6) as u32).min(31)))
}

fn material(index: usize, name: &str, m: &Material, image_idx: i32, palette_idx: i32) -> Element {
    let mut e = Element::new("material")
        .attr("index", index)
        .attr("name", name)
        .attr("light0", on_off(m.lights[0]))
        .attr("light1", on_off(m.lights[1]))
        .attr("light2", on_off(m.lights[2]))
        .attr("light3", on_off(m.lights[3]))
        .attr("face", m.face.as_str())
        .attr("alpha", m.alpha)
        .attr("wire_mode", on_off(m.wireframe))
        .attr("polygon_mode", m.polygon_mode.as_str())
        .attr("polygon_id", m.polygon_id)
        .attr("fog_flag", on_off(m.fog))
        .attr("depth_test_decal", on_off(m.depth_test_decal))
        .attr("translucent_update_depth", on_off(m.translucent_update_depth))
        .attr("render_1_pixel", on_off(m.render_1_pixel))
        .attr("far_clipping", on_off(m.far_clipping))
        .attr("diffuse", color5(&m.diffuse))
        .attr("ambient", color5(&m.ambient))
        .attr("specular", color5(&m.specular))
        .attr("emission", color5(&m.emission))
        .attr("shininess_table_flag", on_off(m.shininess_table))
        .attr("tex_image_idx", image_idx)
        .attr("tex_palette_idx", palette_idx);

    if image_idx != -1 {
        let fx = &m.tex_effect_mtx;
        let effect = [
            fx[0], fx[1], 0.0, 0.0,
            fx[2], fx[3], 0.0, 0.0,
            fx[4], fx[5], 1.0, 0.0,
            fx[6], fx[7], 0.0, 1.0,
        ];
        e = e
            .attr("tex_tiling", join(m.tex_tiling.iter().map(|t| t.as_str())))
            .attr("tex_scale", join(m.tex_scale.iter().map(|&x| f6(x))))
            .attr("tex_rotate", f6(m.tex_rotate.to_degrees()))
            .attr("tex_translate", join(m.tex_translate.iter().map(|&x| f6(x))))
            .attr("tex_gen_mode", m.tex_gen_mode.as_str())
            .attr("tex_gen_st_src", m.tex_gen_st_src.as_str())
            .attr("tex_effect_mtx", join(effect.iter().map(|&x| f6(x))));
    }
    e
}

fn stats(e: Element, stats: &Stats) -> Element {
    e.attr("vertex_size", stats.vertex_size)
        .attr("polygon_size", stats.polygon_size)
        .attr("triangle_size", stats.triangle_size)
        .attr("quad_size", stats.quad_size)
}

fn polygon_element(index: usize, polygon: &Polygon) -> Element {
    let mut e = Element::new("polygon")
        .attr("index", index)
        .attr("name", &polygon.name);
    e = stats(e, &polygon.stats)
        .attr("nrm_flag", on_off(polygon.use_nrm))
        .attr("clr_flag", on_off(polygon.use_clr))
        .attr("tex_flag", on_off(polygon.use_tex))
        .attr("mtx_prim_size", polygon.mtx_prims.len());

    for (i, mtx_prim) in polygon.mtx_prims.iter().enumerate() {
        let mut prims = Element::new("primitive_array").attr("size", mtx_prim.primitives.len());
        for (j, prim) in mtx_prim.primitives.iter().enumerate() {
            let mut p = Element::new("primitive")
                .attr("index", j)
                .attr("type", prim.prim_type.name())
                .attr("vertex_size", prim.stats.vertex_size);
            for cmd in &prim.commands {
                p.push(Element::new(cmd.name()).attr(cmd.tag(), cmd_args(cmd)));
            }
            prims.push(p);
        }
        e.push(Element::new("mtx_prim")
            .attr("index", i)
            .child(Element::new("mtx_list")
                .attr("size", mtx_prim.mtx_list.len())
                .text(join(&mtx_prim.mtx_list)))
            .child(prims));
    }
    e
}

fn cmd_args(cmd: &GpuCmd) -> String {
    let pos = |xs: &[i64]| join(xs.iter().map(|&x| f6(fx32_to_float(x))));
    match *cmd {
        GpuCmd::Mtx { idx } => idx.to_string(),
        GpuCmd::PosXyz { pos: p } | GpuCmd::PosS { pos: p } => pos(&p),
        GpuCmd::PosDiff { diff } => pos(&diff),
        GpuCmd::PosXy { x, y } => pos(&[x, y]),
        GpuCmd::PosXz { x, z } => pos(&[x, z]),
        GpuCmd::PosYz { y, z } => pos(&[y, z]),
        GpuCmd::Color { rgb } => join(&rgb),
        GpuCmd::Normal { nrm } => join(nrm.iter().map(|&x| f6(fx10_to_float(x)))),
        GpuCmd::TexCoord { st } => join(st.iter().map(|&x| f6(x))),
    }
}

fn node_element(model: &Model, idx: NodeIdx, node: &Node) -> Element {
    let tree = &model.nodes;
    let vec3 = |v: &::cgmath::Vector3<f64>| join(&[f6(v.x), f6(v.y), f6(v.z)]);
    let mut e = Element::new("node")
        .attr("index", idx)
        .attr("name", &node.name)
        .attr("kind", node.kind.as_str())
        .attr("parent", tree.parent(idx))
        .attr("child", tree.first_child(idx))
        .attr("brother_next", tree.next_sibling(idx))
        .attr("brother_prev", tree.prev_sibling(idx))
        .attr("draw_mtx", "off")
        .attr("billboard", node.billboard.as_str())
        .attr("scale", vec3(&node.scale))
        .attr("rotate", vec3(&node.rotate))
        .attr("translate", vec3(&node.translate))
        .attr("visibility", on_off(node.visible))
        .attr("display_size", node.displays.len());
    e = stats(e, &node.stats);
    for (i, d) in node.displays.iter().enumerate() {
        e.push(Element::new("display")
            .attr("index", i)
            .attr("material", d.material)
            .attr("polygon", d.polygon)
            .attr("priority", d.priority));
    }
    e
}

#[cfg(test)]
mod test {
    use super::*;
    use collect::collect;
    use scene::parse_scene;
    use std::path::Path;

    fn plane_imd(opts: &ExportOptions) -> Element {
        let scene = parse_scene(r#"{
            "materials": [ { "name": "mat", "type": "vc", "diffuse": [1, 0, 0.2] } ],
            "objects": [
                { "name": "plane", "type": "mesh", "material_slots": [0],
                  "mesh": { "vertices": [[-1,-1,0],[1,-1,0],[1,1,0],[-1,1,0]],
                            "has_colors": true,
                            "faces": [ { "vertices": [0,1,2,3],
                                         "colors": [[1,1,1],[1,1,1],[1,1,1],[1,1,1]] } ] } }
            ]
        }"#, Path::new("")).unwrap();
        let collected = collect(&scene, opts).unwrap();
        imd(&collected.model, &scene, opts).unwrap()
    }

    #[test]
    fn layout() {
        let opts = ExportOptions { magnification: 1.0, ..ExportOptions::default() };
        let doc = plane_imd(&opts);
        assert_eq!(doc.name(), "imd");
        assert_eq!(doc.get_attr("version"), Some("1.6.0"));
        let body = doc.find("body").unwrap();
        let names: Vec<&str> = body.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, [
            "model_info", "box_test", "tex_image_array", "tex_palette_array",
            "material_array", "matrix_array", "polygon_array", "node_array",
            "output_info",
        ]);

        let info = body.find("model_info").unwrap();
        assert_eq!(info.get_attr("magnify"), Some("1.000000"));
        assert_eq!(info.get_attr("node_size"), Some("2 2"));
        assert_eq!(info.get_attr("compress_node"), Some("unite_combine"));

        let mat = &body.find("material_array").unwrap().children()[0];
        // sRGB 0.2 is about 0.48
        assert_eq!(mat.get_attr("diffuse"), Some("31 0 15"));
        assert_eq!(mat.get_attr("tex_image_idx"), Some("-1"));
        assert_eq!(mat.get_attr("tex_tiling"), None);

        let polygon = &body.find("polygon_array").unwrap().children()[0];
        assert_eq!(polygon.get_attr("clr_flag"), Some("on"));
        assert_eq!(polygon.get_attr("quad_size"), Some("1"));
        let mtx_prim = polygon.find("mtx_prim").unwrap();
        assert_eq!(mtx_prim.find("mtx_list").unwrap().get_attr("size"), Some("1"));
        let prim = &mtx_prim.find("primitive_array").unwrap().children()[0];
        assert_eq!(prim.get_attr("type"), Some("quads"));
        let cmds: Vec<&str> = prim.children().iter().map(|c| c.name()).collect();
        assert_eq!(cmds, [
            "mtx", "clr", "pos_s", "clr", "pos_xz", "clr", "pos_yz", "clr", "pos_xz",
        ]);
        assert_eq!(prim.children()[2].get_attr("xyz"), Some("-1.000000 -1.000000 0.000000"));
        assert_eq!(prim.children()[1].get_attr("rgb"), Some("31 31 31"));

        let node = &body.find("node_array").unwrap().children()[1];
        assert_eq!(node.get_attr("parent"), Some("0"));
        assert_eq!(node.get_attr("brother_next"), Some("-1"));
        assert_eq!(node.get_attr("kind"), Some("mesh"));
        assert_eq!(node.children()[0].get_attr("polygon"), Some("0"));

        let out = body.find("output_info").unwrap();
        assert_eq!(out.get_attr("vertex_size"), Some("4"));
    }

    #[test]
    fn missing_texture_fails() {
        let scene = parse_scene(r#"{
            "materials": [ { "name": "mat", "type": "tx_df", "image": "/nonexistent/t.tga" } ],
            "objects": [
                { "name": "m", "type": "mesh", "material_slots": [0],
                  "mesh": { "vertices": [[0,0,0],[1,0,0],[1,1,0]],
                            "faces": [ { "vertices": [0,1,2] } ] } }
            ]
        }"#, Path::new("")).unwrap();
        let opts = ExportOptions::default();
        let collected = collect(&scene, &opts).unwrap();
        assert!(imd(&collected.model, &scene, &opts).is_err());
    }
}
