//! Reading scene snapshots from JSON.

use cgmath::{Matrix4, Point3, Vector3, One};
use errors::{Error, ErrorKind, Result, ResultExt};
use json::{self, JsonValue};
use std::fs;
use std::path::{Path, PathBuf};
use super::*;

pub fn read_scene(path: &Path) -> Result<Scene> {
    debug!("Reading scene {}...", path.display());
    let text = fs::read_to_string(path)
        .chain_err(|| format!("couldn't read scene file {}", path.display()))?;
    let base_dir = path.parent().unwrap_or(Path::new(""));
    parse_scene(&text, base_dir)
}

/// Parses a scene. Relative image paths are resolved against `base_dir`.
pub fn parse_scene(text: &str, base_dir: &Path) -> Result<Scene> {
    let root = json::parse(text)?;
    if !root.is_object() {
        return Err(scene_err("scene", "expected an object"));
    }

    let frame_start = frame(opt_int(&root["frame_start"], "frame_start", 0)?, "frame_start")?;
    let frame_end = frame(opt_int(&root["frame_end"], "frame_end", frame_start as i64)?, "frame_end")?;
    let global_matrix = if root["global_matrix"].is_null() {
        Matrix4::one()
    } else {
        matrix(&root["global_matrix"], "global_matrix")?
    };
    let settings = read_settings(&root["settings"])?;

    let mut materials = vec![];
    for (i, m) in array(&root["materials"], "materials")?.enumerate() {
        materials.push(read_material(m, &format!("materials[{}]", i), base_dir)?);
    }

    let mut objects = vec![];
    for (i, o) in array(&root["objects"], "objects")?.enumerate() {
        objects.push(read_object(o, &format!("objects[{}]", i), materials.len())?);
    }

    for obj in &objects {
        if let Some(ref parent) = obj.parent {
            if !objects.iter().any(|o| &o.name == parent) {
                bail!(ErrorKind::Scene(format!(
                    "object {} has unknown parent {}", obj.name, parent)));
            }
        }
    }

    Ok(Scene {
        frame_start,
        frame_end,
        global_matrix,
        settings,
        materials,
        objects,
    })
}

fn read_settings(v: &JsonValue) -> Result<Settings> {
    let mut s = Settings::default();
    if v.is_null() {
        return Ok(s);
    }
    let p = "settings";
    s.pretty_print = opt(&v["pretty_print"], |x| boolean(x, p))?;
    s.magnification = opt(&v["magnification"], |x| num(x, p))?;
    s.use_primitive_strip = opt(&v["use_primitive_strip"], |x| boolean(x, p))?;
    s.compress_nodes = opt(&v["compress_nodes"], |x| string(x, p))?;
    s.frame_step = opt(&v["frame_step"], |x| int(x, p))?.map(|x| x as u32);
    s.scale_tolerance = opt(&v["scale_tolerance"], |x| num(x, p))?;
    s.rotate_tolerance = opt(&v["rotate_tolerance"], |x| num(x, p))?;
    s.translate_tolerance = opt(&v["translate_tolerance"], |x| num(x, p))?;
    s.tex_scale_tolerance = opt(&v["tex_scale_tolerance"], |x| num(x, p))?;
    s.tex_rotate_tolerance = opt(&v["tex_rotate_tolerance"], |x| num(x, p))?;
    s.tex_translate_tolerance = opt(&v["tex_translate_tolerance"], |x| num(x, p))?;
    Ok(s)
}

fn read_material(v: &JsonValue, path: &str, base_dir: &Path) -> Result<Material> {
    let field = |name: &str| format!("{}.{}", path, name);

    let name = string(&v["name"], &field("name"))?;
    let kind = enumeration(&v["type"], &field("type"), MaterialType::Df,
        MaterialType::from_str, MaterialType::choices())?;

    let mut lights = [false; 4];
    for (i, light) in lights.iter_mut().enumerate() {
        let key = format!("light{}", i);
        *light = opt_bool(&v[key.as_str()], &field(&key), false)?;
    }

    let image = opt(&v["image"], |x| string(x, &field("image")))?
        .map(|s| resolve(base_dir, &s));

    let tiling = &v["tex_tiling"];
    let tex_tiling = if tiling.is_null() {
        [Tiling::Repeat, Tiling::Repeat]
    } else {
        let p = field("tex_tiling");
        if tiling.len() != 2 {
            return Err(scene_err(&p, "expected 2 tiling modes"));
        }
        [
            enumeration(&tiling[0], &p, Tiling::Repeat, Tiling::from_str, Tiling::choices())?,
            enumeration(&tiling[1], &p, Tiling::Repeat, Tiling::from_str, Tiling::choices())?,
        ]
    };

    let mut tex_effect_mtx = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
    if !v["tex_effect_mtx"].is_null() {
        let vals = floats(&v["tex_effect_mtx"], &field("tex_effect_mtx"), 8)?;
        tex_effect_mtx.copy_from_slice(&vals);
    }

    let mut pattern = vec![];
    if !v["pattern"].is_null() {
        let p = field("pattern");
        for key in array(&v["pattern"], &p)? {
            if key.len() != 2 {
                return Err(scene_err(&p, "expected [frame, image] pairs"));
            }
            let frame = num(&key[0], &p)?;
            let image = string(&key[1], &p)?;
            pattern.push((frame, resolve(base_dir, &image)));
        }
    }

    Ok(Material {
        name,
        kind,
        lights,
        shininess_table: opt_bool(&v["shininess_table"], &field("shininess_table"), false)?,
        fog: opt_bool(&v["fog"], &field("fog"), false)?,
        wireframe: opt_bool(&v["wireframe"], &field("wireframe"), false)?,
        depth_test_decal: opt_bool(&v["depth_test_decal"], &field("depth_test_decal"), false)?,
        translucent_update_depth: opt_bool(&v["translucent_update_depth"],
            &field("translucent_update_depth"), false)?,
        render_1_pixel: opt_bool(&v["render_1_pixel"], &field("render_1_pixel"), false)?,
        far_clipping: opt_bool(&v["far_clipping"], &field("far_clipping"), false)?,
        polygon_id: opt_int(&v["polygon_id"], &field("polygon_id"), 0)? as u32,
        face: enumeration(&v["face"], &field("face"), DisplayFace::Front,
            DisplayFace::from_str, DisplayFace::choices())?,
        polygon_mode: enumeration(&v["polygon_mode"], &field("polygon_mode"),
            PolygonMode::Modulate, PolygonMode::from_str, PolygonMode::choices())?,
        alpha: opt_int(&v["alpha"], &field("alpha"), 31)? as u32,
        diffuse: opt_rgb(&v["diffuse"], &field("diffuse"), [1.0, 1.0, 1.0])?,
        ambient: opt_rgb(&v["ambient"], &field("ambient"), [1.0, 1.0, 1.0])?,
        specular: opt_rgb(&v["specular"], &field("specular"), [0.0, 0.0, 0.0])?,
        emission: opt_rgb(&v["emission"], &field("emission"), [0.0, 0.0, 0.0])?,
        image,
        tex_gen_mode: enumeration(&v["tex_gen_mode"], &field("tex_gen_mode"),
            TexGenMode::None, TexGenMode::from_str, TexGenMode::choices())?,
        tex_gen_st_src: enumeration(&v["tex_gen_st_src"], &field("tex_gen_st_src"),
            TexGenStSrc::Polygon, TexGenStSrc::from_str, TexGenStSrc::choices())?,
        tex_tiling,
        tex_scale: opt_pair(&v["tex_scale"], &field("tex_scale"), [1.0, 1.0])?,
        tex_rotate: opt_num(&v["tex_rotate"], &field("tex_rotate"), 0.0)?,
        tex_translate: opt_pair(&v["tex_translate"], &field("tex_translate"), [0.0, 0.0])?,
        tex_effect_mtx,
        animation: channels(&v["animation"], &field("animation"))?,
        pattern,
    })
}

fn read_object(v: &JsonValue, path: &str, num_materials: usize) -> Result<Object> {
    let field = |name: &str| format!("{}.{}", path, name);

    let name = string(&v["name"], &field("name"))?;
    let kind = enumeration(&v["type"], &field("type"), ObjectKind::Empty,
        ObjectKind::from_str, ObjectKind::choices())?;
    let parent = opt(&v["parent"], |x| string(x, &field("parent")))?;

    let mut material_slots = vec![];
    if !v["material_slots"].is_null() {
        let p = field("material_slots");
        for slot in array(&v["material_slots"], &p)? {
            if slot.is_null() {
                material_slots.push(None);
            } else {
                let idx = int(slot, &p)?;
                if idx < 0 || idx as usize >= num_materials {
                    return Err(scene_err(&p, &format!("no material with index {}", idx)));
                }
                material_slots.push(Some(idx as usize));
            }
        }
    }

    let mesh = if v["mesh"].is_null() {
        None
    } else {
        Some(read_mesh(&v["mesh"], &field("mesh"))?)
    };

    let mut bones = vec![];
    if !v["bones"].is_null() {
        for (i, b) in array(&v["bones"], &field("bones"))?.enumerate() {
            bones.push(read_bone(b, &format!("{}.bones[{}]", path, i))?);
        }
    }

    Ok(Object {
        name,
        kind,
        parent,
        location: opt_vec3(&v["location"], &field("location"), [0.0, 0.0, 0.0])?,
        rotation: opt_vec3(&v["rotation"], &field("rotation"), [0.0, 0.0, 0.0])?,
        scale: opt_vec3(&v["scale"], &field("scale"), [1.0, 1.0, 1.0])?,
        visible: opt_bool(&v["visible"], &field("visible"), true)?,
        billboard: enumeration(&v["billboard"], &field("billboard"), Billboard::Off,
            Billboard::from_str, Billboard::choices())?,
        material_slots,
        mesh,
        bones,
    })
}

fn read_mesh(v: &JsonValue, path: &str) -> Result<Mesh> {
    let field = |name: &str| format!("{}.{}", path, name);

    let mut vertices = vec![];
    for vert in array(&v["vertices"], &field("vertices"))? {
        let c = floats(vert, &field("vertices"), 3)?;
        vertices.push(Point3::new(c[0], c[1], c[2]));
    }

    let mut vertex_groups = vec![];
    if !v["vertex_groups"].is_null() {
        let p = field("vertex_groups");
        for groups in array(&v["vertex_groups"], &p)? {
            let mut gs = vec![];
            for g in array(groups, &p)? {
                let g = int(g, &p)?;
                if g < 0 {
                    return Err(scene_err(&p, "negative vertex group"));
                }
                gs.push(g as usize);
            }
            vertex_groups.push(gs);
        }
    }

    let mut group_names = vec![];
    if !v["group_names"].is_null() {
        for name in array(&v["group_names"], &field("group_names"))? {
            group_names.push(string(name, &field("group_names"))?);
        }
    }

    let mut faces = vec![];
    for (i, f) in array(&v["faces"], &field("faces"))?.enumerate() {
        let p = format!("{}.faces[{}]", path, i);
        let mut face_verts = vec![];
        for idx in array(&f["vertices"], &p)? {
            let idx = int(idx, &p)?;
            if idx < 0 {
                return Err(scene_err(&p, "negative vertex index"));
            }
            face_verts.push(idx as usize);
        }

        let mut normals = vec![];
        if !f["normals"].is_null() {
            for n in array(&f["normals"], &p)? {
                let c = floats(n, &p, 3)?;
                normals.push(Vector3::new(c[0], c[1], c[2]));
            }
        }
        let mut uvs = vec![];
        if !f["uvs"].is_null() {
            for uv in array(&f["uvs"], &p)? {
                let c = floats(uv, &p, 2)?;
                uvs.push([c[0], c[1]]);
            }
        }
        let mut colors = vec![];
        if !f["colors"].is_null() {
            for c in array(&f["colors"], &p)? {
                colors.push(rgb(c, &p)?);
            }
        }

        faces.push(Face {
            vertices: face_verts,
            material: opt_int(&f["material"], &p, 0)? as usize,
            normals,
            uvs,
            colors,
        });
    }

    Ok(Mesh {
        vertices,
        vertex_groups,
        group_names,
        has_colors: opt_bool(&v["has_colors"], &field("has_colors"), false)?,
        has_uvs: opt_bool(&v["has_uvs"], &field("has_uvs"), false)?,
        faces,
    })
}

fn read_bone(v: &JsonValue, path: &str) -> Result<Bone> {
    let field = |name: &str| format!("{}.{}", path, name);
    Ok(Bone {
        name: string(&v["name"], &field("name"))?,
        parent: opt(&v["parent"], |x| string(x, &field("parent")))?,
        matrix: if v["matrix"].is_null() {
            Matrix4::one()
        } else {
            matrix(&v["matrix"], &field("matrix"))?
        },
        animation: channels(&v["animation"], &field("animation"))?,
    })
}

fn channels(v: &JsonValue, path: &str) -> Result<Channels> {
    let mut curves = vec![];
    if v.is_null() {
        return Ok(Channels { curves });
    }
    if !v.is_object() {
        return Err(scene_err(path, "expected an object of channels"));
    }
    for (name, keys) in v.entries() {
        let p = format!("{}.{}", path, name);
        let mut pairs = vec![];
        for key in array(keys, &p)? {
            let c = floats(key, &p, 2)?;
            pairs.push((c[0], c[1]));
        }
        curves.push((name.to_string(), Curve::from_keys(pairs)));
    }
    Ok(Channels { curves })
}

fn resolve(base_dir: &Path, s: &str) -> PathBuf {
    let p = Path::new(s);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}


// Value helpers. `path` names the value in error messages.

fn scene_err(path: &str, msg: &str) -> Error {
    ErrorKind::Scene(format!("{}: {}", path, msg)).into()
}

fn opt<T, F>(v: &JsonValue, f: F) -> Result<Option<T>>
where F: FnOnce(&JsonValue) -> Result<T> {
    if v.is_null() { Ok(None) } else { f(v).map(Some) }
}

fn array<'a>(v: &'a JsonValue, path: &str) -> Result<json::iterators::Members<'a>> {
    if v.is_null() {
        // Treat a missing list as an empty one.
        return Ok(v.members());
    }
    if !v.is_array() {
        return Err(scene_err(path, "expected an array"));
    }
    Ok(v.members())
}

fn num(v: &JsonValue, path: &str) -> Result<f64> {
    match v.as_f64() {
        Some(x) => Ok(x),
        None => Err(scene_err(path, "expected a number")),
    }
}

fn int(v: &JsonValue, path: &str) -> Result<i64> {
    match v.as_f64() {
        Some(x) if x.fract() == 0.0 => Ok(x as i64),
        _ => Err(scene_err(path, "expected an integer")),
    }
}

fn frame(x: i64, path: &str) -> Result<i32> {
    if x < i32::min_value() as i64 || x > i32::max_value() as i64 {
        bail!(ErrorKind::Configuration(format!("{} {} is out of range", path, x)));
    }
    Ok(x as i32)
}

fn boolean(v: &JsonValue, path: &str) -> Result<bool> {
    match v.as_bool() {
        Some(b) => Ok(b),
        None => Err(scene_err(path, "expected true or false")),
    }
}

fn string(v: &JsonValue, path: &str) -> Result<String> {
    match v.as_str() {
        Some(s) => Ok(s.to_string()),
        None => Err(scene_err(path, "expected a string")),
    }
}

fn floats(v: &JsonValue, path: &str, n: usize) -> Result<Vec<f64>> {
    if !v.is_array() || v.len() != n {
        return Err(scene_err(path, &format!("expected an array of {} numbers", n)));
    }
    v.members().map(|x| num(x, path)).collect()
}

fn matrix(v: &JsonValue, path: &str) -> Result<Matrix4<f64>> {
    let m = floats(v, path, 16)?;
    Ok(Matrix4::new(
        m[0], m[1], m[2], m[3],
        m[4], m[5], m[6], m[7],
        m[8], m[9], m[10], m[11],
        m[12], m[13], m[14], m[15],
    ))
}

fn rgb(v: &JsonValue, path: &str) -> Result<[f64; 3]> {
    let c = floats(v, path, 3)?;
    Ok([c[0], c[1], c[2]])
}

fn opt_num(v: &JsonValue, path: &str, default: f64) -> Result<f64> {
    Ok(opt(v, |x| num(x, path))?.unwrap_or(default))
}

fn opt_int(v: &JsonValue, path: &str, default: i64) -> Result<i64> {
    Ok(opt(v, |x| int(x, path))?.unwrap_or(default))
}

fn opt_bool(v: &JsonValue, path: &str, default: bool) -> Result<bool> {
    Ok(opt(v, |x| boolean(x, path))?.unwrap_or(default))
}

fn opt_rgb(v: &JsonValue, path: &str, default: [f64; 3]) -> Result<[f64; 3]> {
    Ok(opt(v, |x| rgb(x, path))?.unwrap_or(default))
}

fn opt_pair(v: &JsonValue, path: &str, default: [f64; 2]) -> Result<[f64; 2]> {
    let pair = opt(v, |x| floats(x, path, 2))?;
    Ok(pair.map(|c| [c[0], c[1]]).unwrap_or(default))
}

fn opt_vec3(v: &JsonValue, path: &str, default: [f64; 3]) -> Result<Vector3<f64>> {
    let c = opt_rgb(v, path, default)?;
    Ok(Vector3::new(c[0], c[1], c[2]))
}

fn enumeration<T>(
    v: &JsonValue,
    path: &str,
    default: T,
    parse: fn(&str) -> Option<T>,
    choices: &[&str],
) -> Result<T> {
    if v.is_null() {
        return Ok(default);
    }
    let s = string(v, path)?;
    match parse(&s) {
        Some(x) => Ok(x),
        None => Err(scene_err(path, &format!(
            "unknown value {:?}, expected one of: {}", s, choices.join(" ")))),
    }
}
