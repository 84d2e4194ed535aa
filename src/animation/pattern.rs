//! Texture pattern animation for the `.itp`.
//!
//! A pattern switches a material's image (and palette) at key frames. The
//! images are the model's textures, so they're already loaded by the time
//! this runs.

use animation::frame_size;
use errors::{ErrorKind, Result};
use nitro::Model;
use scene::Scene;

pub struct PatternAnimations {
    pub frame_size: u32,
    /// Texture names, in order of first use.
    pub images: Vec<String>,
    /// Palette names, in order of first use.
    pub palettes: Vec<String>,
    pub keys: Vec<PatternKey>,
    pub materials: Vec<PatternAnimation>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PatternKey {
    /// Relative to the start of the playback range.
    pub frame: u32,
    /// Index into `images`.
    pub image: usize,
    /// Index into `palettes`; -1 for images without a palette.
    pub palette: i32,
}

pub struct PatternAnimation {
    pub material_name: String,
    pub data_head: usize,
    pub data_size: usize,
}

pub fn pattern_animations(scene: &Scene, model: &Model) -> Result<PatternAnimations> {
    let mut anims = PatternAnimations {
        frame_size: frame_size(scene.frame_start, scene.frame_end),
        images: vec![],
        palettes: vec![],
        keys: vec![],
        materials: vec![],
    };

    for mat in &model.materials {
        let material = &scene.materials[mat.source];
        if material.pattern.is_empty() {
            continue;
        }

        let mut keys = material.pattern.clone();
        keys.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(::std::cmp::Ordering::Equal));

        let data_head = anims.keys.len();
        for &(frame, ref path) in &keys {
            let texture = match model.textures.iter().find(|t| &t.path == path) {
                Some(t) => t,
                None => bail!(ErrorKind::Resource(
                    path.display().to_string(),
                    "pattern image was not loaded".to_string(),
                )),
            };
            let image = index_of(&mut anims.images, &texture.name);
            let palette = match texture.palette_name {
                Some(ref name) => index_of(&mut anims.palettes, name) as i32,
                None => -1,
            };
            let frame = (frame - scene.frame_start as f64).round().max(0.0) as u32;
            anims.keys.push(PatternKey { frame, image, palette });
        }
        anims.materials.push(PatternAnimation {
            material_name: mat.name.clone(),
            data_head,
            data_size: keys.len(),
        });
    }

    Ok(anims)
}

fn index_of(names: &mut Vec<String>, name: &str) -> usize {
    match names.iter().position(|n| n == name) {
        Some(i) => i,
        None => {
            names.push(name.to_string());
            names.len() - 1
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use collect::collect;
    use nitro::tga::build_tga;
    use options::ExportOptions;
    use scene::parse_scene;
    use std::env;
    use std::fs;
    use std::process;

    fn write_palette_tga(path: &::std::path::Path, palette: &[u8]) {
        let buf = build_tga(4, 4, &[
            (b"nns_frmt", b"palette4"),
            (b"nns_txel", &[0, 0, 0, 0]),
            (b"nns_pnam", palette),
            (b"nns_pcol", &[0xff, 0x7f, 0x00, 0x00]),
            (b"nns_endb", &[]),
        ]);
        fs::write(path, &buf).unwrap();
    }

    #[test]
    fn keys_index_image_and_palette_lists() {
        let dir = env::temp_dir().join(format!("nitro-export-itp-{}", process::id()));
        fs::create_dir_all(&dir).unwrap();
        write_palette_tga(&dir.join("eye_open.tga"), b"eye_pl");
        write_palette_tga(&dir.join("eye_shut.tga"), b"eye_pl");

        let scene = parse_scene(r#"{
            "frame_start": 10, "frame_end": 40,
            "materials": [
                { "name": "eye", "type": "tx_df", "image": "eye_open.tga",
                  "pattern": [[30, "eye_open.tga"], [10, "eye_open.tga"], [20, "eye_shut.tga"]] }
            ],
            "objects": [
                { "name": "m", "type": "mesh", "material_slots": [0],
                  "mesh": { "vertices": [[0,0,0],[1,0,0],[1,1,0]],
                            "faces": [ { "vertices": [0,1,2] } ] } }
            ]
        }"#, &dir).unwrap();
        let collected = collect(&scene, &ExportOptions::default()).unwrap();
        let anims = pattern_animations(&scene, &collected.model).unwrap();
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(anims.frame_size, 31);
        assert_eq!(anims.images, vec!["eye_open", "eye_shut"]);
        assert_eq!(anims.palettes, vec!["eye_pl"]);
        assert_eq!(anims.keys, vec![
            PatternKey { frame: 0, image: 0, palette: 0 },
            PatternKey { frame: 10, image: 1, palette: 0 },
            PatternKey { frame: 20, image: 0, palette: 0 },
        ]);
        assert_eq!(anims.materials.len(), 1);
        assert_eq!(anims.materials[0].material_name, "eye");
        assert_eq!(anims.materials[0].data_size, 3);
        assert_eq!(collected.model.textures.len(), 2);
    }
}
