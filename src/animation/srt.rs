//! Texture SRT animation for the `.ita`.

use animation::{frame_size, frames, sample, Pool, Reference};
use nitro::Model;
use options::Tolerances;
use scene::Scene;

pub static CHANNELS: [&str; 5] = [
    "tex_scale_s", "tex_scale_t", "tex_rotate", "tex_translate_s", "tex_translate_t",
];

pub struct SrtAnimations {
    pub frame_size: u32,
    pub scale: Pool,
    /// Degrees.
    pub rotate: Pool,
    pub translate: Pool,
    pub materials: Vec<SrtAnimation>,
}

pub struct SrtAnimation {
    pub material_name: String,
    /// Parallel to `CHANNELS`.
    pub refs: [Reference; 5],
}

/// Samples the texture transform of every model material with at least
/// one SRT curve.
pub fn srt_animations(
    scene: &Scene,
    model: &Model,
    frame_step: u32,
    tolerance: &Tolerances,
) -> SrtAnimations {
    let mut anims = SrtAnimations {
        frame_size: frame_size(scene.frame_start, scene.frame_end),
        scale: Pool::default(),
        rotate: Pool::default(),
        translate: Pool::default(),
        materials: vec![],
    };
    let frames = frames(scene.frame_start, scene.frame_end);

    for mat in &model.materials {
        let material = &scene.materials[mat.source];
        if material.animation.is_empty() {
            continue;
        }
        let channel = |i: usize| material.animation.get(CHANNELS[i]);
        let ident = |x: f64| x;

        let scale_s = sample(channel(0), material.tex_scale[0], &frames, ident);
        let scale_t = sample(channel(1), material.tex_scale[1], &frames, ident);
        let rotate = sample(channel(2), material.tex_rotate, &frames, f64::to_degrees);
        let translate_s = sample(channel(3), material.tex_translate[0], &frames, ident);
        let translate_t = sample(channel(4), material.tex_translate[1], &frames, ident);

        let refs = [
            Reference::add(&mut anims.scale, scale_s, frame_step, tolerance.scale),
            Reference::add(&mut anims.scale, scale_t, frame_step, tolerance.scale),
            Reference::add(&mut anims.rotate, rotate, frame_step, tolerance.rotate),
            Reference::add(&mut anims.translate, translate_s, frame_step, tolerance.translate),
            Reference::add(&mut anims.translate, translate_t, frame_step, tolerance.translate),
        ];
        anims.materials.push(SrtAnimation { material_name: mat.name.clone(), refs });
    }

    anims
}

#[cfg(test)]
mod test {
    use super::*;
    use collect::collect;
    use options::ExportOptions;
    use scene::parse_scene;
    use std::path::Path;

    #[test]
    fn only_animated_materials() {
        let scene = parse_scene(r#"{
            "frame_start": 0, "frame_end": 2,
            "materials": [
                { "name": "still" },
                { "name": "scroll", "tex_scale": [2, 2],
                  "animation": { "tex_translate_s": [[0, 0.0], [2, 1.0]] } }
            ],
            "objects": [
                { "name": "m", "type": "mesh", "material_slots": [0, 1],
                  "mesh": { "vertices": [[0,0,0],[1,0,0],[1,1,0],[0,1,0]],
                            "faces": [ { "vertices": [0,1,2] },
                                       { "vertices": [0,2,3], "material": 1 } ] } }
            ]
        }"#, Path::new("")).unwrap();
        let opts = ExportOptions::default();
        let collected = collect(&scene, &opts).unwrap();
        let anims = srt_animations(&scene, &collected.model, 1, &opts.tex_tolerance);

        assert_eq!(anims.frame_size, 3);
        assert_eq!(anims.materials.len(), 1);
        let scroll = &anims.materials[0];
        assert_eq!(scroll.material_name, "scroll");
        assert_eq!(anims.scale.data, vec![2.0]);
        assert_eq!(scroll.refs[0], Reference { frame_step: 1, data_size: 1, data_head: 0 });
        assert_eq!(scroll.refs[1], scroll.refs[0]);
        assert_eq!(anims.translate.data, vec![0.0, 0.5, 1.0]);
        assert_eq!(scroll.refs[3].data_size, 3);
        assert_eq!(scroll.refs[4], Reference { frame_step: 1, data_size: 1, data_head: 0 });
    }
}
