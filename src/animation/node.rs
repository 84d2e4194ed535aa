//! Node (bone) animation for the `.ica`.

use animation::{frame_size, frames, round6, Pool, Reference};
use collect::Collected;
use options::Tolerances;
use scene::Scene;
use util::transform::TRS;

/// Channel names, in output order.
pub static CHANNELS: [&str; 9] = [
    "scale_x", "scale_y", "scale_z",
    "rotate_x", "rotate_y", "rotate_z",
    "translate_x", "translate_y", "translate_z",
];

pub struct NodeAnimations {
    pub frame_size: u32,
    pub scale: Pool,
    /// Degrees.
    pub rotate: Pool,
    pub translate: Pool,
    /// One per model node, in node order.
    pub nodes: Vec<NodeAnimation>,
}

pub struct NodeAnimation {
    pub index: usize,
    /// Parallel to `CHANNELS`.
    pub refs: [Reference; 9],
}

/// Samples every bone over the playback range. Nodes that aren't bones
/// hold their static transform.
pub fn node_animations(
    scene: &Scene,
    collected: &Collected,
    frame_step: u32,
    tolerance: &Tolerances,
) -> NodeAnimations {
    let model = &collected.model;
    let mut anims = NodeAnimations {
        frame_size: frame_size(scene.frame_start, scene.frame_end),
        scale: Pool::with_initial(1.0),
        rotate: Pool::with_initial(0.0),
        translate: Pool::with_initial(0.0),
        nodes: vec![],
    };
    let mut refs: Vec<Option<[Reference; 9]>> = vec![None; model.nodes.node_count()];

    let frames = frames(scene.frame_start, scene.frame_end);
    for joint in &collected.joints {
        let bone = &scene.objects[joint.object].bones[joint.bone];
        let curve = |i: usize| bone.animation.get(CHANNELS[i]);
        let rest = &joint.rest;
        let rest_values = [
            rest.scale.x, rest.scale.y, rest.scale.z,
            rest.rotation.x, rest.rotation.y, rest.rotation.z,
            rest.translation.x, rest.translation.y, rest.translation.z,
        ];

        let mut samples: Vec<Vec<f64>> = vec![Vec::with_capacity(frames.len()); 9];
        for &t in &frames {
            let v: Vec<f64> = (0..9).map(|i| curve(i).sample_at(rest_values[i], t)).collect();
            let local = TRS {
                scale: (v[0], v[1], v[2]).into(),
                rotation: (v[3], v[4], v[5]).into(),
                translation: (v[6], v[7], v[8]).into(),
            };
            let trs = collected.joint_node_trs(joint, &local);
            let values = [
                trs.scale.x, trs.scale.y, trs.scale.z,
                trs.rotation.x, trs.rotation.y, trs.rotation.z,
                trs.translation.x, trs.translation.y, trs.translation.z,
            ];
            for i in 0..9 {
                samples[i].push(round6(values[i]));
            }
        }

        let mut joint_refs = [Reference { frame_step: 1, data_size: 0, data_head: 0 }; 9];
        for (i, s) in samples.into_iter().enumerate() {
            let (pool, tol) = match i / 3 {
                0 => (&mut anims.scale, tolerance.scale),
                1 => (&mut anims.rotate, tolerance.rotate),
                _ => (&mut anims.translate, tolerance.translate),
            };
            joint_refs[i] = Reference::add(pool, s, frame_step, tol);
        }
        trace!("{}: {:?}", bone.name, joint_refs);
        refs[joint.node as usize] = Some(joint_refs);
    }

    for (i, node) in model.nodes.values().enumerate() {
        let r = match refs[i] {
            Some(r) => r,
            None => [
                Reference::constant(&mut anims.scale, node.scale.x),
                Reference::constant(&mut anims.scale, node.scale.y),
                Reference::constant(&mut anims.scale, node.scale.z),
                Reference::constant(&mut anims.rotate, node.rotate.x),
                Reference::constant(&mut anims.rotate, node.rotate.y),
                Reference::constant(&mut anims.rotate, node.rotate.z),
                Reference::constant(&mut anims.translate, node.translate.x),
                Reference::constant(&mut anims.translate, node.translate.y),
                Reference::constant(&mut anims.translate, node.translate.z),
            ],
        };
        anims.nodes.push(NodeAnimation { index: i, refs: r });
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

    const ARM: &str = r#"{
        "frame_start": 0, "frame_end": 4,
        "objects": [
            { "name": "arm", "type": "armature",
              "bones": [ { "name": "still" },
                         { "name": "spin", "parent": "still",
                           "animation": { "rotate_z": [[0, 0.0], [4, 1.5707963267948966]] } } ] }
        ]
    }"#;

    fn animations(frame_step: u32) -> NodeAnimations {
        let scene = parse_scene(ARM, Path::new("")).unwrap();
        let opts = ExportOptions { magnification: 1.0, ..ExportOptions::default() };
        let collected = collect(&scene, &opts).unwrap();
        node_animations(&scene, &collected, frame_step, &opts.node_tolerance)
    }

    #[test]
    fn unanimated_bone_is_constant() {
        let anims = animations(1);
        assert_eq!(anims.frame_size, 5);
        // root, arm, still, spin
        assert_eq!(anims.nodes.len(), 4);
        let still = &anims.nodes[2];
        for r in &still.refs {
            assert_eq!(r.data_size, 1);
            assert_eq!(r.frame_step, 1);
        }
        assert_eq!(anims.scale.data[still.refs[0].data_head], 1.0);
        assert_eq!(anims.rotate.data[still.refs[3].data_head], 0.0);
    }

    #[test]
    fn animated_channel_is_sampled_every_frame() {
        let anims = animations(1);
        let spin = &anims.nodes[3];
        let rz = spin.refs[5];
        assert_eq!(rz.data_size, 5);
        assert_eq!(rz.frame_step, 1);
        let values = &anims.rotate.data[rz.data_head..rz.data_head + rz.data_size];
        assert_eq!(values, &[0.0, 22.5, 45.0, 67.5, 90.0]);
        // Everything else about the bone stays put.
        assert_eq!(spin.refs[3].data_size, 1);
        assert_eq!(spin.refs[6].data_size, 1);
    }

    #[test]
    fn frame_step_decimates() {
        let anims = animations(2);
        let rz = anims.nodes[3].refs[5];
        assert_eq!(rz.frame_step, 2);
        assert_eq!(rz.data_size, 3);
        let values = &anims.rotate.data[rz.data_head..rz.data_head + rz.data_size];
        assert_eq!(values, &[0.0, 45.0, 90.0]);
    }
}
