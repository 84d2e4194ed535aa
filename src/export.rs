//! The export pipeline: collect the scene once, then build and write each
//! requested document.

use animation::node::node_animations;
use animation::pattern::pattern_animations;
use animation::srt::srt_animations;
use collect::{collect, Collected};
use errors::{Diagnostic, Result};
use options::{check_frame_range, ExportOptions};
use scene::Scene;
use std::path::{Path, PathBuf};
use time;
use util::out_file::{sibling, write_atomically};
use write::xml::{write_document, Element};
use write::{ica, imd, ita, itp};

pub struct Report {
    pub written: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A finished document, ready to be written to `<basepath>.<ext>`.
pub struct Document {
    pub ext: &'static str,
    pub text: String,
}

/// Exports `scene` to `<basepath>.imd` etc.
///
/// Options and the frame range are checked before anything is written. A
/// format that fails (eg. the `.imd` when a texture can't be read) doesn't
/// stop the others; the first such error is returned after they've run.
pub fn export(scene: &Scene, basepath: &Path, opts: &ExportOptions) -> Result<Report> {
    let start = time::precise_time_s();

    let (collected, docs) = build(scene, opts)?;

    let mut report = Report { written: vec![], diagnostics: collected.diagnostics };
    let mut first_err = None;
    for doc in docs {
        let res = doc.and_then(|doc| {
            let path = sibling(basepath, doc.ext);
            write_atomically(&path, doc.text.as_bytes())?;
            info!("wrote {}", path.display());
            Ok(path)
        });
        match res {
            Ok(path) => report.written.push(path),
            Err(e) => {
                error!("{}", e);
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
    }
    if let Some(e) = first_err {
        return Err(e);
    }

    debug!("export took {:.3}s", time::precise_time_s() - start);
    Ok(report)
}

/// Runs the pipeline up to serialization. Each requested format gets an
/// entry, in the order imd, ica, ita, itp.
pub fn build(scene: &Scene, opts: &ExportOptions) -> Result<(Collected, Vec<Result<Document>>)> {
    opts.validate()?;
    check_frame_range(scene.frame_start, scene.frame_end)?;

    let collected = collect(scene, opts)?;
    debug!("model: {} nodes, {} materials, {} polygons, pos_scale {}",
        collected.model.nodes.node_count(),
        collected.model.materials.len(),
        collected.model.polygons.len(),
        collected.model.pos_scale,
    );

    let finish = |ext: &'static str, root: Element| Document {
        ext,
        text: write_document(&root, opts.pretty_print),
    };

    let docs = {
        let model = &collected.model;
        let mut docs = vec![];
        if opts.formats.imd {
            docs.push(imd::imd(model, scene, opts).map(|root| finish("imd", root)));
        }
        if opts.formats.ica {
            let anims = node_animations(scene, &collected, opts.frame_step, &opts.node_tolerance);
            docs.push(Ok(finish("ica", ica::ica(&anims, opts))));
        }
        if opts.formats.ita {
            let anims = srt_animations(scene, model, opts.frame_step, &opts.tex_tolerance);
            docs.push(Ok(finish("ita", ita::ita(&anims, opts))));
        }
        if opts.formats.itp {
            let doc = pattern_animations(scene, model)
                .and_then(|anims| itp::itp(&anims, model))
                .map(|root| finish("itp", root));
            docs.push(doc);
        }
        docs
    };

    Ok((collected, docs))
}

#[cfg(test)]
mod test {
    use super::*;
    use errors::{DiagnosticKind, ErrorKind};
    use options::Formats;
    use scene::parse_scene;
    use std::env;
    use std::fs;
    use std::process;

    static SCENE: &str = r#"{
        "frame_start": 0, "frame_end": 3,
        "materials": [
            { "name": "skin", "diffuse": [0.8, 0.5, 0.2] },
            { "name": "scroll",
              "animation": { "tex_translate_s": [[0, 0.0], [3, 1.5]] } }
        ],
        "objects": [
            { "name": "arm", "type": "armature",
              "bones": [
                { "name": "upper" },
                { "name": "lower", "parent": "upper",
                  "animation": { "rotate_z": [[0, 0.0], [3, 1.0]] } }
              ] },
            { "name": "body", "type": "mesh", "parent": "arm",
              "material_slots": [0, 1],
              "mesh": {
                "vertices": [[0,0,0],[1,0,0],[1,1,0],[0,1,0],[0,2,0],[1,2,0]],
                "group_names": ["upper", "lower"],
                "vertex_groups": [[0],[0],[0],[0],[1],[1]],
                "faces": [
                  { "vertices": [0,1,2,3] },
                  { "vertices": [3,2,5,4], "material": 1 },
                  { "vertices": [0,1] }
                ] } }
        ]
    }"#;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("nitro-export-{}-{}", name, process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn texts(scene: &Scene, opts: &ExportOptions) -> Vec<(&'static str, String)> {
        let (_, docs) = build(scene, opts).unwrap();
        docs.into_iter().map(|d| { let d = d.unwrap(); (d.ext, d.text) }).collect()
    }

    #[test]
    fn output_is_deterministic() {
        let scene = parse_scene(SCENE, Path::new("")).unwrap();
        let opts = ExportOptions { pretty_print: true, ..ExportOptions::default() };
        let a = texts(&scene, &opts);
        let b = texts(&scene, &opts);
        let exts: Vec<&str> = a.iter().map(|x| x.0).collect();
        assert_eq!(exts, ["imd", "ica", "ita", "itp"]);
        assert_eq!(a, b);
        assert!(a[0].1.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<imd"));
    }

    #[test]
    fn writes_selected_formats() {
        let dir = scratch_dir("export");
        let scene = parse_scene(SCENE, Path::new("")).unwrap();
        let opts = ExportOptions {
            formats: Formats { imd: true, ita: false, ica: true, itp: false },
            ..ExportOptions::default()
        };
        let report = export(&scene, &dir.join("out"), &opts).unwrap();
        assert_eq!(report.written, vec![dir.join("out.imd"), dir.join("out.ica")]);
        assert!(!dir.join("out.ita").exists());
        // The line, and the quad spanning both bones.
        let kinds: Vec<DiagnosticKind> = report.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, [DiagnosticKind::MixedGroups, DiagnosticKind::Line]);

        let ica = fs::read_to_string(dir.join("out.ica")).unwrap();
        assert!(ica.contains("<node_anm_array size=\"5\">"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn bad_options_write_nothing() {
        let dir = scratch_dir("export-config");
        let scene = parse_scene(SCENE, Path::new("")).unwrap();
        let opts = ExportOptions { frame_step: 3, ..ExportOptions::default() };
        match export(&scene, &dir.join("out"), &opts) {
            Err(e) => match *e.kind() {
                ErrorKind::Configuration(_) => (),
                ref k => panic!("wrong error: {:?}", k),
            },
            Ok(_) => panic!("expected a configuration error"),
        }
        assert!(!dir.exists());
    }

    #[test]
    fn huge_frame_range_is_rejected() {
        let dir = scratch_dir("export-frames");
        let scene = parse_scene(r#"{ "frame_start": 0, "frame_end": 2147483647 }"#,
            Path::new("")).unwrap();
        match export(&scene, &dir.join("out"), &ExportOptions::default()) {
            Err(e) => match *e.kind() {
                ErrorKind::Configuration(_) => (),
                ref k => panic!("wrong error: {:?}", k),
            },
            Ok(_) => panic!("expected a configuration error"),
        }
        assert!(!dir.exists());
    }

    #[test]
    fn missing_texture_only_fails_its_formats() {
        let dir = scratch_dir("export-texture");
        let scene = parse_scene(r#"{
            "materials": [ { "name": "m", "type": "tx_df", "image": "nowhere.tga" } ],
            "objects": [
                { "name": "tri", "type": "mesh", "material_slots": [0],
                  "mesh": { "vertices": [[0,0,0],[1,0,0],[0,1,0]],
                            "faces": [ { "vertices": [0,1,2] } ] } }
            ]
        }"#, &dir).unwrap();
        let res = export(&scene, &dir.join("out"), &ExportOptions::default());
        match res {
            Err(e) => match *e.kind() {
                ErrorKind::Resource(..) => (),
                ref k => panic!("wrong error: {:?}", k),
            },
            Ok(_) => panic!("expected a resource error"),
        }
        assert!(!dir.join("out.imd").exists());
        assert!(!dir.join("out.itp").exists());
        assert!(dir.join("out.ica").exists());
        assert!(dir.join("out.ita").exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
