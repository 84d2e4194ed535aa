//! `.ita` texture SRT animation document.

use animation::srt::{SrtAnimations, CHANNELS};
use options::ExportOptions;
use super::document;
use super::ica::{pool, reference};
use super::xml::{f6, Element};

pub fn ita(anims: &SrtAnimations, opts: &ExportOptions) -> Element {
    let tol = &opts.tex_tolerance;
    let info = Element::new("tex_srt_info")
        .attr("frame_size", anims.frame_size)
        .attr("tool_start_frame", 0)
        .attr("tool_end_frame", anims.frame_size)
        .attr("interpolation", "frame")
        .attr("tex_matrix_mode", "maya")
        .attr("compress_material", "off")
        .attr("material_size", "1 1")
        .attr("frame_step_mode", opts.frame_step)
        .attr("tolerance_tex_scale", f6(tol.scale))
        .attr("tolerance_tex_rotate", f6(tol.rotate))
        .attr("tolerance_tex_translate", f6(tol.translate));

    let mut array = Element::new("tex_srt_anm_array").attr("size", anims.materials.len());
    for (i, mat) in anims.materials.iter().enumerate() {
        let mut e = Element::new("tex_srt_anm")
            .attr("index", i)
            .attr("material_name", &mat.material_name);
        for (name, r) in CHANNELS.iter().zip(mat.refs.iter()) {
            e.push(reference(*name, r));
        }
        array.push(e);
    }

    let body = Element::new("body")
        .child(info)
        .child(pool("tex_scale_data", &anims.scale))
        .child(pool("tex_rotate_data", &anims.rotate))
        .child(pool("tex_translate_data", &anims.translate))
        .child(array);
    document("ita", "Texture SRT Animation Data for NINTENDO NITRO-System", body)
}

#[cfg(test)]
mod test {
    use super::*;
    use animation::srt::SrtAnimation;
    use animation::{Pool, Reference};

    #[test]
    fn one_material() {
        let r = Reference { frame_step: 1, data_size: 1, data_head: 0 };
        let anims = SrtAnimations {
            frame_size: 30,
            scale: Pool { data: vec![1.0] },
            rotate: Pool { data: vec![0.0] },
            translate: Pool { data: vec![0.0, 0.5] },
            materials: vec![SrtAnimation {
                material_name: "water".to_string(),
                refs: [r, r, r, Reference { frame_step: 1, data_size: 2, data_head: 0 }, r],
            }],
        };
        let doc = ita(&anims, &ExportOptions::default());
        assert_eq!(doc.name(), "ita");
        let body = doc.find("body").unwrap();
        let info = body.find("tex_srt_info").unwrap();
        assert_eq!(info.get_attr("tool_start_frame"), Some("0"));
        assert_eq!(info.get_attr("tool_end_frame"), Some("30"));
        assert_eq!(info.get_attr("tolerance_tex_scale"), Some("0.100000"));

        let anm = &body.find("tex_srt_anm_array").unwrap().children()[0];
        assert_eq!(anm.get_attr("material_name"), Some("water"));
        assert_eq!(anm.children().len(), 5);
        assert_eq!(anm.children()[3].name(), "tex_translate_s");
        assert_eq!(anm.children()[3].get_attr("data_size"), Some("2"));
    }
}
