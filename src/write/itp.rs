//! `.itp` texture pattern animation document.

use animation::pattern::PatternAnimations;
use errors::Result;
use nitro::Model;
use super::xml::{join, Element};
use super::{check_textures, document};

pub fn itp(anims: &PatternAnimations, model: &Model) -> Result<Element> {
    check_textures(model)?;

    let info = Element::new("tex_pattern_info")
        .attr("frame_size", anims.frame_size)
        .attr("tool_start_frame", 0)
        .attr("tool_end_frame", anims.frame_size)
        .attr("compress_material", "off")
        .attr("material_size", "1 1");

    let mut images = Element::new("tex_image_list").attr("size", anims.images.len());
    for (i, name) in anims.images.iter().enumerate() {
        images.push(Element::new("image").attr("index", i).attr("name", name));
    }
    let mut palettes = Element::new("tex_palette_list").attr("size", anims.palettes.len());
    for (i, name) in anims.palettes.iter().enumerate() {
        palettes.push(Element::new("palette").attr("index", i).attr("name", name));
    }

    let data = Element::new("tex_pattern_data")
        .attr("size", anims.keys.len())
        .text(join(anims.keys.iter().map(|k| format!("{} {} {}", k.frame, k.image, k.palette))));

    let mut array = Element::new("tex_pattern_anm_array").attr("size", anims.materials.len());
    for (i, mat) in anims.materials.iter().enumerate() {
        array.push(Element::new("tex_pattern_anm")
            .attr("index", i)
            .attr("material_name", &mat.material_name)
            .attr("data_size", mat.data_size)
            .attr("data_head", mat.data_head));
    }

    let body = Element::new("body")
        .child(info)
        .child(images)
        .child(palettes)
        .child(data)
        .child(array);
    Ok(document("itp", "Texture Pattern Animation Data for NINTENDO NITRO-System", body))
}
