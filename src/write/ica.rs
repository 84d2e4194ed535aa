//! `.ica` node animation document.

use animation::node::{NodeAnimations, CHANNELS};
use animation::{Pool, Reference};
use options::ExportOptions;
use super::document;
use super::xml::{f6, join, Element};

pub fn ica(anims: &NodeAnimations, opts: &ExportOptions) -> Element {
    let node_size = anims.nodes.len();
    let tol = &opts.node_tolerance;
    let info = Element::new("node_anm_info")
        .attr("frame_size", anims.frame_size)
        .attr("scaling_rule", "standard")
        .attr("magnify", f6(opts.magnification))
        .attr("tool_start_frame", 0)
        .attr("tool_end_frame", anims.frame_size)
        .attr("interpolation", "frame")
        .attr("interp_end_to_start", "off")
        .attr("compress_node", opts.compress_nodes.as_str())
        .attr("node_size", join(&[node_size, node_size]))
        .attr("frame_step_mode", opts.frame_step)
        .attr("tolerance_scale", f6(tol.scale))
        .attr("tolerance_rotate", f6(tol.rotate))
        .attr("tolerance_translate", f6(tol.translate));

    let mut array = Element::new("node_anm_array").attr("size", node_size);
    for node in &anims.nodes {
        let mut e = Element::new("node_anm").attr("index", node.index);
        for (name, r) in CHANNELS.iter().zip(node.refs.iter()) {
            e.push(reference(*name, r));
        }
        array.push(e);
    }

    let body = Element::new("body")
        .child(info)
        .child(pool("node_scale_data", &anims.scale))
        .child(pool("node_rotate_data", &anims.rotate))
        .child(pool("node_translate_data", &anims.translate))
        .child(array);
    document("ica", "Character Animation Data for NINTENDO NITRO-System", body)
}

pub fn pool(name: &'static str, pool: &Pool) -> Element {
    Element::new(name)
        .attr("size", pool.data.len())
        .text(join(pool.data.iter().map(|&x| f6(x))))
}

pub fn reference(name: &'static str, r: &Reference) -> Element {
    Element::new(name)
        .attr("frame_step", r.frame_step)
        .attr("data_size", r.data_size)
        .attr("data_head", r.data_head)
}

#[cfg(test)]
mod test {
    use super::*;
    use animation::node::NodeAnimation;

    #[test]
    fn references_and_pools() {
        let still = Reference { frame_step: 1, data_size: 1, data_head: 0 };
        let anims = NodeAnimations {
            frame_size: 3,
            scale: Pool::with_initial(1.0),
            rotate: Pool { data: vec![0.0, 45.0, 90.0] },
            translate: Pool::with_initial(0.0),
            nodes: vec![NodeAnimation {
                index: 0,
                refs: [still, still, still, still, still,
                       Reference { frame_step: 1, data_size: 3, data_head: 0 },
                       still, still, still],
            }],
        };
        let doc = ica(&anims, &ExportOptions::default());
        let body = doc.find("body").unwrap();

        let info = body.find("node_anm_info").unwrap();
        assert_eq!(info.get_attr("frame_size"), Some("3"));
        assert_eq!(info.get_attr("tolerance_translate"), Some("0.010000"));
        assert_eq!(info.get_attr("node_size"), Some("1 1"));

        let rotate = body.find("node_rotate_data").unwrap();
        assert_eq!(rotate.get_attr("size"), Some("3"));

        let anm = &body.find("node_anm_array").unwrap().children()[0];
        let names: Vec<&str> = anm.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, CHANNELS);
        assert_eq!(anm.children()[5].get_attr("data_size"), Some("3"));
    }
}
