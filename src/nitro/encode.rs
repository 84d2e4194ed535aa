//! Turning raw primitives into `.imd` vertex commands.

use nitro::gpu_cmds::{position_cmd, GpuCmd};
use nitro::model::MtxPrim;
use primitives::Primitive;
use util::fixed::fx32_to_float;

/// Which per-vertex attributes a polygon sends.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexAttrs {
    pub color: bool,
    pub normal: bool,
    /// Texture size in texels, when texcoords are sent.
    pub texcoord: Option<(u32, u32)>,
}

/// Appends the commands for `prim` to the right primitive of `mtx_prim`.
///
/// Each vertex is its color, normal, and texcoord (those enabled by
/// `attrs`) followed by a position command. Relative position commands are
/// relative to the previous vertex of the same output primitive, which
/// carries over between faces merged into one `triangles` or `quads`
/// primitive.
pub fn encode_primitive(prim: &Primitive, attrs: VertexAttrs, mtx_prim: &mut MtxPrim) {
    let out = mtx_prim.primitive_for(prim.prim_type);
    out.stats.triangle_size += prim.triangle_count();
    out.stats.quad_size += prim.quad_count();

    for v in &prim.vertices {
        if attrs.color {
            out.commands.push(GpuCmd::Color { rgb: v.color });
        }
        if attrs.normal {
            out.commands.push(GpuCmd::Normal { nrm: v.normal });
        }
        if let Some((w, h)) = attrs.texcoord {
            let (w, h) = (w as f64, h as f64);
            let u = fx32_to_float(v.texcoord[0]);
            let v = fx32_to_float(v.texcoord[1]);
            // Flip to a top-left origin.
            out.commands.push(GpuCmd::TexCoord { st: [u * w, h - v * h] });
        }

        out.commands.push(position_cmd(out.last_position, v.position));
        out.last_position = Some(v.position);
        out.stats.vertex_size += 1;
    }
}
