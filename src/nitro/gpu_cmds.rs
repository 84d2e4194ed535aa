//! NDS GPU vertex commands, as written in `.imd` primitives.
//!
//! Positions are in fx32 units already shifted by the model's pos_scale.
//! The relative and partial position commands depend on the previous vertex
//! of the same primitive; `VertexState` tracks that the way the GPU does.
//!
//! See the [GBATEK documentation](http://problemkaputt.de/gbatek.htm#ds3dvideo)
//! for a reference on the DS's GPU.

/// DS GPU command.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCmd {
    /// Make entry `idx` of the mtx_prim's matrix list current.
    Mtx { idx: u32 },

    /// Full-precision position.
    PosXyz { pos: [i64; 3] },

    /// Position whose low 6 bits are all zero, sent in one word.
    PosS { pos: [i64; 3] },

    /// Displacement from the previous vertex. Each component is less than
    /// 512 in magnitude.
    PosDiff { diff: [i64; 3] },

    /// Change X and Y, keep the previous Z.
    PosXy { x: i64, y: i64 },

    /// Change X and Z, keep the previous Y.
    PosXz { x: i64, z: i64 },

    /// Change Y and Z, keep the previous X.
    PosYz { y: i64, z: i64 },

    /// Set the color for subsequent vertices (5-bit RGB).
    Color { rgb: [u8; 3] },

    /// Set the normal for subsequent vertices (fx10).
    Normal { nrm: [i64; 3] },

    /// Set the texture coordinate for subsequent vertices.
    ///
    /// Texture coordinate on the DS are measured in texels. The top-left
    /// corner of an image is (0,0) and the bottom-right is (w,h), where
    /// w and h are the width and height of the image.
    TexCoord { st: [f64; 2] },
}

impl GpuCmd {
    /// Element name in the `.imd`.
    pub fn name(&self) -> &'static str {
        match *self {
            GpuCmd::Mtx { .. } => "mtx",
            GpuCmd::PosXyz { .. } => "pos_xyz",
            GpuCmd::PosS { .. } => "pos_s",
            GpuCmd::PosDiff { .. } => "pos_diff",
            GpuCmd::PosXy { .. } => "pos_xy",
            GpuCmd::PosXz { .. } => "pos_xz",
            GpuCmd::PosYz { .. } => "pos_yz",
            GpuCmd::Color { .. } => "clr",
            GpuCmd::Normal { .. } => "nrm",
            GpuCmd::TexCoord { .. } => "tex",
        }
    }

    /// Attribute holding the command's arguments.
    pub fn tag(&self) -> &'static str {
        match *self {
            GpuCmd::Mtx { .. } => "idx",
            GpuCmd::PosXyz { .. } | GpuCmd::PosS { .. } | GpuCmd::PosDiff { .. } => "xyz",
            GpuCmd::PosXy { .. } => "xy",
            GpuCmd::PosXz { .. } => "xz",
            GpuCmd::PosYz { .. } => "yz",
            GpuCmd::Color { .. } => "rgb",
            GpuCmd::Normal { .. } => "xyz",
            GpuCmd::TexCoord { .. } => "st",
        }
    }
}

/// Picks the cheapest command that sends a vertex at `pos`, given the
/// previous vertex of the primitive (if any).
pub fn position_cmd(prev: Option<[i64; 3]>, pos: [i64; 3]) -> GpuCmd {
    if let Some(prev) = prev {
        let d = [pos[0] - prev[0], pos[1] - prev[1], pos[2] - prev[2]];
        if d[0] == 0 {
            return GpuCmd::PosYz { y: pos[1], z: pos[2] };
        }
        if d[1] == 0 {
            return GpuCmd::PosXz { x: pos[0], z: pos[2] };
        }
        if d[2] == 0 {
            return GpuCmd::PosXy { x: pos[0], y: pos[1] };
        }
        if d.iter().all(|&c| c.abs() < 512) {
            return GpuCmd::PosDiff { diff: d };
        }
    }
    if pos.iter().all(|&c| c & 0x3f == 0) {
        GpuCmd::PosS { pos }
    } else {
        GpuCmd::PosXyz { pos }
    }
}

/// Replays position commands.
#[derive(Debug, Clone, Default)]
pub struct VertexState {
    pub position: [i64; 3],
}

impl VertexState {
    /// Runs `cmd`. Returns the position of the vertex if it sent one.
    pub fn run(&mut self, cmd: &GpuCmd) -> Option<[i64; 3]> {
        let p = &mut self.position;
        match *cmd {
            GpuCmd::PosXyz { pos } | GpuCmd::PosS { pos } => *p = pos,
            GpuCmd::PosDiff { diff } => {
                for i in 0..3 {
                    p[i] += diff[i];
                }
            }
            GpuCmd::PosXy { x, y } => { p[0] = x; p[1] = y; }
            GpuCmd::PosXz { x, z } => { p[0] = x; p[2] = z; }
            GpuCmd::PosYz { y, z } => { p[1] = y; p[2] = z; }
            _ => return None,
        }
        Some(*p)
    }
}
