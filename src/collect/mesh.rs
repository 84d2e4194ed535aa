//! Mesh faces to polygons.

use cgmath::Transform;
use errors::{Diagnostic, DiagnosticKind, Error, ErrorKind, Result};
use nitro::encode::{encode_primitive, VertexAttrs};
use primitives::strip::strip;
use primitives::{Primitive, Vertex};
use scene::{Face, Mesh, TexGenMode};
use std::path::Path;
use super::Collector;
use util::fixed::fits_in_16_bits;
use util::transform::normal_matrix;
use util::tree::NodeIdx;

impl<'a> Collector<'a> {
    /// Adds the faces of mesh object `obj_idx` to the model and displays
    /// them on `node_idx`.
    pub(super) fn mesh(&mut self, obj_idx: usize, node_idx: NodeIdx) -> Result<()> {
        let scene = self.scene;
        let obj = &scene.objects[obj_idx];
        let mesh = match obj.mesh {
            Some(ref mesh) => mesh,
            None => return Ok(()),
        };
        let unbound = self.global * self.world[obj_idx];
        let armature = self.armature_of(obj_idx);

        let mut prims = vec![];
        // (vertex group, joint) for each group seen
        let mut bound: Vec<(i32, usize)> = vec![];

        for face in &mesh.faces {
            let material = match check_face(face, mesh, &obj.material_slots) {
                Ok(material) => material,
                Err(kind) => {
                    let diag = Diagnostic { object: obj.name.clone(), kind };
                    warn!("{}", diag);
                    self.diagnostics.push(diag);
                    continue;
                }
            };

            // The whole face goes with the first group of its first corner.
            let joint = armature.and_then(|arm| self.group_joint(mesh, arm, face.vertices[0]));
            if armature.is_some() && !same_group(mesh, face) {
                let diag = Diagnostic { object: obj.name.clone(), kind: DiagnosticKind::MixedGroups };
                warn!("{}", diag);
                self.diagnostics.push(diag);
            }
            let (group, m) = match joint {
                Some((group, j)) => {
                    if !bound.iter().any(|&(g, _)| g == group) {
                        bound.push((group, j));
                    }
                    (group, self.joints[j].skin * self.world[obj_idx])
                }
                None => (-1, unbound),
            };
            let nm = normal_matrix(&m);

            let face_normal = {
                let p = |k: usize| mesh.vertices[face.vertices[k]];
                (p(1) - p(0)).cross(p(2) - p(0))
            };

            let mut corners = Vec::with_capacity(face.vertices.len());
            for (k, &vi) in face.vertices.iter().enumerate() {
                let normal = face.normals.get(k).cloned().unwrap_or(face_normal);
                let color = if mesh.has_colors { face.colors.get(k).cloned() } else { None };
                let uv = if mesh.has_uvs { face.uvs.get(k).cloned() } else { None };
                let v = Vertex::new(
                    m.transform_point(mesh.vertices[vi]),
                    self.model.pos_scale,
                    nm * normal,
                    color,
                    uv,
                    group,
                );
                for &x in &v.position {
                    if !fits_in_16_bits(x) {
                        bail!(ErrorKind::Overflow(obj.name.clone(), x));
                    }
                }
                corners.push(v);
            }
            if let Some(prim) = Primitive::from_face(material, &corners) {
                prims.push(prim);
            }
        }

        let num_faces = prims.len();
        if self.opts.use_primitive_strip {
            prims = strip(prims);
        }
        debug!("{}: {} faces in {} primitives", obj.name, num_faces, prims.len());

        for prim in &prims {
            let matrix = {
                let group = prim.vertices[0].group;
                match bound.iter().find(|&&(g, _)| g == group) {
                    Some(&(_, j)) => {
                        let node = self.joints[j].node;
                        self.model.find_matrix(node)
                    }
                    None => 0,
                }
            };
            self.encode(&obj.name, mesh, prim, matrix, node_idx);
        }

        Ok(())
    }

    fn encode(&mut self, obj_name: &str, mesh: &Mesh, prim: &Primitive, matrix: usize, node_idx: NodeIdx) {
        let scene = self.scene;
        let material = &scene.materials[prim.material];
        let mat_idx = self.material(prim.material);
        let image_idx = self.model.materials[mat_idx].image_idx;

        let use_tex = image_idx != -1 &&
            material.kind.has_texture() &&
            material.tex_gen_mode != TexGenMode::Nrm;
        let use_clr = mesh.has_colors && material.kind.has_vertex_color();
        let use_nrm = (material.any_light() && material.kind.has_normals()) ||
            material.tex_gen_mode == TexGenMode::Nrm;
        let tex_size = if use_tex {
            let tex = &self.model.textures[image_idx as usize];
            (tex.width, tex.height)
        } else {
            (1, 1)
        };

        let p = self.model.find_polygon(&format!("{}_{}", obj_name, mat_idx));
        {
            let polygon = &mut self.model.polygons[p];
            polygon.use_tex = use_tex;
            polygon.use_clr = use_clr;
            polygon.use_nrm = use_nrm;
            polygon.tex_size = tex_size;

            let attrs = VertexAttrs {
                color: use_clr,
                normal: use_nrm,
                texcoord: if use_tex { Some(tex_size) } else { None },
            };
            let m = polygon.find_mtx_prim(matrix);
            encode_primitive(prim, attrs, &mut polygon.mtx_prims[m]);
        }
        self.model.nodes[node_idx].set_display(mat_idx, p);
    }

    /// Model material for scene material `source`. Its textures, including
    /// the ones used by its pattern animation, are loaded the first time.
    fn material(&mut self, source: usize) -> usize {
        let scene = self.scene;
        let material = &scene.materials[source];
        let known = self.model.materials.len();
        let idx = self.model.find_material(source, &material.name);
        if idx < known {
            return idx;
        }

        if let (true, Some(path)) = (material.kind.has_texture(), material.image.as_ref()) {
            match self.model.find_texture(path) {
                Ok(t) => {
                    let palette_idx = self.model.textures[t].palette_idx;
                    let mat = &mut self.model.materials[idx];
                    mat.image_idx = t as i32;
                    mat.palette_idx = palette_idx;
                }
                Err(e) => self.texture_failed(path, e),
            }
        }
        for &(_, ref path) in &material.pattern {
            if let Err(e) = self.model.find_texture(path) {
                self.texture_failed(path, e);
            }
        }
        idx
    }

    fn texture_failed(&mut self, path: &Path, e: Error) {
        warn!("{}", e);
        if self.model.texture_error.is_none() {
            let msg = match *e.kind() {
                ErrorKind::Resource(_, ref msg) => msg.clone(),
                _ => e.to_string(),
            };
            self.model.texture_error = Some((path.display().to_string(), msg));
        }
    }

    /// The vertex group and joint a vertex is bound to, if its first group
    /// names a bone of armature `arm`.
    fn group_joint(&self, mesh: &Mesh, arm: usize, vertex: usize) -> Option<(i32, usize)> {
        let group = *mesh.vertex_groups.get(vertex)?.first()?;
        let name = mesh.group_names.get(group)?;
        let bone = self.scene.objects[arm].bones.iter().position(|b| &b.name == name)?;
        let joint = *self.bone_nodes[arm].get(bone)?;
        if joint >= self.joints.len() {
            return None;
        }
        Some((group as i32, joint))
    }
}

/// Whether every corner of `face` has the same first vertex group.
fn same_group(mesh: &Mesh, face: &Face) -> bool {
    let group = |vi: usize| mesh.vertex_groups.get(vi).and_then(|gs| gs.first().cloned());
    let first = group(face.vertices[0]);
    face.vertices.iter().all(|&vi| group(vi) == first)
}

/// The scene material of `face`, or why the face can't be exported.
fn check_face(face: &Face, mesh: &Mesh, slots: &[Option<usize>]) -> ::std::result::Result<usize, DiagnosticKind> {
    let n = face.vertices.len();
    if n > 4 {
        return Err(DiagnosticKind::Ngon);
    }
    if n < 3 {
        return Err(DiagnosticKind::Line);
    }
    let material = match slots.get(face.material) {
        Some(&Some(m)) => m,
        _ => return Err(DiagnosticKind::NoMaterial),
    };
    if face.vertices.iter().any(|&vi| vi >= mesh.vertices.len()) {
        return Err(DiagnosticKind::BadVertexIndex);
    }
    Ok(material)
}
