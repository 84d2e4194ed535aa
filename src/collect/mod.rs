//! Walks the scene and fills in a `Model`.
//!
//! Spaces. Let G = Scale(magnification) * (global matrix); it takes scene
//! world space to model space. For an object with world matrix W, its mesh
//! vertices go to model space as
//!
//!     G W v
//!
//! Object nodes get identity transforms; their vertices are baked in model
//! space and drawn with matrix 0 (the root).
//!
//! Bones are the only nodes with transforms. For a bone with rest pose B (in
//! armature space) whose parent bone has rest pose P, the transform relative
//! to its parent node is
//!
//!     L = P^-1 B                  (child bone)
//!     L = W_arm B                 (top-level bone, parent is an object node)
//!
//! and its node transform is L conjugated into model space, G L G^-1. The
//! node's model-space matrix then works out to G W_arm B G^-1, so a vertex
//! bound to the bone is stored as
//!
//!     G (W_arm B)^-1 W v
//!
//! which the bone's node matrix takes back to G W v.

mod mesh;

use cgmath::{Matrix4, SquareMatrix, Vector3};
use errors::{Diagnostic, ErrorKind, Result};
use nitro::model::{BoxTest, Model, Node, NodeKind};
use options::ExportOptions;
use scene::{ObjectKind, Scene};
use util::fixed::{fx32, pos_scale};
use util::transform::TRS;
use util::tree::NodeIdx;

pub struct Collected {
    pub model: Model,
    /// Every bone, in node order.
    pub joints: Vec<Joint>,
    /// Faces that were skipped.
    pub diagnostics: Vec<Diagnostic>,
    /// Scene world space to model space.
    pub global: Matrix4<f64>,
    global_inv: Matrix4<f64>,
}

pub struct Joint {
    pub node: NodeIdx,
    /// Armature object and bone index in the scene.
    pub object: usize,
    pub bone: usize,
    /// Applied in front of the bone's parent-relative transform; the
    /// armature's world matrix for top-level bones, identity otherwise.
    pub pre: Matrix4<f64>,
    /// Rest transform relative to the parent bone.
    pub rest: TRS,
    /// Takes world-space vertices to bone-local model space.
    skin: Matrix4<f64>,
}

impl Collected {
    /// The node transform of `joint` when its parent-relative transform is
    /// `local`. Rotations are in degrees.
    pub fn joint_node_trs(&self, joint: &Joint, local: &TRS) -> TRS {
        let l = joint.pre * Matrix4::from(local);
        let mut trs = TRS::from_matrix(&(self.global * l * self.global_inv));
        trs.rotation = degrees(trs.rotation);
        trs
    }
}

pub fn degrees(v: Vector3<f64>) -> Vector3<f64> {
    v.map(|x| x.to_degrees())
}

/// Builds the model for `scene`.
pub fn collect(scene: &Scene, opts: &ExportOptions) -> Result<Collected> {
    let global = Matrix4::from_scale(opts.magnification) * scene.global_matrix;
    let global_inv = match global.invert() {
        Some(m) => m,
        None => bail!(ErrorKind::Scene("global matrix is not invertible".to_string())),
    };

    let world = world_matrices(scene)?;
    let (pos_scale, box_test) = bounds(scene, &world, &global);
    debug!("pos_scale {}, box {:?}", pos_scale, box_test);

    let mut c = Collector {
        scene,
        opts,
        global,
        global_inv,
        world,
        model: Model::new(pos_scale, box_test),
        joints: vec![],
        diagnostics: vec![],
        bone_nodes: vec![vec![]; scene.objects.len()],
    };

    let root = c.model.add_node(Node::new("root".to_string(), NodeKind::Null))?;
    c.model.find_matrix(root);
    let children = c.object_nodes(None)?;
    c.model.nodes.link_children(root, &children);

    c.model.finish();

    Ok(Collected {
        model: c.model,
        joints: c.joints,
        diagnostics: c.diagnostics,
        global,
        global_inv,
    })
}

struct Collector<'a> {
    scene: &'a Scene,
    opts: &'a ExportOptions,
    global: Matrix4<f64>,
    global_inv: Matrix4<f64>,
    /// World matrix of every object.
    world: Vec<Matrix4<f64>>,
    model: Model,
    joints: Vec<Joint>,
    diagnostics: Vec<Diagnostic>,
    /// For every armature object, the index into `joints` of each bone.
    bone_nodes: Vec<Vec<usize>>,
}

impl<'a> Collector<'a> {
    /// Nodes for the children of the object named `parent`, in scene order.
    fn object_nodes(&mut self, parent: Option<&str>) -> Result<Vec<NodeIdx>> {
        let scene = self.scene;
        let mut nodes = vec![];
        for i in scene.children_of(parent) {
            let obj = &scene.objects[i];
            let kind = match obj.kind {
                ObjectKind::Mesh => NodeKind::Mesh,
                ObjectKind::Armature | ObjectKind::Empty => NodeKind::Null,
            };
            let mut node = Node::new(obj.name.clone(), kind);
            node.visible = obj.visible;
            node.billboard = obj.billboard;
            let node_idx = self.model.add_node(node)?;
            trace!("node {} = object {}", node_idx, obj.name);

            if obj.kind == ObjectKind::Mesh {
                self.mesh(i, node_idx)?;
            }

            // Bones come before child objects.
            let mut children = vec![];
            if obj.kind == ObjectKind::Armature {
                self.bone_nodes[i] = vec![usize::max_value(); obj.bones.len()];
                children.extend(self.bone_children(i, None)?);
            }
            children.extend(self.object_nodes(Some(&obj.name))?);
            self.model.nodes.link_children(node_idx, &children);

            nodes.push(node_idx);
        }
        Ok(nodes)
    }

    /// Nodes for the bones of armature `obj_idx` whose parent is `parent`.
    fn bone_children(&mut self, obj_idx: usize, parent: Option<usize>) -> Result<Vec<NodeIdx>> {
        let scene = self.scene;
        let obj = &scene.objects[obj_idx];
        let arm_world = self.world[obj_idx];
        let mut nodes = vec![];

        for (bone_idx, bone) in obj.bones.iter().enumerate() {
            let bone_parent = bone.parent.as_ref()
                .and_then(|name| obj.bones.iter().position(|b| &b.name == name));
            if bone_parent != parent {
                continue;
            }

            let (pre, rel) = match parent {
                Some(p) => {
                    let parent_inv = invert(&obj.bones[p].matrix, &bone.name)?;
                    (Matrix4::identity(), parent_inv * bone.matrix)
                }
                None => (arm_world, bone.matrix),
            };
            let bind_inv = invert(&(arm_world * bone.matrix), &bone.name)?;

            let mut joint = Joint {
                node: -1,
                object: obj_idx,
                bone: bone_idx,
                pre,
                rest: TRS::from_matrix(&rel),
                skin: self.global * bind_inv,
            };

            let trs = TRS::from_matrix(&(self.global * pre * rel * self.global_inv));
            let mut node = Node::new(bone.name.clone(), NodeKind::Joint);
            node.scale = trs.scale;
            node.rotate = degrees(trs.rotation);
            node.translate = trs.translation;
            let node_idx = self.model.add_node(node)?;
            trace!("node {} = bone {}", node_idx, bone.name);
            self.model.find_matrix(node_idx);

            joint.node = node_idx;
            self.bone_nodes[obj_idx][bone_idx] = self.joints.len();
            self.joints.push(joint);

            let children = self.bone_children(obj_idx, Some(bone_idx))?;
            self.model.nodes.link_children(node_idx, &children);
            nodes.push(node_idx);
        }
        Ok(nodes)
    }

    /// The nearest armature among the ancestors of object `obj_idx`.
    fn armature_of(&self, obj_idx: usize) -> Option<usize> {
        let scene = self.scene;
        let mut cur = scene.objects[obj_idx].parent.as_ref()
            .and_then(|p| scene.object_by_name(p));
        while let Some(i) = cur {
            if scene.objects[i].kind == ObjectKind::Armature {
                return Some(i);
            }
            cur = scene.objects[i].parent.as_ref()
                .and_then(|p| scene.object_by_name(p));
        }
        None
    }
}

fn invert(m: &Matrix4<f64>, what: &str) -> Result<Matrix4<f64>> {
    match m.invert() {
        Some(inv) => Ok(inv),
        None => bail!(ErrorKind::Scene(format!("matrix of {} is not invertible", what))),
    }
}

/// World matrix of every object. Parents are looked up by name; a cycle is
/// an error.
fn world_matrices(scene: &Scene) -> Result<Vec<Matrix4<f64>>> {
    let mut world = Vec::with_capacity(scene.objects.len());
    for obj in &scene.objects {
        let mut m = obj.local_matrix();
        let mut parent = obj.parent.as_ref();
        let mut depth = 0;
        while let Some(name) = parent {
            depth += 1;
            if depth > scene.objects.len() {
                bail!(ErrorKind::Scene(format!("object {} is its own ancestor", obj.name)));
            }
            match scene.object_by_name(name) {
                Some(p) => {
                    m = scene.objects[p].local_matrix() * m;
                    parent = scene.objects[p].parent.as_ref();
                }
                None => bail!(ErrorKind::Scene(format!("unknown parent {}", name))),
            }
        }
        world.push(m);
    }
    Ok(world)
}

/// pos_scale and bounding box over every mesh vertex in model space.
fn bounds(scene: &Scene, world: &[Matrix4<f64>], global: &Matrix4<f64>) -> (u32, BoxTest) {
    use cgmath::Transform;

    let mut min = [::std::f64::INFINITY; 3];
    let mut max = [::std::f64::NEG_INFINITY; 3];
    for (obj, w) in scene.objects.iter().zip(world) {
        let mesh = match (obj.kind, obj.mesh.as_ref()) {
            (ObjectKind::Mesh, Some(mesh)) => mesh,
            _ => continue,
        };
        let m = global * w;
        for v in &mesh.vertices {
            let p = m.transform_point(*v);
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
    }
    if min[0] > max[0] {
        min = [0.0; 3];
        max = [0.0; 3];
    }

    let max_of = |v: &[f64; 3]| v[0].max(v[1]).max(v[2]);
    let min_of = |v: &[f64; 3]| v[0].min(v[1]).min(v[2]);

    let model_scale = pos_scale(max_of(&max).abs().max(min_of(&min).abs()));

    let whd = [max[0] - min[0], max[1] - min[1], max[2] - min[2]];
    let box_scale = pos_scale(max_of(&whd).abs().max(min_of(&min).abs()));
    let shift = |v: &[f64; 3]| [
        fx32(v[0]) >> box_scale,
        fx32(v[1]) >> box_scale,
        fx32(v[2]) >> box_scale,
    ];
    let box_test = BoxTest {
        pos_scale: box_scale,
        xyz: shift(&min),
        whd: shift(&whd),
    };

    (model_scale, box_test)
}
