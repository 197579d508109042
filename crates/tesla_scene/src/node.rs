//! Scene tree data model
//!
//! A scene is a strict tree: every [`Node`] owns its children outright and
//! nothing points back up. The node kind is carried by the [`NodeBody`]
//! variant, so the envelope fields exist once per node rather than once per
//! payload type.

use serde::{Deserialize, Serialize};

use crate::kind::{NodeKind, HEADER_SIZE};

/// 4x4 transform, row-major (`matrix[row * 4 + col]`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub matrix: [f32; 16],
}

impl Transform {
    pub const IDENTITY: Self = Self {
        matrix: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn from_rows(matrix: [f32; 16]) -> Self {
        Self { matrix }
    }

    /// Translation in the last column, matching the row-major convention
    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        let mut t = Self::IDENTITY;
        t.matrix[3] = x;
        t.matrix[7] = y;
        t.matrix[11] = z;
        t
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.matrix[row * 4 + col]
    }

    /// Convert from a column-major glam matrix
    pub fn from_mat4(m: &glam::Mat4) -> Self {
        Self {
            matrix: m.transpose().to_cols_array(),
        }
    }

    /// Convert to a column-major glam matrix
    pub fn to_mat4(&self) -> glam::Mat4 {
        glam::Mat4::from_cols_array(&self.matrix).transpose()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Opaque material reference, resolved by the engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Groups meshes; `materials[i]` belongs to the i-th Mesh child
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Object {
    pub materials: Vec<Material>,
}

impl Object {
    pub fn new(materials: impl IntoIterator<Item = Material>) -> Self {
        Self {
            materials: materials.into_iter().collect(),
        }
    }
}

/// Mesh marker. Vertex arrays and the index array are children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Mesh;

/// One per-vertex attribute channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexArray {
    /// Semantic tag ("Position", "Normal", "TexCoord", ...)
    pub attribute: String,
    /// Floats per vertex, 1-4
    pub vert_length: u8,
    /// Number of vertices (not floats)
    pub num_elements: u32,
    pub data: Vec<f32>,
}

impl VertexArray {
    /// Builds an array whose vertex count is derived from `data`
    pub fn new(attribute: impl Into<String>, vert_length: u8, data: Vec<f32>) -> Self {
        let num_elements = if vert_length == 0 {
            0
        } else {
            (data.len() / vert_length as usize) as u32
        };
        Self {
            attribute: attribute.into(),
            vert_length,
            num_elements,
            data,
        }
    }

    pub fn positions(data: Vec<f32>) -> Self {
        Self::new("Position", 3, data)
    }

    pub fn normals(data: Vec<f32>) -> Self {
        Self::new("Normal", 3, data)
    }

    pub fn tex_coords(data: Vec<f32>) -> Self {
        Self::new("TexCoord", 2, data)
    }

    /// The floats of vertex `index`
    pub fn vertex(&self, index: usize) -> Option<&[f32]> {
        chunk(&self.data, self.vert_length as usize, index)
    }
}

/// Face indices into the sibling vertex arrays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexArray {
    /// 3 for triangles, 4 for quads
    pub sides: u8,
    pub num_faces: u32,
    pub indices: Vec<u32>,
}

impl IndexArray {
    pub fn new(sides: u8, indices: Vec<u32>) -> Self {
        let num_faces = if sides == 0 {
            0
        } else {
            (indices.len() / sides as usize) as u32
        };
        Self {
            sides,
            num_faces,
            indices,
        }
    }

    pub fn triangles(indices: Vec<u32>) -> Self {
        Self::new(3, indices)
    }

    pub fn quads(indices: Vec<u32>) -> Self {
        Self::new(4, indices)
    }

    pub fn face(&self, index: usize) -> Option<&[u32]> {
        chunk(&self.indices, self.sides as usize, index)
    }
}

/// The `index`-th run of `len` items, if it lies wholly inside `items`
fn chunk<T>(items: &[T], len: usize, index: usize) -> Option<&[T]> {
    if len == 0 {
        return None;
    }
    let start = index.checked_mul(len)?;
    items.get(start..start.checked_add(len)?)
}

/// Placeholder for a node kind this reader does not understand
///
/// `data` holds the node's payload and encoded children exactly as they
/// appeared on the wire, so `data.len()` is the declared `size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownNode {
    pub kind: u16,
    pub num_children: u16,
    pub data: Vec<u8>,
}

/// Kind-specific part of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeBody {
    Root,
    Transform(Transform),
    Object(Object),
    Mesh(Mesh),
    VertexArray(VertexArray),
    IndexArray(IndexArray),
    Material(Material),
    Unknown(UnknownNode),
}

impl NodeBody {
    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            Self::Root => Some(NodeKind::Root),
            Self::Transform(_) => Some(NodeKind::Transform),
            Self::Object(_) => Some(NodeKind::Object),
            Self::Mesh(_) => Some(NodeKind::Mesh),
            Self::VertexArray(_) => Some(NodeKind::VertexArray),
            Self::IndexArray(_) => Some(NodeKind::IndexArray),
            Self::Material(_) => Some(NodeKind::Material),
            Self::Unknown(_) => None,
        }
    }

    /// Raw discriminant as written in the envelope
    pub fn kind_id(&self) -> u16 {
        match self {
            Self::Unknown(unknown) => unknown.kind,
            other => other.kind().map(NodeKind::as_u16).unwrap_or_default(),
        }
    }
}

/// A node in the scene tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub body: NodeBody,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(body: NodeBody) -> Self {
        Self {
            body,
            children: Vec::new(),
        }
    }

    pub fn root() -> Self {
        Self::new(NodeBody::Root)
    }

    pub fn transform(transform: Transform) -> Self {
        Self::new(NodeBody::Transform(transform))
    }

    pub fn object(materials: impl IntoIterator<Item = Material>) -> Self {
        Self::new(NodeBody::Object(Object::new(materials)))
    }

    pub fn mesh() -> Self {
        Self::new(NodeBody::Mesh(Mesh))
    }

    pub fn vertex_array(array: VertexArray) -> Self {
        Self::new(NodeBody::VertexArray(array))
    }

    pub fn index_array(array: IndexArray) -> Self {
        Self::new(NodeBody::IndexArray(array))
    }

    pub fn material(name: impl Into<String>) -> Self {
        Self::new(NodeBody::Material(Material::new(name)))
    }

    pub fn unknown(kind: u16, num_children: u16, data: Vec<u8>) -> Self {
        Self::new(NodeBody::Unknown(UnknownNode {
            kind,
            num_children,
            data,
        }))
    }

    /// Append a child (builder style)
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    #[inline]
    pub fn kind(&self) -> Option<NodeKind> {
        self.body.kind()
    }

    #[inline]
    pub fn kind_id(&self) -> u16 {
        self.body.kind_id()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.body, NodeBody::Unknown(_))
    }

    /// Child count as written in the envelope
    pub fn num_children(&self) -> usize {
        match &self.body {
            NodeBody::Unknown(unknown) => unknown.num_children as usize,
            _ => self.children.len(),
        }
    }

    /// Direct children of the given kind
    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(move |c| c.kind() == Some(kind))
    }

    /// Bytes following this node's envelope: payload plus encoded children
    ///
    /// For a decoded tree this equals the `size` the envelope declared.
    pub fn size(&self) -> usize {
        self.payload_len()
            + self
                .children
                .iter()
                .map(|child| HEADER_SIZE + child.size())
                .sum::<usize>()
    }

    /// Full encoded length of this node including its envelope
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.size()
    }

    pub fn payload_len(&self) -> usize {
        match &self.body {
            NodeBody::Root => 0,
            NodeBody::Transform(t) => t.payload_len(),
            NodeBody::Object(o) => o.payload_len(),
            NodeBody::Mesh(m) => m.payload_len(),
            NodeBody::VertexArray(v) => v.payload_len(),
            NodeBody::IndexArray(i) => i.payload_len(),
            NodeBody::Material(m) => m.payload_len(),
            NodeBody::Unknown(u) => u.data.len(),
        }
    }

    /// Follow child indices from this node
    pub fn get(&self, path: &[usize]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }
}

/// Location of a node as child indices from the root, shown as `root/0/2`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("root")?;
        for index in &self.0 {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}
