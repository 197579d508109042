//! # tesla_scene - Scene container codec
//!
//! Binary container for the Tesla engine scene graph (`.tesm` files). A
//! scene is a strict tree of typed nodes; every node starts with the same
//! envelope so a reader can step over node kinds it does not know.
//!
//! ## File Layout
//!
//! ```text
//! "FULHAX"                        6-byte magic, no terminator
//! Root                            envelope + children
//! └── Transform                   16 x f32, row-major
//!     └── Object                  one material per mesh
//!         └── Mesh                numVertexArrays
//!             ├── VertexArray     "Position", 3 floats per vertex
//!             ├── VertexArray     "TexCoord", 2 floats per vertex
//!             └── IndexArray      triangles or quads
//! ```
//!
//! All integers and floats are little-endian; strings are a `u32` byte length
//! followed by UTF-8.
//!
//! ## Example
//!
//! ```
//! use tesla_scene::prelude::*;
//!
//! let scene = Scene::new().with_child(
//!     Node::transform(Transform::IDENTITY).with_child(
//!         Node::object([Material::new("Default")]).with_child(
//!             Node::mesh()
//!                 .with_child(Node::vertex_array(VertexArray::positions(vec![
//!                     0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0,
//!                 ])))
//!                 .with_child(Node::index_array(IndexArray::triangles(vec![0, 1, 2]))),
//!         ),
//!     ),
//! );
//!
//! let bytes = scene.encode().unwrap();
//! assert_eq!(Scene::decode(&bytes).unwrap(), scene);
//! ```
//!
//! ## Forward Compatibility
//!
//! Nodes of an unrecognised kind decode to [`NodeBody::Unknown`] holding their
//! raw bytes. They are written back unchanged when the tree is re-encoded.

pub mod codec;
pub mod config;
pub mod error;
pub mod kind;
pub mod node;
pub mod payload;
pub mod scene;
pub mod validate;
pub mod walk;
pub mod wire;

pub use codec::{decode, encode, SceneDecoder, SceneEncoder};
pub use config::{CodecConfig, MAX_DEPTH_LIMIT};
pub use error::{
    ConfigError, DecodeError, DecodeResult, EncodeError, EncodeResult, FormatError, SceneError,
    TruncatedInputError,
};
pub use kind::{NodeHeader, NodeKind, HEADER_SIZE, MAGIC};
pub use node::{
    IndexArray, Material, Mesh, Node, NodeBody, NodePath, Object, Transform, UnknownNode, VertexArray,
};
pub use scene::{Scene, SceneStats, TESM_EXTENSION};
pub use validate::validate_tree;
pub use walk::Walk;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::codec::{SceneDecoder, SceneEncoder};
    pub use crate::config::CodecConfig;
    pub use crate::error::{DecodeError, EncodeError, FormatError, SceneError, TruncatedInputError};
    pub use crate::kind::NodeKind;
    pub use crate::node::{IndexArray, Material, Mesh, Node, NodeBody, Object, Transform, VertexArray};
    pub use crate::scene::Scene;
}
