//! Tree invariants checked before encoding
//!
//! Validation walks the whole tree once and computes every node's `size`
//! bottom-up on the way, so a tree that passes is guaranteed to encode.

use crate::config::CodecConfig;
use crate::error::{EncodeError, EncodeResult};
use crate::kind::{NodeKind, HEADER_SIZE};
use crate::node::{Node, NodeBody, NodePath};

/// Check every invariant of a document tree rooted at `root`
///
/// Returns the `size` the root's envelope will carry.
pub fn validate_tree(root: &Node, config: &CodecConfig) -> EncodeResult<u32> {
    let path = NodePath::root();
    if root.kind() != Some(NodeKind::Root) {
        return Err(EncodeError::RootExpected { path });
    }
    let size = validate_node(root, &path, 0, config)?;
    Ok(size as u32)
}

/// Validate `node` and its subtree, returning the node's `size`
fn validate_node(node: &Node, path: &NodePath, depth: u32, config: &CodecConfig) -> EncodeResult<u64> {
    let max_depth = config.depth_limit();
    if depth > max_depth {
        return Err(EncodeError::TooDeep {
            path: path.clone(),
            max_depth,
        });
    }
    if node.children.len() > u16::MAX as usize {
        return Err(EncodeError::TooManyChildren {
            path: path.clone(),
            count: node.children.len(),
        });
    }

    match &node.body {
        NodeBody::Root | NodeBody::Transform(_) => {}
        NodeBody::Material(material) => check_str(&material.name, path, config)?,
        NodeBody::Object(object) => {
            for material in &object.materials {
                check_str(&material.name, path, config)?;
            }
            let meshes = node.children_of_kind(NodeKind::Mesh).count();
            if object.materials.len() != meshes {
                return Err(EncodeError::MaterialCountMismatch {
                    path: path.clone(),
                    materials: object.materials.len(),
                    meshes,
                });
            }
        }
        NodeBody::Mesh(_) => match node.children_of_kind(NodeKind::IndexArray).count() {
            1 => {}
            0 => return Err(EncodeError::MissingIndexArray { path: path.clone() }),
            count => {
                return Err(EncodeError::MultipleIndexArrays {
                    path: path.clone(),
                    count,
                })
            }
        },
        NodeBody::VertexArray(array) => {
            check_str(&array.attribute, path, config)?;
            if !(1..=4).contains(&array.vert_length) {
                return Err(EncodeError::InvalidVertexLength {
                    path: path.clone(),
                    vert_length: array.vert_length,
                });
            }
            let expected = array.num_elements as u64 * array.vert_length as u64;
            if expected != array.data.len() as u64 {
                return Err(EncodeError::VertexDataMismatch {
                    path: path.clone(),
                    num_elements: array.num_elements,
                    vert_length: array.vert_length,
                    floats: array.data.len(),
                });
            }
        }
        NodeBody::IndexArray(array) => {
            if array.sides != 3 && array.sides != 4 {
                return Err(EncodeError::InvalidSides {
                    path: path.clone(),
                    sides: array.sides,
                });
            }
            let expected = array.num_faces as u64 * array.sides as u64;
            if expected != array.indices.len() as u64 {
                return Err(EncodeError::IndexDataMismatch {
                    path: path.clone(),
                    num_faces: array.num_faces,
                    sides: array.sides,
                    indices: array.indices.len(),
                });
            }
        }
        NodeBody::Unknown(unknown) => {
            if NodeKind::from_u16(unknown.kind).is_some() {
                return Err(EncodeError::UnknownWithKnownKind {
                    path: path.clone(),
                    kind: unknown.kind,
                });
            }
            if !node.children.is_empty() {
                return Err(EncodeError::UnknownWithChildren { path: path.clone() });
            }
        }
    }

    let mut size = node.payload_len() as u64;
    for (index, child) in node.children.iter().enumerate() {
        size += HEADER_SIZE as u64 + validate_node(child, &path.child(index), depth + 1, config)?;
    }
    if size > u32::MAX as u64 {
        return Err(EncodeError::NodeTooLarge { path: path.clone() });
    }
    Ok(size)
}

fn check_str(value: &str, path: &NodePath, config: &CodecConfig) -> EncodeResult<()> {
    if value.len() > config.max_string_len as usize {
        return Err(EncodeError::StringTooLong {
            path: path.clone(),
            len: value.len(),
            max: config.max_string_len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{IndexArray, Material, VertexArray};

    fn mesh() -> Node {
        Node::mesh()
            .with_child(Node::vertex_array(VertexArray::positions(vec![0.0; 9])))
            .with_child(Node::index_array(IndexArray::triangles(vec![0, 1, 2])))
    }

    #[test]
    fn test_valid_tree_passes() {
        let root = Node::root().with_child(Node::object([Material::new("Default")]).with_child(mesh()));
        let size = validate_tree(&root, &CodecConfig::default()).unwrap();
        assert_eq!(size as usize, root.size());
    }

    #[test]
    fn test_root_required() {
        let err = validate_tree(&mesh(), &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, EncodeError::RootExpected { .. }));
    }

    #[test]
    fn test_error_names_path() {
        let bad_mesh = Node::mesh().with_child(Node::vertex_array(VertexArray::positions(vec![0.0; 3])));
        let root = Node::root().with_child(
            Node::object([Material::new("A"), Material::new("B")])
                .with_child(mesh())
                .with_child(bad_mesh),
        );
        let err = validate_tree(&root, &CodecConfig::default()).unwrap_err();
        assert_eq!(
            err,
            EncodeError::MissingIndexArray {
                path: NodePath::from(vec![0, 1])
            }
        );
        assert_eq!(err.to_string(), "Mesh at root/0/1 has no index array");
    }

    #[test]
    fn test_string_limit() {
        let root = Node::root().with_child(Node::material("x".repeat(40)));
        let config = CodecConfig::default().with_max_string_len(32);
        let err = validate_tree(&root, &config).unwrap_err();
        assert!(matches!(err, EncodeError::StringTooLong { len: 40, max: 32, .. }));
    }

    #[test]
    fn test_unknown_with_children_rejected() {
        let root = Node::root().with_child(Node::unknown(900, 0, vec![]).with_child(Node::root()));
        let err = validate_tree(&root, &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, EncodeError::UnknownWithChildren { .. }));
    }
}
