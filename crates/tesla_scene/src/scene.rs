//! Scene documents and `.tesm` files

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::{SceneDecoder, SceneEncoder};
use crate::config::CodecConfig;
use crate::error::{DecodeResult, EncodeResult, Result, SceneError};
use crate::kind::{NodeKind, MAGIC};
use crate::node::{Node, NodeBody};

/// File extension used for scene files
pub const TESM_EXTENSION: &str = "tesm";

/// A complete scene document: one Root node and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub root: Node,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// An empty scene (a childless Root)
    pub fn new() -> Self {
        Self { root: Node::root() }
    }

    /// Wrap an existing tree; encoding fails if `root` is not a Root node
    pub fn from_root(root: Node) -> Self {
        Self { root }
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.root.push_child(child);
        self
    }

    pub fn encode(&self) -> EncodeResult<Vec<u8>> {
        SceneEncoder::default().encode(&self.root)
    }

    pub fn encode_with(&self, encoder: &SceneEncoder) -> EncodeResult<Vec<u8>> {
        encoder.encode(&self.root)
    }

    pub fn decode(bytes: &[u8]) -> DecodeResult<Self> {
        Self::decode_with(&SceneDecoder::default(), bytes)
    }

    pub fn decode_with(decoder: &SceneDecoder, bytes: &[u8]) -> DecodeResult<Self> {
        Ok(Self {
            root: decoder.decode(bytes)?,
        })
    }

    /// Read and decode a scene file using `config` limits
    pub fn load_with(path: impl AsRef<Path>, config: &CodecConfig) -> Result<Self> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        if size > config.max_file_size {
            return Err(SceneError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                max: config.max_file_size,
            });
        }

        let data = std::fs::read(path)?;
        let scene = Self::decode_with(&SceneDecoder::new(config.clone()), &data)?;
        log::info!("Loaded scene {} ({} bytes)", path.display(), data.len());
        Ok(scene)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &CodecConfig::default())
    }

    /// Encode and write the whole file in one call
    pub fn save_with(&self, path: impl AsRef<Path>, config: &CodecConfig) -> Result<()> {
        let path = path.as_ref();
        let data = self.encode_with(&SceneEncoder::new(config.clone()))?;
        std::fs::write(path, &data)?;
        log::info!("Saved scene {} ({} bytes)", path.display(), data.len());
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_with(path, &CodecConfig::default())
    }

    /// Whether decoding skipped any node kind it did not understand
    pub fn has_unknown_content(&self) -> bool {
        self.root.walk().any(|(_, node)| node.is_unknown())
    }

    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats {
            encoded_size: MAGIC.len() + self.root.encoded_len(),
            ..Default::default()
        };
        for (depth, node) in self.root.walk() {
            stats.nodes += 1;
            stats.max_depth = stats.max_depth.max(depth);
            match node.kind() {
                Some(kind) => *stats.by_kind.entry(kind).or_default() += 1,
                None => stats.unknown_nodes += 1,
            }
            match &node.body {
                NodeBody::VertexArray(array) if array.attribute == "Position" => {
                    stats.vertices += array.num_elements as usize;
                }
                NodeBody::IndexArray(array) => stats.faces += array.num_faces as usize,
                _ => {}
            }
        }
        stats
    }
}

/// Summary counts for a scene
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneStats {
    /// Total nodes, unknown placeholders included
    pub nodes: usize,
    pub by_kind: BTreeMap<NodeKind, usize>,
    pub unknown_nodes: usize,
    /// Vertices across all "Position" arrays
    pub vertices: usize,
    pub faces: usize,
    /// Deepest level below the root
    pub max_depth: usize,
    /// Encoded document length including the magic
    pub encoded_size: usize,
}

impl SceneStats {
    pub fn count(&self, kind: NodeKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{IndexArray, Material, VertexArray};

    fn quad_scene() -> Scene {
        Scene::new().with_child(
            Node::object([Material::new("Floor")]).with_child(
                Node::mesh()
                    .with_child(Node::vertex_array(VertexArray::positions(vec![
                        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0,
                    ])))
                    .with_child(Node::vertex_array(VertexArray::tex_coords(vec![
                        0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0,
                    ])))
                    .with_child(Node::index_array(IndexArray::quads(vec![0, 1, 2, 3]))),
            ),
        )
    }

    #[test]
    fn test_stats() {
        let scene = quad_scene();
        let stats = scene.stats();
        assert_eq!(stats.nodes, 6);
        assert_eq!(stats.count(NodeKind::VertexArray), 2);
        assert_eq!(stats.count(NodeKind::Material), 0);
        assert_eq!(stats.vertices, 4);
        assert_eq!(stats.faces, 1);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.encoded_size, scene.encode().unwrap().len());
        assert!(!scene.has_unknown_content());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("floor.{}", TESM_EXTENSION));

        let scene = quad_scene();
        scene.save(&path).unwrap();
        assert_eq!(Scene::load(&path).unwrap(), scene);
    }

    #[test]
    fn test_load_rejects_large_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.tesm");
        quad_scene().save(&path).unwrap();

        let config = CodecConfig::default().with_max_file_size(16);
        let err = Scene::load_with(&path, &config).unwrap_err();
        assert!(matches!(err, SceneError::FileTooLarge { max: 16, .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scene::load(dir.path().join("missing.tesm")).unwrap_err();
        assert!(matches!(err, SceneError::Io(_)));
    }
}
