//! Scene encoder and decoder
//!
//! ## Document layout
//!
//! ```text
//! ┌────────────┬───────────────────────────────────────────┐
//! │ "FULHAX"   │ Root node (envelope + payload + children) │
//! │ 6 bytes    │                                           │
//! └────────────┴───────────────────────────────────────────┘
//! ```
//!
//! Decoding bounds every node to the region its envelope declares. Running
//! out of bytes while the outermost region is still being established means
//! the stream was cut short ([`TruncatedInputError`]); running past a region
//! that the buffer did contain means a `size` field lied ([`FormatError`]).

use crate::config::CodecConfig;
use crate::error::{DecodeError, DecodeResult, EncodeResult, FormatError, TruncatedInputError};
use crate::kind::{NodeHeader, NodeKind, HEADER_SIZE, MAGIC};
use crate::node::{IndexArray, Material, Mesh, Node, NodeBody, Object, Transform, VertexArray};
use crate::validate::validate_tree;
use crate::wire::{WireReader, WireWriter};

/// Writes scene trees to bytes
#[derive(Debug, Clone, Default)]
pub struct SceneEncoder {
    config: CodecConfig,
}

impl SceneEncoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode the document rooted at `root`
    ///
    /// The whole tree is validated first; on error nothing is produced.
    pub fn encode(&self, root: &Node) -> EncodeResult<Vec<u8>> {
        let root_size = validate_tree(root, &self.config)?;

        let mut writer = WireWriter::with_capacity(MAGIC.len() + HEADER_SIZE + root_size as usize);
        writer.write_bytes(MAGIC);
        let nodes = write_node(&mut writer, root);

        log::debug!("Encoded scene: {} nodes, {} bytes", nodes, writer.len());
        Ok(writer.into_inner())
    }
}

/// Write one node and its subtree, returning the number of nodes written
fn write_node(w: &mut WireWriter, node: &Node) -> usize {
    let start = w.len();
    NodeHeader {
        size: 0,
        kind: node.kind_id(),
        num_children: node.num_children() as u16,
    }
    .write(w);

    match &node.body {
        NodeBody::Root => {}
        NodeBody::Transform(t) => t.write_payload(w),
        NodeBody::Object(o) => o.write_payload(w),
        NodeBody::Mesh(m) => {
            let arrays = node.children_of_kind(NodeKind::VertexArray).count();
            m.write_payload(w, arrays as u32);
        }
        NodeBody::VertexArray(v) => v.write_payload(w),
        NodeBody::IndexArray(i) => i.write_payload(w),
        NodeBody::Material(m) => m.write_payload(w),
        NodeBody::Unknown(u) => w.write_bytes(&u.data),
    }

    let mut nodes = 1;
    for child in &node.children {
        nodes += write_node(w, child);
    }

    // Sizes were checked against u32 during validation
    let size = w.len() - start - HEADER_SIZE;
    w.patch_u32(start, size as u32);
    log::trace!("Wrote {:?} node at byte {} ({} bytes)", node.kind(), start, size);
    nodes
}

/// Reads scene trees from bytes
#[derive(Debug, Clone, Default)]
pub struct SceneDecoder {
    config: CodecConfig,
}

impl SceneDecoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decode a complete document and return its Root node
    pub fn decode(&self, bytes: &[u8]) -> DecodeResult<Node> {
        check_magic(bytes)?;

        let mut reader = WireReader::new(bytes);
        reader.read_bytes(MAGIC.len())?;

        let root_offset = reader.offset();
        let header = NodeHeader::read(&mut reader)?;
        if header.known_kind() != Some(NodeKind::Root) {
            return Err(FormatError::RootExpected { kind: header.kind }.into());
        }
        let mut region = reader.split(header.size as usize)?;
        let root = self.read_region(header, root_offset, &mut region, 0)?;

        if !reader.is_empty() {
            return Err(FormatError::TrailingBytes {
                remaining: reader.remaining(),
            }
            .into());
        }

        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Decoded scene: {} nodes, {} bytes", root.walk().count(), bytes.len());
        }
        Ok(root)
    }

    fn read_node(&self, reader: &mut WireReader<'_>, depth: u32) -> DecodeResult<Node> {
        let offset = reader.offset();
        let max_depth = self.config.depth_limit();
        if depth > max_depth {
            return Err(FormatError::TooDeep { offset, max_depth }.into());
        }
        let header = NodeHeader::read(reader)?;
        let mut region = reader.split(header.size as usize)?;
        self.read_region(header, offset, &mut region, depth)
    }

    /// Decode a node whose `size` bytes are known to be present
    fn read_region(
        &self,
        header: NodeHeader,
        offset: usize,
        region: &mut WireReader<'_>,
        depth: u32,
    ) -> DecodeResult<Node> {
        self.read_contents(header, offset, region, depth)
            .map_err(|err| match err {
                DecodeError::Truncated(source) => FormatError::Overrun {
                    kind: header.kind,
                    offset,
                    source,
                }
                .into(),
                other => other,
            })
    }

    fn read_contents(
        &self,
        header: NodeHeader,
        offset: usize,
        region: &mut WireReader<'_>,
        depth: u32,
    ) -> DecodeResult<Node> {
        let Some(kind) = header.known_kind() else {
            log::warn!(
                "Skipping unknown node kind {} at byte {} ({} bytes, {} children)",
                header.kind,
                offset,
                header.size,
                header.num_children
            );
            let data = region.read_bytes(region.remaining())?.to_vec();
            return Ok(Node::unknown(header.kind, header.num_children, data));
        };

        let mut declared_children = 0u32;
        let body = match kind {
            NodeKind::Root => NodeBody::Root,
            NodeKind::Transform => NodeBody::Transform(Transform::read_payload(region)?),
            NodeKind::Object => {
                let object = Object::read_payload(region, &self.config)?;
                declared_children = object.materials.len() as u32;
                NodeBody::Object(object)
            }
            NodeKind::Mesh => {
                declared_children = Mesh::read_payload(region)?;
                NodeBody::Mesh(Mesh)
            }
            NodeKind::VertexArray => NodeBody::VertexArray(VertexArray::read_payload(region, &self.config)?),
            NodeKind::IndexArray => NodeBody::IndexArray(IndexArray::read_payload(region)?),
            NodeKind::Material => NodeBody::Material(Material::read_payload(region, &self.config)?),
        };

        let capacity = (header.num_children as usize).min(region.remaining() / HEADER_SIZE);
        let mut children = Vec::with_capacity(capacity);
        for _ in 0..header.num_children {
            children.push(self.read_node(region, depth + 1)?);
        }

        if !region.is_empty() {
            return Err(FormatError::SizeMismatch {
                kind: header.kind,
                offset,
                declared: header.size,
                consumed: header.size as usize - region.remaining(),
            }
            .into());
        }

        let node = Node { body, children };
        check_structure(&node, kind, offset, declared_children)?;
        log::trace!("Read {} node at byte {} ({} bytes)", kind, offset, header.size);
        Ok(node)
    }
}

/// Counts declared in Object and Mesh payloads must match their children
fn check_structure(node: &Node, kind: NodeKind, offset: usize, declared: u32) -> Result<(), FormatError> {
    match kind {
        NodeKind::Object => {
            let found = node.children_of_kind(NodeKind::Mesh).count();
            if found != declared as usize {
                return Err(FormatError::MeshCountMismatch {
                    offset,
                    declared,
                    found,
                });
            }
        }
        NodeKind::Mesh => {
            match node.children_of_kind(NodeKind::IndexArray).count() {
                1 => {}
                0 => return Err(FormatError::MissingIndexArray { offset }),
                count => return Err(FormatError::MultipleIndexArrays { offset, count }),
            }
            let found = node.children_of_kind(NodeKind::VertexArray).count();
            if found != declared as usize {
                return Err(FormatError::VertexArrayCountMismatch {
                    offset,
                    declared,
                    found,
                });
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_magic(bytes: &[u8]) -> DecodeResult<()> {
    if bytes.len() < MAGIC.len() {
        if MAGIC.starts_with(bytes) {
            return Err(TruncatedInputError {
                offset: 0,
                needed: MAGIC.len(),
                available: bytes.len(),
            }
            .into());
        }
        return Err(FormatError::BadMagic {
            found: bytes.to_vec(),
        }
        .into());
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(FormatError::BadMagic {
            found: bytes[..MAGIC.len()].to_vec(),
        }
        .into());
    }
    Ok(())
}

/// Encode with the default configuration
pub fn encode(root: &Node) -> EncodeResult<Vec<u8>> {
    SceneEncoder::default().encode(root)
}

/// Decode with the default configuration
pub fn decode(bytes: &[u8]) -> DecodeResult<Node> {
    SceneDecoder::default().decode(bytes)
}
