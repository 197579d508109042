//! Node kinds and the node envelope
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────────┐
//! │ size: u32    │ kind: u16    │ num_children: u16│   envelope (8 bytes)
//! ├──────────────┴──────────────┴──────────────────┤
//! │ payload (kind specific)                        │ ┐
//! ├────────────────────────────────────────────────┤ │ `size` bytes
//! │ child 0 .. child N-1 (envelope + payload + ..) │ ┘
//! └────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::TruncatedInputError;
use crate::wire::{WireReader, WireWriter};

/// Magic tag at the start of every document (no terminator)
pub const MAGIC: &[u8; 6] = b"FULHAX";

/// Size of the node envelope in bytes
pub const HEADER_SIZE: usize = 8;

/// The closed set of node kinds this codec understands
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Root = 0,
    Transform = 1,
    /// Groups meshes with one material each
    Object = 2,
    Mesh = 3,
    VertexArray = 4,
    IndexArray = 5,
    Material = 6,
}

impl NodeKind {
    pub const ALL: [NodeKind; 7] = [
        NodeKind::Root,
        NodeKind::Transform,
        NodeKind::Object,
        NodeKind::Mesh,
        NodeKind::VertexArray,
        NodeKind::IndexArray,
        NodeKind::Material,
    ];

    #[inline]
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            0 => Some(Self::Root),
            1 => Some(Self::Transform),
            2 => Some(Self::Object),
            3 => Some(Self::Mesh),
            4 => Some(Self::VertexArray),
            5 => Some(Self::IndexArray),
            6 => Some(Self::Material),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Root => "Root",
            Self::Transform => "Transform",
            Self::Object => "Object",
            Self::Mesh => "Mesh",
            Self::VertexArray => "VertexArray",
            Self::IndexArray => "IndexArray",
            Self::Material => "Material",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-layout header in front of every node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeader {
    /// Bytes of payload plus encoded children that follow the header
    pub size: u32,
    /// Raw kind discriminant, possibly unknown to this reader
    pub kind: u16,
    pub num_children: u16,
}

impl NodeHeader {
    pub fn read(reader: &mut WireReader<'_>) -> Result<Self, TruncatedInputError> {
        let size = reader.read_u32()?;
        let kind = reader.read_u16()?;
        let num_children = reader.read_u16()?;
        Ok(Self {
            size,
            kind,
            num_children,
        })
    }

    pub fn write(&self, writer: &mut WireWriter) {
        writer.write_u32(self.size);
        writer.write_u16(self.kind);
        writer.write_u16(self.num_children);
    }

    /// Known kind, if this reader recognises it
    pub fn known_kind(&self) -> Option<NodeKind> {
        NodeKind::from_u16(self.kind)
    }
}
