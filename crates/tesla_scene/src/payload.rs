//! Per-kind payload codecs
//!
//! Each payload type knows its encoded length and how to write and read
//! itself. Children are never part of a payload; the codec appends them
//! after the payload.

use crate::config::CodecConfig;
use crate::error::{DecodeResult, FormatError};
use crate::node::{IndexArray, Material, Mesh, Object, Transform, VertexArray};
use crate::wire::{WireReader, WireWriter};

#[inline]
fn str_len(value: &str) -> usize {
    4 + value.len()
}

impl Transform {
    pub fn payload_len(&self) -> usize {
        16 * 4
    }

    pub fn write_payload(&self, w: &mut WireWriter) {
        w.write_f32_slice(&self.matrix);
    }

    pub fn read_payload(r: &mut WireReader<'_>) -> DecodeResult<Self> {
        let mut matrix = [0.0f32; 16];
        for value in matrix.iter_mut() {
            *value = r.read_f32()?;
        }
        Ok(Self { matrix })
    }
}

impl Material {
    pub fn payload_len(&self) -> usize {
        str_len(&self.name)
    }

    pub fn write_payload(&self, w: &mut WireWriter) {
        w.write_str(&self.name);
    }

    pub fn read_payload(r: &mut WireReader<'_>, config: &CodecConfig) -> DecodeResult<Self> {
        Ok(Self {
            name: r.read_str(config.max_string_len)?,
        })
    }
}

impl Object {
    pub fn payload_len(&self) -> usize {
        4 + self.materials.iter().map(Material::payload_len).sum::<usize>()
    }

    pub fn write_payload(&self, w: &mut WireWriter) {
        w.write_u32(self.materials.len() as u32);
        for material in &self.materials {
            material.write_payload(w);
        }
    }

    pub fn read_payload(r: &mut WireReader<'_>, config: &CodecConfig) -> DecodeResult<Self> {
        let count = r.read_u32()? as usize;
        // Every material needs at least its length prefix
        r.ensure(count.saturating_mul(4))?;
        let mut materials = Vec::with_capacity(count);
        for _ in 0..count {
            materials.push(Material::read_payload(r, config)?);
        }
        Ok(Self { materials })
    }
}

impl Mesh {
    pub fn payload_len(&self) -> usize {
        4
    }

    /// `num_vertex_arrays` is derived from the mesh's children
    pub fn write_payload(&self, w: &mut WireWriter, num_vertex_arrays: u32) {
        w.write_u32(num_vertex_arrays);
    }

    /// Returns the declared vertex array count
    pub fn read_payload(r: &mut WireReader<'_>) -> DecodeResult<u32> {
        Ok(r.read_u32()?)
    }
}

impl VertexArray {
    pub fn payload_len(&self) -> usize {
        str_len(&self.attribute) + 1 + 4 + self.data.len() * 4
    }

    pub fn write_payload(&self, w: &mut WireWriter) {
        w.write_str(&self.attribute);
        w.write_u8(self.vert_length);
        w.write_u32(self.num_elements);
        w.write_f32_slice(&self.data);
    }

    pub fn read_payload(r: &mut WireReader<'_>, config: &CodecConfig) -> DecodeResult<Self> {
        let attribute = r.read_str(config.max_string_len)?;
        let offset = r.offset();
        let vert_length = r.read_u8()?;
        if !(1..=4).contains(&vert_length) {
            return Err(FormatError::InvalidVertexLength {
                offset,
                vert_length,
            }
            .into());
        }
        let num_elements = r.read_u32()?;
        let data = r.read_f32_vec(num_elements as usize * vert_length as usize)?;
        Ok(Self {
            attribute,
            vert_length,
            num_elements,
            data,
        })
    }
}

impl IndexArray {
    pub fn payload_len(&self) -> usize {
        1 + 4 + self.indices.len() * 4
    }

    pub fn write_payload(&self, w: &mut WireWriter) {
        w.write_u8(self.sides);
        w.write_u32(self.num_faces);
        w.write_u32_slice(&self.indices);
    }

    pub fn read_payload(r: &mut WireReader<'_>) -> DecodeResult<Self> {
        let offset = r.offset();
        let sides = r.read_u8()?;
        if sides != 3 && sides != 4 {
            return Err(FormatError::InvalidSides { offset, sides }.into());
        }
        let num_faces = r.read_u32()?;
        let indices = r.read_u32_vec(num_faces as usize * sides as usize)?;
        Ok(Self {
            sides,
            num_faces,
            indices,
        })
    }
}
