//! Integration tests for tesla_scene
//!
//! Round-trips full documents and checks the byte layout of a reference scene.

use tesla_scene::wire::{WireReader, WireWriter};
use tesla_scene::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Root → Transform → Object → Mesh → (VertexArray, IndexArray)
fn reference_scene() -> Scene {
    Scene::new().with_child(
        Node::transform(Transform::IDENTITY).with_child(
            Node::object([Material::new("Default")]).with_child(
                Node::mesh()
                    .with_child(Node::vertex_array(VertexArray {
                        attribute: "Position".to_string(),
                        vert_length: 3,
                        num_elements: 3,
                        data: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                    }))
                    .with_child(Node::index_array(IndexArray {
                        sides: 3,
                        num_faces: 1,
                        indices: vec![0, 1, 2],
                    })),
            ),
        ),
    )
}

fn header_at(bytes: &[u8], offset: usize) -> NodeHeader {
    NodeHeader::read(&mut WireReader::new(&bytes[offset..])).unwrap()
}

#[test]
fn test_reference_scene_fields() {
    init_logging();
    let scene = reference_scene();
    let bytes = scene.encode().unwrap();
    let decoded = Scene::decode(&bytes).unwrap();
    assert_eq!(decoded, scene);

    let transform = decoded.root.get(&[0]).unwrap();
    assert_eq!(transform.body, NodeBody::Transform(Transform::IDENTITY));

    let object = decoded.root.get(&[0, 0]).unwrap();
    match &object.body {
        NodeBody::Object(o) => assert_eq!(o.materials, vec![Material::new("Default")]),
        other => panic!("expected object, got {:?}", other),
    }

    let mesh = decoded.root.get(&[0, 0, 0]).unwrap();
    assert_eq!(mesh.kind(), Some(NodeKind::Mesh));
    assert_eq!(mesh.children.len(), 2);

    match &mesh.children[0].body {
        NodeBody::VertexArray(va) => {
            assert_eq!(va.attribute, "Position");
            assert_eq!(va.vert_length, 3);
            assert_eq!(va.num_elements, 3);
            assert_eq!(va.data, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        }
        other => panic!("expected vertex array, got {:?}", other),
    }
    match &mesh.children[1].body {
        NodeBody::IndexArray(ia) => {
            assert_eq!(ia.sides, 3);
            assert_eq!(ia.num_faces, 1);
            assert_eq!(ia.indices, vec![0, 1, 2]);
        }
        other => panic!("expected index array, got {:?}", other),
    }
}

#[test]
fn test_reference_scene_sizes_match_spans() {
    let scene = reference_scene();
    let bytes = scene.encode().unwrap();
    assert_eq!(&bytes[..6], b"FULHAX");
    assert_eq!(bytes.len(), 207);

    // (offset, path, kind, size, children)
    let expected: [(usize, &[usize], NodeKind, u32, u16); 6] = [
        (6, &[], NodeKind::Root, 193, 1),
        (14, &[0], NodeKind::Transform, 185, 1),
        (86, &[0, 0], NodeKind::Object, 113, 1),
        (109, &[0, 0, 0], NodeKind::Mesh, 90, 2),
        (121, &[0, 0, 0, 0], NodeKind::VertexArray, 53, 0),
        (182, &[0, 0, 0, 1], NodeKind::IndexArray, 17, 0),
    ];

    let decoded = Scene::decode(&bytes).unwrap();
    for (offset, path, kind, size, children) in expected {
        let header = header_at(&bytes, offset);
        assert_eq!(header.known_kind(), Some(kind), "kind at {}", offset);
        assert_eq!(header.size, size, "size of {}", kind);
        assert_eq!(header.num_children, children, "children of {}", kind);

        let node = decoded.root.get(path).unwrap();
        assert_eq!(node.size(), size as usize, "decoded size of {}", kind);
        // Skipping `size` bytes past the envelope lands on the next sibling or the parent's end
        assert!(offset + HEADER_SIZE + size as usize <= bytes.len());
    }

    // The last node's span ends exactly at the end of the buffer
    assert_eq!(182 + HEADER_SIZE + 17, bytes.len());
}

#[test]
fn test_roundtrip_multi_object_scene() {
    let mesh = |material_faces: u32| {
        Node::mesh()
            .with_child(Node::vertex_array(VertexArray::positions(vec![0.5; 12])))
            .with_child(Node::vertex_array(VertexArray::normals(vec![0.0, 1.0, 0.0].repeat(4))))
            .with_child(Node::vertex_array(VertexArray::new("Color", 4, vec![1.0; 16])))
            .with_child(Node::index_array(IndexArray::triangles(
                (0..material_faces * 3).map(|i| i % 4).collect(),
            )))
    };

    let scene = Scene::new()
        .with_child(
            Node::transform(Transform::from_translation(4.0, 0.0, -2.0)).with_child(
                Node::object([Material::new("Brick"), Material::new("Mortar")])
                    .with_child(mesh(2))
                    .with_child(mesh(5)),
            ),
        )
        .with_child(Node::material("Loose"))
        .with_child(
            Node::object([Material::new("Quad")]).with_child(
                Node::mesh()
                    .with_child(Node::index_array(IndexArray::quads(vec![0, 1, 2, 3]))),
            ),
        );

    let bytes = scene.encode().unwrap();
    assert_eq!(Scene::decode(&bytes).unwrap(), scene);
    assert_eq!(bytes.len(), scene.stats().encoded_size);
}

#[test]
fn test_unknown_node_is_skipped() {
    init_logging();
    // Hand-written document: Root → [Material "a", <kind 0x4242 with 9 bytes>, Transform → Material "b"]
    let mut w = WireWriter::new();
    w.write_bytes(MAGIC);

    let material_a = 4 + 1;
    let unknown = 9;
    let material_b = 4 + 1;
    let transform = 64 + HEADER_SIZE + material_b;
    let root = (HEADER_SIZE + material_a) + (HEADER_SIZE + unknown) + (HEADER_SIZE + transform);

    NodeHeader { size: root as u32, kind: 0, num_children: 3 }.write(&mut w);

    NodeHeader { size: material_a as u32, kind: 6, num_children: 0 }.write(&mut w);
    w.write_str("a");

    NodeHeader { size: unknown as u32, kind: 0x4242, num_children: 1 }.write(&mut w);
    let opaque = [0xde, 0xad, 0xbe, 0xef, 0x01, 0x02, 0x03, 0x04, 0x05];
    w.write_bytes(&opaque);

    NodeHeader { size: transform as u32, kind: 1, num_children: 1 }.write(&mut w);
    w.write_f32_slice(&Transform::IDENTITY.matrix);
    NodeHeader { size: material_b as u32, kind: 6, num_children: 0 }.write(&mut w);
    w.write_str("b");

    let bytes = w.into_inner();
    let scene = Scene::decode(&bytes).unwrap();

    assert!(scene.has_unknown_content());
    assert_eq!(scene.root.children.len(), 3);
    assert_eq!(scene.root.children[0], Node::material("a"));

    let placeholder = &scene.root.children[1];
    assert_eq!(placeholder.kind(), None);
    assert_eq!(placeholder.kind_id(), 0x4242);
    assert_eq!(placeholder.size(), unknown);
    assert_eq!(placeholder.num_children(), 1);
    assert!(placeholder.children.is_empty());
    assert_eq!(
        placeholder.body,
        NodeBody::Unknown(UnknownNode {
            kind: 0x4242,
            num_children: 1,
            data: opaque.to_vec(),
        })
    );

    assert_eq!(
        scene.root.children[2],
        Node::transform(Transform::IDENTITY).with_child(Node::material("b"))
    );

    // Unknown content survives a re-encode byte for byte
    assert_eq!(scene.encode().unwrap(), bytes);

    let stats = scene.stats();
    assert_eq!(stats.unknown_nodes, 1);
    assert_eq!(stats.nodes, 5);
}

#[test]
fn test_unknown_node_inside_mesh() {
    // A newer writer adds an extra child kind next to the mesh arrays
    let mut scene = reference_scene();
    let mesh = &mut scene.root.children[0].children[0].children[0];
    mesh.children.insert(1, Node::unknown(40, 0, b"tangent frame".to_vec()));

    let bytes = scene.encode().unwrap();
    let decoded = Scene::decode(&bytes).unwrap();
    assert_eq!(decoded, scene);

    let mesh = decoded.root.get(&[0, 0, 0]).unwrap();
    assert_eq!(mesh.children_of_kind(NodeKind::VertexArray).count(), 1);
    assert_eq!(mesh.children_of_kind(NodeKind::IndexArray).count(), 1);
    assert!(mesh.children[1].is_unknown());
}

#[test]
fn test_unknown_root_child_with_nested_envelopes() {
    // The opaque blob itself holds a complete node; the reader must not look inside
    let inner = Scene::new().with_child(Node::material("nested")).encode().unwrap();
    let blob = inner[6..].to_vec();

    let scene = Scene::new()
        .with_child(Node::unknown(1000, 1, blob.clone()))
        .with_child(Node::material("after"));
    let decoded = Scene::decode(&scene.encode().unwrap()).unwrap();

    assert_eq!(decoded.root.children[0].size(), blob.len());
    assert_eq!(decoded.root.children[1], Node::material("after"));
}

#[test]
fn test_concurrent_decode() {
    let bytes = reference_scene().encode().unwrap();
    let decoder = SceneDecoder::new(CodecConfig::default());
    let expected = reference_scene();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| Scene::decode_with(&decoder, &bytes).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_json_dump_roundtrip() {
    let scene = reference_scene();
    let json = serde_json::to_string_pretty(&scene).expect("Failed to serialize");
    assert!(json.contains("\"Position\""));

    let restored: Scene = serde_json::from_str(&json).expect("Failed to deserialize");
    assert_eq!(restored, scene);
}

#[test]
fn test_strict_config_limits_strings() {
    let scene = Scene::new().with_child(Node::material("m".repeat(300)));
    let bytes = scene.encode().unwrap();

    let strict = SceneDecoder::new(CodecConfig::strict());
    let err = Scene::decode_with(&strict, &bytes).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Format(FormatError::StringTooLong { len: 300, max: 256, .. })
    ));

    let encoder = SceneEncoder::new(CodecConfig::strict());
    assert!(matches!(
        scene.encode_with(&encoder),
        Err(EncodeError::StringTooLong { len: 300, .. })
    ));
}
