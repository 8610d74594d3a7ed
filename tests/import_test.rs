use std::io::Write;

use serde_json::{Value, json};
use vci_import::{
    ImportConfig, ValidationError, ValidationErrorKind,
    data_structures::scene_graph::ComponentKind,
    import::{self, finish, stage},
    material::ShaderLibrary,
};

mod common;
use common::test_utils::{RecordingShaders, glb, pad4, png};

const SCRIPT: &str = "print('hello')";

/// A container with one script, two extension materials (one for an unknown
/// shader), an embedded texture, a sub item and one spring bone.
///
/// Scene: item (sub item) > hair > tip, plus a separate body node.
fn sample() -> (Value, Vec<u8>) {
    let mut bin = SCRIPT.as_bytes().to_vec();
    pad4(&mut bin, 0);
    let png_offset = bin.len();
    let image = png([0, 255, 0, 255]);
    bin.extend_from_slice(&image);
    pad4(&mut bin, 0);

    let json = json!({
        "asset": { "version": "2.0" },
        "extensions": {
            "VCAST_vci_meta": {
                "title": "sample",
                "version": "1.0",
                "author": "tester"
            },
            "VCAST_vci_embedded_script": {
                "scripts": [{
                    "name": "main",
                    "mimeType": "x-application-lua",
                    "targetEngine": "moonsharp",
                    "source": 0
                }]
            },
            "VCAST_vci_material_unity": {
                "materials": [
                    {
                        "name": "toon",
                        "shader": "VRM/MToon",
                        "renderQueue": 2000,
                        "floatProperties": { "_Cutoff": 0.5 },
                        "vectorProperties": {
                            "_Color": [1.0, 1.0, 1.0, 1.0],
                            "_MainTex": [0.0, 0.0, 2.0, 2.0]
                        },
                        "textureProperties": { "_MainTex": 0 },
                        "keywordMap": { "MTOON_OUTLINE_NONE": true },
                        "tagMap": { "RenderType": "Opaque" }
                    },
                    { "name": "custom", "shader": "Custom/Toon" }
                ]
            },
            "VCAST_vci_spring_bone": {
                "springBones": [{ "bones": [1, null] }]
            }
        },
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": SCRIPT.len() },
            { "buffer": 0, "byteOffset": png_offset, "byteLength": image.len() }
        ],
        "images": [{ "name": "albedo", "bufferView": 1, "mimeType": "image/png" }],
        "textures": [{ "source": 0 }],
        "materials": [
            { "name": "toon", "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } },
            { "name": "custom", "alphaMode": "BLEND" }
        ],
        "nodes": [
            { "name": "item", "children": [1], "extensions": { "VCAST_vci_item": {} } },
            { "name": "hair", "children": [2] },
            { "name": "tip" },
            { "name": "body" }
        ],
        "scenes": [{ "nodes": [0, 3] }],
        "scene": 0
    });
    (json, bin)
}

fn validation_error(e: &anyhow::Error) -> ValidationErrorKind {
    e.downcast_ref::<ValidationError>()
        .unwrap_or_else(|| panic!("expected a validation error, got {:#}", e))
        .kind
}

fn default_shaders() -> ShaderLibrary {
    ShaderLibrary::new(ImportConfig::default().available_shaders)
}

#[test]
fn should_stage_container_contents() {
    let (json, bin) = sample();
    let staged = stage(&glb(&json, &bin)).unwrap();
    let asset = staged.asset();

    // synthetic root + item + hair + tip + body
    assert_eq!(asset.graph.len(), 5);
    assert_eq!(staged.material_slots(), 2);

    let root = asset.graph.node(asset.root).unwrap();
    assert_eq!(root.name, "sample");
    assert!(root.has_component(ComponentKind::RootMarker));

    let names: Vec<&str> = asset
        .graph
        .traverse(asset.root)
        .map(|(_, node)| node.name.as_str())
        .collect();
    assert_eq!(names, vec!["sample", "item", "hair", "tip", "body"]);

    let (item, _) = asset
        .graph
        .traverse(asset.root)
        .find(|(_, node)| node.name == "item")
        .unwrap();
    assert!(asset.graph.has_component(item, ComponentKind::SubItem));

    let (hair, _) = asset
        .graph
        .traverse(asset.root)
        .find(|(_, node)| node.name == "hair")
        .unwrap();
    let spring_bone = root.spring_bone().unwrap();
    assert_eq!(spring_bone.root_bones, vec![Some(hair), None]);

    assert_eq!(asset.scripts.len(), 1);
    assert_eq!(asset.scripts[0].name, "main");
    assert_eq!(asset.scripts[0].source, SCRIPT);
    assert_eq!(asset.meta.as_ref().unwrap().author, "tester");
    assert_eq!(asset.materials.len(), 2);
}

#[test]
fn should_import_valid_container() {
    let (json, bin) = sample();
    let staged = stage(&glb(&json, &bin)).unwrap();
    let imported = finish(staged, &ImportConfig::default(), &default_shaders()).unwrap();

    assert_eq!(imported.materials.len(), 2);

    let toon = &imported.materials[0];
    assert_eq!(toon.shader.name, "VRM/MToon");
    assert_eq!(toon.name, "toon");
    assert_eq!(toon.render_queue, 2000);
    assert!(toon.keywords.contains("MTOON_OUTLINE_NONE"));
    let main = &toon.textures["_MainTex"];
    assert_eq!(main.texture.as_ref().unwrap().name, "albedo");
    assert_eq!(main.scale, cgmath::Vector2::new(2.0, 2.0));
    assert_eq!(
        *main.texture.as_ref().unwrap().image.get_pixel(0, 0),
        image::Rgba([0, 255, 0, 255])
    );

    // unknown shader: default material built from the glTF material
    let custom = &imported.materials[1];
    assert_eq!(custom.shader.name, "Standard");
    assert_eq!(custom.name, "custom");
    assert_eq!(custom.render_queue, 3000);
    assert!(custom.keywords.contains("_ALPHABLEND_ON"));
}

#[test]
fn should_resolve_each_extension_shader_once() {
    let (json, bin) = sample();
    let staged = stage(&glb(&json, &bin)).unwrap();
    let shaders = RecordingShaders::new(&["VRM/MToon"]);
    finish(staged, &ImportConfig::default(), &shaders).unwrap();
    assert_eq!(
        *shaders.lookups.borrow(),
        vec!["VRM/MToon".to_string(), "Custom/Toon".to_string()]
    );
}

#[test]
fn should_reject_mesh_colliders() {
    let (mut json, bin) = sample();
    json["nodes"][3]["extensions"] = json!({
        "VCAST_vci_collider": { "colliders": [{ "type": "box" }, { "type": "mesh" }] }
    });
    let staged = stage(&glb(&json, &bin)).unwrap();
    let e = finish(staged, &ImportConfig::default(), &default_shaders()).unwrap_err();
    assert_eq!(validation_error(&e), ValidationErrorKind::InvalidComponent);
    let invalid = e.downcast_ref::<ValidationError>().unwrap();
    assert!(invalid.detail.as_deref().unwrap().contains("body"));
}

#[test]
fn should_accept_primitive_colliders() {
    let (mut json, bin) = sample();
    json["nodes"][3]["extensions"] = json!({
        "VCAST_vci_collider": { "colliders": [{ "type": "box" }, { "type": "sphere" }] }
    });
    let staged = stage(&glb(&json, &bin)).unwrap();
    assert!(finish(staged, &ImportConfig::default(), &default_shaders()).is_ok());
}

#[test]
fn should_reject_extra_spring_bones() {
    let (mut json, bin) = sample();
    json["extensions"]["VCAST_vci_spring_bone"]["springBones"] =
        json!([{ "bones": [1] }, { "bones": [3] }]);
    let staged = stage(&glb(&json, &bin)).unwrap();
    // the second definition lives on its own holder node
    assert_eq!(staged.asset().graph.len(), 6);
    let e = finish(staged, &ImportConfig::default(), &default_shaders()).unwrap_err();
    assert_eq!(validation_error(&e), ValidationErrorKind::TooManySpringBone);
}

#[test]
fn should_reject_spring_bones_over_sub_items() {
    let (mut json, bin) = sample();
    json["extensions"]["VCAST_vci_spring_bone"]["springBones"] = json!([{ "bones": [0] }]);
    let staged = stage(&glb(&json, &bin)).unwrap();
    let e = finish(staged, &ImportConfig::default(), &default_shaders()).unwrap_err();
    assert_eq!(validation_error(&e), ValidationErrorKind::RootBoneContainsSubItem);
}

#[test]
fn should_require_metadata() {
    let (mut json, bin) = sample();
    json["extensions"]
        .as_object_mut()
        .unwrap()
        .remove("VCAST_vci_meta");
    let staged = stage(&glb(&json, &bin)).unwrap();
    let asset = staged.asset();
    assert!(asset.meta.is_none());
    assert_eq!(asset.graph.node(asset.root).unwrap().name, "Root");

    let e = finish(staged, &ImportConfig::default(), &default_shaders()).unwrap_err();
    assert_eq!(validation_error(&e), ValidationErrorKind::InvalidMetaData);
}

#[test]
fn should_check_scripts_before_metadata() {
    let (mut json, bin) = sample();
    json["extensions"]
        .as_object_mut()
        .unwrap()
        .remove("VCAST_vci_meta");
    json["extensions"]["VCAST_vci_embedded_script"]["scripts"][0]["name"] = json!("init");
    let staged = stage(&glb(&json, &bin)).unwrap();
    let e = finish(staged, &ImportConfig::default(), &default_shaders()).unwrap_err();
    assert_eq!(validation_error(&e), ValidationErrorKind::FirstScriptNameNotValid);
}

#[test]
fn should_import_plain_json_containers() {
    let json = json!({
        "asset": { "version": "2.0" },
        "extensions": {
            "VCAST_vci_meta": { "title": "plain" }
        },
        "nodes": [{ "name": "cube" }],
        "scenes": [{ "nodes": [0] }]
    });
    let bytes = serde_json::to_vec(&json).unwrap();
    let staged = stage(&bytes).unwrap();
    assert_eq!(staged.asset().graph.len(), 2);
    assert_eq!(staged.material_slots(), 1);

    let imported = finish(staged, &ImportConfig::default(), &default_shaders()).unwrap();
    assert!(imported.asset.scripts.is_empty());
    assert_eq!(imported.materials.len(), 1);
    assert_eq!(imported.materials[0].shader.name, "Standard");
    assert_eq!(imported.materials[0].name, "Default");
}

#[test]
fn should_reject_garbage() {
    let e = stage(b"definitely not gltf").err().unwrap();
    assert!(e.downcast_ref::<ValidationError>().is_none());
}

#[test]
fn should_import_files_with_config() {
    let dir = tempfile::tempdir().unwrap();

    let (json, bin) = sample();
    let asset_path = dir.path().join("sample.vci");
    std::fs::write(&asset_path, glb(&json, &bin)).unwrap();

    let config_path = dir.path().join("config.json");
    let mut config_file = std::fs::File::create(&config_path).unwrap();
    write!(config_file, r#"{{ "availableShaders": ["Standard"] }}"#).unwrap();
    drop(config_file);

    let config = ImportConfig::from_path(&config_path).unwrap();
    assert!(config.known_shaders.contains("VRM/MToon"));

    let imported = import::import_file(&asset_path, &config).unwrap();
    // MToon is not available, so both slots use default materials
    assert!(imported.materials.iter().all(|m| m.shader.name == "Standard"));
    assert_eq!(imported.materials[0].name, "toon");
    assert_eq!(
        imported.materials[0].texture("_MainTex").unwrap().name,
        "albedo"
    );

    let missing = import::import_file(dir.path().join("missing.vci"), &config);
    assert!(missing.is_err());
}

#[test]
fn should_reject_over_limit_root_bones_from_config() {
    let (json, bin) = sample();
    let config = ImportConfig::from_json(r#"{ "springBone": { "maxChildBones": 1 } }"#).unwrap();
    let staged = stage(&glb(&json, &bin)).unwrap();
    let e = finish(staged, &config, &default_shaders()).unwrap_err();
    assert_eq!(validation_error(&e), ValidationErrorKind::TooManyRootBoneChild);
}

#[test]
fn should_ignore_buffer_views_past_the_address_space() {
    let (mut json, bin) = sample();
    json["bufferViews"][0]["byteOffset"] = json!(u64::MAX - 1);
    json["bufferViews"][1]["byteOffset"] = json!(u64::MAX - 1);
    let staged = stage(&glb(&json, &bin)).unwrap();
    assert_eq!(staged.asset().scripts[0].name, "main");
    assert!(staged.asset().scripts[0].source.is_empty());

    let imported = finish(staged, &ImportConfig::default(), &default_shaders()).unwrap();
    // the image could not be read, so the texture slot stays empty
    assert!(imported.materials[0].textures["_MainTex"].texture.is_none());
}

#[test]
fn should_load_deep_hierarchies() {
    const DEPTH: usize = 200_000;
    let nodes: Vec<Value> = (0..DEPTH)
        .map(|i| match i + 1 {
            next if next < DEPTH => json!({ "name": format!("n{i}"), "children": [next] }),
            _ => json!({ "name": format!("n{i}") }),
        })
        .collect();
    let json = json!({
        "asset": { "version": "2.0" },
        "extensions": { "VCAST_vci_meta": { "title": "deep" } },
        "nodes": nodes,
        "scenes": [{ "nodes": [0] }]
    });
    let staged = stage(&serde_json::to_vec(&json).unwrap()).unwrap();
    let asset = staged.asset();
    assert_eq!(asset.graph.len(), DEPTH + 1);

    let (deepest, node) = asset.graph.traverse(asset.root).last().unwrap();
    assert_eq!(node.name, format!("n{}", DEPTH - 1));
    assert!(asset.graph.children(deepest).is_empty());

    assert!(finish(staged, &ImportConfig::default(), &default_shaders()).is_ok());
}

#[test]
fn should_keep_slots_of_malformed_material_entries() {
    let (mut json, bin) = sample();
    json["extensions"]["VCAST_vci_material_unity"]["materials"][1] = json!({
        "name": "custom",
        "shader": "VRM/MToon",
        "textureProperties": { "_MainTex": -1 }
    });
    let staged = stage(&glb(&json, &bin)).unwrap();
    let materials = &staged.asset().materials;
    assert_eq!(materials.len(), 2);
    assert_eq!(materials[0].shader, "VRM/MToon");
    assert!(materials[1].shader.is_empty());

    let imported = finish(staged, &ImportConfig::default(), &default_shaders()).unwrap();
    assert_eq!(imported.materials[0].shader.name, "VRM/MToon");
    assert_eq!(imported.materials[0].name, "toon");
    // the malformed slot gets the default material of its glTF material
    assert_eq!(imported.materials[1].shader.name, "Standard");
    assert_eq!(imported.materials[1].name, "custom");
}

#[test]
fn should_accept_reserved_collider_limits() {
    let (json, bin) = sample();
    let config = ImportConfig::from_json(
        r#"{ "springBone": { "maxSpringBoneColliders": 0, "maxSphereColliders": 0 } }"#,
    )
    .unwrap();
    assert_eq!(config.spring_bone.max_sphere_colliders, 0);
    let staged = stage(&glb(&json, &bin)).unwrap();
    assert!(finish(staged, &config, &default_shaders()).is_ok());
}

#[test]
fn should_build_one_material_per_staged_slot() {
    let (json, bin) = sample();
    let staged = stage(&glb(&json, &bin)).unwrap();
    let slots = staged.material_slots();
    let imported = finish(staged, &ImportConfig::default(), &default_shaders()).unwrap();
    assert_eq!(imported.materials.len(), slots);
}
