//! Behavioural properties of the VFS, the tool adapter and the pipeline,
//! exercised through the public API only.

use serde_json::json;
use uigen_kernel::file_tools;
use uigen_kernel::{Pipeline, PipelineConfig, PipelineError, VfsSnapshot, VirtualFs, shared_vfs};
use uigen_types::{ErrorKind, SerializedNode, SerializedTree};

// ============================================================================
// VFS
// ============================================================================

#[test]
fn create_then_read_returns_content() {
    let mut vfs = VirtualFs::new();
    let contents = ["", "x", "line1\nline2\n", "unicode: 日本語 🎨", "  spaced  "];
    for (i, content) in contents.iter().enumerate() {
        let path = format!("/dir{i}/nested/file{i}.jsx");
        vfs.create_file(&path, *content).unwrap();
        assert_eq!(vfs.read_file(&path).unwrap(), *content);
    }
}

#[test]
fn serialize_round_trip_is_identical() {
    let mut vfs = VirtualFs::new();
    vfs.create_file("/App.jsx", "app").unwrap();
    vfs.create_directory("/empty").unwrap();
    vfs.create_file("/components/ui/Button.tsx", "button").unwrap();
    vfs.create_file("/components/Card.tsx", "card").unwrap();

    let saved = vfs.serialize();
    let restored = VirtualFs::from_serialized(&saved).unwrap();
    assert_eq!(restored.serialize(), saved);
    assert_eq!(restored.files(), vfs.files());
    assert!(restored.list_children("/empty").unwrap().is_empty());
}

#[test]
fn malformed_snapshot_leaves_tree_untouched() {
    let mut vfs = VirtualFs::new();
    vfs.create_file("/keep.js", "keep").unwrap();
    let revision = vfs.revision();

    let mut bad = SerializedTree::new();
    bad.insert("/a".into(), SerializedNode::file("file"));
    bad.insert("/a/b.js".into(), SerializedNode::file("under a file"));
    let err = vfs.deserialize(&bad).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DeserializeError);
    assert_eq!(vfs.read_file("/keep.js").unwrap(), "keep");
    assert_eq!(vfs.revision(), revision);
    assert!(vfs.load_json("{not json").is_err());
    assert_eq!(vfs.file_count(), 1);
}

#[test]
fn rename_moves_whole_subtree() {
    let mut vfs = VirtualFs::new();
    vfs.create_file("/a/c.js", "c").unwrap();
    vfs.create_file("/a/deep/d.js", "d").unwrap();
    vfs.rename_node("/a", "/b").unwrap();

    assert_eq!(vfs.read_file("/b/c.js").unwrap(), "c");
    assert_eq!(vfs.read_file("/b/deep/d.js").unwrap(), "d");
    assert!(!vfs.exists("/a"));
    assert!(!vfs.exists("/a/c.js"));
    assert_eq!(vfs.node("/b/deep").unwrap().path(), "/b/deep");
}

#[test]
fn delete_removes_descendants_and_missing_is_not_found() {
    let mut vfs = VirtualFs::new();
    vfs.create_file("/lib/a.js", "").unwrap();
    vfs.create_file("/lib/sub/b.js", "").unwrap();
    vfs.create_file("/other.js", "").unwrap();
    vfs.delete_node("/lib").unwrap();
    assert_eq!(vfs.file_count(), 1);

    let before = vfs.serialize();
    let revision = vfs.revision();
    let err = vfs.delete_node("/lib").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(vfs.serialize(), before);
    assert_eq!(vfs.revision(), revision);
}

// ============================================================================
// Tool adapter
// ============================================================================

#[tokio::test]
async fn ambiguous_str_replace_leaves_file_unchanged() {
    let vfs = shared_vfs();
    vfs.write().create_file("/App.jsx", "let a = 1;\nlet a = 1;\n").unwrap();
    let tools = file_tools::registry(&vfs);

    let out = tools
        .dispatch(
            "str_replace_editor",
            json!({"command": "str_replace", "path": "/App.jsx", "old_str": "let a = 1;", "new_str": "let b = 2;"}),
        )
        .await;
    assert_eq!(out.error_kind(), Some(ErrorKind::AmbiguousMatch));
    assert_eq!(vfs.read().read_file("/App.jsx").unwrap(), "let a = 1;\nlet a = 1;\n");

    let out = tools
        .dispatch(
            "str_replace_editor",
            json!({"command": "str_replace", "path": "/App.jsx", "old_str": "nope", "new_str": ""}),
        )
        .await;
    assert_eq!(out.error_kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn outcomes_use_wire_shape() {
    let tools = file_tools::registry(&shared_vfs());
    let out = tools.dispatch("bogus_tool", json!({})).await;
    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value["ok"], json!(false));
    assert_eq!(value["errorKind"], json!("UnknownTool"));

    let out = tools
        .dispatch("file_manager", json!({"command": "delete", "path": "/nothing"}))
        .await;
    assert_eq!(serde_json::to_value(&out).unwrap()["errorKind"], json!("NotFound"));
}

// ============================================================================
// Pipeline
// ============================================================================

fn pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig::default())
}

#[test]
fn extension_inference_binds_tsx() {
    let snap = VfsSnapshot::from_files([
        ("/App.jsx", "import Button from './Button';\nexport default () => <Button />;"),
        ("/Button.tsx", "export default function Button() { return <button />; }"),
    ]);
    let set = pipeline().run(&snap, Some("/App.jsx")).unwrap();
    let app = set.get("/App.jsx").unwrap();
    assert_eq!(app.imports.get("./Button").map(String::as_str), Some("/Button.tsx"));
    assert!(set.get("/Button.tsx").is_some());
}

#[test]
fn missing_import_names_specifier_and_importer() {
    let snap = VfsSnapshot::from_files([("/App.jsx", "import M from './Missing';\nexport default M;")]);
    let failure = pipeline().run(&snap, Some("/App.jsx")).unwrap_err();
    assert_eq!(
        failure.errors,
        vec![PipelineError::UnresolvedImport {
            specifier: "./Missing".into(),
            importer: "/App.jsx".into(),
        }]
    );
}

#[test]
fn unchanged_snapshot_builds_identically() {
    let snap = VfsSnapshot::from_files([
        ("/App.tsx", "import { Card } from '@/components/Card';\nimport './app.css';\nexport default function App() { return <Card title=\"x\" />; }"),
        ("/components/Card.tsx", "type P = { title: string };\nexport function Card({ title }: P) { return <div className=\"p-4\">{title}</div>; }"),
        ("/app.css", "body { margin: 0; }"),
    ]);
    let p = pipeline();
    let first = p.run(&snap, None).unwrap();
    let second = p.run(&snap, None).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.manifest(), second.manifest());

    // A fresh pipeline (cold cache) agrees too.
    assert_eq!(pipeline().run(&snap, None).unwrap().manifest(), first.manifest());
}

#[test]
fn transform_error_does_not_hide_unresolved_import() {
    let snap = VfsSnapshot::from_files([
        ("/App.jsx", "import Broken from './Broken';\nimport Healthy from './Healthy';\nexport default () => <Healthy />;"),
        ("/Broken.jsx", "export default () => <div>;"),
        ("/Healthy.jsx", "import Gone from './Gone';\nexport default () => <Gone />;"),
    ]);
    let failure = pipeline().run(&snap, None).unwrap_err();
    let kinds: Vec<ErrorKind> = failure.errors.iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![ErrorKind::TransformError, ErrorKind::UnresolvedImport]);
    assert_eq!(failure.errors[0].path(), Some("/Broken.jsx"));
    assert_eq!(failure.errors[1].path(), Some("/Healthy.jsx"));
}

#[test]
fn errors_behind_a_broken_module_still_surface() {
    let snap = VfsSnapshot::from_files([
        ("/App.jsx", "import Broken from './Broken';\nexport default () => <Broken />;"),
        ("/Broken.jsx", "import Healthy from './Healthy';\nexport default () => <div>{</div>;"),
        ("/Healthy.jsx", "import Missing from './Missing';\nexport default () => <Missing />;"),
    ]);
    let failure = pipeline().run(&snap, None).unwrap_err();
    assert_eq!(failure.errors.len(), 2, "{:?}", failure.errors);
    assert_eq!(failure.errors[0].kind(), ErrorKind::TransformError);
    assert_eq!(failure.errors[0].path(), Some("/Broken.jsx"));
    assert_eq!(
        failure.errors[1],
        PipelineError::UnresolvedImport {
            specifier: "./Missing".into(),
            importer: "/Healthy.jsx".into(),
        }
    );
}
