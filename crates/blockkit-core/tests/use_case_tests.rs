/*
 * use_case_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests for block use cases through the controller.
 */

use blockkit_core::{
    BlockChanges, BlockController, BlockError, BlockId, BlockTypeRegistry, ErrorKind,
    InMemoryBlockRepository, NewBlock, Position, PropMap, RenderedBlock, UpdateOutcome,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

fn load_registry() -> BlockTypeRegistry {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test-fixtures")
        .join("blocks.yaml");
    BlockTypeRegistry::load(&path).expect("Failed to load registry fixture")
}

fn controller() -> BlockController {
    BlockController::new(Arc::new(InMemoryBlockRepository::new())).with_registry(load_registry())
}

fn props(value: serde_json::Value) -> PropMap {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_block_lifecycle() {
    let controller = controller();

    let block = controller
        .create(NewBlock::new("text").with_prop("content", "hi"))
        .await
        .unwrap();
    assert_eq!(block.metadata.version, 1);
    assert!(!block.locked);
    assert!(block.visible);

    let updated = controller
        .update(&block.id, BlockChanges::new().props(props(json!({"content": "bye"}))))
        .await
        .unwrap()
        .into_block()
        .unwrap();
    assert_eq!(updated.metadata.version, 2);
    assert_eq!(updated.props["content"], json!("bye"));

    controller.set_locked(&block.id, true).await.unwrap();
    let err = controller.delete(&block.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permission);
    assert!(matches!(err, BlockError::Permission { .. }));

    controller.set_locked(&block.id, false).await.unwrap();
    assert!(controller.delete(&block.id).await.unwrap());
    assert!(!controller.repository().exists(&block.id).await.unwrap());
}

#[tokio::test]
async fn test_idempotent_on_missing_ids() {
    let controller = controller();
    let ghost = BlockId::from("does-not-exist");

    assert!(!controller.delete(&ghost).await.unwrap());
    assert!(!controller.delete(&ghost).await.unwrap());
    assert_eq!(controller.duplicate(&ghost).await.unwrap(), None);
    assert_eq!(
        controller
            .update(&ghost, BlockChanges::new().visible(false))
            .await
            .unwrap(),
        UpdateOutcome::NotFound
    );
}

#[tokio::test]
async fn test_update_rejects_nested_values() {
    let controller = controller();
    let block = controller
        .create(NewBlock::new("text").with_prop("content", "hi"))
        .await
        .unwrap();

    for bad in [json!({"content": ["a"]}), json!({"content": {"a": 1}})] {
        let err = controller
            .update(&block.id, BlockChanges::new().props(props(bad)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("props.content"));
    }

    let err = controller
        .update(
            &block.id,
            BlockChanges::new().style(props(json!({"visible": true}))),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("style.visible"));

    let stored = controller.get(&block.id).await.unwrap().unwrap();
    assert_eq!(stored.metadata.version, 1);
}

#[tokio::test]
async fn test_registry_backed_rendering() {
    let controller = controller();

    let chart = controller
        .add_block("chart", props(json!({"title": "Revenue"})))
        .await
        .unwrap();
    match controller.render_block(&chart.id).await.unwrap() {
        RenderedBlock::Component {
            framework,
            name,
            props,
        } => {
            assert_eq!((framework.as_str(), name.as_str()), ("react", "Chart"));
            assert_eq!(
                serde_json::Value::Object(props),
                json!({"height": 300, "title": "Revenue", "color": "#336699"})
            );
        }
        other => panic!("unexpected output: {other:?}"),
    }

    let err = controller
        .add_block("chart", props(json!({"color": "blue"})))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Text requires content; its default is empty.
    let err = controller.add_block("text", PropMap::new()).await.unwrap_err();
    assert!(err.to_string().contains("props.content"));
}

#[tokio::test]
async fn test_template_failures_stay_local() {
    let controller = controller();
    let block = controller
        .add_block("list", props(json!({"heading": "Todo"})))
        .await
        .unwrap();

    // `items` is not a prop, so the list renders empty without failing.
    let rendered = controller.render_block(&block.id).await.unwrap();
    assert_eq!(
        rendered.markup(),
        Some("<section><h3>Todo</h3><ol></ol></section>")
    );
    assert!(rendered.diagnostics().is_empty());
}

#[tokio::test]
async fn test_layout_operations() {
    let controller = controller();
    let page = controller.create(NewBlock::new("page")).await.unwrap();
    let mut ids = Vec::new();
    for n in 0..3 {
        let block = controller
            .create(
                NewBlock::new("text")
                    .with_parent(page.id.clone())
                    .with_prop("content", n),
            )
            .await
            .unwrap();
        ids.push(block.id);
    }

    let order = controller
        .reorder(Some(&page.id), &[ids[2].clone()])
        .await
        .unwrap();
    let contents: Vec<i64> = order
        .iter()
        .map(|b| b.props["content"].as_i64().unwrap())
        .collect();
    assert_eq!(contents, vec![2, 0, 1]);

    let moved = controller
        .move_to(&ids[0], Position::new(10.0, 20.0))
        .await
        .unwrap();
    assert_eq!(moved.style.unwrap()["x"], json!(10.0));

    controller.toggle_locked(&ids[1]).await.unwrap();
    let err = controller
        .move_to(&ids[1], Position::new(0.0, 0.0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permission);

    // Locked child blocks deleting the page.
    let err = controller.delete(&page.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permission);
    assert_eq!(controller.repository().count().await.unwrap(), 4);
}
