//! End-to-end dispatch and persistence scenarios through [`HookManager`].

use std::sync::Arc;

use serde_json::{Value, json};

use hookhub_core::config::registry::RegistryConfig;
use hookhub_registry::interceptor::InterceptStage;
use hookhub_registry::{ClosureCallback, DEFAULT_PRIORITY, HookCallback, HookManager};

fn config_in(dir: &tempfile::TempDir) -> RegistryConfig {
    RegistryConfig {
        store_path: dir.path().join("hooks.json").to_string_lossy().into_owned(),
        intercept_store_path: dir
            .path()
            .join("intercepts.json")
            .to_string_lossy()
            .into_owned(),
    }
}

fn upper(args: &[Value]) -> hookhub_core::AppResult<Value> {
    let text = args.first().and_then(Value::as_str).unwrap_or("");
    Ok(json!([text.to_uppercase()]))
}

async fn register_math_callbacks(manager: &HookManager) {
    manager
        .register_callback(
            "double",
            Arc::new(ClosureCallback::from_fn(|args| {
                let n = args.first().and_then(Value::as_i64).unwrap_or(0);
                Ok(json!(n * 2))
            })),
        )
        .await
        .unwrap();
    manager
        .register_callback(
            "plus_one",
            Arc::new(ClosureCallback::from_fn(|args| {
                let n = args.first().and_then(Value::as_i64).unwrap_or(0);
                Ok(json!(n + 1))
            })),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn transform_applies_filters_in_priority_order() {
    let dir = tempfile::tempdir().unwrap();
    let manager = HookManager::open(&config_in(&dir)).await.unwrap();
    register_math_callbacks(&manager).await;

    manager.register("h", "double", 5).await.unwrap();
    manager.register("h", "plus_one", DEFAULT_PRIORITY).await.unwrap();

    // double first: 6, then plus_one: 7
    let out = manager.transform("h", json!(3), &[]).await.unwrap();
    assert_eq!(out, json!(7));
}

#[tokio::test]
async fn transform_order_follows_priority_not_registration() {
    let dir = tempfile::tempdir().unwrap();
    let manager = HookManager::open(&config_in(&dir)).await.unwrap();
    register_math_callbacks(&manager).await;

    // Registered in the opposite order; priority still wins.
    manager.register("h", "plus_one", DEFAULT_PRIORITY).await.unwrap();
    manager.register("h", "double", 5).await.unwrap();

    let out = manager.transform("h", json!(3), &[]).await.unwrap();
    assert_eq!(out, json!(7));
}

#[tokio::test]
async fn wrap_rewrites_arguments_and_result() {
    let dir = tempfile::tempdir().unwrap();
    let manager = HookManager::open(&config_in(&dir)).await.unwrap();

    manager
        .register_callback("upper", Arc::new(ClosureCallback::from_fn(upper)))
        .await
        .unwrap();
    manager
        .register_callback(
            "mark_done",
            Arc::new(ClosureCallback::from_fn(|args| {
                let text = args.first().and_then(Value::as_str).unwrap_or("");
                Ok(json!(format!("{text} [DONE]")))
            })),
        )
        .await
        .unwrap();

    manager
        .register_intercept("h", InterceptStage::Before, "upper", 5)
        .await
        .unwrap();
    manager
        .register_intercept("h", InterceptStage::After, "mark_done", DEFAULT_PRIORITY)
        .await
        .unwrap();

    let target = ClosureCallback::from_fn(|args| {
        let arg = args.first().and_then(Value::as_str).unwrap_or("");
        Ok(json!(format!("Result: {arg}")))
    });

    let out = manager.wrap("h", &target, vec![json!("abc")]).await.unwrap();
    assert_eq!(out, json!("Result: ABC [DONE]"));
}

#[tokio::test]
async fn wrap_without_bindings_is_a_plain_call() {
    let dir = tempfile::tempdir().unwrap();
    let manager = HookManager::open(&config_in(&dir)).await.unwrap();

    let target = ClosureCallback::from_fn(|args| {
        let arg = args.first().and_then(Value::as_str).unwrap_or("");
        Ok(json!(format!("Result: {arg}")))
    });

    let wrapped = manager.wrap("h", &target, vec![json!("abc")]).await.unwrap();
    let direct = target.invoke(&[json!("abc")]).await.unwrap();
    assert_eq!(wrapped, direct);
}

#[tokio::test]
async fn before_callback_without_list_return_leaves_args_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let manager = HookManager::open(&config_in(&dir)).await.unwrap();

    // Returns a bare string, not an argument list.
    manager
        .register_callback(
            "observer",
            Arc::new(ClosureCallback::from_fn(|_| Ok(json!("noted")))),
        )
        .await
        .unwrap();
    manager
        .register_intercept("h", InterceptStage::Before, "observer", 5)
        .await
        .unwrap();

    let target = ClosureCallback::from_fn(|args| Ok(args.first().cloned().unwrap_or(Value::Null)));

    let out = manager.wrap("h", &target, vec![json!("abc")]).await.unwrap();
    assert_eq!(out, json!("abc"));
}

#[tokio::test]
async fn stale_bindings_are_skipped_and_auditable() {
    let dir = tempfile::tempdir().unwrap();
    let manager = HookManager::open(&config_in(&dir)).await.unwrap();
    register_math_callbacks(&manager).await;

    manager.register("h", "renamed_plugin", 1).await.unwrap();
    manager.register("h", "plus_one", DEFAULT_PRIORITY).await.unwrap();
    manager
        .register_intercept("r", InterceptStage::After, "gone", DEFAULT_PRIORITY)
        .await
        .unwrap();

    // Dispatch skips the stale names without failing the chain.
    let out = manager.transform("h", json!(1), &[]).await.unwrap();
    assert_eq!(out, json!(2));

    let stale = manager.unresolved_bindings().await;
    let mut names: Vec<String> = stale.into_iter().map(|(_, b)| b.function).collect();
    names.sort();
    assert_eq!(names, vec!["gone", "renamed_plugin"]);
}

#[tokio::test]
async fn tables_survive_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    {
        let manager = HookManager::open(&config).await.unwrap();
        manager.register("h", "double", 5).await.unwrap();
        manager.register("h", "plus_one", DEFAULT_PRIORITY).await.unwrap();
        manager
            .register_intercept("r", InterceptStage::Before, "upper", 5)
            .await
            .unwrap();
    }

    // Same stores, fresh process: bindings and their order are intact,
    // and dispatch works once the callbacks are registered again.
    let manager = HookManager::open(&config).await.unwrap();
    register_math_callbacks(&manager).await;

    let names: Vec<String> = manager
        .hook_registry()
        .chain("h")
        .await
        .into_iter()
        .map(|b| b.function)
        .collect();
    assert_eq!(names, vec!["double", "plus_one"]);

    let chains = manager.intercept_registry().chains("r").await;
    assert_eq!(chains.before.len(), 1);
    assert_eq!(chains.before[0].function, "upper");

    let out = manager.transform("h", json!(3), &[]).await.unwrap();
    assert_eq!(out, json!(7));
}

#[tokio::test]
async fn notify_feeds_all_arguments_to_actions() {
    let dir = tempfile::tempdir().unwrap();
    let manager = HookManager::open(&config_in(&dir)).await.unwrap();

    let (tx, rx) = std::sync::mpsc::channel::<Vec<Value>>();
    manager
        .register_callback(
            "capture",
            Arc::new(ClosureCallback::from_fn(move |args| {
                tx.send(args.to_vec()).expect("receiver alive");
                Ok(json!(null))
            })),
        )
        .await
        .unwrap();
    manager.register("h", "capture", DEFAULT_PRIORITY).await.unwrap();

    manager
        .notify("h", &[json!("record"), json!(42)])
        .await
        .unwrap();

    assert_eq!(rx.recv().unwrap(), vec![json!("record"), json!(42)]);
}
