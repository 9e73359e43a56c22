use crewpay::error::AppError;
use crewpay::services::{WorkerEdit, WorkerLookup};
use pretty_assertions::assert_eq;

mod common;
use common::{TestContext, fake_worker_name, today};

#[tokio::test]
async fn test_register_worker_assigns_unique_four_digit_codes() {
    // Arrange
    let ctx = TestContext::new().await.unwrap();

    // Act
    let mut codes = Vec::new();
    for _ in 0..20 {
        let worker = ctx.register(&fake_worker_name(), 20_000.0, None).await;
        codes.push(worker.code);
    }

    // Assert
    assert!(codes.iter().all(|c| (1000..=9999).contains(c)));
    let mut unique = codes.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), codes.len());
}

#[tokio::test]
async fn test_register_worker_defaults() {
    let ctx = TestContext::new().await.unwrap();

    let worker = ctx.register("  Aliyev   Vali ", 18_500.0, Some("-")).await;

    assert_eq!(worker.name, "Aliyev Vali");
    assert_eq!(worker.site, None);
    assert_eq!(worker.site_label(), "General");
    assert!(worker.active);
    assert_eq!(worker.created_on, today());
    assert_eq!(worker.account_id, None);
}

#[tokio::test]
async fn test_register_worker_rejects_bad_input() {
    let ctx = TestContext::new().await.unwrap();
    let workforce = &ctx.services.workforce;

    assert!(matches!(
        workforce.register_worker("   ", 10_000.0, None).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        workforce.register_worker("Ali", 0.0, None).await,
        Err(AppError::Validation(_))
    ));
    assert!(workforce.list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_binds_account_once() {
    // Arrange
    let ctx = TestContext::new().await.unwrap();
    let worker = ctx.register("Ali", 20_000.0, None).await;
    let code = worker.code.to_string();
    let workforce = &ctx.services.workforce;

    // Act
    let linked = workforce.login(&code, 500).await.unwrap();
    let again = workforce.login(&code, 500).await.unwrap();
    let stolen = workforce.login(&code, 600).await;

    // Assert
    assert_eq!(linked.account_id, Some(500));
    assert_eq!(again.id, worker.id);
    match stolen {
        Err(AppError::Conflict(msg)) => assert!(msg.contains("already in use")),
        other => panic!("expected conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_rejects_unknown_and_archived_codes() {
    let ctx = TestContext::new().await.unwrap();
    let worker = ctx.register("Ali", 20_000.0, None).await;
    let workforce = &ctx.services.workforce;

    let unused_code = if worker.code == 9999 { 1000 } else { worker.code + 1 };
    match workforce.login(&unused_code.to_string(), 500).await {
        Err(AppError::Validation(msg)) => assert_eq!(msg, "The code is not valid"),
        other => panic!("expected validation error, got {:?}", other),
    }

    assert!(matches!(
        workforce.login("12ab", 500).await,
        Err(AppError::Validation(_))
    ));

    workforce.archive_worker(worker.id).await.unwrap();
    assert!(matches!(
        workforce.login(&worker.code.to_string(), 500).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_account_can_only_hold_one_worker() {
    let ctx = TestContext::new().await.unwrap();
    let first = ctx.linked_worker("Ali", 20_000.0, 500).await;
    let second = ctx.register("Vali", 20_000.0, None).await;

    let result = ctx
        .services
        .workforce
        .login(&second.code.to_string(), 500)
        .await;

    match result {
        Err(AppError::Conflict(msg)) => assert!(msg.contains(&first.name)),
        other => panic!("expected conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reset_login_frees_the_code() {
    let ctx = TestContext::new().await.unwrap();
    let worker = ctx.linked_worker("Ali", 20_000.0, 500).await;
    let workforce = &ctx.services.workforce;

    let reset = workforce.reset_login(worker.id).await.unwrap();
    assert_eq!(reset.account_id, None);
    assert!(workforce.worker_for_account(500).await.unwrap().is_none());

    let relinked = workforce.login(&worker.code.to_string(), 600).await.unwrap();
    assert_eq!(relinked.account_id, Some(600));

    // Nothing to reset on an unlinked worker
    let fresh = ctx.register("Vali", 20_000.0, None).await;
    assert!(matches!(
        workforce.reset_login(fresh.id).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_find_active_by_id_and_name() {
    let ctx = TestContext::new().await.unwrap();
    let ali = ctx.register("Ali Karimov", 20_000.0, None).await;
    ctx.register("Alisher Usmonov", 20_000.0, None).await;
    let bobur = ctx.register("Bobur Aliev", 20_000.0, None).await;
    let workforce = &ctx.services.workforce;

    assert_eq!(
        workforce.find_active(&ali.id.to_string()).await.unwrap(),
        WorkerLookup::Found(ali.clone())
    );
    assert_eq!(
        workforce.find_active("bobur").await.unwrap(),
        WorkerLookup::Found(bobur)
    );
    match workforce.find_active("ali").await.unwrap() {
        WorkerLookup::Ambiguous(matches) => assert_eq!(matches.len(), 3),
        other => panic!("expected several matches, got {:?}", other),
    }
    assert_eq!(
        workforce.find_active("Zafar").await.unwrap(),
        WorkerLookup::NotFound
    );

    workforce.archive_worker(ali.id).await.unwrap();
    assert_eq!(
        workforce.find_active(&ali.id.to_string()).await.unwrap(),
        WorkerLookup::NotFound
    );
}

#[tokio::test]
async fn test_find_active_matches_cyrillic_names_literally() {
    // Arrange
    let ctx = TestContext::new().await.unwrap();
    let alisher = ctx.register("Алишер", 20_000.0, None).await;
    let workforce = &ctx.services.workforce;

    // Act
    let by_lowercase = workforce.find_active("алишер").await.unwrap();
    let by_percent = workforce.find_active("%").await.unwrap();
    let by_underscore = workforce.find_active("_").await.unwrap();

    // Assert
    assert_eq!(by_lowercase, WorkerLookup::Found(alisher));
    assert_eq!(by_percent, WorkerLookup::NotFound);
    assert_eq!(by_underscore, WorkerLookup::NotFound);
}

#[tokio::test]
async fn test_edit_worker_fields() {
    let ctx = TestContext::new().await.unwrap();
    let worker = ctx.register("Ali", 20_000.0, None).await;
    let workforce = &ctx.services.workforce;

    let renamed = workforce
        .edit_worker(worker.id, WorkerEdit::Name("Ali Karimov".to_string()))
        .await
        .unwrap();
    let repriced = workforce
        .edit_worker(worker.id, WorkerEdit::Rate(25_000.0))
        .await
        .unwrap();
    let moved = workforce
        .edit_worker(worker.id, WorkerEdit::Site(Some("H Block".to_string())))
        .await
        .unwrap();

    assert_eq!(renamed.name, "Ali Karimov");
    assert_eq!(repriced.hourly_rate, 25_000.0);
    assert_eq!(moved.site.as_deref(), Some("H Block"));

    assert!(matches!(
        workforce.edit_worker(worker.id, WorkerEdit::Rate(-1.0)).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        workforce.edit_worker(9999, WorkerEdit::Rate(1.0)).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_archive_is_soft_and_once() {
    let ctx = TestContext::new().await.unwrap();
    let worker = ctx.register("Ali", 20_000.0, None).await;
    let workforce = &ctx.services.workforce;

    let archived = workforce.archive_worker(worker.id).await.unwrap();

    assert!(!archived.active);
    assert_eq!(archived.archived_on, Some(today()));
    assert!(workforce.list_active().await.unwrap().is_empty());
    assert_eq!(workforce.get_worker(worker.id).await.unwrap().id, worker.id);
    assert!(matches!(
        workforce.archive_worker(worker.id).await,
        Err(AppError::Conflict(_))
    ));
}
