use super::*;

fn reaction_router(handler: Arc<TestReaction>) -> (EventRouter, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let mut registry = HandlerRegistry::new();
    registry.register_reaction_handler(handler);
    (EventRouter::new(registry, sink.clone()), sink)
}

/// Tests that reactions match on unicode emoji and on custom emoji ids.
///
/// Expected: 👍 and custom id 123456 are handled, 👎 is not
#[tokio::test]
async fn matches_configured_emoji() -> Result<(), AppError> {
    let handler = Arc::new(TestReaction::new(HandlerOptions::new()));
    let (router, sink) = reaction_router(handler.clone());

    assert!(router.on_reaction(&testing::reaction(1, "👍")).await.is_some());
    assert!(router.on_reaction(&testing::reaction(1, "123456")).await.is_some());
    assert!(router.on_reaction(&testing::reaction(1, "👎")).await.is_none());

    assert_eq!(handler.handled.load(Ordering::SeqCst), 2);
    assert_eq!(sink.sent_texts().await, vec!["👍", "123456"]);

    Ok(())
}

/// Tests that reactions by bots and by members without the role are ignored.
///
/// Expected: neither reaction is handled
#[tokio::test]
async fn ignores_bots_and_unprivileged_members() -> Result<(), AppError> {
    let handler = Arc::new(TestReaction::new(
        HandlerOptions::new().require_roles([testing::role(5)]),
    ));
    let (router, _sink) = reaction_router(handler.clone());

    let mut by_bot = testing::reaction(1, "👍");
    by_bot.user.bot = true;
    by_bot.member_roles = vec![testing::role(5)];
    assert!(router.on_reaction(&by_bot).await.is_none());

    let unprivileged = testing::reaction(1, "👍");
    assert!(router.on_reaction(&unprivileged).await.is_none());

    assert_eq!(handler.handled.load(Ordering::SeqCst), 0);

    Ok(())
}

/// Tests the emoji prefilter used before fetching reaction details.
///
/// Expected: only the handler's emoji are reported as handled
#[tokio::test]
async fn reports_handled_emoji() -> Result<(), AppError> {
    let handler = Arc::new(TestReaction::new(HandlerOptions::new()));
    let (router, _sink) = reaction_router(handler);

    assert!(router.handles_emoji("👍"));
    assert!(router.handles_emoji("123456"));
    assert!(!router.handles_emoji("👎"));

    Ok(())
}

/// Tests whether role lookups are needed for the registered handlers.
///
/// Expected: false without role requirements, true once a handler requires one
#[tokio::test]
async fn requires_roles_only_with_role_gated_handler() -> Result<(), AppError> {
    let open = Arc::new(TestReaction::new(HandlerOptions::new()));
    let (router, _sink) = reaction_router(open);
    assert!(!router.requires_roles());

    let gated = Arc::new(TestReaction::new(
        HandlerOptions::new().require_roles([testing::role(5)]),
    ));
    let (router, _sink) = reaction_router(gated);
    assert!(router.requires_roles());

    Ok(())
}
