use super::*;

/// Tests that the first registered handler wins when several match.
///
/// Both handlers accept `!who`; only the one registered first runs.
///
/// Expected: first handler selected and run once, second never run
#[tokio::test]
async fn first_registered_match_wins() -> Result<(), AppError> {
    let first = Arc::new(TestCommand::new("first", "!who"));
    let second = Arc::new(TestCommand::new("second", "!w"));
    let (router, sink) = router_with(vec![first.clone(), second.clone()]);

    let selected = router.on_message(&testing::guild_message(1, "!who")).await;

    assert_eq!(selected.as_deref(), Some("first"));
    assert_eq!(first.handled(), 1);
    assert_eq!(second.handled(), 0);
    assert_eq!(sink.sent_texts().await, vec!["first"]);

    Ok(())
}

/// Tests that a later handler is reached when earlier ones don't match.
///
/// Expected: second handler selected
#[tokio::test]
async fn falls_through_to_later_handler() -> Result<(), AppError> {
    let first = Arc::new(TestCommand::new("first", "!who"));
    let second = Arc::new(TestCommand::new("second", "!movies"));
    let (router, _sink) = router_with(vec![first.clone(), second.clone()]);

    let selected = router.on_message(&testing::guild_message(1, "!movies")).await;

    assert_eq!(selected.as_deref(), Some("second"));
    assert_eq!(first.handled(), 0);

    Ok(())
}

/// Tests that messages from bots are never routed.
///
/// Expected: None, handler not run
#[tokio::test]
async fn ignores_bot_authors() -> Result<(), AppError> {
    let command = Arc::new(TestCommand::new("who", "!who"));
    let (router, sink) = router_with(vec![command.clone()]);

    let mut message = testing::guild_message(1, "!who");
    message.author.bot = true;

    assert!(router.on_message(&message).await.is_none());
    assert_eq!(command.handled(), 0);
    assert!(sink.sent().await.is_empty());

    Ok(())
}

/// Tests role gating on a handler that requires a role.
///
/// Expected: member without the role is rejected, member with it is handled
#[tokio::test]
async fn requires_one_of_the_configured_roles() -> Result<(), AppError> {
    let command = Arc::new(
        TestCommand::new("admin", "!admin")
            .with_options(HandlerOptions::new().require_roles([testing::role(7)])),
    );
    let (router, _sink) = router_with(vec![command.clone()]);

    let mut message = testing::guild_message(1, "!admin");
    message.member_roles = vec![testing::role(3)];
    assert!(router.on_message(&message).await.is_none());

    message.member_roles = vec![testing::role(3), testing::role(7)];
    assert_eq!(router.on_message(&message).await.as_deref(), Some("admin"));
    assert_eq!(command.handled(), 1);

    Ok(())
}

/// Tests channel restriction and DM permission.
///
/// Expected: channels outside the set and DMs without `allow_pm` are rejected,
/// while a handler with no channel set also takes DMs
#[tokio::test]
async fn gates_on_channel_and_direct_messages() -> Result<(), AppError> {
    let restricted = Arc::new(
        TestCommand::new("who", "!who")
            .with_options(HandlerOptions::new().in_channels([ChannelId::new(10)])),
    );
    let (router, _sink) = router_with(vec![restricted.clone()]);

    assert!(router.on_message(&testing::guild_message(11, "!who")).await.is_none());
    assert!(router.on_message(&testing::direct_message(12, "!who")).await.is_none());
    assert!(router.on_message(&testing::guild_message(10, "!who")).await.is_some());

    let unrestricted = Arc::new(TestCommand::new("ping", "!ping"));
    let (router, _sink) = router_with(vec![unrestricted.clone()]);

    assert!(router.on_message(&testing::direct_message(12, "!ping")).await.is_some());

    let dm_command = Arc::new(
        TestCommand::new("chat", "hey").with_options(HandlerOptions::new().allow_pm()),
    );
    let (router, _sink) = router_with(vec![dm_command.clone()]);

    assert!(router.on_message(&testing::direct_message(55, "hey")).await.is_some());

    Ok(())
}

/// Tests that the response goes to the override channel when one is given.
///
/// Expected: response sent to channel 99 instead of the message's channel
#[tokio::test]
async fn responds_in_override_channel() -> Result<(), AppError> {
    let command = Arc::new(TestCommand::new("who", "!who"));
    let (router, sink) = router_with(vec![command]);

    router
        .route_message(&testing::guild_message(1, "!who"), Some(ChannelId::new(99)))
        .await;

    let sent = sink.sent().await;
    assert_eq!(sent[0].0.channel_id, ChannelId::new(99));

    Ok(())
}

/// Tests that handler errors and panics are contained.
///
/// Expected: failing and panicking handlers are still reported as selected and
/// the router keeps routing afterwards
#[tokio::test]
async fn handler_faults_are_contained() -> Result<(), AppError> {
    let failing = Arc::new(TestCommand::new("failing", "!fail").behavior(Behavior::Fail));
    let panicking = Arc::new(TestCommand::new("panicking", "!panic").behavior(Behavior::Panic));
    let healthy = Arc::new(TestCommand::new("healthy", "!ok"));
    let (router, sink) = router_with(vec![failing, panicking, healthy.clone()]);

    assert!(router.on_message(&testing::guild_message(1, "!fail")).await.is_some());
    assert!(router.on_message(&testing::guild_message(1, "!panic")).await.is_some());
    assert!(router.on_message(&testing::guild_message(1, "!ok")).await.is_some());

    assert_eq!(healthy.handled(), 1);
    assert_eq!(sink.sent_texts().await, vec!["healthy"]);

    Ok(())
}

/// Tests that responses of handlers with a response TTL are deleted later.
///
/// Expected: not deleted before the TTL, deleted after it
#[tokio::test(start_paused = true)]
async fn deletes_response_after_ttl() -> Result<(), AppError> {
    let command = Arc::new(
        TestCommand::new("temp", "!temp")
            .with_options(HandlerOptions::new().response_ttl(Duration::from_secs(30))),
    );
    let (router, sink) = router_with(vec![command]);

    router.on_message(&testing::guild_message(1, "!temp")).await;
    let response = sink.sent().await[0].0;

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert!(sink.deleted().await.is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(sink.deleted().await, vec![response]);

    Ok(())
}
