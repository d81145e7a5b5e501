//! Idea lifecycle tests
//!
//! Drive the idea service through a fake chat platform and in-memory
//! repositories: posting, voting, deletion, and closing.
//!
//! Run with: cargo test -p integration-tests --test lifecycle_tests

use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};

use idea_core::{
    Color, DomainError, IdeaPost, IdeaRepository, NoticeKind, Permissions, PlatformEvent,
    PlatformMessage, PostField, ReactionAdded, ReactionCount, Snowflake, VoteType,
};
use idea_service::services::closing::{ORIGINAL_DEADLINE_FOOTER, VOTING_ENDED_FOOTER};
use idea_service::ServiceError;
use integration_tests::fixtures::*;
use integration_tests::{wait_until, TestApp};

const VOTER: Snowflake = Snowflake::new(4242);

fn field<'a>(post: &'a IdeaPost, name: &str) -> Option<&'a PostField> {
    post.fields.iter().find(|f| f.name == name)
}

// ============================================================================
// New ideas
// ============================================================================

#[tokio::test]
async fn test_new_idea_is_posted_and_seeded() {
    let app = TestApp::new();
    let channel = app.idea_channel(settings(VoteType::Thumbs)).await;
    let msg = message(channel, IDEA_WITH_GROUP);

    let idea = app
        .service
        .on_new_message(&msg)
        .await
        .unwrap()
        .expect("message becomes an idea");

    assert_eq!(idea.guild_id, GUILD_ID);
    assert_eq!(idea.channel_id, channel);
    assert_eq!(idea.global_section_emojis, ["🇦", "🇧"]);
    assert_eq!(idea.groups[0].title, "Color");
    assert_eq!(idea.groups[0].emojis, ["🇨", "🇩"]);
    assert_eq!(idea.vote_until, None);

    let post = app.platform.post(idea.message_id).expect("post was sent");
    assert_eq!(post.title, "Paint the shed");
    assert_eq!(
        post.description.as_deref(),
        Some("It is getting shabby.\n\n🇦 Do it this weekend\n🇧 Hire someone")
    );
    assert_eq!(post.fields, [PostField::new("Color", "🇨 Red\n🇩 Green")]);
    assert_eq!(post.footer, None);

    assert_eq!(
        app.platform.own_reactions(idea.message_id),
        ["👍", "👎", "🇦", "🇧", "🇨", "🇩"]
    );
    assert_eq!(app.platform.deleted_messages(), [msg.id]);
    assert_eq!(app.ideas.idea(idea.message_id).await.unwrap(), Some(idea));
}

#[tokio::test]
async fn test_timed_idea_shows_deadline() {
    let app = TestApp::new();
    let channel = app
        .idea_channel(timed_settings(VoteType::FiveEmojis, Duration::hours(2)))
        .await;
    let msg = message(channel, "Longer lunch breaks\nHalf an hour is not enough.");

    let idea = app.service.on_new_message(&msg).await.unwrap().unwrap();

    let deadline = msg.timestamp + Duration::hours(2);
    assert_eq!(idea.vote_until, Some(deadline));

    let post = app.platform.post(idea.message_id).unwrap();
    assert_eq!(post.footer.as_deref(), Some("Voting ends:"));
    assert_eq!(post.timestamp, Some(deadline));
    assert_eq!(app.platform.own_reactions(idea.message_id), VoteType::FiveEmojis.emojis());
}

#[tokio::test]
async fn test_messages_outside_idea_channels_are_ignored() {
    let app = TestApp::new();

    let plain = message(unique_id(), IDEA_WITH_GROUP);
    assert_eq!(app.service.on_new_message(&plain).await.unwrap(), None);

    let channel = app.idea_channel(settings(VoteType::Thumbs)).await;
    let mut from_bot = message(channel, IDEA_WITH_GROUP);
    from_bot.author.bot = true;
    assert_eq!(app.service.on_new_message(&from_bot).await.unwrap(), None);

    let mut direct = message(channel, IDEA_WITH_GROUP);
    direct.guild_id = None;
    assert_eq!(app.service.on_new_message(&direct).await.unwrap(), None);

    assert_eq!(app.platform.sent_posts(), 0);
    assert!(app.platform.notices().is_empty());
    assert!(app.ideas.is_empty());
}

#[tokio::test]
async fn test_malformed_idea_gets_self_deleting_notice() {
    let app = TestApp::with_manual_spawner();
    let channel = app.idea_channel(settings(VoteType::Thumbs)).await;
    let msg = message(channel, "only a title");

    app.service
        .dispatch(PlatformEvent::MessageCreated(msg.clone()))
        .await;

    let notices = app.platform.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].channel_id, channel);
    assert_eq!(notices[0].notice.kind, NoticeKind::Info);
    assert_eq!(notices[0].notice.mention, Some(msg.author.id));
    assert_eq!(app.platform.sent_posts(), 0);
    assert!(app.platform.deleted_messages().is_empty());

    assert_eq!(app.run_background().await, 1);

    let deleted = app.platform.deleted_messages();
    assert!(deleted.contains(&notices[0].id));
    assert!(deleted.contains(&msg.id));
    assert!(app.ideas.is_empty());
}

#[tokio::test]
async fn test_missing_permissions_are_reported() {
    let app = TestApp::with_manual_spawner();
    let channel = app.idea_channel(settings(VoteType::Thumbs)).await;
    app.platform
        .set_permissions(channel, Permissions::IDEA_CHANNEL - Permissions::ADD_REACTIONS);
    let msg = message(channel, IDEA_WITH_GROUP);

    let err = app.service.on_new_message(&msg).await.unwrap_err();
    assert!(matches!(err, ServiceError::MissingPermissions { .. }));

    app.service.dispatch(PlatformEvent::MessageCreated(msg)).await;

    let notices = app.platform.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].notice.kind, NoticeKind::Info);
    assert_eq!(
        notices[0].notice.text,
        "I need the following permissions in this channel: Add Reactions"
    );
    assert_eq!(app.platform.sent_posts(), 0);
}

#[tokio::test]
async fn test_no_send_permission_is_silent() {
    let app = TestApp::new();
    let channel = app.idea_channel(settings(VoteType::Thumbs)).await;
    app.platform.set_permissions(channel, Permissions::VIEW_CHANNEL);

    let msg = message(channel, IDEA_WITH_GROUP);
    app.service.dispatch(PlatformEvent::MessageCreated(msg)).await;

    assert_eq!(app.platform.sent_posts(), 0);
    assert!(app.platform.notices().is_empty());
    assert!(app.platform.deleted_messages().is_empty());
}

// ============================================================================
// Votes
// ============================================================================

#[tokio::test]
async fn test_group_and_scale_votes_are_exclusive() {
    let app = TestApp::new();
    let channel = app.idea_channel(settings(VoteType::Thumbs)).await;
    let idea = app
        .service
        .on_new_message(&message(channel, IDEA_WITH_GROUP))
        .await
        .unwrap()
        .unwrap();

    app.service
        .on_reaction_added(&reaction(&idea, VOTER, "🇨"))
        .await
        .unwrap();
    app.service
        .on_reaction_added(&reaction(&idea, VOTER, "👍"))
        .await
        .unwrap();
    // ungrouped sections do not exclude each other
    app.service
        .on_reaction_added(&reaction(&idea, VOTER, "🇦"))
        .await
        .unwrap();

    let removed: Vec<(Snowflake, String)> = app
        .platform
        .removed_reactions()
        .into_iter()
        .map(|r| (r.user_id, r.emoji))
        .collect();
    assert_eq!(
        removed,
        [(VOTER, "🇩".to_string()), (VOTER, "👎".to_string())]
    );
}

#[tokio::test]
async fn test_bot_and_foreign_reactions_are_ignored() {
    let app = TestApp::new();
    let channel = app.idea_channel(settings(VoteType::Thumbs)).await;
    let idea = app
        .service
        .on_new_message(&message(channel, IDEA_WITH_GROUP))
        .await
        .unwrap()
        .unwrap();

    let mut from_bot = reaction(&idea, VOTER, "👍");
    from_bot.user_is_bot = true;
    app.service.on_reaction_added(&from_bot).await.unwrap();

    let mut custom = reaction(&idea, VOTER, "👍");
    custom.emoji = None;
    app.service.on_reaction_added(&custom).await.unwrap();

    let mut elsewhere = reaction(&idea, VOTER, "👍");
    elsewhere.message_id = unique_id();
    app.service.on_reaction_added(&elsewhere).await.unwrap();

    assert!(app.platform.removed_reactions().is_empty());
}

#[tokio::test]
async fn test_missing_manage_messages_is_announced_once() {
    let app = TestApp::new();
    let channel = app.idea_channel(settings(VoteType::Thumbs)).await;
    let idea = app
        .service
        .on_new_message(&message(channel, IDEA_WITH_GROUP))
        .await
        .unwrap()
        .unwrap();

    let restricted = Permissions::IDEA_CHANNEL - Permissions::MANAGE_MESSAGES;
    app.platform.set_permissions(channel, restricted);

    for _ in 0..2 {
        app.service
            .on_reaction_added(&reaction(&idea, VOTER, "🇨"))
            .await
            .unwrap();
    }
    assert_eq!(app.platform.notices().len(), 1);
    assert!(app.platform.notices()[0].notice.text.contains("Manage Messages"));
    assert!(app.platform.removed_reactions().is_empty());

    app.platform.set_permissions(channel, Permissions::IDEA_CHANNEL);
    app.service
        .on_reaction_added(&reaction(&idea, VOTER, "🇨"))
        .await
        .unwrap();
    assert_eq!(app.platform.notices().len(), 1);
    assert_eq!(app.platform.removed_reactions().len(), 1);

    app.platform.set_permissions(channel, restricted);
    app.service
        .on_reaction_added(&reaction(&idea, VOTER, "🇨"))
        .await
        .unwrap();
    assert_eq!(app.platform.notices().len(), 2);
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test]
async fn test_deleted_message_forgets_idea() {
    let app = TestApp::new();
    let channel = app.idea_channel(settings(VoteType::Thumbs)).await;
    let idea = app
        .service
        .on_new_message(&message(channel, IDEA_WITH_GROUP))
        .await
        .unwrap()
        .unwrap();

    app.service
        .dispatch(PlatformEvent::MessageDeleted(deletion(&idea)))
        .await;
    assert_eq!(app.ideas.idea(idea.message_id).await.unwrap(), None);

    app.service
        .on_reaction_added(&reaction(&idea, VOTER, "👍"))
        .await
        .unwrap();
    assert!(app.platform.removed_reactions().is_empty());

    // deleting an unknown message is a no-op
    app.service.on_message_deleted(&deletion(&idea)).await.unwrap();
}

// ============================================================================
// Closing
// ============================================================================

#[tokio::test]
async fn test_idea_closes_at_deadline() {
    let app = TestApp::new();
    app.service.start(Utc::now()).await.unwrap();

    let channel = app
        .idea_channel(timed_settings(VoteType::Thumbs, Duration::seconds(1)))
        .await;
    let msg = message_at(
        channel,
        IDEA_WITH_GROUP,
        Utc::now() - Duration::milliseconds(800),
    );
    let idea = app.service.on_new_message(&msg).await.unwrap().unwrap();

    app.platform.add_votes(idea.message_id, "👍", 3);
    app.platform.add_votes(idea.message_id, "👎", 1);

    let platform = app.platform.clone();
    let message_id = idea.message_id;
    wait_until(StdDuration::from_secs(5), move || {
        let platform = platform.clone();
        async move {
            platform
                .post(message_id)
                .is_some_and(|p| p.footer.as_deref() == Some(VOTING_ENDED_FOOTER))
        }
    })
    .await
    .unwrap();

    let post = app.platform.post(idea.message_id).unwrap();
    assert_eq!(
        field(&post, "Overall Rating").unwrap().value,
        "**75.0%**\n\n👍: 3x\n👎: 1x"
    );
    assert_eq!(
        field(&post, "Section Votes").unwrap().value,
        "🇦: 0x\n🇧: 0x\n\n**Color**\n🇨: 0x\n🇩: 0x"
    );
    assert_eq!(post.color, Color::GREEN);
    assert_eq!(app.platform.edit_count(idea.message_id), 1);
    assert_eq!(app.ideas.idea(idea.message_id).await.unwrap(), None);
}

#[tokio::test]
async fn test_deadline_passing_during_save_still_closes() {
    let app = TestApp::with_save_delay(StdDuration::from_millis(200));
    app.service.start(Utc::now()).await.unwrap();

    let channel = app
        .idea_channel(timed_settings(VoteType::Thumbs, Duration::seconds(1)))
        .await;
    // due about 100ms from now, while the save is still in flight
    let msg = message_at(
        channel,
        IDEA_WITH_GROUP,
        Utc::now() - Duration::milliseconds(900),
    );
    let idea = app.service.on_new_message(&msg).await.unwrap().unwrap();

    let platform = app.platform.clone();
    let message_id = idea.message_id;
    wait_until(StdDuration::from_secs(5), move || {
        let platform = platform.clone();
        async move {
            platform
                .post(message_id)
                .is_some_and(|p| p.footer.as_deref() == Some(VOTING_ENDED_FOOTER))
        }
    })
    .await
    .unwrap();

    assert_eq!(app.ideas.idea(idea.message_id).await.unwrap(), None);
    assert_eq!(app.platform.edit_count(idea.message_id), 1);
}

#[tokio::test]
async fn test_reaction_racing_the_save_does_not_block_closing() {
    let app = TestApp::with_save_delay(StdDuration::from_millis(200));
    app.service.start(Utc::now()).await.unwrap();

    let channel = app
        .idea_channel(timed_settings(VoteType::Thumbs, Duration::milliseconds(1500)))
        .await;
    let msg = message(channel, IDEA_WITH_GROUP);

    // react as soon as the post shows up, before the idea is stored
    let service = app.service.clone();
    let platform = app.platform.clone();
    let voter = tokio::spawn(async move {
        let post_id = loop {
            let sent = platform.sent_post_ids();
            if let Some(id) = sent.first() {
                break *id;
            }
            tokio::time::sleep(StdDuration::from_millis(5)).await;
        };
        let event = ReactionAdded {
            guild_id: Some(GUILD_ID),
            channel_id: channel,
            message_id: post_id,
            user_id: VOTER,
            user_is_bot: false,
            emoji: Some("👍".to_string()),
        };
        service.on_reaction_added(&event).await
    });

    let idea = app.service.on_new_message(&msg).await.unwrap().unwrap();
    voter.await.unwrap().unwrap();

    let platform = app.platform.clone();
    let message_id = idea.message_id;
    wait_until(StdDuration::from_secs(5), move || {
        let platform = platform.clone();
        async move {
            platform
                .post(message_id)
                .is_some_and(|p| p.footer.as_deref() == Some(VOTING_ENDED_FOOTER))
        }
    })
    .await
    .unwrap();

    assert_eq!(app.ideas.idea(idea.message_id).await.unwrap(), None);
}

#[tokio::test]
async fn test_expired_ideas_are_swept_at_start() {
    let app = TestApp::new();
    let channel = unique_id();
    let deadline = Utc::now() - Duration::hours(2);

    let expired = stored_idea(channel, Some(deadline));
    app.ideas.save_idea(&expired).await.unwrap();
    app.platform.insert_message(PlatformMessage {
        id: expired.message_id,
        channel_id: channel,
        post: Some(IdeaPost {
            title: "Paint the shed".to_string(),
            description: None,
            author: None,
            fields: Vec::new(),
            footer: Some("Voting ends:".to_string()),
            timestamp: Some(deadline),
            color: Color::BLURPLE,
        }),
        reactions: vec![
            ReactionCount::new("👍", 3, true),
            ReactionCount::new("👎", 1, true),
        ],
    });

    // its message is gone, so only the record is cleaned up
    let orphan = stored_idea(channel, Some(deadline - Duration::minutes(5)));
    app.ideas.save_idea(&orphan).await.unwrap();

    app.service.start(Utc::now()).await.unwrap();

    let post = app.platform.post(expired.message_id).unwrap();
    assert_eq!(post.footer.as_deref(), Some(ORIGINAL_DEADLINE_FOOTER));
    let rating = &field(&post, "Overall Rating").unwrap().value;
    assert!(rating.starts_with("**100.0%**\n\n👍: 2x\n👎: 0x"));
    assert!(rating.ends_with(
        "I was offline during the voting deadline. \
         The results you see here are from 2 hours after the deadline."
    ));
    assert!(field(&post, "Section Votes")
        .unwrap()
        .value
        .contains("🇦: *Reaction was removed*"));

    assert!(app.ideas.is_empty());
    assert_eq!(app.platform.edit_count(orphan.message_id), 0);
}

#[tokio::test]
async fn test_service_starts_only_once() {
    let app = TestApp::new();
    app.service.start(Utc::now()).await.unwrap();
    assert!(app.service.start(Utc::now()).await.is_err());
}

// ============================================================================
// Channels
// ============================================================================

#[tokio::test]
async fn test_enable_and_disable_channel() {
    let app = TestApp::new();
    let channels = app.channels();
    let channel = unique_id();

    assert_eq!(channels.settings(channel).await.unwrap(), None);

    let timed = timed_settings(VoteType::ThreeEmojis, Duration::days(1));
    channels.enable(channel, &timed).await.unwrap();
    assert_eq!(channels.settings(channel).await.unwrap(), Some(timed));

    channels.disable(channel).await.unwrap();
    assert_eq!(channels.settings(channel).await.unwrap(), None);

    let err = channels.disable(channel).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::ChannelAlreadyDisabled(id)) if id == channel
    ));
}

#[tokio::test]
async fn test_negative_vote_duration_is_rejected() {
    let app = TestApp::new();
    let channel = unique_id();
    let settings = timed_settings(VoteType::Thumbs, Duration::minutes(-5));

    let err = app.channels().enable(channel, &settings).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(app.channels().settings(channel).await.unwrap(), None);
}

#[tokio::test]
async fn test_unrepresentable_vote_duration_is_rejected() {
    let app = TestApp::new();
    let channel = unique_id();
    let settings = timed_settings(VoteType::Thumbs, Duration::days(100_000_000_000));

    let err = app.channels().enable(channel, &settings).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(app.channels().settings(channel).await.unwrap(), None);
}

#[tokio::test]
async fn test_stored_out_of_range_duration_gets_notice() {
    let app = TestApp::with_manual_spawner();
    let channel = app
        .idea_channel(timed_settings(VoteType::Thumbs, Duration::days(100_000_000_000)))
        .await;
    let msg = message(channel, IDEA_WITH_GROUP);

    app.service
        .dispatch(PlatformEvent::MessageCreated(msg))
        .await;

    let notices = app.platform.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].notice.kind, NoticeKind::Info);
    assert!(notices[0].notice.text.contains("voting duration"));
    assert_eq!(app.platform.sent_posts(), 0);
    assert!(app.ideas.is_empty());
}
