//! Integration tests for [`storage::StatsRepository`].
//!
//! Covers counters, API usage, recent-context windows, resets, sender statistics and concurrent
//! increments, using an in-memory SQLite database (and a temp file for the on-disk case).

use std::sync::Arc;

use chrono::{Duration, Utc};
use storage::{ApiProvider, ChatInfo, Stats, StatsRepository, StatsTarget, UserInfo};

async fn memory_repo() -> StatsRepository {
    StatsRepository::new("sqlite::memory:")
        .await
        .expect("Failed to create repository")
}

fn chat() -> ChatInfo {
    ChatInfo::new(-100123, Some("Friends".to_string()))
}

fn user(id: i64, name: &str) -> UserInfo {
    UserInfo::new(id, name, Some(name.to_lowercase()))
}

/// **Test: record_message creates chat and user and increments both counters.**
///
/// **Setup:** Empty in-memory DB.
/// **Action:** Record two messages from user 55 in chat -100123.
/// **Expected:** Chat message_count=2, user message_count=2, api_call_count=0.
#[tokio::test]
async fn test_record_message_increments_counters() {
    let repo = memory_repo().await;
    repo.record_message(&chat(), &user(55, "Ivan"), "1", "hello", None)
        .await
        .expect("Failed to record");
    repo.record_message(&chat(), &user(55, "Ivan"), "2", "again", Some("hi"))
        .await
        .expect("Failed to record");

    let chat_stats = match repo.get_stats(StatsTarget::Chat(-100123)).await.unwrap() {
        Some(Stats::Chat(s)) => s,
        other => panic!("unexpected stats: {:?}", other),
    };
    assert_eq!(chat_stats.message_count, 2);
    assert_eq!(chat_stats.api_call_count, 0);
    assert_eq!(chat_stats.user_count, 1);
    assert_eq!(chat_stats.title.as_deref(), Some("Friends"));

    let user_stats = match repo
        .get_stats(StatsTarget::User {
            chat_id: -100123,
            user_id: 55,
        })
        .await
        .unwrap()
    {
        Some(Stats::User(s)) => s,
        other => panic!("unexpected stats: {:?}", other),
    };
    assert_eq!(user_stats.message_count, 2);
    assert_eq!(user_stats.display_name, "Ivan");
}

/// **Test: get_stats for an unknown chat or user returns None.**
#[tokio::test]
async fn test_get_stats_unknown_target() {
    let repo = memory_repo().await;
    assert!(repo.get_stats(StatsTarget::Chat(1)).await.unwrap().is_none());
    assert!(repo
        .get_stats(StatsTarget::User {
            chat_id: 1,
            user_id: 2
        })
        .await
        .unwrap()
        .is_none());
}

/// **Test: increment_api_usage counts per provider and on the chat/user totals.**
///
/// **Setup:** One recorded message.
/// **Action:** Two AI calls and one weather call by the same user.
/// **Expected:** chat api_call_count=3; user providers ai=2, weather=1; message counters unchanged.
#[tokio::test]
async fn test_increment_api_usage() {
    let repo = memory_repo().await;
    let u = user(55, "Ivan");
    repo.record_message(&chat(), &u, "1", "hello", None).await.unwrap();
    repo.increment_api_usage(&chat(), &u, ApiProvider::Ai).await.unwrap();
    repo.increment_api_usage(&chat(), &u, ApiProvider::Ai).await.unwrap();
    repo.increment_api_usage(&chat(), &u, ApiProvider::Weather)
        .await
        .unwrap();

    let Some(Stats::Chat(chat_stats)) = repo.get_stats(StatsTarget::Chat(-100123)).await.unwrap()
    else {
        panic!("chat stats missing");
    };
    assert_eq!(chat_stats.api_call_count, 3);
    assert_eq!(chat_stats.message_count, 1);

    let Some(Stats::User(user_stats)) = repo
        .get_stats(StatsTarget::User {
            chat_id: -100123,
            user_id: 55,
        })
        .await
        .unwrap()
    else {
        panic!("user stats missing");
    };
    assert_eq!(user_stats.api_call_count, 3);
    let ai = user_stats
        .providers
        .iter()
        .find(|p| p.provider == "ai")
        .expect("ai usage");
    assert_eq!(ai.call_count, 2);
    let weather = user_stats
        .providers
        .iter()
        .find(|p| p.provider == "weather")
        .expect("weather usage");
    assert_eq!(weather.call_count, 1);
}

/// **Test: get_recent returns the newest N records oldest-first.**
///
/// **Setup:** 15 messages in the chat.
/// **Action:** `get_recent(chat_id, 10)`.
/// **Expected:** 10 records, texts "msg 5".."msg 14" in order.
#[tokio::test]
async fn test_get_recent_window_order() {
    let repo = memory_repo().await;
    for i in 0..15 {
        repo.record_message(&chat(), &user(55, "Ivan"), &i.to_string(), &format!("msg {}", i), None)
            .await
            .unwrap();
    }

    let recent = repo.get_recent(-100123, 10).await.unwrap();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent.first().unwrap().text, "msg 5");
    assert_eq!(recent.last().unwrap().text, "msg 14");
    assert!(recent.iter().all(|r| r.chat_id == -100123));
}

/// **Test: reset_context hides earlier records from get_recent.**
///
/// **Setup:** Two messages, then reset, then one message.
/// **Expected:** reset returns 1; get_recent returns only the post-reset message.
#[tokio::test]
async fn test_reset_context_starts_new_generation() {
    let repo = memory_repo().await;
    let u = user(55, "Ivan");
    repo.record_message(&chat(), &u, "1", "before 1", None).await.unwrap();
    repo.record_message(&chat(), &u, "2", "before 2", None).await.unwrap();

    let reset_id = repo.reset_context(-100123).await.unwrap();
    assert_eq!(reset_id, 1);

    repo.record_message(&chat(), &u, "3", "after", None).await.unwrap();
    let recent = repo.get_recent(-100123, 30).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].text, "after");
    assert_eq!(recent[0].reset_id, 1);
}

/// **Test: reset_context on an unknown chat is NotFound.**
#[tokio::test]
async fn test_reset_context_unknown_chat() {
    let repo = memory_repo().await;
    assert!(matches!(
        repo.reset_context(7).await,
        Err(storage::StorageError::NotFound(_))
    ));
}

/// **Test: attach_reply stores the reply on the record.**
#[tokio::test]
async fn test_attach_reply() {
    let repo = memory_repo().await;
    let id = repo
        .record_message(&chat(), &user(55, "Ivan"), "1", "question", None)
        .await
        .unwrap();
    repo.attach_reply(id, "answer").await.unwrap();

    let recent = repo.get_recent(-100123, 1).await.unwrap();
    assert_eq!(recent[0].reply.as_deref(), Some("answer"));
    assert!(repo.attach_reply(id + 100, "nope").await.is_err());
}

/// **Test: sender_counts ranks senders; chat_members exposes all-time counters.**
#[tokio::test]
async fn test_sender_counts_and_members() {
    let repo = memory_repo().await;
    for i in 0..3 {
        repo.record_message(&chat(), &user(1, "Ann"), &format!("a{}", i), "x", None)
            .await
            .unwrap();
    }
    repo.record_message(&chat(), &user(2, "Bob"), "b0", "y", None)
        .await
        .unwrap();

    let since = Some(Utc::now() - Duration::days(1));
    let top = repo.sender_counts(-100123, since, 5).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].display_name, "Ann");
    assert_eq!(top[0].message_count, 3);
    assert_eq!(top[1].message_count, 1);

    let future = Some(Utc::now() + Duration::days(1));
    assert!(repo.sender_counts(-100123, future, 5).await.unwrap().is_empty());
    assert_eq!(repo.message_count_since(-100123, None).await.unwrap(), 4);

    let members = repo.chat_members(-100123, 10).await.unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].user_id, 1);
    assert_eq!(members[0].message_count, 3);
}

/// **Test: global_stats sums over all chats.**
#[tokio::test]
async fn test_global_stats() {
    let repo = memory_repo().await;
    repo.record_message(&chat(), &user(1, "Ann"), "1", "x", None).await.unwrap();
    repo.record_message(&ChatInfo::new(5, None), &user(2, "Bob"), "1", "y", None)
        .await
        .unwrap();
    repo.increment_api_usage(&ChatInfo::new(5, None), &user(2, "Bob"), ApiProvider::Currency)
        .await
        .unwrap();

    let stats = repo.global_stats().await.unwrap();
    assert_eq!(stats.chats, 2);
    assert_eq!(stats.users, 2);
    assert_eq!(stats.messages, 2);
    assert_eq!(stats.api_calls, 1);
    assert_eq!(stats.stored_messages, 2);
    repo.ping().await.unwrap();
}

/// **Test: messages_since returns records in insertion order with replies.**
#[tokio::test]
async fn test_messages_since() {
    let repo = memory_repo().await;
    repo.record_message(&chat(), &user(1, "Ann"), "1", "first", Some("r1"))
        .await
        .unwrap();
    repo.record_message(&chat(), &user(1, "Ann"), "2", "second", None)
        .await
        .unwrap();

    let all = repo
        .messages_since(Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].text, "first");
    assert_eq!(all[0].reply.as_deref(), Some("r1"));
    assert_eq!(all[1].text, "second");
}

/// **Test: concurrent record_message calls for the same chat lose no increments.**
///
/// **Setup:** Shared repository.
/// **Action:** 50 tasks each record one message in the same chat.
/// **Expected:** chat message_count == 50 and 50 stored records.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_record_message_is_monotonic() {
    let repo = Arc::new(memory_repo().await);
    let mut handles = Vec::new();
    for i in 0..50 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.record_message(&chat(), &user(i % 5, "U"), &i.to_string(), "x", None)
                .await
                .expect("record");
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let Some(Stats::Chat(stats)) = repo.get_stats(StatsTarget::Chat(-100123)).await.unwrap() else {
        panic!("chat stats missing");
    };
    assert_eq!(stats.message_count, 50);
    assert_eq!(repo.message_count_since(-100123, None).await.unwrap(), 50);
}

/// **Test: file-backed database is created in a missing directory and survives reopening.**
#[tokio::test]
async fn test_file_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}/data/bot.db", dir.path().display());
    {
        let repo = StatsRepository::new(&url).await.expect("open");
        repo.record_message(&chat(), &user(1, "Ann"), "1", "x", None)
            .await
            .unwrap();
    }
    let repo = StatsRepository::new(&url).await.expect("reopen");
    let Some(Stats::Chat(stats)) = repo.get_stats(StatsTarget::Chat(-100123)).await.unwrap() else {
        panic!("chat stats missing");
    };
    assert_eq!(stats.message_count, 1);
}
