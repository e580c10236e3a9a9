use bookclub::db;
use bookclub::domain::{Actor, DomainError, Role};
use bookclub::services::account_service::{self, RegisterInput};
use bookclub::services::group_activity_service::{
    self as activity, DiscussionInput, EventInput, ScheduleInput, ScheduleUpdate,
};
use bookclub::services::group_service::{self, GroupInput, GroupUpdate};
use chrono::Utc;
use sea_orm::DatabaseConnection;

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_user(db: &DatabaseConnection, name: &str, role: Role) -> Actor {
    let user = account_service::create_account(
        db,
        RegisterInput {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "password123".to_string(),
        },
        role,
    )
    .await
    .expect("Failed to create user");
    Actor::new(user.id, role)
}

async fn create_group(db: &DatabaseConnection, creator: &Actor) -> i32 {
    group_service::create_group(
        db,
        creator.id,
        GroupInput {
            name: "Mystery Lovers".to_string(),
            description: Some("Whodunits every month".to_string()),
            topic: Some("Mystery".to_string()),
            cover_url: None,
            current_book_id: None,
        },
    )
    .await
    .expect("Failed to create group")
    .id
}

#[tokio::test]
async fn test_creator_is_first_member() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let group = create_group(&db, &alice).await;

    let dto = group_service::get_group(&db, group).await.unwrap();
    assert_eq!(dto.members_count, 1);
    assert_eq!(dto.created_by, alice.id);

    let members = group_service::list_members(&db, group).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, alice.id);
}

#[tokio::test]
async fn test_join_and_leave_keep_count_in_step() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let bob = create_user(&db, "Bob", Role::User).await;
    let group = create_group(&db, &alice).await;

    let joined = group_service::join_group(&db, bob.id, group).await.unwrap();
    assert_eq!(joined.members_count, 2);

    let again = group_service::join_group(&db, bob.id, group).await;
    match again {
        Err(DomainError::Conflict(msg)) => assert_eq!(msg, group_service::ALREADY_MEMBER),
        other => panic!("expected conflict, got {:?}", other),
    }
    assert_eq!(
        group_service::get_group(&db, group).await.unwrap().members_count,
        2
    );

    let left = group_service::leave_group(&db, bob.id, group).await.unwrap();
    assert_eq!(left.members_count, 1);

    let not_member = group_service::leave_group(&db, bob.id, group).await;
    match not_member {
        Err(DomainError::Conflict(msg)) => assert_eq!(msg, group_service::NOT_MEMBER),
        other => panic!("expected conflict, got {:?}", other),
    }

    let missing = group_service::join_group(&db, bob.id, 999).await;
    assert!(matches!(missing, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_count_never_goes_negative() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let group = create_group(&db, &alice).await;

    // The creator may leave their own group.
    let empty = group_service::leave_group(&db, alice.id, group).await.unwrap();
    assert_eq!(empty.members_count, 0);
    assert!(group_service::list_members(&db, group).await.unwrap().is_empty());
    assert!(group_service::list_user_groups(&db, alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_only_creator_edits_group() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let admin = create_user(&db, "Admin", Role::Admin).await;
    let group = create_group(&db, &alice).await;

    let update = GroupUpdate {
        name: Some("Renamed".to_string()),
        ..Default::default()
    };

    let by_admin = group_service::update_group(&db, &admin, group, update.clone()).await;
    assert!(matches!(by_admin, Err(DomainError::Forbidden(_))));

    let by_creator = group_service::update_group(&db, &alice, group, update)
        .await
        .unwrap();
    assert_eq!(by_creator.name, "Renamed");
}

#[tokio::test]
async fn test_discussions_require_membership() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let bob = create_user(&db, "Bob", Role::User).await;
    let carol = create_user(&db, "Carol", Role::User).await;
    let group = create_group(&db, &alice).await;

    let outsider = activity::create_discussion(
        &db,
        &bob,
        group,
        DiscussionInput {
            content: "Hello?".to_string(),
        },
    )
    .await;
    assert!(matches!(outsider, Err(DomainError::Forbidden(_))));

    group_service::join_group(&db, bob.id, group).await.unwrap();
    group_service::join_group(&db, carol.id, group).await.unwrap();
    let post = activity::create_discussion(
        &db,
        &bob,
        group,
        DiscussionInput {
            content: "Chapter 3 was wild".to_string(),
        },
    )
    .await
    .unwrap();

    // Another member cannot remove Bob's post; the group creator can.
    let by_carol = activity::delete_discussion(&db, &carol, group, post.id).await;
    assert!(matches!(by_carol, Err(DomainError::Forbidden(_))));
    activity::delete_discussion(&db, &alice, group, post.id)
        .await
        .unwrap();

    assert!(activity::list_discussions(&db, group).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_discussions_listed_newest_first() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let group = create_group(&db, &alice).await;

    for content in ["first", "second", "third"] {
        activity::create_discussion(
            &db,
            &alice,
            group,
            DiscussionInput {
                content: content.to_string(),
            },
        )
        .await
        .unwrap();
    }

    let posts = activity::list_discussions(&db, group).await.unwrap();
    let contents: Vec<&str> = posts.iter().map(|p| p.content.as_str()).collect();
    assert_eq!(contents, vec!["third", "second", "first"]);
    assert_eq!(posts[0].user.as_ref().unwrap().id, alice.id);
}

#[tokio::test]
async fn test_schedules_and_events_for_creator_or_admin() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "Alice", Role::User).await;
    let bob = create_user(&db, "Bob", Role::User).await;
    let admin = create_user(&db, "Admin", Role::Admin).await;
    let group = create_group(&db, &alice).await;
    group_service::join_group(&db, bob.id, group).await.unwrap();

    let schedule = ScheduleInput {
        title: "Finish part one".to_string(),
        description: None,
        scheduled_date: Utc::now(),
    };
    let by_member = activity::create_schedule(&db, &bob, group, schedule.clone()).await;
    assert!(matches!(by_member, Err(DomainError::Forbidden(_))));

    let created = activity::create_schedule(&db, &alice, group, schedule)
        .await
        .unwrap();
    let renamed = activity::update_schedule(
        &db,
        &admin,
        group,
        created.id,
        ScheduleUpdate {
            title: Some("Finish part two".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.title, "Finish part two");

    let event = activity::create_event(
        &db,
        &admin,
        group,
        EventInput {
            title: "Author talk".to_string(),
            description: None,
            event_date: Utc::now(),
            location: Some("Library".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(activity::list_events(&db, group).await.unwrap().len(), 1);

    let wrong_group = activity::delete_event(&db, &admin, group + 1, event.id).await;
    assert!(wrong_group.is_err());
    activity::delete_event(&db, &alice, group, event.id)
        .await
        .unwrap();
    assert!(activity::list_events(&db, group).await.unwrap().is_empty());
}
