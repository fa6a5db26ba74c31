//! Integration tests for the change log repositories.
//!
//! Exercises the repository layer against a real database:
//! - Seeded change types and their ordering
//! - Counter recalculation on create, update and delete
//! - The object-requires-content-type invariant
//! - Live feed ordering, truncation and publication filtering
//! - Admin listing filters

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use correx_core::types::Timestamp;
use correx_db::models::change::{ChangeListParams, CreateChange, UpdateChange};
use correx_db::models::change_type::UpdateChangeType;
use correx_db::models::site::CreateSite;
use correx_db::models::user::CreateUser;
use correx_db::repositories::{ChangeRepo, ChangeTypeRepo, SiteRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn day(d: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2009, 2, d, 12, 0, 0).unwrap()
}

fn new_change(description: &str, change_type: &str, pub_date: Timestamp, public: bool) -> CreateChange {
    CreateChange {
        description: description.to_string(),
        change_type: change_type.to_string(),
        pub_date: Some(pub_date),
        is_public: Some(public),
        ..Default::default()
    }
}

async fn stored_count(pool: &PgPool, name: &str) -> i32 {
    ChangeTypeRepo::find_by_name(pool, name)
        .await
        .unwrap()
        .unwrap()
        .change_count
}

async fn assert_counters_match_public_rows(pool: &PgPool) {
    for ct in ChangeTypeRepo::list(pool).await.unwrap() {
        let (expected,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM changes WHERE change_type = $1 AND is_public",
        )
        .bind(&ct.name)
        .fetch_one(pool)
        .await
        .unwrap();
        assert_eq!(
            i64::from(ct.change_count),
            expected,
            "counter for {} out of sync",
            ct.name
        );
    }
}

// ---------------------------------------------------------------------------
// Change types
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seed_change_types_listed_by_name(pool: PgPool) {
    let names: Vec<String> = ChangeTypeRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|ct| ct.name)
        .collect();
    assert_eq!(names, vec!["Addition", "Correction", "Deletion", "Update"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_update_change_type(pool: PgPool) {
    let created = ChangeTypeRepo::create(&pool, "Retraction", "retraction", "Pulled entirely")
        .await
        .unwrap();
    assert_eq!(created.change_count, 0);

    let updated = ChangeTypeRepo::update(
        &pool,
        "Retraction",
        &UpdateChangeType {
            slug: None,
            description: Some("Withdrawn".to_string()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.slug, "retraction");
    assert_eq!(updated.description, "Withdrawn");

    let missing = ChangeTypeRepo::update(&pool, "Nope", &UpdateChangeType::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_slug_rejected(pool: PgPool) {
    let result = ChangeTypeRepo::create(&pool, "Fix", "correction", "").await;
    assert_matches!(result, Err(sqlx::Error::Database(e)) if e.constraint() == Some("uq_change_types_slug"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_change_type_in_use_fails(pool: PgPool) {
    ChangeRepo::create(&pool, &new_change("Typo", "Correction", day(14), false))
        .await
        .unwrap();

    assert_eq!(ChangeTypeRepo::usage_count(&pool, "Correction").await.unwrap(), 1);
    let result = ChangeTypeRepo::delete(&pool, "Correction").await;
    assert!(result.is_err());

    assert!(ChangeTypeRepo::delete(&pool, "Deletion").await.unwrap());
    assert!(!ChangeTypeRepo::delete(&pool, "Deletion").await.unwrap());
}

// ---------------------------------------------------------------------------
// Counter recalculation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_counts_only_public_changes(pool: PgPool) {
    ChangeRepo::create(&pool, &new_change("Live fix", "Correction", day(14), true))
        .await
        .unwrap();
    ChangeRepo::create(&pool, &new_change("Draft fix", "Correction", day(15), false))
        .await
        .unwrap();
    ChangeRepo::create(&pool, &new_change("New map", "Addition", day(15), true))
        .await
        .unwrap();

    assert_eq!(stored_count(&pool, "Correction").await, 1);
    assert_eq!(stored_count(&pool, "Addition").await, 1);
    assert_eq!(stored_count(&pool, "Update").await, 0);
    assert_counters_match_public_rows(&pool).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_change_defaults_to_unpublished(pool: PgPool) {
    let change = ChangeRepo::create(
        &pool,
        &CreateChange {
            description: "Quiet fix".to_string(),
            change_type: "Correction".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(!change.is_public);
    assert_eq!(stored_count(&pool, "Correction").await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_toggle_and_type_change_recount(pool: PgPool) {
    let change = ChangeRepo::create(&pool, &new_change("Draft", "Update", day(14), false))
        .await
        .unwrap();
    assert_eq!(stored_count(&pool, "Update").await, 0);

    ChangeRepo::update(
        &pool,
        change.id,
        &UpdateChange {
            is_public: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(stored_count(&pool, "Update").await, 1);

    // Moving the change to another type moves the count with it.
    ChangeRepo::update(
        &pool,
        change.id,
        &UpdateChange {
            change_type: Some("Correction".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(stored_count(&pool, "Update").await, 0);
    assert_eq!(stored_count(&pool, "Correction").await, 1);

    assert!(ChangeRepo::delete(&pool, change.id).await.unwrap());
    assert_eq!(stored_count(&pool, "Correction").await, 0);
    assert_counters_match_public_rows(&pool).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recount_overwrites_drift_and_is_idempotent(pool: PgPool) {
    ChangeRepo::create(&pool, &new_change("One", "Deletion", day(14), true))
        .await
        .unwrap();
    sqlx::query("UPDATE change_types SET change_count = 99")
        .execute(&pool)
        .await
        .unwrap();

    let first = ChangeTypeRepo::recount(&pool, "Deletion").await.unwrap().unwrap();
    let second = ChangeTypeRepo::recount(&pool, "Deletion").await.unwrap().unwrap();
    assert_eq!(first.change_count, 1);
    assert_eq!(second.change_count, 1);

    let all = ChangeTypeRepo::recount_all(&pool).await.unwrap();
    assert_eq!(all.len(), 4);
    assert_counters_match_public_rows(&pool).await;

    assert!(ChangeTypeRepo::recount(&pool, "Nope").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_change_returns_none(pool: PgPool) {
    let result = ChangeRepo::update(&pool, 999_999, &UpdateChange::default())
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(!ChangeRepo::delete(&pool, 999_999).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recount_failure_surfaces_but_write_stays_committed(pool: PgPool) {
    sqlx::query(
        "CREATE FUNCTION reject_counter_update() RETURNS trigger AS $$ \
         BEGIN RAISE EXCEPTION 'counters are read-only'; END; \
         $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER trg_reject_counter_update BEFORE UPDATE ON change_types \
         FOR EACH ROW EXECUTE FUNCTION reject_counter_update()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let result = ChangeRepo::create(&pool, &new_change("Survives", "Update", day(14), true)).await;
    assert_matches!(result, Err(sqlx::Error::Database(_)));

    let (persisted,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM changes WHERE description = 'Survives'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(persisted, 1);
    assert_eq!(stored_count(&pool, "Update").await, 0);

    // Once the counters accept writes again, a recount catches up.
    sqlx::query("DROP TRIGGER trg_reject_counter_update ON change_types")
        .execute(&pool)
        .await
        .unwrap();
    ChangeTypeRepo::recount_all(&pool).await.unwrap();
    assert_eq!(stored_count(&pool, "Update").await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_toggle_keeps_links(pool: PgPool) {
    let site = SiteRepo::create(
        &pool,
        &CreateSite {
            domain: "projects.latimes.com".to_string(),
            name: "Data Desk".to_string(),
        },
    )
    .await
    .unwrap();
    let mut draft = new_change("Linked draft", "Update", day(14), false);
    draft.site_id = Some(site.id);
    draft.content_app = Some("mapping".to_string());
    let draft = ChangeRepo::create(&pool, &draft).await.unwrap();

    let published = ChangeRepo::update(
        &pool,
        draft.id,
        &UpdateChange {
            is_public: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(published.is_public);
    assert_eq!(published.site_id, Some(site.id));
    assert_eq!(published.content_app.as_deref(), Some("mapping"));
    assert_eq!(published.description, "Linked draft");

    // An explicit clear removes one link and leaves the other.
    let cleared = ChangeRepo::update(
        &pool,
        draft.id,
        &UpdateChange {
            site_id: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(cleared.site_id, None);
    assert_eq!(cleared.content_app.as_deref(), Some("mapping"));
}

// ---------------------------------------------------------------------------
// Link invariant
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_object_id_requires_content_type(pool: PgPool) {
    let mut input = new_change("Orphan", "Correction", day(14), true);
    input.object_id = Some(1);

    let result = ChangeRepo::create(&pool, &input).await;
    assert_matches!(
        result,
        Err(sqlx::Error::Database(e)) if e.constraint() == Some("ck_changes_object_requires_type")
    );
}

// ---------------------------------------------------------------------------
// Live feeds
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_live_feed_is_newest_first_and_public_only(pool: PgPool) {
    for (d, public) in [(14, true), (16, true), (15, true), (17, false)] {
        ChangeRepo::create(
            &pool,
            &new_change(&format!("Feb {d}"), "Update", day(d), public),
        )
        .await
        .unwrap();
    }

    let all = ChangeRepo::list_live(&pool, 10).await.unwrap();
    let descriptions: Vec<_> = all.iter().map(|c| c.description.as_str()).collect();
    assert_eq!(descriptions, vec!["Feb 16", "Feb 15", "Feb 14"]);

    let top = ChangeRepo::list_live(&pool, 2).await.unwrap();
    assert_eq!(top, all[..2].to_vec());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_live_feed_by_user_site_and_app(pool: PgPool) {
    let site = SiteRepo::create(
        &pool,
        &CreateSite {
            domain: "projects.latimes.com".to_string(),
            name: "Data Desk".to_string(),
        },
    )
    .await
    .unwrap();
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            username: "Russ".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let mut linked = new_change("Linked", "Addition", day(14), true);
    linked.site_id = Some(site.id);
    linked.user_id = Some(user.id);
    linked.content_app = Some("mapping".to_string());
    let linked = ChangeRepo::create(&pool, &linked).await.unwrap();
    ChangeRepo::create(&pool, &new_change("Unlinked", "Addition", day(15), true))
        .await
        .unwrap();

    let by_user = ChangeRepo::list_live_by_user(&pool, user.id, 5).await.unwrap();
    let by_site = ChangeRepo::list_live_by_site(&pool, site.id, 5).await.unwrap();
    let by_app = ChangeRepo::list_live_by_app(&pool, "mapping", 5).await.unwrap();
    assert_eq!(by_user, vec![linked.clone()]);
    assert_eq!(by_site, vec![linked.clone()]);
    assert_eq!(by_app, vec![linked]);

    assert!(ChangeRepo::list_live_by_app(&pool, "map", 5).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_username_lookup_ignores_case(pool: PgPool) {
    UserRepo::create(
        &pool,
        &CreateUser {
            username: "Otis".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let found = UserRepo::find_by_username(&pool, "otis").await.unwrap();
    assert_eq!(found.unwrap().username, "Otis");

    let duplicate = UserRepo::create(
        &pool,
        &CreateUser {
            username: "OTIS".to_string(),
            ..Default::default()
        },
    )
    .await;
    assert!(duplicate.is_err());
}

// ---------------------------------------------------------------------------
// Admin listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_list_filters(pool: PgPool) {
    ChangeRepo::create(&pool, &new_change("Fixed 50% of typos", "Correction", day(14), true))
        .await
        .unwrap();
    ChangeRepo::create(&pool, &new_change("Draft update", "Update", day(15), false))
        .await
        .unwrap();
    ChangeRepo::create(
        &pool,
        &new_change(
            "Last year",
            "Update",
            Utc.with_ymd_and_hms(2008, 12, 31, 12, 0, 0).unwrap(),
            true,
        ),
    )
    .await
    .unwrap();

    let everything = ChangeRepo::list(&pool, &ChangeListParams::default()).await.unwrap();
    assert_eq!(everything.len(), 3);

    let drafts = ChangeRepo::list(
        &pool,
        &ChangeListParams {
            is_public: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].description, "Draft update");

    let february = ChangeRepo::list(
        &pool,
        &ChangeListParams {
            year: Some(2009),
            month: Some(2),
            change_type: Some("Update".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(february.len(), 1);

    let search = ChangeRepo::list(
        &pool,
        &ChangeListParams {
            q: Some("50%".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(search.len(), 1);
    assert_eq!(search[0].change_type, "Correction");

    let paged = ChangeRepo::list(
        &pool,
        &ChangeListParams {
            limit: Some(1),
            offset: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].description, "Fixed 50% of typos");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_search_covers_related_names(pool: PgPool) {
    let site = SiteRepo::create(
        &pool,
        &CreateSite {
            domain: "projects.latimes.com".to_string(),
            name: "Data Desk".to_string(),
        },
    )
    .await
    .unwrap();
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            username: "Russ".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let mut by_russ = new_change("Fixed a figure", "Correction", day(14), true);
    by_russ.user_id = Some(user.id);
    ChangeRepo::create(&pool, &by_russ).await.unwrap();

    let mut on_site = new_change("New map layer", "Addition", day(15), true);
    on_site.site_id = Some(site.id);
    ChangeRepo::create(&pool, &on_site).await.unwrap();

    let search = |term: &str| ChangeListParams {
        q: Some(term.to_string()),
        ..Default::default()
    };
    let descriptions = |changes: Vec<correx_db::models::change::Change>| -> Vec<String> {
        changes.into_iter().map(|c| c.description).collect()
    };

    let found = ChangeRepo::list(&pool, &search("russ")).await.unwrap();
    assert_eq!(descriptions(found), vec!["Fixed a figure"]);

    let found = ChangeRepo::list(&pool, &search("data desk")).await.unwrap();
    assert_eq!(descriptions(found), vec!["New map layer"]);

    let found = ChangeRepo::list(&pool, &search("latimes")).await.unwrap();
    assert_eq!(descriptions(found), vec!["New map layer"]);

    let found = ChangeRepo::list(&pool, &search("addit")).await.unwrap();
    assert_eq!(descriptions(found), vec!["New map layer"]);
}
