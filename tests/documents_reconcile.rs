use anyhow::Result;
use permitsy_lib::documents::{self, ChecklistItemInput};

#[path = "util.rs"]
mod util;

fn item(name: &str, required: bool) -> ChecklistItemInput {
    ChecklistItemInput {
        id: None,
        document_name: name.into(),
        document_description: None,
        required,
    }
}

#[tokio::test]
async fn reconcile_creates_updates_and_deletes() -> Result<()> {
    let pool = util::memory_pool().await;
    let country_id = util::insert_country(&pool, "Canada").await;

    let outcome = documents::reconcile(
        &pool,
        &country_id,
        &[item("Passport", true), item("Photo", true)],
    )
    .await?;
    assert_eq!((outcome.created, outcome.updated, outcome.deleted), (2, 0, 0));

    let stored = documents::list_for_country(&pool, &country_id).await?;
    assert_eq!(stored.len(), 2);
    let passport = stored
        .iter()
        .find(|i| i.document_name == "Passport")
        .expect("passport row");

    // Second pass: keep passport (now optional), drop photo, add insurance.
    let desired = vec![
        ChecklistItemInput {
            id: Some(passport.id.clone()),
            document_name: "Passport".into(),
            document_description: Some("Six months validity.".into()),
            required: false,
        },
        item("Travel insurance", true),
    ];
    let outcome = documents::reconcile(&pool, &country_id, &desired).await?;
    assert_eq!((outcome.created, outcome.updated, outcome.deleted), (1, 1, 1));

    let stored = documents::list_for_country(&pool, &country_id).await?;
    assert_eq!(stored.len(), 2);
    let passport_after = stored
        .iter()
        .find(|i| i.document_name == "Passport")
        .expect("passport kept");
    assert_eq!(passport_after.id, passport.id, "update keeps the row id");
    assert!(!passport_after.required);
    assert!(stored.iter().any(|i| i.document_name == "Travel insurance"));
    assert!(stored.iter().all(|i| i.document_name != "Photo"));
    Ok(())
}

#[tokio::test]
async fn duplicate_names_roll_back_the_whole_batch() -> Result<()> {
    let pool = util::memory_pool().await;
    let country_id = util::insert_country(&pool, "Canada").await;
    documents::reconcile(&pool, &country_id, &[item("Passport", true)]).await?;

    let err = documents::reconcile(
        &pool,
        &country_id,
        &[item("Photo", true), item("photo", false)],
    )
    .await
    .expect_err("duplicate names should fail");
    assert_eq!(err.code(), "CHECKLIST/DUPLICATE_NAME");

    // The stored checklist is untouched.
    let stored = documents::list_for_country(&pool, &country_id).await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].document_name, "Passport");
    Ok(())
}

#[tokio::test]
async fn empty_desired_set_clears_the_checklist() -> Result<()> {
    let pool = util::memory_pool().await;
    let country_id = util::insert_country(&pool, "Canada").await;
    documents::reconcile(
        &pool,
        &country_id,
        &[item("Passport", true), item("Photo", true)],
    )
    .await?;

    let outcome = documents::reconcile(&pool, &country_id, &[]).await?;
    assert_eq!((outcome.created, outcome.updated, outcome.deleted), (0, 0, 2));
    assert!(documents::list_for_country(&pool, &country_id).await?.is_empty());
    Ok(())
}
