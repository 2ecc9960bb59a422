use anyhow::Result;
use permitsy_lib::countries::{self, CountryInput, FaqItem, ProcessingStep};
use permitsy_lib::documents::{self, ChecklistItemInput};
use permitsy_lib::visa_packages::{self, VisaPackageInput};

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn structured_columns_round_trip() -> Result<()> {
    let pool = util::memory_pool().await;
    let input = CountryInput {
        name: "Australia".into(),
        visa_includes: vec!["ETA filing".into(), "Status tracking".into()],
        processing_steps: vec![ProcessingStep {
            step: 1,
            title: "Apply online".into(),
            description: "Takes about ten minutes.".into(),
        }],
        faq: vec![FaqItem {
            question: "How fast is it?".into(),
            answer: "Usually within a day.".into(),
        }],
        popularity: 42,
        ..Default::default()
    };
    let created = countries::create(&pool, &input).await?;

    let fetched = countries::get(&pool, &created.id).await?.expect("country");
    assert_eq!(fetched.visa_includes, input.visa_includes);
    assert_eq!(fetched.processing_steps, input.processing_steps);
    assert_eq!(fetched.faq, input.faq);
    assert_eq!(fetched.min_price, 0, "no packages yet");
    Ok(())
}

#[tokio::test]
async fn list_orders_by_popularity_then_name() -> Result<()> {
    let pool = util::memory_pool().await;
    for (name, popularity) in [("Brazil", 10), ("Argentina", 10), ("Japan", 90)] {
        countries::create(
            &pool,
            &CountryInput {
                name: name.into(),
                popularity,
                ..Default::default()
            },
        )
        .await?;
    }
    let names: Vec<String> = countries::list(&pool)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Japan", "Argentina", "Brazil"]);
    Ok(())
}

#[tokio::test]
async fn blank_name_is_rejected() -> Result<()> {
    let pool = util::memory_pool().await;
    let err = countries::create(
        &pool,
        &CountryInput {
            name: "   ".into(),
            ..Default::default()
        },
    )
    .await
    .expect_err("blank name should fail");
    assert_eq!(err.code(), "COUNTRY/NAME_REQUIRED");
    Ok(())
}

#[tokio::test]
async fn delete_cascades_to_packages_and_checklist() -> Result<()> {
    let pool = util::memory_pool().await;
    let country_id = util::insert_country(&pool, "Canada").await;
    visa_packages::save(
        &pool,
        &VisaPackageInput {
            country_id: country_id.clone(),
            government_fee: Some(100),
            service_fee: Some(50),
            ..Default::default()
        },
    )
    .await?;
    documents::reconcile(
        &pool,
        &country_id,
        &[ChecklistItemInput {
            id: None,
            document_name: "Passport".into(),
            document_description: None,
            required: true,
        }],
    )
    .await?;

    countries::delete(&pool, &country_id).await?;

    let packages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visa_packages")
        .fetch_one(&pool)
        .await?;
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM document_checklist_items")
        .fetch_one(&pool)
        .await?;
    assert_eq!((packages, items), (0, 0), "cascade must clear children");
    Ok(())
}
