use anyhow::Result;
use permitsy_lib::testimonials::{self, TestimonialInput};

#[path = "util.rs"]
mod util;

fn input(name: &str, approved: bool) -> TestimonialInput {
    TestimonialInput {
        client_name: name.into(),
        country: Some("United States".into()),
        visa_type: Some("B1/B2".into()),
        rating: 5,
        comment: "Smooth process".into(),
        avatar_url: None,
        approved,
    }
}

#[tokio::test]
async fn only_approved_filters_moderation_queue() -> Result<()> {
    let pool = util::memory_pool().await;
    testimonials::create(&pool, &input("Approved One", true)).await?;
    testimonials::create(&pool, &input("Approved Two", true)).await?;
    testimonials::create(&pool, &input("Pending", false)).await?;

    let public = testimonials::list(&pool, true).await?;
    assert_eq!(public.len(), 2);
    assert!(public.iter().all(|t| t.approved));

    let all = testimonials::list(&pool, false).await?;
    assert_eq!(all.len(), 3);
    Ok(())
}

#[tokio::test]
async fn rating_outside_range_is_rejected_before_write() -> Result<()> {
    let pool = util::memory_pool().await;
    let mut bad = input("Zero Stars", true);
    bad.rating = 0;
    let err = testimonials::create(&pool, &bad)
        .await
        .expect_err("rating 0 should fail");
    assert_eq!(err.code(), "TESTIMONIAL/RATING_RANGE");
    assert!(testimonials::list(&pool, false).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn set_approved_moves_between_views() -> Result<()> {
    let pool = util::memory_pool().await;
    let created = testimonials::create(&pool, &input("Pending", false)).await?;
    assert!(testimonials::list(&pool, true).await?.is_empty());

    let approved = testimonials::set_approved(&pool, &created.id, true).await?;
    assert!(approved.approved);
    assert_eq!(testimonials::list(&pool, true).await?.len(), 1);

    let unapproved = testimonials::set_approved(&pool, &created.id, false).await?;
    assert!(!unapproved.approved);
    assert!(testimonials::list(&pool, true).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_unknown_is_not_found() -> Result<()> {
    let pool = util::memory_pool().await;
    let err = testimonials::delete(&pool, "missing-id")
        .await
        .expect_err("unknown id should fail");
    assert_eq!(err.code(), "TESTIMONIAL/NOT_FOUND");
    Ok(())
}
