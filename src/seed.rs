//! Idempotent reference data. Rows key on a unique slug where the table has
//! one, otherwise on a fixed id, so re-running a section updates contents
//! without ever growing the row count.

use sqlx::SqlitePool;
use tracing::info;

use crate::{
    blogs::{self, BlogInput},
    countries::{CountryInput, EmbassyDetails, FaqItem, ProcessingStep},
    documents::{self, ChecklistItemInput},
    legal_pages::{self, LegalPageInput},
    time::now_ms,
    visa_packages::{self, VisaPackageInput},
    AppError, AppResult,
};

const COUNTRY_US: &str = "7b0c1f1e-3d62-4fbb-9a14-5d0a0f6d2101";
const COUNTRY_UK: &str = "7b0c1f1e-3d62-4fbb-9a14-5d0a0f6d2102";
const COUNTRY_SCHENGEN: &str = "7b0c1f1e-3d62-4fbb-9a14-5d0a0f6d2103";

const PACKAGE_US: &str = "9f3a2b10-55c4-4e0d-8c7a-1f9b3d4e5a01";
const PACKAGE_UK: &str = "9f3a2b10-55c4-4e0d-8c7a-1f9b3d4e5a02";
const PACKAGE_SCHENGEN: &str = "9f3a2b10-55c4-4e0d-8c7a-1f9b3d4e5a03";

const TESTIMONIAL_IDS: [&str; 3] = [
    "c2d4e6f8-0a1b-4c2d-8e3f-a0b1c2d3e401",
    "c2d4e6f8-0a1b-4c2d-8e3f-a0b1c2d3e402",
    "c2d4e6f8-0a1b-4c2d-8e3f-a0b1c2d3e403",
];

const ADDON_IDS: [&str; 2] = [
    "e1f2a3b4-c5d6-4e7f-8a9b-0c1d2e3f4a01",
    "e1f2a3b4-c5d6-4e7f-8a9b-0c1d2e3f4a02",
];

pub fn legal_page_fixtures() -> Vec<LegalPageInput> {
    vec![
        LegalPageInput {
            title: "Terms of Service".into(),
            slug: "terms-of-service".into(),
            content: "<h1>Terms of Service</h1><p>These terms govern your use of Permitsy.</p>"
                .into(),
        },
        LegalPageInput {
            title: "Privacy Policy".into(),
            slug: "privacy-policy".into(),
            content: "<h1>Privacy Policy</h1><p>How we collect and use your data.</p>".into(),
        },
        LegalPageInput {
            title: "Cookie Policy".into(),
            slug: "cookie-policy".into(),
            content: "<h1>Cookie Policy</h1><p>What cookies we set and why.</p>".into(),
        },
        LegalPageInput {
            title: "Refund Policy".into(),
            slug: "refund-policy".into(),
            content: "<h1>Refund Policy</h1><p>When service fees are refundable.</p>".into(),
        },
    ]
}

pub async fn seed_legal_pages(pool: &SqlitePool) -> AppResult<usize> {
    let fixtures = legal_page_fixtures();
    for input in &fixtures {
        legal_pages::upsert(pool, input).await?;
    }
    info!(target = "permitsy", event = "seed_legal_pages", count = fixtures.len());
    Ok(fixtures.len())
}

struct CountryFixture {
    id: &'static str,
    package_id: &'static str,
    input: CountryInput,
    package: VisaPackageInput,
    checklist: Vec<ChecklistItemInput>,
}

fn country_fixtures() -> Vec<CountryFixture> {
    vec![
        CountryFixture {
            id: COUNTRY_US,
            package_id: PACKAGE_US,
            input: CountryInput {
                name: "United States".into(),
                flag_url: Some("/images/flags/us.svg".into()),
                banner_url: Some("/images/banners/us.jpg".into()),
                description: Some("B1/B2 visitor visas for tourism and business.".into()),
                entry_type: Some("Multiple".into()),
                validity: Some("10 years".into()),
                length_of_stay: Some("Up to 180 days per visit".into()),
                visa_includes: vec![
                    "Document review".into(),
                    "Interview preparation".into(),
                    "Form DS-160 filing".into(),
                ],
                embassy_details: EmbassyDetails {
                    address: Some("33 Nine Elms Lane, London SW11 7US".into()),
                    phone: Some("+44 20 7499 9000".into()),
                    email: Some("support@permitsy.example".into()),
                    hours: Some("Mon-Fri 08:00-16:30".into()),
                },
                processing_steps: vec![
                    ProcessingStep {
                        step: 1,
                        title: "Submit documents".into(),
                        description: "Upload passport scan and photo.".into(),
                    },
                    ProcessingStep {
                        step: 2,
                        title: "Attend interview".into(),
                        description: "We book the earliest available slot.".into(),
                    },
                ],
                faq: vec![FaqItem {
                    question: "Do I need an interview?".into(),
                    answer: "Most first-time applicants do.".into(),
                }],
                popularity: 100,
            },
            package: VisaPackageInput {
                id: Some(PACKAGE_US.into()),
                country_id: COUNTRY_US.into(),
                name: Some("B1/B2 Visitor Visa".into()),
                government_fee: Some(18500),
                service_fee: Some(4900),
                processing_days: Some(21),
                total_price: None,
            },
            checklist: vec![
                ChecklistItemInput {
                    id: None,
                    document_name: "Passport".into(),
                    document_description: Some("Valid at least six months beyond stay.".into()),
                    required: true,
                },
                ChecklistItemInput {
                    id: None,
                    document_name: "Photo".into(),
                    document_description: Some("5x5cm, white background.".into()),
                    required: true,
                },
                ChecklistItemInput {
                    id: None,
                    document_name: "Bank statement".into(),
                    document_description: Some("Last three months.".into()),
                    required: false,
                },
            ],
        },
        CountryFixture {
            id: COUNTRY_UK,
            package_id: PACKAGE_UK,
            input: CountryInput {
                name: "United Kingdom".into(),
                flag_url: Some("/images/flags/uk.svg".into()),
                banner_url: Some("/images/banners/uk.jpg".into()),
                description: Some("Standard Visitor visas for up to six months.".into()),
                entry_type: Some("Multiple".into()),
                validity: Some("6 months".into()),
                length_of_stay: Some("Up to 180 days".into()),
                visa_includes: vec!["Document review".into(), "Application filing".into()],
                embassy_details: EmbassyDetails::default(),
                processing_steps: vec![ProcessingStep {
                    step: 1,
                    title: "Online application".into(),
                    description: "We complete the application with you.".into(),
                }],
                faq: vec![],
                popularity: 80,
            },
            package: VisaPackageInput {
                id: Some(PACKAGE_UK.into()),
                country_id: COUNTRY_UK.into(),
                name: Some("Standard Visitor Visa".into()),
                government_fee: Some(11500),
                service_fee: Some(3900),
                processing_days: Some(15),
                total_price: None,
            },
            checklist: vec![
                ChecklistItemInput {
                    id: None,
                    document_name: "Passport".into(),
                    document_description: None,
                    required: true,
                },
                ChecklistItemInput {
                    id: None,
                    document_name: "Travel itinerary".into(),
                    document_description: Some("Flights and accommodation.".into()),
                    required: false,
                },
            ],
        },
        CountryFixture {
            id: COUNTRY_SCHENGEN,
            package_id: PACKAGE_SCHENGEN,
            input: CountryInput {
                name: "Schengen Area".into(),
                flag_url: Some("/images/flags/eu.svg".into()),
                banner_url: Some("/images/banners/eu.jpg".into()),
                description: Some("Short-stay C visas for 27 European states.".into()),
                entry_type: Some("Single or Multiple".into()),
                validity: Some("90 days".into()),
                length_of_stay: Some("90 days in any 180".into()),
                visa_includes: vec!["Appointment booking".into(), "Insurance guidance".into()],
                embassy_details: EmbassyDetails::default(),
                processing_steps: vec![],
                faq: vec![],
                popularity: 90,
            },
            package: VisaPackageInput {
                id: Some(PACKAGE_SCHENGEN.into()),
                country_id: COUNTRY_SCHENGEN.into(),
                name: Some("Schengen Tourist Visa".into()),
                government_fee: Some(9000),
                service_fee: Some(3500),
                processing_days: Some(10),
                total_price: None,
            },
            checklist: vec![ChecklistItemInput {
                id: None,
                document_name: "Travel insurance".into(),
                document_description: Some("EUR 30,000 minimum coverage.".into()),
                required: true,
            }],
        },
    ]
}

async fn upsert_country(pool: &SqlitePool, id: &str, input: &CountryInput) -> AppResult<()> {
    let now = now_ms();
    sqlx::query(
        "INSERT INTO countries \
           (id, name, flag_url, banner_url, description, entry_type, validity, length_of_stay, \
            visa_includes, embassy_details, processing_steps, faq, popularity, min_price, \
            created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET \
           name = excluded.name, \
           flag_url = excluded.flag_url, \
           banner_url = excluded.banner_url, \
           description = excluded.description, \
           entry_type = excluded.entry_type, \
           validity = excluded.validity, \
           length_of_stay = excluded.length_of_stay, \
           visa_includes = excluded.visa_includes, \
           embassy_details = excluded.embassy_details, \
           processing_steps = excluded.processing_steps, \
           faq = excluded.faq, \
           popularity = excluded.popularity, \
           updated_at = excluded.updated_at",
    )
    .bind(id)
    .bind(&input.name)
    .bind(&input.flag_url)
    .bind(&input.banner_url)
    .bind(&input.description)
    .bind(&input.entry_type)
    .bind(&input.validity)
    .bind(&input.length_of_stay)
    .bind(serde_json::to_string(&input.visa_includes).map_err(AppError::from)?)
    .bind(serde_json::to_string(&input.embassy_details).map_err(AppError::from)?)
    .bind(serde_json::to_string(&input.processing_steps).map_err(AppError::from)?)
    .bind(serde_json::to_string(&input.faq).map_err(AppError::from)?)
    .bind(input.popularity)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        AppError::from(e)
            .with_context("operation", "seed_country")
            .with_context("id", id.to_string())
    })?;
    Ok(())
}

pub async fn seed_countries(pool: &SqlitePool) -> AppResult<usize> {
    let fixtures = country_fixtures();
    for fixture in &fixtures {
        upsert_country(pool, fixture.id, &fixture.input).await?;
        debug_assert_eq!(fixture.package.id.as_deref(), Some(fixture.package_id));
        visa_packages::save(pool, &fixture.package).await?;
        documents::reconcile(pool, fixture.id, &fixture.checklist).await?;
    }
    info!(target = "permitsy", event = "seed_countries", count = fixtures.len());
    Ok(fixtures.len())
}

pub async fn seed_testimonials(pool: &SqlitePool) -> AppResult<usize> {
    let now = now_ms();
    let rows: [(&str, &str, &str, &str, i64, &str); 3] = [
        (
            TESTIMONIAL_IDS[0],
            "Amelia Hart",
            "United States",
            "B1/B2 Visitor",
            5,
            "Interview prep made all the difference. Approved in three weeks.",
        ),
        (
            TESTIMONIAL_IDS[1],
            "Tomasz Nowak",
            "Schengen Area",
            "Tourist",
            5,
            "They caught a missing insurance document before the consulate did.",
        ),
        (
            TESTIMONIAL_IDS[2],
            "Priya Raman",
            "United Kingdom",
            "Standard Visitor",
            4,
            "Straightforward process, quick answers to every question.",
        ),
    ];
    for (id, client_name, country, visa_type, rating, comment) in rows {
        sqlx::query(
            "INSERT INTO testimonials \
               (id, client_name, country, visa_type, rating, comment, avatar_url, approved, \
                created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, NULL, 1, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
               client_name = excluded.client_name, \
               country = excluded.country, \
               visa_type = excluded.visa_type, \
               rating = excluded.rating, \
               comment = excluded.comment, \
               approved = excluded.approved, \
               updated_at = excluded.updated_at",
        )
        .bind(id)
        .bind(client_name)
        .bind(country)
        .bind(visa_type)
        .bind(rating)
        .bind(comment)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::from(e)
                .with_context("operation", "seed_testimonials")
                .with_context("id", id.to_string())
        })?;
    }
    info!(target = "permitsy", event = "seed_testimonials", count = 3);
    Ok(3)
}

pub async fn seed_addon_services(pool: &SqlitePool) -> AppResult<usize> {
    let now = now_ms();
    let rows: [(&str, &str, i64, i64, i64, &str); 2] = [
        (
            ADDON_IDS[0],
            "Express courier",
            2500,
            0,
            2,
            "Passport return by tracked next-day courier.",
        ),
        (
            ADDON_IDS[1],
            "Certified translation",
            4000,
            10,
            5,
            "Certified translation of supporting documents.",
        ),
    ];
    for (id, name, price, discount, days, description) in rows {
        sqlx::query(
            "INSERT INTO addon_services \
               (id, name, price, discount_percentage, delivery_days, description, image_url, \
                created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
               name = excluded.name, \
               price = excluded.price, \
               discount_percentage = excluded.discount_percentage, \
               delivery_days = excluded.delivery_days, \
               description = excluded.description, \
               updated_at = excluded.updated_at",
        )
        .bind(id)
        .bind(name)
        .bind(price)
        .bind(discount)
        .bind(days)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::from(e)
                .with_context("operation", "seed_addon_services")
                .with_context("id", id.to_string())
        })?;
    }
    info!(target = "permitsy", event = "seed_addon_services", count = 2);
    Ok(2)
}

pub async fn seed_blogs(pool: &SqlitePool) -> AppResult<usize> {
    let now = now_ms();
    let fixtures = vec![
        BlogInput {
            title: "Schengen visa checklist for first-time travellers".into(),
            slug: "schengen-visa-checklist".into(),
            content: "<p>Everything consulates actually look for.</p>".into(),
            excerpt: Some("Everything consulates actually look for.".into()),
            featured_image: Some("/images/blog/schengen.jpg".into()),
            published_at: Some(now),
        },
        BlogInput {
            title: "How long does a US visitor visa really take?".into(),
            slug: "us-visitor-visa-timeline".into(),
            content: "<p>Realistic timelines by consulate, updated quarterly.</p>".into(),
            excerpt: Some("Realistic timelines by consulate.".into()),
            featured_image: Some("/images/blog/us-timeline.jpg".into()),
            published_at: Some(now),
        },
    ];
    for input in &fixtures {
        blogs::upsert(pool, input).await?;
    }
    info!(target = "permitsy", event = "seed_blogs", count = fixtures.len());
    Ok(fixtures.len())
}

pub async fn seed_all(pool: &SqlitePool) -> AppResult<()> {
    seed_legal_pages(pool).await?;
    seed_countries(pool).await?;
    seed_testimonials(pool).await?;
    seed_addon_services(pool).await?;
    seed_blogs(pool).await?;
    Ok(())
}
