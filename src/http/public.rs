use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    addon_services, approved_visas, blogs, countries, documents, legal_pages, state::AppState,
    testimonials, visa_packages, AppError, AppResult,
};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/countries", get(list_countries))
        .route("/countries/{id}", get(get_country))
        .route("/countries/{id}/packages", get(country_packages))
        .route("/countries/{id}/documents", get(country_documents))
        .route("/legal/{slug}", get(legal_by_slug))
        .route("/testimonials", get(list_testimonials))
        .route("/approved-visas", get(list_approved_visas))
        .route("/addon-services", get(list_addon_services))
        .route("/blogs", get(list_blogs))
        .route("/blogs/{slug}", get(blog_by_slug))
}

async fn health(State(state): State<AppState>) -> AppResult<Json<Value>> {
    // A cheap round-trip proves the pool is usable, not just constructed.
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(AppError::from)?;
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

async fn list_countries(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<countries::Country>>> {
    Ok(Json(countries::list(&state.pool).await?))
}

async fn get_country(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<countries::Country>> {
    countries::get(&state.pool, &id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::new("COUNTRY/NOT_FOUND", "Country not found").with_context("id", id)
        })
}

async fn country_packages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<visa_packages::VisaPackageView>>> {
    Ok(Json(visa_packages::views_for_country(&state.pool, &id).await?))
}

async fn country_documents(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<documents::DocumentChecklistItem>>> {
    Ok(Json(documents::list_for_country(&state.pool, &id).await?))
}

async fn legal_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<legal_pages::LegalPage>> {
    legal_pages::get_by_slug(&state.pool, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::new("LEGAL_PAGE/NOT_FOUND", "Legal page not found")
                .with_context("slug", slug)
        })
}

#[derive(Deserialize)]
struct TestimonialQuery {
    /// `all=true` is the admin moderation view; the public list stays
    /// approved-only.
    #[serde(default)]
    all: bool,
}

async fn list_testimonials(
    State(state): State<AppState>,
    Query(query): Query<TestimonialQuery>,
) -> AppResult<Json<Vec<testimonials::Testimonial>>> {
    Ok(Json(testimonials::list(&state.pool, !query.all).await?))
}

async fn list_approved_visas(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<approved_visas::ApprovedVisa>>> {
    Ok(Json(approved_visas::list(&state.pool).await?))
}

async fn list_addon_services(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<addon_services::AddonService>>> {
    Ok(Json(addon_services::list(&state.pool).await?))
}

async fn list_blogs(State(state): State<AppState>) -> AppResult<Json<Vec<blogs::Blog>>> {
    Ok(Json(blogs::list_published(&state.pool).await?))
}

async fn blog_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<blogs::Blog>> {
    blogs::get_by_slug(&state.pool, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::new("BLOG/NOT_FOUND", "Blog not found").with_context("slug", slug)
        })
}
