//! Admin surface: one macro-generated generic CRUD route set per domain
//! table (the consolidated mutation path), plus the typed operations that
//! need more than a bare table write.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use paste::paste;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{
    crud, documents, repo, state::AppState, testimonials, visa_packages, AppResult,
};

macro_rules! gen_admin_crud {
    ( $( $table:ident ),+ $(,)? ) => {
        paste! {
            $(
                async fn [<$table _list>](
                    State(state): State<AppState>,
                ) -> AppResult<Json<Value>> {
                    let rows = repo::list_rows(
                        &state.pool,
                        stringify!($table),
                        Some("created_at DESC"),
                        None,
                        None,
                    )
                    .await?;
                    let data: Vec<Value> = rows.into_iter().map(repo::row_to_json).collect();
                    Ok(Json(json!({ "success": true, "data": data })))
                }

                async fn [<$table _create>](
                    State(state): State<AppState>,
                    Json(data): Json<Map<String, Value>>,
                ) -> AppResult<Json<Value>> {
                    let created = crud::create(&state.pool, stringify!($table), data).await?;
                    Ok(Json(json!({ "success": true, "data": created })))
                }

                async fn [<$table _update>](
                    State(state): State<AppState>,
                    Path(id): Path<String>,
                    Json(data): Json<Map<String, Value>>,
                ) -> AppResult<Json<Value>> {
                    let updated = crud::update(&state.pool, stringify!($table), &id, data).await?;
                    Ok(Json(json!({ "success": true, "data": updated })))
                }

                async fn [<$table _delete>](
                    State(state): State<AppState>,
                    Path(id): Path<String>,
                ) -> AppResult<Json<Value>> {
                    crud::delete(&state.pool, stringify!($table), &id).await?;
                    Ok(Json(json!({ "success": true })))
                }
            )+

            fn generic_routes() -> Router<AppState> {
                let mut router = Router::new();
                $(
                    router = router
                        .route(
                            concat!("/", stringify!($table)),
                            get([<$table _list>]).post([<$table _create>]),
                        )
                        .route(
                            concat!("/", stringify!($table), "/{id}"),
                            put([<$table _update>]).delete([<$table _delete>]),
                        );
                )+
                router
            }
        }
    };
}

gen_admin_crud!(
    countries,
    visa_packages,
    legal_pages,
    testimonials,
    approved_visas,
    addon_services,
    blogs,
    document_checklist_items,
);

pub(super) fn routes() -> Router<AppState> {
    generic_routes()
        .route("/visa_packages/save", post(save_visa_package))
        .route("/countries/{id}/package-status", post(toggle_package_status))
        .route("/countries/{id}/documents", put(reconcile_documents))
        .route("/testimonials/{id}/approve", post(approve_testimonial))
}

async fn save_visa_package(
    State(state): State<AppState>,
    Json(input): Json<visa_packages::VisaPackageInput>,
) -> AppResult<Json<Value>> {
    let package = visa_packages::save(&state.pool, &input).await?;
    Ok(Json(json!({ "success": true, "data": package })))
}

#[derive(Deserialize)]
struct ToggleBody {
    active: bool,
}

async fn toggle_package_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ToggleBody>,
) -> AppResult<Json<Value>> {
    let view = visa_packages::toggle_status(&state.pool, &id, body.active).await?;
    Ok(Json(json!({ "success": true, "data": view })))
}

async fn reconcile_documents(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(desired): Json<Vec<documents::ChecklistItemInput>>,
) -> AppResult<Json<Value>> {
    let outcome = documents::reconcile(&state.pool, &id, &desired).await?;
    Ok(Json(json!({ "success": true, "data": outcome })))
}

#[derive(Deserialize)]
struct ApproveBody {
    approved: bool,
}

async fn approve_testimonial(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ApproveBody>,
) -> AppResult<Json<Value>> {
    let testimonial = testimonials::set_approved(&state.pool, &id, body.approved).await?;
    Ok(Json(json!({ "success": true, "data": testimonial })))
}
