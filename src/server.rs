//! HTTP server exposing the summary and chart endpoints
use std::collections::BTreeSet;
use std::sync::Arc;

use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use serde::Serialize;

use crate::aggregate;
use crate::chart::{self, ChartKind};
use crate::data::Dataset;
use crate::error::Error;
use crate::filter::{filter, FilterCriteria, RawCriteria};
use crate::RenderOptions;

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }
}

/// Distinct values present in the members table, for building the filter form.
#[derive(Debug, Serialize, PartialEq)]
pub struct FilterChoices {
    pub ages: Vec<u32>,
    pub genders: Vec<String>,
    pub workout_types: Vec<String>,
}

impl FilterChoices {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut ages = BTreeSet::new();
        let mut genders = BTreeSet::new();
        let mut workout_types = BTreeSet::new();
        for r in dataset.members() {
            ages.insert(r.age);
            genders.insert(r.gender.clone());
            workout_types.insert(r.workout_type.clone());
        }
        Self {
            ages: ages.into_iter().collect(),
            genders: genders.into_iter().collect(),
            workout_types: workout_types.into_iter().collect(),
        }
    }
}

fn summary_response(state: &AppState, raw: &RawCriteria) -> Result<HttpResponse, Error> {
    let criteria = FilterCriteria::parse(raw)?;
    let view = filter(state.dataset.members(), &criteria);
    Ok(HttpResponse::Ok().json(aggregate::summary(&view)))
}

fn chart_response(
    state: &AppState,
    slug: &str,
    raw: &RawCriteria,
    options: &RenderOptions,
) -> Result<HttpResponse, Error> {
    let kind: ChartKind = slug.parse()?;
    let criteria = FilterCriteria::parse(raw)?;
    let view = filter(state.dataset.members(), &criteria);
    let rendered = chart::render(kind, &view, options)?;
    Ok(HttpResponse::Ok()
        .content_type(rendered.content_type())
        .body(rendered.bytes))
}

/// Summary with filters from the query string
async fn summary_get(
    state: web::Data<AppState>,
    query: web::Query<RawCriteria>,
) -> Result<HttpResponse, Error> {
    summary_response(&state, &query)
}

/// Summary with filters from a submitted form. A POST without a form body
/// means no filters.
async fn summary_post(
    state: web::Data<AppState>,
    form: Option<web::Form<RawCriteria>>,
) -> Result<HttpResponse, Error> {
    summary_response(&state, &form_or_default(form))
}

async fn chart_get(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<RawCriteria>,
    options: web::Query<RenderOptions>,
) -> Result<HttpResponse, Error> {
    chart_response(&state, &path, &query, &options)
}

async fn chart_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    form: Option<web::Form<RawCriteria>>,
    options: web::Query<RenderOptions>,
) -> Result<HttpResponse, Error> {
    chart_response(&state, &path, &form_or_default(form), &options)
}

fn form_or_default(form: Option<web::Form<RawCriteria>>) -> RawCriteria {
    form.map(web::Form::into_inner).unwrap_or_default()
}

async fn filter_choices(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(FilterChoices::from_dataset(&state.dataset))
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "members": state.dataset.members().len(),
        "exercises": state.dataset.exercises().len(),
    }))
}

/// Register all routes. Fixed paths come before the chart catch-all.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .route("/", web::get().to(summary_get))
        .route("/", web::post().to(summary_post))
        .route("/filters", web::get().to(filter_choices))
        .route("/health", web::get().to(health_check))
        .route("/{chart}", web::get().to(chart_get))
        .route("/{chart}", web::post().to(chart_post));
}

/// Malformed query strings get the same JSON error body as every other 400.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| Error::invalid(err.to_string()).into())
}

/// Start the HTTP server over an already loaded dataset
pub async fn run_server(host: &str, port: u16, dataset: Arc<Dataset>) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(dataset));

    log::info!("gymstats listening on http://{}:{}", host, port);
    for kind in ChartKind::ALL {
        log::info!("chart: http://{}:{}/{}", host, port, kind.slug());
    }

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((host, port))?
    .run()
    .await
}
