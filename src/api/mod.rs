use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    RecycloseError,
    catalog::{self, Category, Item},
    config::RecycloseConfig,
    dropoff::{
        DropoffDirectory, DropoffMatch, FILTER_TAGS, FilterCriteria, FilterTag, RadiusOption,
        ServiceType, default_vocabulary,
    },
    geocoding::{GeocodingClient, PlaceCandidate},
    location::CURRENT_LOCATION_LABEL,
    map::MapAvailability,
    models::{DropoffPoint, GeoPoint},
    saved::SavedStore,
};

/// Shared state behind every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RecycloseConfig>,
    pub directory: Arc<DropoffDirectory>,
    pub saved: &'static SavedStore,
    pub geocoder: Option<GeocodingClient>,
}

impl AppState {
    /// Generate the directory and set up the geocoder. A missing map token
    /// only disables geocoding.
    pub fn new(config: RecycloseConfig, saved: &'static SavedStore) -> crate::Result<Self> {
        let directory =
            DropoffDirectory::generate(config.dropoff.point_count, &default_vocabulary())?;
        let geocoder = match GeocodingClient::new(&config.map) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Geocoding disabled: {}", e);
                None
            }
        };
        Ok(Self {
            config: Arc::new(config),
            directory: Arc::new(directory),
            saved,
            geocoder,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DropoffQuery {
    pub service: Option<String>,
    pub pickup: Option<bool>,
    /// Comma-separated tag keys
    pub categories: Option<String>,
    pub q: Option<String>,
    pub radius: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMatch {
    #[serde(flatten)]
    pub point: DropoffPoint,
    pub distance_meters: f64,
    pub distance_miles: f64,
    pub rating_label: String,
}

impl From<DropoffMatch<'_>> for ApiMatch {
    fn from(m: DropoffMatch<'_>) -> Self {
        Self {
            distance_miles: m.distance_miles(),
            distance_meters: m.distance_meters,
            rating_label: m.point.format_rating(),
            point: m.point.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDropoffResults {
    pub reference: GeoPoint,
    pub radius: RadiusOption,
    pub radius_label: String,
    pub count: usize,
    pub results: Vec<ApiMatch>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    #[serde(flatten)]
    pub category: &'static Category,
    pub item_count: usize,
}

impl From<&'static Category> for ApiCategory {
    fn from(category: &'static Category) -> Self {
        Self {
            category,
            item_count: catalog::items_in_category(category.key).len(),
        }
    }
}

#[derive(Serialize)]
pub struct ApiCategoryItems {
    pub category: ApiCategory,
    pub items: Vec<&'static Item>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiItem {
    #[serde(flatten)]
    pub item: &'static Item,
    pub saved: bool,
    pub dropoff_link: String,
}

#[derive(Serialize)]
pub struct ApiSaved {
    pub slugs: Vec<String>,
    pub items: Vec<&'static Item>,
}

#[derive(Serialize)]
pub struct ApiToggle {
    pub slug: String,
    pub saved: bool,
}

#[derive(Serialize)]
pub struct ApiLabel {
    pub label: String,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PointQuery {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct PlaceQuery {
    pub q: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/dropoffs", get(get_dropoffs))
        .route("/dropoffs/{id}", get(get_dropoff))
        .route("/filter-tags", get(get_filter_tags))
        .route("/catalog/categories", get(get_categories))
        .route("/catalog/categories/{key}", get(get_category))
        .route("/catalog/items", get(search_items))
        .route("/catalog/items/{slug}", get(get_item))
        .route("/saved", get(get_saved).delete(clear_saved))
        .route("/saved/{slug}/toggle", post(toggle_saved))
        .route("/map", get(get_map))
        .route("/geocode/reverse", get(reverse_geocode))
        .route("/geocode/search", get(search_places))
        .with_state(state)
}

fn error_status(err: RecycloseError) -> StatusCode {
    match err {
        RecycloseError::Validation { .. } => StatusCode::BAD_REQUEST,
        RecycloseError::Config { .. } => StatusCode::SERVICE_UNAVAILABLE,
        RecycloseError::Api { .. } => StatusCode::BAD_GATEWAY,
        other => {
            error!("Request failed: {}", other);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Status plus a message the page can show as-is
fn error_response(err: RecycloseError) -> (StatusCode, Json<ApiErrorBody>) {
    let body = ApiErrorBody {
        error: err.user_message(),
    };
    (error_status(err), Json(body))
}

fn criteria_from_query(
    query: &DropoffQuery,
    default_radius: RadiusOption,
) -> crate::Result<FilterCriteria> {
    let service_type = match query.service.as_deref() {
        Some(s) => s.parse::<ServiceType>()?,
        None => ServiceType::Any,
    };
    let radius = match query.radius.as_deref() {
        Some(r) => r.parse::<RadiusOption>()?,
        None => default_radius,
    };
    let categories = query
        .categories
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    FilterCriteria::builder()
        .service_type(service_type)
        .pickup_only(query.pickup.unwrap_or(false))
        .categories(categories)
        .text_query(query.q.clone().unwrap_or_default())
        .radius(radius)
        .build()
}

fn reference_from_query(
    query: &DropoffQuery,
    config: &RecycloseConfig,
) -> crate::Result<GeoPoint> {
    match (query.lng, query.lat) {
        (Some(lng), Some(lat)) => GeoPoint::new(lng, lat),
        (None, None) => config.default_center(),
        _ => Err(RecycloseError::validation(
            "lat and lng must be given together",
        )),
    }
}

async fn get_dropoffs(
    State(state): State<AppState>,
    Query(query): Query<DropoffQuery>,
) -> Result<Json<ApiDropoffResults>, StatusCode> {
    let criteria =
        criteria_from_query(&query, state.config.dropoff.default_radius).map_err(error_status)?;
    let reference = reference_from_query(&query, &state.config).map_err(error_status)?;

    let results: Vec<ApiMatch> = state
        .directory
        .search(&criteria, reference)
        .map_err(error_status)?
        .into_iter()
        .map(ApiMatch::from)
        .collect();

    Ok(Json(ApiDropoffResults {
        reference,
        radius: criteria.radius(),
        radius_label: criteria.radius().label(),
        count: results.len(),
        results,
    }))
}

async fn get_dropoff(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DropoffPoint>, StatusCode> {
    state
        .directory
        .find(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_filter_tags() -> Json<&'static [FilterTag]> {
    Json(FILTER_TAGS)
}

async fn get_categories() -> Json<Vec<ApiCategory>> {
    Json(catalog::categories().iter().map(ApiCategory::from).collect())
}

async fn get_category(Path(key): Path<String>) -> Result<Json<ApiCategoryItems>, StatusCode> {
    let category = catalog::category(&key).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ApiCategoryItems {
        items: catalog::items_in_category(category.key),
        category: ApiCategory::from(category),
    }))
}

async fn search_items(Query(query): Query<SearchQuery>) -> Json<Vec<ApiCategoryItems>> {
    let groups = catalog::search(query.q.as_deref().unwrap_or_default())
        .into_iter()
        .map(|(category, items)| ApiCategoryItems {
            category: ApiCategory::from(category),
            items,
        })
        .collect();
    Json(groups)
}

async fn get_item(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiItem>, StatusCode> {
    let item = catalog::item(&slug).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ApiItem {
        saved: state.saved.is_saved(&item.slug),
        dropoff_link: item.dropoff_link(),
        item,
    }))
}

async fn get_saved(State(state): State<AppState>) -> Json<ApiSaved> {
    let slugs = state.saved.slugs();
    let items = catalog::items_by_slugs(&slugs);
    Json(ApiSaved { slugs, items })
}

async fn toggle_saved(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiToggle>, StatusCode> {
    if catalog::item(&slug).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }
    let saved = state.saved.toggle(&slug).map_err(error_status)?;
    Ok(Json(ApiToggle { slug, saved }))
}

async fn clear_saved(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    state.saved.clear().map_err(error_status)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_map(State(state): State<AppState>) -> Json<MapAvailability> {
    Json(MapAvailability::from_config(&state.config))
}

async fn reverse_geocode(
    State(state): State<AppState>,
    Query(query): Query<PointQuery>,
) -> Result<Json<ApiLabel>, StatusCode> {
    let point = GeoPoint::new(query.lng, query.lat).map_err(error_status)?;
    let label = match &state.geocoder {
        Some(geocoder) => geocoder.resolve_label(point, CURRENT_LOCATION_LABEL).await,
        None => CURRENT_LOCATION_LABEL.to_string(),
    };
    Ok(Json(ApiLabel { label }))
}

async fn search_places(
    State(state): State<AppState>,
    Query(query): Query<PlaceQuery>,
) -> Result<Json<Vec<PlaceCandidate>>, (StatusCode, Json<ApiErrorBody>)> {
    let geocoder = state
        .geocoder
        .as_ref()
        .ok_or_else(|| error_response(RecycloseError::config("no map access token configured")))?;
    let proximity = match (query.lng, query.lat) {
        (Some(lng), Some(lat)) => Some(GeoPoint::new(lng, lat).map_err(error_response)?),
        _ => None,
    };
    let candidates = geocoder
        .forward_geocode(&query.q, proximity)
        .await
        .map_err(error_response)?;
    Ok(Json(candidates))
}
