//! JSON routes over the reference data and the geometry engine.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use deck_core::geometry::{validate_geometry, GeometryRequest};
use deck_core::loading::CustomLoadingRequest;
use deck_core::reference::{ClimateData, ReferenceData};
use deck_core::DeckError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Clone)]
pub struct AppState {
    reference: Arc<dyn ReferenceData + Send + Sync>,
}

impl AppState {
    pub fn new(reference: Arc<dyn ReferenceData + Send + Sync>) -> Self {
        AppState { reference }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/locations/", get(list_locations))
        .route("/locations/lookup/", get(lookup_location))
        .route("/custom-loading/", post(custom_loading))
        .route("/materials/", get(list_materials))
        .route("/geometry/validate/", post(geometry_validate))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    pub state: Option<String>,
    pub district: Option<String>,
}

#[derive(Serialize)]
struct LocationView<'a> {
    state: &'a str,
    district: &'a str,
    #[serde(flatten)]
    climate: &'a ClimateData,
}

fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": message.into() }))).into_response()
}

/// 400 carrying the structured error
fn bad_request(err: &DeckError) -> Response {
    let body = json!({
        "detail": err.to_string(),
        "code": err.error_code(),
        "error": err,
    });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        log::debug!("rejecting malformed request body: {}", e);
        bad_request(&DeckError::serialization(e.to_string()))
    })
}

pub async fn list_locations(State(state): State<AppState>) -> Response {
    match state.reference.list_locations() {
        Ok(payload) => Json(&*payload).into_response(),
        Err(err) => {
            log::warn!("{}", err);
            detail(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
    }
}

pub async fn lookup_location(State(state): State<AppState>, Query(params): Query<LookupParams>) -> Response {
    let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let (Some(state_name), Some(district_name)) = (non_blank(params.state), non_blank(params.district)) else {
        return detail(
            StatusCode::BAD_REQUEST,
            "state and district query parameters are required.",
        );
    };

    match state.reference.get_location(&state_name, &district_name) {
        Ok(record) => Json(LocationView {
            state: &record.state,
            district: &record.district,
            climate: &record.climate,
        })
        .into_response(),
        Err(DeckError::LocationNotFound { .. }) => detail(StatusCode::NOT_FOUND, "Location not found."),
        Err(err) => detail(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

pub async fn custom_loading(body: Bytes) -> Response {
    let request: CustomLoadingRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match request.validate() {
        Ok(values) => Json(json!({
            "message": "Custom loading parameters captured successfully.",
            "values": values,
        }))
        .into_response(),
        Err(err) => bad_request(&err),
    }
}

pub async fn list_materials(State(state): State<AppState>) -> Response {
    match state.reference.materials_by_category() {
        Ok(listing) => Json(listing).into_response(),
        Err(err) => {
            log::warn!("{}", err);
            detail(StatusCode::SERVICE_UNAVAILABLE, "Material catalog not loaded.")
        }
    }
}

pub async fn geometry_validate(body: Bytes) -> Response {
    let request: GeometryRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let input = match request.validate() {
        Ok(input) => input,
        Err(err) => return bad_request(&err),
    };

    let report = validate_geometry(&input);
    let status = if report.is_valid {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(report)).into_response()
}

pub async fn health(State(state): State<AppState>) -> Response {
    let locations = state
        .reference
        .list_locations()
        .map(|payload| payload.district_count())
        .unwrap_or(0);
    let materials = state
        .reference
        .materials_by_category()
        .map(|listing| listing.girder_steel.len() + listing.cross_bracing_steel.len() + listing.deck_concrete.len())
        .unwrap_or(0);
    Json(json!({ "status": "ok", "locations": locations, "materials": materials })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::reference::{MaterialCategory, ReferenceService};
    use deck_core::store::ReferenceStore;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn loaded_state() -> AppState {
        let mut store = ReferenceStore::new();
        store.upsert_location(
            "Kerala",
            "Idukki",
            ClimateData {
                basic_wind_speed: Some(39.0),
                seismic_zone: "III".to_string(),
                seismic_factor: Some(0.16),
                max_temp: Some(38.0),
                min_temp: Some(14.0),
            },
        );
        store.upsert_location("Goa", "North Goa", ClimateData::default());
        store.upsert_material(MaterialCategory::GirderSteel, "E250");
        store.upsert_material(MaterialCategory::DeckConcrete, "M30");
        AppState::new(Arc::new(ReferenceService::new(store)))
    }

    fn empty_state() -> AppState {
        AppState::new(Arc::new(ReferenceService::default()))
    }

    async fn read(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn lookup(state: &str, district: &str) -> Query<LookupParams> {
        Query(LookupParams {
            state: Some(state.to_string()),
            district: Some(district.to_string()),
        })
    }

    #[tokio::test]
    async fn test_locations_payload() {
        let (status, body) = read(list_locations(State(loaded_state())).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["states"], json!(["Goa", "Kerala"]));
        assert_eq!(body["districts"]["Kerala"][0]["seismic_zone"], "III");
    }

    #[tokio::test]
    async fn test_unloaded_catalogs_are_unavailable() {
        let (status, body) = read(list_locations(State(empty_state())).await).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["detail"].as_str().unwrap().contains("ingest-locations"));

        let (status, body) = read(list_materials(State(empty_state())).await).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "Material catalog not loaded.");
    }

    #[tokio::test]
    async fn test_lookup() {
        let (status, body) = read(lookup_location(State(loaded_state()), lookup(" kerala", "IDUKKI ")).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "state": "Kerala",
                "district": "Idukki",
                "basic_wind_speed": 39.0,
                "seismic_zone": "III",
                "seismic_factor": 0.16,
                "max_temp": 38.0,
                "min_temp": 14.0
            })
        );

        let (status, _) = read(lookup_location(State(loaded_state()), lookup("Kerala", "Kollam")).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let missing = Query(LookupParams {
            state: Some("Kerala".to_string()),
            district: None,
        });
        let (status, _) = read(lookup_location(State(loaded_state()), missing).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_materials() {
        let (status, body) = read(list_materials(State(loaded_state())).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "girder_steel": ["E250"], "cross_bracing_steel": [], "deck_concrete": ["M30"] })
        );
    }

    #[tokio::test]
    async fn test_custom_loading() {
        let ok = Bytes::from_static(
            br#"{"wind": 45, "seismic_zone": "III", "seismic_factor": 0.16, "max_temp": 40, "min_temp": 28}"#,
        );
        let (status, body) = read(custom_loading(ok).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Custom loading parameters captured successfully.");
        assert_eq!(body["values"]["seismic_zone"], "III");

        let inverted = Bytes::from_static(
            br#"{"wind": 45, "seismic_zone": "III", "seismic_factor": 0.16, "max_temp": 10, "min_temp": 28}"#,
        );
        let (status, body) = read(custom_loading(inverted).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_geometry_validate() {
        let balanced = Bytes::from_static(
            br#"{"span": 30, "carriageway_width": 8.5, "skew_angle": 0, "girder_spacing": 2.2,
                 "girder_count": 4, "deck_overhang": 1.75, "changed_field": "girder_spacing"}"#,
        );
        let (status, body) = read(geometry_validate(balanced).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_valid"], true);
        assert_eq!(body["geometry"]["girder_count"], 5);

        let short_span = Bytes::from_static(
            br#"{"span": 10, "carriageway_width": 8.5, "skew_angle": 0, "girder_spacing": 2.5,
                 "girder_count": 4, "deck_overhang": 1.75}"#,
        );
        let (status, body) = read(geometry_validate(short_span).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["is_valid"], false);
        assert!(body["errors"]["span"].is_string());
    }

    #[tokio::test]
    async fn test_geometry_accepts_form_style_numbers() {
        let form = Bytes::from_static(
            br#"{"span": "30", "carriageway_width": "8.5", "skew_angle": "0", "girder_spacing": 2.0,
                 "girder_count": 4.0, "deck_overhang": "2.25", "changed_field": "girder_spacing"}"#,
        );
        let (status, body) = read(geometry_validate(form).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["geometry"]["girder_count"], 4);
        assert_eq!(body["geometry"]["girder_spacing"], 2.2);
        assert_eq!(body["geometry"]["deck_overhang"], 2.3);

        let fractional = Bytes::from_static(
            br#"{"span": 30, "carriageway_width": 8.5, "skew_angle": 0, "girder_spacing": 2.5,
                 "girder_count": 4.5, "deck_overhang": 1.75}"#,
        );
        let (status, body) = read(geometry_validate(fractional).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SERIALIZATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_geometry_requests() {
        let (status, body) = read(geometry_validate(Bytes::from_static(b"{not json")).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SERIALIZATION_ERROR");

        let bad_choice = Bytes::from_static(
            br#"{"span": 30, "carriageway_width": 8.5, "skew_angle": 0, "girder_spacing": 2.5,
                 "girder_count": 4, "deck_overhang": 1.75, "changed_field": "span"}"#,
        );
        let (status, body) = read(geometry_validate(bad_choice).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["field"], "changed_field");
    }

    #[tokio::test]
    async fn test_health_counts() {
        let (status, body) = read(health(State(loaded_state())).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "locations": 2, "materials": 2 }));
    }
}
