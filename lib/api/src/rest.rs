use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{error, web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::Deserialize;
use songrec_core::{Error, RecommendRequest, Recommender, Response, Strategy};
use std::sync::Arc;
use tracing::{debug, info};

/// Body of both recommendation endpoints. Identifiers are accepted as any JSON
/// value; numbers are turned into their decimal string form and any other
/// non-null type is rejected.
#[derive(Deserialize, Default)]
struct RecommendBody {
    #[serde(default)]
    song: Option<serde_json::Value>,
    #[serde(default)]
    user: Option<serde_json::Value>,
}

fn identifier(field: &str, value: Option<serde_json::Value>) -> Result<Option<String>, Error> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(Error::InvalidField(field.to_string())),
    }
}

impl RecommendBody {
    /// Only the identifier `strategy` reads is checked
    fn into_request(self, strategy: Strategy) -> Result<RecommendRequest, Error> {
        Ok(match strategy {
            Strategy::Similarity => RecommendRequest {
                song: identifier("song", self.song)?,
                user: None,
            },
            Strategy::Affinity => RecommendRequest {
                song: None,
                user: identifier("user", self.user)?,
            },
        })
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(
        recommender: Arc<Recommender>,
        host: &str,
        port: u16,
    ) -> std::io::Result<()> {
        info!("Binding HTTP API to {}:{}", host, port);
        HttpServer::new(move || {
            App::new()
                .wrap(Self::cors())
                .app_data(web::Data::new(recommender.clone()))
                .configure(Self::configure)
        })
        .bind((host, port))?
        .run()
        .await
    }

    pub fn cors() -> Cors {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600)
    }

    /// Register the routes; expects `web::Data<Arc<Recommender>>` in app data
    pub fn configure(cfg: &mut web::ServiceConfig) {
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            let body = serde_json::json!({ "error": err.to_string() });
            error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
        });

        cfg.app_data(json_config)
            .route("/", web::get().to(home))
            .route("/recommend/content", web::post().to(recommend_content))
            .route("/recommend/collaborative", web::post().to(recommend_collaborative));
    }
}

fn status_for(e: &Error) -> StatusCode {
    match e {
        Error::ItemNotFound(_) => StatusCode::NOT_FOUND,
        Error::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        Error::SchemaUnsupported => StatusCode::UNPROCESSABLE_ENTITY,
        Error::MissingField(_) | Error::InvalidField(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond(recommender: &Recommender, strategy: Strategy, body: RecommendBody) -> HttpResponse {
    let result = match body.into_request(strategy) {
        Ok(request) => recommender.try_recommend(strategy, &request),
        // a missing model outranks a malformed user field
        Err(_) if strategy == Strategy::Affinity && !recommender.affinity_available() => {
            recommender.try_recommend(strategy, &RecommendRequest::default())
        }
        Err(e) => {
            debug!(?strategy, error = %e, "recommendation rejected");
            Err(e)
        }
    };
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => status_for(e),
    };
    HttpResponse::build(status).json(Response::from(result))
}

async fn home() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Music Recommendation API is running"
    })))
}

async fn recommend_content(
    recommender: web::Data<Arc<Recommender>>,
    req: web::Json<RecommendBody>,
) -> ActixResult<HttpResponse> {
    Ok(respond(&recommender, Strategy::Similarity, req.into_inner()))
}

async fn recommend_collaborative(
    recommender: web::Data<Arc<Recommender>>,
    req: web::Json<RecommendBody>,
) -> ActixResult<HttpResponse> {
    Ok(respond(&recommender, Strategy::Affinity, req.into_inner()))
}
