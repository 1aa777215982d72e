use std::env;

use actix_web::middleware::Logger;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rs_gib_core::{Error, MarkovModel};
use serde::{Deserialize, Serialize};

/// Default model location, overridden by `GIB_MODEL`.
const DEFAULT_MODEL_PATH: &str = "./data/model.bin";

/// Default listen address, overridden by `GIB_BIND`.
const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Longest string `/v1/generate` will produce.
const MAX_GENERATE_LENGTH: usize = 4096;

/// Query parameters for the `/v1/score` and `/v1/classify` endpoints
#[derive(Deserialize)]
struct TextQuery {
	text: String,
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	length: Option<usize>,
	seed: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ScoreResponse {
	score: f64,
	log_likelihood: f64,
	good: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ClassifyResponse {
	good: bool,
}

/// The model is only read after loading, so handlers share it without a lock.
struct SharedData {
	model: MarkovModel,
}

/// HTTP GET endpoint `/v1/score`
///
/// Returns the score and raw log-likelihood of `text`, plus the verdict when
/// the model is calibrated.
#[get("/v1/score")]
async fn get_score(data: web::Data<SharedData>, query: web::Query<TextQuery>) -> impl Responder {
	match data.model.assess(&query.text) {
		Ok(assessment) => HttpResponse::Ok().json(ScoreResponse {
			score: assessment.score,
			log_likelihood: assessment.likelihood.sum,
			good: assessment.good,
		}),
		Err(e @ Error::UnscorableInput { .. }) => HttpResponse::BadRequest().body(e.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

#[get("/v1/classify")]
async fn get_classify(data: web::Data<SharedData>, query: web::Query<TextQuery>) -> impl Responder {
	match data.model.classify(&query.text) {
		Ok(good) => HttpResponse::Ok().json(ClassifyResponse { good }),
		Err(e @ Error::Uncalibrated) => HttpResponse::Conflict().body(e.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Each request draws from its own random source, seeded when `seed` is given.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let length = query.length.unwrap_or(40);
	if length > MAX_GENERATE_LENGTH {
		return HttpResponse::BadRequest().body(format!("length must be <= {MAX_GENERATE_LENGTH}"));
	}

	let mut rng = match query.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	};
	HttpResponse::Ok().body(data.model.generate(length, &mut rng))
}

#[get("/v1/model")]
async fn get_model(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().json(data.model.summary())
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_score)
		.service(get_classify)
		.service(get_generated)
		.service(get_model);
}

/// Main entry point for the server.
///
/// Loads the model once, wraps it in `web::Data` (an `Arc`) and starts an
/// Actix-web HTTP server.
///
/// # Notes
/// - `GIB_MODEL` selects the model file, `GIB_BIND` the listen address.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let model_path = env::var("GIB_MODEL").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_owned());
	let bind = env::var("GIB_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());

	let model = MarkovModel::load(&model_path)
		.map_err(|e| std::io::Error::other(format!("cannot load model {model_path}: {e}")))?;
	info!("serving {}-gram model {model_path} on {bind}", model.n());

	let shared_data = web::Data::new(SharedData { model });

	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.app_data(shared_data.clone())
			.configure(routes)
	})
		.bind(bind)?
		.run()
		.await
}
