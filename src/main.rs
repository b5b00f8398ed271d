use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};

use wanderplan_api::{
    config::AppConfig,
    db,
    routes,
    services::{
        itinerary_generation_service::{GeminiClient, ItineraryGenerator},
        preference_service::{MongoPreferenceStore, PreferenceService},
    },
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    info!("Application starting...");

    let config = AppConfig::from_env();
    info!("Attempting to bind to {}:{}", config.host, config.port);

    let mongo_uri = config.mongo_uri.clone().expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let preferences = web::Data::new(PreferenceService::new(MongoPreferenceStore::new(
        client.clone(),
    )));

    let generator = match GeminiClient::new(&config) {
        Ok(oracle) => Some(ItineraryGenerator::new(oracle, config.sample_fallback)),
        Err(e) => {
            warn!("Itinerary generation disabled: {}", e);
            None
        }
    };
    let generator = web::Data::new(generator);

    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    info!("Starting HTTP server...");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(client.clone()))
            .app_data(config.clone())
            .app_data(preferences.clone())
            .app_data(generator.clone())
            .route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/preferences/{user_id}")
                            .route(
                                "/interactions",
                                web::post().to(
                                    routes::preferences::record_interaction::<MongoPreferenceStore>,
                                ),
                            )
                            .route(
                                "/insights",
                                web::get()
                                    .to(routes::preferences::insights::<MongoPreferenceStore>),
                            ),
                    )
                    .service(
                        web::scope("/estimates")
                            .route("/budget", web::post().to(routes::estimates::budget))
                            .route(
                                "/breakdown",
                                web::post().to(routes::estimates::budget_breakdown),
                            )
                            .route(
                                "/minimum-budget",
                                web::post().to(routes::estimates::minimum_budget),
                            )
                            .route("/carbon", web::post().to(routes::estimates::carbon)),
                    )
                    .route(
                        "/destinations/{name}/safety",
                        web::get().to(routes::estimates::safety),
                    )
                    .service(
                        web::scope("/trips")
                            .route("", web::get().to(routes::trips::list))
                            .route("/generate", web::post().to(routes::trips::generate))
                            .route("/{id}", web::get().to(routes::trips::get_by_id)),
                    ),
            )
    })
    .bind(bind)?
    .run()
    .await
}
