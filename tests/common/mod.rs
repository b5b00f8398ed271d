use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};

use wanderplan_api::routes;
use wanderplan_api::services::preference_service::{InMemoryPreferenceStore, PreferenceService};

pub struct TestApp {
    pub preferences: web::Data<PreferenceService<InMemoryPreferenceStore>>,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            preferences: web::Data::new(PreferenceService::new(InMemoryPreferenceStore::new())),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.preferences.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/preferences/{user_id}")
                            .route(
                                "/interactions",
                                web::post().to(
                                    routes::preferences::record_interaction::<
                                        InMemoryPreferenceStore,
                                    >,
                                ),
                            )
                            .route(
                                "/insights",
                                web::get()
                                    .to(routes::preferences::insights::<InMemoryPreferenceStore>),
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
                    ),
            )
    }
}
