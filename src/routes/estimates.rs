use crate::models::estimate::{
    BreakdownRequest, BudgetRequest, CarbonRequest, MinimumBudgetRequest,
};
use crate::services::budget_service::{
    breakdown, coerce_amount, coerce_days, estimate_budget, parse_travelers,
    validate_minimum_budget,
};
use crate::services::carbon_service::{estimate_carbon, TransportMode};
use crate::services::reference_data::safety_profile;
use actix_web::{web, HttpResponse, Responder};

/*
    POST /api/estimates/budget
*/
pub async fn budget(input: web::Json<BudgetRequest>) -> impl Responder {
    let travelers = parse_travelers(&input.travelers);
    let days = coerce_days(input.days);

    HttpResponse::Ok().json(estimate_budget(travelers, days))
}

/*
    POST /api/estimates/breakdown
*/
pub async fn budget_breakdown(input: web::Json<BreakdownRequest>) -> impl Responder {
    HttpResponse::Ok().json(breakdown(coerce_amount(input.total)))
}

/*
    POST /api/estimates/minimum-budget
*/
pub async fn minimum_budget(input: web::Json<MinimumBudgetRequest>) -> impl Responder {
    let check = validate_minimum_budget(
        &input.destination,
        parse_travelers(&input.travelers),
        coerce_days(input.days),
        coerce_amount(input.budget),
    );

    HttpResponse::Ok().json(check)
}

/*
    POST /api/estimates/carbon
*/
pub async fn carbon(input: web::Json<CarbonRequest>) -> impl Responder {
    let mode = input.transport.unwrap_or(TransportMode::Flight);

    HttpResponse::Ok().json(estimate_carbon(&input.destination, mode))
}

/*
    GET /api/destinations/{name}/safety
*/
pub async fn safety(path: web::Path<String>) -> impl Responder {
    HttpResponse::Ok().json(safety_profile(&path.into_inner()))
}
