use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::Serialize;
use std::sync::Mutex;

use crate::config::ScheduleConfig;
use crate::display::render_report;
use crate::schedule::{Roster, RunResult, Scheduler};
use crate::sweep::{fitness, is_better, lock};

/// Shared by every request. The roster and config never change; `best`
/// is replaced when a fitter run comes in.
pub struct AppState {
    pub roster: Roster,
    pub config: ScheduleConfig,
    pub best: Mutex<Option<(f64, RunResult)>>,
}

impl AppState {
    pub fn new(roster: Roster, config: ScheduleConfig, best: Option<RunResult>) -> Self {
        let best = best.map(|run| (fitness(&run.stats, &config.fitness), run));
        Self {
            roster,
            config,
            best: Mutex::new(best),
        }
    }

    /// Keeps `run` if it beats the current best. Returns whether it did.
    pub fn offer(&self, run: RunResult) -> bool {
        let score = fitness(&run.stats, &self.config.fitness);
        let mut best = lock(&self.best);
        let better = is_better(score, run.seed, &best);
        if better {
            *best = Some((score, run));
        }
        better
    }
}

#[derive(Serialize)]
pub struct WorkerSummary {
    name: String,
    max_shifts: u32,
    available: usize,
}

#[derive(Serialize)]
pub struct RunResponse {
    result: RunResult,
    fitness: f64,
    new_best: bool,
}

fn no_result() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({"error": "No schedule has been computed yet"}))
}

// Best result as JSON
async fn get_result(state: web::Data<AppState>) -> Result<HttpResponse> {
    let best = lock(&state.best);
    match &*best {
        Some((_, run)) => Ok(HttpResponse::Ok().json(run)),
        None => Ok(no_result()),
    }
}

// Best result as the text report
async fn get_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    let best = lock(&state.best);
    match &*best {
        Some((_, run)) => {
            let text = render_report(state.roster.calendar(), run, &state.config.printing);
            Ok(HttpResponse::Ok().content_type("text/plain; charset=utf-8").body(text))
        }
        None => Ok(no_result()),
    }
}

async fn get_workers(state: web::Data<AppState>) -> Result<HttpResponse> {
    let workers: Vec<WorkerSummary> = state
        .roster
        .workers()
        .iter()
        .map(|w| WorkerSummary {
            name: w.name.clone(),
            max_shifts: w.max_shifts,
            available: w.slots.len(),
        })
        .collect();
    Ok(HttpResponse::Ok().json(workers))
}

// Runs one seed on the blocking pool
async fn run_seed(seed: web::Path<u64>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let seed = seed.into_inner();
    let data = state.clone();
    let outcome = web::block(move || Scheduler::new(&data.roster, &data.config.policy).run(seed))
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Run was cancelled: {}", e)))?;

    match outcome {
        Ok(result) => {
            let score = fitness(&result.stats, &state.config.fitness);
            let new_best = state.offer(result.clone());
            if new_best {
                tracing::info!(seed, fitness = score, "new best result from request");
            }
            Ok(HttpResponse::Ok().json(RunResponse {
                result,
                fitness: score,
                new_best,
            }))
        }
        Err(e) => Ok(HttpResponse::InternalServerError().json(serde_json::json!({
            "success": false,
            "error": e.to_string()
        }))),
    }
}

async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/result", web::get().to(get_result))
        .route("/api/schedule", web::get().to(get_schedule))
        .route("/api/workers", web::get().to(get_workers))
        .service(web::resource("/api/run/{seed}").route(web::post().to(run_seed)));
}

pub async fn start_server(state: AppState, port: u16) -> std::io::Result<()> {
    let app_state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Calendar, RequirementTable, WorkerInput};
    use actix_web::{http::StatusCode, test};

    fn state() -> AppState {
        let roster = Roster::new(
            Calendar::new(vec!["Mon".into()], vec!["AM".into(), "PM".into()]),
            RequirementTable::from_rows(vec![vec![1, 1]]),
            vec![
                WorkerInput {
                    name: "Ana".into(),
                    max_shifts: 1,
                    availability: vec![(0, 0, 0.9), (0, 1, 0.4)],
                    liked: vec![],
                },
                WorkerInput {
                    name: "Bo".into(),
                    max_shifts: 1,
                    availability: vec![(0, 0, 0.3), (0, 1, 0.8)],
                    liked: vec![],
                },
            ],
        )
        .unwrap();
        AppState::new(roster, ScheduleConfig::default(), None)
    }

    #[actix_web::test]
    async fn test_result_missing_until_run() {
        let app = test::init_service(App::new().app_data(web::Data::new(state())).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/result").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post().uri("/api/run/3").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["new_best"], true);
        assert_eq!(body["result"]["seed"], 3);

        let req = test::TestRequest::get().uri("/api/result").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["seed"], 3);
    }

    #[actix_web::test]
    async fn test_workers_and_schedule_text() {
        let app = test::init_service(App::new().app_data(web::Data::new(state())).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/workers").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["name"], "Ana");
        assert_eq!(body[1]["available"], 2);

        let req = test::TestRequest::post().uri("/api/run/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/api/schedule").to_request();
        let text = test::call_and_read_body(&app, req).await;
        let text = String::from_utf8(text.to_vec()).unwrap();
        assert!(text.contains("Ana on 1 out of 1 shifts"));
        assert!(text.contains("Stats (seed = 1):"));
    }

    #[::core::prelude::v1::test]
    fn test_offer_keeps_fitter_run() {
        let state = state();
        let run = Scheduler::new(&state.roster, &state.config.policy).run(1).unwrap();
        assert!(state.offer(run.clone()));
        // Same fitness, higher seed: not better.
        let mut later = run.clone();
        later.seed = 9;
        assert!(!state.offer(later));
        assert_eq!(lock(&state.best).as_ref().unwrap().1.seed, 1);
    }
}
