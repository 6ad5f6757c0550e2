use crate::{
    api::{attendance, home, scan, students},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let scan_limiter = Arc::new(build_limiter(config.rate_scan_per_min));
    let public_limiter = Arc::new(build_limiter(config.rate_public_per_min));

    cfg.service(home::index);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(public_limiter)
            .service(
                web::scope("/students")
                    // /students
                    .service(
                        web::resource("")
                            .wrap(register_limiter)
                            .route(web::post().to(students::register_student)),
                    )
                    // /students/{id}
                    .service(web::resource("/{id}").route(web::get().to(students::get_student)))
                    // /students/{id}/qr
                    .service(web::resource("/{id}/qr").route(web::get().to(students::student_qr))),
            )
            .service(
                web::scope("/scan")
                    // /scan
                    .service(
                        web::resource("")
                            .wrap(scan_limiter)
                            .route(web::post().to(scan::scan)),
                    )
                    // /scan/recent
                    .service(web::resource("/recent").route(web::get().to(scan::recent_scans))),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::list_attendance)))
                    // /attendance/export
                    .service(
                        web::resource("/export").route(web::get().to(attendance::export_attendance)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_app;
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, init_service, try_call_service};

    #[test]
    fn zero_rate_does_not_panic() {
        let _ = build_limiter(0);
        let _ = build_limiter(100_000);
    }

    #[actix_web::test]
    async fn unknown_route_is_404() {
        let (app, _) = test_app().await;
        let resp = call_service(
            &app,
            TestRequest::get()
                .uri("/api/courses")
                .peer_addr("127.0.0.1:40000".parse().unwrap())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn registration_is_rate_limited() {
        let config = Config {
            rate_register_per_min: 1,
            ..Config::default()
        };
        let state = web::Data::new(crate::state::AppState::new(
            std::sync::Arc::new(crate::store::memory::MemoryStore::default()),
            &config,
        ));
        let app = init_service(
            actix_web::App::new()
                .app_data(state)
                .app_data(web::Data::new(config.clone()))
                .configure(|cfg| configure(cfg, &config)),
        )
        .await;

        let mut statuses = Vec::new();
        for roll in ["R-1", "R-2"] {
            let req = TestRequest::post()
                .uri("/api/students")
                .peer_addr("127.0.0.1:40000".parse().unwrap())
                .set_json(serde_json::json!({"name": "A", "roll_no": roll, "class": "C"}))
                .to_request();
            // the limiter may answer with an error instead of a response
            let status = match try_call_service(&app, req).await {
                Ok(resp) => resp.status(),
                Err(e) => e.as_response_error().status_code(),
            };
            statuses.push(status);
        }
        assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::TOO_MANY_REQUESTS]);
    }
}
