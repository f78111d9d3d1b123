use crate::{
    api::{attendance, holiday, leave_request},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let mark_limiter = Arc::new(build_limiter(config.rate_mark_per_min));
    let leave_limiter = Arc::new(build_limiter(config.rate_leave_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // All routes sit behind the auth middleware; the identity provider that
    // mints the bearer tokens lives outside this service.
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .wrap(mark_limiter.clone())
                            .route(web::post().to(attendance::mark_attendance)),
                    )
                    // /attendance/today
                    .service(web::resource("/today").route(web::get().to(attendance::today)))
                    // /attendance/stats
                    .service(
                        web::resource("/stats").route(web::get().to(attendance::attendance_stats)),
                    )
                    // /attendance/stream
                    .service(web::resource("/stream").route(web::get().to(attendance::stream))),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .wrap(leave_limiter.clone())
                            .route(web::post().to(leave_request::create_leave))
                            .route(web::get().to(leave_request::leave_list)),
                    )
                    // /leave/approved/count
                    .service(
                        web::resource("/approved/count")
                            .route(web::get().to(leave_request::approved_count)),
                    )
                    // /leave/{user_id}/{day_key}/approve
                    .service(
                        web::resource("/{user_id}/{day_key}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{user_id}/{day_key}/reject
                    .service(
                        web::resource("/{user_id}/{day_key}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/holidays")
                    // /holidays
                    .service(web::resource("").route(web::get().to(holiday::list_holidays))),
            ),
    );
}
