use crate::{
    api::{attendance, lecture},
    attendance::{error::AttendanceError, store::AttendanceStore},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::{Result, anyhow};
use std::sync::Arc;

type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Built once so every worker shares the same buckets.
#[derive(Clone)]
pub struct RateLimiters {
    check_in: Arc<Limiter>,
    api: Arc<Limiter>,
}

impl RateLimiters {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            check_in: Arc::new(build_limiter(config.rate_check_in_per_min)?),
            api: Arc::new(build_limiter(config.rate_api_per_min)?),
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} per minute"))?;

    Ok(Governor::new(&cfg))
}

pub fn configure<S: AttendanceStore>(
    cfg: &mut web::ServiceConfig,
    api_prefix: &str,
    limiters: RateLimiters,
) {
    cfg.service(
        web::scope(api_prefix)
            .service(
                web::scope("/attendance")
                    .wrap(limiters.check_in)
                    .configure(check_in_routes::<S>),
            )
            .service(
                web::scope("/lectures")
                    .wrap(limiters.api)
                    .configure(lecture_routes::<S>),
            ),
    );
}

pub fn check_in_routes<S: AttendanceStore>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected check-in body");
        AttendanceError::InvalidRequest("Malformed request body").into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected check-in query");
        AttendanceError::InvalidRequest("Malformed query string").into()
    }))
    // /attendance/check-in
    .service(web::resource("/check-in").route(web::post().to(attendance::check_in::<S>)))
    // /attendance/scan?studentCardId=..&lectureId=..
    .service(web::resource("/scan").route(web::get().to(attendance::scan::<S>)));
}

pub fn lecture_routes<S: AttendanceStore>(cfg: &mut web::ServiceConfig) {
    cfg
        // /lectures/{lecture_id}/attendance
        .service(
            web::resource("/{lecture_id}/attendance")
                .route(web::get().to(lecture::attendance_summary::<S>)),
        )
        // /lectures/{lecture_id}/finalize
        .service(
            web::resource("/{lecture_id}/finalize").route(web::post().to(lecture::finalize::<S>)),
        );
}
