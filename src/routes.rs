use crate::{
    api::{leave_type, ledger, time_off},
    auth::{handlers, middleware::auth_middleware},
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

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/timeoff")
                    // /timeoff
                    .service(
                        web::resource("")
                            .route(web::get().to(time_off::list_requests))
                            .route(web::post().to(time_off::create_request)),
                    )
                    // /timeoff/{id}
                    .service(
                        web::resource("/{id}").route(web::get().to(time_off::get_request)),
                    )
                    // /timeoff/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(time_off::approve_request)),
                    )
                    // /timeoff/{id}/deny
                    .service(
                        web::resource("/{id}/deny").route(web::put().to(time_off::deny_request)),
                    )
                    // /timeoff/{id}/cancel
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(time_off::cancel_request)),
                    ),
            )
            .service(
                web::scope("/balance")
                    // /balance/target
                    .service(
                        web::resource("/target")
                            .route(web::post().to(ledger::set_target_balance)),
                    )
                    // /balance/{employee_id}
                    .service(
                        web::resource("/{employee_id}")
                            .route(web::get().to(ledger::get_balances)),
                    ),
            )
            .service(
                web::scope("/ledger")
                    // /ledger/adjustment
                    .service(
                        web::resource("/adjustment")
                            .route(web::post().to(ledger::post_adjustment)),
                    )
                    // /ledger/{employee_id}
                    .service(
                        web::resource("/{employee_id}").route(web::get().to(ledger::list_ledger)),
                    ),
            )
            .service(
                web::scope("/leave-type")
                    // /leave-type
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_type::list_leave_types))
                            .route(web::post().to(leave_type::create_leave_type)),
                    )
                    // /leave-type/{id}/retire
                    .service(
                        web::resource("/{id}/retire")
                            .route(web::put().to(leave_type::retire_leave_type)),
                    ),
            ),
    );
}
