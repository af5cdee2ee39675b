pub mod assignments;
pub mod auth;
pub mod dashboard;
pub mod submissions;
pub mod users;
pub mod withdrawals;

use actix_web::web;

use crate::live::session;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (register/login are public, the rest need a JWT) ──
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/logout", web::post().to(auth::logout))
            .route("/me", web::get().to(auth::me))
            .route("/profile", web::put().to(auth::update_profile)),
    );

    // ── User routes (admin only) ──
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(users::get_users))
            .route("/{id}", web::get().to(users::get_user))
            .route("/{id}/approve", web::post().to(users::approve_user))
            .route("/{id}/reject", web::post().to(users::reject_user)),
    );

    // ── Assignment routes ──
    cfg.service(
        web::scope("/assignments")
            .route("", web::get().to(assignments::get_assignments))
            .route("", web::post().to(assignments::create_assignment))
            .route("/{id}", web::get().to(assignments::get_assignment))
            .route("/{id}", web::put().to(assignments::update_assignment))
            .route("/{id}", web::delete().to(assignments::delete_assignment))
            .route("/{id}/status", web::put().to(assignments::update_status)),
    );

    // ── Submission routes ──
    cfg.service(
        web::scope("/submissions")
            .route("", web::get().to(submissions::get_submissions))
            .route("", web::post().to(submissions::create_submission))
            .route("/{id}/review", web::put().to(submissions::review_submission)),
    );

    // ── Withdrawal routes ──
    // `/balance` is registered before `/{id}/...` so it is never read as an id.
    cfg.service(
        web::scope("/withdrawals")
            .route("", web::get().to(withdrawals::get_withdrawals))
            .route("", web::post().to(withdrawals::create_withdrawal))
            .route("/balance", web::get().to(withdrawals::get_balance))
            .route("/{id}/settle", web::put().to(withdrawals::settle_withdrawal)),
    );

    cfg.service(
        web::scope("/dashboard")
            .route("/admin", web::get().to(dashboard::admin_stats))
            .route("/me", web::get().to(dashboard::my_summary)),
    );

    // ── Live view sync (token in the query string) ──
    cfg.route("/live/ws", web::get().to(session::ws_connect));
}
