use actix_web::{web, Scope};

pub mod handlers;
pub mod password;

/// Signup is only routed when enabled
pub fn auth_service(signups_enabled: bool) -> Scope {
    let scope = web::scope("/auth");
    if signups_enabled {
        scope.service(handlers::signup)
    } else {
        scope
    }
}
