pub mod admin;
pub mod public;
pub mod user;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    public::configure(cfg);
    user::configure(cfg);
    admin::configure(cfg);
}
