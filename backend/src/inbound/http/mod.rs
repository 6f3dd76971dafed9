//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod orders;
pub mod products;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler plus the extractor error handlers.
///
/// Mount under a scope:
///
/// ```ignore
/// App::new().service(web::scope("/api/v1").configure(configure_api))
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PayloadConfig::new(uploads::MAX_IMAGE_BYTES))
        .service(users::register)
        .service(users::login)
        .service(users::current_user)
        .service(users::logout)
        .service(users::update_profile)
        .service(users::forgot_password)
        .service(users::reset_password)
        .service(products::list_products)
        .service(products::create_product)
        .service(products::get_product)
        .service(products::delete_product)
        .service(products::hide_product)
        .service(products::restore_product)
        .service(orders::place_order)
        .service(orders::my_orders)
        .service(orders::all_orders)
        .service(orders::set_order_status)
        .service(orders::cancel_order)
        .service(orders::update_estimate)
        .service(orders::mark_delivered)
        .service(orders::delete_order)
        .service(uploads::upload_image);
}
