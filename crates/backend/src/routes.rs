use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::handlers;

/// Максимальный размер загружаемого файла шаблона
const UPLOAD_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // Data sources
        .route(
            "/api/data_sources",
            get(handlers::data_sources::list_grouped),
        )
        // ========================================
        // A001 Report template
        // ========================================
        .route(
            "/api/report_template",
            get(handlers::a001_report_template::list_all)
                .post(handlers::a001_report_template::create),
        )
        .route(
            "/api/report_template/testdata",
            post(handlers::a001_report_template::insert_test_data),
        )
        .route(
            "/api/report_template/:id",
            get(handlers::a001_report_template::get_by_id)
                .delete(handlers::a001_report_template::delete),
        )
        .route(
            "/api/report_template/:id/fields",
            put(handlers::a001_report_template::update_fields),
        )
        .route(
            "/api/report_template/:id/file",
            post(handlers::a001_report_template::replace_file),
        )
        .route(
            "/api/report_template/:id/bindings",
            post(handlers::a001_report_template::add_binding),
        )
        .route(
            "/api/report_template/:id/bindings/:index",
            put(handlers::a001_report_template::rename_binding_key)
                .delete(handlers::a001_report_template::remove_binding),
        )
        .route(
            "/api/report_template/:id/eligible_sources",
            get(handlers::a001_report_template::eligible_sources),
        )
        .route(
            "/api/report_template/:id/required_inputs",
            get(handlers::a001_report_template::required_inputs),
        )
        // ========================================
        // UseCase u501: Generate report
        // ========================================
        .route(
            "/api/u501/lookups/:kind",
            get(handlers::usecases::u501_lookups),
        )
        .route(
            "/api/u501/generate/:id",
            post(handlers::usecases::u501_generate),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
}
