use axum::Router;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    book::{Book, BookChanges, NewBook},
    route::books::{
        create_book, delete_book, get_book, list_books, update_book, BookMessageResponse,
        MessageResponse,
    },
    state::ApiState,
};

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Book Management API",
        version = "1.0.0",
        description = "A simple RESTful API to manage a collection of books."
    ),
    servers(
        (url = "http://localhost:3000", description = "Local server")
    ),
    paths(
        list_books::list_books,
        get_book::get_book,
        create_book::create_book,
        update_book::update_book,
        delete_book::delete_book,
    ),
    components(schemas(Book, NewBook, BookChanges, BookMessageResponse, MessageResponse)),
    tags(
        (name = "books", description = "Book management")
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI document and the Swagger UI, Redoc and RapiDoc viewers.
pub fn app() -> Router<ApiState> {
    Router::<ApiState>::new()
        .merge(SwaggerUi::new("/swagger-ui").url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        .merge(RapiDoc::new(OPENAPI_JSON_PATH).path("/rapidoc"))
}
