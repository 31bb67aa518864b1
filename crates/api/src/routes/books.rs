//! Route definitions for the book catalog.
//!
//! Mounted at `/books`.

use axum::routing::get;
use axum::Router;

use crate::handlers::books;
use crate::state::AppState;

/// Routes mounted at `/books`.
///
/// ```text
/// GET    /                      -> list_books
/// POST   /                      -> create_book (admin)
/// GET    /search                -> search_books
/// GET    /featured              -> featured_books
/// GET    /bestsellers           -> bestseller_books
/// GET    /category/{category}   -> books_by_category
/// GET    /{id}                  -> get_book
/// PUT    /{id}                  -> update_book (admin)
/// DELETE /{id}                  -> delete_book (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(books::list_books).post(books::create_book))
        .route("/search", get(books::search_books))
        .route("/featured", get(books::featured_books))
        .route("/bestsellers", get(books::bestseller_books))
        .route("/category/{category}", get(books::books_by_category))
        .route(
            "/{id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
}
