//! `HttpBookStore` against a local mock of the library service.

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use bookshelf::domain::{BookPatch, NewNote};
use bookshelf::store::{BookStore, HttpBookStore, ListParams, StoreFailure};
use bookshelf::LibraryError;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

fn dune() -> Value {
    json!({
        "id": 1,
        "name": "Dune",
        "author": "Frank Herbert",
        "editor": "Chilton",
        "theme": "SF",
        "year": 1965,
        "rating": 4,
        "read": false,
        "favorite": true,
        "cover": null
    })
}

async fn list(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("read").map(String::as_str) == Some("true") {
        return Json(json!([]));
    }
    Json(json!([dune(), { "id": 2, "name": "Emma", "author": null, "rating": 9 }]))
}

async fn fetch(Path(id): Path<i64>) -> Result<Json<Value>, StatusCode> {
    if id == 1 {
        Ok(Json(dune()))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn update(Path(id): Path<i64>, Json(patch): Json<Value>) -> (StatusCode, Json<Value>) {
    if id == 4 {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Ce livre a été supprimé" })));
    }
    if id != 1 {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Erreur lors de la mise à jour" })));
    }
    let mut book = dune();
    if let (Some(book), Some(patch)) = (book.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            book.insert(key.clone(), value.clone());
        }
    }
    (StatusCode::OK, Json(book))
}

async fn remove(Path(id): Path<i64>) -> Json<Value> {
    Json(json!({ "message": format!("Livre {id} supprimé") }))
}

async fn notes(Path(id): Path<i64>) -> Json<Value> {
    Json(json!([{ "id": 7, "bookId": id, "content": "Épice", "dateISO": "2024-03-09T10:00:00Z" }]))
}

async fn add_note(Path(id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "id": 8, "bookId": id, "content": body["content"], "dateISO": "2024-03-10T10:00:00Z" }))
}

async fn serve() -> HttpBookStore {
    let app = Router::new()
        .route("/books", get(list))
        .route("/books/:id", get(fetch).put(update).delete(remove))
        .route("/books/:id/notes", get(notes).post(add_note));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    HttpBookStore::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn lists_books_and_normalizes_missing_fields() {
    let store = serve().await;
    let books = store.list_books(&ListParams::new()).await.unwrap();

    assert_eq!(books.len(), 2);
    assert_eq!(books[0].name, "Dune");
    assert!(books[0].favorite);
    assert_eq!(books[1].author, "");
    assert_eq!(books[1].rating, 5);
}

#[tokio::test]
async fn list_params_become_query_parameters() {
    let store = serve().await;
    let books = store.list_books(&ListParams::new().with("read", "true")).await.unwrap();
    assert!(books.is_empty());
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let store = serve().await;
    let err = store.get_book(42).await.unwrap_err();
    assert!(matches!(err, LibraryError::NotFound { id: 42, .. }));
    assert_eq!(err.user_message(), "Livre introuvable");
}

#[tokio::test]
async fn not_found_keeps_the_server_message() {
    let store = serve().await;
    let err = store.update_book(4, &BookPatch::read(true)).await.unwrap_err();

    assert!(matches!(err, LibraryError::NotFound { id: 4, .. }));
    assert_eq!(err.user_message(), "Ce livre a été supprimé");
    assert!(StoreFailure::from(&err).is_not_found());
}

#[tokio::test]
async fn update_returns_the_canonical_record() {
    let store = serve().await;
    let book = store.update_book(1, &BookPatch::read(true)).await.unwrap();
    assert!(book.read);
    assert_eq!(book.author, "Frank Herbert");
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let store = serve().await;
    let err = store.update_book(3, &BookPatch::favorite(true)).await.unwrap_err();
    assert_eq!(err.user_message(), "Erreur lors de la mise à jour");
    assert!(matches!(err, LibraryError::Server { status: 500, .. }));
}

#[tokio::test]
async fn delete_returns_the_confirmation() {
    let store = serve().await;
    assert_eq!(store.delete_book(1).await.unwrap(), "Livre 1 supprimé");
}

#[tokio::test]
async fn notes_round_trip_through_the_service() {
    let store = serve().await;
    let notes = store.list_notes(1).await.unwrap();
    assert_eq!(notes[0].display_date(), "09/03/2024");

    let note = store.create_note(1, &NewNote::new("  Relu  ").unwrap()).await.unwrap();
    assert_eq!(note.content, "Relu");
    assert_eq!(note.book_id, 1);
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpBookStore::new(&format!("http://{addr}"), Duration::from_secs(1)).unwrap();
    assert!(matches!(store.list_books(&ListParams::new()).await, Err(LibraryError::Network(_))));
}
