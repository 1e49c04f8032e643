//! API route handlers
//!
//! Each handler runs exactly one store operation and returns the raw result.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::server::SharedState;
use crate::auth::Identity;
use crate::error::Result;
use crate::mail::Mail;
use crate::store::{
    Collection, DeleteOutcome, Document, Filter, InsertOutcome, UpdateOutcome,
};

// Request/Response types

#[derive(Debug, Serialize, Deserialize)]
pub struct UpsertUserResponse {
    pub result: UpdateOutcome,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    pub email: Option<String>,
}

// Liveness

pub async fn liveness() -> &'static str {
    "Server is running..."
}

// User routes

/// Save the user under `email` and hand back a fresh access token
pub async fn upsert_user(
    State(state): State<SharedState>,
    Path(email): Path<String>,
    Json(mut user): Json<Document>,
) -> Result<Json<UpsertUserResponse>> {
    user.insert("email".to_string(), Value::String(email.clone()));

    let result = state
        .store
        .upsert_one(Collection::Users, &Filter::eq("email", email.as_str()), user.clone())
        .await?;
    tracing::info!(
        "Saved user {} (matched {}, upserted {})",
        email,
        result.matched_count,
        result.upserted_count
    );

    let token = state.tokens.issue(&Identity::from_record(&email, &user))?;

    Ok(Json(UpsertUserResponse { result, token }))
}

pub async fn get_user(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<Option<Document>>> {
    let user = state
        .store
        .find_one(Collection::Users, &Filter::eq("email", email))
        .await?;
    Ok(Json(user))
}

pub async fn list_users(State(state): State<SharedState>) -> Result<Json<Vec<Document>>> {
    let users = state.store.find(Collection::Users, &Filter::all()).await?;
    Ok(Json(users))
}

// Home routes

pub async fn list_homes(State(state): State<SharedState>) -> Result<Json<Vec<Document>>> {
    let homes = state.store.find(Collection::Homes, &Filter::all()).await?;
    Ok(Json(homes))
}

/// Listings hosted by `email`
pub async fn list_host_homes(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Document>>> {
    let homes = state
        .store
        .find(Collection::Homes, &Filter::eq("host.email", email))
        .await?;
    Ok(Json(homes))
}

pub async fn get_home(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>> {
    let home = state
        .store
        .find_one(Collection::Homes, &Filter::by_id(&id))
        .await?;
    Ok(Json(home))
}

pub async fn create_home(
    State(state): State<SharedState>,
    Json(home): Json<Document>,
) -> Result<Json<InsertOutcome>> {
    let result = state.store.insert_one(Collection::Homes, home).await?;
    tracing::info!("Created home {}", result.inserted_id);
    Ok(Json(result))
}

/// Upsert with an empty filter: the first stored home takes the body's
/// fields, or the body becomes a new home when there are none.
pub async fn replace_home(
    State(state): State<SharedState>,
    Json(home): Json<Document>,
) -> Result<Json<UpdateOutcome>> {
    let result = state
        .store
        .upsert_one(Collection::Homes, &Filter::all(), home)
        .await?;
    Ok(Json(result))
}

pub async fn delete_home(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>> {
    let result = state
        .store
        .delete_one(Collection::Homes, &Filter::by_id(&id))
        .await?;
    tracing::info!("Deleted home {} ({} removed)", id, result.deleted_count);
    Ok(Json(result))
}

// Booking routes

/// Store a booking and queue the guest's confirmation mail
pub async fn create_booking(
    State(state): State<SharedState>,
    Json(booking): Json<Document>,
) -> Result<Json<InsertOutcome>> {
    let result = state
        .store
        .insert_one(Collection::Bookings, booking.clone())
        .await?;
    tracing::info!("Created booking {}", result.inserted_id);

    match Mail::booking_confirmation(&booking, &result.inserted_id) {
        Some(mail) => {
            state.notifier.dispatch(mail);
        }
        None => tracing::debug!(
            "Booking {} has no guest email, skipping confirmation",
            result.inserted_id
        ),
    }

    Ok(Json(result))
}

/// All bookings, or the ones made by `?email=`
pub async fn list_bookings(
    State(state): State<SharedState>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Document>>> {
    let filter = match query.email {
        Some(email) => Filter::eq("guestEmail", email),
        None => Filter::all(),
    };
    let bookings = state.store.find(Collection::Bookings, &filter).await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>> {
    let booking = state
        .store
        .find_one(Collection::Bookings, &Filter::by_id(&id))
        .await?;
    Ok(Json(booking))
}
