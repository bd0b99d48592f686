// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{gate::authentication_gate, policy::authorization_policy, AuthenticatedUser, Role},
    models::{
        Appointment, AppointmentCounts, AppointmentPage, AppointmentStatus, AuthResponse,
        BookAppointmentRequest, LoginRequest, RegisterPatientRequest,
        RequestPasswordResetRequest, ResetPasswordRequest, UpdateStatusRequest, User,
    },
    state::AppState,
};

pub mod appointments;
pub mod auth;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register/patient", post(auth::register_patient))
        .route("/users/request-password-reset", post(users::request_password_reset))
        .route("/users/reset-password", post(users::reset_password))
        .route("/appointments", post(appointments::book_appointment))
        .route(
            "/appointments/{appointment_id}",
            delete(appointments::cancel_appointment),
        )
        .route(
            "/appointments/{appointment_id}/status",
            put(appointments::update_status),
        )
        .route("/appointments/doctor", get(appointments::doctor_appointments))
        .route(
            "/appointments/doctor/recent",
            get(appointments::recent_appointments),
        )
        .route(
            "/appointments/doctor/counts",
            get(appointments::appointment_counts),
        )
        .route(
            "/appointments/doctor/status/{status}",
            get(appointments::doctor_appointments_by_status),
        )
        .route("/appointments/patient", get(appointments::patient_appointments))
        .with_state(state.clone());

    // Layer order: the gate runs first (outermost), then the policy, then
    // the matched route. The gate never rejects; the policy may.
    Router::new()
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(authorization_policy))
        .layer(middleware::from_fn_with_state(state, authentication_gate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::register_patient,
        users::request_password_reset,
        users::reset_password,
        appointments::book_appointment,
        appointments::cancel_appointment,
        appointments::update_status,
        appointments::doctor_appointments,
        appointments::recent_appointments,
        appointments::appointment_counts,
        appointments::doctor_appointments_by_status,
        appointments::patient_appointments
    ),
    components(
        schemas(
            User,
            Role,
            AuthenticatedUser,
            Appointment,
            AppointmentStatus,
            AppointmentPage,
            AppointmentCounts,
            BookAppointmentRequest,
            UpdateStatusRequest,
            LoginRequest,
            RegisterPatientRequest,
            AuthResponse,
            RequestPasswordResetRequest,
            ResetPasswordRequest,
            users::MessageResponse
        )
    ),
    tags(
        (name = "Auth", description = "Login and registration"),
        (name = "Users", description = "Password reset"),
        (name = "Appointments", description = "Appointment booking and lifecycle")
    )
)]
struct ApiDoc;
