use crate::{errors, handlers, services, AppState};
use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Freightbook API",
        description = r#"
Back-office bookkeeping API for a transport company.

Arrival memos, lorry receipts, and cash memos are partitioned by Indian
fiscal year (April to March); pass `?year=` to address a specific year,
otherwise the current fiscal year is used.

All endpoints except `/api/login` and `/health` require a bearer token:

```
Authorization: Bearer <jwt>
```

Failures are reported as `{"error": "<message>"}`.
        "#,
    ),
    tags(
        (name = "Memos", description = "Arrival memo management"),
        (name = "Lorry Receipts", description = "Consignment booking and delivery"),
        (name = "Cash Memos", description = "Delivery charge collection"),
        (name = "Reports", description = "Operational reports"),
        (name = "Admin", description = "Users, years, app keys, audit log"),
    ),
    components(schemas(
        errors::ErrorResponse,
        services::memos::MemoPayload,
        services::memos::MemoCascadeSummary,
        services::lorry_receipts::LrPayload,
        services::lorry_receipts::MarkDeliveredSummary,
        services::cash_memos::CashMemoPayload,
        services::cash_memos::CashMemoCreated,
        services::delivery_persons::DeliveryPersonPayload,
        services::users::LoginRequest,
        services::users::RegisterRequest,
        services::app_keys::SetAppKeyRequest,
        services::app_keys::AppKeyStatus,
        services::dashboard::DashboardSummary,
        handlers::years::AddYearRequest,
        handlers::years::YearsResponse,
        handlers::health::HealthResponse,
    ))
)]
pub struct ApiDoc;

/// Swagger UI mounted beside the API.
pub fn swagger_routes() -> Router<AppState> {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
