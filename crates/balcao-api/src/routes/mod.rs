pub mod customers;
pub mod health;
pub mod threads;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        customers::upsert_customer,
        customers::list_customers,
        customers::get_customer,
        threads::upsert_thread,
        threads::list_threads_by_phone,
        threads::list_all_threads,
        threads::delete_thread,
    ),
    components(schemas(
        customers::UpsertCustomerRequest,
        threads::UpsertThreadRequest,
        threads::DeleteThreadRequest,
        health::HealthResponse,
    )),
    tags(
        (name = "clientes", description = "Customer records"),
        (name = "threads", description = "Conversation threads keyed by id and phone"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;
