// File: crates/services/bora_backend/src/main.rs
use axum::{routing::get, Router};
use bora_common::services::{
    BoxedCalendarService, BoxedError, CalendarService, CheckoutProviders, PaymentFulfillment,
};
use bora_common::{
    is_gcal_enabled, is_mercado_pago_enabled, is_storage_enabled, is_stripe_enabled, logging,
};
use bora_config::{ensure_dotenv_loaded, load_config, AppConfig};
use bora_db::repositories::{
    AgendamentosRepository, ClientesRepository, ConfiguracoesRepository, DocumentosRepository,
    JuridicoRepository, OrcamentosRepository, ParceirosRepository, ProcessosRepository,
    SqlAgendamentosRepository, SqlClientesRepository, SqlConfiguracoesRepository,
    SqlDocumentosRepository, SqlJuridicoRepository, SqlOrcamentosRepository,
    SqlParceirosRepository, SqlProcessosRepository,
};
use bora_db::DbClient;
use bora_gcal::{auth::create_calendar_hub, service::GoogleCalendarService};
use bora_mercadopago::MercadoPagoCheckoutService;
use bora_storage::StorageClient;
use bora_stripe::StripeCheckoutService;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

mod fulfillment;
use fulfillment::BoraFulfillment;

#[tokio::main]
async fn main() {
    ensure_dotenv_loaded();
    logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));

    let db_client = DbClient::new(&config)
        .await
        .expect("Failed to connect to Postgres");
    init_schemas(&db_client).await;

    let storage = build_storage(&config);
    let calendar = build_calendar(&config).await;
    let checkout = build_checkout_providers(&config);
    let fulfillment: Arc<dyn PaymentFulfillment> = Arc::new(BoraFulfillment {
        orcamentos: SqlOrcamentosRepository::new(db_client.clone()),
        documentos: SqlDocumentosRepository::new(db_client.clone()),
        agendamentos: SqlAgendamentosRepository::new(db_client.clone()),
        calendar: calendar.clone(),
        calendar_id: config.gcal.as_ref().and_then(|g| g.calendar_id.clone()),
    });

    #[allow(unused_mut)]
    let mut app = Router::new()
        .route("/", get(|| async { "BoraExpandir API" }))
        .merge(bora_cliente::routes(
            config.clone(),
            db_client.clone(),
            storage,
        ))
        .merge(bora_juridico::routes(config.clone(), db_client.clone()))
        .merge(bora_traducoes::routes(
            config.clone(),
            db_client.clone(),
            checkout.clone(),
        ))
        .merge(bora_comercial::routes(
            config.clone(),
            db_client.clone(),
            calendar,
            checkout,
        ))
        .merge(bora_parceiro::routes(config.clone(), db_client.clone()))
        .merge(bora_configuracoes::routes(config.clone(), db_client.clone()))
        .merge(bora_stripe::routes(config.clone(), fulfillment.clone()))
        .merge(bora_mercadopago::routes(config.clone(), fulfillment));

    #[cfg(feature = "openapi")]
    {
        app = app.merge(swagger_routes());
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!("Starting server at http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}

/// Creates the tables in foreign-key order. Startup aborts on failure; a
/// half-initialized schema is worse than a crash loop.
async fn init_schemas(db_client: &DbClient) {
    let clientes = SqlClientesRepository::new(db_client.clone());
    let processos = SqlProcessosRepository::new(db_client.clone());
    let documentos = SqlDocumentosRepository::new(db_client.clone());
    let orcamentos = SqlOrcamentosRepository::new(db_client.clone());
    let juridico = SqlJuridicoRepository::new(db_client.clone());
    let agendamentos = SqlAgendamentosRepository::new(db_client.clone());
    let parceiros = SqlParceirosRepository::new(db_client.clone());
    let configuracoes = SqlConfiguracoesRepository::new(db_client.clone());

    let result = async {
        clientes.init_schema().await?;
        processos.init_schema().await?;
        documentos.init_schema().await?;
        orcamentos.init_schema().await?;
        juridico.init_schema().await?;
        agendamentos.init_schema().await?;
        parceiros.init_schema().await?;
        configuracoes.init_schema().await
    }
    .await;

    if let Err(e) = result {
        error!("Schema initialization failed: {}", e);
        panic!("Schema initialization failed: {e}");
    }
    info!("Database schema ready");
}

fn build_storage(config: &Arc<AppConfig>) -> Option<StorageClient> {
    if !is_storage_enabled(config) {
        return None;
    }
    match config.storage.as_ref() {
        Some(storage_config) => Some(StorageClient::new(storage_config)),
        None => {
            warn!("use_storage is set but [storage] config is missing, uploads disabled");
            None
        }
    }
}

async fn build_calendar(
    config: &Arc<AppConfig>,
) -> Option<Arc<dyn CalendarService<Error = BoxedError>>> {
    if !is_gcal_enabled(config) {
        return None;
    }
    let gcal_config = match config.gcal.as_ref() {
        Some(c) => c,
        None => {
            warn!("use_gcal is set but [gcal] config is missing, calendar disabled");
            return None;
        }
    };
    match create_calendar_hub(gcal_config).await {
        Ok(hub) => {
            info!("Google Calendar integration ready");
            Some(Arc::new(BoxedCalendarService(GoogleCalendarService::new(
                Arc::new(hub),
            ))))
        }
        Err(e) => {
            // Bookings keep working without the calendar; availability and
            // event sync answer 503 until the key is fixed.
            error!("Failed to build Google Calendar hub: {}", e);
            None
        }
    }
}

fn build_checkout_providers(config: &Arc<AppConfig>) -> CheckoutProviders {
    CheckoutProviders {
        stripe: is_stripe_enabled(config)
            .then(|| Arc::new(StripeCheckoutService::new(config.clone())) as _),
        mercado_pago: is_mercado_pago_enabled(config)
            .then(|| Arc::new(MercadoPagoCheckoutService::new(config.clone())) as _),
    }
}

#[cfg(feature = "openapi")]
fn swagger_routes() -> Router {
    use bora_cliente::doc::ClienteApiDoc;
    use bora_comercial::doc::ComercialApiDoc;
    use bora_configuracoes::doc::ConfiguracoesApiDoc;
    use bora_juridico::doc::JuridicoApiDoc;
    use bora_mercadopago::doc::MercadoPagoApiDoc;
    use bora_parceiro::doc::ParceiroApiDoc;
    use bora_stripe::doc::StripeApiDoc;
    use bora_traducoes::doc::TraducoesApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    #[derive(OpenApi)]
    #[openapi(
        info(
            title = "BoraExpandir API",
            version = "0.1.0",
            description = "Back-office API for the BoraExpandir platform",
            license(name = "MIT", url = "https://opensource.org/licenses/MIT")
        ),
        tags((name = "BoraExpandir", description = "Core service endpoints")),
    )]
    struct ApiDoc;

    let mut openapi_doc = ApiDoc::openapi();
    openapi_doc.merge(ClienteApiDoc::openapi());
    openapi_doc.merge(JuridicoApiDoc::openapi());
    openapi_doc.merge(TraducoesApiDoc::openapi());
    openapi_doc.merge(ComercialApiDoc::openapi());
    openapi_doc.merge(StripeApiDoc::openapi());
    openapi_doc.merge(MercadoPagoApiDoc::openapi());
    openapi_doc.merge(ParceiroApiDoc::openapi());
    openapi_doc.merge(ConfiguracoesApiDoc::openapi());

    info!("Adding Swagger UI at /docs");
    SwaggerUi::new("/docs")
        .url("/docs/openapi.json", openapi_doc)
        .into()
}
