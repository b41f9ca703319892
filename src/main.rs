use anyhow::Result;
use axum::{extract::State, response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use car_rental::cache::redis_client::RedisClient;
use car_rental::cache::CacheConfig;
use car_rental::config::environment::EnvironmentConfig;
use car_rental::database::DatabaseConnection;
use car_rental::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use car_rental::state::AppState;
use car_rental::{routes, scheduler, services};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::default();

    // Configurar logging: DEBUG solo en desarrollo
    tracing_subscriber::fmt()
        .with_max_level(if config.is_development() {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    info!("🚗 Car Rental Marketplace - Core API");
    info!("====================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    if let Err(e) = db_connection.run_migrations().await {
        error!("❌ Error aplicando migraciones: {}", e);
        return Err(anyhow::anyhow!("Error de migraciones: {}", e));
    }
    info!("💾 Migraciones aplicadas");

    let pool = db_connection.pool().clone();

    // Inicializar Redis (índice geográfico de coches)
    let redis_client = match RedisClient::new(CacheConfig::from_env()).await {
        Ok(client) => client,
        Err(e) => {
            error!("❌ Error conectando a Redis: {}", e);
            return Err(anyhow::anyhow!("Error de Redis: {}", e));
        }
    };

    // Gateway de notificaciones
    let mailer = services::build_mailer(&config);

    // CORS: lista explícita de orígenes salvo que incluya "*"
    let cors = if config.cors_origins.iter().any(|origin| origin == "*") {
        cors_middleware()
    } else {
        cors_middleware_with_origins(config.cors_origins.clone())
    };

    let sweep_interval = config.sweep_interval_secs;
    let server_addr = config.server_url();
    let app_state = AppState::new(pool.clone(), config, redis_client, mailer.clone());

    // Barrido de recordatorios y retrasos
    let scheduler_handle = scheduler::spawn(pool, mailer, sweep_interval);

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(routes::create_api_router())
        .layer(cors)
        .with_state(app_state);

    // Dirección del servidor
    let addr: SocketAddr = server_addr.parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servicio");
    info!("📝 Bookings:");
    info!("   POST  /api/bookings - Crear reserva (devuelve reserva + transacción)");
    info!("   GET   /api/bookings - Reservas del solicitante");
    info!("   GET   /api/bookings/summary - Resumen mensual de ingresos");
    info!("   GET   /api/bookings/report - Reporte con coche y usuario");
    info!("   GET   /api/bookings/export - Descarga CSV");
    info!("   GET   /api/bookings/:id - Obtener reserva");
    info!("   PATCH /api/bookings/:id - Actualizar reserva");
    info!("   POST  /api/bookings/:id/cancel - Anular reserva");
    info!("   POST  /api/bookings/:id/feedback - Dejar feedback");
    info!("🚗 Cars:");
    info!("   POST   /api/cars - Publicar coche");
    info!("   GET    /api/cars/nearby - Buscar coches cercanos");
    info!("   GET    /api/cars/:id - Obtener coche");
    info!("   GET    /api/cars/:id/bookings - Reservas del coche (propietario)");
    info!("   PATCH  /api/cars/:id - Actualizar coche");
    info!("   PATCH  /api/cars/:id/status - Cambiar estado");
    info!("   DELETE /api/cars/:id - Eliminar coche");
    info!("💳 Transactions:");
    info!("   POST   /api/transactions - Liquidar reserva");
    info!("   GET    /api/transactions - Listado completo (admin)");
    info!("   GET    /api/transactions/mine - Transacciones del solicitante");
    info!("   GET    /api/transactions/:id - Obtener transacción");
    info!("   DELETE /api/transactions/:id - Eliminar transacción (admin)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Apagar el barrido después de drenar las conexiones
    scheduler_handle.shutdown().await;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Estado del servicio y de sus dependencias
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let redis = state.redis.is_connected().await;

    Json(json!({
        "status": if database && redis { "ok" } else { "degraded" },
        "environment": state.config.environment,
        "database": database,
        "redis": redis,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
