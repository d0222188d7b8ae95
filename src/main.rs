mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚚 Despacho Tracking - Seguimiento de reparto de última milla");
    info!("=============================================================");

    let config = EnvironmentConfig::from_env();

    // Inicializar base de datos
    let pool = match database::connection::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let addr: SocketAddr = config.server_addr().parse()?;
    let app_state = AppState::new(pool, config);
    let app = routes::create_api_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🔑 Autenticación:");
    info!("   POST /api/auth/login - Login");
    info!("📋 Catálogos:");
    info!("   GET  /api/catalogo/motivos-no-entrega - Motivos de no entrega");
    info!("   GET  /api/catalogo/estados-despacho - Estados de despacho");
    info!("   GET  /api/catalogo/estados-ruta - Estados de ruta");
    info!("📦 Despachos:");
    info!("   POST /api/despachos - Registrar despacho");
    info!("   GET  /api/despachos - Listar despachos");
    info!("   GET  /api/despachos/:id - Obtener despacho");
    info!("   POST /api/despachos/:id/entrega - Confirmar entrega");
    info!("   POST /api/despachos/:id/no-entrega - Registrar no entrega");
    info!("   POST /api/despachos/:id/liberar - Liberar despacho al pool");
    info!("   POST /api/despachos/:id/cancelar - Cancelar despacho");
    info!("🚚 Rutas:");
    info!("   POST /api/rutas - Crear ruta");
    info!("   GET  /api/rutas - Listar rutas");
    info!("   GET  /api/rutas/:id - Obtener ruta con sus despachos");
    info!("   POST /api/rutas/:id/iniciar - Iniciar ruta");
    info!("   POST /api/rutas/:id/finalizar - Finalizar ruta");
    info!("   POST /api/rutas/:id/cancelar - Cancelar ruta y liberar despachos");
    info!("   POST /api/rutas/:id/reconciliar - Reconciliar ruta externa");
    info!("🏢 Empresas de reparto:");
    info!("   POST /api/empresas - Registrar empresa");
    info!("   GET  /api/empresas - Listar empresas");
    info!("   GET  /api/empresas/:id - Obtener empresa");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
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
