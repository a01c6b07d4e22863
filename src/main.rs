use std::{
    future::IntoFuture,
    io::{self, Write},
    process,
    sync::Arc,
};

use tokio::{net::TcpListener, sync::Notify};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use trellis::{
    application::{
        engine::{ComposeOptions, ViewEngine},
        error::AppError,
    },
    config,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
    presentation::demo::demo_catalog,
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let catalog = demo_catalog()?;
    let engine = Arc::new(ViewEngine::new(
        Arc::new(catalog),
        ComposeOptions::from(&settings.compose),
    ));

    match command {
        config::Command::Serve(_) => run_serve(&settings, engine).await,
        config::Command::Render(args) => run_render(&engine, &args.view).await,
    }
}

async fn run_serve(settings: &config::Settings, engine: Arc<ViewEngine>) -> Result<(), AppError> {
    let state = HttpState {
        engine,
        stream_responses: settings.compose.stream_responses,
    };
    serve_http(settings, state).await
}

async fn run_render(engine: &ViewEngine, view: &str) -> Result<(), AppError> {
    let content = engine.render_to_content(view).await?;
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(content.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| AppError::from(InfraError::from(err)))
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "listening");

    let shutdown = Arc::new(Notify::new());
    let signal = {
        let shutdown = Arc::clone(&shutdown);
        async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "failed to listen for shutdown signal");
                return;
            }
            info!("shutdown signal received");
            shutdown.notify_one();
        }
    };

    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(signal)
        .into_future();
    let grace = settings.server.graceful_shutdown;

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))
        }
        () = async {
            shutdown.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_secs = grace.as_secs(), "graceful shutdown timed out");
            Ok(())
        }
    }
}
