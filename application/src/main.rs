use std::{io, sync::OnceLock};

use service::infra::Firebase;
use ski_roster::{
    storage::SessionFile, terminal, Args, Config, Context, Service,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() {
    // Standard output belongs to the interactive screen.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || LOG_LEVEL.get().copied().unwrap_or(log::Level::WARN)
                            >= *meta.level()
                })),
        )
        .init();

    _ = start().await;
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        store,
        session,
        export,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let firebase = Firebase::new(&store.into()).map_err(|e| {
        log::error!("failed to initialize `Firebase` client: {e}");
    })?;

    let service = Service::new((&session).into(), firebase);
    let file = SessionFile::new(session.file);
    let ctx = Context::new(service, file, export.dir);

    terminal::run(ctx, session.drop_on_exit)
        .await
        .map_err(|e| log::error!("terminal failed: {e}"))
}
