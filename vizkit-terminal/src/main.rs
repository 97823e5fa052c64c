/// vizkit - mesh and volume visualization
///
/// Builds one of the scene programs, exports the composed window and then
/// shows it in the terminal.
/// Controls:
///   - WASD / Arrow Keys: Orbit the cameras
///   - R: Reset the cameras
///   - Q/ESC: Quit
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vizkit_render::{export_image, NamedColors};
use vizkit_terminal::cli::{Cli, USAGE};
use vizkit_terminal::{scenes, SceneConfig, TerminalApp};

const DEFAULT_LOG_FILTER: &str = concat!(
    "vizkit=info,",
    "vizkit_core=info,",
    "vizkit_render=info,",
    "vizkit_terminal=info"
);

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse(std::env::args().skip(1))?;
    if cli.help {
        println!("{}", USAGE);
        return Ok(());
    }
    let (kind, input) = cli.target().context(USAGE)?;

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    let config = cli.apply(config);

    let colors = NamedColors::new();
    let mut prepared = scenes::prepare(kind, &input, &config, &colors)
        .with_context(|| format!("failed to build the {} scene from {}", kind, input.display()))?;

    for line in &prepared.report {
        println!("{}", line);
    }

    if let Some(path) = config.export_path(kind) {
        let report = export_image(&mut prepared.window, &prepared.scene, &path, config.rgba)
            .with_context(|| format!("failed to export {}", path.display()))?;
        println!("Wrote {}", report.path.display());
    }

    if config.interactive {
        tracing::info!("Starting terminal viewer (press Q to quit)");
        let mut app = TerminalApp::new(prepared.scene, prepared.window)?;
        app.run()?;
    }

    Ok(())
}
