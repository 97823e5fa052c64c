//! Command-line parsing for the `vizkit` binary.
use std::path::PathBuf;

use vizkit_core::{VizError, VizResult};

use crate::config::{SceneConfig, SceneKind};

pub const USAGE: &str = "Usage: vizkit <shading|clip|volume> <input> [--export FILE] [--rgba] \
[--iso VALUE] [--config FILE] [--no-interactive]";

/// Parsed arguments; overrides stay unset unless given
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cli {
    pub scene: Option<SceneKind>,
    pub input: Option<PathBuf>,
    pub export: Option<PathBuf>,
    pub rgba: bool,
    pub iso_value: Option<f32>,
    pub config: Option<PathBuf>,
    pub no_interactive: bool,
    pub help: bool,
}

impl Cli {
    /// Parse arguments, program name excluded
    pub fn parse<I, S>(args: I) -> VizResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cli = Cli::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => cli.help = true,
                "--rgba" => cli.rgba = true,
                "--no-interactive" => cli.no_interactive = true,
                "--export" => cli.export = Some(PathBuf::from(value(&mut args, "--export")?)),
                "--config" => cli.config = Some(PathBuf::from(value(&mut args, "--config")?)),
                "--iso" => {
                    let raw = value(&mut args, "--iso")?;
                    let iso = raw.parse::<f32>().map_err(|_| {
                        VizError::configuration(format!("--iso expects a number, got '{}'", raw))
                    })?;
                    cli.iso_value = Some(iso);
                }
                flag if flag.starts_with("--") => {
                    return Err(VizError::configuration(format!("unknown option {}", flag)));
                }
                positional => {
                    if cli.scene.is_none() {
                        cli.scene = Some(positional.parse()?);
                    } else if cli.input.is_none() {
                        cli.input = Some(PathBuf::from(positional));
                    } else {
                        return Err(VizError::configuration(format!(
                            "unexpected argument '{}'",
                            positional
                        )));
                    }
                }
            }
        }
        Ok(cli)
    }

    /// Scene kind and input path, both required
    pub fn target(&self) -> VizResult<(SceneKind, PathBuf)> {
        let scene = self
            .scene
            .ok_or_else(|| VizError::configuration("missing scene name"))?;
        let input = self
            .input
            .clone()
            .ok_or_else(|| VizError::configuration("missing input path"))?;
        Ok((scene, input))
    }

    /// Layer the command-line overrides on top of `config`
    pub fn apply(&self, mut config: SceneConfig) -> SceneConfig {
        if let Some(export) = &self.export {
            config.export = Some(export.clone());
        }
        if self.rgba {
            config.rgba = true;
        }
        if let Some(iso) = self.iso_value {
            config.iso_value = iso;
        }
        if self.no_interactive {
            config.interactive = false;
        }
        config
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> VizResult<String> {
    args.next()
        .ok_or_else(|| VizError::configuration(format!("{} needs a value", flag)))
}
