//! Model viewer entry point
//!
//! Loads the models of one or more scenes and reports the parts, materials
//! and textures a renderer would upload for them.

mod config;
mod report;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use model_loader::assets::{FileSource, ModelLoader};
use model_loader::config::Config;
use model_loader::foundation::logging::{self, LevelFilter};

use config::{SceneConfig, ShadingModel, ViewerConfig};
use report::ModelSummary;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "model_viewer", about = "Load OBJ/MTL models and report what would be rendered")]
struct Args {
    /// Viewer config file (.toml or .ron)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scene to load from the config (all scenes when omitted)
    #[arg(short, long)]
    scene: Option<String>,

    /// Shading variant for models given on the command line
    #[arg(long, value_enum, default_value_t = ShadingArg::Phong)]
    shading: ShadingArg,

    /// Fail on malformed OBJ/MTL data
    #[arg(long)]
    strict: bool,

    /// OBJ files forming an ad-hoc scene
    models: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ShadingArg {
    Flat,
    Phong,
    Textured,
}

impl From<ShadingArg> for ShadingModel {
    fn from(arg: ShadingArg) -> Self {
        match arg {
            ShadingArg::Flat => Self::Flat,
            ShadingArg::Phong => Self::Phong,
            ShadingArg::Textured => Self::Textured,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load_from_file(&path.to_string_lossy())
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if args.strict {
        config.loader.strict = true;
    }

    let level = config.log_level.parse().unwrap_or(LevelFilter::Info);
    logging::init_with_level(level);

    let scenes = select_scenes(&config, &args)?;
    let loader = ModelLoader::new(config.loader.clone());

    for scene in &scenes {
        show_scene(&loader, scene)?;
    }
    Ok(())
}

fn select_scenes(config: &ViewerConfig, args: &Args) -> anyhow::Result<Vec<SceneConfig>> {
    if !args.models.is_empty() {
        return Ok(vec![SceneConfig {
            name: "command line".to_string(),
            models: args.models.clone(),
            shading: args.shading.into(),
        }]);
    }

    match &args.scene {
        Some(name) => match config.scene(name) {
            Some(scene) => Ok(vec![scene.clone()]),
            None => bail!("no scene named '{name}' in config"),
        },
        None if config.scenes.is_empty() => bail!("nothing to load: pass OBJ files or a config with scenes"),
        None => Ok(config.scenes.clone()),
    }
}

fn show_scene(loader: &ModelLoader, scene: &SceneConfig) -> anyhow::Result<()> {
    log::info!("Scene '{}' ({:?} shading)", scene.name, scene.shading);
    println!("scene {}", scene.name);

    for path in &scene.models {
        let model = loader
            .load(&FileSource, path)
            .with_context(|| format!("loading {}", path.display()))?;
        let summary = ModelSummary::new(&model, scene.shading);

        for (part, missing) in &summary.incompatible_parts {
            log::warn!(
                "{}: part '{}' lacks {:?} needed by {:?} shading",
                path.display(),
                part,
                missing,
                scene.shading
            );
        }
        if let Some(line) = summary.first_warning_line {
            log::warn!(
                "{}: {} lines skipped or degraded, first at line {}",
                path.display(),
                summary.warnings,
                line
            );
        }
        if summary.fallback_textures > 0 {
            log::warn!("{}: {} textures failed to decode", path.display(), summary.fallback_textures);
        }

        println!("  {}: {}", path.display(), summary);
        for part in &model.parts {
            println!(
                "    {} [{}] {} triangles",
                part.name,
                part.material_name,
                part.data.triangle_count()
            );
        }
    }
    Ok(())
}
