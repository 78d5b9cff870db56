//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use sceneport::{ImportSettings, SettingsError, Triangulation};

/// Sceneport command line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "sceneport",
    about = "Import a 3D scene file and print its scene graph",
    long_about = "Imports a 3D scene file (OBJ, glTF) through the sceneport pipeline and \
        prints the resulting node tree with mesh and material details.\n\n\
        EXAMPLES:\n\
          # Print a scene\n\
          sceneport assets/house.obj\n\
        \n\
          # Resolve textures from a separate directory\n\
          sceneport assets/house.obj --textures assets/textures\n\
        \n\
          # List supported formats\n\
          sceneport --formats",
    version
)]
pub struct CliArgs {
    /// Scene file to import.
    #[arg(required_unless_present = "formats")]
    pub file: Option<PathBuf>,

    /// Directory searched for textures.
    #[arg(long)]
    pub textures: Option<PathBuf>,

    /// TOML settings file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Split polygons with plain fans from the first vertex.
    #[arg(long)]
    pub simple_fan: bool,

    /// Do not synthesize normals for meshes without them.
    #[arg(long)]
    pub no_normals: bool,

    /// Print only this many levels of the tree.
    #[arg(long)]
    pub depth: Option<usize>,

    /// List supported formats and exit.
    #[arg(long)]
    pub formats: bool,
}

impl CliArgs {
    /// Settings from `--config`, with command line flags applied on top.
    pub fn settings(&self) -> Result<ImportSettings, SettingsError> {
        let mut settings = match &self.config {
            Some(path) => ImportSettings::load(path)?,
            None => ImportSettings::default(),
        };
        if self.simple_fan {
            settings.triangulation = Triangulation::SimpleFan;
        }
        if self.no_normals {
            settings.calculate_normals = false;
        }
        if let Some(dir) = &self.textures {
            settings.textures_dir = Some(dir.clone());
        }
        Ok(settings)
    }
}
