use std::path::PathBuf;

use clap::Parser;

/// Generate per-application color themes from wallpaper images.
#[derive(Parser, Debug)]
#[command(name = "luminol", version, about)]
pub struct Args {
    /// Path to the image file to generate colors from
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Image path (positional alternative to --image)
    pub image_path: Option<PathBuf>,

    /// Force a theme type, overriding the config `theme-type`
    #[arg(short, long, value_enum)]
    pub theme: Option<ThemeMode>,

    /// Color extraction quality (higher is slower but more accurate)
    #[arg(short, long, value_enum)]
    pub quality: Option<Quality>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Run the pipeline without writing files or spawning commands
    #[arg(long)]
    pub dry_run: bool,

    /// Validate the configuration file and exit
    #[arg(long)]
    pub validate: bool,

    /// Extract and print the ranked palette, then exit
    #[arg(long)]
    pub preview: bool,
}

impl Args {
    /// The image path, whichever way it was given; `--image` wins.
    pub fn resolve_image(&self) -> Option<&PathBuf> {
        self.image.as_ref().or(self.image_path.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ThemeMode {
    Light,
    Dark,
}

/// Quality presets trade extraction accuracy for speed by scaling the
/// downscale target and the k-means iteration cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Quality {
    Fast,
    Balanced,
    High,
}

impl Quality {
    /// Longest allowed image edge after downscaling.
    pub fn max_dimension(&self) -> u32 {
        match self {
            Self::Fast => 400,
            Self::Balanced => 800,
            Self::High => 1200,
        }
    }

    /// k-means iteration cap.
    pub fn max_iterations(&self) -> usize {
        match self {
            Self::Fast => 10,
            Self::Balanced => 20,
            Self::High => 40,
        }
    }
}
