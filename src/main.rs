use clap::Parser;

use luminol::cli::{Args, Quality};
use luminol::config::Config;
use luminol::engine::{self, RunOptions};
use luminol::error::Diagnostics;
use luminol::{logging, paths};

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);
    std::process::exit(run(args));
}

fn run(args: Args) -> i32 {
    let mut diags = Diagnostics::new();

    if args.validate {
        return match Config::load(&paths::config_file(), &mut diags) {
            Ok(_) => {
                println!("✓ configuration is valid");
                0
            }
            Err(e) => {
                eprintln!("{e}");
                e.exit_code()
            }
        };
    }

    let Some(image) = args.resolve_image() else {
        eprintln!("error: an image path is required (pass it positionally or with --image)");
        return 2;
    };
    let quality = args.quality.unwrap_or(Quality::Balanced);

    if args.preview {
        return match engine::preview_colors(image, quality) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{e}");
                e.exit_code()
            }
        };
    }

    let config = match Config::load(&paths::config_file(), &mut diags) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return e.exit_code();
        }
    };

    let options = RunOptions {
        image: image.clone(),
        theme_override: args.theme,
        quality,
        dry_run: args.dry_run,
    };

    match engine::run(&options, &config, &mut diags) {
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
        Ok(()) if diags.is_empty() => 0,
        Ok(()) => {
            eprintln!("finished with {} warning(s):", diags.len());
            for warning in diags.warnings() {
                eprintln!("  - {warning}");
            }
            6
        }
    }
}
