//! `sceneport` command line tool.

mod args;
mod report;

use std::process::ExitCode;

use clap::Parser;
use sceneport::Importer;

use args::CliArgs;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(&CliArgs::parse()) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut importer = Importer::with_defaults(args.settings()?)?;

    if args.formats {
        for format in importer.supported_formats()? {
            println!("{}: {}", format.name, format.extensions.join(", "));
        }
        println!("library version {}", importer.library_version()?);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(file) = &args.file else {
        return Err("no input file".into());
    };
    let Some(graph) = importer.read_scene(file, args.textures.as_deref())? else {
        return Ok(ExitCode::FAILURE);
    };

    report::print_graph(&mut std::io::stdout().lock(), &graph, args.depth)?;
    importer.dispose()?;
    Ok(ExitCode::SUCCESS)
}
