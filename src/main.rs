#![recursion_limit = "1024"] // for error_chain

#[macro_use]
extern crate log;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate clap;
extern crate atty;
extern crate cgmath;
extern crate json;
extern crate smallvec;
extern crate termcolor;
extern crate time;

#[macro_use]
mod errors;
#[macro_use]
mod util;
mod animation;
mod cli;
mod collect;
mod export;
mod logger;
mod nitro;
mod options;
mod primitives;
mod scene;
mod version;
mod write;

use errors::Result;
use log::Level;
use options::ExportOptions;
use std::fs::{self, File};
use std::io::Write;
use std::process::exit;
use util::out_file::sibling;

fn main() {
    let args = match cli::parse_cli_args() {
        Some(args) => args,
        None => return,
    };

    let level = if args.verbose { Level::Debug } else { Level::Info };
    let log_file = if args.log {
        match open_log_file(&args) {
            Ok(f) => Some(f),
            Err(e) => {
                eprintln!("[ERROR] {}", e);
                exit(1);
            }
        }
    } else {
        None
    };
    logger::init(level, log_file);

    if let Err(e) = run(&args) {
        error!("{}", e);
        for cause in e.iter().skip(1) {
            error!("caused by: {}", cause);
        }
        log::logger().flush();
        exit(1);
    }
    log::logger().flush();
}

fn run(args: &cli::Args) -> Result<()> {
    let scene = scene::read_scene(&args.input)?;

    let mut opts = ExportOptions::default();
    opts.apply_settings(&scene.settings)?;
    args.apply(&mut opts)?;
    debug!("options: {:?}", opts);

    let report = export::export(&scene, &args.output, &opts)?;
    let skipped = report.diagnostics.iter().filter(|d| d.kind.skipped()).count();
    if skipped != 0 {
        warn!("{} polygon(s) were skipped", skipped);
    }
    info!("done: {} file(s) written", report.written.len());
    Ok(())
}

/// Creates `<output>.log`, starting with the input path and the time.
fn open_log_file(args: &cli::Args) -> Result<File> {
    let path = sibling(&args.output, "log");
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut f = File::create(&path)?;
    let now = time::strftime("%Y-%m-%d %H:%M:%S", &time::now())?;
    writeln!(f, "{} {} export of {} at {}",
        version::NAME, version::VERSION, args.input.display(), now)?;
    Ok(f)
}
