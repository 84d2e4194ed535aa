//! Command-line arguments.

use clap::{App, ArgMatches};
use errors::{ErrorKind, Result};
use options::{parse_compress_nodes, ExportOptions, Formats};
use std::path::PathBuf;
use std::str::FromStr;
use version;

pub struct Args {
    pub input: PathBuf,
    pub output: PathBuf,
    pub verbose: bool,
    pub log: bool,
    pretty: bool,
    no_strip: bool,
    magnification: Option<String>,
    compress_nodes: Option<String>,
    frame_step: Option<String>,
    formats: Formats,
}

fn app() -> App<'static, 'static> {
    clap_app!(nitro_export =>
        (@setting SubcommandRequiredElseHelp)
        (about: "Exports scene snapshots to Nitro intermediate files")
        (@subcommand version =>
            (about: "Print version and build info")
        )
        (@subcommand export =>
            (about: "Write <output>.imd/.ica/.ita/.itp from a scene file")
            (@arg input: -i --input +takes_value +required "Scene snapshot (JSON)")
            (@arg output: -o --output +takes_value +required
                "Base path for the output files, without extension")
            (@arg pretty: --pretty "Indent the output")
            (@arg magnification: --magnification +takes_value "Scale applied to the scene")
            (@arg no_strip: --("no-strip") "Don't join primitives into strips")
            (@arg compress_nodes: --("compress-nodes") +takes_value
                "none, cull, merge, unite, or unite_combine")
            (@arg frame_step: --("frame-step") +takes_value
                "Keep every 1st, 2nd or 4th animation frame")
            (@arg imd: --imd "Write the model")
            (@arg ica: --ica "Write the node animation")
            (@arg ita: --ita "Write the texture SRT animation")
            (@arg itp: --itp "Write the texture pattern animation")
            (@arg log: --log "Also write messages to <output>.log")
            (@arg verbose: -v --verbose "Print debug messages")
        )
    )
}

/// Parses the process arguments. `None` means the request was handled
/// already (eg. `version`).
pub fn parse_cli_args() -> Option<Args> {
    let matches = app().get_matches();
    if matches.subcommand_matches("version").is_some() {
        version::print_version_info();
        return None;
    }
    matches.subcommand_matches("export").map(args)
}

fn args(m: &ArgMatches) -> Args {
    let mut formats = Formats {
        imd: m.is_present("imd"),
        ica: m.is_present("ica"),
        ita: m.is_present("ita"),
        itp: m.is_present("itp"),
    };
    if formats.none() {
        formats = Formats::all();
    }
    let string = |name: &str| m.value_of(name).map(|s| s.to_string());
    Args {
        input: PathBuf::from(m.value_of_os("input").unwrap_or_default()),
        output: PathBuf::from(m.value_of_os("output").unwrap_or_default()),
        verbose: m.is_present("verbose"),
        log: m.is_present("log"),
        pretty: m.is_present("pretty"),
        no_strip: m.is_present("no_strip"),
        magnification: string("magnification"),
        compress_nodes: string("compress_nodes"),
        frame_step: string("frame_step"),
        formats,
    }
}

impl Args {
    /// Overrides `opts` with whatever was given on the command line.
    pub fn apply(&self, opts: &mut ExportOptions) -> Result<()> {
        if self.pretty { opts.pretty_print = true; }
        if self.no_strip { opts.use_primitive_strip = false; }
        if let Some(ref s) = self.magnification {
            opts.magnification = parse_number("magnification", s)?;
        }
        if let Some(ref s) = self.compress_nodes {
            opts.compress_nodes = parse_compress_nodes(s)?;
        }
        if let Some(ref s) = self.frame_step {
            opts.frame_step = parse_number("frame step", s)?;
        }
        opts.formats = self.formats;
        opts.generate_log = self.log;
        Ok(())
    }
}

fn parse_number<T: FromStr>(what: &str, s: &str) -> Result<T> {
    match s.parse() {
        Ok(x) => Ok(x),
        Err(_) => bail!(ErrorKind::Configuration(format!("{} {:?} isn't a number", what, s))),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use options::CompressNodes;

    fn parse(argv: &[&str]) -> Args {
        let matches = app().get_matches_from(argv);
        args(matches.subcommand_matches("export").unwrap())
    }

    #[test]
    fn defaults_to_all_formats() {
        let a = parse(&["nitro-export", "export", "-i", "s.json", "-o", "out/m"]);
        assert_eq!(a.input, PathBuf::from("s.json"));
        assert_eq!(a.output, PathBuf::from("out/m"));
        assert_eq!(a.formats, Formats::all());
        assert!(!a.verbose);

        let mut opts = ExportOptions::default();
        opts.pretty_print = true;
        a.apply(&mut opts).unwrap();
        // Not passing --pretty leaves the scene's choice alone.
        assert!(opts.pretty_print);
        assert!(opts.use_primitive_strip);
    }

    #[test]
    fn flags_override_options() {
        let a = parse(&[
            "nitro-export", "export", "--input", "s.json", "--output", "m",
            "--pretty", "--no-strip", "--magnification", "0.5",
            "--compress-nodes", "cull", "--frame-step", "2", "--ica", "--log", "-v",
        ]);
        assert_eq!(a.formats, Formats { imd: false, ita: false, ica: true, itp: false });
        assert!(a.verbose);

        let mut opts = ExportOptions::default();
        a.apply(&mut opts).unwrap();
        assert!(opts.pretty_print);
        assert!(!opts.use_primitive_strip);
        assert_eq!(opts.magnification, 0.5);
        assert_eq!(opts.compress_nodes, CompressNodes::Cull);
        assert_eq!(opts.frame_step, 2);
        assert!(opts.generate_log);
    }

    #[test]
    fn bad_values_are_configuration_errors() {
        let a = parse(&["nitro-export", "export", "-i", "s", "-o", "m", "--magnification", "big"]);
        assert!(a.apply(&mut ExportOptions::default()).is_err());
        let a = parse(&["nitro-export", "export", "-i", "s", "-o", "m", "--compress-nodes", "zip"]);
        assert!(a.apply(&mut ExportOptions::default()).is_err());
    }
}
