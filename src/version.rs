//! Version info, for `--version` and the `<generator>` tag of every output
//! file.

pub static NAME: &str = "nitro-export";
pub static VERSION: &str = env!("CARGO_PKG_VERSION");

static GIT_COMMIT: &str = include_str!(concat!(env!("OUT_DIR"), "/git-commit"));
static COMPILE_DATE: &str = include_str!(concat!(env!("OUT_DIR"), "/compile-date"));

pub fn print_version_info() {
    println!("{} {}", NAME, VERSION);
    println!("build commit: {}", GIT_COMMIT);
    println!("compile date: {}", COMPILE_DATE);
}
