// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Comma-separated, repeatable list argument
fn list_arg(id: &'static str, long: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(id)
        .short(short)
        .long(long)
        .value_name("LIST")
        .value_delimiter(',')
        .action(ArgAction::Append)
        .help(help)
}

fn build_cli() -> Command {
    Command::new("multiarch-audit")
        .version(env!("CARGO_PKG_VERSION"))
        .author("multiarch-audit Contributors")
        .about("Report files that differ between architecture builds of Multi-Arch: same packages")
        .arg(
            Arg::new("mirror")
                .short('m')
                .long("mirror")
                .default_value("http://deb.debian.org/debian")
                .help("Mirror URL, or path to a local mirror directory"),
        )
        .arg(
            Arg::new("distribution")
                .short('d')
                .long("distribution")
                .default_value("unstable")
                .help("Distribution to audit"),
        )
        .arg(list_arg(
            "architectures",
            "architectures",
            'a',
            "Architectures to compare (default: all from the Release file)",
        ))
        .arg(list_arg(
            "exclude_architectures",
            "exclude-architectures",
            'x',
            "Architectures to leave out of the derived list",
        ))
        .arg(
            list_arg("sections", "sections", 's', "Archive sections to scan")
                .default_values(["main", "contrib", "non-free", "non-free-firmware"]),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .action(ArgAction::SetTrue)
                .help("Omit hash lines for files where every architecture differs"),
        )
        .arg(
            Arg::new("cache")
                .long("cache")
                .value_name("PATH")
                .num_args(0..=1)
                .help("Cache manifests in an SQLite database (default location if no PATH)"),
        )
        .arg(
            Arg::new("prune_cache")
                .long("prune-cache")
                .action(ArgAction::SetTrue)
                .requires("cache")
                .help("Delete cached manifests not used by this run"),
        )
        .arg(
            Arg::new("log_file")
                .long("log-file")
                .value_name("PATH")
                .help("Write the log here instead of stderr"),
        )
        .arg(
            Arg::new("packages")
                .value_name("PACKAGE")
                .num_args(0..)
                .help("Packages to audit (default: every Multi-Arch: same package)"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("multiarch-audit.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
