use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the command tree in src/main.rs; build scripts can't reach src/ modules.
fn build_cli() -> Command {
    let output = || {
        Arg::new("output")
            .long("output")
            .short('o')
            .help("Output file path (defaults to stdout)")
            .value_hint(ValueHint::FilePath)
    };

    Command::new("tmpl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render HTML report templates to HTML or PDF")
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available output formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a tmpl.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("render")
                .about("Render a template with JSON data (default command)")
                .arg(
                    Arg::new("template")
                        .help("Template file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data")
                        .long("data")
                        .short('d')
                        .help("JSON file providing the template context")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format")
                        .value_parser(["html", "pdf"]),
                )
                .arg(output())
                .arg(
                    Arg::new("clean")
                        .long("clean")
                        .help("Delete existing files in the output directory first")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("keep-html")
                        .long("keep-html")
                        .help("Also save the rendered HTML next to a PDF")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no-keep-html")
                        .long("no-keep-html")
                        .help("Do not save the rendered HTML next to a PDF")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("to-django")
                .about("Convert Jinja template syntax to Django template syntax")
                .arg(
                    Arg::new("input")
                        .help("Jinja template to convert")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(output()),
        )
        .subcommand(Command::new("generate-config").about("Print the default configuration"))
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = build_cli();

    generate_to(Bash, &mut cmd, "tmpl", &outdir)?;
    generate_to(Zsh, &mut cmd, "tmpl", &outdir)?;
    generate_to(Fish, &mut cmd, "tmpl", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
