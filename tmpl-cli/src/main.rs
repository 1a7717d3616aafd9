// Command-line interface for tmpl
//
// This binary renders report templates and converts them between template dialects.
// All of the work happens in the tmpl-babel crate; this crate only wires files, flags
// and configuration to it.
//
// Usage:
//  tmpl <template> --data <json> [--to <format>] [-o <file>]         - Render (default)
//  tmpl render <template> --data <json> [--to <format>] [-o <file>]  - Same as above (explicit)
//  tmpl to-django <template> [-o <file>]                             - Jinja → Django syntax
//  tmpl generate-config                                              - Print the default config
//  tmpl --list-formats                                               - List output formats
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the format.
// Example:
//  tmpl render report.html --data data.json -o report.pdf --extra-size letter

use chrono::Local;
use clap::{Arg, ArgAction, Command, ValueHint};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tmpl_babel::{
    convert_with_report, prepare_output_dir, publish, FormatRegistry, PublishArtifact,
    PublishSpec, RenderContext, RenderOptions,
};
use tmpl_config::{Loader, TmplConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["render", "to-django", "generate-config", "help"];
const LOCAL_CONFIG: &str = "tmpl.toml";

/// Split `--extra-<key> [value]` pairs out of the raw arguments.
/// Returns (remaining_args, extra_params). A key without a value is a boolean flag.
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        let Some(key) = arg.strip_prefix("--extra-") else {
            cleaned_args.push(arg.clone());
            continue;
        };

        let value = match iter.peek() {
            Some(next) if !next.starts_with('-') => iter.next().cloned(),
            _ => None,
        };
        extra_params.insert(key.to_string(), value.unwrap_or_else(|| "true".to_string()));
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("tmpl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render HTML report templates to HTML or PDF")
        .long_about(
            "tmpl fills a Jinja HTML template with JSON data and exports the result.\n\n\
            Commands:\n  \
            - render:          Render a template to HTML or PDF (default command)\n  \
            - to-django:       Rewrite Jinja syntax to Django template syntax\n  \
            - generate-config: Print the default configuration\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            tmpl report.html --data data.json                  # HTML to stdout\n  \
            tmpl report.html --data data.json -o out/r.pdf     # PDF via headless Chrome\n  \
            tmpl to-django report.html -o report_django.html   # Convert for Django",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
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
                .long_about(
                    "Render a Jinja HTML template with a JSON data context.\n\n\
                    The target format comes from --to, else from the output file's\n\
                    extension, else HTML. Text output goes to stdout unless -o is given;\n\
                    PDF output always needs -o.\n\n\
                    Configured date fields get a formatted_<name> sibling and the\n\
                    generation time is added before rendering (see generate-config).\n\n\
                    Examples:\n  \
                    tmpl render report.html --data data.json\n  \
                    tmpl render report.html --data data.json -o output/report.pdf --clean",
                )
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
                        .value_name("JSON")
                        .help("JSON file providing the template context")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (detected from the output path if omitted)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                )
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
                        .action(ArgAction::SetTrue)
                        .conflicts_with("no-keep-html"),
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
                .long_about(
                    "Rewrite the Jinja spellings our templates use into Django syntax:\n\n  \
                    |default('value') → |default:'value'\n  \
                    loop.index0       → forloop.counter0\n  \
                    loop.index        → forloop.counter\n  \
                    loop.first        → forloop.first\n\n\
                    Everything else is copied unchanged; complex Jinja features need\n\
                    manual review. A summary of the rewrites is printed to stderr.",
                )
                .arg(
                    Arg::new("input")
                        .help("Jinja template to convert")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("generate-config")
                .about("Print the default configuration")
                .long_about(
                    "Outputs the built-in tmpl.toml defaults with comments.\n\n\
                    Save it as tmpl.toml in the working directory (picked up\n\
                    automatically) or pass it with --config, keeping only the keys\n\
                    you change.",
                ),
        )
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => match with_default_subcommand(&cleaned_args) {
            Some(new_args) => match cli.try_get_matches_from(&new_args) {
                Ok(m) => m,
                Err(e2) => e2.exit(),
            },
            None => e.exit(),
        },
    };

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let mut config = load_cli_config(config_path);
    apply_config_overrides(&mut config, &mut extra_params);

    match matches.subcommand() {
        Some(("render", sub_matches)) => {
            let template = sub_matches
                .get_one::<String>("template")
                .expect("template is required");
            if sub_matches.get_flag("clean") {
                config.output.clean = true;
            }
            if sub_matches.get_flag("keep-html") {
                config.convert.pdf.keep_html = true;
            }
            if sub_matches.get_flag("no-keep-html") {
                config.convert.pdf.keep_html = false;
            }
            let request = RenderRequest {
                template: Path::new(template),
                data: sub_matches.get_one::<String>("data").map(Path::new),
                to: sub_matches.get_one::<String>("to").map(|s| s.as_str()),
                output: sub_matches.get_one::<String>("output").map(Path::new),
                config: config_path.map(Path::new),
            };
            handle_render_command(&request, &extra_params, &config);
        }
        Some(("to-django", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_to_django_command(input, output);
        }
        Some(("generate-config", _)) => {
            print!("{}", tmpl_config::default_toml());
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Insert "render" before the first positional argument when it names a file rather
/// than a subcommand. Leading global options are skipped, so
/// `tmpl --config c.toml report.html` works like `tmpl render report.html --config c.toml`.
fn with_default_subcommand(args: &[String]) -> Option<Vec<String>> {
    let mut index = 1;
    while let Some(arg) = args.get(index) {
        match arg.as_str() {
            "--config" => index += 2,
            "--list-formats" => index += 1,
            _ if arg.starts_with("--config=") => index += 1,
            _ if arg.starts_with('-') => return None,
            _ if SUBCOMMANDS.contains(&arg.as_str()) => return None,
            _ => {
                let mut new_args = args.to_vec();
                new_args.insert(index, "render".to_string());
                return Some(new_args);
            }
        }
    }
    None
}

/// Logs go to stderr so they never mix with rendered output on stdout.
fn init_logging() {
    let env_filter = EnvFilter::try_from_env("TMPL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct RenderRequest<'a> {
    template: &'a Path,
    data: Option<&'a Path>,
    to: Option<&'a str>,
    output: Option<&'a Path>,
    config: Option<&'a Path>,
}

/// Handle the render command
fn handle_render_command(
    request: &RenderRequest<'_>,
    extra_params: &HashMap<String, String>,
    config: &TmplConfig,
) {
    let registry = FormatRegistry::default();

    let to = resolve_target_format(&registry, request.to, request.output);
    let format = registry.get(&to).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    if format.is_binary() && request.output.is_none() {
        eprintln!("Binary formats (like PDF) require an output file. Use -o <path>.");
        std::process::exit(1);
    }

    let source = fs::read_to_string(request.template).unwrap_or_else(|e| {
        eprintln!(
            "Error reading template '{}': {e}",
            request.template.display()
        );
        std::process::exit(1);
    });

    let context = build_context(request.data, config);
    let options = format_options(request.template, &to, config, extra_params);

    if let Some(output) = request.output {
        let dir = output_dir(output);
        if config.output.clean {
            guard_clean_dir(&dir, &run_inputs(request, &options));
        }
        let report = prepare_output_dir(&dir, config.output.clean).unwrap_or_else(|e| {
            eprintln!("Error preparing output directory: {e}");
            std::process::exit(1);
        });
        if !report.removed.is_empty() || !report.failed.is_empty() {
            eprintln!(
                "→ Cleaned {} existing file(s) from {}",
                report.removed.len(),
                dir.display()
            );
        }
        for (path, reason) in &report.failed {
            eprintln!("  ✗ Failed to remove {}: {reason}", path.display());
        }
    }

    let template_name = request
        .template
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("<template>");
    let mut spec = PublishSpec::new(&source, &context, &to)
        .with_template_name(template_name)
        .with_render_options(RenderOptions::from(&config.render))
        .with_options(options)
        .keep_html(config.convert.pdf.keep_html);
    if let Some(output) = request.output {
        spec = spec.with_output_path(output);
    }

    let result = publish(spec).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    if let Some(html) = &result.html_copy {
        eprintln!("✓ HTML saved to: {}", html.display());
    }
    match result.artifact {
        PublishArtifact::InMemory(text) => print!("{text}"),
        PublishArtifact::File(path) => eprintln!("✓ {} saved to: {}", to.to_uppercase(), path.display()),
    }
}

fn resolve_target_format(
    registry: &FormatRegistry,
    explicit: Option<&str>,
    output: Option<&Path>,
) -> String {
    if let Some(to) = explicit {
        return to.to_string();
    }
    match output {
        Some(path) => registry.detect_format_from_filename(path).unwrap_or_else(|| {
            eprintln!(
                "Error: Could not detect format from filename '{}'",
                path.display()
            );
            eprintln!("Please specify --to explicitly");
            std::process::exit(1);
        }),
        None => "html".to_string(),
    }
}

fn build_context(data: Option<&Path>, config: &TmplConfig) -> RenderContext {
    let mut context = match data {
        Some(path) => RenderContext::load(path).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }),
        None => RenderContext::new(),
    };

    let date_format = &config.context.date_format;
    let formatted = context
        .format_date_fields(&config.context.date_fields, date_format)
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        });
    debug!(formatted, "prepared date fields");

    if !config.context.generated_key.is_empty() {
        context
            .stamp_generated(&config.context.generated_key, &Local::now(), date_format)
            .unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(1);
            });
    }
    context
}

fn output_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Every file the run reads: template, data, configuration and stylesheet.
fn run_inputs(request: &RenderRequest<'_>, options: &HashMap<String, String>) -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = [Some(request.template), request.data, request.config]
        .into_iter()
        .flatten()
        .map(Path::to_path_buf)
        .collect();
    let local_config = Path::new(LOCAL_CONFIG);
    if local_config.is_file() {
        inputs.push(local_config.to_path_buf());
    }
    if let Some(css_path) = options.get("css-path") {
        inputs.push(PathBuf::from(css_path));
    }
    inputs
}

/// Refuse to clean a directory holding the inputs of this very run.
fn guard_clean_dir(dir: &Path, inputs: &[PathBuf]) {
    let Ok(dir) = dir.canonicalize() else {
        return;
    };
    for input in inputs {
        let parent = input
            .canonicalize()
            .ok()
            .and_then(|path| path.parent().map(Path::to_path_buf));
        if parent.as_deref() == Some(dir.as_path()) {
            eprintln!(
                "Refusing to clean '{}': it contains the input file '{}'",
                dir.display(),
                input.display()
            );
            std::process::exit(1);
        }
    }
}

fn format_options(
    template: &Path,
    to: &str,
    config: &TmplConfig,
    extra_params: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut options = HashMap::new();
    if to == "pdf" {
        let size: tmpl_babel::formats::PageSize = config.convert.pdf.size.into();
        options.insert("size".to_string(), size.as_str().to_string());
        if let Some(dir) = template.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            options.insert("base-dir".to_string(), dir.display().to_string());
        } else {
            options.insert("base-dir".to_string(), ".".to_string());
        }
    }
    if let Some(css_path) = &config.convert.html.custom_css {
        options.insert("css-path".to_string(), css_path.clone());
    }
    for (key, value) in extra_params {
        options.insert(key.clone(), value.clone());
    }
    options
}

/// Handle the to-django command
fn handle_to_django_command(input: &str, output: Option<&str>) {
    let source = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });

    let (converted, report) = convert_with_report(&source);

    match output {
        Some(path) => {
            fs::write(path, &converted).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
            eprintln!("✓ Converted template saved to: {path}");
        }
        None => print!("{converted}"),
    }

    if report.is_empty() {
        eprintln!("No Jinja-specific syntax found; template copied unchanged.");
    } else {
        eprintln!("Converted {} occurrence(s):", report.total());
        for (rule, count) in report.iter().filter(|(_, count)| *count > 0) {
            eprintln!("  {:<18} → {:<18} ({count})", rule.source(), rule.target());
        }
    }
    eprintln!("Note: other Jinja features may need manual review");
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    println!("Output formats:\n");
    let registry = FormatRegistry::default();
    for name in registry.list_formats() {
        if let Ok(format) = registry.get(&name) {
            println!(
                "  {name:<6} {} (.{})",
                format.description(),
                format.file_extensions().join(", .")
            );
        }
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> TmplConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// Fold `--extra-*` keys that map to configuration into `config`, removing them from
/// `extra_params`. Whatever remains is passed to the output format untouched.
fn apply_config_overrides(config: &mut TmplConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = extra_params.remove("size") {
        config.convert.pdf.size = match raw.to_ascii_lowercase().as_str() {
            "a4" => tmpl_config::PdfPageSize::A4,
            "letter" => tmpl_config::PdfPageSize::Letter,
            other => {
                eprintln!("Invalid page size '{other}' for --extra-size (expected a4 or letter)");
                std::process::exit(1);
            }
        };
    }
    if let Some(raw) = extra_params.remove("keep-html") {
        config.convert.pdf.keep_html = parse_bool_arg("keep-html", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["strict", "strict-undefined"]) {
        config.render.strict_undefined = parse_bool_arg("strict", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["autoescape", "auto-escape"]) {
        config.render.auto_escape = parse_bool_arg("auto-escape", &raw);
    }
    if let Some(raw) = extra_params.remove("date-format") {
        config.context.date_format = raw;
    }
    if let Some(path) = take_override(extra_params, &["css", "css-path"]) {
        config.convert.html.custom_css = Some(path);
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| map.remove(*key))
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}
