//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::ParsedDocument;
use crate::cli::args::{Cli, Commands, ConfigCommands, ParseArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::ClosingMode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Parse { file, parse }) => cmd_parse(cli, file, parse),
        Some(Commands::Get { file, path, parse }) => cmd_get(cli, file, path, parse),
        Some(Commands::Check {
            file,
            strict,
            parse,
        }) => cmd_check(cli, file, *strict, parse),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "phosys", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `phosys --help`".to_string(),
        )),
    }
}

/// Directory whose `.phosys.toml` applies to `file`.
fn document_dir(file: &Path) -> &Path {
    file.parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

/// Settings for a document command: config layers, then command line overrides.
pub fn resolve_settings(cli: &Cli, file: &Path, args: &ParseArgs) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref(), Some(document_dir(file)))?;
    if let Some(root) = &args.root {
        settings.parser.root_name = Some(root.clone());
    }
    if args.nested {
        settings.parser.closing = ClosingMode::Nested;
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn load_document(cli: &Cli, file: &Path, args: &ParseArgs) -> CliResult<(ServiceContainer, ParsedDocument)> {
    let container = ServiceContainer::new(resolve_settings(cli, file, args)?);
    let parsed = container.documents.load(file)?;
    Ok((container, parsed))
}

fn print_diagnostics(file: &Path, parsed: &ParsedDocument) {
    let source = file.display().to_string();
    for d in &parsed.diagnostics {
        output::diagnostic(&source, d);
    }
}

#[instrument(skip(cli, args))]
fn cmd_parse(cli: &Cli, file: &Path, args: &ParseArgs) -> CliResult<()> {
    let (container, parsed) = load_document(cli, file, args)?;
    output::info(&parsed.root.to_tree());
    if container.settings.output.show_diagnostics {
        print_diagnostics(file, &parsed);
    }
    Ok(())
}

#[instrument(skip(cli, args))]
fn cmd_get(cli: &Cli, file: &Path, path: &str, args: &ParseArgs) -> CliResult<()> {
    if path.is_empty() || path.split('/').any(str::is_empty) {
        return Err(CliError::InvalidArgs(format!(
            "path {path:?} has an empty segment"
        )));
    }
    let (container, parsed) = load_document(cli, file, args)?;
    if container.settings.output.show_diagnostics {
        print_diagnostics(file, &parsed);
    }
    let leaf = parsed.lookup(path)?;
    output::info(leaf.value());
    Ok(())
}

#[instrument(skip(cli, args))]
fn cmd_check(cli: &Cli, file: &Path, strict: bool, args: &ParseArgs) -> CliResult<()> {
    let (_, parsed) = load_document(cli, file, args)?;
    print_diagnostics(file, &parsed);

    let problems = parsed
        .diagnostics
        .iter()
        .filter(|d| strict || d.is_error())
        .count();
    if problems > 0 {
        return Err(CliError::CheckFailed(problems));
    }
    if !parsed.diagnostics.is_empty() {
        output::warning(&format!("{} warning(s)", parsed.diagnostics.len()));
    }
    output::success(&format!("{}: {}", file.display(), parsed.root.name()));
    Ok(())
}

/// Write the config template to `target`, refusing to overwrite.
fn write_template<'p>(fs: &dyn FileSystem, target: &'p Path) -> CliResult<&'p Path> {
    if fs.exists(target) {
        return Err(CliError::Usage(format!(
            "{} already exists",
            target.display()
        )));
    }
    fs.ensure_parent(target)
        .and_then(|()| fs.write(target, &Settings::template()))
        .map_err(|e| InfraError::io(format!("write {}", target.display()), e))?;
    Ok(target)
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref(), Some(Path::new(".")))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Init { global, stdout } => {
            if *stdout {
                output::info(&Settings::template());
                return Ok(());
            }
            let target = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("no global config directory".to_string()))?
            } else {
                local_config_path(Path::new("."))
            };
            let path = write_template(&RealFileSystem, &target)?;
            output::success(&format!("created {}", path.display()));
        }
        ConfigCommands::Path => {
            output::header("Config files (lowest to highest precedence)");
            match (&cli.config, global_config_path()) {
                (Some(explicit), _) => output::detail(&format!("config: {}", explicit.display())),
                (None, Some(global)) => output::detail(&format!("global: {}", global.display())),
                (None, None) => output::detail("global: <no config directory>"),
            }
            output::detail(&format!(
                "local:  {}",
                local_config_path(Path::new(".")).display()
            ));
        }
    }
    Ok(())
}
