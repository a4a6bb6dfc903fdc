//! nomad-conf CLI - Read, write, copy and diff Nomad variables.

use clap::Parser;
use nomad_conf::cert::{CertResult, LetsEncryptDir, cert_variable_path, export_cert};
use nomad_conf::cli::{Cli, Commands, ConfigCommands, VarCommands};
use nomad_conf::commands::{
    self, CommandResult, ConfigShow, CopyResult, DiffResult, RenderedVariable, VariableList,
    WriteAction, WriteResult,
};
use nomad_conf::config::{ConfigOverrides, ConfigPaths, ResolvedSettings, resolve_settings};
use nomad_conf::models::VariableSpec;
use nomad_conf::storage::{self, VariableStore};
use std::io::Read;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "NOMAD_CONF_LOG";

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        if json {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        } else {
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> nomad_conf::Result<()> {
    let paths = ConfigPaths::from_env()?;
    let files = paths.load()?;
    let overrides = ConfigOverrides {
        nomad_server: cli.nomad_server,
        namespace: cli.namespace,
        check_index: cli.check_index.then_some(true),
        strict_not_found: cli.strict_not_found.then_some(true),
    };
    let settings = resolve_settings(&files, &overrides);
    let json = cli.json;

    match cli.command {
        Commands::Config {
            command: ConfigCommands::Show,
        } => {
            output(&ConfigShow::new(&paths, settings), json);
        }
        Commands::Var { command } => {
            let store = open(&settings)?;
            run_var_command(command, store.as_ref(), json)?;
        }
        Commands::Cp {
            from,
            to,
            no_create,
        } => {
            let from = VariableSpec::parse(&from)?;
            let to = VariableSpec::parse(&to)?;
            let store = open(&settings)?;
            let outcome = commands::replace(store.as_ref(), &from, &to, !no_create)?;
            output(&CopyResult::new(&from, &to, outcome), json);
        }
        Commands::Diff { file, spec } => {
            let spec = VariableSpec::parse(&spec)?;
            let content = read_file(&file)?;
            let store = open(&settings)?;
            let diff = commands::diff(store.as_ref(), &spec, &content)?;
            output(&DiffResult::new(&spec, diff), json);
        }
        Commands::Upload {
            file,
            spec,
            require_changes,
        } => {
            let spec = VariableSpec::parse(&spec)?;
            let content = read_file(&file)?;
            let store = open(&settings)?;
            let outcome =
                commands::upload_if_changed(store.as_ref(), &spec, &content, require_changes)?;
            output(&WriteResult::from_upload(&spec, outcome), json);
        }
        Commands::Cert {
            name,
            letsencrypt_base,
            var_base,
        } => {
            let le = LetsEncryptDir::open(&letsencrypt_base)?;
            let bundle = le.find(&name)?;
            let store = open(&settings)?;
            let action = export_cert(store.as_ref(), bundle, &var_base)?;
            output(
                &CertResult {
                    name: bundle.name.clone(),
                    variable: cert_variable_path(&var_base, &bundle.name),
                    action,
                },
                json,
            );
        }
    }
    Ok(())
}

fn open(settings: &ResolvedSettings) -> nomad_conf::Result<Box<dyn VariableStore>> {
    let config = settings.store_config();
    tracing::debug!(
        address = %config.address,
        source = %settings.nomad_server.source,
        namespace = %config.namespace,
        "opening store"
    );
    Ok(storage::open_store(&config)?)
}

fn run_var_command(
    command: VarCommands,
    store: &dyn VariableStore,
    json: bool,
) -> nomad_conf::Result<()> {
    match command {
        VarCommands::Get { spec: None } => {
            let paths = commands::list(store)?;
            output(&VariableList { paths }, json);
        }
        VarCommands::Get { spec: Some(spec) } => {
            let spec = VariableSpec::parse(&spec)?;
            let variable = commands::fetch(store, &spec)?;
            output(&RenderedVariable::new(&variable, &spec), json);
        }
        VarCommands::Put { spec } => {
            let spec = VariableSpec::parse(&spec)?;
            let value = read_stdin()?;
            commands::put(store, &spec, &value)?;
            output(&WriteResult::new(&spec, WriteAction::Updated), json);
        }
        VarCommands::Create { spec } => {
            let spec = VariableSpec::parse(&spec)?;
            let value = read_stdin()?;
            commands::create(store, &spec, &value)?;
            output(&WriteResult::new(&spec, WriteAction::Created), json);
        }
    }
    Ok(())
}

fn read_stdin() -> nomad_conf::Result<String> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn read_file(path: &Path) -> nomad_conf::Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        nomad_conf::Error::InvalidInput(format!("failed to read {}: {}", path.display(), e))
    })
}

/// Print a result. Human output is printed as-is so raw values keep their
/// exact bytes.
fn output<T: CommandResult>(result: &T, json: bool) {
    if json {
        println!("{}", result.to_json());
    } else {
        print!("{}", result.to_human());
    }
}
