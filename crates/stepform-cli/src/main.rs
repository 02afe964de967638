use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use stepform::{
    Clock, FileStorage, FormController, FormDefinition, FormSignal, ManualClock, MemoryStorage,
    QueryParams, Storage, SystemClock,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stepform")]
#[command(about = "Drive multi-step form definitions from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a definition and list its steps and rules.
    Check { definition: PathBuf },
    /// Print the JSON schema of form definitions.
    Schema,
    /// Replay a sequence of actions against a definition.
    ///
    /// Actions: next, prev, goto:N (1-indexed), set:ID=VALUE, check:ID,
    /// uncheck:ID, blur:ID, wait:MS, submit, reset, unload.
    Run {
        definition: PathBuf,
        /// Query string applied at start, e.g. "step=2&email=a@b.c".
        #[arg(long)]
        query: Option<String>,
        /// Keep progress in this directory instead of memory.
        #[arg(long)]
        state_dir: Option<PathBuf>,
        actions: Vec<String>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Check { definition } => check(&definition),
        Command::Schema => {
            let schema = schemars::schema_for!(FormDefinition);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        Command::Run {
            definition,
            query,
            state_dir,
            actions,
        } => run(&definition, query.as_deref(), state_dir.as_deref(), &actions),
    }
}

fn init_logging() {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_definition(path: &Path) -> Result<FormDefinition> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let definition = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => FormDefinition::from_json_str(&text),
        _ => FormDefinition::from_yaml_str(&text),
    };
    definition.with_context(|| format!("invalid form definition {}", path.display()))
}

fn check(path: &Path) -> Result<()> {
    let (form, config) = load_definition(path)?.into_parts()?;
    println!(
        "form '{}': {} step(s), storage key {}",
        form.id(),
        form.step_count(),
        config.storage_key(form.id())
    );
    for (index, step) in form.steps().iter().enumerate() {
        let title = step.title.as_deref().unwrap_or("untitled");
        println!("  step {}: {title}", index + 1);
        for field in &step.fields {
            let rules = field.rules.as_deref().unwrap_or("-");
            println!("    {} ({:?}) rules: {rules}", field.id, field.kind);
        }
    }
    Ok(())
}

fn run(
    path: &Path,
    query: Option<&str>,
    state_dir: Option<&Path>,
    actions: &[String],
) -> Result<()> {
    let definition = load_definition(path)?;
    let storage: Box<dyn Storage> = match state_dir {
        Some(dir) => Box::new(FileStorage::new(dir)),
        None => Box::new(MemoryStorage::new()),
    };
    let clock = ManualClock::new(SystemClock.now_ms());
    let mut controller = FormController::from_definition(definition, storage, Box::new(clock.clone()))?;

    let params = query.map(QueryParams::parse);
    controller.start(params.as_ref());
    print_signals(controller.drain_signals())?;

    for action in actions {
        apply(&mut controller, &clock, action).with_context(|| format!("action '{action}'"))?;
        print_signals(controller.drain_signals())?;
    }

    controller.destroy();
    Ok(())
}

fn apply(controller: &mut FormController, clock: &ManualClock, action: &str) -> Result<()> {
    let (verb, arg) = match action.split_once(':') {
        Some((verb, arg)) => (verb, Some(arg)),
        None => (action, None),
    };
    let arg = || arg.ok_or_else(|| anyhow!("'{verb}' needs an argument"));

    match verb {
        "next" => {
            controller.next_step();
        }
        "prev" => {
            controller.previous_step();
        }
        "goto" => {
            let step: usize = arg()?.parse().context("step must be a number")?;
            if step == 0 || controller.go_to_step(step - 1).is_none() {
                bail!("no step {step}");
            }
        }
        "set" => {
            let (id, value) = arg()?
                .split_once('=')
                .ok_or_else(|| anyhow!("expected ID=VALUE"))?;
            controller.set_value(id, value)?;
        }
        "check" => controller.set_checked(arg()?, true)?,
        "uncheck" => controller.set_checked(arg()?, false)?,
        "blur" => {
            let id = arg()?;
            let valid = controller.blur(id)?;
            if !valid && let Some(message) = controller.validation().error(id) {
                println!("{}", serde_json::json!({ "field": id, "error": message }));
            }
        }
        "wait" => {
            let ms: u64 = arg()?.parse().context("wait takes milliseconds")?;
            clock.advance(ms);
            controller.tick();
        }
        "submit" => {
            if let Err(err) = controller.submit() {
                tracing::info!(%err, "submission rejected");
            }
        }
        "reset" => controller.reset(),
        "unload" => {
            controller.unload();
        }
        other => bail!("unknown action '{other}'"),
    }
    Ok(())
}

fn print_signals(signals: Vec<FormSignal>) -> Result<()> {
    for signal in signals {
        println!("{}", serde_json::to_string(&signal)?);
    }
    Ok(())
}
