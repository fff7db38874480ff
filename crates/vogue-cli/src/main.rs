use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;
use vogue_contracts::commands::{
    parse_session_input, CommandKind, SessionInput, SESSION_HELP_COMMANDS,
};
use vogue_contracts::events::EventWriter;
use vogue_contracts::images::{EncodedImage, GenerationResult};
use vogue_engine::{ApplicationState, Controller, EngineConfig, GenerationClient};

#[derive(Debug, Parser)]
#[command(name = "vogue", version, about = "Virtual try-on driver for Gemini image models")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    TryOn(TryOnArgs),
    Edit(EditArgs),
    Session(SessionArgs),
}

#[derive(Debug, Parser)]
struct TryOnArgs {
    #[arg(long)]
    person: PathBuf,
    #[arg(long)]
    outfit: PathBuf,
    #[arg(long)]
    instruction: Option<String>,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    model: Option<String>,
}

#[derive(Debug, Parser)]
struct EditArgs {
    #[arg(long)]
    image: PathBuf,
    #[arg(long)]
    instruction: String,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    model: Option<String>,
}

#[derive(Debug, Parser)]
struct SessionArgs {
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    model: Option<String>,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("vogue error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::TryOn(args) => run_try_on(args),
        Command::Edit(args) => run_edit(args),
        Command::Session(args) => {
            run_session(args)?;
            Ok(0)
        }
    }
}

fn build_controller(model: Option<String>, events: Option<PathBuf>) -> Controller {
    let config = EngineConfig::from_env().with_model(model);
    let events = events.map(|path| EventWriter::new(path, Uuid::new_v4().to_string()));
    Controller::new(GenerationClient::from_config(&config), events)
}

fn load_image(path: &Path) -> Result<EncodedImage> {
    EncodedImage::from_path(path).with_context(|| format!("cannot load {}", path.display()))
}

fn run_try_on(args: TryOnArgs) -> Result<i32> {
    let mut controller = build_controller(args.model, args.events);
    controller.select_person_image(Some(load_image(&args.person)?));
    controller.select_outfit_image(Some(load_image(&args.outfit)?));
    if let Some(instruction) = args.instruction {
        controller.set_instruction(instruction);
    }
    controller.run_try_on();
    finish_one_shot(controller.state(), &args.out)
}

fn run_edit(args: EditArgs) -> Result<i32> {
    let mut controller = build_controller(args.model, args.events);
    controller.select_person_image(Some(load_image(&args.image)?));
    controller.set_instruction(args.instruction);
    controller.run_edit();
    finish_one_shot(controller.state(), &args.out)
}

fn finish_one_shot(state: &ApplicationState, out: &Path) -> Result<i32> {
    if let Some(message) = state.error_message.as_deref() {
        bail!("{message}");
    }
    let Some(result) = state.result.as_ref() else {
        bail!("no image was generated");
    };
    let written = save_result(result, out)?;
    println!("Saved {}", written.display());
    if let Some(caption) = result.caption_text.as_deref() {
        println!("{caption}");
    }
    Ok(0)
}

fn run_session(args: SessionArgs) -> Result<()> {
    let mut controller = build_controller(args.model, args.events);
    let stdin = io::stdin();
    let mut line = String::new();

    println!(
        "Vogue session started ({}). Type /help for commands.",
        controller.client().model()
    );

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        match parse_session_input(line.trim_end_matches(['\n', '\r'])) {
            SessionInput::Noop => {}
            SessionInput::Instruction(text) => {
                controller.set_instruction(text);
                println!("Instruction set.");
            }
            SessionInput::Unknown { command, .. } => {
                println!("Unknown command /{command}. Type /help for commands.");
            }
            SessionInput::Command { kind, arg } => {
                handle_command(&mut controller, kind, arg);
            }
        }
    }

    Ok(())
}

fn handle_command(controller: &mut Controller, kind: CommandKind, arg: Option<String>) {
    match kind {
        CommandKind::Help => {
            println!("Commands: {}", SESSION_HELP_COMMANDS.join("  "));
            println!("Any other text sets the instruction.");
        }
        CommandKind::SelectPerson | CommandKind::SelectOutfit => {
            let Some(path) = arg else {
                println!("A path is required.");
                return;
            };
            match load_image(Path::new(&path)) {
                Ok(image) => {
                    println!("Loaded {path} ({})", image.mime_type());
                    if kind == CommandKind::SelectPerson {
                        controller.select_person_image(Some(image));
                    } else {
                        controller.select_outfit_image(Some(image));
                    }
                }
                Err(err) => println!("Load failed: {err:#}"),
            }
        }
        CommandKind::UnsetPerson => controller.select_person_image(None),
        CommandKind::UnsetOutfit => controller.select_outfit_image(None),
        CommandKind::TryOn => {
            println!("Generating try-on...");
            controller.run_try_on();
            print_outcome(controller.state());
        }
        CommandKind::Edit => {
            if let Some(instruction) = arg {
                controller.set_instruction(instruction);
            }
            println!("Applying edit...");
            controller.run_edit();
            print_outcome(controller.state());
        }
        CommandKind::Save => {
            let Some(path) = arg else {
                println!("/save requires a path");
                return;
            };
            match controller.state().result.as_ref() {
                Some(result) => match save_result(result, Path::new(&path)) {
                    Ok(written) => println!("Saved {}", written.display()),
                    Err(err) => println!("Save failed: {err:#}"),
                },
                None => println!("Nothing to save yet."),
            }
        }
        CommandKind::ShowState => println!("{}", describe_state(controller.state())),
        CommandKind::ClearAll => {
            controller.clear_all();
            println!("Cleared.");
        }
    }
}

fn print_outcome(state: &ApplicationState) {
    if let Some(message) = state.error_message.as_deref() {
        println!("Error: {message}");
        return;
    }
    if let Some(result) = state.result.as_ref() {
        println!("Result ready ({} chars). Use /save <path>.", result.image_url.len());
        if let Some(caption) = result.caption_text.as_deref() {
            println!("{caption}");
        }
    }
}

fn describe_image(image: Option<&EncodedImage>) -> String {
    match image {
        Some(image) => format!("{} ({})", image.mime_type(), image.fingerprint()),
        None => "-".to_string(),
    }
}

fn describe_state(state: &ApplicationState) -> String {
    let result = state
        .result
        .as_ref()
        .map(|result| match result.image() {
            Ok(image) => describe_image(Some(&image)),
            Err(_) => "unreadable".to_string(),
        })
        .unwrap_or_else(|| "-".to_string());
    let instruction = if state.instruction.is_empty() {
        "-"
    } else {
        state.instruction.as_str()
    };
    [
        format!("person: {}", describe_image(state.person_image.as_ref())),
        format!("outfit: {}", describe_image(state.outfit_image.as_ref())),
        format!("instruction: {instruction}"),
        format!("result: {result}"),
        format!("busy: {}", state.busy()),
        format!("error: {}", state.error_message.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

/// Appends the image's extension when `out` has none.
fn resolve_output_path(out: &Path, image: &EncodedImage) -> PathBuf {
    if out.extension().is_some() {
        return out.to_path_buf();
    }
    out.with_extension(image.file_extension())
}

fn save_result(result: &GenerationResult, out: &Path) -> Result<PathBuf> {
    let image = result.image().context("result is not a valid data URL")?;
    let bytes = image
        .decode_bytes()
        .context("result image payload is not valid base64")?;
    let path = resolve_output_path(out, &image);
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
