use std::env;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use snapmatch::api::{ApiClient, PhotoEventApi};
use snapmatch::flow::{CaptureFlow, FlowStage, FlowUi};
use snapmatch::notify::{Kind, NotifyCenter};
use snapmatch::{auth, cms, config, render, Camera};

#[derive(Parser)]
#[command(name = "snapmatch")]
#[command(version, about = "Client for the photo-event face-match service")]
struct Cli {
    /// Server base URL (overrides the configured one)
    #[arg(long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the dashboard location
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Register a new admin (requires the master token)
    Register {
        #[arg(long)]
        master_token: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, default_value = "admin")]
        role: String,
    },
    /// Update an event through the CMS edit form
    EditEvent {
        event_id: String,
        /// Form fields as key=value, repeatable
        #[arg(short, long, value_parser = parse_key_val)]
        field: Vec<(String, String)>,
    },
    /// Delete an event after confirmation
    DeleteEvent {
        event_id: String,
        /// Skip the interactive prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Capture a selfie and match it against an event's photos
    Selfie {
        event_id: String,
        /// Name of the person in the selfie
        #[arg(short, long)]
        name: String,
        /// Keep the first captured frame without asking
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// List every photo reference for an event
    Gallery { event_id: String },
    /// Open config file in editor
    Config,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(None)?;
    let server = cli.server.unwrap_or_else(|| cfg.server.clone());
    let api = ApiClient::new(&server, Duration::from_secs(cfg.timeout_secs))
        .context("building HTTP client")?;

    match cli.command {
        Commands::Login { email, password } => login(&api, &server, &email, &password),
        Commands::Register {
            master_token,
            email,
            password,
            confirm_password,
            role,
        } => register(&api, master_token, email, password, confirm_password, role),
        Commands::EditEvent { event_id, field } => edit_event(&api, &event_id, &field),
        Commands::DeleteEvent { event_id, yes } => delete_event(&api, &event_id, yes),
        Commands::Selfie {
            event_id,
            name,
            yes,
        } => selfie(&api, &cfg, &event_id, &name, yes),
        Commands::Gallery { event_id } => gallery(&api, &cfg, &event_id),
        Commands::Config => open_config(),
    }
}

fn login(api: &ApiClient, server: &str, email: &str, password: &str) -> Result<()> {
    let mut center = NotifyCenter::new();
    let destination = auth::login(api, &mut center, email, password);
    flush_toasts(&mut center);
    match destination {
        Some(path) => {
            info!("✓ Logged in. Dashboard: {server}{path}");
            Ok(())
        }
        None => anyhow::bail!("login failed"),
    }
}

fn register(
    api: &ApiClient,
    master_token: String,
    email: String,
    password: String,
    confirm_password: String,
    role: String,
) -> Result<()> {
    let mut center = NotifyCenter::new();
    let mut form = auth::RegistrationForm {
        master_token,
        email,
        password,
        confirm_password,
        role,
    };
    let created = auth::register(api, &mut center, &mut form);
    flush_toasts(&mut center);
    if !created {
        anyhow::bail!("registration failed");
    }
    Ok(())
}

fn edit_event(api: &ApiClient, event_id: &str, fields: &[(String, String)]) -> Result<()> {
    let mut view = cms::CmsView::new();
    view.open_edit_modal(event_id);
    view.submit_edit(api, fields)
        .with_context(|| format!("editing event {event_id}"))?;
    info!("✓ Event {event_id} updated");
    Ok(())
}

fn delete_event(api: &ApiClient, event_id: &str, yes: bool) -> Result<()> {
    let confirm = |prompt: &str| yes || prompt_yes_no(prompt).unwrap_or(false);
    let issued = cms::delete_event(api, event_id, confirm)
        .with_context(|| format!("deleting event {event_id}"))?;
    if issued {
        info!("✓ Event {event_id} deleted");
    } else {
        info!("Delete cancelled");
    }
    Ok(())
}

fn selfie(
    api: &ApiClient,
    cfg: &config::Config,
    event_id: &str,
    name: &str,
    keep_first: bool,
) -> Result<()> {
    let mut flow = CaptureFlow::new(cfg.capture_width, cfg.capture_height);
    let mut ui = TermUi;

    info!("Opening camera: {}", cfg.camera);
    flow.start_camera(&mut ui, || Camera::open(&cfg.camera))?;
    if flow.stage() == FlowStage::Idle {
        anyhow::bail!("camera unavailable");
    }

    flow.capture_photo()?;
    while !keep_first && !prompt_yes_no("Keep this frame?")? {
        flow.retake_photo()?;
        flow.capture_photo()?;
    }

    info!("Submitting selfie for {name}...");
    flow.submit_selfie(api, &mut ui, name, Some(event_id))?;

    match flow.matches() {
        Some(matches) => {
            for line in render::render_matches(matches, |id| api.image_url(id), |id| {
                api.image_available(id)
            }) {
                println!("{line}");
            }
            Ok(())
        }
        None => anyhow::bail!("selfie match failed"),
    }
}

fn gallery(api: &ApiClient, cfg: &config::Config, event_id: &str) -> Result<()> {
    let mut flow: CaptureFlow<Camera> = CaptureFlow::new(cfg.capture_width, cfg.capture_height);
    let mut ui = TermUi;
    flow.load_gallery(api, &mut ui, Some(event_id))?;
    match flow.photos() {
        Some(photos) => {
            for line in render::render_gallery(photos, |id| api.image_url(id), |id| {
                api.image_available(id)
            }) {
                println!("{line}");
            }
            Ok(())
        }
        None => anyhow::bail!("gallery load failed"),
    }
}

fn open_config() -> Result<()> {
    let config_path = config::CONFIG_PATH.as_os_str();
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}

struct TermUi;

impl FlowUi for TermUi {
    fn alert(&mut self, message: &str) {
        log::warn!("{message}");
    }

    fn loading(&mut self, visible: bool) {
        if visible {
            info!("Working...");
        }
    }
}

fn flush_toasts(center: &mut NotifyCenter) {
    let now = Instant::now();
    for toast in center.visible_at(now) {
        match toast.kind {
            Kind::Success => info!("✓ {}", toast.message),
            Kind::Error => log::error!("{}", toast.message),
        }
    }
    center.sweep(now + snapmatch::notify::DISPLAY_WINDOW + snapmatch::notify::DISMISS_GRACE);
}

fn prompt_yes_no(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes" | "Yes" | "YES"))
}

fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("`{raw}` is not a key=value pair"))
}
