#![warn(missing_docs)]
//! # digital-shield binary
//!
//! Command-line entry point: scan a message, manage saved scans, export
//! reports, change language and theme.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use shield_app::{
    ActionOutcome, AppConfig, ScannerController, app_version, init_tracing, now_ms,
    redact_sensitive,
};
use shield_auth::Credentials;
use shield_core::{DemoScenario, ScanRecord};
use shield_export::{HISTORY_REPORT_FILE, SCANS_REPORT_FILE, history_report, scans_report};
use shield_history::{
    DASHBOARD_WINDOW, JsonFileHistoryStore, dashboard_stats, demo_records, score_trend,
};
use shield_settings::{JsonFileSettingsStore, Language, SettingsUpdate, Theme};
use shield_ui::{NotificationKind, ScannerState, display_category};
use time::OffsetDateTime;
use tracing::{info, warn};

/// AI Digital Shield command-line client.
#[derive(Parser)]
#[command(name = "digital-shield")]
#[command(about = "Detect toxic messages, rewrite them safely and keep a scan history")]
#[command(version = env!("SHIELD_VERSION"))]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a message for toxicity
    Analyze {
        /// Message text
        text: Option<String>,
        /// Load a demo scenario (low, medium, high) instead of TEXT
        #[arg(long, conflicts_with = "text")]
        scenario: Option<String>,
        /// Load the example message instead of TEXT
        #[arg(long, conflicts_with_all = ["text", "scenario"])]
        example: bool,
        /// Also request a safer rewrite
        #[arg(long)]
        rewrite: bool,
        /// Also request safety advice
        #[arg(long)]
        advice: bool,
        /// Save the result to history (requires login)
        #[arg(long)]
        save: bool,
    },
    /// Manage saved scans
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
    /// Show dashboard statistics
    Stats {
        /// Use sample records instead of the signed-in history
        #[arg(long)]
        demo: bool,
    },
    /// Export the newest scans as a report
    Report {
        /// Output file
        #[arg(long, default_value = SCANS_REPORT_FILE)]
        out: PathBuf,
        /// Report title
        #[arg(long)]
        title: Option<String>,
        /// Use sample records instead of the signed-in history
        #[arg(long)]
        demo: bool,
    },
    /// Show or change language and theme
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the current settings
    Get,
    /// Change language and/or theme
    Set {
        /// Interface language (en, sw)
        #[arg(long)]
        language: Option<Language>,
        /// Color theme (light, dark)
        #[arg(long, conflicts_with = "toggle_theme")]
        theme: Option<Theme>,
        /// Switch between light and dark
        #[arg(long)]
        toggle_theme: bool,
    },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List saved scans, newest first
    List {
        /// Maximum number of scans
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete a saved scan
    Delete {
        /// Record id
        id: String,
    },
    /// Export every saved scan
    Export {
        /// Output file
        #[arg(long, default_value = HISTORY_REPORT_FILE)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.config.log_json)?;
    info!(version = app_version(), "digital-shield starting");

    let config = cli.config;
    let gateway = Arc::new(config.build_gateway()?);
    let store = Arc::new(JsonFileHistoryStore::new(&config.history_path));
    let settings = Arc::new(JsonFileSettingsStore::new(&config.settings_path));
    let controller =
        ScannerController::new(gateway, store, app_version()).with_settings_store(settings);
    controller.with_state(|state| state.set_model(&config.model));

    match cli.command {
        Command::Analyze {
            text,
            scenario,
            example,
            rewrite,
            advice,
            save,
        } => {
            load_input(&controller, &config, text, scenario.as_deref(), example)?;
            run_scan(&controller, &config, rewrite, advice, save).await
        }
        Command::History { action } => {
            sign_in(&controller, &config).await?;
            run_history(&controller, action).await
        }
        Command::Stats { demo } => {
            let now = OffsetDateTime::now_utc();
            let records = recent_records(&controller, &config, demo, now).await?;
            let stats = dashboard_stats(&records, now);
            println!("{}", controller.snapshot().label("dashboard.title"));
            println!("Total scans:   {}", stats.total);
            println!("This week:     {}", stats.this_week);
            println!("Average score: {}", stats.avg_score);
            println!("{}:", controller.snapshot().label("dashboard.chart"));
            for (label, score) in score_trend(&records) {
                println!("  {label}: {score}");
            }
            Ok(())
        }
        Command::Report { out, title, demo } => {
            let records =
                recent_records(&controller, &config, demo, OffsetDateTime::now_utc()).await?;
            scans_report(&records, title.as_deref())?.write_to(&out)?;
            println!("Report written to {}", out.display());
            Ok(())
        }
        Command::Settings { action } => {
            sign_in(&controller, &config).await?;
            run_settings(&controller, action).await
        }
    }
}

fn load_input(
    controller: &ScannerController,
    config: &AppConfig,
    text: Option<String>,
    scenario: Option<&str>,
    example: bool,
) -> Result<()> {
    let scenario = scenario.map(DemoScenario::from_str).transpose()?;
    controller.with_state(|state| {
        if let Some(text) = text {
            state.set_text(text);
        } else if let Some(scenario) = scenario {
            state.load_scenario(scenario);
        } else if example {
            state.load_example();
        } else if let Some(page_url) = &config.page_url {
            state.prefill_from_url(page_url);
        }
    });
    Ok(())
}

async fn run_scan(
    controller: &ScannerController,
    config: &AppConfig,
    rewrite: bool,
    advice: bool,
    save: bool,
) -> Result<()> {
    let outcome = controller.analyze().await;
    report_notifications(controller);
    if outcome != ActionOutcome::Applied {
        bail!("analysis did not complete");
    }
    print_analysis(&controller.snapshot());

    if rewrite && controller.rewrite_safely().await == ActionOutcome::Applied {
        println!("\nSafer version:\n  {}", controller.snapshot().safer_version);
    }
    if advice && controller.get_advice().await == ActionOutcome::Applied {
        println!("\nAdvice:\n  {}", controller.snapshot().advice);
    }
    report_notifications(controller);

    if save {
        sign_in(controller, config).await?;
        let saved = controller.save_to_history(now_ms()).await;
        report_notifications(controller);
        let record = saved?;
        println!("Saved as {}", record.id);
    }
    Ok(())
}

async fn run_history(controller: &ScannerController, action: HistoryCommand) -> Result<()> {
    match action {
        HistoryCommand::List { limit } => {
            let records = controller.history(now_ms(), limit).await?;
            println!("{}", controller.snapshot().label("history.title"));
            if records.is_empty() {
                println!("No saved scans.");
            }
            for record in &records {
                print_record(record);
            }
        }
        HistoryCommand::Delete { id } => {
            controller.delete_scan(now_ms(), &id).await?;
            println!("Deleted {id}");
        }
        HistoryCommand::Export { out } => {
            let records = controller.history(now_ms(), None).await?;
            history_report(&records, OffsetDateTime::now_utc())?.write_to(&out)?;
            println!("History exported to {}", out.display());
        }
    }
    Ok(())
}

async fn run_settings(controller: &ScannerController, action: SettingsCommand) -> Result<()> {
    let settings = match action {
        SettingsCommand::Get => controller.load_settings(now_ms()).await?,
        SettingsCommand::Set {
            language,
            theme,
            toggle_theme,
        } => {
            let current = controller.snapshot().settings;
            let theme = theme.or(toggle_theme.then(|| current.theme.toggled()));
            let update = SettingsUpdate { language, theme };
            if update.is_empty() {
                bail!("nothing to change: pass --language, --theme or --toggle-theme");
            }
            let settings = controller.update_settings(now_ms(), update).await?;
            report_notifications(controller);
            settings
        }
    };

    println!("{}", settings.translate("settings.title"));
    println!(
        "  {}: {} ({})",
        settings.translate("settings.language"),
        settings.language.label(),
        settings.language
    );
    println!("  {}: {}", settings.translate("settings.theme"), settings.theme);
    Ok(())
}

async fn recent_records(
    controller: &ScannerController,
    config: &AppConfig,
    demo: bool,
    now: OffsetDateTime,
) -> Result<Vec<ScanRecord>> {
    if demo {
        return Ok(demo_records(now));
    }
    sign_in(controller, config).await?;
    Ok(controller.history(now_ms(), Some(DASHBOARD_WINDOW)).await?)
}

async fn sign_in(controller: &ScannerController, config: &AppConfig) -> Result<()> {
    if controller.session(now_ms()).is_some() {
        return Ok(());
    }

    let client = config
        .build_auth_client()?
        .context("SHIELD_AUTH_URL is required for history commands")?;
    let (Some(email), Some(password)) = (&config.email, &config.password) else {
        bail!("SHIELD_EMAIL and SHIELD_PASSWORD are required for history commands");
    };

    let credentials = Credentials {
        email: email.clone(),
        password: password.clone(),
    };
    match client.login(&credentials, now_ms()).await {
        Ok(session) => {
            controller.sign_in(session);
            if let Err(error) = controller.load_settings(now_ms()).await {
                warn!(error = %error, "settings unavailable; using defaults");
            }
            Ok(())
        }
        Err(error) => {
            warn!(error = %redact_sensitive(&error.to_string()), "login failed");
            Err(error.into())
        }
    }
}

fn report_notifications(controller: &ScannerController) {
    for note in controller.with_state(ScannerState::take_notifications) {
        match note.kind {
            NotificationKind::Success => println!("[ok] {}: {}", note.title, note.description),
            NotificationKind::Error => eprintln!("[error] {}: {}", note.title, note.description),
        }
    }
}

fn print_analysis(state: &ScannerState) {
    let Some(analysis) = &state.analysis else {
        return;
    };

    let marked: String = state
        .highlighted()
        .iter()
        .map(|token| {
            if token.flagged {
                format!("[{}]", token.text)
            } else {
                token.text.clone()
            }
        })
        .collect();

    println!("\nMessage:  {marked}");
    println!(
        "{}: {}/100",
        state.label("scanner.score"),
        analysis.toxicity_score
    );
    println!(
        "Severity: {} ({:?})",
        analysis.severity,
        state.severity_style().unwrap_or(shield_ui::SeverityStyle::Muted)
    );
    if !analysis.categories.is_empty() {
        let labels: Vec<String> = analysis
            .categories
            .iter()
            .map(|category| display_category(category))
            .collect();
        println!(
            "{}: {}",
            state.label("scanner.categories"),
            labels.join(", ")
        );
    }
    if !analysis.explanation.is_empty() {
        println!("Why:      {}", analysis.explanation);
    }
    println!("Model:    {}", analysis.model_used);
}

fn print_record(record: &ScanRecord) {
    println!(
        "{}  {}  score={:>3}  {}",
        record.id,
        record.created_at,
        record.toxicity_score,
        record.categories.join(", ")
    );
    println!("    {}", record.original_text);
}
