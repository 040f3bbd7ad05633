//! CLI interface for neet-tutor

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{self, SignInOutcome, SignInRequest, SignUpRequest};
use crate::catalog;
use crate::config::{self, Config};
use crate::dashboard::DashboardSummary;
use crate::error::TutorError;
use crate::flashcards::FallbackChain;
use crate::learning::{FlowView, LearningFlow, StepStatus};
use crate::onboarding::{confidence_label, OnboardingForm, OnboardingWizard, WizardAdvance};
use crate::profile::{self, ProfileUpdate};
use crate::routes::{self, Route};
use crate::store::{FileStorage, StepData, TutorState};
use crate::types::{StudyFormat, Subject, User};
use crate::vr::{HotspotId, VideoRequest, VrBridge};

#[derive(Parser)]
#[command(name = "neet-tutor")]
#[command(about = "NEET study companion with a guided learning flow and VR preview", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "NEET_TUTOR_CONFIG")]
    config: Option<PathBuf>,

    /// State file to use instead of the configured one
    #[arg(long, global = true, env = "NEET_TUTOR_STATE")]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with the demo account
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a demo account
    SignUp {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Sign out (progress is kept)
    Logout,
    /// Answer the onboarding questions and get a starting topic
    Onboard {
        /// Daily study time in hours
        #[arg(long, default_value = "2")]
        hours: f64,
        /// Preferred format: visual, auditory, kinesthetic, reading, mixed
        #[arg(long)]
        format: Option<String>,
        /// Weakest subject: Physics, Chemistry, Biology, Mathematics
        #[arg(long)]
        weak_subject: Option<String>,
        /// Confidence from 1 to 5
        #[arg(long, default_value = "3")]
        confidence: u8,
        /// Exam date (YYYY-MM-DD)
        #[arg(long)]
        exam_date: Option<NaiveDate>,
    },
    /// Work through the current topic
    Learn {
        #[command(subcommand)]
        command: LearnCommands,
    },
    /// Show progress across topics
    Dashboard,
    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// List the topic catalog
    Topics,
    /// Load flashcards for a topic
    Flashcards {
        /// Topic id
        topic: String,
    },
    /// Resolve a route the way the app would
    Navigate {
        /// Path such as /learn#quiz
        path: String,
    },
    /// VR preview controls
    Vr {
        #[command(subcommand)]
        command: VrCommands,
    },
    /// UI flags
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Start the web server
    Serve {
        /// Port to listen on (default from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to (default from config)
        #[arg(long)]
        host: Option<String>,
    },
    /// Show or reset configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
        /// Print the default configuration file
        #[arg(long)]
        defaults: bool,
    },
}

#[derive(Subcommand)]
enum LearnCommands {
    /// Show the current step and indicator
    Status,
    /// Complete a step of the current topic
    Complete {
        /// topic, flashcards, video, quiz or analysis
        step: String,
        /// Quiz accuracy (0-100)
        #[arg(long)]
        accuracy: Option<f64>,
        /// Hours spent
        #[arg(long)]
        time_spent: Option<f64>,
    },
    /// Open a specific step without changing progress
    Open {
        step: String,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the signed-in user
    Show,
    /// Change profile fields
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Daily study time in hours
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        weak_subject: Option<String>,
        #[arg(long)]
        confidence: Option<u8>,
        #[arg(long, conflicts_with = "clear_exam_date")]
        exam_date: Option<NaiveDate>,
        /// Remove the stored exam date
        #[arg(long)]
        clear_exam_date: bool,
        #[arg(long)]
        vr_enabled: Option<bool>,
    },
}

#[derive(Subcommand)]
enum VrCommands {
    /// Show the VR session
    State,
    /// Print the scene description as JSON
    Scene,
    /// Report video progress (percent)
    Progress {
        percent: f64,
    },
    /// Deliver a cross-frame message given as JSON
    Message {
        json: String,
    },
    /// Switch the VR topic and load its flashcards
    Topic {
        id: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Mark the current VR topic complete
    Complete,
    /// Show how the video lesson would be opened
    OpenVideo {
        /// Scene runs inside a parent frame
        #[arg(long)]
        embedded: bool,
    },
    /// Activate a hotspot: flashcards, video or quiz
    Hotspot {
        id: String,
    },
    /// Unlock every hotspot
    UnlockAll,
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Toggle VR mode
    VrMode,
    /// Turn demo mode on or off
    DemoMode {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

/// Loaded config plus the state handle every command works on
struct App {
    config: Config,
    tutor: TutorState,
}

impl App {
    fn open(config: Config) -> Result<Self> {
        let storage = FileStorage::from_config(&config)?;
        let tutor = TutorState::load(Arc::new(storage));
        Ok(Self { config, tutor })
    }

    fn chain(&self) -> FallbackChain {
        FallbackChain::from_config(&self.config, reqwest::Client::new())
    }

    fn bridge(&self) -> VrBridge {
        VrBridge::from_config(self.tutor.clone(), self.chain(), &self.config)
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(path) = cli.state {
        config.storage.path = Some(path);
    }

    match execute(cli.command, config).await {
        Err(e) => match e.downcast_ref::<TutorError>() {
            Some(TutorError::Redirect(route)) => {
                eprintln!("{}", redirect_hint(*route));
                std::process::exit(2);
            }
            Some(TutorError::Validation(fields)) => {
                for field in fields {
                    eprintln!("  {}", field);
                }
                std::process::exit(2);
            }
            _ => Err(e),
        },
        ok => ok,
    }
}

fn redirect_hint(route: Route) -> String {
    match route {
        Route::SignIn => "Not signed in. Run: neet-tutor sign-in --email <email> --password <password>".to_string(),
        Route::Onboarding => "Onboarding not finished. Run: neet-tutor onboard --weak-subject <subject>".to_string(),
        other => format!("Go to {} first", other.path()),
    }
}

async fn execute(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Config { show, reset, defaults } => {
            if reset {
                config::reset_config()?;
            } else if defaults {
                print!("{}", config::default_config_toml());
            } else if show {
                config::show_config(&config)?;
            } else {
                println!("Configuration options:");
                println!("  --show      Show current configuration");
                println!("  --reset     Reset configuration to defaults");
                println!("  --defaults  Print the default configuration file");
            }
            return Ok(());
        }
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            return crate::server::start(config, &host, port).await;
        }
        Commands::Topics => {
            for topic in catalog::topics() {
                println!(
                    "{:<26} {:<12} {:<12} {:>3} min  {}",
                    topic.id, topic.subject, topic.difficulty, topic.estimated_time, topic.name
                );
            }
            return Ok(());
        }
        _ => {}
    }

    let app = App::open(config)?;

    match command {
        Commands::SignIn { email, password } => {
            let outcome = auth::sign_in(&app.tutor, &SignInRequest { email, password }).await?;
            print_sign_in(&outcome);
        }
        Commands::SignUp { name, email, password, confirm_password } => {
            let req = SignUpRequest { name, email, password, confirm_password };
            let outcome = auth::sign_up(&app.tutor, &req).await?;
            print_sign_in(&outcome);
        }
        Commands::Logout => {
            app.tutor.logout().await;
            println!("Signed out. Progress is kept.");
        }
        Commands::Onboard { hours, format, weak_subject, confidence, exam_date } => {
            let form = OnboardingForm {
                daily_study_time: hours,
                preferred_format: format.as_deref().map(parse_format).transpose()?,
                weak_subject: weak_subject.as_deref().map(parse_subject).transpose()?,
                confidence,
                exam_date,
            };
            onboard(&app, form).await?;
        }
        Commands::Learn { command } => learn(&app, command).await?,
        Commands::Dashboard => {
            let summary = app.tutor.read(DashboardSummary::build).await?;
            print_dashboard(&summary);
        }
        Commands::Profile { command } => match command {
            ProfileCommands::Show => {
                let user = app
                    .tutor
                    .read(|s| s.user.clone())
                    .await
                    .ok_or(TutorError::Redirect(Route::SignIn))?;
                print_user(&user);
            }
            ProfileCommands::Set {
                name,
                email,
                hours,
                format,
                weak_subject,
                confidence,
                exam_date,
                clear_exam_date,
                vr_enabled,
            } => {
                let update = ProfileUpdate {
                    name,
                    email,
                    daily_study_time: hours,
                    preferred_format: format.as_deref().map(parse_format).transpose()?,
                    weak_subject: weak_subject.as_deref().map(parse_subject).transpose()?,
                    confidence,
                    exam_date: if clear_exam_date { Some(None) } else { exam_date.map(Some) },
                    vr_enabled,
                };
                if update.is_empty() {
                    println!("Nothing to change.");
                    return Ok(());
                }
                let user = profile::save_profile(&app.tutor, &update).await?;
                println!("Profile saved.");
                print_user(&user);
            }
        },
        Commands::Flashcards { topic } => {
            let loaded = app.chain().resolve(&topic).await;
            match &loaded.origin {
                Some(origin) => println!("{} flashcards for {} (from {})", loaded.cards.len(), topic, origin),
                None => println!("No flashcard source available for {}", topic),
            }
            for (i, card) in loaded.cards.iter().enumerate() {
                println!("{:>2}. {}", i + 1, card.front);
                if !card.back.is_empty() {
                    println!("    {}", card.back);
                }
            }
        }
        Commands::Navigate { path } => {
            let navigation = app.tutor.read(|s| routes::resolve(&path, s)).await;
            print_json(&navigation)?;
        }
        Commands::Vr { command } => vr(&app, command).await?,
        Commands::Settings { command } => match command {
            SettingsCommands::VrMode => {
                let enabled = app.tutor.toggle_vr_mode().await;
                println!("VR mode {}", if enabled { "on" } else { "off" });
            }
            SettingsCommands::DemoMode { enabled } => {
                app.tutor.set_demo_mode(enabled).await;
                println!("Demo mode {}", if enabled { "on" } else { "off" });
            }
        },
        Commands::Config { .. } | Commands::Serve { .. } | Commands::Topics => {}
    }

    Ok(())
}

fn parse_format(s: &str) -> Result<StudyFormat> {
    StudyFormat::parse(s).with_context(|| {
        let known: Vec<_> = StudyFormat::ALL.iter().map(|f| f.as_str()).collect();
        format!("Unknown format '{}'. Choose one of: {}", s, known.join(", "))
    })
}

fn parse_subject(s: &str) -> Result<Subject> {
    Subject::parse(s).with_context(|| {
        let known: Vec<_> = Subject::ALL.iter().map(|f| f.as_str()).collect();
        format!("Unknown subject '{}'. Choose one of: {}", s, known.join(", "))
    })
}

async fn onboard(app: &App, form: OnboardingForm) -> Result<()> {
    let mut wizard = OnboardingWizard::with_form(form);
    let outcome = loop {
        let step = wizard.current_step();
        match wizard.next() {
            Ok(WizardAdvance::Moved(_)) => println!("  [{}/4] {}", step.number(), step.title()),
            Ok(WizardAdvance::Finished(outcome)) => {
                println!("  [{}/4] {}", step.number(), step.title());
                break outcome;
            }
            Err(e) => {
                eprintln!("Step {} ({}) is incomplete:", step.number(), step.title());
                return Err(e.into());
            }
        }
    };

    app.tutor.complete_onboarding(&outcome).await?;
    app.bridge().set_current_topic(&outcome.recommended_topic, None).await;

    println!();
    println!(
        "Confidence: {} ({})",
        outcome.profile.confidence,
        confidence_label(outcome.profile.confidence)
    );
    println!(
        "Recommended topic: {} ({})",
        catalog::display_name(&outcome.recommended_topic),
        outcome.recommended_topic
    );
    println!("Next: neet-tutor learn status");
    Ok(())
}

async fn learn(app: &App, command: LearnCommands) -> Result<()> {
    match command {
        LearnCommands::Status => {
            let view = app.tutor.read(|s| LearningFlow::enter(s).map(|f| f.view())).await?;
            print_flow(&view);
        }
        LearnCommands::Open { step } => {
            let view = app
                .tutor
                .read(|s| LearningFlow::enter_at(s, Some(step.as_str())).map(|f| f.view()))
                .await?;
            print_flow(&view);
        }
        LearnCommands::Complete { step, accuracy, time_spent } => {
            let topic_id = app
                .tutor
                .read(|s| LearningFlow::enter(s).map(|f| f.topic().id.clone()))
                .await?;
            let data = StepData { accuracy, time_spent };
            let progress = app.tutor.complete_step_named(&topic_id, &step, &data).await?;
            println!(
                "Completed {} for {} ({}/5 steps)",
                step.trim(),
                topic_id,
                progress.completed_steps.len()
            );
            let view = app.tutor.read(|s| LearningFlow::enter(s).map(|f| f.view())).await?;
            print_flow(&view);
        }
    }
    Ok(())
}

async fn vr(app: &App, command: VrCommands) -> Result<()> {
    let bridge = app.bridge();
    match command {
        VrCommands::State => print_json(&bridge.session().await)?,
        VrCommands::Scene => print_json(&bridge.scene().await)?,
        VrCommands::Progress { percent } => {
            if bridge.on_video_progress(percent).await {
                println!("Quiz unlocked!");
            }
            let session = bridge.session().await;
            println!(
                "Video progress {}%, quiz {}",
                session.video_progress,
                if session.unlocked.quiz { "unlocked" } else { "locked" }
            );
        }
        VrCommands::Message { json } => {
            let message: serde_json::Value =
                serde_json::from_str(&json).context("Message is not valid JSON")?;
            if bridge.handle_message(&message).await {
                println!("Message handled");
            } else {
                println!("Message ignored");
            }
        }
        VrCommands::Topic { id, name } => {
            let load = bridge.set_current_topic(&id, name.as_deref()).await;
            println!("VR topic: {}", catalog::display_name(&id));
            println!("{}", bridge.session().await.flashcards_panel());
            if load.origin.is_none() {
                println!("(no flashcard source answered)");
            }
        }
        VrCommands::Complete => {
            if bridge.mark_topic_complete().await {
                println!("Topic Complete!");
            } else {
                println!("Topic was already complete");
            }
        }
        VrCommands::OpenVideo { embedded } => match bridge.open_video(embedded).await {
            VideoRequest::Parent { message } => {
                println!("Post to parent frame:");
                print_json(&message)?;
            }
            VideoRequest::NewWindow { url } => println!("Open in new window: {}", url),
        },
        VrCommands::Hotspot { id } => {
            let id: HotspotId = id.parse()?;
            let navigation = bridge.activate_hotspot(id).await?;
            print_json(&navigation)?;
        }
        VrCommands::UnlockAll => {
            bridge.unlock_all().await;
            println!("All content unlocked");
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_sign_in(outcome: &SignInOutcome) {
    println!("Signed in as {} <{}>", outcome.user.name, outcome.user.email);
    match outcome.next {
        Route::Onboarding => println!("Next: neet-tutor onboard"),
        Route::Dashboard => println!("Next: neet-tutor dashboard"),
        other => println!("Next: {}", other.path()),
    }
}

fn print_user(user: &User) {
    println!("Name:          {}", user.name);
    println!("Email:         {}", user.email);
    println!("Daily study:   {}h", user.daily_study_time);
    println!(
        "Format:        {}",
        user.preferred_format.map(|f| f.label()).unwrap_or("-")
    );
    println!(
        "Weak subject:  {}",
        user.weak_subject.map(|s| s.as_str()).unwrap_or("-")
    );
    println!("Confidence:    {}/5", user.confidence);
    if let Some(date) = user.exam_date {
        println!("Exam date:     {}", date);
    }
    println!("VR enabled:    {}", user.vr_enabled);
}

fn print_flow(view: &FlowView) {
    println!("{} ({})", view.topic.name, view.topic.subject);
    let indicator: Vec<String> = view
        .steps
        .iter()
        .map(|s| match s.status {
            StepStatus::Completed => format!("[x] {}", s.label),
            StepStatus::Current => format!("[>] {}", s.label),
            StepStatus::Pending => format!("[ ] {}", s.label),
        })
        .collect();
    println!("{}", indicator.join("  "));
    println!("Progress: {:.0}%", view.progress_percent);
    println!("Next action: {}", view.call_to_action);
}

fn print_dashboard(summary: &DashboardSummary) {
    println!("Welcome back, {}", summary.user_name);
    println!();
    println!("Topics completed:  {}", summary.stats.completed_topics);
    println!("Topics started:    {}", summary.stats.topics_started);
    println!("Study time:        {}h", summary.stats.total_study_time);
    println!("Average accuracy:  {:.0}%", summary.stats.average_accuracy);
    println!();
    for subject in &summary.subjects {
        println!("  {:<12} {}/{}", subject.subject, subject.completed, subject.total);
    }
    if let Some(current) = &summary.current_topic {
        println!();
        println!("Current topic: {} ({:.0}%)", current.name, current.percent);
    }
}
