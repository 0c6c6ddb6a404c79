use clap::Parser;
use remindctl::api::{
    AudioUpload, CalendarAddRequest, MemoryCreateRequest, MemoryType, ReminderStatus,
};
use remindctl::app::AppContext;
use remindctl::cli::{
    AdminAction, BillingAction, CalendarAction, Cli, Commands, ConfigAction, MemoriesAction,
    PrefsAction, PushAction, RemindersAction, SettingsAction,
};
use remindctl::config::{
    ClientSettingsPatch, Config, FileStorage, PreferenceKey, SessionOverrides, DEFAULT_CONFIG_FILE,
};
use remindctl::infra::doctor;
use remindctl::logging;
use remindctl::screens::{
    describe_action, ChatController, ConsoleAlerts, RegistrationOutcome, StaticPushPlatform,
};

use anyhow::{bail, Context};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(profile) = cli.profile.as_deref() {
        config.profile = profile.parse().map_err(anyhow::Error::msg)?;
    }
    logging::init(&config.logging);

    // Commands that never touch the backend or persisted settings.
    match &cli.command {
        Commands::Version => {
            println!("remindctl {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Config(action) => {
            match action {
                ConfigAction::Show => print_json(&config)?,
                ConfigAction::Validate => {
                    info!("Configuration is valid");
                }
                ConfigAction::Init => {
                    Config::write_default(cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_FILE))?;
                    info!("Configuration file created");
                }
            }
            return Ok(());
        }
        _ => {}
    }

    let storage = Arc::new(FileStorage::new(config.state_dir.clone()));
    let ctx = AppContext::init(
        config,
        storage,
        SessionOverrides::from_env(),
        Arc::new(ConsoleAlerts),
    )
    .await?;

    match cli.command {
        Commands::Chat(opts) => {
            let chat = match opts.persona {
                Some(persona) => ChatController::new(ctx.client.clone(), Some(persona)),
                None => ctx.chat(),
            };
            if let Some(response) = chat.submit(&opts.message).await? {
                println!("{}", response.assistant_message);
                for action in &response.actions {
                    println!("  - {}", describe_action(action));
                }
            }
        }
        Commands::Reminders(action) => {
            let reminders = ctx.reminders();
            match action {
                RemindersAction::List { status } => {
                    let status = status
                        .map(|s| s.parse::<ReminderStatus>())
                        .transpose()
                        .map_err(anyhow::Error::msg)?;
                    reminders.refresh().await?;
                    let view = reminders.view();
                    let shown: Vec<_> = view
                        .reminders
                        .iter()
                        .filter(|r| status.map_or(true, |s| r.status == s))
                        .collect();
                    print_json(&shown)?;
                }
                RemindersAction::Cancel { id } => {
                    let response = reminders.cancel(id).await?;
                    print_json(&response)?;
                }
            }
        }
        Commands::Admin(action) => {
            let admin = ctx.admin();
            match action {
                AdminAction::Overview => {
                    admin.refresh().await?;
                    print_json(&admin.view())?;
                }
                AdminAction::Toggle { key } => {
                    let record = admin.toggle_flag(&key).await?;
                    print_json(&record)?;
                }
                AdminAction::Set {
                    key,
                    enabled,
                    description,
                } => {
                    let record = admin.set_flag(&key, enabled, description).await?;
                    print_json(&record)?;
                }
            }
        }
        Commands::Settings(action) => {
            let settings = ctx.settings();
            match action {
                SettingsAction::Show => print_json(&settings.show())?,
                SettingsAction::Set(opts) => {
                    let shown = settings
                        .save(ClientSettingsPatch {
                            api_key: opts.api_key,
                            api_base_url: opts.base_url,
                            timezone: opts.timezone,
                            admin_token: opts.admin_token,
                        })
                        .await?;
                    print_json(&shown)?;
                }
                SettingsAction::Reset => {
                    settings.reset().await?;
                    print_json(&settings.show())?;
                }
            }
        }
        Commands::Prefs(action) => {
            let settings = ctx.settings();
            match action {
                PrefsAction::Show => {}
                PrefsAction::Toggle { name } => {
                    let key: PreferenceKey = name.parse().map_err(anyhow::Error::msg)?;
                    settings.toggle_preference(key);
                }
            }
            print_json(&settings.preferences())?;
        }
        Commands::Push(action) => match action {
            PushAction::Register { token } => {
                let registrar =
                    ctx.push_registrar(Arc::new(StaticPushPlatform::granted(token)))?;
                let mount = registrar.mount();
                match mount.maybe_register().await {
                    RegistrationOutcome::Registered(_) => info!("Push token registered"),
                    RegistrationOutcome::Skipped(reason) => {
                        info!(?reason, "Push registration skipped")
                    }
                    RegistrationOutcome::Failed(message) => bail!(message),
                    RegistrationOutcome::Denied => bail!("Notification permission was denied"),
                }
                print_json(&ctx.settings().show())?;
            }
            PushAction::Clear => {
                let registrar = ctx.push_registrar(Arc::new(StaticPushPlatform::denied()))?;
                registrar.unregister().await?;
                print_json(&ctx.settings().show())?;
            }
        },
        Commands::Calendar(action) => match action {
            CalendarAction::Add {
                reminder_id,
                title,
                description,
                duration,
            } => {
                let response = ctx
                    .client
                    .calendar_add(&CalendarAddRequest {
                        reminder_id,
                        title,
                        description,
                        duration_minutes: duration,
                    })
                    .await?;
                print_json(&response)?;
            }
            CalendarAction::List { date, limit } => {
                let events = ctx.client.calendar_list(date, limit).await?;
                print_json(&events)?;
            }
        },
        Commands::Memories(action) => match action {
            MemoriesAction::Add {
                user_id,
                kind,
                text,
                source,
            } => {
                let kind: MemoryType = kind.parse().map_err(anyhow::Error::msg)?;
                let record = ctx
                    .client
                    .create_memory(&MemoryCreateRequest {
                        user_id,
                        kind,
                        text,
                        source,
                    })
                    .await?;
                print_json(&record)?;
            }
            MemoriesAction::Search {
                user_id,
                query,
                top_k,
            } => {
                let hits = ctx.client.search_memories(user_id, &query, top_k).await?;
                print_json(&hits)?;
            }
        },
        Commands::Billing(action) => {
            let link = match action {
                BillingAction::Checkout {
                    success_url,
                    cancel_url,
                } => {
                    ctx.client
                        .billing_checkout(success_url.as_deref(), cancel_url.as_deref())
                        .await?
                }
                BillingAction::Portal { return_url } => {
                    ctx.client.billing_portal(return_url.as_deref()).await?
                }
            };
            println!("{}", link.url);
        }
        Commands::Agenda(opts) => {
            let agenda = ctx.client.agenda(opts.from, opts.to).await?;
            print_json(&agenda)?;
        }
        Commands::OauthUrl => {
            println!("{}", ctx.client.google_oauth_start_url());
        }
        Commands::Stt(opts) => {
            let audio = AudioUpload::from_path(&opts.file)
                .await
                .with_context(|| format!("Failed to read '{}'", opts.file.display()))?;
            let transcription = ctx
                .client
                .speech_to_text(&audio, opts.language.as_deref())
                .await?;
            println!("{}", transcription.text);
        }
        Commands::Tts(opts) => {
            let audio = ctx.client.text_to_speech(&opts.text, &opts.language).await?;
            tokio::fs::write(&opts.out, &audio)
                .await
                .with_context(|| format!("Failed to write '{}'", opts.out.display()))?;
            info!(bytes = audio.len(), "Wrote {}", opts.out.display());
        }
        Commands::Health => {
            let health = ctx.client.health().await?;
            let components = ctx.client.healthz().await?;
            print_json(&serde_json::json!({
                "status": health.status,
                "components": components,
            }))?;
        }
        Commands::Metrics(opts) => {
            if opts.prometheus {
                print!("{}", ctx.client.prometheus_metrics().await?);
            } else {
                print_json(&ctx.client.basic_metrics().await?)?;
            }
        }
        Commands::Doctor => {
            let checks = doctor::run_diagnostics(&ctx).await;
            print_json(&checks)?;
            let failed: Vec<_> = checks.iter().filter(|c| !c.ok).collect();
            if !failed.is_empty() {
                for check in &failed {
                    error!(check = %check.name, "{}", check.detail);
                }
                bail!("{} diagnostic check(s) failed", failed.len());
            }
        }
        Commands::Config(_) | Commands::Version => {}
    }

    Ok(())
}
