//! Application entry point — encounter-forge CLI.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Sign in (anonymous / custom token / local fallback) for the session id.
//! 4. Build the resilient HTTP client and the generateContent client.
//! 5. Run one generate, print the markdown and citations.
//! 6. Optionally flesh out (`--flesh-out`) and narrate (`--narrate <style>`).
//!
//! # Usage
//!
//! ```text
//! encounter-forge <party_size> <level> <difficulty> <terrain> <flavor> \
//!     [--enemies N] [--flesh-out] [--narrate dramatic|monotone]
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use encounter_forge::audio::RodioPlayer;
use encounter_forge::auth;
use encounter_forge::config::AppConfig;
use encounter_forge::genai::GenAiClient;
use encounter_forge::net::{HttpTransport, ResilientClient, Transport};
use encounter_forge::prompt::{Difficulty, EncounterParams, NarrationStyle};
use encounter_forge::session::{new_shared_state, EncounterController, SessionPhase};

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    params: EncounterParams,
    flesh_out: bool,
    narrate: Option<NarrationStyle>,
}

const USAGE: &str = "usage: encounter-forge <party_size> <level> <difficulty> <terrain> <flavor> \
     [--enemies N] [--flesh-out] [--narrate dramatic|monotone]";

fn parse_args(args: &[String]) -> Result<CliArgs> {
    if args.len() < 5 {
        bail!("{USAGE}");
    }

    let party_size: u32 = args[0].parse().context("party size must be a number")?;
    let average_level: u32 = args[1].parse().context("level must be a number")?;
    let difficulty = Difficulty::parse(&args[2])
        .with_context(|| format!("unknown difficulty {:?}", args[2]))?;

    let mut params = EncounterParams {
        party_size,
        average_level,
        difficulty,
        terrain: args[3].clone(),
        flavor: args[4].clone(),
        enemy_count: None,
    };
    let mut flesh_out = false;
    let mut narrate = None;

    let mut rest = args[5..].iter();
    while let Some(flag) = rest.next() {
        match flag.as_str() {
            "--enemies" => {
                let n = rest.next().context("--enemies requires a number")?;
                params.enemy_count = Some(n.parse().context("--enemies must be a number")?);
            }
            "--flesh-out" => flesh_out = true,
            "--narrate" => {
                let style = rest.next().context("--narrate requires a style")?;
                narrate = Some(match style.as_str() {
                    "dramatic" => NarrationStyle::Dramatic,
                    "monotone" => NarrationStyle::Monotone,
                    other => bail!("unknown narration style {other:?}"),
                });
            }
            other => bail!("unknown flag {other:?}\n{USAGE}"),
        }
    }

    params.validate()?;
    Ok(CliArgs {
        params,
        flesh_out,
        narrate,
    })
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    let config = AppConfig::load().context("failed to load settings.toml")?;
    if config.api.api_key.is_none() {
        log::warn!("no api_key configured — requests will likely be rejected");
    }

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::from_config(&config.api));

    let identity = auth::sign_in(&transport, &config.auth, config.api.key()).await;
    log::info!("session id: {} ({:?})", identity.uid, identity.kind);

    let http = ResilientClient::new(Arc::clone(&transport), config.retry.clone());
    let genai = Arc::new(GenAiClient::new(http, config.api.clone()));
    let player = Arc::new(RodioPlayer::spawn().context("failed to start audio playback")?);

    let state = new_shared_state();
    let controller = EncounterController::new(
        Arc::clone(&state),
        genai.clone(),
        genai,
        player,
    );

    // ── Generate ─────────────────────────────────────────────────────────
    controller.generate(cli.params).await;
    report(&state)?;

    // ── Flesh out ────────────────────────────────────────────────────────
    if cli.flesh_out {
        controller.flesh_out().await;
        report(&state)?;
    }

    // ── Narrate ──────────────────────────────────────────────────────────
    if let Some(style) = cli.narrate {
        controller.narrate(style).await;

        // Block until playback ends (or an error already cleared the phase).
        loop {
            let phase = state.lock().unwrap().phase;
            if phase != SessionPhase::Speaking {
                break;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        if let Some(err) = state.lock().unwrap().last_error.clone() {
            bail!("{err}");
        }
    }

    Ok(())
}

/// Print the current narrative and citations, or fail on a session error.
fn report(state: &encounter_forge::session::SharedState) -> Result<()> {
    let st = state.lock().unwrap();
    if let Some(err) = &st.last_error {
        bail!("{err}");
    }
    if let Some(narrative) = &st.narrative {
        println!("{narrative}");
    }
    if !st.citations.is_empty() {
        println!("\nSources:");
        for citation in &st.citations {
            println!("- {} <{}>", citation.title, citation.uri);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
