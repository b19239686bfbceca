//! encounter-forge — AI-assisted tabletop encounter generation.
//!
//! This crate orchestrates calls against a generateContent-style text/TTS
//! endpoint to build combat encounters from a handful of parameters, flesh
//! them out with follow-up detail, and narrate the opening line aloud.
//!
//! # Architecture
//!
//! ```text
//! EncounterParams ──▶ prompt::build_generate ──▶ GenAiClient ──▶ ResilientClient
//!                                                     │              (retry/backoff)
//!                                                     ▼
//!                                          EncounterController
//!                                          (session state machine)
//!                                                     │
//!                             narrative + citations   │   base64 PCM → WAV
//!                                                     ▼
//!                                               AudioPlayer (rodio)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use encounter_forge::config::AppConfig;
//! use encounter_forge::genai::GenAiClient;
//! use encounter_forge::net::{HttpTransport, ResilientClient};
//! use encounter_forge::audio::RodioPlayer;
//! use encounter_forge::prompt::{Difficulty, EncounterParams};
//! use encounter_forge::session::{new_shared_state, EncounterController};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let transport = Arc::new(HttpTransport::from_config(&config.api));
//!     let http = ResilientClient::new(transport, config.retry.clone());
//!     let genai = Arc::new(GenAiClient::new(http, config.api.clone()));
//!     let player = Arc::new(RodioPlayer::spawn().unwrap());
//!
//!     let state = new_shared_state();
//!     let controller = EncounterController::new(
//!         Arc::clone(&state),
//!         genai.clone(),
//!         genai,
//!         player,
//!     );
//!
//!     let params = EncounterParams {
//!         party_size: 4,
//!         average_level: 5,
//!         difficulty: Difficulty::Medium,
//!         terrain: "Forest Ruin".into(),
//!         flavor: "guard duty".into(),
//!         enemy_count: None,
//!     };
//!     controller.generate(params).await;
//!
//!     let st = state.lock().unwrap();
//!     println!("{}", st.narrative.as_deref().unwrap_or("<no encounter>"));
//! }
//! ```

pub mod audio;
pub mod auth;
pub mod config;
pub mod genai;
pub mod net;
pub mod prompt;
pub mod session;
