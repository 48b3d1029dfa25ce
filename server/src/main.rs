//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//


use aggro_server::config::{Arguments, Configuration};
use aggro_server::simulation::Simulation;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load arguments from the command line
    let arguments: Arguments = Parser::parse();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(true)
        .init();

    // Load environment variables from .env file if specified
    if let Some(ref env_file) = arguments.env_file {
        if std::path::Path::new(env_file).exists() {
            tracing::debug!("Loading environment variables from file: {}", env_file);
            dotenv::from_filename(env_file).ok();
        }
    } else {
        tracing::debug!("Loading environment variables from default file");
        dotenv::dotenv().ok();
    }

    // Load configuration from a file with environment variable substitution
    let config = Configuration::load(&arguments.config_file).map_err(|e| {
        tracing::error!("Unable to load configuration file: {}", e);
        e
    })?;

    tracing::debug!("Configuration loaded: {:?}", config);
    tracing::info!("Starting aggro simulation...");

    let mut simulation = Simulation::from_config(&config)?;
    let ticks = arguments.ticks.unwrap_or(config.simulation.ticks);

    for _ in 0..ticks {
        let report = simulation.step()?;
        for event in &report.events {
            tracing::info!("[tick {:>3}] {}", report.tick, simulation.describe(event));
        }
    }

    for actor in simulation.report() {
        tracing::info!(
            "{} is {} targeting {}",
            actor.name,
            actor.state.as_str(),
            actor.target.as_deref().unwrap_or("nobody")
        );
        for (candidate, threat) in &actor.threat {
            let odds = actor
                .odds
                .iter()
                .find(|(name, _)| name == candidate)
                .map_or(0.0, |(_, share)| *share);
            tracing::info!("    {:<16} {:>6} {:>5.1}%", candidate, threat, odds * 100.0);
        }
    }

    tracing::info!("Simulation finished after {} ticks", ticks);
    Ok(())
}
