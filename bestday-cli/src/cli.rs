use anyhow::{Context, bail};
use bestday_core::{
    ActivityClassifier, AlternativeDays, Config, Planner, RunResult, ServiceId,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "bestday", version, about = "Find the best day for an activity")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an API key for a provider.
    Configure {
        /// Provider short name, e.g. "visualcrossing" or "openweather".
        provider: String,
    },

    /// Show which activity category a description maps to.
    Classify {
        /// Free-text activity, e.g. "family bbq by the lake".
        text: String,
    },

    /// Pick the best day in a date range.
    Plan {
        /// Free-text activity description.
        activity: String,

        /// First day, YYYY-MM-DD.
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,

        /// Last day (inclusive), YYYY-MM-DD.
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,

        /// City name; defaults to the configured default city.
        #[arg(long)]
        city: Option<String>,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// `--city` when given and non-blank, otherwise the configured default city.
fn plan_city(city: Option<String>, config: &Config) -> String {
    city.map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| config.default_city().to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Classify { text } => {
                let matched = ActivityClassifier::new().classify(&text);
                println!("{} (confidence {:.2})", matched.category, matched.confidence);
                for (category, score) in &matched.matched {
                    println!("  {category}: {score}");
                }
                Ok(())
            }
            Command::Plan {
                activity,
                from,
                to,
                city,
                json,
            } => {
                if activity.trim().is_empty() {
                    bail!("Activity not provided");
                }

                let config = Config::load()?;
                for id in config.unconfigured_providers() {
                    tracing::warn!(
                        provider = %id,
                        "no API key configured, run `bestday configure {id}`; planning without it"
                    );
                }
                let city = plan_city(city, &config);

                let planner = Planner::from_config(&config).context("Failed to set up HTTP client")?;
                let result = planner.run(&city, &activity, from, to).await?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print_summary(&city, &result);
                }
                Ok(())
            }
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ServiceId::try_from(provider)?;
    if !id.requires_api_key() {
        println!("{id} does not need an API key.");
        return Ok(());
    }

    let api_key = inquire::Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let mut config = Config::load()?;
    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save()?;

    println!("Saved {id} key to {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_summary(city: &str, result: &RunResult) {
    println!(
        "{} in {city}, {} .. {}",
        result.activity, result.start_date, result.end_date
    );

    match result.best_day {
        Some(day) => println!("Best day: {day}"),
        None => println!("Best day: none"),
    }

    match &result.alternative_days {
        AlternativeDays::AllSuitable => println!("Alternatives: all dates are suitable"),
        AlternativeDays::Dates(dates) if dates.is_empty() => println!("Alternatives: none"),
        AlternativeDays::Dates(dates) => {
            let dates: Vec<String> = dates.iter().map(ToString::to_string).collect();
            println!("Alternatives: {}", dates.join(", "));
        }
    }

    if let Some(better) = &result.nearest_better_city {
        println!("Better weather nearby: {better}");
    }

    println!();
    for day in &result.daily_weather {
        println!(
            "{}  {:>5.1}°C  {:>6.2} mm  {:>4.1} m/s  {:?}{}  {}",
            day.date,
            day.temperature,
            day.precipitation,
            day.wind_speed,
            day.air_quality,
            if day.snow { "  snow" } else { "" },
            day.recommendations.join("; "),
        );
    }
}
