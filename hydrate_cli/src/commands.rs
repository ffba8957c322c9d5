//! Command implementations: config mapping, source assembly, and output.

use crate::cli::{Cli, Commands};
use chrono::{Local, NaiveTime};
use eyre::WrapErr;
use hydrate_core::advice::{Gender, IntakeFactors, Weather, recommend_liters};
use hydrate_core::conversions::readings_from_rows;
use hydrate_core::{
    BarKind, BottleCfg, ChartBar, ConsumptionPoint, Engine, HttpSource, HydrateError,
    HydrationSource, PollingCfg, PresentationCfg, PresentationMachine, SourceCfg, SourceStats,
    chart_bars, percent_of_goal, transform,
};
use hydrate_traits::HttpClient;
use hydrate_transport::{ReqwestHttpClient, SimConfig, SimulatedDevice};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::player::ConsolePlayer;

type Source = HttpSource<Arc<dyn HttpClient>>;

fn config_error(msg: String) -> eyre::Report {
    eyre::Report::new(HydrateError::Configuration(msg))
}

/// Typed runtime settings derived from the TOML config and CLI overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: SourceCfg,
    pub polling: PollingCfg,
    pub bottle: BottleCfg,
    pub presentation: PresentationCfg,
}

/// Read, override and validate the config file.
pub fn load_config(cli: &Cli) -> eyre::Result<hydrate_config::Config> {
    let text = std::fs::read_to_string(&cli.config)
        .map_err(|e| config_error(format!("read config {}: {e}", cli.config.display())))?;
    let mut cfg = hydrate_config::load_toml(&text)
        .map_err(|e| config_error(format!("parse config {}: {e}", cli.config.display())))?;
    if let Some(url) = &cli.base_url {
        cfg.api.base_url.clone_from(url);
    }
    if let Some(id) = cli.user_id {
        cfg.api.user_id = id;
    }
    cfg.validate().map_err(|e| config_error(e.to_string()))?;
    Ok(cfg)
}

pub fn settings_from(cfg: &hydrate_config::Config) -> eyre::Result<Settings> {
    Ok(Settings {
        source: SourceCfg::try_from(&cfg.api)?,
        polling: (&cfg.polling).into(),
        bottle: (&cfg.bottle).into(),
        presentation: (&cfg.presentation).into(),
    })
}

fn make_source(settings: &Settings, sim: bool) -> eyre::Result<Source> {
    let client: Arc<dyn HttpClient> = if sim {
        let start = Local::now()
            .date_naive()
            .and_time(NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default());
        let device = SimulatedDevice::new(SimConfig {
            user_id: settings.source.user_id,
            capacity_ml: settings.bottle.capacity_ml,
            start,
            ..SimConfig::default()
        })
        .map_err(|e| config_error(e.to_string()))?;
        tracing::info!(user_id = settings.source.user_id, "using simulated bottle");
        Arc::new(device)
    } else {
        let client = ReqwestHttpClient::new(settings.source.request_timeout)
            .map_err(|e| config_error(e.to_string()))?;
        Arc::new(client)
    };
    Ok(HttpSource::from_cfg(client, &settings.source))
}

pub async fn dispatch(cli: &Cli, cfg: &hydrate_config::Config) -> eyre::Result<()> {
    match &cli.cmd {
        Commands::Advise {
            gender,
            bmi,
            temperature,
            humidity,
            weather,
        } => run_advise(cli.json, gender, *bmi, *temperature, *humidity, weather),
        Commands::Watch {
            sim,
            duration_s,
            stats,
        } => {
            let settings = settings_from(cfg)?;
            run_watch(&settings, *sim, cli.json, duration_s.map(Duration::from_secs), *stats).await
        }
        Commands::Status { sim } => {
            let settings = settings_from(cfg)?;
            run_status(&settings, *sim, cli.json).await
        }
        Commands::Chart { sim, csv } => {
            let settings = settings_from(cfg)?;
            run_chart(&settings, *sim, csv.as_deref(), cli.json).await
        }
        Commands::Health { sim } => {
            let settings = settings_from(cfg)?;
            run_health(&settings, *sim, cli.json).await
        }
    }
}

fn print_stats(stats: &[SourceStats], json: bool) {
    if json {
        println!("{}", json!({ "stats": stats }));
        return;
    }
    println!("{:<10} {:>6} {:>6} {:>7}", "source", "ok", "failed", "streak");
    for s in stats {
        println!(
            "{:<10} {:>6} {:>6} {:>7}",
            s.source.name(),
            s.ok,
            s.failed,
            s.consecutive_failures
        );
    }
}

pub async fn run_watch(
    settings: &Settings,
    sim: bool,
    json: bool,
    duration: Option<Duration>,
    stats: bool,
) -> eyre::Result<()> {
    let source = make_source(settings, sim)?;
    let engine = Engine::builder()
        .with_source(source)
        .with_polling(settings.polling)
        .with_presentation(settings.presentation.clone())
        .with_bottle(settings.bottle)
        .build()?;

    let stop = CancellationToken::new();
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.cancel()).wrap_err("install Ctrl-C handler")?;
    }

    let handle = engine.start(ConsolePlayer::stdout(json));
    let store = Arc::clone(handle.store());
    match duration {
        Some(d) => {
            tokio::select! {
                () = stop.cancelled() => tracing::info!("interrupted"),
                () = tokio::time::sleep(d) => tracing::debug!(secs = d.as_secs(), "watch duration elapsed"),
            }
        }
        None => stop.cancelled().await,
    }
    handle.shutdown().await?;

    if stats {
        print_stats(&store.stats().snapshot(), json);
    }
    Ok(())
}

pub async fn run_status(settings: &Settings, sim: bool, json: bool) -> eyre::Result<()> {
    let source = make_source(settings, sim)?;
    let store = hydrate_core::ViewModelStore::new(source, settings.bottle.capacity_ml);

    let report = store.refresh().await;
    if store.refresh_chart().await.is_err() {
        tracing::debug!("status printed without a fresh chart");
    }
    if !report.profile
        && !report.intake
        && !report.bottle.placed.is_fresh()
        && !report.bottle.level.is_fresh()
    {
        let url = store.source().url(hydrate_core::Endpoint::Profile);
        return Err(eyre::Report::new(HydrateError::Transport(format!(
            "no endpoint answered (tried {url})"
        ))));
    }

    let vm = store.snapshot();
    let mut machine = PresentationMachine::new(settings.presentation.clone());
    let transition = machine.advance(&vm);
    let percent = percent_of_goal(vm.today_intake, vm.daily_goal);
    let fill = vm.bottle.fill_ratio(settings.bottle.capacity_ml);
    let points = store.consumption();

    if json {
        println!(
            "{}",
            json!({
                "view_model": vm,
                "percent_of_goal": percent,
                "fill_ratio": fill,
                "bottle_age_ms": store.bottle_age_ms(),
                "presentation": transition.state,
                "consumption": points,
                "stats": store.stats().snapshot(),
            })
        );
        return Ok(());
    }

    println!("user:      {}", vm.user_name);
    println!("goal:      {:.0} ml", vm.daily_goal);
    println!("intake:    {:.0} ml ({percent:.0}%)", vm.today_intake);
    println!(
        "bottle:    {}, {:.0} ml ({:.0}% full)",
        if vm.bottle.placed { "on dock" } else { "lifted" },
        vm.bottle.level,
        fill * 100.0
    );
    match store.bottle_age_ms() {
        Some(ms) => println!("polled:    {ms} ms ago"),
        None => println!("polled:    never"),
    }
    println!(
        "light:     {} {}",
        transition.state.mode, transition.state.color
    );
    println!("frame:     {}", machine.current_frame());
    println!("chart:     {} points", points.len());
    print_stats(&store.stats().snapshot(), false);
    Ok(())
}

/// One chart row as printed under `--json`.
#[derive(Debug, Serialize)]
struct ChartRow<'a> {
    label: &'a str,
    delta: f64,
    height: f64,
    kind: BarKind,
    color: &'a str,
}

fn chart_rows<'a>(
    points: &'a [ConsumptionPoint],
    bars: &[ChartBar],
    cfg: &'a PresentationCfg,
) -> Vec<ChartRow<'a>> {
    points
        .iter()
        .zip(bars)
        .map(|(p, b)| ChartRow {
            label: &p.bucket_label,
            delta: p.delta,
            height: b.height,
            kind: b.kind,
            color: b.kind.color(cfg),
        })
        .collect()
}

fn print_chart(
    points: &[ConsumptionPoint],
    bars: &[ChartBar],
    cfg: &PresentationCfg,
    json: bool,
) -> eyre::Result<()> {
    if json {
        let rows = chart_rows(points, bars, cfg);
        println!(
            "{}",
            serde_json::to_string(&rows).wrap_err("serialize chart rows")?
        );
        return Ok(());
    }
    println!("{:>4} {:>10}  kind", "hour", "delta_ml");
    for (p, b) in points.iter().zip(bars) {
        let kind = match b.kind {
            BarKind::Consumption => "consumption",
            BarKind::Refill => "refill",
        };
        println!("{:>4} {:>10.1}  {kind}", p.bucket_label, p.delta);
    }
    Ok(())
}

pub async fn run_chart(
    settings: &Settings,
    sim: bool,
    csv: Option<&Path>,
    json: bool,
) -> eyre::Result<()> {
    let readings = match csv {
        Some(path) => {
            let rows = hydrate_config::load_readings_csv(path)?;
            readings_from_rows(&rows, settings.source.utc_offset)?
        }
        None => make_source(settings, sim)?.fetch_today_series().await?,
    };
    let points = transform(&readings);
    let bars = chart_bars(&points);
    tracing::debug!(readings = readings.len(), points = points.len(), "chart built");
    print_chart(&points, &bars, &settings.presentation, json)
}

pub async fn run_health(settings: &Settings, sim: bool, json: bool) -> eyre::Result<()> {
    let source = make_source(settings, sim)?;
    let url = source.url(hydrate_core::Endpoint::Profile);
    let profile = source.fetch_profile().await?;
    if json {
        println!(
            "{}",
            json!({ "status": "ok", "url": url, "user": profile.name })
        );
    } else {
        println!("ok: {url} reachable (user {})", profile.name);
    }
    Ok(())
}

pub fn run_advise(
    json: bool,
    gender: &str,
    bmi: f64,
    temperature: f64,
    humidity: f64,
    weather: &str,
) -> eyre::Result<()> {
    if !bmi.is_finite() || bmi <= 0.0 {
        eyre::bail!("--bmi must be a positive number");
    }
    if !(0.0..=100.0).contains(&humidity) {
        eyre::bail!("--humidity must be within 0..=100");
    }
    let factors = IntakeFactors {
        gender: gender.parse::<Gender>().unwrap_or(Gender::Unspecified),
        bmi,
        temperature_c: temperature,
        humidity,
        weather: weather.parse::<Weather>().unwrap_or(Weather::Other),
    };
    let liters = recommend_liters(&factors);
    if json {
        println!("{}", json!({ "recommended_liters": liters }));
    } else {
        println!("Recommended daily intake: {liters:.1} L");
    }
    Ok(())
}
