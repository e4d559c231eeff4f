//! Headless CLI for running a season from the terminal.
//!
//! ```text
//! ringside [--save DIR] [--config FILE] [--seed N] [--brand RAW|SmackDown] <command>
//!
//!   new                  start a new season (overwrites the save)
//!   week --booking FILE  run the user's show from a JSON or YAML card
//!   rival                let the AI book and run the other brand
//!   advance              move to next week
//!   profile NAME         print a character profile as JSON
//!   sign NAME --brand B  sign a character to a brand
//!   release NAME         release a character to free agency
//!   normalize [--force]  rebuild match records from show history
//!   status               week, champions, cash and unread mail
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use persistence::{load_world, save_world, FileStore};
use sim_core::titles::titles_for;
use sim_core::{Booking, Brand, ErrorReply, Role, ShowResult, SimConfig, WorldState};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    save_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    brand: Option<Brand>,
    booking: Option<PathBuf>,
    force: bool,
    command: Option<String>,
    name: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--save" => args.save_dir = it.next().map(PathBuf::from),
            "--config" => args.config = it.next().map(PathBuf::from),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--brand" => {
                let b = it.next().unwrap_or_default();
                args.brand = Some(Brand::parse(&b).ok_or_else(|| anyhow!("unknown brand {b:?}"))?);
            }
            "--booking" => args.booking = it.next().map(PathBuf::from),
            "--force" => args.force = true,
            _ if args.command.is_none() => args.command = Some(arg),
            _ => args.name.push(arg),
        }
    }
    Ok(args)
}

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"))
}

fn read_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg = if is_yaml(path) {
        serde_yaml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };
    Ok(cfg)
}

fn read_booking(path: &Path) -> Result<Booking> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let card = if is_yaml(path) {
        serde_yaml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };
    Ok(card)
}

fn print_show(show: &ShowResult) {
    println!("{} | week {} | show {} | TV {:.1}", show.brand, show.week, show.show_score, show.tv_rating);
    for s in &show.segments {
        let tags = if s.tags.is_empty() { String::new() } else { format!(" [{}]", s.tags.join(", ")) };
        println!("  {:<9} {:>3}  {}{}", s.seg.as_str(), s.score, s.text, tags);
    }
    for i in &show.injuries {
        println!("  injury: {} out {} week(s)", i.name, i.weeks);
    }
    for r in &show.retired_this_week {
        println!("  retired: {r}");
    }
    println!("  {}", show.fan_react);
}

fn print_status(world: &WorldState) {
    println!("Week {} ({}) | booking {}", world.week, world.sim_date(), world.user_brand);
    for brand in Brand::COMPETING {
        let cash = world
            .finances
            .brands
            .get(&brand)
            .map(|b| sim_econ::format_money(b.cash))
            .unwrap_or_default();
        println!("{brand}: cash {cash}");
        for title in titles_for(brand) {
            let held = world
                .titles
                .get(&brand)
                .and_then(|m| m.get(*title))
                .and_then(Option::as_ref)
                .map(|h| h.label())
                .unwrap_or_else(|| "Vacant".into());
            println!("  {title}: {held}");
        }
    }
    let unread = world.inbox.iter().filter(|m| !m.resolved).count();
    println!("Inbox: {unread} unresolved");
    for m in world.inbox.iter().take(5) {
        println!("  [{}] {}: {}", m.from, m.title, m.body.lines().next().unwrap_or_default());
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args()?;
    let cfg = read_config(args.config.as_deref())?;
    let dir = args.save_dir.clone().unwrap_or_else(|| PathBuf::from("./saves"));
    let mut store = FileStore::open(&dir)?;
    let command = args.command.as_deref().unwrap_or("status");
    info!(
        command,
        save = %dir.display(),
        build = env!("GIT_SHA"),
        built = env!("BUILD_DATE"),
        "starting CLI"
    );

    if command == "new" {
        let seed = args.seed.unwrap_or(cfg.rng_seed);
        let world = sim_runtime::new_world(seed, args.brand.unwrap_or(Brand::Raw), &cfg);
        save_world(&mut store, &world)?;
        print_status(&world);
        return Ok(());
    }

    let mut world = load_world(&mut store)?.ok_or_else(|| anyhow!("no save in {}; run `new` first", dir.display()))?;
    if let Some(seed) = args.seed {
        world.seed = seed;
    }

    match command {
        "week" => {
            let path = args.booking.as_deref().ok_or_else(|| anyhow!("week needs --booking FILE"))?;
            let card = read_booking(path)?;
            match sim_runtime::run_week(&mut world, &card, &cfg) {
                Ok(show) => print_show(&show),
                Err(e) => {
                    println!("{}", serde_json::to_string(&ErrorReply { error: e.to_string() })?);
                    bail!("booking rejected");
                }
            }
        }
        "rival" => {
            let show = sim_runtime::run_rival_week(&mut world, &cfg)?;
            print_show(&show);
        }
        "advance" => sim_runtime::advance_week(&mut world),
        "profile" => {
            let name = args.name.join(" ");
            let p = sim_runtime::profile(&world, &name).ok_or_else(|| anyhow!("no character named {name:?}"))?;
            println!("{}", serde_json::to_string_pretty(&p)?);
            return Ok(());
        }
        "sign" => {
            let brand = args.brand.ok_or_else(|| anyhow!("sign needs --brand"))?;
            sim_econ::sign_to_brand(&mut world, &args.name.join(" "), brand, Role::Active)?;
        }
        "release" => sim_econ::release_to_free_agency(&mut world, &args.name.join(" "))?,
        "normalize" => {
            let report = sim_runtime::normalize_match_records(&mut world, args.force);
            println!("{}", serde_json::to_string(&report)?);
        }
        "status" => {
            print_status(&world);
            return Ok(());
        }
        other => bail!("unknown command {other:?}"),
    }

    save_world(&mut store, &world)?;
    Ok(())
}
