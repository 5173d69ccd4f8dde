//! Hanafuda Drop: a falling-card puzzle with flower cards in the terminal.

mod app;
mod card;
mod game;
mod grid;
mod input;
mod matcher;
mod scoring;
mod theme;
mod ui;
mod yaku;

use anyhow::{Context, Result, ensure};
use app::App;
use clap::{Parser, ValueEnum};
use game::Rules;
use scoring::DropCurve;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Highest accepted logic rate.
const MAX_TICK_RATE: u32 = 240;

/// Validated options that shape a session.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rules: Rules,
    pub tick_rate: u32,
    pub seed: Option<u64>,
    pub animation: bool,
    pub skip_title: bool,
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        ensure!(
            (1..=MAX_TICK_RATE).contains(&args.tick_rate),
            "--tick-rate must be between 1 and {MAX_TICK_RATE}, got {}",
            args.tick_rate
        );
        ensure!(args.drop_min >= 1, "--drop-min must be at least 1");
        ensure!(
            args.drop_base >= args.drop_min,
            "--drop-base ({}) must not be below --drop-min ({})",
            args.drop_base,
            args.drop_min
        );
        ensure!(args.drop_divisor >= 1, "--drop-divisor must be at least 1");

        let rules = Rules {
            drop: DropCurve {
                base: args.drop_base,
                min: args.drop_min,
                divisor: args.drop_divisor,
            },
            ..Rules::at_tick_rate(args.tick_rate)
        };
        Ok(Self {
            rules,
            tick_rate: args.tick_rate,
            seed: args.seed,
            animation: !args.no_animation,
            skip_title: args.skip_title,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;
    let config = GameConfig::from_args(&args)?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette)
        .with_context(|| format!("loading theme {:?}", args.theme))?;
    tracing::info!(?config, "starting");
    let mut app = App::new(config, theme)?;
    app.run()?;
    Ok(())
}

/// The TUI owns the terminal, so logs only go to a file. Without one the filter is
/// installed with no output layer.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(path) = log_file else {
        tracing_subscriber::registry().with(env_filter).init();
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(env_filter)
        .init();
    Ok(())
}

/// Falling-card puzzle with hanafuda flower cards.
#[derive(Debug, Parser)]
#[command(
    name = "hanafuda-drop",
    version,
    about = "Falling-card puzzle with hanafuda flower cards. Connect three cards of a month, or complete a yaku.",
    long_about = "Hanafuda Drop is a terminal puzzle played with the 48 flower cards.\n\n\
        Cards fall one at a time into an 8x6 board. Three or more orthogonally connected \
        cards of the same month are removed; cards above fall down and may chain into \
        combos. Bringing a yaku (Five Lights, Boar-Deer-Butterfly, ribbon sets...) onto \
        the board scores a bonus and doubles all points for five seconds.\n\n\
        CONTROLS:\n  Left/Right h/l  Move     Down/j     Fast drop\n  Enter/Space     Start / give up   d   Show months   q / Esc  Quit"
)]
pub struct Args {
    /// Seed for the card sequence. Random if not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Game logic ticks per second. Every timer (spawn delay, pause, bonus) scales with it.
    #[arg(long, default_value = "60", value_name = "HZ")]
    pub tick_rate: u32,

    /// Ticks per one-row fall at score 0.
    #[arg(long, default_value = "60", value_name = "TICKS")]
    pub drop_base: u32,

    /// Fastest fall speed in ticks per row.
    #[arg(long, default_value = "10", value_name = "TICKS")]
    pub drop_min: u32,

    /// Points needed to speed the fall up by one tick.
    #[arg(long, default_value = "1000", value_name = "POINTS")]
    pub drop_divisor: u64,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses built-in colours if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme) or high-contrast.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the removal burst effect.
    #[arg(long)]
    pub no_animation: bool,

    /// Skip the title screen and start playing immediately.
    #[arg(long)]
    pub skip_title: bool,

    /// Write logs to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("hanafuda-drop").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults_match_sixty_hertz_rules() {
        let config = GameConfig::from_args(&parse(&[])).unwrap();
        assert_eq!(config.rules, Rules::default());
        assert_eq!(config.tick_rate, 60);
        assert!(config.animation);
        assert!(!config.skip_title);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_custom_curve_and_rate() {
        let args = parse(&[
            "--tick-rate",
            "30",
            "--drop-base",
            "40",
            "--drop-min",
            "5",
            "--drop-divisor",
            "500",
            "--seed",
            "9",
            "--no-animation",
        ]);
        let config = GameConfig::from_args(&args).unwrap();
        assert_eq!(config.rules.pause, 30);
        assert_eq!(config.rules.bonus_time, 150);
        assert_eq!(
            config.rules.drop,
            DropCurve {
                base: 40,
                min: 5,
                divisor: 500
            }
        );
        assert_eq!(config.seed, Some(9));
        assert!(!config.animation);
    }

    #[test]
    fn test_rejects_invalid_combinations() {
        assert!(GameConfig::from_args(&parse(&["--tick-rate", "0"])).is_err());
        assert!(GameConfig::from_args(&parse(&["--tick-rate", "241"])).is_err());
        assert!(GameConfig::from_args(&parse(&["--drop-min", "0"])).is_err());
        assert!(GameConfig::from_args(&parse(&["--drop-base", "5", "--drop-min", "6"])).is_err());
        assert!(GameConfig::from_args(&parse(&["--drop-divisor", "0"])).is_err());
    }

    #[test]
    fn test_palette_aliases() {
        assert_eq!(parse(&["--palette", "contrast"]).palette, Palette::HighContrast);
    }
}
