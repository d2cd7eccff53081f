use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use kanatype::app::App;
use kanatype::config::Config;
use kanatype::event::KeyPress;
use kanatype::kana::{Romanizer, hyphenize, katakana_to_hiragana};
use kanatype::keyboard::display::key_display_name;
use kanatype::keyboard::{KeyHintMapper, KeyboardLayout};
use kanatype::logging::init_tracing;
use kanatype::ruby::{self, RubyText};
use kanatype::store::{DaySummary, StatsStore};
use kanatype::EngineMode;

#[derive(Parser)]
#[command(name = "kanatype", version, about = "Japanese typing practice engine")]
struct Cli {
    #[arg(short, long, global = true, help = "Keyboard layout description file")]
    layout: Option<String>,

    #[arg(short, long, global = true, help = "Config file to use instead of the default")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the keystrokes for a kana reading
    Romanize { text: String },
    /// Split ruby text into plain text and reading ({base|reading} accepted)
    Parse { text: String },
    /// Show practice history
    Stats {
        #[arg(long, help = "Delete all practice history")]
        reset: bool,
    },
    /// Practice a lesson, one line of input at a time
    Run { lesson: String },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(),
    };
    if let Some(layout) = cli.layout {
        config.keyboard_layout = layout;
    }

    match cli.command {
        Command::Romanize { text } => romanize(&config, &text),
        Command::Parse { text } => parse(&text),
        Command::Stats { reset } => stats(&config, reset),
        Command::Run { lesson } => run(config, &lesson)?,
    }
    Ok(())
}

fn romanize(config: &Config, text: &str) {
    let layout = KeyboardLayout::load_or_default(&config.keyboard_layout);
    let romanizer = Romanizer::new(config.nn_as_jis_x_4063);
    let reading = katakana_to_hiragana(text);
    if layout.is_romaji() {
        let romaji = romanizer.romanize(&reading);
        println!("romaji: {romaji}");
        println!("keys:   {}", hyphenize(&romaji));
    }
    let mapper = KeyHintMapper::new(romanizer, layout);
    println!("count:  {}", mapper.key_count(&reading));
}

fn parse(text: &str) {
    let annotated = ruby::expand_braces(text);
    let (plain, reading) = ruby::parse_plain(&annotated);
    println!("plain:   {plain}");
    println!("reading: {reading}");
    for span in RubyText::from_text(&annotated).rubies {
        let base: String = plain.chars().skip(span.pos).take(span.len).collect();
        println!("  {base} ({}) at {}", span.reading, span.pos);
    }
}

fn print_days(days: &[DaySummary]) {
    for day in days {
        println!(
            "{}  {:>6.1} min  {:>3} wpm  {:>3.0}%",
            day.date,
            day.duration.as_secs_f64() / 60.0,
            day.wpm,
            day.accuracy * 100.0
        );
    }
}

fn stats(config: &Config, reset: bool) {
    let mut store = StatsStore::open(Path::new(&config.stats_file));
    if reset {
        store.reset();
        println!("practice history cleared");
        return;
    }
    if store.days().is_empty() {
        println!("no practice recorded yet");
        return;
    }
    print_days(store.days());
    println!(
        "best: {} wpm, {:.1} min in a day",
        store.max_wpm(),
        store.max_duration().as_secs_f64() / 60.0
    );
}

fn show(app: &mut App) {
    match app.mode() {
        EngineMode::Menu => {
            if !app.title().is_empty() {
                println!("== {} ==", app.title());
            }
            let keys = ['1', '2', '3', '4', '5', '6', '7', '8', '9', '0'];
            for (key, target) in keys.iter().zip(app.menu()) {
                println!("{key}. {target}");
            }
        }
        EngineMode::Practice => {
            if !app.hint().is_empty() {
                println!("{}", app.hint());
            }
            println!("{}", app.plain());
            if app.show_keyboard() {
                let hint = app.next_hint();
                if !hint.sequence.is_empty() {
                    let keys: Vec<String> = hint
                        .sequence
                        .chars()
                        .map(|c| match key_display_name(c) {
                            "" => c.to_string(),
                            name => name.to_string(),
                        })
                        .collect();
                    println!("next: {} [{}]", hint.literal, keys.join(" "));
                }
            }
            if !app.typed().is_empty() {
                println!("{}", app.typed());
            }
        }
        EngineMode::Score => {
            let result = app.result();
            let (filled, bonus) = app.stars();
            println!(
                "{} wpm, {:.0}% accuracy, {:.1} s  {}{}",
                result.wpm(),
                result.accuracy() * 100.0,
                result.duration.as_secs_f64(),
                "★".repeat(filled as usize),
                "☆".repeat(bonus as usize)
            );
        }
        EngineMode::Stats => {
            print_days(app.stats());
            println!("best: {} wpm", app.max_wpm());
        }
        _ => {}
    }
}

fn handle_line(app: &mut App, line: &str) {
    match line {
        "/quit" => app.quit(),
        "/esc" => app.escape(),
        "/up" => app.up(),
        "/stats" => app.show_stats(),
        "/back" => app.backspace(),
        "/reset" if app.mode() == EngineMode::Stats => app.reset_stats(),
        "" => app.enter(),
        _ if app.mode() == EngineMode::Menu => {
            if let Some(key) = line.chars().next() {
                app.select_key(key);
            }
        }
        _ => {
            for c in line.chars() {
                app.key_press(&KeyPress::char(c));
            }
            app.append(line);
            if app.typed() == app.plain() {
                // let the finish grace period pass
                let now = Instant::now();
                app.run_at(now);
                app.run_at(now + app.config.finish_delay());
            }
        }
    }
}

fn run(config: Config, lesson: &str) -> Result<()> {
    let mut app = App::with_config(config);
    if !app.open(lesson) {
        bail!("could not open lesson {lesson}");
    }
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        app.run();
        if app.mode() == EngineMode::Exit {
            break;
        }
        show(&mut app);
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        handle_line(&mut app, line?.trim_end());
    }
    app.quit();
    Ok(())
}
