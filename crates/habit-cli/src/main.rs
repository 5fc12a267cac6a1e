//! `habits` — command-line client for the habit tracker.
//!
//! # Usage
//!
//! ```
//! habits login alice@example.com secret          # prints a token
//! export HABITS_TOKEN=...
//! habits habits add "Read 10 pages"
//! habits habits check h-1 2026-01-05
//! habits board toggle h-0 5                      # local dashboard
//! ```

mod client;
mod dashboard;
mod storage;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, Session};
use dashboard::{Action, DAYS_IN_MONTH, Dashboard, WEEKS, week_for_day};
use serde::{Deserialize, Serialize};
use storage::{FileStorage, StateStorage};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "habits", about = "Command-line client for the habit tracker")]
struct Args {
  /// Path to a TOML config file (url, token).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the server (default: http://localhost:5000).
  #[arg(long, env = "HABITS_URL")]
  url: Option<String>,

  /// Bearer token from `login` or `register`.
  #[arg(long, env = "HABITS_TOKEN", hide_env_values = true)]
  token: Option<String>,

  /// Where the local dashboard is kept.
  #[arg(long, value_name = "FILE")]
  board: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create an account and print its token.
  Register { username: String, email: String, password: String },
  /// Log in and print a fresh token.
  Login { email: String, password: String },
  /// Daily habits on the server.
  #[command(subcommand)]
  Habits(HabitsCmd),
  /// Weekly habits on the server.
  #[command(subcommand)]
  Weekly(WeeklyCmd),
  /// The local monthly dashboard.
  #[command(subcommand)]
  Board(BoardCmd),
}

#[derive(Subcommand, Debug)]
enum HabitsCmd {
  List,
  Add {
    name: String,
    /// Habit id; a random one is generated when omitted.
    #[arg(long)]
    id:   Option<String>,
  },
  Rename { id: String, name: String },
  Remove { id: String },
  /// Mark a habit done (or, with `--off`, not done) on a date.
  Check {
    id:   String,
    /// Date, e.g. 2026-01-05. Defaults to today.
    date: Option<String>,
    #[arg(long)]
    off:  bool,
  },
  Checks { id: String },
}

#[derive(Subcommand, Debug)]
enum WeeklyCmd {
  List,
  Add {
    week: i64,
    name: String,
    #[arg(long)]
    id:   Option<String>,
  },
  Update {
    id:        String,
    #[arg(long)]
    name:      Option<String>,
    #[arg(long)]
    completed: Option<bool>,
  },
  Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum BoardCmd {
  Show,
  /// Flip a habit's check for a day of the month.
  Toggle { habit: String, day: u32 },
  /// Rename a habit slot.
  Name { habit: String, name: String },
  /// Set the month and year labels.
  Month { month: String, year: String },
  /// Rename and/or complete a weekly task slot.
  Task {
    week:   u32,
    id:     String,
    #[arg(long)]
    name:   Option<String>,
    #[arg(long)]
    toggle: bool,
  },
  /// Rename and/or complete a monthly goal.
  Goal {
    id:     String,
    #[arg(long)]
    name:   Option<String>,
    #[arg(long)]
    toggle: bool,
  },
  /// Replace the month's reflection note.
  Reflect { text: String },
  Reset,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Serialize, Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:   String,
  #[serde(default)]
  token: String,
}

fn read_config(path: &Path) -> Result<ConfigFile> {
  match std::fs::read_to_string(path) {
    Ok(raw) => toml::from_str(&raw).context("parsing config file"),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
    Err(e) => Err(e).with_context(|| format!("reading config file {}", path.display())),
  }
}

/// Store `session`'s token in the config file, if one was given.
fn remember(path: Option<&Path>, file_cfg: ConfigFile, session: &Session) -> Result<()> {
  let Some(path) = path else { return Ok(()) };
  let updated = ConfigFile { token: session.token.clone(), ..file_cfg };
  let raw = toml::to_string(&updated).context("serialising config file")?;
  std::fs::write(path, raw).with_context(|| format!("writing config file {}", path.display()))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg = match &args.config {
    Some(path) => read_config(path)?,
    None => ConfigFile::default(),
  };

  // CLI flags and env override the config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:5000".to_string()),
    token:    args
      .token
      .or_else(|| (!file_cfg.token.is_empty()).then(|| file_cfg.token.clone())),
  };
  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Register { username, email, password } => {
      let session = client.register(&username, &email, &password).await?;
      print_session(&session);
      remember(args.config.as_deref(), file_cfg, &session)?;
    }
    Command::Login { email, password } => {
      let session = client.login(&email, &password).await?;
      print_session(&session);
      remember(args.config.as_deref(), file_cfg, &session)?;
    }
    Command::Habits(cmd) => run_habits(&client, cmd).await?,
    Command::Weekly(cmd) => run_weekly(&client, cmd).await?,
    Command::Board(cmd) => {
      let storage = FileStorage::new(args.board.unwrap_or_else(FileStorage::default_path));
      run_board(&storage, cmd)?;
    }
  }

  Ok(())
}

fn print_session(session: &Session) {
  println!("Signed in as {} <{}>", session.user.username, session.user.email);
  println!("{}", session.token);
}

fn new_id() -> String { uuid::Uuid::new_v4().to_string() }

// ─── Server commands ──────────────────────────────────────────────────────────

async fn run_habits(client: &ApiClient, cmd: HabitsCmd) -> Result<()> {
  match cmd {
    HabitsCmd::List => {
      for h in client.list_habits().await? {
        println!("{:<38} {}", h.id, h.name);
      }
    }
    HabitsCmd::Add { name, id } => {
      let habit = client.create_habit(&id.unwrap_or_else(new_id), &name).await?;
      println!("Created {} ({})", habit.name, habit.id);
    }
    HabitsCmd::Rename { id, name } => {
      client.rename_habit(&id, &name).await?;
      println!("Renamed {id} to {name}");
    }
    HabitsCmd::Remove { id } => println!("{}", client.delete_habit(&id).await?),
    HabitsCmd::Check { id, date, off } => {
      let date = date.unwrap_or_else(|| chrono::Local::now().date_naive().to_string());
      let ack = client.set_check(&id, &date, !off).await?;
      let mark = if ack.checked { "done" } else { "not done" };
      println!("{} on {}: {mark}", ack.habit_id, ack.date);
    }
    HabitsCmd::Checks { id } => {
      for c in client.list_checks(&id).await? {
        println!("{} {}", c.date, if c.checked { "x" } else { "." });
      }
    }
  }
  Ok(())
}

async fn run_weekly(client: &ApiClient, cmd: WeeklyCmd) -> Result<()> {
  match cmd {
    WeeklyCmd::List => {
      for w in client.list_weekly().await? {
        let mark = if w.completed { "x" } else { " " };
        println!("week {} [{mark}] {:<38} {}", w.week, w.id, w.name);
      }
    }
    WeeklyCmd::Add { week, name, id } => {
      let w = client.create_weekly(&id.unwrap_or_else(new_id), week, &name).await?;
      println!("Created {} for week {} ({})", w.name, w.week, w.id);
    }
    WeeklyCmd::Update { id, name, completed } => {
      client.update_weekly(&id, name.as_deref(), completed).await?;
      println!("Updated {id}");
    }
    WeeklyCmd::Remove { id } => println!("{}", client.delete_weekly(&id).await?),
  }
  Ok(())
}

// ─── Local dashboard ──────────────────────────────────────────────────────────

fn run_board(storage: &dyn StateStorage, cmd: BoardCmd) -> Result<()> {
  let board = storage.load().unwrap_or_default();

  let next = match cmd {
    BoardCmd::Show => {
      print_board(&board);
      return Ok(());
    }
    BoardCmd::Reset => {
      storage.clear()?;
      print_board(&board.apply(Action::Reset));
      return Ok(());
    }
    BoardCmd::Toggle { habit, day } => {
      anyhow::ensure!((1..=DAYS_IN_MONTH).contains(&day), "day must be 1-{DAYS_IN_MONTH}");
      board.apply(Action::ToggleCheck { id: habit, day })
    }
    BoardCmd::Name { habit, name } => board.apply(Action::RenameHabit { id: habit, name }),
    BoardCmd::Month { month, year } => {
      board.apply(Action::SetMonth(month)).apply(Action::SetYear(year))
    }
    BoardCmd::Task { week, id, name, toggle } => {
      let mut next = board;
      if let Some(name) = name {
        next = next.apply(Action::RenameTask { week, id: id.clone(), name });
      }
      if toggle {
        next = next.apply(Action::ToggleTask { week, id });
      }
      next
    }
    BoardCmd::Goal { id, name, toggle } => {
      let mut next = board;
      if let Some(name) = name {
        next = next.apply(Action::RenameGoal { id: id.clone(), name });
      }
      if toggle {
        next = next.apply(Action::ToggleGoal { id });
      }
      next
    }
    BoardCmd::Reflect { text } => board.apply(Action::SetReflection(text)),
  };

  storage.save(&next)?;
  print_board(&next);
  Ok(())
}

fn print_board(board: &Dashboard) {
  println!("{} {}", board.month, board.year);

  let header: String = (1..=DAYS_IN_MONTH)
    .map(|d| char::from_digit(week_for_day(d), 10).unwrap_or('?'))
    .collect();
  println!("{:<24} {header}", "habit / week");

  for h in board.habits.iter().filter(|h| h.is_named()) {
    let row: String = (1..=DAYS_IN_MONTH)
      .map(|d| if h.checks.contains(&d) { 'x' } else { '.' })
      .collect();
    println!("{:<24} {row} {:>5.1}%  ({})", h.name, h.month_rate(), h.id);
  }

  println!();
  println!("Month completion: {:.1}%", board.total_completion());
  println!("Weekly tasks:     {}%", board.weekly_progress());
  for week in 1..=WEEKS {
    println!("  week {week}: {}%", board.week_progress(week));
  }
  for g in board.goals.iter().filter(|g| g.is_named()) {
    println!("[{}] {}", if g.completed { "x" } else { " " }, g.name);
  }
  if !board.reflection.is_empty() {
    println!();
    println!("{}", board.reflection);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use storage::MemoryStorage;

  #[test]
  fn board_reset_clears_saved_state() {
    let storage = MemoryStorage::default();
    run_board(&storage, BoardCmd::Toggle { habit: "h-0".into(), day: 3 }).unwrap();
    assert!(storage.load().unwrap().habits[0].checks.contains(&3));

    run_board(&storage, BoardCmd::Reset).unwrap();
    assert!(storage.load().is_none());
  }
}
