use crate::cli::opts::*;
use crate::config::AppConfig;
use crate::seed::ensure_seeded;
use crate::tui::app::TuiApp;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use recall_core::{
    filter_by_text, summarize, Card, CardStore, CardTags, Clock, Difficulty, Judgment,
    Persistence, SessionState, SystemClock, Trainer,
};
use recall_json::JsonStore;
use std::io::{stdin, stdout, BufRead, Write};
use std::path::{Path, PathBuf};

pub fn run_cli(args: Cli, config: AppConfig) -> Result<()> {
    let mut store = open_store(&config, args.data_file.clone())?;
    match args.cmd {
        Command::Review(f) => {
            let filter = config.review.filter(f.category, f.difficulty);
            let mut trainer = Trainer::from_store(store, SystemClock, filter);
            let stdin = stdin();
            let mut input = stdin.lock();
            let mut out = stdout();
            run_review(&mut trainer, &mut input, &mut out)
        }
        Command::Tui(f) => {
            let filter = config.review.filter(f.category, f.difficulty);
            let trainer = Trainer::from_store(store, SystemClock, filter);
            TuiApp::new(trainer).run()
        }
        Command::Due(f) => {
            let filter = config.review.filter(f.category, f.difficulty);
            let trainer = Trainer::from_store(store, SystemClock, filter);
            due_cmd(&trainer)
        }
        Command::List(cmd) => list_cmd(&store, cmd),
        Command::Stats => stats_cmd(&store, &SystemClock, &mut stdout()),
        Command::Reset { yes } => {
            if !yes {
                bail!("reset clears all review progress; pass --yes to confirm");
            }
            store.reset()?;
            println!("ok");
            Ok(())
        }
        Command::Export(cmd) => export_cmd(&store, cmd),
        Command::Import(cmd) => import_cmd(&mut store, cmd),
    }
}

pub fn open_store(config: &AppConfig, data_file: Option<PathBuf>) -> Result<CardStore<JsonStore>> {
    let (path, backups_dir) = config.storage.resolve(data_file);
    let json = JsonStore::open_with(path.clone(), backups_dir, config.storage.max_backups)
    .with_context(|| format!("cannot open card file {}", path.display()))?;
    let mut store = CardStore::open(json)?;
    ensure_seeded(&mut store)?;
    Ok(store)
}

/// Line-based review loop over one session.
pub fn run_review<P, C, R, W>(trainer: &mut Trainer<P, C>, input: &mut R, out: &mut W) -> Result<()>
where
    P: Persistence,
    C: Clock,
    R: BufRead,
    W: Write,
{
    let total = trainer.session().total();
    if total == 0 {
        writeln!(out, "no cards due")?;
        if let Some(at) = summarize(trainer.store().get_all(), trainer.clock().now()).next_due_at {
            writeln!(out, "next review at {}", at.format("%Y-%m-%d %H:%M UTC"))?;
        }
        writeln!(out, "(run `recall reset --yes` to start over)")?;
        return Ok(());
    }

    while let Some(card) = trainer.current_card() {
        let pos = trainer.session().position() + 1;
        writeln!(out, "\n[{pos}/{total}] {}", card.tags.category)?;
        writeln!(out, "Q: {}", card.prompt)?;
        let answer = card.answer.clone();
        if read_line(input, out, "[enter=show] ")?.is_none() {
            break;
        }
        writeln!(out, "A: {answer}")?;
        let judgment = loop {
            let Some(line) = read_line(input, out, "recalled it? [y/n/q] ")? else {
                return finish(trainer, out);
            };
            match line.trim().to_lowercase().as_str() {
                "y" | "yes" | "1" => break Judgment::Correct,
                "n" | "no" | "0" => break Judgment::Incorrect,
                "q" | "quit" => return finish(trainer, out),
                _ => writeln!(out, "enter y, n, or q")?,
            }
        };
        trainer.submit_judgment(judgment)?;
        if let Some(o) = trainer.last_outcome() {
            writeln!(out, "-> next review in {} hour(s)", o.interval_hours)?;
        }
    }
    finish(trainer, out)
}

fn finish<P: Persistence, C: Clock, W: Write>(trainer: &Trainer<P, C>, out: &mut W) -> Result<()> {
    match trainer.summary() {
        Ok(s) => {
            let label = if trainer.state() == SessionState::Complete {
                "session complete"
            } else {
                "session stopped"
            };
            writeln!(
                out,
                "\n{label}: {} correct, {} incorrect, accuracy {:.0}%",
                s.correct_count,
                s.incorrect_count,
                s.accuracy * 100.0
            )?;
        }
        Err(_) => writeln!(out, "\nno cards reviewed")?,
    }
    Ok(())
}

fn due_cmd<P: Persistence, C: Clock>(trainer: &Trainer<P, C>) -> Result<()> {
    let due = trainer.session().due();
    if due.is_empty() {
        println!("no cards due");
        return Ok(());
    }
    for id in due {
        let c = trainer.store().get(id)?;
        println!("{}\t{}\t{}", c.id, c.tags.category, c.prompt);
    }
    Ok(())
}

fn list_cmd<P: Persistence>(store: &CardStore<P>, cmd: ListCmd) -> Result<()> {
    let filter = recall_core::CardFilter {
        category: cmd.filter.category,
        difficulty: cmd.filter.difficulty,
    };
    let mut cards = filter.apply(store.get_all());
    if let Some(q) = cmd.query {
        cards = filter_by_text(&cards, &q);
    }
    for c in cards {
        println!(
            "{}\t{}\t{}\tstreak={}\tnext={}",
            c.id,
            c.tags.category,
            c.prompt,
            c.correct_streak,
            fmt_ts(c.next_review_at)
        );
    }
    Ok(())
}

fn stats_cmd<P: Persistence, C: Clock, W: Write>(store: &CardStore<P>, clock: &C, out: &mut W) -> Result<()> {
    let s = summarize(store.get_all(), clock.now());
    writeln!(out, "cards:          {}", s.total)?;
    writeln!(out, "never reviewed: {}", s.never_reviewed)?;
    writeln!(out, "due now:        {}", s.due)?;
    writeln!(out, "scheduled:      {}", s.scheduled)?;
    writeln!(out, "longest streak: {}", s.longest_streak)?;
    writeln!(out, "next due:       {}", fmt_ts(s.next_due_at))?;
    Ok(())
}

fn export_cmd<P: Persistence>(store: &CardStore<P>, cmd: ExportCmd) -> Result<()> {
    match cmd {
        ExportCmd::Json { path } => {
            let bundle = ExportBundle {
                version: 1,
                cards: store.get_all().to_vec(),
            };
            let s = serde_json::to_string_pretty(&bundle)?;
            std::fs::write(&path, s)?;
            println!("wrote {}", path.display());
        }
        ExportCmd::Csv { path } => {
            write_csv(store.get_all(), &path)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn import_cmd<P: Persistence>(store: &mut CardStore<P>, cmd: ImportCmd) -> Result<()> {
    let n = match cmd {
        ImportCmd::Json { path } => {
            let data = std::fs::read_to_string(&path)?;
            let bundle: ExportBundle = serde_json::from_str(&data)?;
            let n = bundle.cards.len();
            store.extend_records(bundle.cards)?;
            n
        }
        ImportCmd::Csv { path } => {
            let cards = read_csv(&path)?;
            let n = cards.len();
            store.extend(cards)?;
            n
        }
    };
    println!("imported {n}");
    Ok(())
}

// ===== Helpers =====
const CSV_HEADER: [&str; 8] = [
    "id",
    "prompt",
    "answer",
    "category",
    "difficulty",
    "source",
    "correct_streak",
    "next_review_at",
];

fn write_csv(cards: &[Card], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(CSV_HEADER)?;
    for c in cards {
        wtr.write_record([
            c.id.clone(),
            c.prompt.clone(),
            c.answer.clone(),
            c.tags.category.clone(),
            c.tags.difficulty.to_string(),
            c.tags.source.clone().unwrap_or_default(),
            c.correct_streak.to_string(),
            c.next_review_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Review columns, if present, are ignored: imported cards start unreviewed.
fn read_csv(path: &Path) -> Result<Vec<Card>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut cards = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let field = |i: usize| rec.get(i).unwrap_or("").trim().to_string();
        let (prompt, answer) = (field(1), field(2));
        if prompt.is_empty() || answer.is_empty() {
            bail!("row {}: prompt and answer are required", line + 2);
        }
        let difficulty = match field(4).as_str() {
            "" => Difficulty::default(),
            d => d.parse().with_context(|| format!("row {}", line + 2))?,
        };
        let source = Some(field(5)).filter(|s| !s.is_empty());
        let tags = CardTags {
            category: field(3),
            difficulty,
            source,
        };
        let id = field(0);
        let card = if id.is_empty() {
            Card::new(prompt, answer)
        } else {
            Card::with_id(id, prompt, answer)
        };
        cards.push(card.tagged(tags));
    }
    Ok(cards)
}

fn fmt_ts(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn read_line<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush().ok();
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        return Ok(None);
    }
    Ok(Some(s))
}

#[derive(serde::Serialize, serde::Deserialize)]
struct ExportBundle {
    version: u32,
    cards: Vec<Card>,
}
