mod cli;

use std::io::Write;
use std::time::Duration;

use anyhow::bail;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use cli::{Args, Commands};
use organize::config;
use organize::{KvTaskRepository, Task, TaskId, TaskStore, TickOutcome, TimerSession, YamlFileStore};

type FileTaskStore = TaskStore<KvTaskRepository<YamlFileStore>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = config::load_default()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let file_store = YamlFileStore::open(&cfg.data_file)?;
    tracing::debug!(path = %file_store.path().display(), "using data file");
    let mut store = TaskStore::new(KvTaskRepository::new(file_store));

    let today = organize::today();
    if let Err(e) = store.activate(today) {
        tracing::warn!(error = %e, "daily reset could not be saved, will retry next time");
    }

    match args.command.unwrap_or(Commands::Today) {
        Commands::Today => {
            println!("Today ({})", organize::weekday_code(today));
            print_tasks(&store.today_tasks(today));
        }
        Commands::List { category } => {
            println!("Category {category}");
            print_tasks(&store.tasks_in(category));
        }
        Commands::Add { title, minutes, category } => {
            let id = store.add(&title, &minutes, category)?;
            println!("{id}");
        }
        Commands::Remove { id } => {
            if !store.remove(&TaskId(id.clone()))? {
                bail!("no task with id '{id}'");
            }
        }
        Commands::Complete { id } => {
            if !store.complete(&TaskId(id.clone()))? {
                bail!("no task with id '{id}'");
            }
        }
        Commands::Timer { id } => run_timer(&mut store, &TaskId(id)).await?,
    }
    Ok(())
}

fn print_tasks(tasks: &[&Task]) {
    if tasks.is_empty() {
        println!("  (no tasks)");
    }
    for task in tasks {
        let mark = if task.is_completed { "x" } else { " " };
        println!(
            "  [{mark}] {} ({} min, {})  {}",
            task.title(),
            task.duration(),
            task.category(),
            task.id()
        );
    }
}

fn format_remaining(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

async fn run_timer(store: &mut FileTaskStore, id: &TaskId) -> anyhow::Result<()> {
    let Some(mut session) = TimerSession::open(store, id) else {
        bail!("no task with id '{id}'");
    };
    let title = session.task().map(|task| task.title().to_string()).unwrap_or_default();
    println!("{title}  (p: pause/resume, r: reset, q: quit)");

    let mut ticks = tokio::time::interval(Duration::from_secs(1));
    // The first tick of an interval fires immediately.
    ticks.tick().await;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        print!("\r{}", format_remaining(session.timer().remaining()));
        std::io::stdout().flush()?;

        tokio::select! {
            _ = ticks.tick() => {
                if session.tick()? == TickOutcome::Completed {
                    println!("\r00:00  done");
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => match line? {
                Some(input) => match input.trim() {
                    "p" => session.toggle(),
                    "r" => session.reset(),
                    "q" => break,
                    _ => {}
                },
                None => stdin_open = false,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    // Ends the session, which cancels any further ticks.
    let state = session.close();
    tracing::debug!(?state, "timer surface dismissed");
    println!();
    Ok(())
}
