use clap::{Parser, Subcommand};

use organize::{Category, StoreError};

#[derive(Parser, Debug)]
#[command(name = "organize", version, about = "Daily and weekly tasks with countdown timers")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Daily tasks plus the tasks for today's weekday (default).
    Today,
    /// Tasks of one category: D, M, T, W, Th, F, Sa or Su.
    List {
        #[arg(value_parser = parse_category)]
        category: Category,
    },
    Add {
        title: String,
        /// Length of the countdown in minutes.
        minutes: String,
        #[arg(long, short, default_value = "D", value_parser = parse_category)]
        category: Category,
    },
    Remove {
        id: String,
    },
    Complete {
        id: String,
    },
    /// Count down a task. Type `p` to pause or resume, `r` to reset, `q` to quit.
    Timer {
        id: String,
    },
}

fn parse_category(code: &str) -> Result<Category, StoreError> {
    Category::from_code(code)
}
