use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use classroom_kit::grading::DEFAULT_COLUMN;

#[derive(Debug, Parser)]
#[command(
    name = "classroom",
    version,
    about = "Classroom data tools: grading, CRUD services and a warehouse walkthrough"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Append a random A-E exam column to a student CSV.
    AssignGrades {
        #[arg(long, default_value = "secA.csv")]
        input: PathBuf,
        #[arg(long, default_value = "assignedMidsAsec.csv")]
        output: PathBuf,
        #[arg(long, default_value = DEFAULT_COLUMN)]
        column: String,
        /// Fixes the draw; defaults to a clock-derived seed.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run one of the HTTP services.
    Serve {
        #[command(subcommand)]
        service: Service,
    },
    /// Insert the sample course catalog into the document store.
    SeedCourses,
    /// Run filters, projections and aggregations over sample books in the
    /// document store.
    LibraryTour {
        /// Drop the scratch collection at the end.
        #[arg(long)]
        cleanup: bool,
    },
    /// Walk through DDL, inserts, joins and aggregations on ClickHouse.
    WarehouseTour {
        /// Drop the demo database at the end.
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum Service {
    Students {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    Books {
        /// Local path or http(s) URL of the books CSV.
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    Courses {
        #[arg(long, value_enum, default_value_t = StoreKind::Mongo)]
        store: StoreKind,
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Mongo,
    Memory,
}
