mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use classroom_kit::{
    books::{self, BooksState, catalog::BookCatalog},
    config::AppConfig,
    courses::{
        self, CoursesState,
        mongo_store::MongoCourseStore,
        seed::seed_courses,
        store::{CourseStore, InMemoryCourseStore},
    },
    grading::{GradingOptions, assign_grades},
    library::{LibraryTourOptions, books_collection, run_library_tour},
    server::serve,
    students::{self, StudentsState, repository::CsvStudentRepository},
    warehouse::{ClickHouseHttp, TourOptions, run_tour},
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, Service, StoreKind};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("failed to load configuration")?;

    match cli.command {
        Command::AssignGrades {
            input,
            output,
            column,
            seed,
        } => {
            let mut options = GradingOptions::new(input, output).column(column);
            if let Some(seed) = seed {
                options = options.seed(seed);
            }
            let summary = assign_grades(&options).context("grade assignment failed")?;
            println!(
                "File saved to: {} ({} rows, seed {})",
                summary.output.display(),
                summary.rows,
                summary.seed
            );
        }
        Command::Serve { service } => run_service(service, &config).await?,
        Command::SeedCourses => {
            let store = MongoCourseStore::connect(&config.mongo).await?;
            let report = seed_courses(&store)
                .await
                .context("failed to seed courses")?;
            println!(
                "Seeded courses: {} inserted, {} already present",
                report.inserted, report.skipped
            );
        }
        Command::LibraryTour { cleanup } => {
            let collection = books_collection(&config.mongo).await?;
            let mut stdout = std::io::stdout();
            run_library_tour(&collection, &mut stdout, LibraryTourOptions { cleanup })
                .await
                .context("library tour failed")?;
        }
        Command::WarehouseTour { cleanup } => {
            let warehouse = ClickHouseHttp::new(&config.clickhouse)
                .context("failed to build ClickHouse client")?;
            let mut stdout = std::io::stdout();
            run_tour(&warehouse, &mut stdout, TourOptions { cleanup })
                .await
                .context("warehouse tour failed")?;
        }
    }

    Ok(())
}

async fn run_service(service: Service, config: &AppConfig) -> Result<()> {
    match service {
        Service::Students { csv, bind } => {
            let path = csv.unwrap_or_else(|| config.students_csv.clone());
            info!(path = %path.display(), "student roster");
            let state = StudentsState::new(Arc::new(CsvStudentRepository::new(path)));
            serve(
                students::build_router(state),
                bind.unwrap_or(config.bind_addr),
                "students",
            )
            .await
        }
        Service::Books { source, bind } => {
            let source = source.unwrap_or_else(|| config.books_source.clone());
            let catalog = BookCatalog::load(&source).await?;
            serve(
                books::build_router(BooksState::new(catalog)),
                bind.unwrap_or(config.bind_addr),
                "books",
            )
            .await
        }
        Service::Courses { store, bind } => {
            let course_store: Arc<dyn CourseStore> = match store {
                StoreKind::Mongo => Arc::new(MongoCourseStore::connect(&config.mongo).await?),
                StoreKind::Memory => {
                    info!("course store: in-memory");
                    Arc::new(InMemoryCourseStore::new())
                }
            };
            let state = CoursesState::new(course_store, config.mongo.database.as_str());
            serve(
                courses::build_router(state),
                bind.unwrap_or(config.bind_addr),
                "courses",
            )
            .await
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("classroom_kit=debug,classroom=debug,tower_http=info")
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
