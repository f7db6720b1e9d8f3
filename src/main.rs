use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use directories::ProjectDirs;
use eyre::{bail, Result};
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use motorinci::{
    calculator::{self, Stroke},
    catalog::{
        ai, Brand, Category, Color, Comparison, Feature, HomePage, Id, ListQuery, Motor, Resource,
        SpecGroup, SpecItem,
    },
    list::{ListController, Notice},
    AbortController, ApiClient, Config, FileTokenStore, MemoryTokenStore, TokenStore,
};

#[derive(Parser)]
#[command(name = "motorinci", version, about = "Browse and administer the motorinci catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a collection.
    List {
        resource: Kind,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        /// Keep loading pages until the last one.
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },
    /// Show one item.
    Show { resource: Kind, id: Id },
    /// Delete items one by one, stopping at the first failure.
    Delete {
        resource: Kind,
        #[arg(required = true)]
        ids: Vec<Id>,
    },
    /// Compare the specifications of two motors.
    Compare { first: Id, second: Id },
    /// Search motors by name.
    Search { query: String },
    /// Landing page data.
    Home,
    /// Ask the motorinci assistant a question.
    Ask {
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// Forget the cached token.
    Logout,
    #[command(subcommand)]
    Calculator(CalculatorCommand),
}

#[derive(Subcommand)]
enum CalculatorCommand {
    /// List the calculator tools.
    Menu {
        #[arg(long, value_enum, default_value_t = StrokeArg::Four)]
        stroke: StrokeArg,
    },
    /// Cylinder capacity in cc.
    Cc {
        #[arg(long)]
        bore: f64,
        #[arg(long)]
        stroke: f64,
        #[arg(long, default_value_t = 1)]
        cylinders: u32,
    },
    /// Static compression ratio.
    Compression {
        #[arg(long)]
        swept: f64,
        #[arg(long)]
        chamber: f64,
    },
    /// Mean piston speed in m/s.
    PistonSpeed {
        #[arg(long)]
        stroke: f64,
        #[arg(long)]
        rpm: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrokeArg {
    Two,
    Four,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Brands,
    Categories,
    Colors,
    Features,
    SpecGroups,
    SpecItems,
    Motors,
}

/// Runs `$body` with `$r` bound to the resource type behind `$kind`.
macro_rules! with_resource {
    ($kind:expr, $r:ident => $body:expr) => {
        match $kind {
            Kind::Brands => {
                type $r = Brand;
                $body
            }
            Kind::Categories => {
                type $r = Category;
                $body
            }
            Kind::Colors => {
                type $r = Color;
                $body
            }
            Kind::Features => {
                type $r = Feature;
                $body
            }
            Kind::SpecGroups => {
                type $r = SpecGroup;
                $body
            }
            Kind::SpecItems => {
                type $r = SpecItem;
                $body
            }
            Kind::Motors => {
                type $r = Motor;
                $body
            }
        }
    };
}

/// Pretty-prints `value` with backend-relative image paths made absolute.
fn print_json<T: Serialize + ?Sized>(config: &Config, value: &T) -> Result<()> {
    let mut value = serde_json::to_value(value)?;
    config.resolve_image_fields(&mut value);
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn token_store() -> Arc<dyn TokenStore> {
    match ProjectDirs::from("id", "motorinci", "motorinci") {
        Some(dirs) => Arc::new(FileTokenStore::new(dirs.data_dir().join("token.json"))),
        None => {
            warn!("no home directory, token will not be cached");
            Arc::new(MemoryTokenStore::new())
        }
    }
}

/// Controller that aborts once Ctrl-C is pressed.
fn abort_on_ctrl_c() -> Arc<AbortController> {
    let abort = Arc::new(AbortController::new());
    tokio::spawn({
        let abort = abort.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                abort.abort();
            }
        }
    });
    abort
}

async fn list<R: Resource + Serialize>(
    client: &ApiClient,
    config: &Config,
    query: ListQuery,
    all: bool,
) -> Result<()> {
    let abort = abort_on_ctrl_c();

    let signal = abort.signal();
    if query.page.is_some() {
        let page = client.list::<R>(&query, Some(&signal)).await?;
        return print_json(config, &page.data);
    }

    let mut controller = ListController::<R>::new(query);
    controller.refresh(client, Some(&signal)).await;
    if let Some(error) = controller.error() {
        bail!("failed to load {}s: {error}", R::LABEL);
    }
    while all && controller.load_more(client, Some(&signal)).await {
        debug!(page = controller.pager().current_page(), "loaded page");
    }
    if abort.is_aborted() {
        warn!("interrupted, printing what was loaded");
    }
    print_notices(controller.take_notices());
    print_json(config, controller.items())
}

async fn delete<R: Resource>(client: &ApiClient, ids: Vec<Id>) -> Result<()> {
    let mut controller = ListController::<R>::new(ListQuery::new());
    controller.select(ids);
    let report = controller.bulk_delete(client).await;
    print_notices(controller.take_notices());
    if !report.skipped.is_empty() {
        println!("not attempted: {:?}", report.skipped);
    }
    match report.failed {
        Some((id, e)) => bail!("deleting {} {id} failed: {e}", R::LABEL),
        None => Ok(()),
    }
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        match notice {
            Notice::Success(message) => println!("{message}"),
            Notice::Error(message) => eprintln!("{message}"),
        }
    }
}

fn calculate(command: CalculatorCommand) -> Result<()> {
    match command {
        CalculatorCommand::Menu { stroke } => {
            let stroke = match stroke {
                StrokeArg::Two => Stroke::Two,
                StrokeArg::Four => Stroke::Four,
            };
            for tool in calculator::menu(stroke) {
                println!(
                    "{:<28} {:<28} /calculator/{}/{}",
                    tool.title,
                    tool.description,
                    stroke.slug(),
                    tool.slug
                );
            }
        }
        CalculatorCommand::Cc {
            bore,
            stroke,
            cylinders,
        } => println!("{:.2} cc", calculator::cylinder_capacity(bore, stroke, cylinders)?),
        CalculatorCommand::Compression { swept, chamber } => {
            println!("{:.2} : 1", calculator::compression_ratio(swept, chamber)?);
        }
        CalculatorCommand::PistonSpeed { stroke, rpm } => {
            println!("{:.2} m/s", calculator::piston_speed(stroke, rpm)?);
        }
    }
    Ok(())
}

async fn run(client: ApiClient, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::List {
            resource,
            page,
            search,
            all,
        } => {
            let mut query = ListQuery::new();
            if let Some(page) = page {
                query = query.page(page);
            }
            if let Some(search) = search {
                query = query.search(search);
            }
            with_resource!(resource, R => list::<R>(&client, config, query, all).await)
        }
        Command::Show { resource, id } => {
            with_resource!(resource, R => print_json(config, &client.get::<R>(id, None).await?))
        }
        Command::Delete { resource, ids } => {
            with_resource!(resource, R => delete::<R>(&client, ids).await)
        }
        Command::Compare { first, second } => {
            let comparison = Comparison::fetch(&client, first, second, None).await?;
            print!("{comparison}");
            Ok(())
        }
        Command::Search { query } => {
            let motors = Motor::search(&client, &query, None).await?;
            for motor in &motors {
                println!("{:>5}  {}  {}", motor.id, motor.name, motor.price_range());
            }
            Ok(())
        }
        Command::Home => print_json(config, &HomePage::fetch(&client, None).await?),
        Command::Ask { prompt } => {
            let prompt = prompt.join(" ");
            let abort = abort_on_ctrl_c();
            let answer = ai::ask(&client, &prompt, Some(&abort.signal())).await?;
            println!("{answer}");
            Ok(())
        }
        Command::Logout => {
            client.session().clear()?;
            println!("token cleared");
            Ok(())
        }
        Command::Calculator(command) => calculate(command),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Calculator(command) => calculate(command),
        command => {
            let config = Config::from_env()?;
            let client = ApiClient::from_config(&config, token_store())?;
            run(client, &config, command).await
        }
    }
}
