use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trip_backend::{config::PlannerArgs, models::PlanTripRequest, planner::TripQuery};

#[derive(Debug, Parser)]
#[command(author, version, about = "Plan a single trip from the command line")]
struct Cli {
    #[arg(long)]
    origin: String,

    #[arg(long)]
    destination: String,

    /// carro, moto or caminhao (anything else counts as carro)
    #[arg(long)]
    vehicle: Option<String>,

    #[command(flatten)]
    planner: PlannerArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    cli.planner.warn_missing_keys();

    let planner = cli.planner.build_planner()?;
    let query = TripQuery::try_from(&PlanTripRequest {
        origem: Some(cli.origin),
        destino: Some(cli.destination),
        veiculo: cli.vehicle,
    })?;

    let plan = planner.plan(query).await?;

    println!("{}", plan.narrative);
    println!();
    println!("Distância: {:.1} km ({})", plan.distance_km, plan.query.vehicle);
    println!(
        "Clima: {}/{} pontos com dados",
        plan.coverage.answered, plan.coverage.requested
    );
    println!(
        "Custos: combustível R$ {:.2}, água R$ {:.2}, alimentação R$ {:.2}, total R$ {:.2}",
        plan.costs.fuel, plan.costs.water, plan.costs.food, plan.costs.total
    );

    Ok(())
}
