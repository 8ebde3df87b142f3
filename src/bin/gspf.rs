use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use gspf::{compare, load_case, load_results, runpf, save_results, PFOptBuilder};
use std::path::PathBuf;

/// Gauss-Seidel power flow with reference solution comparison.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Power Flow
    #[clap(name = "pf")]
    PowerFlow(PfArgs),

    /// Compare two result files
    Compare(CompareArgs),
}

#[derive(Args)]
struct PfArgs {
    /// The input case file
    #[arg(required = true)]
    input: PathBuf,

    /// Reference result file to compare the solution against.
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Output result file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Termination tolerance on the bus voltage update (p.u.).
    #[arg(long)]
    pub tol: Option<f64>,

    /// Maximum number of iterations.
    #[arg(long)]
    pub max_it: Option<usize>,

    /// Divisor applied to load and generator powers (kW, kVAr).
    #[arg(long)]
    pub base: Option<f64>,
}

#[derive(Args)]
struct CompareArgs {
    /// Result file listing the buses to compare
    #[arg(required = true)]
    results: PathBuf,

    /// Reference result file
    #[arg(required = true)]
    reference: PathBuf,
}

fn main() {
    env_logger::Builder::from_default_env()
        .format_level(false)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    match execute(&cli) {
        Ok(_) => {
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(2);
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::PowerFlow(args) => power_flow(args),
        Commands::Compare(args) => {
            let results = load_results(&args.results)?;
            let reference = load_results(&args.reference)?;
            println!("{}", compare(&results, &reference));
            Ok(())
        }
    }
}

fn power_flow(args: &PfArgs) -> Result<()> {
    let model = load_case(&args.input)?;

    let mut builder = PFOptBuilder::default();
    if let Some(tol) = args.tol {
        builder.tolerance(tol);
    }
    if let Some(max_it) = args.max_it {
        builder.max_it(max_it);
    }
    if let Some(base) = args.base {
        builder.base(base);
    }
    let mpopt = builder.build()?;

    let solution = runpf(&model, &mpopt)?;
    for w in &solution.warnings {
        eprintln!("warning: {}", w);
    }

    if let Some(out_path) = &args.output {
        save_results(out_path, &solution.results)?;
    }

    if let Some(ref_path) = &args.reference {
        let reference = load_results(ref_path)?;
        let report = compare(&solution.results, &reference);
        println!("{}", report);
        for bus in report.missing() {
            eprintln!("warning: no reference voltage for bus '{}'", bus);
        }
    } else {
        for bv in solution.results.iter() {
            println!("{:<10} {:.7} {:.4}", bv.bus, bv.vm_a(), bv.va_a());
        }
    }

    if !solution.converged {
        return Err(anyhow::anyhow!(
            "power flow did not converge in {} iterations",
            solution.iterations
        ));
    }
    Ok(())
}
