use clap::Parser;
use env_logger::Env;
use kpalette::policy::Prompt;
use kpalette::{
    Config, ContinuationOracle, ConvergencePolicy, Decision, EpochStats, InputImage, Placement,
    Quantizer,
};
use snafu::{ResultExt, Whatever};
use std::io;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(about = "Reduce the colour palette of an image with k-means clustering")]
struct Args {
    /// Image to read
    input: PathBuf,

    /// Where to write the reduced image
    output: PathBuf,

    /// Use randomly placed clusters instead of a uniform lattice
    #[arg(short, long)]
    random: bool,

    /// Number of randomly placed clusters
    #[arg(short, long, default_value_t = 20)]
    count: usize,

    /// Lattice factor, creates factor³ uniformly placed clusters
    #[arg(short, long, default_value_t = 3)]
    factor: usize,

    /// Stop once the largest cluster shrinks by at most this many pixels per epoch,
    /// instead of asking
    #[arg(long)]
    threshold: Option<usize>,

    /// Epochs to run before the first question
    #[arg(long, default_value_t = 1, conflicts_with = "threshold")]
    pause_every: usize,

    /// Seed for random placement
    #[arg(long)]
    seed: Option<u64>,

    /// Assign pixels on all cores
    #[arg(long)]
    parallel: bool,
}

fn print_report(stats: &EpochStats) {
    println!("----------------");
    println!("Run no. {}", stats.epoch);
    println!("Clusters count distribution:\n{:?}", stats.distribution);
    println!("Reduced image to {} colours.", stats.non_empty());
    match stats.average_distance() {
        Some(avg) => println!("Average distance between pixel and closest cluster:\n{avg:.2}"),
        None => println!("Average distance between pixel and closest cluster:\nn/a"),
    }
}

#[snafu::report]
fn main() -> Result<(), Whatever> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let placement = if args.random {
        Placement::Random { count: args.count }
    } else {
        Placement::Uniform {
            factor: args.factor,
        }
    };
    let policy = match args.threshold {
        Some(threshold) => ConvergencePolicy::Threshold { threshold },
        None => ConvergencePolicy::Interactive {
            pause_every: args.pause_every,
        },
    };
    let mut config = Config::default()
        .with_placement(placement)
        .with_policy(policy)
        .with_parallel(args.parallel);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let img = image::open(&args.input)
        .with_whatever_context(|_| format!("failed to open {}", args.input.display()))?
        .to_rgb8();
    println!("Total number of pixels {}", img.width() as u64 * img.height() as u64);

    let input = InputImage::try_from(&img).whatever_context("unsupported input image")?;
    let mut quantizer = Quantizer::new(input, config).whatever_context("invalid arguments")?;

    let t = Instant::now();
    let mut prompt = Prompt::new(io::stdin().lock(), io::stdout());
    loop {
        let mut reported = false;
        let (stats, decision) = quantizer.step(&mut |stats: &EpochStats| {
            print_report(stats);
            reported = true;
            prompt.ask(stats)
        });
        if !reported {
            print_report(&stats);
        }
        if decision == Decision::Stop {
            break;
        }
    }

    let epochs = quantizer.epoch();
    let (output, palette) = quantizer.finish();
    output
        .to_rgb_image()
        .save(&args.output)
        .with_whatever_context(|_| format!("failed to save {}", args.output.display()))?;

    println!(
        "{}: {} colours after {} runs, {:?}",
        args.output.display(),
        palette.len(),
        epochs,
        t.elapsed(),
    );
    Ok(())
}
