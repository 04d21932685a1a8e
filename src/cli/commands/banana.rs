//! Banana command - Learn which ripeness window tastes good

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::{
    Point2D,
    cli::{
        config::CommonConfig,
        output::{print_kv, print_section, print_subsection},
        parse_list,
    },
    threshold::{
        BananaBatch, ClassificationReport, ThresholdConfig, ThresholdFit, ThresholdPair,
        TrainingSet, dataset::TRAINING_MARKER,
    },
};

#[derive(Parser, Debug)]
#[command(about = "Learn a ripeness window from labeled bananas")]
pub struct BananaArgs {
    /// Lower end of the hidden "truly tasty" window used to label bananas
    #[arg(long, default_value_t = 3.0)]
    pub tasty_low: f64,

    /// Upper end of the hidden "truly tasty" window
    #[arg(long, default_value_t = 7.0)]
    pub tasty_high: f64,

    /// Explicit ripeness values labeled tasty (e.g. "2,3,4.5")
    #[arg(long)]
    pub tasty: Option<String>,

    /// Explicit ripeness values labeled not tasty
    #[arg(long)]
    pub not_tasty: Option<String>,

    /// Number of random training bananas
    #[arg(long, default_value_t = BananaBatch::DEFAULT_TRAINING)]
    pub training: usize,

    /// Number of random test bananas
    #[arg(long, default_value_t = BananaBatch::DEFAULT_TEST)]
    pub test: usize,

    #[command(flatten)]
    pub common: CommonConfig,
}

/// Everything the banana demo computed.
#[derive(Debug, Clone)]
pub struct BananaOutcome {
    pub batch: BananaBatch,
    pub training_set: TrainingSet,
    pub fit: ThresholdFit,
    pub report: ClassificationReport,
}

fn explicit_training_set(tasty: &[f64], not_tasty: &[f64]) -> TrainingSet {
    let mut set = TrainingSet::new();
    for &x in tasty {
        set.label(Point2D::new(x, TRAINING_MARKER), true);
    }
    for &x in not_tasty {
        set.label(Point2D::new(x, TRAINING_MARKER), false);
    }
    set
}

/// Generate, label, learn and classify without printing.
pub fn run(args: &BananaArgs) -> Result<BananaOutcome> {
    let mut rng = args.common.rng();
    let batch = BananaBatch::generate(args.training, args.test, &mut rng);

    let training_set = if args.tasty.is_some() || args.not_tasty.is_some() {
        let tasty = args.tasty.as_deref().map(parse_list).transpose()?;
        let not_tasty = args.not_tasty.as_deref().map(parse_list).transpose()?;
        explicit_training_set(
            tasty.as_deref().unwrap_or_default(),
            not_tasty.as_deref().unwrap_or_default(),
        )
    } else {
        let truth = ThresholdPair::new(args.tasty_low, args.tasty_high).map_err(|e| {
            anyhow!(
                "Invalid tasty window {}..{}: {e}",
                args.tasty_low,
                args.tasty_high
            )
        })?;
        batch.label_with(truth)
    };

    let fit = training_set.fit(&ThresholdConfig::default())?;
    let report = ClassificationReport::classify_all(&batch.test, fit.thresholds);

    Ok(BananaOutcome {
        batch,
        training_set,
        fit,
        report,
    })
}

fn format_values(points: &[Point2D]) -> String {
    points
        .iter()
        .map(|point| format!("{:.2}", point.x))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn execute(args: BananaArgs) -> Result<()> {
    let outcome = run(&args)?;

    print_section("Banana Ripeness Classifier");
    print_kv("Training bananas", &outcome.training_set.len().to_string());
    print_kv(
        "Labeled tasty",
        &outcome.training_set.positives().len().to_string(),
    );
    print_kv(
        "Labeled not tasty",
        &outcome.training_set.negatives().len().to_string(),
    );

    print_subsection("Learned window");
    print_kv(
        "Thresholds",
        &format!(
            "{:.2} .. {:.2}",
            outcome.fit.thresholds.low, outcome.fit.thresholds.high
        ),
    );
    print_kv("Training errors", &outcome.fit.error.to_string());

    print_subsection("Test bananas");
    print_kv(
        "Tasty",
        &format!(
            "{} [{}]",
            outcome.report.positive_count(),
            format_values(&outcome.report.positives)
        ),
    );
    print_kv(
        "Not tasty",
        &format!(
            "{} [{}]",
            outcome.report.negative_count(),
            format_values(&outcome.report.negatives)
        ),
    );

    Ok(())
}
