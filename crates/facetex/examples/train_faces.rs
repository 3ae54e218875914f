use anyhow::Context;
use facetex::app::{init_tracing, load_config, run_training, TrainConfig};
use facetex::loader::DEFAULT_BACKGROUND_DIR;
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: train_faces <data-dir | config.json> \
[--feature lbp|ltp|csltp|haar] [--kernel linear|poly|rbf] [--gamma G] \
[--size N] [--out summary.json] [--log LEVEL]";

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let first: PathBuf = args.next().context(USAGE)?.into();

    let mut cfg = if first.extension().and_then(|s| s.to_str()) == Some("json") {
        load_config(&first)?
    } else {
        TrainConfig::new(&first)
    };

    while let Some(arg) = args.next() {
        let mut value = || args.next().with_context(|| format!("expected a value after {arg}"));
        match arg.as_str() {
            "--feature" => cfg.feature = Some(value()?.parse().map_err(anyhow::Error::msg)?),
            "--kernel" => cfg.kernel = Some(value()?.parse().map_err(anyhow::Error::msg)?),
            "--gamma" => cfg.gamma = Some(value()?.parse().context("could not parse gamma")?),
            "--size" => cfg.image_size = Some(value()?.parse().context("could not parse size")?),
            "--out" => cfg.output_json = Some(value()?.into()),
            "--log" => cfg.log_level = Some(value()?),
            other => anyhow::bail!("unknown argument: {other}\n{USAGE}"),
        }
    }

    init_tracing(cfg.log_level.as_deref())?;
    if !Path::new(&cfg.data_dir).join(DEFAULT_BACKGROUND_DIR).is_dir() {
        tracing::warn!("no background directory, every class is an identity");
    }

    let (summary, recognizer) = run_training(cfg)?;
    println!(
        "{} on {}x{}: accuracy {:.3} after {} rounds (gamma {:.3e}, {})",
        summary.feature,
        summary.width,
        summary.height,
        summary.accuracy,
        summary.rounds,
        summary.hyperparams.gamma,
        if summary.reached_target {
            "target reached"
        } else {
            "best effort"
        }
    );
    for (label, name) in recognizer.names() {
        println!("  {label:>3} {name}");
    }

    Ok(())
}
