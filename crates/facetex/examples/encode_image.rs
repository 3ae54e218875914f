use anyhow::Context;
use facetex::{brief, extract_image, resize_face, FeatureKind, FeatureParams};
use image::ImageReader;
use serde::Serialize;
use std::time::Instant;
use std::{fs::File, io::Write, path::PathBuf};

#[derive(Serialize)]
struct FeatureDump {
    image: String,
    width: u32,
    height: u32,
    feature: FeatureKind,
    threshold: i32,
    expected_len: usize,
    values: Vec<f32>,
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let input: PathBuf = args
        .next()
        .context(
            "usage: encode_image <image> [--feature lbp|ltp|csltp|haar] [--threshold T] [--size N]",
        )?
        .into();

    let mut params = FeatureParams::default();
    let mut size: u32 = 64;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--feature" => {
                let v = args.next().context("expected a name after --feature")?;
                params.kind = v.parse().map_err(anyhow::Error::msg)?;
            }
            "--threshold" => {
                let v = args.next().context("expected an integer after --threshold")?;
                params.threshold = v.parse().context("could not parse threshold")?;
            }
            "--size" => {
                let v = args.next().context("expected an integer after --size")?;
                size = v
                    .parse()
                    .context("could not parse size (use integer >= 1)")?;
                if size == 0 {
                    anyhow::bail!("size must be >= 1");
                }
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    let img = ImageReader::open(&input)?.decode()?;
    let face = resize_face(&img, size, size);

    let started = Instant::now();
    let features = extract_image(&face, &params)?;
    let ms = started.elapsed().as_secs_f64() * 1000.0;

    println!("image {}x{} -> {size}x{size}", img.width(), img.height());
    println!("{}: {:5.2} ms", params.kind, ms);
    println!("{}", brief(&features.values));
    if !features.is_valid() {
        anyhow::bail!(
            "{} produced {} values, expected {}",
            params.kind,
            features.len(),
            features.expected_len
        );
    }

    let json_out = input.with_extension(format!("{}.json", params.kind.name().to_lowercase()));
    let dump = FeatureDump {
        image: input.to_string_lossy().into_owned(),
        width: size,
        height: size,
        feature: params.kind,
        threshold: params.threshold,
        expected_len: features.expected_len,
        values: features.values,
    };
    let mut json_file = File::create(&json_out)?;
    serde_json::to_writer_pretty(&mut json_file, &dump)?;
    json_file.write_all(b"\n")?;
    println!("Saved JSON dump to {}", json_out.display());

    Ok(())
}
