//! Encode every image in a directory and write one binary file per image:
//! `u32` value count, `u32` feature tag, then the values as `f32`, all
//! little-endian.
use anyhow::Context;
use facetex::app::init_tracing;
use facetex::{extract_image, resize_face, FeatureKind, FeatureParams};
use image::ImageReader;
use std::io::{self, Write};
use std::{fs::File, path::Path, path::PathBuf};

const USAGE: &str = "usage: encode-dir <input-dir> <output-dir> \
[--feature lbp|ltp|csltp|haar] [--threshold T] [--size N]";

fn write_features(path_out: &Path, kind: FeatureKind, data: &[f32]) -> io::Result<()> {
    let mut f = File::create(path_out)?;
    f.write_all(&(data.len() as u32).to_le_bytes())?;
    f.write_all(&(kind.tag() as u32).to_le_bytes())?;
    for v in data {
        f.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn encode_dir(
    input: &Path,
    output: &Path,
    params: &FeatureParams,
    size: u32,
) -> anyhow::Result<usize> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("creating {}", output.display()))?;
    let mut paths: Vec<PathBuf> = std::fs::read_dir(input)
        .with_context(|| format!("reading {}", input.display()))?
        .map(|e| e.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    paths.sort();

    let mut written = 0;
    for p in paths {
        if !p.is_file() {
            continue;
        }
        let img = match ImageReader::open(&p)?.decode() {
            Ok(img) => img,
            Err(e) => {
                tracing::warn!(path = %p.display(), error = %e, "skipping");
                continue;
            }
        };
        let face = resize_face(&img, size, size);
        let features = extract_image(&face, params)?;
        if !features.is_valid() {
            tracing::warn!(path = %p.display(), "could not be encoded, skipping");
            continue;
        }

        let Some(name) = p.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let out = output.join(format!("{name}.bin"));
        write_features(&out, params.kind, &features.values)?;
        println!("{}: {:?} -> {:?}", params.kind, p, out);
        written += 1;
    }
    Ok(written)
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let input: PathBuf = args.next().context(USAGE)?.into();
    let output: PathBuf = args.next().context(USAGE)?.into();

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
                size = v.parse().context("could not parse size")?;
                if size == 0 {
                    anyhow::bail!("size must be >= 1");
                }
            }
            other => anyhow::bail!("unknown argument: {other}\n{USAGE}"),
        }
    }

    init_tracing(Some("warn"))?;
    let written = encode_dir(&input, &output, &params, size)?;
    println!("{written} feature files written to {}", output.display());
    Ok(())
}
