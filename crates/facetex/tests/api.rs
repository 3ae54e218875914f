use facetex::app::{load_config, run_training, TrainConfig};
use facetex::image::{extract_gray_batch, view_of};
use facetex::{
    extract, extract_image, Classifier, Dataset, FeatureKind, FeatureParams, Hyperparams,
    KernelType, LoaderConfig, Recognizer, TrainError, TrainingDataLoader,
};
use image::{DynamicImage, GrayImage, Luma};
use ndarray::ArrayView1;
use std::fs;
use std::path::Path;

fn stripes(w: u32, h: u32, shift: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, _| Luma([if (x + shift) % 4 < 2 { 40 } else { 210 }]))
}

fn checker(w: u32, h: u32, shift: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        Luma([if ((x + shift) / 2 + y / 2) % 2 == 0 { 30 } else { 220 }])
    })
}

fn gradient(w: u32, h: u32, shift: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| Luma([((x * 9 + y * 5 + shift * 3) % 256) as u8]))
}

/// root/{alice/pos, bg, bob/pos}, `per_class` PNGs each.
fn write_faces(root: &Path, per_class: u32) {
    let classes: [(&str, fn(u32, u32, u32) -> GrayImage); 3] = [
        ("alice/pos", stripes),
        ("bg", gradient),
        ("bob/pos", checker),
    ];
    for (dir, make) in classes {
        let dir = root.join(dir);
        fs::create_dir_all(&dir).unwrap();
        for i in 0..per_class {
            make(24, 24, i).save(dir.join(format!("{i:02}.png"))).unwrap();
        }
    }
}

#[test]
fn image_helpers_match_core_encoders() {
    let img = stripes(20, 16, 1);
    let params = FeatureParams::new(FeatureKind::Ltp);
    let core = extract(&view_of(&img).unwrap(), &params);
    let helper = extract_image(&DynamicImage::ImageLuma8(img.clone()), &params).unwrap();
    assert_eq!(core, helper);

    let batch = extract_gray_batch(&[img.clone(), checker(20, 16, 0)], &params).unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0], core);
    assert_ne!(batch[1], core);
}

#[test]
fn loader_labels_and_splits_identities() {
    let dir = tempfile::tempdir().unwrap();
    write_faces(dir.path(), 10);
    // a stray file at the root is not an identity
    fs::write(dir.path().join("notes.txt"), "not a face").unwrap();
    // an undecodable image is skipped
    fs::write(dir.path().join("bob/pos/zz.png"), "garbage").unwrap();

    let cfg = LoaderConfig {
        train_fraction: 0.8,
        width: 16,
        height: 16,
        ..LoaderConfig::new(dir.path())
    };
    let data = TrainingDataLoader::new(cfg).load().unwrap();

    let names: Vec<(i32, &str)> = data.names.iter().map(|(l, n)| (*l, n.as_str())).collect();
    assert_eq!(names, vec![(-1, "alice"), (0, "bg"), (1, "bob")]);

    // alice and bg: 8 + 2; bob has 11 files, 8 + 2 taken, the garbage file is last
    assert_eq!(data.train.len(), 24);
    assert_eq!(data.test.len(), 6);
    assert_eq!(data.train.n_features(), 256);
    assert_eq!(data.train.classes(), vec![-1, 0, 1]);
    assert_eq!(&data.test.labels()[..2], &[-1, -1]);
}

#[test]
fn loader_skips_undecodable_training_images() {
    let dir = tempfile::tempdir().unwrap();
    write_faces(dir.path(), 4);
    fs::write(dir.path().join("alice/pos/00.png"), "garbage").unwrap();

    let cfg = LoaderConfig {
        train_fraction: 1.0,
        width: 16,
        height: 16,
        ..LoaderConfig::new(dir.path())
    };
    let data = TrainingDataLoader::new(cfg).load().unwrap();
    assert_eq!(data.train.len(), 11);
    assert!(data.test.is_empty());
}

#[test]
fn loader_rejects_empty_root() {
    let dir = tempfile::tempdir().unwrap();
    let err = TrainingDataLoader::new(LoaderConfig::new(dir.path()))
        .load()
        .unwrap_err();
    assert!(matches!(err, facetex::LoadError::NoIdentities(_)));
}

/// Labels a sample by its first value: 1 when it is non-zero.
struct FirstValue {
    var_count: Option<usize>,
}

impl Classifier for FirstValue {
    fn configure(&mut self, _: &Hyperparams) -> facetex_train::Result<()> {
        Ok(())
    }

    fn train(&mut self, data: &Dataset) -> facetex_train::Result<()> {
        self.var_count = Some(data.n_features());
        Ok(())
    }

    fn predict(&self, sample: ArrayView1<'_, f32>) -> facetex_train::Result<i32> {
        Ok(i32::from(sample[0] > 0.0))
    }

    fn is_trained(&self) -> bool {
        self.var_count.is_some()
    }

    fn var_count(&self) -> Option<usize> {
        self.var_count
    }
}

#[test]
fn recognizer_infers_descriptor_and_checks_length() {
    let untrained = FirstValue { var_count: None };
    assert!(matches!(
        Recognizer::from_trained(untrained, 16, 16),
        Err(TrainError::NotTrained)
    ));

    let lbp = Recognizer::from_trained(FirstValue { var_count: Some(256) }, 16, 16).unwrap();
    assert_eq!(lbp.features().kind, FeatureKind::Lbp);
    // a flat crop puts all LBP mass in bin 0
    let flat = DynamicImage::ImageLuma8(GrayImage::from_pixel(40, 40, Luma([90])));
    assert_eq!(lbp.predict_image(&flat), Ok(1));

    let names = [(1, "alice".to_string())].into_iter().collect();
    let lbp = lbp.with_names(names);
    assert_eq!(lbp.predict_name(&flat), Ok(Some("alice")));

    let csltp = Recognizer::new(
        FirstValue { var_count: Some(256) },
        FeatureParams::new(FeatureKind::CsLtp),
        16,
        16,
    )
    .unwrap();
    assert_eq!(
        csltp.predict_image(&flat),
        Err(TrainError::FeatureLengthMismatch {
            expected: 256,
            actual: 121
        })
    );

    let haar = Recognizer::from_trained(FirstValue { var_count: Some(144) }, 16, 16).unwrap();
    assert_eq!(haar.features().kind, FeatureKind::Haar);
    assert!(haar.predict_image(&flat).is_ok());
}

#[test]
fn training_run_writes_summary() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("faces");
    write_faces(&data_dir, 6);
    let summary_path = dir.path().join("summary.json");

    let cfg = TrainConfig {
        feature: Some(FeatureKind::Lbp),
        image_size: Some(16),
        train_fraction: Some(0.5),
        max_iterations: Some(3),
        output_json: Some(summary_path.clone()),
        ..TrainConfig::new(&data_dir)
    };
    let (summary, recognizer) = run_training(cfg).unwrap();

    assert_eq!(summary.train_samples, 9);
    assert_eq!(summary.test_samples, 9);
    assert_eq!(summary.var_count, 256);
    assert!(summary.rounds >= 1 && summary.rounds <= 3 + 3 + 1);
    assert!((0.0..=1.0).contains(&summary.accuracy));
    assert_eq!(recognizer.names().len(), 3);
    assert!(recognizer.classifier().is_trained());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(json["feature"], "lbp");
    assert_eq!(json["width"], 16);
    assert_eq!(json["names"]["-1"], "alice");
    assert_eq!(json["hyperparams"]["kernel"], "rbf");
}

#[test]
fn linear_training_run_takes_one_round() {
    let dir = tempfile::tempdir().unwrap();
    write_faces(dir.path(), 4);
    let cfg = TrainConfig {
        kernel: Some(KernelType::Linear),
        image_size: Some(16),
        train_fraction: Some(0.5),
        ..TrainConfig::new(dir.path())
    };
    let (summary, _) = run_training(cfg).unwrap();
    assert_eq!(summary.rounds, 1);
    assert_eq!(summary.phase, facetex::Phase::Fixed);
}

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.json");
    fs::write(
        &path,
        r#"{ "data_dir": "faces", "feature": "csltp", "threshold": 10, "kernel": "poly", "svm_type": "nu_svc" }"#,
    )
    .unwrap();
    let cfg = load_config(&path).unwrap();
    assert_eq!(cfg.feature_params(), FeatureParams::new(FeatureKind::CsLtp).with_threshold(10));
    let hp = cfg.hyperparams();
    assert_eq!(hp.kernel, KernelType::Poly);
    assert_eq!(hp.svm_type, facetex::SvmType::NuSvc);
    assert_eq!(hp.gamma, 0.1);
    assert_eq!(cfg.image_size(), 64);

    assert!(load_config(&dir.path().join("missing.json")).is_err());
}
