use std::fs;

use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng, rngs::StdRng};
use sprite_atlas_core::{
    ExtractConfig, NoProgress, PackConfig, extract_atlases, generate_atlases, read_atlas_xml,
};

fn opaque_noise(rng: &mut StdRng, w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |_, _| Rgba([rng.r#gen(), rng.r#gen(), rng.r#gen(), 255]))
}

#[test]
fn identical_pair_plus_one_round_trips() {
    let mut rng = StdRng::seed_from_u64(2024);
    let a = opaque_noise(&mut rng, 10, 10);
    let b = a.clone();
    let c = opaque_noise(&mut rng, 20, 5);

    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("src").join("sprites");
    fs::create_dir_all(&src).unwrap();
    for (name, img) in [("a", &a), ("b", &b), ("c", &c)] {
        img.save(src.join(format!("{name}.png"))).unwrap();
    }

    let atlases = tmp.path().join("atlases");
    let report = generate_atlases(
        &tmp.path().join("src"),
        &atlases,
        &PackConfig::default(),
        &NoProgress,
    )
    .unwrap();
    assert!(report.is_success());
    let stats = report.packed[0].stats;
    assert_eq!(stats.unique_frames, 2);
    assert_eq!(stats.total_frames, 3);

    let parsed = read_atlas_xml(&atlases.join("sprites.xml")).unwrap();
    let names: Vec<_> = parsed.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);
    assert!(parsed.records[0].same_geometry(&parsed.records[1]));
    assert!(parsed.records.iter().all(|r| r.frame_x == 0 && r.frame_y == 0));

    let frames = tmp.path().join("frames");
    let ex = extract_atlases(&atlases, Some(&frames), &ExtractConfig::default(), &NoProgress)
        .unwrap();
    assert_eq!(ex.frames_written, 3);
    for (name, original) in [("a", &a), ("b", &b), ("c", &c)] {
        let got = image::open(frames.join("sprites").join(format!("{name}.png")))
            .unwrap()
            .to_rgba8();
        assert_eq!(&got, original, "{name} differs after round trip");
    }
}
