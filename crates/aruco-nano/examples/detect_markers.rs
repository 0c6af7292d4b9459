use aruco_nano::detect;
use aruco_nano::draw::{draw_markers, RED};
use aruco_nano::{CameraModel, MarkerDetector};

#[cfg(feature = "tracing")]
use aruco_nano::core::init_tracing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(false);

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("Usage: detect_markers <image_path> [annotated_out.png]");
        return Ok(());
    };

    let img = detect::load_image(&path)?;
    let markers = detect::detect_markers(&img, &MarkerDetector::default());
    println!("detected {} markers", markers.len());

    // Rough guess for an uncalibrated camera: f = image width, centered principal point.
    let (w, h) = (img.width() as f64, img.height() as f64);
    let camera = CameraModel::pinhole(w, w, 0.5 * (w - 1.0), 0.5 * (h - 1.0));
    for m in &markers {
        match m.estimate_pose_default(&camera) {
            Ok(pose) => println!(
                "id {:3}: distance {:.2} marker sides, rms {:.2}px",
                m.id,
                pose.tvec.norm(),
                pose.reproj_rms
            ),
            Err(e) => println!("id {:3}: no pose ({e})", m.id),
        }
    }

    if let Some(out) = args.next() {
        let mut canvas = img.to_rgb8();
        draw_markers(&mut canvas, &markers, RED);
        canvas.save(&out)?;
        println!("annotated image written to {out}");
    }

    Ok(())
}
