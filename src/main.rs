use lot_guard::{AnalyzerConfig, BoxRect, CountingLine, Detection, FrameAnalyzer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AnalyzerConfig {
        counting_line: Some(CountingLine::horizontal_midline(1280, 720)),
        ..AnalyzerConfig::default()
    };
    let mut analyzer = FrameAnalyzer::new(config)?;

    // a car drives down through the midline while a truck stands half in a lot
    for frame_index in 795..805 {
        let step = (frame_index - 795) as i32;
        let detections = vec![
            Detection::new(BoxRect::new(200, 250 + 15 * step, 220, 180), "car", 0.9),
            Detection::new(BoxRect::new(700, 150, 600, 400), "truck", 0.8),
            Detection::new(BoxRect::new(40, 600, 30, 80), "person", 0.7),
        ];
        let report = analyzer.process_frame(frame_index, &detections);
        println!("{}", serde_json::to_string(&report)?);
    }

    println!("vehicles seen: {}", analyzer.vehicle_count());
    Ok(())
}
