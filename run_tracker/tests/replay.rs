use std::time::Duration;

use run_tracker::{
    gpx_util::read_gpx,
    location::{pump, GpxReplay},
    Configuration, TrackerService,
};
use run_tracker_lib::{geo_util::path_length, Position, SessionState};

const TRACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="run_tracker" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Harbour</name>
    <trkseg>
      <trkpt lat="56.1500" lon="10.2000"><time>2024-05-01T06:00:00Z</time></trkpt>
      <trkpt lat="56.1505" lon="10.2000"><time>2024-05-01T06:00:20Z</time></trkpt>
      <trkpt lat="56.1510" lon="10.2000"><time>2024-05-01T06:00:40Z</time></trkpt>
      <trkpt lat="56.1510" lon="10.2010"><time>2024-05-01T06:01:00Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

#[tokio::test(start_paused = true)]
async fn replayed_track_produces_distance_time_and_speed() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("harbour.gpx");
    std::fs::write(&file, TRACK).unwrap();

    let config = Configuration::parse("replay_speedup = 2\ntick_period_ms = 100\n").unwrap();
    let track = read_gpx(&file).unwrap();
    assert_eq!(track.title, "Harbour");

    let (handle, task) = TrackerService::spawn(config.tracker.clone()).unwrap();
    let mut provider = GpxReplay::new(track.points, config.replay_interval, config.replay_speedup).unwrap();

    handle.start().await.unwrap();
    assert_eq!(pump(&mut provider, &handle).await.unwrap(), 4);

    // 60 recorded seconds at 2x speed, then run into the 31st second.
    tokio::time::sleep(Duration::from_millis(1050)).await;
    let snapshot = handle.snapshot().await.unwrap();

    let path = vec![
        Position::new(56.15, 10.2),
        Position::new(56.1505, 10.2),
        Position::new(56.151, 10.2),
        Position::new(56.151, 10.201),
    ];
    assert_eq!(snapshot.state, SessionState::Active);
    assert_eq!(snapshot.path, path);
    assert!((snapshot.total_distance_meters - path_length(&path)).abs() < 1e-9);
    assert_eq!(snapshot.elapsed.whole_seconds(), 31);
    assert_eq!(snapshot.distance_whole_meters(), snapshot.total_distance_meters as u64);
    let expected_speed = snapshot.total_distance_meters / 31.;
    assert!((snapshot.average_speed_mps - expected_speed).abs() < 1e-9);

    handle.reset().await.unwrap();
    let cleared = handle.snapshot().await.unwrap();
    assert_eq!(cleared.state, SessionState::Idle);
    assert!(cleared.path.is_empty());
    assert_eq!(cleared.total_distance_meters, 0.);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}
