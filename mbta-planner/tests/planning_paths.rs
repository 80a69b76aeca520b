use mbta_planner::{
    AlternateCongestion, ConfidenceLevel, CongestionConfig, CongestionLevel, CongestionSegment,
    CongestionState, CrowdingConfig, CrowdingLevel, EmbeddedNetwork, PlannerEngine, RngBundle,
    Scenario, TrainConfig, TransitNetwork, apply_scenario, build_alternates, build_ranked_options,
    classify, classify_draw, fold_scenario, generate_congestion, generate_positions, primary_path,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn network() -> &'static TransitNetwork {
    TransitNetwork::default_network()
}

#[test]
fn classify_matches_buffer_bands() {
    assert_eq!(classify(1), ConfidenceLevel::Risky);
    assert_eq!(classify(5), ConfidenceLevel::Likely);
    assert_eq!(classify(0), ConfidenceLevel::Unlikely);
    assert_eq!(classify(-10), ConfidenceLevel::Unlikely);
}

#[test]
fn draw_classification_depends_only_on_its_own_rolls() {
    let cfg = CongestionConfig::default();
    let mut rng = ChaCha20Rng::seed_from_u64(0x5EED);
    for _ in 0..500 {
        let level_roll: f64 = rng.r#gen();
        let delay_roll: f64 = rng.r#gen();
        let noise: f64 = rng.r#gen();
        let first = classify_draw(&cfg, level_roll, delay_roll);
        let _ = classify_draw(&cfg, noise, noise);
        assert_eq!(classify_draw(&cfg, level_roll, delay_roll), first);
        match first {
            None => assert!(level_roll <= 0.70),
            Some((CongestionLevel::Moderate, delay)) => {
                assert!(level_roll > 0.70 && level_roll <= 0.85);
                assert!((2..=6).contains(&delay));
            }
            Some((CongestionLevel::Severe, delay)) => {
                assert!(level_roll > 0.85);
                assert!((5..=14).contains(&delay));
            }
            Some((CongestionLevel::Normal, _)) => panic!("normal is never materialized"),
        }
    }
}

#[test]
fn generated_congestion_is_sparse() {
    let cfg = CongestionConfig::default();
    let mut rng = ChaCha20Rng::seed_from_u64(17);
    let mut congested_draws = 0;
    for _ in 0..100 {
        let state = generate_congestion(network(), &cfg, &mut rng);
        assert!(state.iter().all(|s| s.level != CongestionLevel::Normal));
        congested_draws += state.len();
    }
    // Roughly 30% of 5400 segment draws come up congested.
    assert!(congested_draws > 1000 && congested_draws < 2300, "{congested_draws}");
}

#[test]
fn heavy_crowding_red_segment_folds_to_21() {
    let baseline = CongestionState::from_segments([CongestionSegment::new(
        "red-north",
        "alewife",
        CongestionLevel::Moderate,
        4,
    )]);
    let scenario = Scenario {
        red_line_delay: 10,
        crowding: CrowdingLevel::Heavy,
        ..Scenario::default()
    };
    let folded = apply_scenario(&baseline, &scenario, &CrowdingConfig::default());
    assert_eq!(folded.delay_between("red-north", "alewife"), 21);
    assert_eq!(
        folded.level_between("red-north", "alewife"),
        CongestionLevel::Moderate
    );
}

#[test]
fn light_crowding_halves_without_line_delays() {
    let scenario = Scenario {
        crowding: CrowdingLevel::Light,
        ..Scenario::default()
    };
    let mut baseline_rng = ChaCha20Rng::seed_from_u64(404);
    let mut fold_rng = ChaCha20Rng::seed_from_u64(404);
    let baseline = generate_congestion(network(), &CongestionConfig::default(), &mut baseline_rng);
    let folded = fold_scenario(
        network(),
        &scenario,
        &mbta_planner::PlannerConfig::default_config(),
        &mut fold_rng,
    );
    assert_eq!(baseline.len(), folded.len());
    for (before, after) in baseline.iter().zip(folded.iter()) {
        let expected = (f64::from(before.delay) * 0.5).round();
        assert!((f64::from(after.delay) - expected).abs() < f64::EPSILON);
        assert_eq!(before.level, after.level);
        assert_eq!(before.from_station, after.from_station);
    }
}

#[test]
fn primary_path_is_symmetric_on_one_route() {
    let n = network();
    let orange = n.route("orange").unwrap();
    let a = n.station("wellington").unwrap();
    let b = n.station("back-bay").unwrap();
    let forward = primary_path(n, a, b);
    let backward = primary_path(n, b, a);
    assert_eq!(forward, backward);
    let i = orange.position_of("wellington").unwrap();
    let j = orange.position_of("back-bay").unwrap();
    assert_eq!(forward, orange.coordinates[i.min(j)..=i.max(j)].to_vec());

    let cross = primary_path(n, a, n.station("kenmore").unwrap());
    assert_eq!(cross.len(), 2);
}

#[test]
fn alternates_follow_congestion_and_red_endpoints() {
    let n = network();
    let red = n.station("alewife").unwrap();
    let blue = n.station("airport").unwrap();
    let green = n.station("copley").unwrap();
    let quiet = CongestionState::empty();
    let busy = CongestionState::from_segments([CongestionSegment::new(
        "airport",
        "maverick",
        CongestionLevel::Severe,
        8,
    )]);

    assert!(build_alternates(red, blue, &quiet).is_empty());

    let with_red = build_alternates(blue, red, &busy);
    assert_eq!(with_red.len(), 2);
    assert_eq!(with_red[0].congestion, AlternateCongestion::Low);
    assert_eq!(with_red[0].savings, 5);
    assert_eq!(with_red[1].label, "Bus + Subway");

    let without_red = build_alternates(blue, green, &busy);
    assert_eq!(without_red.len(), 1);
    assert_eq!(without_red[0].color, "#14B8A6");
}

#[test]
fn ranked_options_cover_all_bands() {
    let n = network();
    let mut rng = ChaCha20Rng::seed_from_u64(9);
    for _ in 0..25 {
        let options = build_ranked_options(
            n.station("copley").unwrap(),
            n.station("haymarket").unwrap(),
            &mut rng,
        );
        assert_eq!(options.len(), 3);
        let bands: Vec<(i32, ConfidenceLevel)> =
            options.iter().map(|o| (o.buffer, o.confidence)).collect();
        assert_eq!(
            bands,
            vec![
                (7, ConfidenceLevel::Likely),
                (3, ConfidenceLevel::Risky),
                (0, ConfidenceLevel::Unlikely),
            ]
        );
        let base = options[0].duration;
        assert!((10..=24).contains(&base));
        assert_eq!(
            options.iter().map(|o| o.duration).collect::<Vec<_>>(),
            vec![base, base + 6, base + 10]
        );
        assert!(options.iter().all(|o| (o.fare - 2.4).abs() < f64::EPSILON));
    }
}

#[test]
fn harvard_to_kendall_end_to_end() {
    let engine = PlannerEngine::new(EmbeddedNetwork);
    let mut session = engine.create_session(2024).unwrap();
    session.with_state_mut(|state| {
        state.congestion = CongestionState::from_segments([CongestionSegment::new(
            "central",
            "kendall",
            CongestionLevel::Severe,
            11,
        )]);
    });
    let plan = session.plan_trip("harvard", "kendall").unwrap().clone();

    let red = session.network().route("red").unwrap();
    assert_eq!(plan.path, red.coordinates[3..=5].to_vec());
    assert_eq!(plan.alternates.len(), 2);
    assert_eq!(plan.alternates[0].label, "Via Orange Line");
    assert_eq!(plan.options.len(), 3);
    assert_eq!(plan.options[0].route[0].from, "Harvard");
    assert_eq!(plan.options[0].route[0].to, "Park Street");
    assert_eq!(plan.options[0].route[1].to, "Kendall/MIT");
    assert_eq!(session.state().selected_option, Some(0));

    let panel = session.alternate_panel();
    assert_eq!(panel.len(), 2);
    assert_eq!(panel[1].id, "alt-1");
}

#[test]
fn seeded_bundles_reproduce_every_stream() {
    let a = RngBundle::from_user_seed(0xC0FFEE);
    let b = RngBundle::from_user_seed(0xC0FFEE);
    let cfg = CongestionConfig::default();
    let trains = TrainConfig::default();

    let ca = generate_congestion(network(), &cfg, &mut *a.congestion());
    let cb = generate_congestion(network(), &cfg, &mut *b.congestion());
    assert_eq!(ca, cb);

    let ta = generate_positions(network(), &trains, &mut *a.trains());
    let tb = generate_positions(network(), &trains, &mut *b.trains());
    assert_eq!(ta, tb);

    let origin = network().station("davis").unwrap();
    let destination = network().station("south-station").unwrap();
    let oa = build_ranked_options(origin, destination, &mut *a.itinerary());
    let ob = build_ranked_options(origin, destination, &mut *b.itinerary());
    assert_eq!(oa, ob);
    assert!(a.congestion().draws() > 0);
}

#[test]
fn sessions_with_same_seed_agree_after_time_passes() {
    let engine = PlannerEngine::new(EmbeddedNetwork);
    let mut a = engine.create_session(31).unwrap();
    let mut b = engine.create_session(31).unwrap();
    a.advance(45);
    b.advance(20);
    b.advance(25);
    assert_eq!(a.state().congestion, b.state().congestion);
    assert_eq!(a.state().trains, b.state().trains);
}
