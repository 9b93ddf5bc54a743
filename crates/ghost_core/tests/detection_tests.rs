//! End-to-end detection scenarios driven through the analyzer.

use std::collections::HashMap;

use ghost_core::aggregates::PositionKey;
use ghost_core::analysis::{analyze_stream, Analyzer};
use ghost_core::config::DetectionConfig;
use ghost_core::decoder::DecoderRegistry;
use ghost_core::error::DecodeError;
use ghost_core::math::{Vec3, ViewAngles};
use ghost_core::recording::RecordingWriter;
use ghost_core::snapshot::{StreamEvent, Team};
use ghost_test_utils::fixtures::{account, player, spectator, MatchScript, ScriptedDecoder};
use ghost_test_utils::strategies::arb_camera_path;
use proptest::prelude::*;

const CAMP: Vec3 = Vec3::new(-1200.0, 640.5, 96.0);
const ELSEWHERE: Vec3 = Vec3::new(300.0, 300.0, 0.0);

#[test]
fn fifty_static_ticks_produce_one_finding() {
    let mut decoder = MatchScript::new()
        .with_participant(spectator(1, "camper", CAMP))
        .with_participant(player(2, "anchor", Team::CounterTerrorist, ELSEWHERE, ViewAngles::new(0.0, 0.0)))
        .round_start()
        .ticks(50)
        .round_end()
        .decoder();

    let config = DetectionConfig::default().with_static_threshold(40);
    let outcome = analyze_stream(&mut decoder, "camp.gwr", &config).unwrap();

    assert_eq!(outcome.report.static_findings.len(), 1);
    let record = &outcome.report.static_findings[0].record;
    assert_eq!(record.count, 50);
    assert_eq!(record.spectator, "camper");
    assert_eq!(record.account_id, account(1));
    assert!(outcome.report.follow_findings.is_empty());
}

#[test]
fn mismatched_follow_records_one_event() {
    let script = MatchScript::new()
        .with_participant(spectator(1, "ghost", CAMP).looking(ViewAngles::new(95.0, 0.0)))
        .with_participant(player(2, "lurker", Team::Terrorist, CAMP, ViewAngles::new(90.0, 0.0)))
        .round_start()
        .ticks(1);

    let mut analyzer = Analyzer::new(DetectionConfig::default()).unwrap();
    for event in script.build() {
        analyzer.handle(event);
    }

    let events = analyzer.aggregates().follows.for_spectator(account(1));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].horizontal_delta, 5.0);
    assert_eq!(events[0].vertical_delta, 0.0);
    assert!(analyzer.aggregates().statics.is_empty());
}

#[test]
fn aligned_follow_touches_no_aggregate() {
    let script = MatchScript::new()
        .with_participant(spectator(1, "viewer", CAMP).looking(ViewAngles::new(90.5, 0.5)))
        .with_participant(player(2, "lurker", Team::Terrorist, CAMP, ViewAngles::new(90.0, 0.0)))
        .round_start()
        .ticks(1);

    let mut analyzer = Analyzer::new(DetectionConfig::default()).unwrap();
    for event in script.build() {
        analyzer.handle(event);
    }

    assert!(analyzer.aggregates().follows.is_empty());
    assert!(analyzer.aggregates().statics.is_empty());
}

#[test]
fn follow_round_flag_uses_score_derived_round() {
    let mut decoder = MatchScript::new()
        .with_participant(spectator(1, "ghost", CAMP).looking(ViewAngles::new(200.0, 15.0)))
        .with_participant(player(2, "lurker", Team::Terrorist, CAMP, ViewAngles::new(180.0, 0.0)))
        .score(4, 3)
        .round_start()
        .ticks(201)
        .round_end()
        .decoder();

    let outcome = analyze_stream(&mut decoder, "ghost.gwr", &DetectionConfig::default()).unwrap();

    assert_eq!(outcome.report.follow_findings.len(), 1);
    let finding = &outcome.report.follow_findings[0];
    assert_eq!(finding.round, 8);
    assert_eq!(finding.flagged_events, 201);
    assert_eq!(finding.spectator, "ghost");
    assert!(outcome.report.render().contains("in round 8"));
}

#[test]
fn small_mismatches_do_not_reach_round_flag() {
    // 5 degrees apart: recorded as follow events but below the angle sum.
    let mut decoder = MatchScript::new()
        .with_participant(spectator(1, "ghost", CAMP).looking(ViewAngles::new(5.0, 0.0)))
        .with_participant(player(2, "lurker", Team::Terrorist, CAMP, ViewAngles::new(0.0, 0.0)))
        .round_start()
        .ticks(300)
        .decoder();

    let outcome = analyze_stream(&mut decoder, "x", &DetectionConfig::default()).unwrap();
    assert_eq!(outcome.stats.follow_events, 300);
    assert!(outcome.report.is_clean());
}

#[test]
fn roster_reset_keeps_only_current_round_joiners() {
    let events = MatchScript::new()
        .with_participant(spectator(1, "regular", CAMP))
        .round_start()
        .ticks(2)
        .join(spectator(2, "old_late", CAMP))
        .ticks(2)
        .round_end()
        .disconnect(2)
        .ticks(1)
        .round_start()
        .join(spectator(3, "new_late", ELSEWHERE))
        .ticks(3)
        .build();

    let mut analyzer = Analyzer::new(DetectionConfig::default()).unwrap();
    for event in events {
        analyzer.handle(event);
    }

    let names: Vec<_> = analyzer
        .roster()
        .entries()
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["regular", "new_late"]);

    let statics = &analyzer.aggregates().statics;
    let camp = PositionKey::new(CAMP, 0, 0);
    assert_eq!(statics.get(account(1), camp).unwrap().count, 7);
    assert_eq!(statics.get(account(2), camp).unwrap().count, 2);
    assert_eq!(
        statics
            .get(account(3), PositionKey::new(ELSEWHERE, 0, 0))
            .unwrap()
            .count,
        3
    );
}

#[test]
fn spectator_joining_between_ticks_and_round_start_is_classified() {
    let mut decoder = MatchScript::new()
        .with_participant(player(2, "anchor", Team::CounterTerrorist, ELSEWHERE, ViewAngles::new(0.0, 0.0)))
        .ticks(1)
        .join(spectator(1, "early", CAMP))
        .round_start()
        .ticks(4)
        .round_end()
        .decoder();

    let config = DetectionConfig::default().with_static_threshold(3);
    let outcome = analyze_stream(&mut decoder, "early.gwr", &config).unwrap();

    assert_eq!(outcome.stats.static_hits, 4);
    assert_eq!(outcome.report.static_findings.len(), 1);
    assert_eq!(outcome.report.static_findings[0].record.spectator, "early");
}

#[test]
fn disconnected_roster_entry_is_skipped() {
    let events = MatchScript::new()
        .with_participant(spectator(1, "leaver", CAMP))
        .round_start()
        .ticks(2)
        .disconnect(1)
        .ticks(5)
        .build();

    let mut analyzer = Analyzer::new(DetectionConfig::default()).unwrap();
    for event in events {
        analyzer.handle(event);
    }
    assert_eq!(analyzer.stats().spectators_skipped, 5);
    assert_eq!(analyzer.stats().static_hits, 2);
}

#[test]
fn recoverable_errors_do_not_stop_stream() {
    let mut decoder = MatchScript::new()
        .with_participant(spectator(1, "camper", CAMP))
        .round_start()
        .ticks(2)
        .decoder();
    decoder.push_error(DecodeError::CorruptFrame {
        offset: 99,
        message: "bad variant".into(),
    });
    decoder.push_event(StreamEvent::RoundEnded);

    let outcome = analyze_stream(&mut decoder, "x", &DetectionConfig::default()).unwrap();
    assert_eq!(outcome.stats.decode_errors, 1);
    assert_eq!(outcome.stats.static_hits, 2);
    assert!(outcome.aborted.is_none());
}

#[test]
fn fatal_error_ends_stream_with_partial_report() {
    let mut decoder = ScriptedDecoder::from_events(
        MatchScript::new()
            .with_participant(spectator(1, "camper", CAMP))
            .round_start()
            .ticks(3)
            .build(),
    );
    decoder.push_error(DecodeError::Truncated { offset: 512 });
    decoder.push_event(StreamEvent::RoundEnded);

    let config = DetectionConfig::default().with_static_threshold(2);
    let outcome = analyze_stream(&mut decoder, "x", &config).unwrap();

    assert!(outcome.aborted.as_deref().unwrap().contains("truncated"));
    assert_eq!(decoder.remaining(), 1);
    assert_eq!(outcome.report.static_findings[0].record.count, 3);
}

#[test]
fn binary_recording_through_registry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scrim.gwr");

    let file = std::fs::File::create(&path).unwrap();
    let mut writer = RecordingWriter::new(file, "scrim").unwrap();
    let events = MatchScript::new()
        .with_participant(spectator(1, "camper", CAMP))
        .round_start()
        .ticks(12)
        .round_end()
        .build();
    for event in &events {
        writer.write_event(event).unwrap();
    }
    writer.finish().unwrap();

    let registry = DecoderRegistry::with_defaults();
    let mut decoder = registry.open(&path).unwrap();
    let config = DetectionConfig::default().with_static_threshold(10);
    let outcome = analyze_stream(&mut decoder, path.display().to_string(), &config).unwrap();

    assert_eq!(outcome.report.static_findings.len(), 1);
    assert_eq!(outcome.report.static_findings[0].record.count, 12);
    assert_eq!(outcome.report.static_findings[0].record.first_tick, 1);
    assert_eq!(outcome.report.static_findings[0].record.last_tick, 12);
}

#[test]
fn extreme_scores_from_json_lines_do_not_panic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("damaged.gwj");

    let events = MatchScript::new()
        .with_participant(spectator(1, "ghost", CAMP).looking(ViewAngles::new(200.0, 15.0)))
        .with_participant(player(2, "lurker", Team::Terrorist, CAMP, ViewAngles::new(180.0, 0.0)))
        .score(u32::MAX, 3)
        .round_start()
        .ticks(3)
        .build();
    let mut bytes = Vec::new();
    for (i, event) in events.iter().enumerate() {
        bytes.extend_from_slice(serde_json::to_string(event).unwrap().as_bytes());
        bytes.push(b'\n');
        if i == 1 {
            bytes.extend_from_slice(b"\xc3\x28 not utf8\n");
        }
    }
    std::fs::write(&path, bytes).unwrap();

    let mut decoder = DecoderRegistry::with_defaults().open(&path).unwrap();
    let config = DetectionConfig::default().with_follow_thresholds(30.0, 2);
    let outcome = analyze_stream(&mut decoder, "damaged.gwj", &config).unwrap();

    assert!(outcome.aborted.is_none());
    assert_eq!(outcome.stats.decode_errors, 1);
    assert_eq!(outcome.report.follow_findings.len(), 1);
    assert_eq!(outcome.report.follow_findings[0].round, u32::MAX);
    assert_eq!(outcome.report.follow_findings[0].flagged_events, 3);
}

proptest! {
    /// Each static record counts exactly the sampled ticks spent at its key.
    #[test]
    fn prop_static_counts_match_occurrences(path in arb_camera_path(120)) {
        let mut analyzer = Analyzer::new(DetectionConfig::default()).unwrap();
        let mut script = MatchScript::new()
            .with_participant(spectator(1, "camper", Vec3::ZERO))
            .round_start();
        let mut expected: HashMap<PositionKey, u32> = HashMap::new();

        for (position, t, ct) in &path {
            script = script
                .update(1, |p| p.position = *position)
                .score(*t, *ct)
                .ticks(1);
            *expected.entry(PositionKey::new(*position, *t, *ct)).or_insert(0) += 1;
        }
        for event in script.build() {
            analyzer.handle(event);
        }

        let statics = &analyzer.aggregates().statics;
        prop_assert_eq!(statics.len(), expected.len());
        for (key, count) in expected {
            prop_assert_eq!(statics.get(account(1), key).unwrap().count, count);
        }
    }
}
