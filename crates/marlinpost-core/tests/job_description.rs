use marlinpost_core::{CuttingMode, JobEvent, Plane, SectionKind, ToolType};

const JOB: &str = r#"[
    {"event": "open_job", "program_name": "1001", "program_comment": "sign",
     "tools": [{"number": 1, "name": "laser", "tool_type": "laser_cutter", "diameter": 0.2}]},
    {"event": "parameter", "key": "generated-at", "value": "2026-01-01 10:00"},
    {"event": "open_section", "kind": "jet", "cutting_mode": "etch", "comment": "Outline",
     "tool": {"number": 1, "name": "laser", "tool_type": "laser_cutter", "diameter": 0.2},
     "bounds": {"min": {"x": 0.0, "y": 0.0, "z": 0.0}, "max": {"x": 50.0, "y": 20.0, "z": 0.0}}},
    {"event": "circular", "clockwise": false, "center": {"x": 0.0, "y": 5.0, "z": 0.0},
     "x": 0.0, "y": 10.0, "z": 0.0, "feed": 600.0, "plane": "zx"},
    {"event": "rapid5d", "x": 0.0, "y": 0.0, "z": 0.0, "a": 90.0, "b": 0.0, "c": 0.0},
    {"event": "close_section"},
    {"event": "close_job"}
]"#;

#[test]
fn test_parse_job_event_stream() {
    let events: Vec<JobEvent> = serde_json::from_str(JOB).unwrap();
    assert_eq!(events.len(), 7);

    match &events[0] {
        JobEvent::OpenJob(info) => {
            assert_eq!(info.program_name, "1001");
            assert_eq!(info.tools[0].tool_type, ToolType::LaserCutter);
        }
        other => panic!("expected open_job, got {:?}", other),
    }

    match &events[2] {
        JobEvent::OpenSection(section) => {
            assert_eq!(section.kind, SectionKind::Jet);
            assert_eq!(section.resolve_cutting_mode().unwrap(), CuttingMode::Etch);
            assert_eq!(section.work_offset, 0);
            assert_eq!(section.bounds.max.x, 50.0);
        }
        other => panic!("expected open_section, got {:?}", other),
    }

    match &events[3] {
        JobEvent::Circular { plane, clockwise, .. } => {
            assert_eq!(*plane, Plane::ZX);
            assert!(!clockwise);
        }
        other => panic!("expected circular, got {:?}", other),
    }

    assert!(matches!(events[4], JobEvent::Rapid5D { a, .. } if a == 90.0));
}

#[test]
fn test_unknown_event_is_rejected() {
    let result: Result<Vec<JobEvent>, _> =
        serde_json::from_str(r#"[{"event": "coolant", "on": true}]"#);
    assert!(result.is_err());
}
