//! Crossing resolution at the intersection

use crossroads_sim::simulation::{
    Clearance, Direction, Intersection, IntersectionConfig, LeftTurnRule, LightState, PolicyKind,
    Queues, TurnType, Vehicle, VehicleId, VehicleState,
};

use Direction::{East, North, South, West};

fn vehicle(id: &str, origin: Direction, destination: Direction) -> Vehicle {
    Vehicle::new(id, origin, destination).expect("valid trip")
}

fn queues(vehicles: Vec<Vehicle>) -> Queues {
    let mut queues = Queues::new();
    for v in vehicles {
        queues.push(v);
    }
    queues
}

/// Run one tick the way the engine does and return the departed IDs
fn tick(intersection: &mut Intersection, queues: &mut Queues) -> Vec<String> {
    intersection.update(queues);
    let mut departed: Vec<VehicleId> = Vec::new();
    let mut completed = Vec::new();
    intersection.process_vehicles(queues, &mut departed, &mut completed);
    departed.into_iter().map(|id| id.0).collect()
}

#[test]
fn test_turn_classification() {
    assert_eq!(TurnType::between(North, South), Some(TurnType::Straight));
    assert_eq!(TurnType::between(North, East), Some(TurnType::Left));
    assert_eq!(TurnType::between(North, West), Some(TurnType::Right));
    assert_eq!(TurnType::between(North, North), None);
}

#[test]
fn test_turn_classification_all_pairs() {
    for origin in Direction::ALL {
        assert_eq!(TurnType::between(origin, origin.clockwise()), Some(TurnType::Left));
        assert_eq!(TurnType::between(origin, origin.opposite()), Some(TurnType::Straight));
        assert_eq!(
            TurnType::between(origin, origin.opposite().clockwise()),
            Some(TurnType::Right)
        );
    }
}

#[test]
fn test_vehicle_lifecycle() {
    let mut v = vehicle("V1", North, South);
    assert_eq!(v.state(), VehicleState::Waiting);

    v.advance();
    v.advance();
    assert_eq!(v.waited_ticks(), 2);

    v.begin_crossing();
    assert_eq!(v.state(), VehicleState::Crossing);
    v.begin_crossing();
    assert_eq!(v.state(), VehicleState::Crossing);

    v.advance();
    assert_eq!(v.waited_ticks(), 2, "only waiting vehicles age");

    v.complete();
    assert_eq!(v.state(), VehicleState::Completed);
    v.begin_crossing();
    assert_eq!(v.state(), VehicleState::Completed);
}

#[test]
fn test_vehicle_rejects_u_turn() {
    assert!(Vehicle::new("V1", East, East).is_err());
}

#[test]
fn test_direction_parsing_is_case_insensitive() {
    assert_eq!("NORTH".parse::<Direction>().unwrap(), North);
    assert_eq!("West".parse::<Direction>().unwrap(), West);
    assert!("up".parse::<Direction>().is_err());
}

#[test]
fn test_only_green_direction_is_cleared() {
    let mut intersection = Intersection::default();
    let mut queues = queues(vec![
        vehicle("N1", North, South),
        vehicle("E1", East, West),
        vehicle("S1", South, North),
        vehicle("W1", West, East),
    ]);

    intersection.update(&queues);
    assert_eq!(intersection.resolve_crossings(&queues), vec![North]);
    assert_eq!(tick(&mut intersection, &mut queues), vec!["N1"]);
    assert_eq!(queues.total(), 3);
}

#[test]
fn test_one_vehicle_per_direction_per_tick() {
    let mut intersection = Intersection::default();
    let mut queues = queues(vec![
        vehicle("N1", North, South),
        vehicle("N2", North, South),
        vehicle("N3", North, South),
    ]);

    assert_eq!(tick(&mut intersection, &mut queues), vec!["N1"]);
    assert_eq!(queues.len(North), 2);
    assert_eq!(tick(&mut intersection, &mut queues), vec!["N2"]);
}

#[test]
fn test_yellow_is_a_grace_period_by_default() {
    let mut intersection = Intersection::default();
    let mut queues = queues((1..=6).map(|i| vehicle(&format!("N{}", i), North, South)).collect());

    let departed: usize = (0..5).map(|_| tick(&mut intersection, &mut queues).len()).sum();
    // Ticks 1-3 green, tick 4 yellow, tick 5 red
    assert_eq!(departed, 4);
}

#[test]
fn test_yellow_crossing_can_be_disabled() {
    let config = IntersectionConfig {
        yellow_crossing: false,
        ..IntersectionConfig::default()
    };
    let mut intersection = Intersection::new(PolicyKind::FixedRotation, config);
    let mut queues = queues((1..=6).map(|i| vehicle(&format!("N{}", i), North, South)).collect());

    let departed: usize = (0..5).map(|_| tick(&mut intersection, &mut queues).len()).sum();
    assert_eq!(departed, 3);
}

#[test]
fn test_paired_axis_discharges_both_members() {
    let mut intersection = Intersection::new(PolicyKind::PairedAxis, IntersectionConfig::default());
    let mut queues = queues(vec![
        vehicle("N1", North, South),
        vehicle("N2", North, South),
        vehicle("S1", South, North),
        vehicle("S2", South, North),
        vehicle("E1", East, West),
    ]);

    assert_eq!(tick(&mut intersection, &mut queues), vec!["N1", "S1"]);
    assert_eq!(tick(&mut intersection, &mut queues), vec!["N2", "S2"]);
    assert_eq!(queues.len(East), 1);
}

#[test]
fn test_left_turn_with_empty_opposing_queue_goes_first_tick() {
    let mut intersection = Intersection::new(PolicyKind::PairedAxis, IntersectionConfig::default());
    let mut queues = queues(vec![vehicle("L1", North, East)]);

    assert_eq!(tick(&mut intersection, &mut queues), vec!["L1"]);
}

#[test]
fn test_left_turn_yields_to_oncoming_straight_traffic() {
    let mut intersection = Intersection::new(PolicyKind::PairedAxis, IntersectionConfig::default());
    let mut queues = queues(vec![vehicle("L1", North, East), vehicle("S1", South, North)]);

    assert_eq!(tick(&mut intersection, &mut queues), vec!["S1"]);
    assert_eq!(tick(&mut intersection, &mut queues), vec!["L1"]);
}

#[test]
fn test_opposing_left_turns_go_together() {
    let mut intersection = Intersection::new(PolicyKind::PairedAxis, IntersectionConfig::default());
    let mut queues = queues(vec![vehicle("NL", North, East), vehicle("SL", South, West)]);

    assert_eq!(tick(&mut intersection, &mut queues), vec!["NL", "SL"]);
}

#[test]
fn test_left_turn_goes_at_end_of_phase() {
    let mut intersection = Intersection::new(PolicyKind::PairedAxis, IntersectionConfig::default());
    let mut vehicles = vec![vehicle("L1", North, East)];
    vehicles.extend((1..=5).map(|i| vehicle(&format!("S{}", i), South, North)));
    let mut queues = queues(vehicles);

    assert_eq!(tick(&mut intersection, &mut queues), vec!["S1"]);
    assert_eq!(tick(&mut intersection, &mut queues), vec!["S2"]);
    assert_eq!(tick(&mut intersection, &mut queues), vec!["S3"]);

    // Axis turns yellow: straight traffic stops, the waiting left turn clears
    assert_eq!(tick(&mut intersection, &mut queues), vec!["L1"]);
    assert_eq!(intersection.light_state(North), LightState::Yellow);
    assert_eq!(queues.len(South), 2);
}

#[test]
fn test_left_turn_window_extends_end_of_phase() {
    let config = IntersectionConfig {
        left_turn_window: 1,
        ..IntersectionConfig::default()
    };
    let mut intersection = Intersection::new(PolicyKind::PairedAxis, config);
    let mut vehicles = vec![vehicle("L1", North, East)];
    vehicles.extend((1..=5).map(|i| vehicle(&format!("S{}", i), South, North)));
    let mut queues = queues(vehicles);

    intersection.update(&queues);
    intersection.update(&queues);
    assert_eq!(
        intersection.policy().clearance(intersection.signals(), &queues, North),
        Clearance::Blocked
    );

    intersection.update(&queues);
    assert_eq!(intersection.signal(North).remaining_ticks(), 1);
    assert_eq!(
        intersection.policy().clearance(intersection.signals(), &queues, North),
        Clearance::UnprotectedLeft
    );
    // Oncoming straight traffic still has the right-of-way
    assert_eq!(intersection.resolve_crossings(&queues), vec![South]);
}

#[test]
fn test_yellow_only_rule_holds_left_turns_until_yellow() {
    let config = IntersectionConfig {
        left_turn: LeftTurnRule::YellowOnly,
        ..IntersectionConfig::default()
    };
    let mut intersection = Intersection::new(PolicyKind::PairedAxis, config);
    let mut queues = queues(vec![vehicle("L1", North, East)]);

    for _ in 0..3 {
        assert!(tick(&mut intersection, &mut queues).is_empty());
    }
    assert_eq!(tick(&mut intersection, &mut queues), vec!["L1"]);
}

#[test]
fn test_paired_straight_traffic_waits_on_yellow() {
    let mut intersection = Intersection::new(PolicyKind::PairedAxis, IntersectionConfig::default());
    let mut queues = queues((1..=6).map(|i| vehicle(&format!("N{}", i), North, South)).collect());

    let departed: usize = (0..5).map(|_| tick(&mut intersection, &mut queues).len()).sum();
    assert_eq!(departed, 3);
}

#[test]
fn test_set_policy_same_kind_is_noop() {
    let mut intersection = Intersection::default();
    let empty = Queues::new();
    intersection.update(&empty);
    intersection.update(&empty);

    assert!(!intersection.set_policy(PolicyKind::FixedRotation));
    assert_eq!(intersection.signal(North).remaining_ticks(), 2);
}

#[test]
fn test_set_policy_reinitialises_phase() {
    let mut intersection = Intersection::default();
    let empty = Queues::new();
    for _ in 0..7 {
        intersection.update(&empty);
    }
    assert_eq!(intersection.current_green_direction(), Some(East));

    assert!(intersection.set_policy(PolicyKind::PairedAxis));
    assert_eq!(intersection.policy_kind(), PolicyKind::PairedAxis);
    assert_eq!(intersection.light_state(North), LightState::Green);
    assert_eq!(intersection.light_state(South), LightState::Green);
    assert_eq!(intersection.light_state(East), LightState::Red);
    assert_eq!(intersection.signal(North).remaining_ticks(), 4);
}

#[test]
fn test_partial_config_file_keeps_defaults() {
    let config: IntersectionConfig =
        serde_json::from_str(r#"{"timings": {"green": 2}, "left_turn": "yellow_only"}"#).unwrap();

    assert_eq!(config.timings.green, 2);
    assert_eq!(config.timings.yellow, 1);
    assert_eq!(config.timings.cycle_length(), 4);
    assert_eq!(config.left_turn, LeftTurnRule::YellowOnly);
    assert_eq!(config.priority_threshold, 3);
    assert!(config.yellow_crossing);
}

#[test]
fn test_left_turn_rule_parsing() {
    assert_eq!("opposing".parse::<LeftTurnRule>().unwrap(), LeftTurnRule::OpposingQueue);
    assert_eq!("Yellow_Only".parse::<LeftTurnRule>().unwrap(), LeftTurnRule::YellowOnly);
    assert!("protected".parse::<LeftTurnRule>().is_err());
}
