use roadgen::blocks::BlockType;
use roadgen::config::GeneratorConfig;
use roadgen::generation::{Big, GenerateMethod, GenerateParameter, NextStep};
use roadgen::geometry::{rectangle, Point};
use roadgen::world::{CollisionWorld, PermissiveWorld, World, WorldContext};
use roadgen::RoadGenError;

use anyhow::Result;

fn config(seed: u64) -> GeneratorConfig {
    GeneratorConfig::default().with_seed(seed)
}

fn by_count(count: usize) -> (GenerateMethod, GenerateParameter) {
    (GenerateMethod::BlockNum, GenerateParameter::Count(count))
}

fn by_sequence(sequence: &str) -> (GenerateMethod, GenerateParameter) {
    (GenerateMethod::BlockSequence, GenerateParameter::Sequence(sequence.to_string()))
}

/// A world where nothing fits past the entry block's exit node at x = 60
fn walled_world() -> CollisionWorld {
    let mut world = CollisionWorld::new();
    world.add_forbidden_zone(rectangle(Point::new(61.5, -600.0), Point::new(600.0, 600.0)));
    world
}

fn entry_roads() -> Vec<(String, String)> {
    let mut roads: Vec<(String, String)> = [(">", ">>"), (">>", ">"), (">>", ">>>"), (">>>", ">>")]
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();
    roads.sort();
    roads
}

/// Test that two sessions with the same seed build the same network
#[test]
fn test_same_seed_same_network() -> Result<()> {
    for seed in [1, 42, 1010] {
        let mut first = Big::new(&config(seed), World::new_collision())?;
        let mut second = Big::new(&config(seed), World::new_collision())?;

        let (method, parameter) = by_count(6);
        let a = first.generate(method, parameter.clone());
        let b = second.generate(method, parameter);
        match (a, b) {
            (Ok(a), Ok(b)) => assert_eq!(a, b, "seed {} diverged", seed),
            (Err(a), Err(b)) => assert_eq!(a, b),
            (a, b) => panic!("seed {} gave {:?} and {:?}", seed, a.is_ok(), b.is_ok()),
        }
        assert_eq!(first.recipe(), second.recipe());
    }
    Ok(())
}

/// Test that different seeds build different networks
#[test]
fn test_different_seeds_differ() -> Result<()> {
    let mut first = Big::new(&config(3), PermissiveWorld::default())?;
    let mut second = Big::new(&config(4), PermissiveWorld::default())?;
    let (method, parameter) = by_count(5);
    first.generate(method, parameter.clone())?;
    second.generate(method, parameter)?;
    assert_ne!(first.network(), second.network());
    Ok(())
}

/// Test that a count run places exactly that many blocks or reports exhaustion
#[test]
fn test_block_count_is_exact_or_exhausted() -> Result<()> {
    for seed in 0..12 {
        let mut big = Big::new(&config(seed), World::new_collision())?;
        let (method, parameter) = by_count(8);
        match big.generate(method, parameter).map(|_| ()) {
            Ok(()) => {
                assert_eq!(big.blocks().len(), 9, "seed {}", seed);
                assert!(big.blocks().iter().all(|b| b.is_constructed()));
                assert_eq!(big.next_step(), NextStep::Forward);
            }
            Err(RoadGenError::SearchExhausted { target, .. }) => assert_eq!(target, 8),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Test that a world without collisions never needs a second trial
#[test]
fn test_permissive_world_always_reaches_target() -> Result<()> {
    let mut big = Big::new(&config(99), PermissiveWorld::default())?;
    let (method, parameter) = by_count(20);
    big.generate(method, parameter)?;
    assert_eq!(big.blocks().len(), 21);
    // No collisions, so nothing was ever retried
    assert!(big.blocks().iter().skip(1).all(|b| b.number_of_sample_trial() == 1));
    Ok(())
}

/// Test that no block is tried more than `max_trial` times
#[test]
fn test_trial_bound() -> Result<()> {
    for seed in 0..12 {
        let mut big = Big::new(&config(seed), CollisionWorld::new())?;
        let (method, parameter) = by_count(10);
        let _ = big.generate(method, parameter);
        for block in big.blocks() {
            assert!(
                block.number_of_sample_trial() <= 2,
                "seed {}: block {} tried {} times",
                seed,
                block.index(),
                block.number_of_sample_trial()
            );
            let trials: Vec<u32> = block.attempts().iter().map(|a| a.trial).collect();
            let expected: Vec<u32> = (0..trials.len() as u32).collect();
            assert_eq!(trials, expected);
        }
    }
    Ok(())
}

/// Test that every finished map is free of overlaps
#[test]
fn test_final_state_is_collision_free() -> Result<()> {
    let mut generated = 0;
    for seed in 0..12 {
        let mut big = Big::new(&config(seed), CollisionWorld::new())?;
        let (method, parameter) = by_count(8);
        if big.generate(method, parameter).is_err() {
            continue;
        }
        generated += 1;
        let world = big.world();
        assert!(world.validate_no_overlap(), "seed {} overlaps", seed);
        assert_eq!(world.body_count(), big.blocks().len());
        for block in big.blocks() {
            let construction = block.construction().expect("placed block");
            assert!(world.footprint(construction.body).is_some());
        }
    }
    assert!(generated > 0, "no seed produced a map");
    Ok(())
}

/// Test that a sequence run places exactly the named types in order
#[test]
fn test_sequence_fidelity() -> Result<()> {
    for seed in 0..8 {
        let mut big = Big::new(&config(seed), PermissiveWorld::default())?;
        let (method, parameter) = by_sequence("CS");
        big.generate(method, parameter)?;

        let types: Vec<BlockType> = big.blocks().iter().map(|b| b.block_type()).collect();
        assert_eq!(types, vec![BlockType::First, BlockType::Curve, BlockType::Straight]);
    }
    Ok(())
}

/// Test that a sequence naming every sampleable type places all of them and
/// wires their sockets and parking spaces into the network
#[test]
fn test_every_block_type_can_be_placed() -> Result<()> {
    let mut big = Big::new(&config(7), PermissiveWorld::default())?;
    let (method, parameter) = by_sequence("SCXTOrRyYP");
    big.generate(method, parameter)?;
    let codes: String = big.blocks().iter().skip(1).map(|b| b.block_type().code()).collect();
    assert_eq!(codes, "SCXTOrRyYP");

    // Every placed block left its sockets wired into the network
    for block in big.blocks() {
        assert_eq!(block.sockets().len(), block.block_type().socket_count());
        for socket in block.sockets() {
            assert!(big.network().get_road(&socket.positive).is_some());
            assert!(big.network().get_road(&socket.negative).is_some());
        }
    }

    let parking = big.blocks().last().expect("parking lot");
    assert_eq!(parking.block_type(), BlockType::ParkingLot);
    let spaces = parking.parking_spaces();
    assert!(spaces.len() >= 4 && spaces.len() <= 8 && spaces.len() % 2 == 0);
    for space in spaces {
        let lanes = big.network().get_road(space).expect("space in network");
        assert_eq!(lanes.len(), 1);
        // One-way: nothing comes back out of a space
        assert!(big.network().get_road(&space.reversed()).is_none());
    }
    let construction = parking.construction().expect("placed block");
    assert_eq!(construction.parking_spaces, spaces);
    assert!(big.blocks().iter().rev().skip(1).all(|b| b.parking_spaces().is_empty()));

    let space_count = spaces.len();

    let (network, world) = big.into_parts();
    assert_eq!(world.body_count(), 11);
    assert_eq!(spaces_of(&network).len(), space_count);
    Ok(())
}

fn spaces_of(network: &roadgen::RoadNetwork) -> Vec<(String, String)> {
    network
        .edge_keys()
        .into_iter()
        .filter(|(_, end)| end.contains("P2_") || end.contains("P3_"))
        .collect()
}

/// Test that seed 1010 builds the `CrTRXOS` sequence reproducibly
#[test]
fn test_scenario_1010_crtrxos() -> Result<()> {
    let run = || -> Result<_> {
        let mut big = Big::new(&config(1010), CollisionWorld::new())?;
        let (method, parameter) = by_sequence("CrTRXOS");
        big.generate(method, parameter)?;
        Ok(big)
    };
    let first = run()?;
    let second = run()?;

    assert_eq!(first.blocks().len(), 8);
    assert!(first.world().validate_no_overlap());
    let codes: String = first.blocks().iter().map(|b| b.block_type().code()).collect();
    assert_eq!(codes, "ICrTRXOS");
    assert_eq!(first.network().edge_keys(), second.network().edge_keys());
    Ok(())
}

/// Test that bad method and parameter combinations are rejected without spoiling the session
#[test]
fn test_mismatched_parameter_is_rejected() -> Result<()> {
    let mut big = Big::new(&config(5), PermissiveWorld::default())?;
    let err = big
        .generate(GenerateMethod::BlockNum, GenerateParameter::Sequence("CS".to_string()))
        .unwrap_err();
    assert!(matches!(err, RoadGenError::InvalidParameter(_)));

    let err = big
        .generate(GenerateMethod::BlockSequence, GenerateParameter::Count(3))
        .unwrap_err();
    assert!(matches!(err, RoadGenError::InvalidParameter(_)));

    let err = big.generate(GenerateMethod::BlockNum, GenerateParameter::Count(0)).unwrap_err();
    assert!(matches!(err, RoadGenError::InvalidParameter(_)));

    let err = big
        .generate(GenerateMethod::BlockSequence, GenerateParameter::Sequence("CQ".to_string()))
        .unwrap_err();
    assert!(matches!(err, RoadGenError::InvalidParameter(_)));

    // Rejected calls leave the session usable
    assert_eq!(big.blocks().len(), 1);
    let (method, parameter) = by_count(2);
    big.generate(method, parameter)?;
    assert_eq!(big.blocks().len(), 3);

    // A finished session does not generate twice
    let (method, parameter) = by_count(2);
    let err = big.generate(method, parameter).unwrap_err();
    assert!(matches!(err, RoadGenError::InvalidParameter(_)));
    Ok(())
}

/// Test that a search which backtracks all the way to the entry block fails
/// cleanly and leaves only the entry block in the network
#[test]
fn test_exhausted_at_entry_block() -> Result<()> {
    let mut big = Big::new(&config(8), walled_world())?;
    let (method, parameter) = by_count(3);
    let err = big.generate(method, parameter).unwrap_err();
    assert!(matches!(err, RoadGenError::SearchExhausted { placed: 0, target: 3 }));

    assert_eq!(big.blocks().len(), 1);
    assert_eq!(big.blocks()[0].block_type(), BlockType::First);
    let mut roads = big.network().edge_keys();
    roads.sort();
    assert_eq!(roads, entry_roads());
    // The forbidden zone and the entry block
    assert_eq!(big.world().body_count(), 2);
    assert!(big.world().validate_no_overlap());
    Ok(())
}

/// Test that a session refuses a second run after the first was exhausted
#[test]
fn test_no_second_run_after_exhaustion() -> Result<()> {
    let mut big = Big::new(&config(8), walled_world())?;
    let (method, parameter) = by_count(3);
    assert!(matches!(
        big.generate(method, parameter.clone()),
        Err(RoadGenError::SearchExhausted { .. })
    ));
    let steps = big.steps();

    let err = big.generate(method, parameter).unwrap_err();
    assert!(matches!(err, RoadGenError::InvalidParameter(_)));
    assert_eq!(big.steps(), steps);

    // Stepping by hand cannot pop the entry block either
    assert!(matches!(big.step(), Err(RoadGenError::SearchExhausted { .. })));
    assert_eq!(big.blocks().len(), 1);
    assert_eq!(big.network().bundle_count(), 4);
    assert_eq!(big.world().body_count(), 2);
    Ok(())
}

/// Test that `max_steps` stops the search with `SearchExhausted`
#[test]
fn test_step_budget_stops_the_search() -> Result<()> {
    let mut bounded = config(11);
    bounded.map.max_steps = 3;
    let mut big = Big::new(&bounded, PermissiveWorld::default())?;
    let (method, parameter) = by_count(10);
    let err = big.generate(method, parameter).unwrap_err();
    assert!(matches!(err, RoadGenError::SearchExhausted { placed: 3, target: 10 }));
    assert_eq!(big.steps(), 3);
    Ok(())
}

/// Test that digit strings parse as counts and anything else as a sequence
#[test]
fn test_parameter_parsing() {
    assert_eq!(GenerateParameter::parse("12"), GenerateParameter::Count(12));
    assert_eq!(
        GenerateParameter::parse("CrTRXOS"),
        GenerateParameter::Sequence("CrTRXOS".to_string())
    );
    assert_eq!(GenerateParameter::parse("7").method(), GenerateMethod::BlockNum);
}
