use std::cell::RefCell;
use std::rc::Rc;

use narwhal::{
    Collide, Error, Force, Link, LinkForce, ManyBody, Node, PositionX, RandomSource, Result,
    Simulation, SimulationOptions,
};

fn ring(n: usize) -> Vec<Node> {
    (0..n)
        .map(|i| {
            let a = i as f64 / n as f64 * std::f64::consts::TAU;
            Node::new(20.0 * a.cos(), 20.0 * a.sin())
        })
        .collect()
}

fn positions<D>(sim: &Simulation<D>) -> Vec<(f64, f64)> {
    sim.nodes().iter().map(|n| (n.x, n.y)).collect()
}

fn with_standard_forces(sim: &mut Simulation) {
    let links = (1..sim.nodes().len()).map(|i| Link::new(0, i)).collect();
    sim.add_force("link", LinkForce::new(links)).expect("link");
    sim.add_force("charge", ManyBody::new()).expect("charge");
    sim.add_force("collide", Collide::new(3.0)).expect("collide");
    sim.add_force("x", PositionX::new(0.0)).expect("x");
}

/// Records its name into a shared log on every application.
#[derive(Debug)]
struct Recorder {
    name: &'static str,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl Force<()> for Recorder {
    fn initialize(&mut self, _nodes: &[Node]) -> Result<()> {
        Ok(())
    }

    fn apply(&mut self, _nodes: &mut [Node], _alpha: f64, _rng: &mut dyn RandomSource) {
        self.log.borrow_mut().push(self.name);
    }
}

#[test]
fn frozen_node_never_moves() {
    let mut nodes = ring(8);
    nodes[3] = Node::new(1.0, 2.0).velocity(0.5, -0.5).frozen();
    let mut sim = Simulation::new(nodes, SimulationOptions::default());
    with_standard_forces(&mut sim);

    for _ in 0..100 {
        sim.tick(1);
        let n = &sim.nodes()[3];
        assert_eq!((n.x, n.y, n.vx, n.vy), (1.0, 2.0, 0.5, -0.5));
    }
}

#[test]
fn pinned_axis_stays_at_its_pin() {
    let mut nodes = ring(6);
    nodes[2] = Node::new(0.0, 0.0).pin_x(7.5);
    let mut sim = Simulation::new(nodes, SimulationOptions::default());
    with_standard_forces(&mut sim);

    for _ in 0..50 {
        sim.tick(1);
        let n = &sim.nodes()[2];
        assert_eq!(n.x, 7.5);
        assert_eq!(n.vx, 0.0);
    }
    // The free axis is still integrated.
    assert_ne!(sim.nodes()[2].y, 0.0);
}

#[test]
fn kinetic_energy_decays_without_forces() {
    let nodes = vec![
        Node::new(0.0, 0.0).velocity(3.0, -4.0),
        Node::new(5.0, 5.0).velocity(-1.0, 0.5),
    ];
    let mut sim = Simulation::new(nodes, SimulationOptions::default());

    let energy =
        |sim: &Simulation| -> f64 { sim.nodes().iter().map(|n| n.vx * n.vx + n.vy * n.vy).sum() };
    let mut last = energy(&sim);
    for _ in 0..200 {
        sim.tick(1);
        let e = energy(&sim);
        assert!(e <= last, "energy rose from {last} to {e}");
        last = e;
    }
    assert!(last < 1e-12, "energy {last}");
}

#[test]
fn find_returns_the_nearest_node() {
    let sim = Simulation::new(
        vec![Node::new(0.0, 0.0), Node::new(10.0, 0.0)],
        SimulationOptions::default(),
    );
    let hit = sim.find(1.0, 0.0, None).expect("some node");
    assert_eq!((hit.x, hit.y), (0.0, 0.0));
    assert!(sim.find(1.0, 0.0, Some(0.5)).is_none());
    assert_eq!(sim.find(9.0, 1.0, Some(2.0)).map(|n| n.index), Some(1));
}

#[test]
fn find_breaks_ties_by_order() {
    let sim = Simulation::new(
        vec![Node::new(-1.0, 0.0), Node::new(1.0, 0.0)],
        SimulationOptions::default(),
    );
    assert_eq!(sim.find(0.0, 0.0, None).map(|n| n.index), Some(0));

    let empty: Simulation = Simulation::new(vec![], SimulationOptions::default());
    assert!(empty.find(0.0, 0.0, None).is_none());
}

#[test]
fn identical_seeds_give_identical_runs() {
    // Coincident nodes force the jitter path.
    let nodes = || {
        let mut n = ring(10);
        n.extend((0..5).map(|_| Node::new(0.0, 0.0)));
        n
    };
    let run = |seed: u64| {
        let opts = SimulationOptions {
            random_seed: seed,
            ..SimulationOptions::default()
        };
        let mut sim = Simulation::new(nodes(), opts);
        with_standard_forces(&mut sim);
        sim.tick(120);
        positions(&sim)
    };

    let a = run(42);
    let b = run(42);
    assert_eq!(a, b);
    assert!(a.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
    assert_ne!(a, run(43));
}

#[test]
fn caller_supplied_random_source_drives_jitter() {
    #[derive(Debug)]
    struct Constant(f64);
    impl RandomSource for Constant {
        fn next_f64(&mut self) -> f64 {
            self.0
        }
    }

    let nodes = vec![Node::new(0.0, 0.0), Node::new(0.0, 0.0)];
    let mut sim = Simulation::with_random_source(
        nodes,
        SimulationOptions::default(),
        Box::new(Constant(1.0)),
    );
    sim.add_force("collide", Collide::new(1.0)).expect("register");
    sim.tick(1);

    // Jitter is always +5e-7, so node 0 is pushed toward positive x and y.
    let n = sim.nodes();
    assert!(n[0].x > 0.0 && n[0].y > 0.0, "{n:?}");
    assert!(n[1].x < 0.0 && n[1].y < 0.0, "{n:?}");
}

#[test]
fn forces_apply_in_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let recorder = |name| Recorder {
        name,
        log: Rc::clone(&log),
    };

    let mut sim = Simulation::new(ring(3), SimulationOptions::default());
    for name in ["b", "a", "c"] {
        assert!(sim.add_force(name, recorder(name)).expect("register").is_none());
    }
    sim.tick(2);
    assert_eq!(*log.borrow(), vec!["b", "a", "c", "b", "a", "c"]);

    // Replacing keeps the slot; removing closes the gap.
    log.borrow_mut().clear();
    let previous = sim.add_force("a", recorder("A")).expect("replace");
    assert!(previous.is_some());
    sim.remove_force("b").expect("remove");
    sim.tick(1);
    assert_eq!(*log.borrow(), vec!["A", "c"]);
    assert_eq!(sim.force_names().collect::<Vec<_>>(), vec!["a", "c"]);
}

#[test]
fn removing_an_unknown_force_is_an_error() {
    let mut sim = Simulation::new(ring(2), SimulationOptions::default());
    match sim.remove_force("missing") {
        Err(Error::ForceNotFound { name }) => assert_eq!(name, "missing"),
        other => panic!("expected ForceNotFound, got {other:?}"),
    }
}

#[test]
fn unresolved_link_fails_registration() {
    let mut sim = Simulation::new(ring(3), SimulationOptions::default());
    let err = sim
        .add_force("link", LinkForce::new(vec![Link::new(0, 9)]))
        .expect_err("node 9 does not exist");
    assert!(matches!(err, Error::UnresolvedReference { ref id } if id == "9"));
    assert!(sim.force("link").is_none());
}

#[test]
fn alpha_cools_toward_target() {
    let mut sim = Simulation::new(ring(4), SimulationOptions::default());
    let ticks = sim.run();
    assert!(sim.alpha() < sim.options().alpha_min);
    assert!(ticks > 0);

    sim.options_mut().alpha_target = 0.3;
    sim.set_alpha(1.0);
    sim.tick(2_000);
    assert!((sim.alpha() - 0.3).abs() < 1e-6, "alpha {}", sim.alpha());
}

#[test]
fn initialize_reindexes_edited_nodes() {
    let mut sim = Simulation::new(ring(3), SimulationOptions::default());
    sim.add_force("charge", ManyBody::new()).expect("charge");
    sim.nodes_mut()[1] = Node::unplaced();
    sim.initialize().expect("reinitialize");

    let n = &sim.nodes()[1];
    assert_eq!(n.index, 1);
    assert!(n.x.is_finite() && n.y.is_finite());
    assert_eq!((n.vx, n.vy), (0.0, 0.0));
}
